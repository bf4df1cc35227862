// Copyright 2024 Felix Engl
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use serde_json::json;
use time::OffsetDateTime;

/// Writes toots the way the collector does:
/// `<root>/YYYY/MM/DD/hh/mm/ss/<name>.json`.
pub struct TootFixtures {
    root: Utf8TempDir,
    created_at: OffsetDateTime,
    counter: usize,
}

impl TootFixtures {
    pub fn new() -> Self {
        Self {
            root: Utf8TempDir::new().unwrap(),
            created_at: OffsetDateTime::from_unix_timestamp(1682480958).unwrap(),
            counter: 0,
        }
    }

    pub fn root(&self) -> &Utf8Path {
        self.root.path()
    }

    fn next_path(&mut self) -> Utf8PathBuf {
        let at = self.created_at + time::Duration::seconds(self.counter as i64);
        self.counter += 1;
        let dir = self.root.path().join(format!(
            "{:04}/{:02}/{:02}/{:02}/{:02}/{:02}",
            at.year(),
            at.month() as u8,
            at.day(),
            at.hour(),
            at.minute(),
            at.second()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(format!("toot-{:05}.json", self.counter))
    }

    pub fn toot(&mut self, account_id: &str, username: &str, content: &str, language: &str) -> Utf8PathBuf {
        let toot = json!({
            "id": format!("10{}", self.counter),
            "created_at": "2023-04-26T03:49:18.000Z",
            "account": {"id": account_id, "username": username, "acct": username},
            "content": content,
            "language": language,
            "visibility": "public"
        });
        self.raw(&toot.to_string())
    }

    pub fn raw(&mut self, text: &str) -> Utf8PathBuf {
        let path = self.next_path();
        std::fs::write(&path, text).unwrap();
        path
    }
}
