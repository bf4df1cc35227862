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
use sealed::sealed;
use thiserror::Error;

type Result<T> = std::result::Result<T, ErrorWithPath>;

/// An io error together with the file it happened on.
#[derive(Debug, Error)]
#[error("Failed for file '{path}' with: {source}")]
pub struct ErrorWithPath {
    path: Utf8PathBuf,
    #[source]
    source: std::io::Error,
}

impl ErrorWithPath {
    #[inline]
    pub fn new(path: Utf8PathBuf, source: std::io::Error) -> Self {
        Self { path, source }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn kind(&self) -> std::io::ErrorKind {
        self.source.kind()
    }
}

/// Helper trait to attach the offending path to an io result.
#[sealed]
pub trait ToErrorWithPath<T>
where
    Self: Sized,
{
    /// Converts a normal IO error to an error with a path
    fn to_error_with_path<P: AsRef<Utf8Path>>(self, path: P) -> Result<T>;
}

#[sealed]
impl<T> ToErrorWithPath<T> for std::result::Result<T, std::io::Error> {
    fn to_error_with_path<P: AsRef<Utf8Path>>(self, path: P) -> Result<T> {
        self.map_err(|e| ErrorWithPath::new(path.as_ref().to_path_buf(), e))
    }
}

#[cfg(test)]
mod test {
    use super::ToErrorWithPath;
    use std::io::ErrorKind;

    #[test]
    fn keeps_path_and_kind() {
        let result: std::io::Result<()> = Err(std::io::Error::from(ErrorKind::NotFound));
        let err = result.to_error_with_path("some/where.json").unwrap_err();
        assert_eq!("some/where.json", err.path().as_str());
        assert_eq!(ErrorKind::NotFound, err.kind());
        assert!(err.to_string().contains("some/where.json"));
    }
}
