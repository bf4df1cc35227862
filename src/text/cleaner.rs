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

use std::fmt::Debug;

/// Turns the raw content of a toot into a string that can be split into tokens.
pub trait TextCleaner: Debug + Send + Sync {
    fn clean(&self, content: &str) -> String;
}

/// Number of chars dropped when the content starts with a tag, e.g. `<p>`.
const LEADING_TAG_WIDTH: usize = 3;

/// Replaced by a single space, one after another.
const SPACED_PATTERNS: [&str; 4] = ["-", "\u{2014}", ":", "&nbsp;"];

/// The fixed offset cleaner.
///
/// This is not a markup parser. It assumes that most toots look like
/// `<p>some text</p>` and removes the leading tag by width and everything
/// after the next `<`. Anything smarter belongs into another [TextCleaner].
#[derive(Debug, Default, Copy, Clone)]
pub struct LeadingTagCleaner;

impl TextCleaner for LeadingTagCleaner {
    fn clean(&self, content: &str) -> String {
        let mut text = content.to_lowercase();
        if text.starts_with('<') {
            let cut = text
                .char_indices()
                .nth(LEADING_TAG_WIDTH)
                .map_or(text.len(), |(idx, _)| idx);
            text.drain(..cut);
        }
        if let Some(pos) = text.find('<') {
            text.truncate(pos);
        }
        for pattern in SPACED_PATTERNS {
            if text.contains(pattern) {
                text = text.replace(pattern, " ");
            }
        }
        text
    }
}
