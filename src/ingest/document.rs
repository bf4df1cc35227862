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

use serde::{Deserialize, Deserializer, Serialize};

/// The fields of a collected toot we care about.
/// (De-)Serializes in the shape the collector writes, see [TootRecord].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TootRecord", into = "TootRecord")]
pub struct RawDocument {
    /// The id of the toot itself.
    pub toot_id: Option<String>,
    /// The id of the account that wrote the toot.
    pub id: String,
    pub username: String,
    pub content: Option<String>,
    pub language: Option<String>,
}

/// A toot as stored by the collector, one json object per file.
/// Everything not listed here is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TootRecord {
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub account: TootAccount,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TootAccount {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
}

impl From<TootRecord> for RawDocument {
    fn from(value: TootRecord) -> Self {
        Self {
            toot_id: value.id,
            id: value.account.id,
            username: value.account.username,
            content: value.content,
            language: value.language,
        }
    }
}

impl From<RawDocument> for TootRecord {
    fn from(value: RawDocument) -> Self {
        Self {
            id: value.toot_id,
            account: TootAccount {
                id: value.id,
                username: value.username,
            },
            content: value.content,
            language: value.language,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(value) => value,
            StringOrNumber::Number(value) => value.to_string(),
        }
    }
}

/// Some instances hand out numeric ids.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

/// A document that passed the filter, ready for hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedDocument {
    /// The account id.
    pub id: String,
    pub username: String,
    /// Identifies the toot, see [CleanedDocument::document_key].
    pub toot_id: Option<String>,
    pub tokens: Vec<String>,
}

impl CleanedDocument {
    /// The key used to recognize a document that was seen before.
    /// `None` if the toot can not be identified.
    pub fn document_key(&self) -> Option<&str> {
        self.toot_id.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::RawDocument;

    #[test]
    fn reads_nested_account_fields() {
        let raw: RawDocument = serde_json::from_str(
            r#"{
                "id": "110263517148286713",
                "created_at": "2023-04-26T03:49:18.830Z",
                "language": "en",
                "content": "<p>Hello</p>",
                "account": {"id": "109382", "username": "alice", "acct": "alice@example.org"}
            }"#,
        )
        .unwrap();
        assert_eq!(Some("110263517148286713"), raw.toot_id.as_deref());
        assert_eq!("109382", raw.id);
        assert_eq!("alice", raw.username);
        assert_eq!(Some("<p>Hello</p>"), raw.content.as_deref());
        assert_eq!(Some("en"), raw.language.as_deref());
    }

    #[test]
    fn accepts_numeric_ids_and_null_fields() {
        let raw: RawDocument = serde_json::from_str(
            r#"{"id": 7, "language": null, "content": null, "account": {"id": 42, "username": "bob"}}"#,
        )
        .unwrap();
        assert_eq!(Some("7"), raw.toot_id.as_deref());
        assert_eq!("42", raw.id);
        assert_eq!(None, raw.content);
        assert_eq!(None, raw.language);
    }

    #[test]
    fn toot_id_is_optional() {
        let raw: RawDocument = serde_json::from_str(
            r#"{"id": null, "account": {"id": "1", "username": "bob"}}"#,
        )
        .unwrap();
        assert_eq!(None, raw.toot_id);
        let raw: RawDocument =
            serde_json::from_str(r#"{"account": {"id": "1", "username": "bob"}}"#).unwrap();
        assert_eq!(None, raw.toot_id);
    }

    #[test]
    fn missing_account_is_an_error() {
        assert!(serde_json::from_str::<RawDocument>(r#"{"language": "en", "content": "x"}"#).is_err());
    }

    #[test]
    fn serializes_in_collector_shape() {
        let raw = RawDocument {
            toot_id: Some("99".to_string()),
            id: "1".to_string(),
            username: "carol".to_string(),
            content: Some("<p>hi</p>".to_string()),
            language: Some("en".to_string()),
        };
        let value = serde_json::to_value(&raw).unwrap();
        assert_eq!("carol", value["account"]["username"]);
        assert_eq!("99", value["id"]);
        assert_eq!(raw, serde_json::from_value::<RawDocument>(value).unwrap());
    }
}
