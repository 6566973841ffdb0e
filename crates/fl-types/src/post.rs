use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{PostId, PublicKey};

/// Kind of content a post carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MediaType {
    /// Description only.
    Text = 1,
    /// Image only.
    Image = 2,
    /// Image plus description.
    Mixed = 3,
}

impl TryFrom<u8> for MediaType {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Text),
            2 => Ok(Self::Image),
            3 => Ok(Self::Mixed),
            other => Err(TypeError::InvalidMediaType(other.to_string())),
        }
    }
}

impl From<MediaType> for u8 {
    fn from(kind: MediaType) -> Self {
        kind as u8
    }
}

impl FromStr for MediaType {
    type Err = TypeError;

    /// Parse the form-field representation (`"1"`, `"2"` or `"3"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Text),
            "2" => Ok(Self::Image),
            "3" => Ok(Self::Mixed),
            other => Err(TypeError::InvalidMediaType(other.to_string())),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// One post and its social metadata.
///
/// The JSON field names match the snapshot format already stored in
/// production ledgers, so existing snapshots keep decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "user_address")]
    pub author: PublicKey,
    #[serde(rename = "time")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "like_count", default)]
    pub like_count: i64,
    #[serde(rename = "image_hash", default, with = "empty_as_none")]
    pub image_ref: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(rename = "mapping", default, with = "liker_map")]
    pub likers: BTreeSet<PublicKey>,
    /// Set once a one-shot payout has fired for this post.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub payout_fired: bool,
}

impl PostRecord {
    /// A freshly uploaded post: no likes, empty name, created now.
    pub fn new(
        id: PostId,
        author: PublicKey,
        description: impl Into<String>,
        media_type: MediaType,
        image_ref: Option<String>,
    ) -> Self {
        Self {
            id,
            name: String::new(),
            description: description.into(),
            author,
            created_at: Utc::now(),
            like_count: 0,
            image_ref,
            media_type,
            likers: BTreeSet::new(),
            payout_fired: false,
        }
    }

    /// Returns `true` if `key` has liked this post.
    pub fn is_liked_by(&self, key: &PublicKey) -> bool {
        self.likers.contains(key)
    }

    /// Returns `true` if this record was written by `author`.
    pub fn is_by(&self, author: &str) -> bool {
        self.author.as_str() == author
    }

    /// The image reference, or `""` when the post has none.
    pub fn image_ref_or_empty(&self) -> &str {
        self.image_ref.as_deref().unwrap_or("")
    }
}

/// `Option<String>` stored as a plain string where `""` means absent.
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.is_empty()))
    }
}

/// Liker set stored as `{ "<key>": 1, ... }`.
mod liker_map {
    use std::collections::{BTreeMap, BTreeSet};

    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::identity::PublicKey;

    pub fn serialize<S>(likers: &BTreeSet<PublicKey>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(likers.len()))?;
        for key in likers {
            map.serialize_entry(key.as_str(), &1)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeSet<PublicKey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
        // Older ledgers accepted likes with a blank key. Those entries are dropped.
        Ok(raw
            .unwrap_or_default()
            .into_keys()
            .filter_map(|k| match PublicKey::new(k.as_str()) {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!(key = %k, error = %e, "skipping invalid liker key");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PostRecord {
        PostRecord::new(
            PostId::new("abc123XYZ0").unwrap(),
            PublicKey::new("GAUTHOR").unwrap(),
            "hello",
            MediaType::Text,
            None,
        )
    }

    #[test]
    fn media_type_parses_form_values() {
        assert_eq!("1".parse::<MediaType>().unwrap(), MediaType::Text);
        assert_eq!("2".parse::<MediaType>().unwrap(), MediaType::Image);
        assert_eq!(" 3 ".parse::<MediaType>().unwrap(), MediaType::Mixed);
        assert!("4".parse::<MediaType>().is_err());
        assert!("".parse::<MediaType>().is_err());
    }

    #[test]
    fn media_type_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&MediaType::Image).unwrap(), "2");
        assert!(serde_json::from_str::<MediaType>("9").is_err());
    }

    #[test]
    fn record_uses_snapshot_field_names() {
        let mut record = sample();
        record.likers.insert(PublicKey::new("GLIKER").unwrap());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["user_address"], "GAUTHOR");
        assert_eq!(value["image_hash"], "");
        assert_eq!(value["type"], 1);
        assert_eq!(value["like_count"], 0);
        assert_eq!(value["mapping"]["GLIKER"], 1);
        assert!(value.get("payout_fired").is_none());
    }

    #[test]
    fn decodes_legacy_record() {
        let json = r#"{
            "description": "legacy",
            "image_hash": "https://gateway/ipfs/Qm1",
            "like_count": 4,
            "name": "",
            "time": "2024-03-01T10:00:00.123456789+05:30",
            "user_address": "GOLD",
            "id": "Zz9Zz9Zz9Z",
            "type": 3,
            "mapping": {"GK1": 1, "GK2": 1}
        }"#;
        let record: PostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.like_count, 4);
        assert_eq!(record.image_ref.as_deref(), Some("https://gateway/ipfs/Qm1"));
        assert_eq!(record.media_type, MediaType::Mixed);
        assert_eq!(record.likers.len(), 2);
        assert!(!record.payout_fired);
    }

    #[test]
    fn legacy_blank_liker_key_is_skipped() {
        let json = r#"[{
            "id": "Zz9Zz9Zz9Z",
            "user_address": "GOLD",
            "mapping": {"": 1, "GK1": 1},
            "like_count": 2,
            "time": "2024-03-01T10:00:00Z",
            "type": 1
        }]"#;
        let records: Vec<PostRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].likers.len(), 1);
        assert!(records[0].is_liked_by(&PublicKey::new("GK1").unwrap()));
        assert_eq!(records[0].like_count, 2);
    }

    #[test]
    fn null_mapping_decodes_as_empty() {
        let json = r#"{"id":"a","user_address":"G","time":"2024-01-01T00:00:00Z",
                       "type":1,"mapping":null,"image_hash":null}"#;
        let record: PostRecord = serde_json::from_str(json).unwrap();
        assert!(record.likers.is_empty());
        assert!(record.image_ref.is_none());
    }

    #[test]
    fn author_and_liker_helpers() {
        let mut record = sample();
        let key = PublicKey::new("GLIKER").unwrap();
        assert!(!record.is_liked_by(&key));
        record.likers.insert(key.clone());
        assert!(record.is_liked_by(&key));
        assert!(record.is_by("GAUTHOR"));
        assert!(!record.is_by("GOTHER"));
        assert_eq!(record.image_ref_or_empty(), "");
    }
}
