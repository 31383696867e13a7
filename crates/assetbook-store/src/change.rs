use assetbook_types::Timestamp;
use serde::{Deserialize, Serialize};

/// One entry of a key's change log, as recorded by the host at commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Host-assigned transaction identifier.
    pub tx_id: String,
    /// Host-assigned commit time.
    pub timestamp: Timestamp,
    /// Whether this change removed the key.
    pub is_delete: bool,
    /// Value written by the change. Empty for deletions.
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

impl ChangeRecord {
    pub fn write(tx_id: impl Into<String>, timestamp: Timestamp, value: Vec<u8>) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
            is_delete: false,
            value,
        }
    }

    pub fn delete(tx_id: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
            is_delete: true,
            value: Vec::new(),
        }
    }

    /// Returns `true` if the change carries a non-empty value payload.
    pub fn has_payload(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Result of advancing a [`HistoryIterator`](crate::HistoryIterator).
///
/// `value` and `done` are independent: the final step of a stream may carry
/// a change together with `done = true`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryStep {
    pub value: Option<ChangeRecord>,
    pub done: bool,
}

impl HistoryStep {
    /// A step carrying a change with more to follow.
    pub fn item(change: ChangeRecord) -> Self {
        Self {
            value: Some(change),
            done: false,
        }
    }

    /// The final step, still carrying a change.
    pub fn last(change: ChangeRecord) -> Self {
        Self {
            value: Some(change),
            done: true,
        }
    }

    /// A terminal step with nothing attached.
    pub fn exhausted() -> Self {
        Self {
            value: None,
            done: true,
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
