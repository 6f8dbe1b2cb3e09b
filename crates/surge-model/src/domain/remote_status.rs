use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status value reported by `GET /status/{task_id}`.
///
/// The documented value set is `pending`/`settled`; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Pending,
    Settled,
    Unrecognized(String),
}

impl RemoteStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RemoteStatus::Pending => "pending",
            RemoteStatus::Settled => "settled",
            RemoteStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for RemoteStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => RemoteStatus::Pending,
            "settled" => RemoteStatus::Settled,
            other => RemoteStatus::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RemoteStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RemoteStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(RemoteStatus::from(raw.as_str()))
    }
}
