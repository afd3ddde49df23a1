//! Core types shared by the store, the engine and the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Creation timestamp of a persisted node.
pub type Timestamp = DateTime<Utc>;

const TEMP_PREFIX: &str = "temp-";

/// Opaque node identifier.
///
/// Persisted nodes carry a UUID v4 string. Optimistic client shells carry a
/// `temp-` prefixed id until the server forest replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Fresh identifier for a persisted node
    pub fn generate() -> Self {
        NodeId(Uuid::new_v4().to_string())
    }

    /// Fresh identifier for an optimistic shell that has no server record yet
    pub fn temporary() -> Self {
        NodeId(format!("{}{}", TEMP_PREFIX, Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}
