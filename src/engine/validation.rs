//! Input checks run before the engine touches the store.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

/// Edit applied by the rename operation. Either field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NodeEdit {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: None,
        }
    }
}

/// Required name for a new node. Stored exactly as given; only the empty
/// string is rejected.
pub fn validate_name(field: &str, name: &str) -> Result<String, ApiError> {
    if name.is_empty() {
        return Err(ApiError::ValidationError(format!("{} should not be empty", field)));
    }
    Ok(name.to_string())
}
