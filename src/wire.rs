//! Request and error bodies shared by the HTTP server and the HTTP transport.

use crate::error::ApiError;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};

pub use crate::engine::NodeEdit as EditNodeRequest;

/// Body of `POST /create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRootRequest {
    pub name: String,
}

/// Body of `POST /insert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertNodeRequest {
    pub folder_id: NodeId,
    pub item: String,
    pub is_folder: bool,
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        Self {
            status_code: err.status_code(),
            error: err.kind().to_string(),
            message: err.detail(),
        }
    }
}

impl ErrorBody {
    pub fn into_error(self) -> ApiError {
        ApiError::from_response(self.status_code, Some(&self.error), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_request_uses_original_field_names() {
        let body: InsertNodeRequest =
            serde_json::from_str(r#"{"folderId":"abc","item":"readme.txt","isFolder":false}"#)
                .unwrap();
        assert_eq!(body.folder_id, NodeId::from("abc"));
        assert_eq!(body.item, "readme.txt");
        assert!(!body.is_folder);
    }

    #[test]
    fn edit_request_fields_are_optional() {
        let body: EditNodeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(body, EditNodeRequest::default());
        assert_eq!(
            serde_json::to_string(&EditNodeRequest::rename("x")).unwrap(),
            r#"{"name":"x"}"#
        );
    }

    #[test]
    fn error_body_carries_kind() {
        let body = ErrorBody::from(&ApiError::NotFound("Node not found: n1".to_string()));
        assert_eq!(body.status_code, 404);
        assert_eq!(body.error, "NotFound");
        assert!(matches!(body.into_error(), ApiError::NotFound(_)));
    }
}
