//! Transports carrying explorer requests to a mutation engine.

use crate::engine::{MutationEngine, NodeEdit};
use crate::error::ApiError;
use crate::tree::{Forest, TreeNode};
use crate::types::NodeId;
use crate::wire::{CreateRootRequest, ErrorBody, InsertNodeRequest};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Request/response surface of the explorer backend.
#[async_trait]
pub trait ExplorerTransport: Send + Sync {
    async fn fetch_forest(&self) -> Result<Option<Forest>, ApiError>;

    /// Returns the shallow view of the created root.
    async fn create_root(&self, name: &str) -> Result<TreeNode, ApiError>;

    async fn insert_child(
        &self,
        parent_id: &NodeId,
        name: &str,
        is_folder: bool,
    ) -> Result<Option<Forest>, ApiError>;

    async fn edit(&self, node_id: &NodeId, edit: NodeEdit) -> Result<Option<Forest>, ApiError>;

    async fn delete(&self, node_id: &NodeId) -> Result<Option<Forest>, ApiError>;

    async fn fetch_subtree(&self, node_id: &NodeId) -> Result<TreeNode, ApiError>;
}

/// Calls an in-process engine directly.
#[derive(Clone)]
pub struct LocalTransport {
    engine: Arc<MutationEngine>,
}

impl LocalTransport {
    pub fn new(engine: Arc<MutationEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ExplorerTransport for LocalTransport {
    async fn fetch_forest(&self) -> Result<Option<Forest>, ApiError> {
        self.engine.get_forest()
    }

    async fn create_root(&self, name: &str) -> Result<TreeNode, ApiError> {
        self.engine.create_root(name)
    }

    async fn insert_child(
        &self,
        parent_id: &NodeId,
        name: &str,
        is_folder: bool,
    ) -> Result<Option<Forest>, ApiError> {
        self.engine.insert_child(parent_id, name, is_folder)
    }

    async fn edit(&self, node_id: &NodeId, edit: NodeEdit) -> Result<Option<Forest>, ApiError> {
        self.engine.rename(node_id, edit)
    }

    async fn delete(&self, node_id: &NodeId) -> Result<Option<Forest>, ApiError> {
        self.engine.delete_cascade(node_id)
    }

    async fn fetch_subtree(&self, node_id: &NodeId) -> Result<TreeNode, ApiError> {
        self.engine.get_node_subtree(node_id)
    }
}

/// JSON over HTTP against a running `grove serve`.
///
/// `base_url` includes the route prefix, e.g. `http://127.0.0.1:4000/file-explorer`.
pub struct HttpTransport {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::ConfigError(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::ConfigError(format!(
                "Base URL cannot carry a path: {}",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segment: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Some(segment) = segment {
            // cannot_be_a_base was rejected in new()
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(segment);
            }
        }
        url
    }

    fn request(&self, method: Method, segment: Option<&str>) -> RequestBuilder {
        let url = self.endpoint(segment);
        debug!(%method, %url, "Explorer request");
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| self.request_error(e))?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| ApiError::Transport(format!("Malformed response body: {}", e)));
        }

        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error) => Err(error.into_error()),
            Err(_) => Err(ApiError::Server {
                status: status.as_u16(),
                message: body,
            }),
        }
    }

    fn request_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ExplorerTransport for HttpTransport {
    async fn fetch_forest(&self) -> Result<Option<Forest>, ApiError> {
        self.send(self.request(Method::GET, None)).await
    }

    async fn create_root(&self, name: &str) -> Result<TreeNode, ApiError> {
        let body = CreateRootRequest {
            name: name.to_string(),
        };
        self.send(self.request(Method::POST, Some("create")).json(&body))
            .await
    }

    async fn insert_child(
        &self,
        parent_id: &NodeId,
        name: &str,
        is_folder: bool,
    ) -> Result<Option<Forest>, ApiError> {
        let body = InsertNodeRequest {
            folder_id: parent_id.clone(),
            item: name.to_string(),
            is_folder,
        };
        self.send(self.request(Method::POST, Some("insert")).json(&body))
            .await
    }

    async fn edit(&self, node_id: &NodeId, edit: NodeEdit) -> Result<Option<Forest>, ApiError> {
        self.send(
            self.request(Method::PUT, Some(node_id.as_str()))
                .json(&edit),
        )
        .await
    }

    async fn delete(&self, node_id: &NodeId) -> Result<Option<Forest>, ApiError> {
        self.send(self.request(Method::DELETE, Some(node_id.as_str())))
            .await
    }

    async fn fetch_subtree(&self, node_id: &NodeId) -> Result<TreeNode, ApiError> {
        self.send(self.request(Method::GET, Some(node_id.as_str())))
            .await
    }
}
