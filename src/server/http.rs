//! HTTP endpoint handlers

use crate::error::ApiError;
use crate::server::AppState;
use crate::tree::{Forest, TreeNode};
use crate::types::NodeId;
use crate::wire::{CreateRootRequest, EditNodeRequest, ErrorBody, InsertNodeRequest};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, warn};

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::ValidationError(rejection.body_text()))
}

/// `null` when the store is empty
pub async fn get_forest(State(state): State<Arc<AppState>>) -> ApiResult<Option<Forest>> {
    state.engine.get_forest().map(Json)
}

pub async fn create_root(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRootRequest>, JsonRejection>,
) -> ApiResult<TreeNode> {
    let request = body(payload)?;
    state.engine.create_root(&request.name).map(Json)
}

pub async fn insert_child(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InsertNodeRequest>, JsonRejection>,
) -> ApiResult<Option<Forest>> {
    let request = body(payload)?;
    state
        .engine
        .insert_child(&request.folder_id, &request.item, request.is_folder)
        .map(Json)
}

pub async fn edit_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<EditNodeRequest>, JsonRejection>,
) -> ApiResult<Option<Forest>> {
    let edit = body(payload)?;
    state.engine.rename(&NodeId::from(id), edit).map(Json)
}

pub async fn delete_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Option<Forest>> {
    state.engine.delete_cascade(&NodeId::from(id)).map(Json)
}

pub async fn get_subtree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TreeNode> {
    state.engine.get_node_subtree(&NodeId::from(id)).map(Json)
}
