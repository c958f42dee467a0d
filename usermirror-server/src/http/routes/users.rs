//! Username endpoints
//!
//! - POST /register: dual write of one username
//! - GET /list: local store only
//! - POST /clear: dual delete of every username

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::ValidationError;

/// Register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
}

/// Acknowledgement of a dual write applied to both stores
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub operation_id: Uuid,
}

/// List response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub users: Vec<String>,
}

/// POST /register
async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let username = match payload {
        Ok(Json(req)) => req.username,
        // A body that isn't JSON at all carries no username
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => {
            return Err(ApiError::InvalidBody {
                message: rejection.body_text(),
            })
        }
    };
    let username = username.ok_or(ValidationError::Missing { field: "username" })?;

    let report = state.coordinator.register(&username).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User added successfully".into(),
            operation_id: report.operation_id,
        }),
    ))
}

/// GET /list
async fn list(State(state): State<Arc<AppState>>) -> Result<Json<ListResponse>, ApiError> {
    let users = state.read_path.list().await?;
    Ok(Json(ListResponse { users }))
}

/// POST /clear
async fn clear(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let report = state.coordinator.clear().await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Users deleted successfully".into(),
            operation_id: report.operation_id,
        }),
    ))
}

/// Username routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/list", get(list))
        .route("/clear", post(clear))
}
