//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Store failures carry `which_store` and the store's detail; dual-write
//! failures carry every side's status so divergence is visible to callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::coordinator::{CoordinatorError, DualWriteReport, SideResult};
use crate::db::StoreError;
use crate::models::{StoreRole, ValidationError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Input failed validation (400)
    Validation(ValidationError),

    /// Body could not be decoded (400)
    InvalidBody { message: String },

    /// Single-store call failed (500, 504 on timeout)
    Store(StoreError),

    /// One store applied the mutation, the other did not (500)
    PartialFailure(DualWriteReport),

    /// Neither store applied the mutation (500)
    TotalFailure(DualWriteReport),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": format!("missing_{}", e.field()),
                    "message": e.to_string()
                }),
            ),
            Self::InvalidBody { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "invalid_body",
                    "message": message
                }),
            ),
            Self::Store(e) => {
                tracing::error!(which_store = %e.role(), error = %e, "store error");
                let status = match e {
                    StoreError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status,
                    json!({
                        "error": "store_error",
                        "message": e.to_string(),
                        "which_store": e.role(),
                        "kind": e.kind(),
                        "detail": e.to_string()
                    }),
                )
            }
            Self::PartialFailure(report) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                report_body(
                    "partial_failure",
                    format!(
                        "{} applied to one store only; stores may now disagree",
                        report.operation
                    ),
                    report,
                ),
            ),
            Self::TotalFailure(report) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                report_body(
                    "total_failure",
                    format!("{} was not applied to any store", report.operation),
                    report,
                ),
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn report_body(code: &str, message: String, report: &DualWriteReport) -> Value {
    let stores: Vec<Value> = report
        .sides()
        .into_iter()
        .map(|(role, side)| side_body(role, side))
        .collect();

    json!({
        "error": code,
        "message": message,
        "operation": report.operation,
        "operation_id": report.operation_id,
        "outcome": report.outcome(),
        "failed_stores": report.failed_stores(),
        "applied_stores": report.applied_stores(),
        "stores": stores
    })
}

fn side_body(role: StoreRole, side: &SideResult) -> Value {
    match side {
        SideResult::Failed(e) => json!({
            "which_store": role,
            "status": side.status(),
            "kind": e.kind(),
            "detail": e.to_string()
        }),
        _ => json!({
            "which_store": role,
            "status": side.status()
        }),
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(e: CoordinatorError) -> Self {
        match e {
            CoordinatorError::Validation(v) => Self::Validation(v),
            CoordinatorError::PartialFailure(r) => Self::PartialFailure(r),
            CoordinatorError::TotalFailure(r) => Self::TotalFailure(r),
        }
    }
}
