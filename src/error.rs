use std::fmt;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::courier::CourierId;
use crate::models::order::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Couriers,
    Orders,
}

impl BatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchKind::Couriers => "couriers",
            BatchKind::Orders => "orders",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Items that failed validation; ids that are not integers are `None`.
    #[error("invalid {kind} in batch: {ids:?}")]
    InvalidBatch {
        kind: BatchKind,
        ids: Vec<Option<i64>>,
    },

    #[error("{kind} already exist: {ids:?}")]
    DuplicateId { kind: BatchKind, ids: Vec<i64> },

    #[error("order {order_id} is not assigned to courier {courier_id}")]
    NotAssigned {
        order_id: OrderId,
        courier_id: CourierId,
    },

    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

fn id_list(ids: impl IntoIterator<Item = Value>) -> Vec<Value> {
    ids.into_iter().map(|id| json!({ "id": id })).collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidBatch { kind, ids } => (
                StatusCode::BAD_REQUEST,
                json!({ "validation_error": { kind.as_str(): id_list(ids.iter().map(|id| json!(id))) } }),
            ),
            AppError::DuplicateId { kind, ids } => (
                StatusCode::BAD_REQUEST,
                json!({ "validation_error": { kind.as_str(): id_list(ids.iter().map(|id| json!(id))) } }),
            ),
            AppError::Validation(_)
            | AppError::NotAssigned { .. }
            | AppError::MalformedTimestamp(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "validation_error": { "reason": self.to_string() } }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}
