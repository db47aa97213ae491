use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("username is required")]
    MissingUsername,

    #[error("failed to sign token")]
    TokenSigning,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingUsername => StatusCode::BAD_REQUEST,
            ApiError::TokenSigning => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
