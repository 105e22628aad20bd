use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Email is already registered")]
    EmailTaken,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::MalformedPayload(_) | AppError::UnknownCategory(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Error envelope shared by every route
        let body = Json(json!({
            "success": false,
            "status": status.as_u16(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
