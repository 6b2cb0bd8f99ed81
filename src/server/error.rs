use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced to relay clients as `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Caller name is required")]
    MissingCaller,

    #[error("Sender and message are required")]
    MissingSenderOrMessage,

    #[error("Failed to send notification")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidToken | Self::MissingCaller | Self::MissingSenderOrMessage => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            error!("Error sending notification: {:#}", err);
        }
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
