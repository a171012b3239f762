use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::models::response::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid token")]
    Unauthorized,

    #[error("Missing title or content")]
    MissingAlertFields,

    #[error("Missing config: {0}")]
    Configuration(String),

    #[error("Content store not bound")]
    StoreUnavailable,

    #[error("Failed to store message: {0}")]
    StoreWrite(String),

    #[error("Failed to read message: {0}")]
    StoreRead(String),

    #[error("Failed to render message: {0}")]
    Render(String),

    /// Carries the platform or transport message verbatim.
    #[error("{0}")]
    Credential(String),

    #[error("{0}")]
    SendFault(String),

    #[error("Missing Message ID")]
    MissingId,

    #[error("Message expired or not found")]
    NotFound,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::FORBIDDEN,
            RelayError::MissingAlertFields | RelayError::MissingId => StatusCode::BAD_REQUEST,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::Configuration(_)
            | RelayError::StoreUnavailable
            | RelayError::StoreWrite(_)
            | RelayError::StoreRead(_)
            | RelayError::Render(_)
            | RelayError::Credential(_)
            | RelayError::SendFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, "Request failed");
            return (status, Json(ErrorResponse::new(self.to_string()))).into_response();
        }

        (status, self.to_string()).into_response()
    }
}
