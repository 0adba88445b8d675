use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use super::dto::ErrorResponse;
use crate::{db::StoreError, ingest::IngestError};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "Request failed");
        }
        let body = Json(ErrorResponse { error: self.message });
        (self.status, body).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::EmptyInput | IngestError::InvalidPayload(_) => {
                Self::bad_request(e.to_string())
            }
            IngestError::Persistence(_) => Self::internal(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self::internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::payload::PayloadError;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(AppError::from(IngestError::EmptyInput).status, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(IngestError::InvalidPayload(PayloadError::Empty)).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn persistence_errors_map_to_500_with_message() {
        let err = AppError::from(IngestError::Persistence(StoreError::Database(
            sqlx::Error::PoolClosed,
        )));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.starts_with("failed to persist reading"));
    }
}
