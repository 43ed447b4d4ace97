use axum::http::StatusCode;
use thiserror::Error;

/// Failures raised by the tracker core.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("entry not found: {0}")]
    NotFound(String),
    #[error("Failed to import file: {0}")]
    InvalidImport(String),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidInput(_) | TrackerError::InvalidImport(_) => {
                Self::bad_request(err.to_string())
            }
            TrackerError::NotFound(_) => Self::not_found(err.to_string()),
            TrackerError::Io(_) | TrackerError::Serialize(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_errors_map_to_status_codes() {
        let err: AppError = TrackerError::InvalidInput("bad".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "bad");

        let err: AppError = TrackerError::NotFound("abc".into()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: AppError = TrackerError::InvalidImport("entries must be an array".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Failed to import file: entries must be an array");

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = TrackerError::from(io).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
