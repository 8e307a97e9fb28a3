use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use skillboard_persistence::PersistenceError;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the API handlers as plain-text responses
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input from the client (400)
    #[error("{0}")]
    BadRequest(String),

    /// Store failure (500)
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bad_request_is_plain_text() {
        let response = ApiError::bad_request("Missing skill in request body").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Missing skill in request body");
    }

    #[test]
    fn test_persistence_maps_to_500() {
        let err = ApiError::from(PersistenceError::Query(sqlx_closed()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Failed to query skill:"));
    }

    fn sqlx_closed() -> skillboard_persistence::SqlxError {
        skillboard_persistence::SqlxError::PoolClosed
    }
}
