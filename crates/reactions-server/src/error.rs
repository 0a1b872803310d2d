//! Error types for the reactions API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reactions_core::ReactionError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request carries no user identity.
    #[error("Not logged in")]
    Unauthenticated,

    /// The request body or path could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The engine rejected or failed the operation.
    #[error(transparent)]
    Reaction(#[from] ReactionError),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_)
            | Self::Reaction(ReactionError::Validation(_) | ReactionError::Policy(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Reaction(ReactionError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, %status, "Request rejected");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use reactions_core::PolicyError;
    use reactions_db::DbError;
    use reactions_types::Symbol;
    use serde_json::Value;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthenticated_is_401() {
        let (status, body) = render(ApiError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Not logged in");
        assert_eq!(body["status"], 401);
    }

    #[tokio::test]
    async fn bad_request_is_400() {
        let (status, body) = render(ApiError::BadRequest("missing field `emoji`".to_owned())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad request: missing field `emoji`");
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn validation_is_400() {
        let (status, body) = render(ReactionError::Validation("userId").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing required field: userId");
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn policy_is_400() {
        let err = ReactionError::from(PolicyError::NotAllowed(Symbol::new("🦀")));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unsupported reaction: 🦀");
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn store_is_500() {
        let err = ReactionError::from(DbError::Config("connection refused".to_owned()));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "store error: Configuration error: connection refused"
        );
        assert_eq!(body["status"], 500);
    }
}
