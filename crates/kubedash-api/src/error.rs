//! Error types for the dashboard API
//!
//! Every handler failure is one of these variants. The status mapping lives
//! in [`Error::status`]; store errors are carried through unchanged and
//! mapped from the code the store reported.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// Result type for API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for API operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required path parameter was empty
    #[error("{0} parameter is required")]
    ParameterRequired(String),

    /// Request body could not be decoded
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Request body decoded but failed validation
    #[error("{0}")]
    Validation(String),

    /// The requested feature is turned off in global settings
    #[error("{0} feature is disabled")]
    FeatureDisabled(String),

    /// Authentication failed (invalid or missing token)
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// Caller is not allowed to perform the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Error reported by the object store
    #[error(transparent)]
    Store(#[from] kubedash_common::Error),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ParameterRequired(_)
            | Error::InvalidBody(_)
            | Error::Validation(_)
            | Error::FeatureDisabled(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Store(e) => e
                .status_code()
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the store reported the object as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_not_found())
    }

    /// Whether the store rejected a write as a duplicate or stale update
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_conflict())
    }

    /// Message returned to the caller
    fn message(&self) -> String {
        match self {
            Error::Store(kubedash_common::Error::Kube {
                source: kube::Error::Api(response),
            }) => response.message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Error::Unauthorized(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Internal(e.to_string())
    }
}

impl From<kube::Error> for Error {
    fn from(e: kube::Error) -> Self {
        Error::Store(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_bad_request() {
        for err in [
            Error::ParameterRequired("cluster".to_string()),
            Error::InvalidBody("expected value".to_string()),
            Error::Validation("name is required".to_string()),
            Error::FeatureDisabled("cluster backup".to_string()),
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_parameter_required_names_field() {
        let err = Error::ParameterRequired("backup_name".to_string());
        assert_eq!(err.to_string(), "backup_name parameter is required");
    }

    #[test]
    fn test_feature_disabled_message() {
        let err = Error::FeatureDisabled("cluster backup".to_string());
        assert_eq!(err.to_string(), "cluster backup feature is disabled");
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            Error::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Forbidden("not a member".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_store_errors_keep_their_code() {
        let missing: Error = kubedash_common::Error::not_found("Backup", "b1").into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let duplicate: Error = kubedash_common::Error::already_exists("Backup", "b1").into();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let other: Error = kubedash_common::Error::internal("boom").into();
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = Error::Forbidden("not a member of project p1".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], 403);
        assert_eq!(
            body["error"]["message"],
            "forbidden: not a member of project p1"
        );
    }
}
