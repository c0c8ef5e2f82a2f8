use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error taxonomy at the HTTP boundary. Handlers translate storage and
/// policy outcomes into one of these; clients always receive the
/// `{timestamp, status, error, message}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    Validation(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Map a storage error, surfacing uniqueness races as conflicts.
    pub fn from_db(err: anyhow::Error) -> Self {
        if devconnect_db::is_unique_violation(&err) {
            ApiError::Conflict("duplicate data")
        } else {
            ApiError::Internal(err)
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    timestamp: String,
    status: u16,
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Internal detail goes to the log, not to the client.
            ApiError::Internal(err) => {
                error!("internal error: {err:#}");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error"),
            message,
        };
        (status, Json(body)).into_response()
    }
}

pub(crate) fn join_error(err: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", err);
    ApiError::Internal(anyhow::anyhow!("background task failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_statuses() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("denied").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("post").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("taken").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Validation("blank").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_carry_the_reason() {
        assert_eq!(ApiError::NotFound("post").to_string(), "post not found");
        assert_eq!(
            ApiError::Forbidden("cannot comment on a private post").to_string(),
            "cannot comment on a private post"
        );
    }
}
