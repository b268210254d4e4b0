use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// API error taxonomy.
///
/// Every handler and action returns `ApiResult<T>`; the variants map onto
/// HTTP status codes in `status_code`. Toggle endpoints never use errors for
/// the "already in that state" case - follow/unfollow do (`InvalidOperation`),
/// matching their two-endpoint contract.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Unique-constraint violations surface as conflicts.
    ///
    /// Actions check for duplicates before inserting, but the check and the
    /// insert are separate statements; a concurrent writer can slip between
    /// them and the database index is the arbiter. Model errors arrive
    /// wrapped in anyhow, so both variants are inspected.
    fn unique_violation(&self) -> bool {
        let db_err = match self {
            ApiError::Database(err) => Some(err),
            ApiError::Internal(err) => err.downcast_ref::<sqlx::Error>(),
            _ => None,
        };
        matches!(
            db_err,
            Some(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505")
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.unique_violation() {
            return StatusCode::CONFLICT;
        }
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Database(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details are logged, not leaked to clients
        let detail = if self.unique_violation() {
            "Resource already exists.".to_string()
        } else if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result alias used throughout actions and handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Validation("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidOperation("redundant follow".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("Post").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("username taken".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(ApiError::NotFound("Profile").to_string(), "Profile not found");
    }
}
