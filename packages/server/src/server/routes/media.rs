use axum::extract::{Extension, Path};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::common::{ApiError, ApiResult};
use crate::server::app::AppState;

/// GET /media/:reference
///
/// Serves stored upload bytes with their content type. References are
/// opaque; an unknown one is a plain 404.
pub async fn serve_media_handler(
    Extension(state): Extension<AppState>,
    Path(reference): Path<String>,
) -> ApiResult<Response> {
    let stored = state
        .server_deps
        .media_store
        .retrieve(&reference)
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    match stored {
        Some((bytes, content_type)) => {
            Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
        }
        None => Err(ApiError::NotFound("Media")),
    }
}
