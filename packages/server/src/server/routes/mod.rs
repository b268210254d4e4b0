pub mod auth;
pub mod health;
pub mod media;
pub mod posts;
pub mod profiles;

use axum::extract::Multipart;

use crate::common::{ApiError, ApiResult};

pub use auth::{register_handler, token_handler};
pub use health::health_handler;
pub use media::serve_media_handler;
pub use posts::{
    comment_handler, create_post_handler, delete_post_handler, get_post_handler,
    like_unlike_handler, liked_posts_handler, list_posts_handler, update_post_handler,
    upload_post_image_handler,
};
pub use profiles::{
    create_profile_handler, delete_profile_handler, follow_handler, get_profile_handler,
    list_profiles_handler, unfollow_handler, update_profile_handler,
    upload_profile_image_handler,
};

/// Pull the named file field out of a multipart upload.
///
/// Returns the raw bytes plus the declared content type (defaulting to
/// octet-stream when the client omits one).
pub(crate) async fn read_upload_field(
    mut multipart: Multipart,
    field_name: &str,
) -> ApiResult<(Vec<u8>, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;

        if bytes.is_empty() {
            return Err(ApiError::Validation("Uploaded file is empty.".to_string()));
        }

        return Ok((bytes.to_vec(), content_type));
    }

    Err(ApiError::Validation(format!(
        "Missing file field '{}'.",
        field_name
    )))
}
