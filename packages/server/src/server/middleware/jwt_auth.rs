use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{middleware::Next, response::Response};
use tracing::debug;

use crate::common::{ApiError, IdentityId};
use crate::domains::auth::JwtService;

/// Authenticated identity information from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity_id: IdentityId,
}

/// JWT authentication middleware
///
/// Extracts the JWT from the Authorization header, verifies it, and adds
/// AuthUser to request extensions. Without a valid token the request
/// continues unauthenticated; protected handlers reject via the
/// `CurrentIdentity` extractor.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!("Authenticated identity: {}", user.identity_id);
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Accept both "Bearer <token>" and a raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        identity_id: claims.identity_id(),
    })
}

/// Extractor for handlers that require authentication.
///
/// Rejects with 401 when no verified identity is attached to the request.
pub struct CurrentIdentity(pub IdentityId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .map(|user| CurrentIdentity(user.identity_id))
            .ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Id;

    #[test]
    fn extract_token_with_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let identity_id: IdentityId = Id::new();
        let token = jwt_service.create_token(identity_id).unwrap();

        let request = axum::http::Request::builder()
            .header("authorization", format!("Bearer {}", token))
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_some());
        assert_eq!(auth_user.unwrap().identity_id, identity_id);
    }

    #[test]
    fn extract_token_without_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let identity_id: IdentityId = Id::new();
        let token = jwt_service.create_token(identity_id).unwrap();

        let request = axum::http::Request::builder()
            .header("authorization", token)
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_some());
        assert_eq!(auth_user.unwrap().identity_id, identity_id);
    }

    #[test]
    fn no_auth_header() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_none());
    }

    #[test]
    fn invalid_token() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .header("authorization", "Bearer invalid_token")
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_none());
    }
}
