//! Registration and token issuance.

use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::{ApiError, ApiResult, IdentityId};
use crate::domains::auth::jwt::JwtService;
use crate::domains::auth::models::Identity;

/// Register a new identity.
///
/// Fails with `Conflict` if the email is already registered.
pub async fn register(email: &str, password: &str, pool: &PgPool) -> ApiResult<Identity> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required.".to_string()));
    }
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters.".to_string(),
        ));
    }

    if Identity::find_by_email(email, pool).await?.is_some() {
        return Err(ApiError::Conflict(
            "An identity with this email already exists.".to_string(),
        ));
    }

    let salt = Uuid::new_v4().simple().to_string();
    let hash = hash_password(password, &salt);
    let identity = Identity::insert(IdentityId::new(), email, &hash, pool).await?;

    tracing::info!(identity_id = %identity.id, "identity registered");
    Ok(identity)
}

/// Verify credentials and issue a bearer token.
///
/// Fails with `Unauthorized` on unknown email or wrong password; the two
/// cases are indistinguishable to the caller.
pub async fn issue_token(
    email: &str,
    password: &str,
    jwt: &JwtService,
    pool: &PgPool,
) -> ApiResult<String> {
    let identity = Identity::find_by_email(email, pool)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(password, &identity.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = jwt.create_token(identity.id)?;
    Ok(token)
}

/// Salted SHA-256 digest, stored as `salt$hex`.
fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{}${}", salt, hex::encode(hasher.finalize()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, _)) => hash_password(password, salt) == stored,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let stored = hash_password("hunter22", "somesalt");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn different_salts_give_different_hashes() {
        assert_ne!(hash_password("pw", "a"), hash_password("pw", "b"));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("pw", "no-dollar-sign"));
    }
}
