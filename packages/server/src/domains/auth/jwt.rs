use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::IdentityId;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,       // Subject (identity id as string)
    pub identity_id: Uuid, // Identity UUID
    pub exp: i64,          // Expiration timestamp
    pub iat: i64,          // Issued at timestamp
    pub iss: String,       // Issuer
}

impl Claims {
    pub fn identity_id(&self) -> IdentityId {
        IdentityId::from_uuid(self.identity_id)
    }
}

/// JWT Service - creates and verifies identity tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// Create new JWT service with secret and issuer
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Create a new token for an identity.
    ///
    /// Tokens expire after 24 hours.
    pub fn create_token(&self, identity_id: IdentityId) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(24);

        let claims = Claims {
            sub: identity_id.to_string(),
            identity_id: identity_id.into_uuid(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a token.
    ///
    /// Returns claims if the token is valid, issued by us, and not expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_token() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());
        let identity_id = IdentityId::new();

        let token = service.create_token(identity_id).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.identity_id(), identity_id);
        assert_eq!(claims.iss, "test_issuer");
    }

    #[test]
    fn invalid_token_rejected() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());
        assert!(service.verify_token("invalid_token").is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let service1 = JwtService::new("secret1", "test_issuer".to_string());
        let service2 = JwtService::new("secret2", "test_issuer".to_string());

        let token = service1.create_token(IdentityId::new()).unwrap();
        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn expiry_is_24_hours() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());
        let token = service.create_token(IdentityId::new()).unwrap();
        let claims = service.verify_token(&token).unwrap();

        let expires_in = claims.exp - chrono::Utc::now().timestamp();
        assert!(expires_in > 23 * 3600);
        assert!(expires_in <= 24 * 3600);
    }
}
