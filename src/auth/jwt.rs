use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    GenerationFailed(jsonwebtoken::errors::Error),
    #[error("Token verification failed: {0}")]
    VerificationFailed(jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_minutes: i64,
}

impl JwtManager {
    pub fn new(secret: &str, expiration_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            expiration_minutes,
        }
    }

    /// Génère un access token avec la durée configurée
    pub fn generate_access_token(&self, account_id: Uuid, role: Role) -> Result<String, JwtError> {
        self.generate_token(account_id, role, self.expiration_minutes)
    }

    pub fn expiration_minutes(&self) -> i64 {
        self.expiration_minutes
    }

    pub fn generate_token(
        &self,
        account_id: Uuid,
        role: Role,
        expires_in_minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(expires_in_minutes)).timestamp();

        let claims = Claims {
            sub: account_id,
            role,
            exp,
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::GenerationFailed)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(JwtError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::{JwtError, JwtManager, Role, Uuid};

    fn make_jwt_manager() -> JwtManager {
        JwtManager::new("my_secret_key_for_tests", 15)
    }

    #[test]
    fn generate_and_verify_succeeds_with_valid_token() {
        let jwt_manager = JwtManager::new("my_secret_key", 15);
        let account_id = Uuid::new_v4();
        let token = jwt_manager
            .generate_token(account_id, Role::Customer, 15)
            .expect("Token generation failed");
        let claims = jwt_manager
            .verify_token(&token)
            .expect("Token verification failed");
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.role, Role::Customer);
    }

    #[test]
    fn generate_token_returns_jwt_with_correct_format() {
        let jwt = make_jwt_manager();
        let account_id = Uuid::new_v4();

        let token = jwt
            .generate_token(account_id, Role::Enterprise, 15)
            .expect("Token generation should succeed");

        assert!(!token.is_empty(), "Token should not be empty");
        assert!(token.contains('.'), "JWT should have dots (header.payload.signature)");
    }

    #[test]
    fn verify_token_returns_correct_claims() {
        let jwt = make_jwt_manager();
        let account_id = Uuid::new_v4();
        let token = jwt
            .generate_token(account_id, Role::Admin, 15)
            .expect("Failed to generate token");

        let claims = jwt.verify_token(&token).expect("Token verification should succeed");

        assert_eq!(claims.sub, account_id, "Account ID should match");
        assert_eq!(claims.role, Role::Admin, "Role should survive the round trip");
        assert!(claims.exp > claims.iat, "Expiry should be after issued time");
    }

    #[test]
    fn verify_token_fails_with_invalid_input() {
        let jwt = make_jwt_manager();

        let result = jwt.verify_token("invalid.token.here");

        assert!(matches!(result.unwrap_err(), JwtError::VerificationFailed(_)));
    }

    #[test]
    fn verify_token_fails_when_token_is_expired() {
        let jwt = make_jwt_manager();
        let account_id = Uuid::new_v4();

        // Expired 5 minutes ago, beyond the default validation leeway
        let token = jwt
            .generate_token(account_id, Role::Customer, -5)
            .expect("Token generation should succeed");

        let result = jwt.verify_token(&token);
        assert!(matches!(result.unwrap_err(), JwtError::VerificationFailed(_)));
    }

    #[test]
    fn verify_token_fails_with_wrong_secret() {
        let jwt = make_jwt_manager();
        let other = JwtManager::new("a_different_secret", 15);
        let token = jwt
            .generate_token(Uuid::new_v4(), Role::Customer, 15)
            .expect("Token generation should succeed");

        assert!(other.verify_token(&token).is_err());
    }
}
