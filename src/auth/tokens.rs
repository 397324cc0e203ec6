use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::jwt::JwtManager;
use super::role::Role;
use crate::db::models::auth_token::NewAuthToken;
use crate::db::repositories::auth_token_repository::AuthTokenRepository;
use crate::error::AppError;

/// Résultat d'une émission: access token signé + refresh token persisté.
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Cycle de vie des credentials d'accès à l'API.
///
/// Chaque refresh token est une ligne `auth_tokens`; la machine à états est
/// Valid → Invalid, terminale. La réutilisation d'un refresh token valide est
/// permise jusqu'à révocation explicite (voir DESIGN.md).
#[derive(Clone)]
pub struct TokenService {
    jwt_manager: JwtManager,
    refresh_ttl_days: i64,
}

impl TokenService {
    pub fn new(jwt_manager: JwtManager, refresh_ttl_days: i64) -> Self {
        Self {
            jwt_manager,
            refresh_ttl_days,
        }
    }

    /// Durée de vie d'un access token, en secondes (payload `expires_in`)
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.jwt_manager.expiration_minutes() * 60
    }

    /// Durée de vie d'un refresh token, en secondes (Max-Age du cookie)
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_days * 24 * 3600
    }

    /// Émet une nouvelle session: access token court + refresh token long.
    /// Aucun effet sur les sessions existantes (multi-session autorisée).
    pub fn issue_tokens(&self, account_id: Uuid, role: Role) -> Result<IssuedTokens, AppError> {
        let access_token = self
            .jwt_manager
            .generate_access_token(account_id, role)
            .map_err(AppError::from)?;

        let refresh_token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::days(self.refresh_ttl_days);

        AuthTokenRepository::create(&NewAuthToken {
            account_id,
            refresh_token: refresh_token.clone(),
            is_valid: true,
            expires_at,
        })?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    /// Émet un nouvel access token depuis un refresh token encore valide.
    /// Fail closed: tout lookup manqué vaut None (l'appelant répond 401),
    /// le refresh token lui-même n'est pas renouvelé.
    pub fn rotate_access_token(
        &self,
        account_id: Uuid,
        role: Role,
        refresh_token: &str,
    ) -> Result<Option<String>, AppError> {
        let row = AuthTokenRepository::find_valid(account_id, refresh_token)?;

        match row {
            Some(_) => {
                let access_token = self
                    .jwt_manager
                    .generate_access_token(account_id, role)
                    .map_err(AppError::from)?;
                Ok(Some(access_token))
            }
            None => Ok(None),
        }
    }

    /// Révoque un refresh token. Idempotent: révoquer un token déjà invalide
    /// est un no-op.
    pub fn revoke_refresh_token(
        &self,
        account_id: Uuid,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        AuthTokenRepository::revoke(account_id, refresh_token).map_err(AppError::from)
    }

    /// Invalide toutes les sessions d'un compte (verrouillage admin).
    /// Le changement de mot de passe passe par la variante transactionnelle
    /// du repository, pas par ici.
    pub fn revoke_all_for_account(&self, account_id: Uuid) -> Result<(), AppError> {
        AuthTokenRepository::invalidate_all(account_id).map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_test_pool;
    use crate::db::models::account::{AccountStatus, NewAccount};
    use crate::db::repositories::account_repository::AccountRepository;

    fn service() -> TokenService {
        TokenService::new(JwtManager::new("token_service_test_secret", 15), 14)
    }

    fn create_test_account() -> Uuid {
        init_test_pool();

        let new_account = NewAccount {
            email: format!("token_svc_{}@example.com", Uuid::new_v4()),
            username: format!("tokensvc_{}", Uuid::new_v4()),
            password_hash: Some("test_hash".to_string()),
            status: AccountStatus::Active,
            role: Role::Customer,
            avatar_url: None,
            oauth_provider_id: None,
        };

        AccountRepository::create(&new_account)
            .expect("Failed to create account")
            .id
    }

    fn cleanup(account_id: Uuid) {
        let _ = AuthTokenRepository::delete_for_account(account_id);
        let _ = AccountRepository::delete(account_id);
    }

    #[test]
    fn ttl_accessors_convert_to_seconds() {
        let service = service();
        assert_eq!(service.access_token_ttl_secs(), 15 * 60);
        assert_eq!(service.refresh_ttl_secs(), 14 * 24 * 3600);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn issue_then_rotate_returns_a_fresh_access_token() {
        let service = service();
        let account_id = create_test_account();

        let issued = service
            .issue_tokens(account_id, Role::Customer)
            .expect("issue should succeed");

        // The JWT iat has second granularity; wait so the rotated token differs
        std::thread::sleep(std::time::Duration::from_millis(1100));

        let rotated = service
            .rotate_access_token(account_id, Role::Customer, &issued.refresh_token)
            .expect("rotation query should succeed")
            .expect("valid refresh token must rotate");

        assert_ne!(rotated, issued.access_token, "rotation issues a new token");

        // The refresh row itself stays valid (reuse-until-revoked policy)
        let again = service
            .rotate_access_token(account_id, Role::Customer, &issued.refresh_token)
            .expect("rotation query should succeed");
        assert!(again.is_some(), "refresh token survives rotation");

        cleanup(account_id);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn rotate_fails_closed_after_revocation() {
        let service = service();
        let account_id = create_test_account();

        let issued = service
            .issue_tokens(account_id, Role::Customer)
            .expect("issue should succeed");

        service
            .revoke_refresh_token(account_id, &issued.refresh_token)
            .expect("revoke should succeed");

        let rotated = service
            .rotate_access_token(account_id, Role::Customer, &issued.refresh_token)
            .expect("rotation query should succeed");
        assert!(rotated.is_none(), "revoked token must not rotate");

        // Revoking again is a no-op
        service
            .revoke_refresh_token(account_id, &issued.refresh_token)
            .expect("second revoke is a no-op");

        cleanup(account_id);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn rotate_fails_closed_for_unknown_token() {
        let service = service();
        let account_id = create_test_account();

        let rotated = service
            .rotate_access_token(account_id, Role::Customer, "never-issued")
            .expect("rotation query should succeed");
        assert!(rotated.is_none());

        cleanup(account_id);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn issuing_does_not_disturb_existing_sessions() {
        let service = service();
        let account_id = create_test_account();

        let first = service
            .issue_tokens(account_id, Role::Customer)
            .expect("first session");
        let _second = service
            .issue_tokens(account_id, Role::Customer)
            .expect("second session");

        let rotated = service
            .rotate_access_token(account_id, Role::Customer, &first.refresh_token)
            .expect("rotation query should succeed");
        assert!(rotated.is_some(), "first session must still be valid");

        cleanup(account_id);
    }
}
