// src/auth/services.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use diesel::Connection;
use uuid::Uuid;

use savora_api::{
    AccountResponse, LoginRequest, LoginResponse, RefreshTokenResponse, RegisterRequest,
    UpdateProfileRequest,
};

use super::extractors::{build_refresh_cookie, clear_refresh_cookie};
use super::password::PasswordManager;
use super::role::Role;
use super::tokens::TokenService;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::account::{Account, AccountStatus, NewAccount, UpdateAccount};
use crate::db::models::password_reset_token::NewPasswordResetToken;
use crate::db::repositories::account_repository::AccountRepository;
use crate::db::repositories::auth_token_repository::AuthTokenRepository;
use crate::db::repositories::password_reset_token_repository::PasswordResetTokenRepository;
use crate::error::AppError;
use crate::providers::email::EmailProvider;
use crate::providers::oauth::OAuthProvider;

const RESET_CODE_TTL_MINUTES: i64 = 15;

pub struct AuthService {
    tokens: TokenService,
    oauth: Arc<dyn OAuthProvider>,
    mailer: Arc<dyn EmailProvider>,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(
        tokens: TokenService,
        oauth: Arc<dyn OAuthProvider>,
        mailer: Arc<dyn EmailProvider>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            tokens,
            oauth,
            mailer,
            secure_cookies,
        }
    }

    // === Cookies ===
    // Le refresh token ne voyage que dans un cookie httpOnly dont le Max-Age
    // est exactement la durée de vie du token: le cookie ne survit jamais au
    // token qu'il transporte.

    pub fn refresh_cookie(&self, refresh_token: &str) -> String {
        build_refresh_cookie(
            refresh_token,
            self.tokens.refresh_ttl_secs(),
            self.secure_cookies,
        )
    }

    pub fn logout_cookie(&self) -> String {
        clear_refresh_cookie(self.secure_cookies)
    }

    /// Récupère le profil du compte courant
    pub fn get_current_account(account_id: Uuid) -> Result<AccountResponse, AppError> {
        AccountRepository::find_by_id(account_id)
            .map_err(AppError::from)?
            .map(AccountResponse::from)
            .ok_or_else(|| AppError::not_found("Account not found"))
    }

    /// Met à jour le profil (pseudo, avatar)
    pub fn update_profile(
        account_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<AccountResponse, AppError> {
        if request.username.is_none() && request.avatar_url.is_none() {
            return Err(AppError::validation("Nothing to update"));
        }

        if let Some(username) = &request.username {
            if username.trim().is_empty() {
                return Err(AppError::validation("Username must not be empty"));
            }
        }

        let changes = UpdateAccount {
            username: request.username,
            avatar_url: request.avatar_url.map(Some),
            ..Default::default()
        };

        AccountRepository::update(account_id, &changes)
            .map(AccountResponse::from)
            .map_err(AppError::from)
    }

    /// Inscription d'un nouveau client
    pub fn register(register_request: RegisterRequest) -> Result<AccountResponse, AppError> {
        // Validation email
        if !Self::is_valid_email(&register_request.email) {
            return Err(AppError::InvalidEmail);
        }

        // Validation password
        if !PasswordManager::is_strong(&register_request.password) {
            return Err(AppError::WeakPassword(
                "Password must be at least 8 characters with uppercase, lowercase and numbers"
                    .to_string(),
            ));
        }

        // Vérifier que l'email n'existe pas
        let existing = AccountRepository::find_by_email(&register_request.email)?;
        if existing.is_some() {
            return Err(AppError::EmailAlreadyRegistered);
        }

        // Hash le password
        let password_hash = PasswordManager::hash(&register_request.password)?;

        let new_account = NewAccount {
            email: register_request.email,
            username: register_request.username,
            password_hash: Some(password_hash),
            status: AccountStatus::Active,
            role: Role::Customer,
            avatar_url: None,
            oauth_provider_id: None,
        };

        // Crée le compte
        AccountRepository::create(&new_account)
            .map(AccountResponse::from)
            .map_err(AppError::from)
    }

    /// Connexion par email + mot de passe
    pub fn login(&self, login_request: &LoginRequest) -> Result<LoginResponse, AppError> {
        // Valide l'email
        if !Self::is_valid_email(&login_request.email) {
            return Err(AppError::InvalidEmail);
        }

        // Recherche le compte. Réponse générique pour ne rien divulguer
        let account = AccountRepository::find_by_email(&login_request.email)?
            .ok_or(AppError::InvalidCredentials)?;

        if !account.is_active() {
            return Err(AppError::AccountDisabled);
        }

        // Un compte OAuth-only n'a pas de mot de passe
        let password_hash = account
            .password_hash
            .as_ref()
            .ok_or(AppError::InvalidCredentials)?;

        if !PasswordManager::verify(&login_request.password, password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        self.open_session(account)
    }

    /// Connexion via le fournisseur OAuth. Crée le compte au premier login,
    /// ou lie l'identité OAuth à un compte existant portant le même email.
    pub async fn oauth_login(&self, code: &str) -> Result<LoginResponse, AppError> {
        if code.is_empty() {
            return Err(AppError::validation("Missing authorization code"));
        }

        let identity = self.oauth.exchange_code(code).await?;

        let account = match AccountRepository::find_by_oauth_provider_id(
            &identity.provider_account_id,
        )? {
            Some(account) => account,
            None => match AccountRepository::find_by_email(&identity.email)? {
                Some(account) => {
                    // Lie l'identité OAuth au compte existant
                    let changes = UpdateAccount {
                        oauth_provider_id: Some(Some(identity.provider_account_id.clone())),
                        ..Default::default()
                    };
                    AccountRepository::update(account.id, &changes)?
                }
                None => {
                    let username = identity
                        .display_name
                        .clone()
                        .unwrap_or_else(|| {
                            identity
                                .email
                                .split('@')
                                .next()
                                .unwrap_or("customer")
                                .to_string()
                        });

                    AccountRepository::create(&NewAccount {
                        email: identity.email.clone(),
                        username,
                        password_hash: None,
                        status: AccountStatus::Active,
                        role: Role::Customer,
                        avatar_url: None,
                        oauth_provider_id: Some(identity.provider_account_id.clone()),
                    })?
                }
            },
        };

        if !account.is_active() {
            return Err(AppError::AccountDisabled);
        }

        self.open_session(account)
    }

    /// Rafraîchit l'access token depuis le cookie. Le refresh token reste
    /// valide (réutilisation permise jusqu'à révocation explicite).
    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshTokenResponse, AppError> {
        if refresh_token.is_empty() {
            return Err(AppError::InvalidRefreshToken);
        }

        let row = AuthTokenRepository::find_valid_by_token(refresh_token)?
            .ok_or(AppError::InvalidRefreshToken)?;

        let account = AccountRepository::find_by_id(row.account_id)?
            .ok_or(AppError::InvalidRefreshToken)?;

        if !account.is_active() {
            return Err(AppError::AccountDisabled);
        }

        let access_token = self
            .tokens
            .rotate_access_token(account.id, account.role, refresh_token)?
            .ok_or(AppError::InvalidRefreshToken)?;

        Ok(RefreshTokenResponse {
            access_token,
            expires_in: self.tokens.access_token_ttl_secs(),
        })
    }

    /// Déconnexion: révoque le refresh token présenté (idempotent)
    pub fn logout(&self, account_id: Uuid, refresh_token: &str) -> Result<(), AppError> {
        self.tokens.revoke_refresh_token(account_id, refresh_token)
    }

    /// Change le mot de passe du compte. La mise à jour du hash et la
    /// révocation de toutes les sessions committent dans la même transaction:
    /// chaque appareil devra se reconnecter.
    pub fn change_password(
        account_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        // Vérifie que le nouveau password est fort
        if !PasswordManager::is_strong(new_password) {
            return Err(AppError::WeakPassword(
                "Password must be at least 8 characters with uppercase, lowercase and numbers"
                    .to_string(),
            ));
        }

        // Récupère le compte
        let account = AccountRepository::find_by_id(account_id)?
            .ok_or_else(|| AppError::not_found("Account not found"))?;

        let password_hash = account
            .password_hash
            .as_ref()
            .ok_or_else(|| AppError::validation("Account has no password set"))?;

        // Vérifie l'ancien password
        if !PasswordManager::verify(old_password, password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        // Hash le nouveau password
        let new_password_hash = PasswordManager::hash(new_password)?;

        let mut conn = get_connection()?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            AccountRepository::update_password_with(conn, account_id, &new_password_hash)?;
            AuthTokenRepository::invalidate_all_with(conn, account_id)?;
            Ok(())
        })?;

        Ok(())
    }

    /// Demande de réinitialisation. Répond toujours Ok pour ne pas révéler
    /// l'existence d'un compte; l'échec d'envoi d'email est loggé, pas exposé.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        if !Self::is_valid_email(email) {
            return Err(AppError::InvalidEmail);
        }

        let Some(account) = AccountRepository::find_by_email(email)? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let code = Self::generate_reset_code();
        let new_token = NewPasswordResetToken {
            account_id: account.id,
            code: code.clone(),
            expires_at: Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES),
        };

        // L'émission consomme les codes précédents dans la même transaction
        let mut conn = get_connection()?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            PasswordResetTokenRepository::create_with(conn, &new_token)?;
            Ok(())
        })?;

        if let Err(e) = self
            .mailer
            .send(
                &account.email,
                "Your password reset code",
                &format!(
                    "Your Savora password reset code is {code}. \
                     It expires in {RESET_CODE_TTL_MINUTES} minutes."
                ),
            )
            .await
        {
            tracing::error!("Failed to send password reset email: {e}");
        }

        Ok(())
    }

    /// Réinitialisation par code. Mise à jour du hash, consommation du code
    /// et révocation de toutes les sessions dans une seule transaction: un
    /// état partiel n'est jamais observable.
    pub fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if !PasswordManager::is_strong(new_password) {
            return Err(AppError::WeakPassword(
                "Password must be at least 8 characters with uppercase, lowercase and numbers"
                    .to_string(),
            ));
        }

        // Code invalide et compte inconnu produisent la même erreur
        let account =
            AccountRepository::find_by_email(email)?.ok_or(AppError::InvalidResetCode)?;

        let reset_token = PasswordResetTokenRepository::find_valid(account.id, code)?
            .ok_or(AppError::InvalidResetCode)?;

        let new_password_hash = PasswordManager::hash(new_password)?;

        let mut conn = get_connection()?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            AccountRepository::update_password_with(conn, account.id, &new_password_hash)?;
            PasswordResetTokenRepository::mark_used_with(conn, reset_token.id)?;
            AuthTokenRepository::invalidate_all_with(conn, account.id)?;
            Ok(())
        })?;

        Ok(())
    }

    /// Verrouillage administratif: le compte passe Inactive et toutes ses
    /// sessions sont révoquées.
    pub fn lock_account(&self, account_id: Uuid) -> Result<AccountResponse, AppError> {
        let account = AccountRepository::set_status(account_id, AccountStatus::Inactive)?;
        self.tokens.revoke_all_for_account(account_id)?;
        Ok(account.into())
    }

    pub fn unlock_account(account_id: Uuid) -> Result<AccountResponse, AppError> {
        AccountRepository::set_status(account_id, AccountStatus::Active)
            .map(AccountResponse::from)
            .map_err(AppError::from)
    }

    // === Helpers ===

    fn open_session(&self, account: Account) -> Result<LoginResponse, AppError> {
        let issued = self.tokens.issue_tokens(account.id, account.role)?;

        AccountRepository::update_last_login(account.id)?;

        Ok(LoginResponse {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
            account: account.into(),
            expires_in: self.tokens.access_token_ttl_secs(),
        })
    }

    fn is_valid_email(email: &str) -> bool {
        email.contains('@') && email.contains('.') && email.len() > 5
    }

    fn generate_reset_code() -> String {
        format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtManager;
    use crate::db::connection::init_test_pool;
    use crate::providers::ProviderError;
    use crate::providers::oauth::OAuthIdentity;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockOAuth {
        identity: OAuthIdentity,
    }

    #[async_trait]
    impl OAuthProvider for MockOAuth {
        async fn exchange_code(&self, _code: &str) -> Result<OAuthIdentity, ProviderError> {
            Ok(self.identity.clone())
        }
    }

    #[derive(Default)]
    struct MockMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl EmailProvider for MockMailer {
        async fn send(&self, to: &str, _subject: &str, body: &str) -> Result<(), ProviderError> {
            self.sent
                .lock()
                .expect("mailer mutex")
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn service() -> (Arc<MockMailer>, AuthService) {
        let mailer = Arc::new(MockMailer::default());
        let service = AuthService::new(
            TokenService::new(JwtManager::new("auth_service_test_secret", 15), 14),
            Arc::new(MockOAuth {
                identity: OAuthIdentity {
                    provider_account_id: format!("oauth_{}", Uuid::new_v4()),
                    email: format!("oauth_{}@example.com", Uuid::new_v4()),
                    display_name: Some("Social User".to_string()),
                },
            }),
            mailer.clone(),
            false,
        );
        (mailer, service)
    }

    fn test_register_request() -> RegisterRequest {
        init_test_pool();

        let unique = Uuid::new_v4();
        RegisterRequest {
            email: format!("test+{unique}@example.com"),
            username: format!("testaccount_{unique}"),
            password: "TestPassword123!".to_string(),
        }
    }

    fn cleanup(account_id: Uuid) {
        let _ = AuthTokenRepository::delete_for_account(account_id);
        let _ = PasswordResetTokenRepository::delete_for_account(account_id);
        let _ = AccountRepository::delete(account_id);
    }

    #[test]
    fn reset_codes_are_six_digits() {
        for _ in 0..32 {
            let code = AuthService::generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn email_validation_rejects_garbage() {
        assert!(AuthService::is_valid_email("user@example.com"));
        assert!(!AuthService::is_valid_email("invalid-email"));
        assert!(!AuthService::is_valid_email("a@b"));
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn register_fails_when_email_already_exists() {
        let register_request = test_register_request();

        let first = AuthService::register(register_request.clone())
            .expect("First registration should succeed");

        let second = AuthService::register(register_request);
        assert!(matches!(
            second.unwrap_err(),
            AppError::EmailAlreadyRegistered
        ));

        cleanup(first.id);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn login_succeeds_with_valid_credentials() {
        let register_request = test_register_request();
        let email = register_request.email.clone();
        let password = register_request.password.clone();

        AuthService::register(register_request).expect("Registration should succeed");

        let (_, service) = service();
        let login_request = LoginRequest {
            email: email.clone(),
            password,
        };

        let response = service.login(&login_request).expect("Login should succeed");
        assert_eq!(response.account.email, email);
        assert!(!response.refresh_token.is_empty());

        cleanup(response.account.id);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn login_fails_with_wrong_password() {
        let register_request = test_register_request();
        let email = register_request.email.clone();
        let created = AuthService::register(register_request).expect("Registration should succeed");

        let (_, service) = service();
        let login_request = LoginRequest {
            email,
            password: "WrongPassword123!".to_string(),
        };

        let result = service.login(&login_request);
        assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));

        cleanup(created.id);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn change_password_invalidates_every_session() {
        let register_request = test_register_request();
        let email = register_request.email.clone();
        let password = register_request.password.clone();
        let created = AuthService::register(register_request).expect("Registration should succeed");

        let (_, service) = service();

        // Two concurrent sessions
        for _ in 0..2 {
            service
                .login(&LoginRequest {
                    email: email.clone(),
                    password: password.clone(),
                })
                .expect("login");
        }
        assert_eq!(
            AuthTokenRepository::count_valid_for(created.id).expect("count"),
            2
        );

        AuthService::change_password(created.id, &password, "NewPassword456!")
            .expect("Change password should succeed");

        assert_eq!(
            AuthTokenRepository::count_valid_for(created.id).expect("count"),
            0,
            "every device must re-authenticate after a password change"
        );

        cleanup(created.id);
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn forgot_password_is_silent_for_unknown_email() {
        init_test_pool();
        let (mailer, service) = service();

        let result = tokio::runtime::Runtime::new()
            .expect("runtime")
            .block_on(service.forgot_password("nobody_here_12345@example.com"));

        assert!(result.is_ok(), "unknown email must not be revealed");
        assert!(mailer.sent.lock().expect("mailer mutex").is_empty());
    }

    #[test]
    #[ignore = "requires a running Postgres"]
    fn reset_password_consumes_code_and_sessions() {
        let register_request = test_register_request();
        let email = register_request.email.clone();
        let password = register_request.password.clone();
        let created = AuthService::register(register_request).expect("Registration should succeed");

        let (mailer, service) = service();
        let runtime = tokio::runtime::Runtime::new().expect("runtime");

        // Open a session, then request a reset code
        service
            .login(&LoginRequest {
                email: email.clone(),
                password,
            })
            .expect("login");
        runtime
            .block_on(service.forgot_password(&email))
            .expect("forgot password");

        let code = {
            let sent = mailer.sent.lock().expect("mailer mutex");
            let body = &sent.last().expect("an email was sent").1;
            body.chars().filter(|c| c.is_ascii_digit()).take(6).collect::<String>()
        };

        service
            .reset_password(&email, &code, "FreshPassword789!")
            .expect("reset should succeed");

        // Sessions are gone, the code is spent
        assert_eq!(
            AuthTokenRepository::count_valid_for(created.id).expect("count"),
            0
        );
        let replay = service.reset_password(&email, &code, "AnotherPassword1!");
        assert!(matches!(replay.unwrap_err(), AppError::InvalidResetCode));

        cleanup(created.id);
    }
}
