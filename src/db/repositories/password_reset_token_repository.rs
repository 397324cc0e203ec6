use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::password_reset_token::{NewPasswordResetToken, PasswordResetToken};
use crate::db::schema::password_reset_tokens;
use chrono::Utc;
use diesel::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

pub struct PasswordResetTokenRepository;

impl PasswordResetTokenRepository {
    /// Cherche un code valide (non utilisé, non expiré) pour ce compte.
    pub fn find_valid(
        account_id: Uuid,
        code: &str,
    ) -> Result<Option<PasswordResetToken>, RepositoryError> {
        let mut conn = get_connection()?;

        password_reset_tokens::table
            .filter(password_reset_tokens::account_id.eq(account_id))
            .filter(password_reset_tokens::code.eq(code))
            .filter(password_reset_tokens::used.eq(false))
            .filter(password_reset_tokens::expires_at.gt(Utc::now()))
            .first::<PasswordResetToken>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    // Invariant: au plus un code actionnable par compte. L'émission d'un
    // nouveau code consomme les précédents dans la même transaction.
    pub fn create_with(
        conn: &mut PgConnection,
        new_token: &NewPasswordResetToken,
    ) -> Result<PasswordResetToken, RepositoryError> {
        Self::consume_all_with(conn, new_token.account_id)?;

        diesel::insert_into(password_reset_tokens::table)
            .values(new_token)
            .get_result::<PasswordResetToken>(conn)
            .map_err(Into::into)
    }

    /// Marque un code comme utilisé (consommation après reset réussi).
    pub fn mark_used_with(conn: &mut PgConnection, id: Uuid) -> Result<(), RepositoryError> {
        diesel::update(password_reset_tokens::table.filter(password_reset_tokens::id.eq(id)))
            .set(password_reset_tokens::used.eq(true))
            .execute(conn)?;

        Ok(())
    }

    /// Consomme tous les codes encore valides d'un compte.
    pub fn consume_all_with(
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<(), RepositoryError> {
        diesel::update(
            password_reset_tokens::table
                .filter(password_reset_tokens::account_id.eq(account_id))
                .filter(password_reset_tokens::used.eq(false)),
        )
        .set(password_reset_tokens::used.eq(true))
        .execute(conn)?;

        Ok(())
    }

    pub fn delete_for_account(account_id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(
            password_reset_tokens::table
                .filter(password_reset_tokens::account_id.eq(account_id)),
        )
        .execute(&mut conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::role::Role;
    use crate::db::connection::init_test_pool;
    use crate::db::models::account::{AccountStatus, NewAccount};
    use crate::db::repositories::account_repository::AccountRepository;

    fn create_test_account() -> Uuid {
        init_test_pool();

        let new_account = NewAccount {
            email: format!("reset_test_{}@example.com", Uuid::new_v4()),
            username: format!("resetaccount_{}", Uuid::new_v4()),
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

    fn new_code(account_id: Uuid, code: &str) -> NewPasswordResetToken {
        NewPasswordResetToken {
            account_id,
            code: code.to_string(),
            expires_at: Utc::now() + chrono::Duration::minutes(15),
        }
    }

    // ============================================
    // Test 1: Créer puis retrouver un code valide
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_create_and_find_valid_code() {
        let account_id = create_test_account();
        let mut conn = get_connection().expect("connection");

        let created = PasswordResetTokenRepository::create_with(&mut conn, &new_code(account_id, "123456"))
            .expect("Should create reset code");
        assert!(!created.used);

        let found = PasswordResetTokenRepository::find_valid(account_id, "123456")
            .expect("Query should succeed")
            .expect("Code should be found");
        assert_eq!(found.id, created.id);

        // Cleanup
        let _ = PasswordResetTokenRepository::delete_for_account(account_id);
        let _ = AccountRepository::delete(account_id);
    }

    // ============================================
    // Test 2: Un nouveau code consomme les anciens
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_new_code_consumes_previous_ones() {
        let account_id = create_test_account();
        let mut conn = get_connection().expect("connection");

        PasswordResetTokenRepository::create_with(&mut conn, &new_code(account_id, "111111"))
            .expect("first code");
        PasswordResetTokenRepository::create_with(&mut conn, &new_code(account_id, "222222"))
            .expect("second code");

        let old = PasswordResetTokenRepository::find_valid(account_id, "111111")
            .expect("Query should succeed");
        assert!(old.is_none(), "Previous code should have been consumed");

        let fresh = PasswordResetTokenRepository::find_valid(account_id, "222222")
            .expect("Query should succeed");
        assert!(fresh.is_some(), "Latest code should be the only valid one");

        // Cleanup
        let _ = PasswordResetTokenRepository::delete_for_account(account_id);
        let _ = AccountRepository::delete(account_id);
    }

    // ============================================
    // Test 3: Un code utilisé n'est plus actionnable
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_used_code_is_not_found() {
        let account_id = create_test_account();
        let mut conn = get_connection().expect("connection");

        let created = PasswordResetTokenRepository::create_with(&mut conn, &new_code(account_id, "654321"))
            .expect("create code");
        PasswordResetTokenRepository::mark_used_with(&mut conn, created.id).expect("mark used");

        let found = PasswordResetTokenRepository::find_valid(account_id, "654321")
            .expect("Query should succeed");
        assert!(found.is_none(), "Used code should not be actionable");

        // Cleanup
        let _ = PasswordResetTokenRepository::delete_for_account(account_id);
        let _ = AccountRepository::delete(account_id);
    }
}
