use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::account::{Account, AccountStatus, NewAccount, UpdateAccount};
use crate::db::schema::accounts;
use diesel::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

pub struct AccountRepository;

impl AccountRepository {
    pub fn find_by_email(email: &str) -> Result<Option<Account>, RepositoryError> {
        let mut conn = get_connection()?;

        accounts::table
            .filter(accounts::email.eq(email))
            .first::<Account>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Trouver un compte par ID
    pub fn find_by_id(id: Uuid) -> Result<Option<Account>, RepositoryError> {
        let mut conn = get_connection()?;

        accounts::table
            .filter(accounts::id.eq(id))
            .first::<Account>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Trouver un compte lié à un identifiant OAuth
    pub fn find_by_oauth_provider_id(
        provider_id: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let mut conn = get_connection()?;

        accounts::table
            .filter(accounts::oauth_provider_id.eq(provider_id))
            .first::<Account>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Créer un nouveau compte
    pub fn create(new_account: &NewAccount) -> Result<Account, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(accounts::table)
            .values(new_account)
            .get_result::<Account>(&mut conn)
            .map_err(Into::into)
    }

    /// Mettre à jour le dernier login
    pub fn update_last_login(id: Uuid) -> Result<(), RepositoryError> {
        let changes = UpdateAccount {
            last_login_at: Some(Some(chrono::Utc::now())),
            ..Default::default()
        };
        Self::update(id, &changes)?;
        Ok(())
    }

    /// Mettre à jour un compte (profil, statut, oauth)
    pub fn update(id: Uuid, changes: &UpdateAccount) -> Result<Account, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(accounts::table.filter(accounts::id.eq(id)))
            .set(changes)
            .get_result::<Account>(&mut conn)
            .map_err(Into::into)
    }

    /// Verrouiller / déverrouiller un compte
    pub fn set_status(id: Uuid, status: AccountStatus) -> Result<Account, RepositoryError> {
        let changes = UpdateAccount {
            status: Some(status),
            ..Default::default()
        };
        Self::update(id, &changes)
    }

    /// Lister les comptes (back-office)
    pub fn list(limit: i64) -> Result<Vec<Account>, RepositoryError> {
        let mut conn = get_connection()?;

        accounts::table
            .order_by(accounts::created_at.desc())
            .limit(limit)
            .load::<Account>(&mut conn)
            .map_err(Into::into)
    }

    // Variante transactionnelle: le changement de mot de passe doit être
    // committé avec la révocation des sessions.
    pub fn update_password_with(
        conn: &mut PgConnection,
        id: Uuid,
        new_password_hash: &str,
    ) -> Result<(), RepositoryError> {
        diesel::update(accounts::table.filter(accounts::id.eq(id)))
            .set(accounts::password_hash.eq(new_password_hash))
            .execute(conn)?;

        Ok(())
    }

    /// Supprimer un compte
    pub fn delete(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(accounts::table.filter(accounts::id.eq(id))).execute(&mut conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::role::Role;
    use crate::db::connection::init_test_pool;

    pub(crate) fn test_account(suffix: &str) -> NewAccount {
        init_test_pool();

        NewAccount {
            email: format!("test_{}_{}@example.com", suffix, Uuid::new_v4()),
            username: format!("testaccount_{}", suffix),
            password_hash: Some("test_hash".to_string()),
            status: AccountStatus::Active,
            role: Role::Customer,
            avatar_url: None,
            oauth_provider_id: None,
        }
    }

    // ============================================
    // Test 1: Créer un compte
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_create_account_success() {
        let new_account = test_account("create");

        let result = AccountRepository::create(&new_account);

        assert!(result.is_ok(), "Should create account successfully");
        let created = result.unwrap();
        assert_eq!(created.email, new_account.email);
        assert_eq!(created.role, Role::Customer);
        assert_eq!(created.status, AccountStatus::Active);

        // Cleanup
        let _ = AccountRepository::delete(created.id);
    }

    // ============================================
    // Test 2: Trouver par email
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_find_by_email_success() {
        let new_account = test_account("find_email");
        let created = AccountRepository::create(&new_account).expect("Failed to create account");

        let result = AccountRepository::find_by_email(&new_account.email);

        assert!(result.is_ok(), "Should find account by email");
        let found = result.unwrap();
        assert!(found.is_some(), "Account should exist");
        assert_eq!(found.unwrap().id, created.id);

        // Cleanup
        let _ = AccountRepository::delete(created.id);
    }

    // ============================================
    // Test 3: Email non existant
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_find_by_email_not_found() {
        init_test_pool();
        let result = AccountRepository::find_by_email("nonexistent_email_12345@example.com");

        assert!(result.is_ok(), "Query should succeed even if account not found");
        assert!(result.unwrap().is_none(), "Account should not exist");
    }

    // ============================================
    // Test 4: Verrouillage d'un compte
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_set_status_locks_account() {
        let new_account = test_account("lock");
        let created = AccountRepository::create(&new_account).expect("Failed to create account");

        let locked = AccountRepository::set_status(created.id, AccountStatus::Inactive)
            .expect("Should update status");
        assert_eq!(locked.status, AccountStatus::Inactive);
        assert!(!locked.is_active());

        let unlocked = AccountRepository::set_status(created.id, AccountStatus::Active)
            .expect("Should update status");
        assert!(unlocked.is_active());

        // Cleanup
        let _ = AccountRepository::delete(created.id);
    }

    // ============================================
    // Test 5: Update password (variante transactionnelle)
    // ============================================
    #[test]
    #[ignore = "requires a running Postgres"]
    fn test_update_password_with_connection() {
        let new_account = test_account("update_pw");
        let created = AccountRepository::create(&new_account).expect("Failed to create account");

        let mut conn = get_connection().expect("connection");
        AccountRepository::update_password_with(&mut conn, created.id, "new_hash")
            .expect("Should update password");

        let updated = AccountRepository::find_by_id(created.id)
            .expect("find")
            .expect("exists");
        assert_eq!(updated.password_hash.as_deref(), Some("new_hash"));

        // Cleanup
        let _ = AccountRepository::delete(created.id);
    }
}
