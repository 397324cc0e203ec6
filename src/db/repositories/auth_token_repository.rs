use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::auth_token::{AuthToken, NewAuthToken};
use crate::db::schema::auth_tokens;
use chrono::Utc;
use diesel::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

pub struct AuthTokenRepository;

impl AuthTokenRepository {
    pub fn create(new_auth_token: &NewAuthToken) -> Result<AuthToken, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(auth_tokens::table)
            .values(new_auth_token)
            .get_result::<AuthToken>(&mut conn)
            .map_err(Into::into)
    }

    /// Cherche une ligne valide (non révoquée, non expirée) pour ce compte
    /// et ce refresh token. Un échec de lookup n'est jamais une erreur.
    pub fn find_valid(
        account_id: Uuid,
        refresh_token: &str,
    ) -> Result<Option<AuthToken>, RepositoryError> {
        let mut conn = get_connection()?;

        auth_tokens::table
            .filter(auth_tokens::account_id.eq(account_id))
            .filter(auth_tokens::refresh_token.eq(refresh_token))
            .filter(auth_tokens::is_valid.eq(true))
            .filter(auth_tokens::expires_at.gt(Utc::now()))
            .first::<AuthToken>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Retrouve la ligne valide portant ce refresh token, tous comptes
    /// confondus (endpoint refresh: seul le cookie est présenté).
    pub fn find_valid_by_token(
        refresh_token: &str,
    ) -> Result<Option<AuthToken>, RepositoryError> {
        let mut conn = get_connection()?;

        auth_tokens::table
            .filter(auth_tokens::refresh_token.eq(refresh_token))
            .filter(auth_tokens::is_valid.eq(true))
            .filter(auth_tokens::expires_at.gt(Utc::now()))
            .first::<AuthToken>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Révoque un refresh token: `is_valid = false`, `revoked_at` horodaté.
    /// Idempotent: révoquer un token déjà invalide ou inconnu touche 0 ligne.
    pub fn revoke(account_id: Uuid, refresh_token: &str) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            auth_tokens::table
                .filter(auth_tokens::account_id.eq(account_id))
                .filter(auth_tokens::refresh_token.eq(refresh_token))
                .filter(auth_tokens::is_valid.eq(true)),
        )
        .set((
            auth_tokens::is_valid.eq(false),
            auth_tokens::revoked_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    /// Invalide toutes les sessions d'un compte (verrouillage admin).
    pub fn invalidate_all(account_id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;
        Self::invalidate_all_with(&mut conn, account_id)
    }

    // Variante transactionnelle: utilisée par le changement/reset de mot de
    // passe pour committer la révocation avec la mise à jour du hash.
    pub fn invalidate_all_with(
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<(), RepositoryError> {
        diesel::update(
            auth_tokens::table
                .filter(auth_tokens::account_id.eq(account_id))
                .filter(auth_tokens::is_valid.eq(true)),
        )
        .set((
            auth_tokens::is_valid.eq(false),
            auth_tokens::revoked_at.eq(Utc::now()),
        ))
        .execute(conn)?;

        Ok(())
    }

    /// Nombre de sessions encore valides pour un compte
    pub fn count_valid_for(account_id: Uuid) -> Result<i64, RepositoryError> {
        let mut conn = get_connection()?;

        auth_tokens::table
            .filter(auth_tokens::account_id.eq(account_id))
            .filter(auth_tokens::is_valid.eq(true))
            .filter(auth_tokens::expires_at.gt(Utc::now()))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(Into::into)
    }

    pub fn delete_for_account(account_id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(auth_tokens::table.filter(auth_tokens::account_id.eq(account_id)))
            .execute(&mut conn)?;

        Ok(())
    }
}
