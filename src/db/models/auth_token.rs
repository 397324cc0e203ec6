use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

use crate::db::schema::auth_tokens;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = auth_tokens)]
pub struct NewAuthToken {
    pub account_id: Uuid,
    pub refresh_token: String,
    pub is_valid: bool,
    pub expires_at: DateTime<Utc>,
}

/// Une ligne par refresh token émis. Les lignes sont invalidées, jamais
/// supprimées: `is_valid` passe à false et `revoked_at` est horodaté.
// All fields are required for Diesel Queryable deserialization (schema alignment).
#[allow(dead_code)]
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = auth_tokens)]
pub struct AuthToken {
    pub id: Uuid,
    pub account_id: Uuid,
    pub refresh_token: String,
    pub is_valid: bool,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
