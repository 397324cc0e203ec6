use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

use crate::db::schema::password_reset_tokens;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = password_reset_tokens)]
pub struct NewPasswordResetToken {
    pub account_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

// All fields are required for Diesel Queryable deserialization (schema alignment).
#[allow(dead_code)]
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = password_reset_tokens)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub account_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}
