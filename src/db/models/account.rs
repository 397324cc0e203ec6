use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use std::io::Write;
use uuid::Uuid;

use crate::auth::role::Role;
use crate::db::schema::accounts;
use savora_api::AccountResponse;

/// Statut d'un compte. `Inactive` = verrouillé par un administrateur.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl ToSql<Text, Pg> for AccountStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for AccountStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match std::str::from_utf8(bytes.as_bytes())? {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            other => Err(format!("Unknown account status: {other}").into()),
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub status: AccountStatus,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub oauth_provider_id: Option<String>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub status: AccountStatus,
    pub role: Role,
    pub avatar_url: Option<String>,
    #[allow(dead_code)]
    pub oauth_provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[allow(dead_code)]
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            email: account.email,
            username: account.username,
            role: account.role.as_str().to_string(),
            status: account.status.as_str().to_string(),
            avatar_url: account.avatar_url,
            created_at: account.created_at,
        }
    }
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = accounts)]
pub struct UpdateAccount {
    pub username: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub status: Option<AccountStatus>,
    pub oauth_provider_id: Option<Option<String>>,
    pub last_login_at: Option<Option<DateTime<Utc>>>,
}
