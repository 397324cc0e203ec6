use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Rôle d'un compte. Enumération fermée: tout nouveau rôle doit être ajouté
/// ici, jamais comparé via des chaînes libres.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum Role {
    Customer,
    Enterprise,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Enterprise => "Enterprise",
            Self::Admin => "Admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Self::Customer),
            "Enterprise" => Ok(Self::Enterprise),
            "Admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

impl ToSql<Text, Pg> for Role {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Role {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let s = std::str::from_utf8(bytes.as_bytes())?;
        s.parse::<Role>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::Role;
    use std::str::FromStr;

    #[test]
    fn as_str_round_trips_through_from_str() {
        for role in [Role::Customer, Role::Enterprise, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn from_str_rejects_unknown_role() {
        assert!(Role::from_str("SuperAdmin").is_err());
        assert!(Role::from_str("customer").is_err(), "comparison is exact, not case-folded");
    }

    #[test]
    fn serde_uses_variant_names() {
        let json = serde_json::to_string(&Role::Enterprise).unwrap();
        assert_eq!(json, "\"Enterprise\"");

        let back: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(back, Role::Admin);
    }
}
