use crate::schema::credentials;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ACCESS_KEY: &str = "access_token";
pub const REFRESH_KEY: &str = "refresh_token";

/// Access and refresh credential, always stored and cleared together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
}

impl Credentials {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Same refresh credential, new access credential.
    pub fn with_access(&self, access: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: self.refresh.clone(),
        }
    }

    pub(crate) fn into_rows(self, now: i64) -> [CredentialRow; 2] {
        [
            CredentialRow {
                key: ACCESS_KEY.to_string(),
                value: self.access,
                updated_at: now,
            },
            CredentialRow {
                key: REFRESH_KEY.to_string(),
                value: self.refresh,
                updated_at: now,
            },
        ]
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = credentials)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CredentialRow {
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_access_keeps_refresh() {
        let pair = Credentials::new("a1", "r1");
        let renewed = pair.with_access("a2");
        assert_eq!(renewed.access, "a2");
        assert_eq!(renewed.refresh, "r1");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = Credentials::new("secret-access", "secret-refresh");
        let printed = format!("{pair:?}");
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn test_rows_use_fixed_keys() {
        let rows = Credentials::new("a", "r").into_rows(7);
        assert_eq!(rows[0].key, ACCESS_KEY);
        assert_eq!(rows[0].value, "a");
        assert_eq!(rows[1].key, REFRESH_KEY);
        assert_eq!(rows[1].updated_at, 7);
    }
}
