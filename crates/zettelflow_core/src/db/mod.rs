//! SQLite persistence behind `SqliteVaultStore`.
//!
//! Vault entries live in one `vault_entries` table; its schema version is
//! the connection's `PRAGMA user_version`. Connections handed out by
//! [`open_db`] are migrated before any entry is touched.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a vault database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a build with a newer vault schema.
    SchemaTooNew { found: u32, supported: u32 },
    /// One migration step failed; the whole batch was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl DbError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "vault_db_sqlite",
            Self::SchemaTooNew { .. } => "vault_schema_too_new",
            Self::Migration { .. } => "vault_migration_failed",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "vault database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "vault schema version {found} is newer than supported {supported}"
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "vault migration {version} ({name}) failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn errors_carry_codes_and_sources() {
        let too_new = DbError::SchemaTooNew {
            found: 4,
            supported: 1,
        };
        assert_eq!(too_new.code(), "vault_schema_too_new");
        assert_eq!(
            too_new.to_string(),
            "vault schema version 4 is newer than supported 1"
        );
        assert!(too_new.source().is_none());

        let failed = DbError::Migration {
            version: 1,
            name: "vault_entries",
            source: rusqlite::Error::InvalidQuery,
        };
        assert_eq!(failed.code(), "vault_migration_failed");
        assert!(failed.to_string().starts_with("vault migration 1 (vault_entries) failed"));
        assert!(failed.source().is_some());
    }
}
