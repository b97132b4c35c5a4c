use crate::errors::StoreError;
use crate::models::credentials::{CredentialRow, Credentials, ACCESS_KEY, REFRESH_KEY};
use crate::schema::credentials;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// Durable home of the credential pair.
///
/// Backed by a SQLite file so a signed-in session survives restarts. The
/// store never inspects the tokens it holds.
#[derive(Clone)]
pub struct SessionStore {
    pool: DbPool,
}

impl SessionStore {
    /// Open (or create) the store at `database_url` and run pending migrations.
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = r2d2::Pool::builder().build(manager)?;
        Self::from_pool(pool)
    }

    pub fn from_pool(pool: DbPool) -> Result<Self, StoreError> {
        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        tracing::debug!("Credential store ready");
        Ok(Self { pool })
    }

    /// Current credential pair, or `None` when signed out.
    pub fn get(&self) -> Result<Option<Credentials>, StoreError> {
        let mut conn = self.pool.get()?;
        let rows = credentials::table
            .filter(credentials::key.eq_any([ACCESS_KEY, REFRESH_KEY]))
            .select(CredentialRow::as_select())
            .load(&mut conn)?;

        let mut access = None;
        let mut refresh = None;
        for row in rows {
            match row.key.as_str() {
                ACCESS_KEY => access = Some(row.value),
                REFRESH_KEY => refresh = Some(row.value),
                _ => {}
            }
        }

        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(Some(Credentials { access, refresh })),
            (None, None) => Ok(None),
            _ => {
                tracing::warn!("Incomplete credential pair in storage, treating as signed out");
                Ok(None)
            }
        }
    }

    /// Overwrite both credentials in one transaction.
    pub fn set(&self, pair: &Credentials) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        let rows = pair.clone().into_rows(Utc::now().timestamp());

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            for row in &rows {
                diesel::replace_into(credentials::table)
                    .values(row)
                    .execute(conn)?;
            }
            Ok(())
        })?;

        tracing::debug!("Stored credential pair");
        Ok(())
    }

    /// Remove both credentials.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        let removed = diesel::delete(
            credentials::table.filter(credentials::key.eq_any([ACCESS_KEY, REFRESH_KEY])),
        )
        .execute(&mut conn)?;

        tracing::debug!(removed, "Cleared credential pair");
        Ok(())
    }

    pub fn is_signed_in(&self) -> Result<bool, StoreError> {
        Ok(self.get()?.is_some())
    }
}
