//! Skillboard Persistence - SQLite store, schema migrations and the skill repository

mod error;
mod migrations;
mod skills;

pub use error::{MigrationError, PersistenceError};
pub use migrations::{Migration, MigrationReport, MigrationSource, SchemaMigrator};
pub use skills::SkillRepository;
pub use sqlx::Error as SqlxError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Handle to the SQLite store
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database file at `database_path`
    pub async fn open(database_path: &str) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|source| PersistenceError::Open {
                path: database_path.to_string(),
                source,
            })?;

        info!("Database opened: {}", database_path);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository for the skill table
    pub fn skills(&self) -> SkillRepository {
        SkillRepository::new(self.pool.clone())
    }

    /// Close every connection; subsequent queries fail
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
