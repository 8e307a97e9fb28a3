//! Error types for persistence operations

use std::path::PathBuf;
use thiserror::Error;

/// Store and repository errors
///
/// The display strings are sent verbatim to HTTP clients on 500 responses.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Store could not be opened
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to query skill: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Failed to insert skill: {0}")]
    Insert(#[source] sqlx::Error),

    /// The row just inserted could not be read back
    #[error("Failed to lookup new skill: {0}")]
    Lookup(#[source] sqlx::Error),

    #[error("Failed to delete skill: {0}")]
    Delete(#[source] sqlx::Error),
}

/// Schema migration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Migration directory missing or unreadable
    #[error("Migration source '{path}' unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File that looks like a migration but has no usable version prefix
    #[error("Invalid migration file name '{0}'")]
    InvalidFileName(String),

    #[error("Duplicate migration version {0}")]
    DuplicateVersion(u32),

    #[error("Target version {target} not found in migration source (latest is {latest})")]
    TargetUnavailable { target: u32, latest: u32 },

    /// The store was migrated by a newer build
    #[error("Database schema version {current} is ahead of target version {target}")]
    SchemaAhead { current: u32, target: u32 },

    #[error("Can't get DB version: {0}")]
    ReadVersion(#[source] sqlx::Error),

    /// `schema_migrations` holds a version no migration could have written
    #[error("Recorded schema version {0} is invalid")]
    InvalidVersion(i64),

    #[error("Failed to apply migration {version} ({name}): {source}")]
    Apply {
        version: u32,
        name: String,
        #[source]
        source: sqlx::Error,
    },
}
