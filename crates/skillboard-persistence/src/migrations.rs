//! Versioned schema migrations
//!
//! The applied version is persisted in `schema_migrations`, one row per step.
//! Each step runs in its own transaction together with the insertion of its
//! marker row, so a failed step leaves the version where it was.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{Database, MigrationError};

const UP_SUFFIX: &str = ".up.sql";

const BUILTIN_MIGRATIONS: &[(u32, &str, &str)] = &[(
    1,
    "create_skill",
    include_str!("../migrations/1_create_skill.up.sql"),
)];

/// A single schema step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: u32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// Where migration steps come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationSource {
    /// Steps compiled into the binary
    Builtin,
    /// Directory of `<version>_<name>.up.sql` files
    Directory(PathBuf),
}

impl MigrationSource {
    /// Parse a configured location; empty means built-in, `file://` is optional
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.is_empty() {
            return MigrationSource::Builtin;
        }
        let path = location.strip_prefix("file://").unwrap_or(location);
        MigrationSource::Directory(PathBuf::from(path))
    }

    /// Load all steps, sorted ascending by version
    pub fn load(&self) -> Result<Vec<Migration>, MigrationError> {
        let migrations = match self {
            MigrationSource::Builtin => BUILTIN_MIGRATIONS
                .iter()
                .map(|(version, name, sql)| Migration::new(*version, *name, *sql))
                .collect(),
            MigrationSource::Directory(dir) => load_directory(dir)?,
        };
        sorted_unique(migrations)
    }
}

fn load_directory(dir: &Path) -> Result<Vec<Migration>, MigrationError> {
    let unavailable = |source: std::io::Error| MigrationError::SourceUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    let mut migrations = Vec::new();
    for entry in fs::read_dir(dir).map_err(unavailable)? {
        let path = entry.map_err(unavailable)?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = file_name.strip_suffix(UP_SUFFIX) else {
            debug!("Skipping non-up migration file: {}", file_name);
            continue;
        };

        let (version, name) = stem.split_once('_').unwrap_or((stem, ""));
        let version: u32 = version
            .parse()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| MigrationError::InvalidFileName(file_name.to_string()))?;

        let sql = fs::read_to_string(&path).map_err(unavailable)?;
        migrations.push(Migration::new(version, name, sql));
    }

    Ok(migrations)
}

fn sorted_unique(migrations: Vec<Migration>) -> Result<Vec<Migration>, MigrationError> {
    let mut by_version = BTreeMap::new();
    for migration in migrations {
        let version = migration.version;
        if by_version.insert(version, migration).is_some() {
            return Err(MigrationError::DuplicateVersion(version));
        }
    }
    Ok(by_version.into_values().collect())
}

/// Outcome of a migrator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub applied: Vec<u32>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applies pending migrations up to a target version
pub struct SchemaMigrator {
    migrations: Vec<Migration>,
    target: Option<u32>,
}

impl SchemaMigrator {
    /// `migrations` must already be sorted and unique, as returned by [`MigrationSource::load`]
    pub fn new(migrations: Vec<Migration>) -> Self {
        Self {
            migrations,
            target: None,
        }
    }

    /// Stop at `target` instead of the latest available version
    pub fn with_target(mut self, target: Option<u32>) -> Self {
        self.target = target;
        self
    }

    fn latest(&self) -> u32 {
        self.migrations.last().map_or(0, |m| m.version)
    }

    /// Read the version currently recorded in the store (0 if none)
    pub async fn current_version(pool: &SqlitePool) -> Result<u32, MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(MigrationError::ReadVersion)?;

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(pool)
                .await
                .map_err(MigrationError::ReadVersion)?;

        u32::try_from(version).map_err(|_| MigrationError::InvalidVersion(version))
    }

    /// Bring the store up to the target version
    pub async fn run(&self, db: &Database) -> Result<MigrationReport, MigrationError> {
        let pool = db.pool();
        let latest = self.latest();
        let target = self.target.unwrap_or(latest);
        if target > latest {
            return Err(MigrationError::TargetUnavailable { target, latest });
        }

        let current = Self::current_version(pool).await?;
        info!("DB version is {}", current);

        if current > target {
            return Err(MigrationError::SchemaAhead { current, target });
        }

        let mut applied = Vec::new();
        for migration in self
            .migrations
            .iter()
            .filter(|m| m.version > current && m.version <= target)
        {
            apply(pool, migration).await?;
            info!("Applied migration {} ({})", migration.version, migration.name);
            applied.push(migration.version);
        }

        if applied.is_empty() {
            info!("No migrations to run");
        }

        Ok(MigrationReport {
            from_version: current,
            to_version: applied.last().copied().unwrap_or(current),
            applied,
        })
    }
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<(), MigrationError> {
    let failed = |source: sqlx::Error| MigrationError::Apply {
        version: migration.version,
        name: migration.name.clone(),
        source,
    };

    let mut tx = pool.begin().await.map_err(failed)?;

    sqlx::raw_sql(&migration.sql)
        .execute(&mut *tx)
        .await
        .map_err(failed)?;

    sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
        .bind(i64::from(migration.version))
        .bind(&migration.name)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(failed)?;

    tx.commit().await.map_err(failed)
}
