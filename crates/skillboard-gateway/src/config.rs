use config::builder::DefaultState;
use config::{ConfigBuilder, Map, Source};
use serde::Deserialize;
use skillboard_logging::LogFormat;
use skillboard_server::{FrontendConfig, HttpConfig};
use std::env;

/// Built-in defaults, the lowest configuration layer
const DEFAULT_CONFIG: &str = r#"
[server]
addr = "0.0.0.0:8080"

[database]
path = "skillboard.db"  # Set via DB_PATH env var

[migrations]
source = ""  # Empty uses the built-in migrations; set via MIGRATION_SOURCE_URL

[frontend]
dev = false  # Set via DEV=true
dev_server_url = "http://localhost:3000"
static_dir = "../frontend/build"

[logging]
level = "info"  # trace, debug, info, warn, error
format = "text"  # text or json
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MigrationsConfig {
    /// Directory path or `file://` URL; empty for the built-in set
    #[serde(default)]
    pub source: String,
    /// Stop at this version instead of the latest
    #[serde(default)]
    pub target_version: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: HttpConfig,
    pub database: DatabaseConfig,
    pub migrations: MigrationsConfig,
    pub frontend: FrontendConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with layered approach:
    /// 1. Built-in defaults
    /// 2. Local override: ./skillboard.toml (optional)
    /// 3. Environment variables with SKILLBOARD__ prefix
    /// 4. DB_PATH, DEV, MIGRATION_SOURCE_URL and SKILLBOARD_ADDR (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        Self::from_layers(
            config::File::with_name("skillboard").required(false),
            env::vars().collect(),
        )
    }

    /// Build from an explicit local file layer and environment snapshot
    fn from_layers<S>(local: S, vars: Map<String, String>) -> anyhow::Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let config_builder = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .add_source(local)
            .add_source(
                config::Environment::with_prefix("SKILLBOARD")
                    .separator("__")
                    .source(Some(vars.clone())),
            );

        let config: Self = apply_env(config_builder, |key| vars.get(key).cloned())?
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

/// Apply the deployment variables on top of every other layer
fn apply_env(
    mut config_builder: ConfigBuilder<DefaultState>,
    get: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ConfigBuilder<DefaultState>> {
    if let Some(path) = get("DB_PATH") {
        config_builder = config_builder.set_override("database.path", path)?;
    }

    // Only the exact string "true" enables dev mode
    if let Some(dev) = get("DEV") {
        config_builder = config_builder.set_override("frontend.dev", dev == "true")?;
    }

    if let Some(source) = get("MIGRATION_SOURCE_URL") {
        config_builder = config_builder.set_override("migrations.source", source)?;
    }

    if let Some(addr) = get("SKILLBOARD_ADDR") {
        config_builder = config_builder.set_override("server.addr", addr)?;
    }

    Ok(config_builder)
}
