use crate::config::Config;
use anyhow::{Context, Result};
use skillboard_persistence::{Database, MigrationSource, SchemaMigrator};
use skillboard_server::HttpServer;

use tokio::signal;
use tracing::{error, info};

/// Gateway service - main orchestrator
pub struct GatewayService {
    config: Config,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the gateway service
    ///
    /// Every step before `serve` is fatal: the listener never starts on an
    /// unopened store or a partially migrated schema.
    pub async fn run(self) -> Result<()> {
        skillboard_logging::init_logging(&self.config.logging.level, self.config.logging.format)?;
        info!("Starting Skillboard Gateway Service");

        let database = Database::open(&self.config.database.path)
            .await
            .context("Couldn't open database")?;

        let source = MigrationSource::parse(&self.config.migrations.source);
        info!("Migration source: {:?}", source);
        let migrations = source.load().context("Can't load migrations")?;
        SchemaMigrator::new(migrations)
            .with_target(self.config.migrations.target_version)
            .run(&database)
            .await
            .context("Can't run migrations")?;

        let frontend = self
            .config
            .frontend
            .delivery()
            .context("Can't set up frontend delivery")?;
        info!("Frontend delivery: {}", frontend.name());

        let server = HttpServer::bind(&self.config.server, database, frontend).await?;
        server.serve(shutdown_signal()).await?;

        info!("Gateway service stopped");
        Ok(())
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Received shutdown signal");
}
