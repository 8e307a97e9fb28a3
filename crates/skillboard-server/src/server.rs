use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{extract::ConnectInfo, Router};
use hyper::{body::Incoming, server::conn::http1};
use hyper_util::{rt::TokioIo, service::TowerToHyperService};
use serde::Deserialize;
use skillboard_persistence::Database;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tower::ServiceExt;
use tracing::{debug, info, warn};

use crate::frontend::FrontendDelivery;
use crate::router::build_router;
use crate::state::AppState;

/// Upper bound on draining in-flight requests after a shutdown signal
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

/// HTTP server owning the bound listener and the store handle
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
    database: Database,
}

impl HttpServer {
    /// Bind the listener and assemble the router around the injected dependencies
    pub async fn bind(
        config: &HttpConfig,
        database: Database,
        frontend: Arc<dyn FrontendDelivery>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(&config.addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {}", config.addr))?;

        let router = build_router(AppState::new(database.skills(), frontend));

        Ok(Self {
            listener,
            router,
            database,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, drain for at most [`SHUTDOWN_TIMEOUT`],
    /// then close the store.
    ///
    /// Connections still busy when the drain window expires are aborted
    /// together with their in-flight handlers before the store is closed.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!("Starting HTTP server on {}", addr);

        let (drain_tx, _) = watch::channel(false);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        connections.spawn(serve_connection(
                            stream,
                            peer_addr,
                            self.router.clone(),
                            drain_tx.subscribe(),
                        ));
                    }
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        // Stop accepting before draining.
        drop(self.listener);

        info!(
            "Shutting down, draining {} connection(s) for up to {:?}",
            connections.len(),
            SHUTDOWN_TIMEOUT
        );
        drain_tx.send_replace(true);

        let drained = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                "Graceful shutdown timed out, terminating {} connection(s)",
                connections.len()
            );
            connections.shutdown().await;
        }

        // No handler can touch the store any more.
        self.database.close().await;
        info!("HTTP server stopped");

        Ok(())
    }
}

/// Drive one HTTP/1 connection until it ends or the drain signal fires.
///
/// On drain the connection finishes the request in progress and then closes;
/// idle keep-alive connections close right away.
async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: Router,
    mut drain: watch::Receiver<bool>,
) {
    let service = TowerToHyperService::new(tower::service_fn(
        move |mut request: axum::http::Request<Incoming>| {
            request.extensions_mut().insert(ConnectInfo(peer_addr));
            router.clone().oneshot(request)
        },
    ));

    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        _ = drain.changed() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };

    if let Err(e) = result {
        debug!(%peer_addr, error = %e, "HTTP connection ended with error");
    }
}
