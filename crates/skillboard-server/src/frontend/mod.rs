//! Front-end delivery for requests no API route claims.
//!
//! The variant is chosen once at startup from [`FrontendConfig::dev`]:
//! development proxies to a locally running dev server, production serves
//! the built assets from disk.

mod proxy;
mod static_files;

pub use proxy::ProxyDelivery;
pub use static_files::StaticDelivery;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, response::Response};
use serde::Deserialize;
use tracing::{info, warn};

/// Serves everything outside the API
#[async_trait]
pub trait FrontendDelivery: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &'static str;

    async fn serve(&self, request: Request) -> Response;
}

/// Front-end delivery settings
#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    /// Proxy to the dev server instead of serving static files
    #[serde(default)]
    pub dev: bool,
    #[serde(default = "default_dev_server_url")]
    pub dev_server_url: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_dev_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("../frontend/build")
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dev: false,
            dev_server_url: default_dev_server_url(),
            static_dir: default_static_dir(),
        }
    }
}

impl FrontendConfig {
    /// Build the delivery selected by this configuration
    pub fn delivery(&self) -> anyhow::Result<Arc<dyn FrontendDelivery>> {
        if self.dev {
            info!(
                "Running in development mode, proxying to frontend dev server at {}",
                self.dev_server_url
            );
            Ok(Arc::new(ProxyDelivery::new(&self.dev_server_url)?))
        } else {
            if !self.static_dir.is_dir() {
                warn!(
                    "Static asset directory {} does not exist",
                    self.static_dir.display()
                );
            }
            info!("Serving frontend from {}", self.static_dir.display());
            Ok(Arc::new(StaticDelivery::new(&self.static_dir)))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_selection() {
        let prod = FrontendConfig::default();
        assert_eq!(prod.delivery().unwrap().name(), "static");

        let dev = FrontendConfig {
            dev: true,
            ..FrontendConfig::default()
        };
        assert_eq!(dev.delivery().unwrap().name(), "proxy");
    }

    #[test]
    fn test_defaults_from_empty_section() {
        let config: FrontendConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.dev);
        assert_eq!(config.dev_server_url, "http://localhost:3000");
        assert_eq!(config.static_dir, PathBuf::from("../frontend/build"));
    }
}
