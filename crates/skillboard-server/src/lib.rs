//! Skillboard HTTP server
//!
//! Routing, request logging, the skill API handlers, front-end delivery and
//! the listener lifecycle. All dependencies are injected through
//! [`HttpServer::bind`] or [`AppState::new`]; nothing here is process-global.

pub mod api;
pub mod frontend;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use frontend::{FrontendConfig, FrontendDelivery, ProxyDelivery, StaticDelivery};
pub use router::build_router;
pub use server::{HttpConfig, HttpServer, SHUTDOWN_TIMEOUT};
pub use state::AppState;
