use std::path::Path;

use async_trait::async_trait;
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use super::FrontendDelivery;

/// Serves the built front-end from a directory; `/` maps to `index.html`
pub struct StaticDelivery {
    dir: ServeDir,
}

impl StaticDelivery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: ServeDir::new(root.as_ref()),
        }
    }
}

#[async_trait]
impl FrontendDelivery for StaticDelivery {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn serve(&self, request: Request) -> Response {
        match self.dir.clone().oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        }
    }
}
