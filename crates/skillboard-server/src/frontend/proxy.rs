use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::FrontendDelivery;

/// Reverse proxy to the front-end dev server
pub struct ProxyDelivery {
    http_client: reqwest::Client,
    target_url: String,
}

impl ProxyDelivery {
    pub fn new(target_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            http_client: reqwest::Client::builder().build()?,
            target_url: target_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FrontendDelivery for ProxyDelivery {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn serve(&self, request: Request) -> Response {
        debug!("Proxying request to frontend dev server");

        let (parts, body) = request.into_parts();
        let path = parts
            .uri
            .path_and_query()
            .map_or("/", |pq| pq.as_str());

        let body = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read request body: {}", err),
                )
                    .into_response();
            }
        };

        let url = format!("{}{}", self.target_url, path);
        let mut upstream = self
            .http_client
            .request(parts.method, url)
            .headers(filter_headers(&parts.headers));
        if !body.is_empty() {
            upstream = upstream.body(body);
        }

        match upstream.send().await {
            Ok(response) => build_response(response).await,
            Err(err) => (
                StatusCode::BAD_GATEWAY,
                format!("Failed to reach frontend dev server: {}", err),
            )
                .into_response(),
        }
    }
}

async fn build_response(response: reqwest::Response) -> Response {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            return (
                StatusCode::BAD_GATEWAY,
                format!("Failed to read frontend dev server response: {}", err),
            )
                .into_response();
        }
    };

    let mut builder = Response::builder().status(status);
    if let Some(header_map) = builder.headers_mut() {
        for (name, value) in headers.iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            header_map.append(name, value.clone());
        }
    }

    builder
        .body(Body::from(bytes))
        .unwrap_or_else(|_| (StatusCode::BAD_GATEWAY, "Failed to build response").into_response())
}

fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in headers.iter() {
        if is_hop_by_hop(name.as_str()) || name == header::HOST || name == header::CONTENT_LENGTH {
            continue;
        }
        filtered.append(name, value.clone());
    }
    filtered
}

fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
