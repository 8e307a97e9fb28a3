//! Per-request logging.
//!
//! Every request produces two separate events: a raw dump of the request
//! before the handler runs, and an access summary after it returns.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{header::USER_AGENT, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use tracing::info;

/// Target of the raw request dump
pub const DUMP_TARGET: &str = "skillboard::request_dump";

/// Target of the post-request summary
pub const ACCESS_TARGET: &str = "skillboard::access";

/// Largest request body buffered for the dump, same as axum's default body limit
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "-".to_string(), |ConnectInfo(addr)| addr.to_string());
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let (parts, body) = request.into_parts();
    let response = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => {
            info!(target: DUMP_TARGET, "{}", dump_request(&parts, &bytes));
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(err) => {
            info!(target: DUMP_TARGET, "{}", dump_request(&parts, &[]));
            let status = if is_length_limit(&err) {
                StatusCode::PAYLOAD_TOO_LARGE
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, format!("Failed to read request body: {}", err)).into_response()
        }
    };

    info!(
        target: ACCESS_TARGET,
        remote_addr = %remote_addr,
        method = %method,
        path = %uri,
        user_agent = %user_agent,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}

fn is_length_limit(err: &axum::Error) -> bool {
    std::error::Error::source(err).is_some_and(|source| source.is::<LengthLimitError>())
}

/// Render a request as text: request line, headers, blank line, body
pub fn dump_request(parts: &Parts, body: &[u8]) -> String {
    let mut dump = format!("{} {} {:?}\n", parts.method, parts.uri, parts.version);
    for (name, value) in &parts.headers {
        dump.push_str(name.as_str());
        dump.push_str(": ");
        dump.push_str(&String::from_utf8_lossy(value.as_bytes()));
        dump.push('\n');
    }
    dump.push('\n');
    dump.push_str(&String::from_utf8_lossy(body));
    dump
}
