//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, path decoding, route matching and access logging.

use crate::config::AppState;
use crate::handler::pages::{self, CALCULATOR_PATH, GREET_PATH};
use crate::handler::request::{decode_path, QueryParams, RequestContext};
use crate::handler::static_files;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let access_entry = state
        .access_log_enabled()
        .then(|| new_access_entry(&req, peer_addr));

    let response = dispatch(&req, &state).await;

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method();
    let is_head = *method == Method::HEAD;

    // 1. Only GET and HEAD are served
    if !matches!(*method, Method::GET | Method::HEAD) {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return static_files::serve_error(state, 405, false).await;
    }

    // 2. Decode path and query
    let Some(path) = decode_path(req.uri().path()) else {
        logger::log_warning(&format!("Undecodable request path: {}", req.uri().path()));
        return static_files::serve_error(state, 400, is_head).await;
    };
    let params = QueryParams::parse(req.uri().query());

    let ctx = RequestContext {
        path: &path,
        params: &params,
        is_head,
    };

    // 3. Dynamic pages, then static files
    match ctx.path {
        GREET_PATH => pages::greet(&ctx, state).await,
        CALCULATOR_PATH => pages::calculator(&ctx, state).await,
        _ => static_files::serve_static(&ctx, state).await,
    }
}

fn new_access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_str(req.version()).to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
