//! HTTP response building module
//!
//! Every response carries `Server`, `Content-Type`, `Content-Length` and
//! `Connection: close`; one request is served per connection.

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::time::SystemTime;

/// Reason phrase for the status codes this server emits
pub const fn status_message(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown Status",
    }
}

/// Format a timestamp as an RFC 7231 HTTP-date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Build 200 response for a file body
pub fn build_file_response(
    data: Vec<u8>,
    content_type: &str,
    last_modified: SystemTime,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(data) };

    Response::builder()
        .status(200)
        .header("Server", server_name)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Last-Modified", http_date(last_modified))
        .header("Connection", "close")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 response for a rendered page
pub fn build_html_response(
    content: String,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(200)
        .header("Server", server_name)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .header("Connection", "close")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build an error response
///
/// `page` is a custom error page (served as HTML); without one the body is
/// the plain-text status line, e.g. `404 Not Found`.
pub fn build_error_response(
    status: u16,
    page: Option<Vec<u8>>,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let (content_type, data) = match page {
        Some(html) => ("text/html", html),
        None => (
            "text/plain",
            format!("{status} {}", status_message(status)).into_bytes(),
        ),
    };
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(data) };

    let mut builder = Response::builder()
        .status(status)
        .header("Server", server_name)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Connection", "close");

    if status == 405 {
        builder = builder.header("Allow", "GET, HEAD");
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(&status.to_string(), &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
