//! HTTP protocol layer module
//!
//! Response building and MIME detection, decoupled from request dispatch.

pub mod mime;
pub mod response;

// Re-export commonly used items
pub use response::{
    build_error_response, build_file_response, build_html_response, http_date, status_message,
};
