//! Request handler module
//!
//! Request routing dispatch, the two templated pages and static file serving.

pub mod pages;
pub mod request;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
