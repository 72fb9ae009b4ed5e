//! Async static file server with an LRU cache of open file handles.
//!
//! Besides plain files under the static directory it renders two templated
//! pages, `/greet` and `/calculator`.

pub mod cache;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
