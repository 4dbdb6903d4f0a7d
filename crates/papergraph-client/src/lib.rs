//! papergraph-client: Typed client for the paper graph backend HTTP API.

pub mod backend;
pub mod http;

pub use backend::Backend;
pub use http::HttpBackend;
