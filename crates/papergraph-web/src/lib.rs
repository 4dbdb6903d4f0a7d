//! papergraph-web: Browser console for the paper graph backend.
//! Provides:
//!   - arXiv paper search with pagination and collecting
//!   - Collected paper manager with extraction and graph build tasks
//!   - Chat panel over the knowledge graph
//!   - Settings form for the backend's model credentials
//!
//! The console keeps one UI state container (`store`), talks to the backend
//! through `papergraph_client::Backend`, polls long-running tasks (`poller`)
//! and pushes UI events to the browser over SSE.

pub mod config;
pub mod console;
pub mod controllers;
pub mod events;
pub mod handlers;
pub mod poller;
pub mod router;
pub mod sse;
pub mod state;
pub mod store;
pub mod views;
