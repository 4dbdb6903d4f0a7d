//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::path::Path;
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    api_state, index,
    search::{search_page, search_page_nav, search_filters, collect_paper, paper_details},
    graph::{graph_page, build_graph, extract_paper, toggle_panel, chat_submit, clear_data},
    settings::{settings_page, settings_save, settings_reset, settings_test},
};
use crate::sse::sse_handler;

/// Build and return the full Axum router. Static assets are served from `static_dir`.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",                          get(index))
        .route("/search",                    get(search_page))
        .route("/search/page/{direction}",   post(search_page_nav))
        .route("/search/filters",            post(search_filters))
        .route("/papers/{id}",               get(paper_details))
        .route("/papers/{id}/collect",       post(collect_paper))
        .route("/graph",                     get(graph_page))
        .route("/graph/build",               post(build_graph))
        .route("/graph/papers/{id}/extract", post(extract_paper))
        .route("/graph/panel",               post(toggle_panel))
        .route("/graph/chat",                post(chat_submit))
        .route("/graph/clear",               post(clear_data))
        .route("/settings",                  get(settings_page).post(settings_save))
        .route("/settings/reset",            post(settings_reset))
        .route("/settings/test",             post(settings_test))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/state",  get(api_state))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
