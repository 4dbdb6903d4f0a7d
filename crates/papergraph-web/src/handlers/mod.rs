//! HTTP handlers for all web routes.

pub mod graph;
pub mod search;
pub mod settings;

use axum::{
    extract::State,
    response::{Html, Redirect},
    Json,
};

use crate::console::Console;
use crate::state::SharedState;
use crate::store::{Action, UiState};

pub async fn index() -> Redirect {
    Redirect::to("/search")
}

/// JSON snapshot of the UI state.
pub async fn api_state(State(state): State<SharedState>) -> Json<UiState> {
    Json(state.console.store.snapshot())
}

/// Render a page from the current state. A pending toast is shown once.
pub(crate) fn render(console: &Console, view: impl FnOnce(&UiState) -> String) -> Html<String> {
    let html = console.store.read(view);
    console.store.dispatch(Action::DismissToast);
    Html(html)
}
