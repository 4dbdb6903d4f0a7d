//! Knowledge graph page: papers panel, tasks and chat.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use papergraph_common::models::QueryMode;
use serde::Deserialize;

use super::render;
use crate::controllers::{chat, papers};
use crate::state::SharedState;
use crate::store::Page;
use crate::views::graph::render_graph;

/// `GET /graph`
pub async fn graph_page(State(state): State<SharedState>) -> Html<String> {
    let console = &state.console;
    console.navigate(Page::Graph).await;
    let stats = papers::graph_stats(console).await;
    render(console, |ui| render_graph(ui, stats.as_ref()))
}

/// `POST /graph/build`
pub async fn build_graph(State(state): State<SharedState>) -> Redirect {
    papers::build_graph(&state.console).await;
    Redirect::to("/graph")
}

/// `POST /graph/papers/{id}/extract`
pub async fn extract_paper(
    State(state): State<SharedState>,
    Path(paper_id): Path<String>,
) -> Redirect {
    papers::extract_paper(&state.console, &paper_id).await;
    Redirect::to("/graph")
}

/// `POST /graph/panel`
pub async fn toggle_panel(State(state): State<SharedState>) -> Redirect {
    papers::toggle_panel(&state.console);
    Redirect::to("/graph")
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub mode: QueryMode,
}

/// `POST /graph/chat`
pub async fn chat_submit(
    State(state): State<SharedState>,
    Form(form): Form<ChatForm>,
) -> Redirect {
    chat::send_message(&state.console, &form.question, form.mode).await;
    Redirect::to("/graph")
}

/// `POST /graph/clear`
pub async fn clear_data(State(state): State<SharedState>) -> Redirect {
    papers::clear_data(&state.console).await;
    Redirect::to("/graph")
}
