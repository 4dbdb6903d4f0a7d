//! Search page, pagination and paper actions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use papergraph_common::models::SortBy;
use serde::Deserialize;

use super::render;
use crate::controllers::search::{self, PageDirection, SearchInput};
use crate::events::ToastLevel;
use crate::state::SharedState;
use crate::store::Page;
use crate::views::search::{render_paper_details, render_search};

/// `GET /search`. Runs a search when the form was submitted.
pub async fn search_page(
    State(state): State<SharedState>,
    Query(input): Query<SearchInput>,
) -> Html<String> {
    let console = &state.console;
    console.navigate(Page::Search).await;
    if input.query.is_some() {
        search::submit_search(console, input).await;
    }
    render(console, render_search)
}

/// `POST /search/page/{prev|next}`
pub async fn search_page_nav(
    State(state): State<SharedState>,
    Path(direction): Path<String>,
) -> Result<Redirect, (StatusCode, String)> {
    let direction: PageDirection = direction.parse().map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    search::change_page(&state.console, direction).await;
    Ok(Redirect::to("/search"))
}

#[derive(Debug, Deserialize)]
pub struct FilterForm {
    pub sort_by: SortBy,
    pub per_page: u64,
}

/// `POST /search/filters`
pub async fn search_filters(
    State(state): State<SharedState>,
    Form(form): Form<FilterForm>,
) -> Redirect {
    search::change_filters(&state.console, form.sort_by, form.per_page).await;
    Redirect::to("/search")
}

/// `POST /papers/{id}/collect`
pub async fn collect_paper(
    State(state): State<SharedState>,
    Path(paper_id): Path<String>,
) -> Redirect {
    search::collect_paper(&state.console, &paper_id).await;
    Redirect::to("/search")
}

/// `GET /papers/{id}`
pub async fn paper_details(
    State(state): State<SharedState>,
    Path(paper_id): Path<String>,
) -> Response {
    let console = &state.console;
    match search::paper_details(console, &paper_id).await {
        Ok(paper) => render(console, |ui| render_paper_details(ui, &paper)).into_response(),
        Err(e) => {
            console.store.toast(ToastLevel::Error, format!("Failed to load paper details: {}", e));
            Redirect::to("/search").into_response()
        }
    }
}
