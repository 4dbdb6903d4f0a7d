//! Paper search, pagination and collecting.

use papergraph_common::models::{Paper, SortBy};
use papergraph_common::Result;
use serde::Deserialize;
use tracing::{debug, info};

use super::report_failure;
use crate::console::Console;
use crate::events::ToastLevel;
use crate::store::{Action, SearchParams};

/// The search form. `query` is absent when the page is merely opened.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchInput {
    pub query: Option<String>,
    pub sort_by: Option<SortBy>,
    pub per_page: Option<u64>,
    pub page: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Prev,
    Next,
}

impl std::str::FromStr for PageDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "prev" => Ok(PageDirection::Prev),
            "next" => Ok(PageDirection::Next),
            other  => Err(format!("unknown page direction: {}", other)),
        }
    }
}

/// Run the search described by `params`. Ignored while another search is in flight.
pub async fn perform_search(console: &Console, params: SearchParams) {
    if console.store.read(|s| s.search.is_searching) {
        debug!("Search already in flight; ignoring");
        return;
    }
    let query = params.query.trim().to_string();
    if query.is_empty() {
        console.store.toast(ToastLevel::Warning, "Please enter a search keyword");
        return;
    }
    let params = SearchParams { query, ..params };
    let request = params.to_request();
    if !console.store.begin_search(params) {
        debug!("Search already in flight; ignoring");
        return;
    }

    info!(query = %request.query, start = request.start, "Searching papers");
    match console.backend.search(&request).await {
        Ok(page) => console.store.dispatch(Action::SearchLoaded(page)),
        Err(e) => report_failure(&console.store, &e, "Search failed", "Search request failed"),
    }
    console.store.dispatch(Action::SearchFinished);
}

/// Submit the search form. Keeps the current sort and page size unless the form sets them.
pub async fn submit_search(console: &Console, input: SearchInput) {
    let current = console.store.read(|s| s.search.params.clone());
    let params = SearchParams {
        query: input.query.unwrap_or_default(),
        page: input.page.unwrap_or(1).max(1),
        per_page: input.per_page.filter(|n| *n > 0).unwrap_or(current.per_page),
        sort_by: input.sort_by.unwrap_or(current.sort_by),
    };
    perform_search(console, params).await;
}

/// Move one page back or forward and search again.
pub async fn change_page(console: &Console, direction: PageDirection) {
    let mut params = console.store.read(|s| s.search.params.clone());
    match direction {
        PageDirection::Prev => {
            if params.page <= 1 {
                return;
            }
            params.page -= 1;
        }
        PageDirection::Next => params.page += 1,
    }
    perform_search(console, params).await;
}

/// New sort order or page size. Restarts from page 1 when a query exists.
pub async fn change_filters(console: &Console, sort_by: SortBy, per_page: u64) {
    let current = console.store.read(|s| s.search.params.clone());
    let params = SearchParams {
        page: 1,
        per_page: if per_page == 0 { current.per_page } else { per_page },
        sort_by,
        ..current
    };
    if params.query.trim().is_empty() {
        return;
    }
    perform_search(console, params).await;
}

/// Collect a paper from the current results. Unknown ids are ignored.
pub async fn collect_paper(console: &Console, paper_id: &str) {
    let Some(paper) = console
        .store
        .read(|s| s.search.results.iter().find(|p| p.id == paper_id).cloned())
    else {
        debug!(paper_id, "Collect requested for a paper not in the results");
        return;
    };

    match console.backend.collect_paper(&paper).await {
        Ok(ack) => {
            let message = ack.message.unwrap_or_else(|| "Paper collected".to_string());
            console.store.toast(ToastLevel::Success, message);
            console.store.dispatch(Action::PaperCollected(paper.id));
            super::status::refresh_status(&console.store, console.backend.as_ref()).await;
        }
        Err(e) => report_failure(&console.store, &e, "Collect failed", "Collect request failed"),
    }
}

/// Details for one paper, from the current results when possible.
pub async fn paper_details(console: &Console, paper_id: &str) -> Result<Paper> {
    let cached = console
        .store
        .read(|s| s.search.results.iter().find(|p| p.id == paper_id).cloned());
    match cached {
        Some(paper) => Ok(paper),
        None => console.backend.paper_details(paper_id).await,
    }
}
