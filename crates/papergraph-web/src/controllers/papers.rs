//! Collected papers, extraction and graph build tasks.

use papergraph_client::Backend;
use papergraph_common::models::GraphStats;
use tracing::{info, warn};

use super::{report_failure, status};
use crate::console::Console;
use crate::events::ToastLevel;
use crate::poller::TaskHandle;
use crate::store::{Action, Store};

pub async fn load_papers(store: &Store, backend: &dyn Backend) {
    match backend.collected_papers().await {
        Ok(papers) => store.dispatch(Action::PapersLoaded(papers)),
        Err(e) => {
            warn!(error = %e, "Failed to load collected papers");
            store.toast(ToastLevel::Error, "Failed to load collected papers");
        }
    }
}

/// Start extracting one paper and follow the task.
pub async fn extract_paper(console: &Console, paper_id: &str) {
    match console.backend.extract_paper(paper_id).await {
        Ok(started) => match started.task_id.filter(|id| !id.is_empty()) {
            Some(task_id) => {
                let message = started.message.unwrap_or_else(|| "Extraction task started".to_string());
                console.store.toast(ToastLevel::Info, message);
                console.store.dispatch(Action::ExtractionStarted(paper_id.to_string()));
                info!(paper_id, %task_id, "Extraction started");
                console.poller.start(TaskHandle::extract(task_id, paper_id));
            }
            None => console.store.toast(ToastLevel::Error, "Extraction start failed: unknown error"),
        },
        Err(e) => report_failure(&console.store, &e, "Extraction start failed", "Extraction request failed"),
    }
}

/// Start a knowledge graph build and follow it with the progress indicator.
pub async fn build_graph(console: &Console) {
    match console.backend.build_graph().await {
        Ok(started) => match started.task_id.filter(|id| !id.is_empty()) {
            Some(task_id) => {
                console.store.dispatch(Action::ProgressOpened("Building knowledge graph".to_string()));
                info!(%task_id, "Graph build started");
                console.poller.start(TaskHandle::build(task_id));
            }
            None => console.store.toast(ToastLevel::Error, "Graph build start failed: unknown error"),
        },
        Err(e) => report_failure(&console.store, &e, "Graph build start failed", "Graph build request failed"),
    }
}

pub fn toggle_panel(console: &Console) {
    console.store.dispatch(Action::TogglePanel);
}

/// Wipe collected papers and the graph on the backend.
pub async fn clear_data(console: &Console) {
    match console.backend.clear_data().await {
        Ok(ack) => {
            console.store.dispatch(Action::DataCleared);
            let message = ack.message.unwrap_or_else(|| "All data cleared".to_string());
            console.store.toast(ToastLevel::Success, message);
            load_papers(&console.store, console.backend.as_ref()).await;
            status::refresh_status(&console.store, console.backend.as_ref()).await;
        }
        Err(e) => report_failure(&console.store, &e, "Clear failed", "Clear request failed"),
    }
}

/// Graph counters for the papers panel. `None` when the backend cannot answer.
pub async fn graph_stats(console: &Console) -> Option<GraphStats> {
    match console.backend.graph_stats().await {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!(error = %e, "Failed to load graph stats");
            None
        }
    }
}
