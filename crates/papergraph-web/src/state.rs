//! Shared application state for the web server.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::console::Console;
use crate::events::UiEvent;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub console: Console,
}

impl AppState {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.console.store.subscribe()
    }
}

pub type SharedState = Arc<AppState>;
