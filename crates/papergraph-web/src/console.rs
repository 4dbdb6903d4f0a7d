//! The console: the UI state store, the backend client and the task poller,
//! wired together. Controllers take a `&Console` and act on all three.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use papergraph_client::Backend;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::controllers::{papers, settings, status};
use crate::events::ToastLevel;
use crate::poller::{TaskEffects, TaskPoller};
use crate::store::{Action, Page, Store};

#[derive(Clone)]
pub struct Console {
    pub store: Arc<Store>,
    pub backend: Arc<dyn Backend>,
    pub poller: TaskPoller,
    shutdown: CancellationToken,
}

impl Console {
    pub fn new(backend: Arc<dyn Backend>, poll_interval: Duration) -> Self {
        let store = Arc::new(Store::new());
        let effects = Arc::new(ConsoleEffects { store: store.clone(), backend: backend.clone() });
        let poller = TaskPoller::new(backend.clone(), effects, poll_interval);
        Self { store, backend, poller, shutdown: CancellationToken::new() }
    }

    /// Switch pages. Entering the graph page reloads the collected papers;
    /// entering settings reloads the backend configuration.
    pub async fn navigate(&self, page: Page) {
        self.store.dispatch(Action::Navigate(page));
        match page {
            Page::Graph    => papers::load_papers(&self.store, self.backend.as_ref()).await,
            Page::Settings => settings::load_config(self).await,
            Page::Search   => {}
        }
    }

    /// Refresh the status summary every `every` until shutdown.
    pub fn spawn_status_refresher(&self, every: Duration) -> JoinHandle<()> {
        let store = self.store.clone();
        let backend = self.backend.clone();
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Status refresher stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        status::refresh_status(&store, backend.as_ref()).await;
                    }
                }
            }
        })
    }

    /// Cancel every task poll and background refresh.
    pub fn shutdown(&self) {
        info!(active_polls = self.poller.active().len(), "Shutting down console");
        self.shutdown.cancel();
        self.poller.shutdown();
    }
}

/// Poll side effects applied to the shared store.
pub struct ConsoleEffects {
    store: Arc<Store>,
    backend: Arc<dyn Backend>,
}

#[async_trait]
impl TaskEffects for ConsoleEffects {
    fn update_progress(&self, percent: Option<f64>, message: &str) {
        self.store.dispatch(Action::ProgressUpdated { percent, message: message.to_string() });
    }

    fn close_progress(&self) {
        self.store.dispatch(Action::ProgressClosed);
    }

    fn notify(&self, level: ToastLevel, message: &str) {
        self.store.toast(level, message);
    }

    async fn reload_papers(&self) {
        papers::load_papers(&self.store, self.backend.as_ref()).await;
    }

    async fn refresh_status(&self) {
        status::refresh_status(&self.store, self.backend.as_ref()).await;
    }
}
