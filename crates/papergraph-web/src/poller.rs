//! Task Poller: follows long-running backend tasks until they finish.
//!
//! Each registered task gets its own tokio task that queries
//! `/api/task_status/{id}` on a fixed interval. The registry maps task ids to
//! the `CancellationToken` of their poll; an id is present from the moment
//! polling starts until a terminal status is seen or the poll is cancelled.
//!
//! Transport failures and `error` envelopes are logged and retried on the next
//! tick. There is no backoff and no overall timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use papergraph_client::Backend;
use papergraph_common::models::{TaskKind, TaskState, TaskStatus};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::ToastLevel;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// A task being followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub task_id: String,
    /// Paper the task works on, if any.
    pub subject_id: Option<String>,
    pub kind: TaskKind,
}

impl TaskHandle {
    pub fn extract(task_id: impl Into<String>, paper_id: impl Into<String>) -> Self {
        Self { task_id: task_id.into(), subject_id: Some(paper_id.into()), kind: TaskKind::Extract }
    }

    pub fn build(task_id: impl Into<String>) -> Self {
        Self { task_id: task_id.into(), subject_id: None, kind: TaskKind::Build }
    }
}

/// UI side effects of a poll.
#[async_trait]
pub trait TaskEffects: Send + Sync {
    /// `percent` is `None` when the report carried no progress; the bar keeps its value.
    fn update_progress(&self, percent: Option<f64>, message: &str);
    fn close_progress(&self);
    fn notify(&self, level: ToastLevel, message: &str);
    async fn reload_papers(&self);
    async fn refresh_status(&self);
}

type Registry = Arc<Mutex<HashMap<String, CancellationToken>>>;

#[derive(Clone)]
pub struct TaskPoller {
    backend: Arc<dyn Backend>,
    effects: Arc<dyn TaskEffects>,
    registry: Registry,
    interval: Duration,
}

impl TaskPoller {
    pub fn new(backend: Arc<dyn Backend>, effects: Arc<dyn TaskEffects>, interval: Duration) -> Self {
        Self {
            backend,
            effects,
            registry: Arc::new(Mutex::new(HashMap::new())),
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `handle`. Returns `None` if the task id is already being polled.
    pub fn start(&self, handle: TaskHandle) -> Option<JoinHandle<()>> {
        let token = CancellationToken::new();
        {
            let mut registry = self.registry.lock();
            if registry.contains_key(&handle.task_id) {
                debug!(task_id = %handle.task_id, "Task already polled; ignoring");
                return None;
            }
            registry.insert(handle.task_id.clone(), token.clone());
        }

        info!(task_id = %handle.task_id, kind = %handle.kind, "Polling task");
        let poll = PollLoop {
            handle,
            backend: self.backend.clone(),
            effects: self.effects.clone(),
            registry: self.registry.clone(),
            token,
            interval: self.interval,
        };
        Some(tokio::spawn(poll.run()))
    }

    /// Stop polling one task. Returns whether it was registered.
    pub fn cancel(&self, task_id: &str) -> bool {
        match self.registry.lock().remove(task_id) {
            Some(token) => {
                token.cancel();
                info!(task_id, "Task poll cancelled");
                true
            }
            None => false,
        }
    }

    /// Stop every poll.
    pub fn shutdown(&self) {
        let mut registry = self.registry.lock();
        for (_, token) in registry.drain() {
            token.cancel();
        }
    }

    pub fn is_polling(&self, task_id: &str) -> bool {
        self.registry.lock().contains_key(task_id)
    }

    /// Ids of the tasks currently polled.
    pub fn active(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.registry.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

struct PollLoop {
    handle: TaskHandle,
    backend: Arc<dyn Backend>,
    effects: Arc<dyn TaskEffects>,
    registry: Registry,
    token: CancellationToken,
    interval: Duration,
}

impl PollLoop {
    async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.token.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let response = tokio::select! {
                _ = self.token.cancelled() => return,
                r = self.backend.task_status(&self.handle.task_id) => r,
            };

            match response {
                Ok(status) => {
                    if self.apply(status).await {
                        return;
                    }
                }
                Err(e) => {
                    warn!(task_id = %self.handle.task_id, error = %e, "Task status query failed; retrying");
                }
            }
        }
    }

    /// Handle one status report. Returns `true` when polling is over.
    async fn apply(&self, status: TaskStatus) -> bool {
        let kind = self.handle.kind;
        if kind == TaskKind::Build {
            self.effects.update_progress(status.progress, &status.message);
        }

        match status.status {
            TaskState::Completed => {
                if !self.deregister() {
                    return true;
                }
                info!(task_id = %self.handle.task_id, %kind, "Task completed");
                match kind {
                    TaskKind::Extract => {
                        self.effects.notify(ToastLevel::Success, "Paper extraction completed");
                        self.effects.reload_papers().await;
                    }
                    TaskKind::Build => {
                        self.effects.close_progress();
                        self.effects.notify(ToastLevel::Success, "Knowledge graph build completed");
                    }
                }
                self.effects.refresh_status().await;
                true
            }
            TaskState::Failed => {
                if !self.deregister() {
                    return true;
                }
                warn!(task_id = %self.handle.task_id, %kind, message = %status.message, "Task failed");
                if kind == TaskKind::Build {
                    self.effects.close_progress();
                }
                self.effects.notify(ToastLevel::Error, &format!("Task failed: {}", status.message));
                self.effects.reload_papers().await;
                true
            }
            other => {
                debug!(task_id = %self.handle.task_id, status = ?other, progress = ?status.progress, "Task in progress");
                false
            }
        }
    }

    /// Remove this poll from the registry. Returns `false` if it was cancelled meanwhile.
    fn deregister(&self) -> bool {
        let mut registry = self.registry.lock();
        if self.token.is_cancelled() {
            return false;
        }
        registry.remove(&self.handle.task_id);
        self.token.cancel();
        true
    }
}
