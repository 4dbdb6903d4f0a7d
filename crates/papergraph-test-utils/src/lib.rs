//! papergraph-test-utils: A scripted, in-memory [`Backend`] for console tests.
//!
//! `FakeBackend` answers every endpoint from canned data, records each call,
//! and can be told to fail the next call to a given endpoint. Task status
//! responses are scripted per task id; the last scripted response repeats.
//! A gated task holds every status query until the test releases it.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use papergraph_client::Backend;
use papergraph_common::mask::mask_secret;
use papergraph_common::models::{
    Ack, BackendConfig, CollectedPaper, ConfigUpdate, ExtractionStatus, GraphStats, Paper,
    QueryAnswer, QueryMode, SearchPage, SearchRequest, SystemStatus, TaskStarted, TaskState,
    TaskStatus,
};
use papergraph_common::{PapergraphError, Result};
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    CollectPaper,
    PaperDetails,
    CollectedPapers,
    ExtractPaper,
    BuildGraph,
    TaskStatus,
    Query,
    GetConfig,
    UpdateConfig,
    TestOpenai,
    SystemStatus,
    GraphStats,
    ClearData,
}

/// How a scripted call fails.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// The backend answers `{"error": msg}`.
    Api(String),
    /// The response never arrives or cannot be parsed.
    Transport,
}

impl Failure {
    fn into_error(self) -> PapergraphError {
        match self {
            Failure::Api(msg) => PapergraphError::Api(msg),
            Failure::Transport => PapergraphError::Serialization(serde_json::Error::io(
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset by peer"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub arg: Option<String>,
}

#[derive(Default)]
struct Inner {
    search_results: Vec<Paper>,
    search_total: u64,
    collected: Vec<CollectedPaper>,
    task_scripts: HashMap<String, VecDeque<std::result::Result<TaskStatus, Failure>>>,
    task_gates: HashMap<String, Arc<Notify>>,
    next_task_ids: VecDeque<String>,
    tasks_started: usize,
    api_key: String,
    config: BackendConfig,
    config_updates: Vec<ConfigUpdate>,
    answer: QueryAnswer,
    status: SystemStatus,
    failures: HashMap<Endpoint, Failure>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeBackend {
    inner: Mutex<Inner>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ────────────────────────────────────────────────────────────

    pub fn with_search_results(self, papers: Vec<Paper>, total: u64) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.search_results = papers;
            inner.search_total = total;
        }
        self
    }

    pub fn with_collected(self, papers: Vec<CollectedPaper>) -> Self {
        self.inner.lock().collected = papers;
        self
    }

    pub fn with_api_key(self, key: &str) -> Self {
        self.inner.lock().api_key = key.to_string();
        self
    }

    pub fn with_config(self, config: BackendConfig) -> Self {
        self.inner.lock().config = config;
        self
    }

    pub fn with_answer(self, answer: Option<&str>) -> Self {
        self.inner.lock().answer = QueryAnswer { answer: answer.map(String::from) };
        self
    }

    pub fn with_status(self, status: SystemStatus) -> Self {
        self.inner.lock().status = status;
        self
    }

    /// Id handed out by the next extract/build start.
    pub fn next_task_id(&self, task_id: &str) {
        self.inner.lock().next_task_ids.push_back(task_id.to_string());
    }

    /// Responses for successive status queries of `task_id`.
    pub fn script_task(&self, task_id: &str, responses: Vec<std::result::Result<TaskStatus, Failure>>) {
        self.inner
            .lock()
            .task_scripts
            .insert(task_id.to_string(), responses.into_iter().collect());
    }

    /// Hold status queries of `task_id` until the returned `Notify` is signalled,
    /// once per query. The query is recorded before it blocks.
    pub fn gate_task(&self, task_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner.lock().task_gates.insert(task_id.to_string(), gate.clone());
        gate
    }

    /// Make the next call to `endpoint` fail.
    pub fn fail_next(&self, endpoint: Endpoint, failure: Failure) {
        self.inner.lock().failures.insert(endpoint, failure);
    }

    // ── Inspection ───────────────────────────────────────────────────────────

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.endpoint == endpoint).count()
    }

    pub fn total_calls(&self) -> usize {
        self.inner.lock().calls.len()
    }

    pub fn status_queries(&self, task_id: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.endpoint == Endpoint::TaskStatus && c.arg.as_deref() == Some(task_id))
            .count()
    }

    pub fn config_updates(&self) -> Vec<ConfigUpdate> {
        self.inner.lock().config_updates.clone()
    }

    pub fn collected_ids(&self) -> Vec<String> {
        self.inner.lock().collected.iter().map(|p| p.id.clone()).collect()
    }

    /// Record the call and consume a pending failure for `endpoint`, if any.
    fn record(&self, endpoint: Endpoint, arg: Option<&str>) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call { endpoint, arg: arg.map(String::from) });
        match inner.failures.remove(&endpoint) {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn start_task(&self, message: &str) -> TaskStarted {
        let mut inner = self.inner.lock();
        inner.tasks_started += 1;
        let task_id = inner
            .next_task_ids
            .pop_front()
            .unwrap_or_else(|| format!("task-{}", inner.tasks_started));
        TaskStarted { task_id: Some(task_id), message: Some(message.to_string()) }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn search(&self, req: &SearchRequest) -> Result<SearchPage> {
        self.record(Endpoint::Search, Some(&req.query))?;
        let inner = self.inner.lock();
        let total = inner.search_total;
        Ok(SearchPage {
            papers: inner.search_results.clone(),
            total_results: total,
            start: req.start,
            max_results: req.max_results,
            has_next: req.start + req.max_results < total,
            has_prev: req.start > 0,
        })
    }

    async fn collect_paper(&self, paper: &Paper) -> Result<Ack> {
        self.record(Endpoint::CollectPaper, Some(&paper.id))?;
        let mut inner = self.inner.lock();
        if inner.collected.iter().any(|p| p.id == paper.id) {
            return Err(PapergraphError::Api("Paper already collected".to_string()));
        }
        inner.collected.push(CollectedPaper {
            id: paper.id.clone(),
            title: paper.title.clone(),
            authors: paper.authors.clone(),
            collected_at: "2024-01-01T00:00:00".to_string(),
            extraction_status: ExtractionStatus::Pending,
            ..Default::default()
        });
        Ok(Ack { message: Some("Paper collected".to_string()) })
    }

    async fn paper_details(&self, paper_id: &str) -> Result<Paper> {
        self.record(Endpoint::PaperDetails, Some(paper_id))?;
        let inner = self.inner.lock();
        inner
            .search_results
            .iter()
            .find(|p| p.id == paper_id)
            .cloned()
            .ok_or_else(|| PapergraphError::Api("Paper not found".to_string()))
    }

    async fn collected_papers(&self) -> Result<Vec<CollectedPaper>> {
        self.record(Endpoint::CollectedPapers, None)?;
        Ok(self.inner.lock().collected.clone())
    }

    async fn extract_paper(&self, paper_id: &str) -> Result<TaskStarted> {
        self.record(Endpoint::ExtractPaper, Some(paper_id))?;
        Ok(self.start_task("Extraction task started"))
    }

    async fn build_graph(&self) -> Result<TaskStarted> {
        self.record(Endpoint::BuildGraph, None)?;
        Ok(self.start_task("Graph build task started"))
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        self.record(Endpoint::TaskStatus, Some(task_id))?;
        let gate = self.inner.lock().task_gates.get(task_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut inner = self.inner.lock();
        let next = match inner.task_scripts.get_mut(task_id) {
            Some(script) if script.len() > 1 => script.pop_front(),
            Some(script) => script.front().cloned(),
            None => None,
        };
        match next {
            Some(Ok(status)) => Ok(status),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(TaskStatus {
                status: TaskState::NotFound,
                progress: None,
                message: "Task not found".to_string(),
            }),
        }
    }

    async fn query(&self, question: &str, _mode: QueryMode) -> Result<QueryAnswer> {
        self.record(Endpoint::Query, Some(question))?;
        Ok(self.inner.lock().answer.clone())
    }

    async fn get_config(&self) -> Result<BackendConfig> {
        self.record(Endpoint::GetConfig, None)?;
        let inner = self.inner.lock();
        let mut config = inner.config.clone();
        config.has_api_key = !inner.api_key.is_empty();
        config.openai.api_key = Some(mask_secret(&inner.api_key));
        Ok(config)
    }

    async fn update_config(&self, update: &ConfigUpdate) -> Result<Ack> {
        self.record(Endpoint::UpdateConfig, None)?;
        let mut inner = self.inner.lock();
        if let Some(key) = &update.openai.api_key {
            if key.trim().is_empty() {
                return Err(PapergraphError::Api("OpenAI API Key cannot be empty".to_string()));
            }
            inner.api_key = key.clone();
        }
        inner.config_updates.push(update.clone());
        Ok(Ack { message: Some("Configuration updated".to_string()) })
    }

    async fn test_openai(&self) -> Result<Ack> {
        self.record(Endpoint::TestOpenai, None)?;
        if self.inner.lock().api_key.is_empty() {
            return Err(PapergraphError::Api("Configure and save an OpenAI API Key first".to_string()));
        }
        Ok(Ack { message: Some("OpenAI connection OK".to_string()) })
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        self.record(Endpoint::SystemStatus, None)?;
        let inner = self.inner.lock();
        let mut status = inner.status.clone();
        status.collected_papers = status.collected_papers.max(inner.collected.len() as u64);
        Ok(status)
    }

    async fn graph_stats(&self) -> Result<GraphStats> {
        self.record(Endpoint::GraphStats, None)?;
        let entities = self.inner.lock().status.entities_count;
        Ok(GraphStats { entities, ..Default::default() })
    }

    async fn clear_data(&self) -> Result<Ack> {
        self.record(Endpoint::ClearData, None)?;
        self.inner.lock().collected.clear();
        Ok(Ack { message: Some("All data cleared".to_string()) })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn paper(id: &str, title: &str) -> Paper {
    Paper {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["Ada Lovelace".to_string()],
        abstract_text: format!("Abstract of {}", title),
        published: "2024-01-02T00:00:00Z".to_string(),
        categories: vec!["cs.CL".to_string()],
        arxiv_url: format!("http://arxiv.org/abs/{}", id),
        pdf_url: format!("http://arxiv.org/pdf/{}", id),
        ..Default::default()
    }
}

pub fn collected(id: &str, status: ExtractionStatus) -> CollectedPaper {
    CollectedPaper {
        id: id.to_string(),
        title: format!("Paper {}", id),
        collected_at: "2024-01-01T00:00:00".to_string(),
        extraction_status: status,
        extracted: status == ExtractionStatus::Completed,
        ..Default::default()
    }
}

pub fn status(state: TaskState, progress: f64, message: &str) -> std::result::Result<TaskStatus, Failure> {
    Ok(TaskStatus { status: state, progress: Some(progress), message: message.to_string() })
}

/// A report without a `progress` field, as the backend writes for finished tasks.
pub fn status_without_progress(state: TaskState, message: &str) -> std::result::Result<TaskStatus, Failure> {
    Ok(TaskStatus { status: state, progress: None, message: message.to_string() })
}
