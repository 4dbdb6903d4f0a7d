//! JSON models exchanged with the paper graph backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ── Search ────────────────────────────────────────────────────────────────────

/// A search hit. Fields the console does not use are kept in `extra` so that
/// collecting a paper sends back everything the backend returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub arxiv_url: String,
    #[serde(default)]
    pub pdf_url: String,
    #[serde(default)]
    pub is_collected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Paper {
    /// First `max` authors, with a suffix when the list was cut.
    pub fn author_line(&self, max: usize) -> String {
        let mut line = self.authors.iter().take(max).cloned().collect::<Vec<_>>().join(", ");
        if self.authors.len() > max {
            line.push_str(" et al.");
        }
        line
    }

    pub fn published_date(&self) -> String {
        format_date(&self.published)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::Relevance, SortBy::LastUpdatedDate, SortBy::SubmittedDate];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance       => "relevance",
            SortBy::LastUpdatedDate => "lastUpdatedDate",
            SortBy::SubmittedDate   => "submittedDate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Relevance       => "Relevance",
            SortBy::LastUpdatedDate => "Last updated",
            SortBy::SubmittedDate   => "Submitted",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown sort order: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub start: u64,
    pub max_results: u64,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPage {
    pub papers: Vec<Paper>,
    #[serde(alias = "total")]
    pub total_results: u64,
    pub start: u64,
    #[serde(alias = "per_page")]
    pub max_results: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl SearchPage {
    /// 1-based page number derived from the offset.
    pub fn current_page(&self) -> u64 {
        if self.max_results == 0 {
            1
        } else {
            self.start / self.max_results + 1
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.max_results == 0 {
            0
        } else {
            self.total_results.div_ceil(self.max_results)
        }
    }
}

// ── Collected papers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    #[default]
    Pending,
    NotExtracted,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ExtractionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ExtractionStatus::Completed => "Completed",
            ExtractionStatus::Running   => "Extracting",
            ExtractionStatus::Failed    => "Failed",
            _                           => "Pending",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectedPaper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub collected_at: String,
    pub extraction_status: ExtractionStatus,
    pub extraction_progress: f64,
    pub extracted: bool,
}

impl CollectedPaper {
    pub fn collected_date(&self) -> String {
        format_date(&self.collected_at)
    }
}

// ── Tasks ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Extract,
    Build,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Extract => f.write_str("extract"),
            TaskKind::Build   => f.write_str("build"),
        }
    }
}

/// Status reported by `/api/task_status/{id}`. Only `Completed` and `Failed` end a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Started,
    Running,
    Completed,
    Failed,
    NotFound,
    #[serde(other)]
    Unknown,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    /// Terminal reports usually omit it.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskStarted {
    pub task_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub message: Option<String>,
}

// ── Query ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Local,
    Global,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Local  => "local",
            QueryMode::Global => "global",
        }
    }
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local"  => Ok(QueryMode::Local),
            "global" => Ok(QueryMode::Global),
            other    => Err(format!("unknown query mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryAnswer {
    pub answer: Option<String>,
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Settings as returned by `GET /api/config`. The API key arrives masked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub openai: OpenAiSettings,
    pub system: SystemSettings,
    pub has_api_key: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub extract_model: Option<String>,
    pub qa_model: Option<String>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    pub deep_mode: Option<bool>,
    pub chunk_size: Option<u32>,
    pub chunk_overlap: Option<u32>,
    pub max_concurrent_extractions: Option<u32>,
}

/// Body of `POST /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub openai: OpenAiUpdate,
    pub system: SystemUpdate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenAiUpdate {
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub extract_model: String,
    pub qa_model: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemUpdate {
    pub deep_mode: bool,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
}

// ── Status ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    pub collected_papers: u64,
    pub extracted_papers: u64,
    pub entities_count: u64,
    pub relationships_count: u64,
    pub communities_count: u64,
    pub storage_usage: String,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStats {
    pub entities: u64,
    pub relationships: u64,
    pub communities: u64,
}

/// Render a backend timestamp as `YYYY-MM-DD`, falling back to the raw text.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.date().to_string();
    }
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return date.to_string();
        }
    }
    raw.to_string()
}
