//! The backend seam. Everything the console needs from the server goes through
//! this trait, so tests can swap the HTTP implementation for a scripted one.

use async_trait::async_trait;
use papergraph_common::models::{
    Ack, BackendConfig, CollectedPaper, ConfigUpdate, GraphStats, Paper, QueryAnswer, QueryMode,
    SearchPage, SearchRequest, SystemStatus, TaskStarted, TaskStatus,
};
use papergraph_common::Result;

#[async_trait]
pub trait Backend: Send + Sync {
    /// POST /api/search
    async fn search(&self, req: &SearchRequest) -> Result<SearchPage>;

    /// POST /api/collect_paper
    async fn collect_paper(&self, paper: &Paper) -> Result<Ack>;

    /// GET /api/paper_details/{id}
    async fn paper_details(&self, paper_id: &str) -> Result<Paper>;

    /// GET /api/collected_papers
    async fn collected_papers(&self) -> Result<Vec<CollectedPaper>>;

    /// POST /api/extract_paper/{id}. Starts a background task.
    async fn extract_paper(&self, paper_id: &str) -> Result<TaskStarted>;

    /// POST /api/build_graph. Starts a background task.
    async fn build_graph(&self) -> Result<TaskStarted>;

    /// GET /api/task_status/{id}
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus>;

    /// POST /api/query
    async fn query(&self, question: &str, mode: QueryMode) -> Result<QueryAnswer>;

    /// GET /api/config
    async fn get_config(&self) -> Result<BackendConfig>;

    /// POST /api/config
    async fn update_config(&self, update: &ConfigUpdate) -> Result<Ack>;

    /// POST /api/test_openai, using the settings already saved on the backend.
    async fn test_openai(&self) -> Result<Ack>;

    /// GET /api/system_status
    async fn system_status(&self) -> Result<SystemStatus>;

    /// GET /api/graph_stats
    async fn graph_stats(&self) -> Result<GraphStats>;

    /// POST /api/clear_data
    async fn clear_data(&self) -> Result<Ack>;
}
