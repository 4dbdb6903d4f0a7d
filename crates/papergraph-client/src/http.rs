//! reqwest implementation of [`Backend`].
//!
//! Every endpoint answers JSON whatever the HTTP status; a top-level `error`
//! string is an application failure and becomes [`PapergraphError::Api`].

use async_trait::async_trait;
use papergraph_common::models::{
    Ack, BackendConfig, CollectedPaper, ConfigUpdate, GraphStats, Paper, QueryAnswer, QueryMode,
    SearchPage, SearchRequest, SystemStatus, TaskStarted, TaskStatus,
};
use papergraph_common::{PapergraphError, Result};
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::backend::Backend;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| PapergraphError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PapergraphError::InvalidUrl(base_url.to_string()));
        }
        // Keep any path prefix when joining endpoint segments.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| PapergraphError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded,
    /// so ids such as `hep-th/9901001` stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PapergraphError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.get(self.endpoint(segments)?))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.post(self.endpoint(segments)?))
    }

    async fn send_value(&self, req: RequestBuilder) -> Result<Value> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let value: Value = serde_json::from_str(&body)?;

        if let Some(message) = value.get("error").and_then(Value::as_str) {
            debug!(%status, error = message, "Backend reported an error");
            return Err(PapergraphError::Api(message.to_string()));
        }
        Ok(value)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let value = self.send_value(req).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, req), fields(query = %req.query, start = req.start))]
    async fn search(&self, req: &SearchRequest) -> Result<SearchPage> {
        let page: SearchPage = self.send(self.post(&["api", "search"])?.json(req)).await?;
        debug!(count = page.papers.len(), total = page.total_results, "Search returned papers");
        Ok(page)
    }

    #[instrument(skip(self, paper), fields(paper_id = %paper.id))]
    async fn collect_paper(&self, paper: &Paper) -> Result<Ack> {
        let body = json!({ "paper_data": paper });
        self.send(self.post(&["api", "collect_paper"])?.json(&body)).await
    }

    #[instrument(skip(self))]
    async fn paper_details(&self, paper_id: &str) -> Result<Paper> {
        self.send(self.get(&["api", "paper_details", paper_id])?).await
    }

    #[instrument(skip(self))]
    async fn collected_papers(&self) -> Result<Vec<CollectedPaper>> {
        let value = self.send_value(self.get(&["api", "collected_papers"])?).await?;
        match value {
            Value::Array(_) => Ok(serde_json::from_value(value)?),
            other => {
                debug!(body = %other, "Collected papers response is not a list");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self))]
    async fn extract_paper(&self, paper_id: &str) -> Result<TaskStarted> {
        self.send(self.post(&["api", "extract_paper", paper_id])?).await
    }

    #[instrument(skip(self))]
    async fn build_graph(&self) -> Result<TaskStarted> {
        self.send(self.post(&["api", "build_graph"])?).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        self.send(self.get(&["api", "task_status", task_id])?).await
    }

    #[instrument(skip(self, question))]
    async fn query(&self, question: &str, mode: QueryMode) -> Result<QueryAnswer> {
        let body = json!({ "question": question, "mode": mode });
        self.send(self.post(&["api", "query"])?.json(&body)).await
    }

    #[instrument(skip(self))]
    async fn get_config(&self) -> Result<BackendConfig> {
        self.send(self.get(&["api", "config"])?).await
    }

    #[instrument(skip(self, update), fields(sends_key = update.openai.api_key.is_some()))]
    async fn update_config(&self, update: &ConfigUpdate) -> Result<Ack> {
        self.send(self.post(&["api", "config"])?.json(update)).await
    }

    #[instrument(skip(self))]
    async fn test_openai(&self) -> Result<Ack> {
        let body = json!({ "use_saved_config": true });
        self.send(self.post(&["api", "test_openai"])?.json(&body)).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn system_status(&self) -> Result<SystemStatus> {
        let value = self.send_value(self.get(&["api", "system_status"])?).await?;
        // Older backends wrap the counts as `{success, status: {...}}`.
        let counts = if value.get("status").is_some_and(Value::is_object) {
            value["status"].clone()
        } else {
            value
        };
        Ok(serde_json::from_value(counts)?)
    }

    #[instrument(skip(self))]
    async fn graph_stats(&self) -> Result<GraphStats> {
        self.send(self.get(&["api", "graph_stats"])?).await
    }

    #[instrument(skip(self))]
    async fn clear_data(&self) -> Result<Ack> {
        self.send(self.post(&["api", "clear_data"])?).await
    }
}
