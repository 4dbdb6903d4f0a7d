//! The UI state container.
//!
//! All mutation goes through [`Store::dispatch`], which applies one [`Action`]
//! with [`reduce`] under the lock and broadcasts the resulting [`UiEvent`].
//! The lock is never held across an `.await`.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use papergraph_common::models::{
    BackendConfig, CollectedPaper, ConfigUpdate, ExtractionStatus, Paper, SearchPage,
    SearchRequest, SortBy, SystemStatus,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::events::{Toast, ToastLevel, UiEvent};

pub const DEFAULT_PER_PAGE: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Search,
    Graph,
    Settings,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Search, Page::Graph, Page::Settings];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Search   => "/search",
            Page::Graph    => "/graph",
            Page::Settings => "/settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Search   => "Paper Search",
            Page::Graph    => "Knowledge Graph",
            Page::Settings => "Settings",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Search   => "search",
            Page::Graph    => "graph",
            Page::Settings => "settings",
        }
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    pub query: String,
    /// 1-based.
    pub page: u64,
    pub per_page: u64,
    pub sort_by: SortBy,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            sort_by: SortBy::Relevance,
        }
    }
}

impl SearchParams {
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            start: self.page.saturating_sub(1) * self.per_page,
            max_results: self.per_page,
            sort_by: self.sort_by,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn from_page(result: &SearchPage) -> Self {
        let page = result.current_page();
        let total_pages = result.total_pages();
        Self {
            page,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    /// The pager is only shown when there is more than one page.
    pub fn visible(&self) -> bool {
        self.total_pages > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub params: SearchParams,
    pub results: Vec<Paper>,
    /// `None` until a search has returned.
    pub pagination: Option<Pagination>,
    pub is_searching: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsState {
    /// Last configuration read from the backend (API key masked).
    pub loaded: Option<BackendConfig>,
    /// The key shown in the form when it was populated.
    pub original_api_key: String,
    /// Last payload accepted by the backend.
    pub saved: Option<ConfigUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressState {
    pub open: bool,
    pub title: String,
    /// 0–100.
    pub percent: f64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiState {
    pub current_page: Page,
    pub search: SearchState,
    pub papers: Vec<CollectedPaper>,
    /// Papers whose extraction was started from this console and not yet reloaded.
    pub extracting: BTreeSet<String>,
    pub panel_collapsed: bool,
    pub chat_history: Vec<ChatMessage>,
    pub settings: SettingsState,
    pub progress: ProgressState,
    pub status: Option<SystemStatus>,
    pub toast: Option<Toast>,
}

impl UiState {
    pub fn is_extracting(&self, paper: &CollectedPaper) -> bool {
        paper.extraction_status == ExtractionStatus::Running || self.extracting.contains(&paper.id)
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(Page),
    SearchStarted(SearchParams),
    SearchLoaded(SearchPage),
    SearchFinished,
    PaperCollected(String),
    PapersLoaded(Vec<CollectedPaper>),
    ExtractionStarted(String),
    DataCleared,
    TogglePanel,
    ProgressOpened(String),
    /// `None` keeps the current percentage.
    ProgressUpdated { percent: Option<f64>, message: String },
    ProgressClosed,
    ChatAppended(ChatMessage),
    ConfigLoaded(BackendConfig),
    ConfigSaved(ConfigUpdate),
    StatusLoaded(SystemStatus),
    ShowToast(Toast),
    DismissToast,
}

/// Apply one action. Returns the event to broadcast, if the change is visible.
pub fn reduce(state: &mut UiState, action: Action) -> Option<UiEvent> {
    match action {
        Action::Navigate(page) => {
            state.current_page = page;
            Some(UiEvent::PageChanged { page })
        }
        Action::SearchStarted(params) => {
            state.search.params = params;
            state.search.is_searching = true;
            None
        }
        Action::SearchLoaded(result) => {
            let pagination = Pagination::from_page(&result);
            state.search.results = result.papers;
            state.search.pagination = Some(pagination);
            Some(UiEvent::SearchUpdated {
                query: state.search.params.query.clone(),
                page: pagination.page,
                total_pages: pagination.total_pages,
                results: state.search.results.len(),
            })
        }
        Action::SearchFinished => {
            state.search.is_searching = false;
            None
        }
        Action::PaperCollected(paper_id) => {
            if let Some(paper) = state.search.results.iter_mut().find(|p| p.id == paper_id) {
                paper.is_collected = true;
            }
            Some(UiEvent::PaperCollected { paper_id })
        }
        Action::PapersLoaded(papers) => {
            state.papers = papers;
            state.extracting.clear();
            Some(UiEvent::PapersUpdated { count: state.papers.len() })
        }
        Action::ExtractionStarted(paper_id) => {
            state.extracting.insert(paper_id.clone());
            Some(UiEvent::ExtractionStarted { paper_id })
        }
        Action::DataCleared => {
            state.papers.clear();
            state.extracting.clear();
            Some(UiEvent::PapersUpdated { count: 0 })
        }
        Action::TogglePanel => {
            state.panel_collapsed = !state.panel_collapsed;
            Some(UiEvent::PanelToggled { collapsed: state.panel_collapsed })
        }
        Action::ProgressOpened(title) => {
            state.progress = ProgressState { open: true, title: title.clone(), ..Default::default() };
            Some(UiEvent::ProgressOpened { title })
        }
        Action::ProgressUpdated { percent, message } => {
            let percent = match percent {
                Some(p) if p.is_finite() => p.clamp(0.0, 100.0),
                Some(_) => 0.0,
                None => state.progress.percent,
            };
            state.progress.percent = percent;
            state.progress.message = message.clone();
            Some(UiEvent::ProgressUpdated { percent, message })
        }
        Action::ProgressClosed => {
            if !state.progress.open {
                return None;
            }
            state.progress.open = false;
            Some(UiEvent::ProgressClosed)
        }
        Action::ChatAppended(message) => {
            state.chat_history.push(message.clone());
            Some(UiEvent::ChatMessage { role: message.role, content: message.content })
        }
        Action::ConfigLoaded(config) => {
            state.settings.original_api_key = config.openai.api_key.clone().unwrap_or_default();
            let has_api_key = config.has_api_key;
            state.settings.loaded = Some(config);
            Some(UiEvent::SettingsLoaded { has_api_key })
        }
        Action::ConfigSaved(update) => {
            state.settings.saved = Some(update);
            Some(UiEvent::SettingsSaved)
        }
        Action::StatusLoaded(status) => {
            let event = UiEvent::StatusUpdated {
                collected_papers: status.collected_papers,
                entities_count: status.entities_count,
            };
            state.status = Some(status);
            Some(event)
        }
        Action::ShowToast(toast) => {
            let event = UiEvent::Toast { level: toast.level, message: toast.message.clone() };
            state.toast = Some(toast);
            Some(event)
        }
        Action::DismissToast => {
            state.toast = None;
            None
        }
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

pub struct Store {
    state: Mutex<UiState>,
    events: broadcast::Sender<UiEvent>,
}

impl Store {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self { state: Mutex::new(UiState::default()), events }
    }

    pub fn dispatch(&self, action: Action) {
        let mut state = self.state.lock();
        if let Some(event) = reduce(&mut state, action) {
            // Sent under the lock so subscribers see events in reducer order.
            let _ = self.events.send(event);
        }
    }

    /// Mark a search as in flight. Returns `false` if one already is.
    pub fn begin_search(&self, params: SearchParams) -> bool {
        let mut state = self.state.lock();
        if state.search.is_searching {
            return false;
        }
        reduce(&mut state, Action::SearchStarted(params));
        true
    }

    pub fn toast(&self, level: ToastLevel, message: impl Into<String>) {
        self.dispatch(Action::ShowToast(Toast { level, message: message.into() }));
    }

    pub fn read<R>(&self, f: impl FnOnce(&UiState) -> R) -> R {
        f(&*self.state.lock())
    }

    pub fn snapshot(&self) -> UiState {
        self.state.lock().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page_of(total: u64, start: u64, per_page: u64) -> SearchPage {
        SearchPage { total_results: total, start, max_results: per_page, ..Default::default() }
    }

    #[test]
    fn search_request_offset_follows_page() {
        let params = SearchParams { query: "rag".into(), page: 3, per_page: 20, ..Default::default() };
        let req = params.to_request();
        assert_eq!((req.start, req.max_results), (40, 20));
    }

    #[test]
    fn pagination_edges() {
        let first = Pagination::from_page(&page_of(25, 0, 10));
        assert_eq!(first, Pagination { page: 1, total_pages: 3, has_prev: false, has_next: true });
        assert!(first.visible());

        let last = Pagination::from_page(&page_of(25, 20, 10));
        assert!(last.has_prev && !last.has_next);

        let single = Pagination::from_page(&page_of(4, 0, 10));
        assert!(!single.visible());
    }

    #[test]
    fn progress_closes_once() {
        let mut state = UiState::default();
        reduce(&mut state, Action::ProgressOpened("Building knowledge graph".into()));
        let update = reduce(&mut state, Action::ProgressUpdated { percent: Some(140.0), message: "done".into() });
        assert_eq!(update, Some(UiEvent::ProgressUpdated { percent: 100.0, message: "done".into() }));

        assert_eq!(reduce(&mut state, Action::ProgressClosed), Some(UiEvent::ProgressClosed));
        assert_eq!(reduce(&mut state, Action::ProgressClosed), None);
        assert!(!state.progress.open);
    }

    #[test]
    fn missing_progress_keeps_percentage() {
        let mut state = UiState::default();
        reduce(&mut state, Action::ProgressOpened("Building knowledge graph".into()));
        reduce(&mut state, Action::ProgressUpdated { percent: Some(70.0), message: "indexing".into() });

        let update = reduce(&mut state, Action::ProgressUpdated { percent: None, message: "built".into() });
        assert_eq!(update, Some(UiEvent::ProgressUpdated { percent: 70.0, message: "built".into() }));
        assert_eq!(state.progress.percent, 70.0);
        assert_eq!(state.progress.message, "built");
    }

    #[test]
    fn reloading_papers_clears_local_extraction_marks() {
        let mut state = UiState::default();
        reduce(&mut state, Action::ExtractionStarted("p1".into()));
        assert!(state.extracting.contains("p1"));

        reduce(&mut state, Action::PapersLoaded(vec![CollectedPaper { id: "p1".into(), ..Default::default() }]));
        assert!(state.extracting.is_empty());
        assert!(!state.is_extracting(&state.papers[0]));
    }

    #[test]
    fn config_loaded_remembers_masked_key() {
        let mut state = UiState::default();
        let mut config = BackendConfig::default();
        config.openai.api_key = Some("sk-a****ijkl".into());
        config.has_api_key = true;

        let event = reduce(&mut state, Action::ConfigLoaded(config));
        assert_eq!(event, Some(UiEvent::SettingsLoaded { has_api_key: true }));
        assert_eq!(state.settings.original_api_key, "sk-a****ijkl");
    }

    #[test]
    fn begin_search_refuses_while_in_flight() {
        let store = Store::new();
        assert!(store.begin_search(SearchParams::default()));
        assert!(!store.begin_search(SearchParams::default()));
        store.dispatch(Action::SearchFinished);
        assert!(store.begin_search(SearchParams::default()));
    }

    #[tokio::test]
    async fn dispatch_broadcasts_visible_changes_only() {
        let store = Store::new();
        let mut rx = store.subscribe();

        store.dispatch(Action::DismissToast);
        store.toast(ToastLevel::Warning, "Please enter a search keyword");

        assert_eq!(
            rx.recv().await.unwrap(),
            UiEvent::Toast { level: ToastLevel::Warning, message: "Please enter a search keyword".into() }
        );
        assert!(rx.try_recv().is_err());
        assert!(store.read(|s| s.toast.is_some()));
    }
}
