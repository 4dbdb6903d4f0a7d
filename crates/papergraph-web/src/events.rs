//! Events pushed to connected browsers whenever the UI state changes visibly.

use serde::{Deserialize, Serialize};

use crate::store::{ChatRole, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    PageChanged { page: Page },
    Toast { level: ToastLevel, message: String },
    SearchUpdated { query: String, page: u64, total_pages: u64, results: usize },
    PaperCollected { paper_id: String },
    PapersUpdated { count: usize },
    ExtractionStarted { paper_id: String },
    PanelToggled { collapsed: bool },
    ProgressOpened { title: String },
    ProgressUpdated { percent: f64, message: String },
    ProgressClosed,
    ChatMessage { role: ChatRole, content: String },
    SettingsLoaded { has_api_key: bool },
    SettingsSaved,
    StatusUpdated { collected_papers: u64, entities_count: u64 },
}

impl UiEvent {
    /// The `type` tag, also used as the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            UiEvent::PageChanged { .. }       => "page_changed",
            UiEvent::Toast { .. }             => "toast",
            UiEvent::SearchUpdated { .. }     => "search_updated",
            UiEvent::PaperCollected { .. }    => "paper_collected",
            UiEvent::PapersUpdated { .. }     => "papers_updated",
            UiEvent::ExtractionStarted { .. } => "extraction_started",
            UiEvent::PanelToggled { .. }      => "panel_toggled",
            UiEvent::ProgressOpened { .. }    => "progress_opened",
            UiEvent::ProgressUpdated { .. }   => "progress_updated",
            UiEvent::ProgressClosed           => "progress_closed",
            UiEvent::ChatMessage { .. }       => "chat_message",
            UiEvent::SettingsLoaded { .. }    => "settings_loaded",
            UiEvent::SettingsSaved            => "settings_saved",
            UiEvent::StatusUpdated { .. }     => "status_updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_type_tag() {
        let events = [
            UiEvent::PageChanged { page: Page::Graph },
            UiEvent::Toast { level: ToastLevel::Info, message: "hi".into() },
            UiEvent::PapersUpdated { count: 2 },
            UiEvent::ProgressUpdated { percent: 40.0, message: "indexing".into() },
            UiEvent::ProgressClosed,
            UiEvent::ChatMessage { role: ChatRole::User, content: "q".into() },
            UiEvent::SettingsSaved,
            UiEvent::StatusUpdated { collected_papers: 1, entities_count: 9 },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.kind());
        }
    }
}
