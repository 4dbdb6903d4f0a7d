//! Knowledge graph page: collected papers panel and chat.

use papergraph_common::models::{CollectedPaper, ExtractionStatus, GraphStats};

use super::{escape, layout, truncate};
use crate::store::{ChatRole, Page, UiState};

const TITLE_MAX: usize = 80;

pub fn render_graph(state: &UiState, stats: Option<&GraphStats>) -> String {
    let papers_html = if state.papers.is_empty() {
        r#"<div class="empty-state text-muted">No collected papers yet. Collect some from the search page.</div>"#.to_string()
    } else {
        state.papers.iter().map(|p| paper_row(state, p)).collect()
    };

    let stats_html = match stats {
        Some(s) => format!(
            r#"<div class="graph-stats">
            <span>Entities <strong>{}</strong></span>
            <span>Relationships <strong>{}</strong></span>
            <span>Communities <strong>{}</strong></span>
        </div>"#,
            s.entities, s.relationships, s.communities
        ),
        None => String::new(),
    };

    let chat_html: String = if state.chat_history.is_empty() {
        r#"<div class="chat-message assistant">Ask a question about the collected papers.</div>"#.to_string()
    } else {
        state
            .chat_history
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User      => "user",
                    ChatRole::Assistant => "assistant",
                };
                format!(r#"<div class="chat-message {}">{}</div>"#, role, escape(&m.content))
            })
            .collect()
    };

    let body = format!(
        r#"<div class="page-header">
        <h1 class="page-title">Knowledge Graph</h1>
        <div class="d-flex gap-3">
            <form method="post" action="/graph/build"><button class="btn btn-primary"{build_disabled}>Build graph</button></form>
            <form method="post" action="/graph/clear" onsubmit="return confirm('Clear all collected papers and the graph?')"><button class="btn btn-outline">Clear data</button></form>
        </div>
    </div>
    {stats}
    <div class="graph-layout">
        <section id="papers-panel" class="card papers-panel{collapsed}">
            <div class="card-header">
                <div>Collected papers ({count})</div>
                <form method="post" action="/graph/panel"><button class="btn btn-outline btn-sm">{toggle}</button></form>
            </div>
            <div class="papers-list">{papers}</div>
        </section>
        <section class="card chat-panel">
            <div class="card-header"><div>Ask the graph</div></div>
            <div id="chat-messages" class="chat-messages">{chat}</div>
            <form class="chat-form" method="post" action="/graph/chat">
                <input class="form-control" type="text" name="question" placeholder="Ask a question" autocomplete="off">
                <select class="form-control" name="mode">
                    <option value="local">Local</option>
                    <option value="global">Global</option>
                </select>
                <button class="btn btn-primary" type="submit">Send</button>
            </form>
        </section>
    </div>"#,
        build_disabled = if state.progress.open { " disabled" } else { "" },
        stats = stats_html,
        collapsed = if state.panel_collapsed { " collapsed" } else { "" },
        count = state.papers.len(),
        toggle = if state.panel_collapsed { "Expand" } else { "Collapse" },
        papers = papers_html,
        chat = chat_html,
    );

    layout(state, Page::Graph, &body)
}

fn paper_row(state: &UiState, paper: &CollectedPaper) -> String {
    let extracting = state.is_extracting(paper);
    let (label, class) = if extracting {
        (ExtractionStatus::Running.label(), "running")
    } else {
        let class = match paper.extraction_status {
            ExtractionStatus::Completed => "completed",
            ExtractionStatus::Failed    => "failed",
            _                           => "pending",
        };
        (paper.extraction_status.label(), class)
    };

    let action = if extracting || paper.extraction_status == ExtractionStatus::Completed {
        String::new()
    } else {
        format!(
            r#"<form method="post" action="/graph/papers/{}/extract"><button class="btn btn-outline btn-sm">Extract</button></form>"#,
            escape(&paper.id)
        )
    };

    format!(
        r#"<div class="paper-row" data-paper-id="{id}">
            <div class="paper-row-main">
                <div class="paper-title" title="{full_title}">{title}</div>
                <div class="text-muted small">Collected {date}</div>
            </div>
            <span class="status-badge status-{class}">{label}</span>
            {action}
        </div>"#,
        id = escape(&paper.id),
        full_title = escape(&paper.title),
        title = escape(&truncate(&paper.title, TITLE_MAX)),
        date = escape(&paper.collected_date()),
        class = class,
        label = label,
        action = action,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ChatMessage;

    fn collected(id: &str, status: ExtractionStatus) -> CollectedPaper {
        CollectedPaper { id: id.into(), title: "x".repeat(100), extraction_status: status, ..Default::default() }
    }

    #[test]
    fn status_labels_and_extract_buttons() {
        let mut state = UiState::default();
        state.papers = vec![
            collected("done", ExtractionStatus::Completed),
            collected("new", ExtractionStatus::NotExtracted),
            collected("bad", ExtractionStatus::Failed),
        ];
        state.extracting.insert("bad".into());

        let html = render_graph(&state, None);
        assert!(html.contains(r#"status-completed">Completed"#));
        assert!(html.contains(r#"status-pending">Pending"#));
        assert!(html.contains(r#"status-running">Extracting"#));
        assert!(html.contains("/graph/papers/new/extract"));
        assert!(!html.contains("/graph/papers/done/extract"));
        assert!(!html.contains("/graph/papers/bad/extract"));
        assert!(html.contains(&format!("{}...", "x".repeat(80))));
    }

    #[test]
    fn chat_history_is_escaped() {
        let mut state = UiState::default();
        state.chat_history.push(ChatMessage::user("<script>"));
        state.chat_history.push(ChatMessage::assistant("answer"));
        let html = render_graph(&state, Some(&GraphStats { entities: 7, ..Default::default() }));
        assert!(html.contains(r#"<div class="chat-message user">&lt;script&gt;</div>"#));
        assert!(html.contains("Entities <strong>7</strong>"));
    }
}
