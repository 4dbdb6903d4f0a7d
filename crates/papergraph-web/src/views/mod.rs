//! HTML rendering. Views are plain functions from the UI state to markup.

pub mod graph;
pub mod search;
pub mod settings;

use crate::events::ToastLevel;
use crate::store::{Page, UiState};

/// Shared page chrome: navigation, status counters, toast and progress modal.
pub fn layout(state: &UiState, page: Page, body: &str) -> String {
    let nav: String = Page::ALL
        .iter()
        .map(|p| {
            let class = if *p == page { "nav-link active" } else { "nav-link" };
            format!(r#"<a href="{}" class="{}">{}</a>"#, p.path(), class, p.title())
        })
        .collect();

    let (collected, entities) = state
        .status
        .as_ref()
        .map(|s| (s.collected_papers, s.entities_count))
        .unwrap_or((0, 0));

    let toast_html = match &state.toast {
        Some(toast) => format!(
            r#"<div id="toast" class="toast toast-{}">{}</div>"#,
            level_class(toast.level),
            escape(&toast.message)
        ),
        None => r#"<div id="toast" class="toast hidden"></div>"#.to_string(),
    };

    let progress = &state.progress;
    let progress_html = format!(
        r#"<div id="progress-modal" class="modal{}">
        <div class="modal-card">
            <h3 id="progress-title">{}</h3>
            <div class="progress-track"><div id="progress-bar" class="progress-bar" style="width:{:.0}%"></div></div>
            <p id="progress-text" class="text-muted">{}</p>
        </div>
    </div>"#,
        if progress.open { "" } else { " hidden" },
        escape(&progress.title),
        progress.percent,
        escape(&progress.message),
    );

    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} — Papergraph</title>
    <link rel="stylesheet" href="/static/css/main.css?v=0.1.0">
</head>
<body data-page="{page_id}">
<div class="app-container">
<header class="topbar">
    <div class="brand">Papergraph</div>
    <nav class="nav">{nav}</nav>
    <div class="status-counts">
        <span>Papers <strong id="collected-count">{collected}</strong></span>
        <span>Entities <strong id="entities-count">{entities}</strong></span>
    </div>
</header>
<main class="main-content">
{body}
</main>
</div>
{toast_html}
{progress_html}
<script src="/static/js/console.js?v=0.1.0"></script>
</body>
</html>"#,
        title = page.title(),
        page_id = page.as_str(),
        nav = nav,
        collected = collected,
        entities = entities,
        body = body,
        toast_html = toast_html,
        progress_html = progress_html,
    )
}

fn level_class(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Info    => "info",
        ToastLevel::Success => "success",
        ToastLevel::Warning => "warning",
        ToastLevel::Error   => "error",
    }
}

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c    => out.push(c),
        }
    }
    out
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}
