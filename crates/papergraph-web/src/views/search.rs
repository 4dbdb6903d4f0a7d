//! Search page and paper details.

use papergraph_common::models::{Paper, SortBy};

use super::{escape, layout, truncate};
use crate::store::{Page, UiState};

const ABSTRACT_PREVIEW: usize = 300;
const PER_PAGE_CHOICES: [u64; 4] = [10, 20, 50, 100];

pub fn render_search(state: &UiState) -> String {
    let search = &state.search;
    let params = &search.params;

    let sort_options: String = SortBy::ALL
        .iter()
        .map(|s| {
            let selected = if *s == params.sort_by { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, s.as_str(), selected, s.label())
        })
        .collect();
    let per_page_options: String = PER_PAGE_CHOICES
        .iter()
        .map(|n| {
            let selected = if *n == params.per_page { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{} per page</option>"#, n, selected, n)
        })
        .collect();

    let results_html = if search.results.is_empty() {
        let hint = if search.pagination.is_some() { "No papers found." } else { "Search arXiv to get started." };
        format!(r#"<div class="empty-state text-muted">{}</div>"#, hint)
    } else {
        search.results.iter().map(paper_card).collect()
    };

    let pager_html = match &search.pagination {
        Some(p) if p.visible() => format!(
            r#"<div class="pagination">
        <form method="post" action="/search/page/prev"><button class="btn btn-outline"{}>Previous</button></form>
        <span class="page-info">Page {} of {}</span>
        <form method="post" action="/search/page/next"><button class="btn btn-outline"{}>Next</button></form>
    </div>"#,
            if p.has_prev { "" } else { " disabled" },
            p.page,
            p.total_pages,
            if p.has_next { "" } else { " disabled" },
        ),
        _ => String::new(),
    };

    let body = format!(
        r#"<div class="page-header">
        <h1 class="page-title">Paper Search</h1>
        <p class="text-muted">Search arXiv and collect papers into the knowledge graph</p>
    </div>
    <form class="search-form" method="get" action="/search">
        <input class="form-control" type="text" name="query" value="{}" placeholder="Keywords, e.g. graph retrieval">
        <select class="form-control" name="sort_by">{}</select>
        <select class="form-control" name="per_page">{}</select>
        <button class="btn btn-primary" type="submit"{}>{}</button>
    </form>
    <div id="search-results" class="results">{}</div>
    {}"#,
        escape(&params.query),
        sort_options,
        per_page_options,
        if search.is_searching { " disabled" } else { "" },
        if search.is_searching { "Searching..." } else { "Search" },
        results_html,
        pager_html,
    );

    layout(state, Page::Search, &body)
}

fn paper_card(paper: &Paper) -> String {
    let categories: String = paper
        .categories
        .iter()
        .map(|c| format!(r#"<span class="badge badge-outline">{}</span>"#, escape(c)))
        .collect();
    let collect_button = if paper.is_collected {
        r#"<button class="btn btn-outline btn-sm" disabled>Collected</button>"#.to_string()
    } else {
        format!(
            r#"<form method="post" action="/papers/{}/collect"><button class="btn btn-primary btn-sm">Collect</button></form>"#,
            escape(&paper.id)
        )
    };

    format!(
        r#"<div class="paper-card card" data-paper-id="{id}">
        <h3 class="paper-title"><a href="/papers/{id}">{title}</a></h3>
        <div class="paper-meta text-muted">{authors} · {published}</div>
        <p class="paper-abstract">{abstract_text}</p>
        <div class="paper-footer">
            <div class="paper-categories">{categories}</div>
            <div class="paper-actions">
                <a class="btn btn-outline btn-sm" href="{pdf}" target="_blank" rel="noopener">PDF</a>
                {collect}
            </div>
        </div>
    </div>"#,
        id = escape(&paper.id),
        title = escape(&paper.title),
        authors = escape(&paper.author_line(3)),
        published = escape(&paper.published_date()),
        abstract_text = escape(&truncate(&paper.abstract_text, ABSTRACT_PREVIEW)),
        categories = categories,
        pdf = escape(&paper.pdf_url),
        collect = collect_button,
    )
}

pub fn render_paper_details(state: &UiState, paper: &Paper) -> String {
    let body = format!(
        r#"<div class="page-header">
        <a href="/search" class="btn btn-outline btn-sm">Back to results</a>
        <h1 class="page-title">{title}</h1>
        <p class="text-muted">{authors}</p>
    </div>
    <div class="card">
        <dl class="details">
            <dt>arXiv ID</dt><dd>{id}</dd>
            <dt>Published</dt><dd>{published}</dd>
            <dt>Categories</dt><dd>{categories}</dd>
        </dl>
        <h3>Abstract</h3>
        <p>{abstract_text}</p>
        <div class="paper-actions">
            <a class="btn btn-outline" href="{arxiv}" target="_blank" rel="noopener">arXiv page</a>
            <a class="btn btn-outline" href="{pdf}" target="_blank" rel="noopener">PDF</a>
        </div>
    </div>"#,
        title = escape(&paper.title),
        authors = escape(&paper.authors.join(", ")),
        id = escape(&paper.id),
        published = escape(&paper.published_date()),
        categories = escape(&paper.categories.join(", ")),
        abstract_text = escape(&paper.abstract_text),
        arxiv = escape(&paper.arxiv_url),
        pdf = escape(&paper.pdf_url),
    );
    layout(state, Page::Search, &body)
}
