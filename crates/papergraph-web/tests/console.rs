use std::sync::Arc;
use std::time::Duration;

use papergraph_common::models::{ExtractionStatus, QueryMode, SortBy, TaskState};
use papergraph_test_utils::{
    collected, paper, status, status_without_progress, Endpoint, Failure, FakeBackend,
};
use papergraph_web::console::Console;
use papergraph_web::controllers::search::{PageDirection, SearchInput};
use papergraph_web::controllers::{chat, papers, search, settings};
use papergraph_web::events::{Toast, ToastLevel, UiEvent};
use papergraph_web::store::{ChatRole, Page, SearchParams};
use pretty_assertions::assert_eq;

const INTERVAL: Duration = Duration::from_millis(2000);

fn console_with(backend: FakeBackend) -> (Arc<FakeBackend>, Console) {
    let backend = Arc::new(backend);
    let console = Console::new(backend.clone(), INTERVAL);
    (backend, console)
}

fn toast(console: &Console) -> Option<Toast> {
    console.store.read(|s| s.toast.clone())
}

fn input(query: &str) -> SearchInput {
    SearchInput { query: Some(query.to_string()), ..Default::default() }
}

// ── Search ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_query_warns_without_request() {
    let (backend, console) = console_with(FakeBackend::new());

    search::submit_search(&console, input("   ")).await;

    assert_eq!(backend.total_calls(), 0);
    assert_eq!(
        toast(&console),
        Some(Toast { level: ToastLevel::Warning, message: "Please enter a search keyword".into() })
    );
    assert!(!console.store.read(|s| s.search.is_searching));
}

#[tokio::test]
async fn empty_submit_during_search_is_ignored_silently() {
    let (backend, console) = console_with(FakeBackend::new());
    assert!(console.store.begin_search(SearchParams { query: "graph".into(), ..Default::default() }));

    search::submit_search(&console, input("")).await;

    assert_eq!(toast(&console), None);
    assert_eq!(backend.total_calls(), 0);
    assert!(console.store.read(|s| s.search.is_searching));
}

#[tokio::test]
async fn search_stores_results_and_pagination() {
    let results = vec![paper("2401.1", "Graph RAG"), paper("2401.2", "Entity linking")];
    let (backend, console) = console_with(FakeBackend::new().with_search_results(results, 25));

    search::submit_search(&console, input(" knowledge graph ")).await;

    let state = console.store.snapshot();
    assert_eq!(state.search.params.query, "knowledge graph");
    assert_eq!(state.search.results.len(), 2);
    let pagination = state.search.pagination.unwrap();
    assert_eq!((pagination.page, pagination.total_pages), (1, 3));
    assert!(!pagination.has_prev && pagination.has_next);
    assert!(!state.search.is_searching);

    search::change_page(&console, PageDirection::Next).await;
    let pagination = console.store.read(|s| s.search.pagination).unwrap();
    assert_eq!(pagination.page, 2);
    assert_eq!(backend.calls(Endpoint::Search), 2);

    search::change_page(&console, PageDirection::Prev).await;
    search::change_page(&console, PageDirection::Prev).await;
    // Already on page 1: the second "previous" is ignored.
    assert_eq!(backend.calls(Endpoint::Search), 3);
}

#[tokio::test]
async fn filters_restart_from_first_page() {
    let (backend, console) =
        console_with(FakeBackend::new().with_search_results(vec![paper("1", "A")], 100));

    search::change_filters(&console, SortBy::SubmittedDate, 20).await;
    assert_eq!(backend.calls(Endpoint::Search), 0);

    search::perform_search(&console, SearchParams { query: "rag".into(), page: 4, ..Default::default() }).await;
    search::change_filters(&console, SortBy::SubmittedDate, 20).await;

    let params = console.store.read(|s| s.search.params.clone());
    assert_eq!((params.page, params.per_page, params.sort_by), (1, 20, SortBy::SubmittedDate));
    assert_eq!(backend.calls(Endpoint::Search), 2);
}

#[tokio::test]
async fn search_failures_become_toasts() {
    let (backend, console) = console_with(FakeBackend::new());

    backend.fail_next(Endpoint::Search, Failure::Api("arXiv rate limit".into()));
    search::submit_search(&console, input("rag")).await;
    assert_eq!(toast(&console).unwrap().message, "Search failed: arXiv rate limit");
    assert!(!console.store.read(|s| s.search.is_searching));

    backend.fail_next(Endpoint::Search, Failure::Transport);
    search::submit_search(&console, input("rag")).await;
    assert_eq!(toast(&console).unwrap().message, "Search request failed");
}

#[tokio::test]
async fn collecting_marks_result_and_refreshes_status() {
    let (backend, console) =
        console_with(FakeBackend::new().with_search_results(vec![paper("2401.1", "Graph RAG")], 1));
    search::submit_search(&console, input("graph")).await;

    search::collect_paper(&console, "9999.9").await;
    assert_eq!(backend.calls(Endpoint::CollectPaper), 0);

    search::collect_paper(&console, "2401.1").await;
    assert_eq!(backend.collected_ids(), vec!["2401.1".to_string()]);
    assert!(console.store.read(|s| s.search.results[0].is_collected));
    assert_eq!(toast(&console).unwrap().level, ToastLevel::Success);
    assert_eq!(console.store.read(|s| s.status.as_ref().map(|s| s.collected_papers)), Some(1));

    search::collect_paper(&console, "2401.1").await;
    assert_eq!(toast(&console).unwrap().message, "Collect failed: Paper already collected");
}

#[tokio::test]
async fn details_prefer_current_results() {
    let (backend, console) =
        console_with(FakeBackend::new().with_search_results(vec![paper("2401.1", "Graph RAG")], 1));

    // Not in the results yet: asks the backend, which finds it in its index.
    let fetched = search::paper_details(&console, "2401.1").await.unwrap();
    assert_eq!(fetched.title, "Graph RAG");
    assert_eq!(backend.calls(Endpoint::PaperDetails), 1);

    search::submit_search(&console, input("graph")).await;
    search::paper_details(&console, "2401.1").await.unwrap();
    assert_eq!(backend.calls(Endpoint::PaperDetails), 1);

    assert!(search::paper_details(&console, "missing").await.is_err());
}

// ── Chat ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_appends_question_and_answer() {
    let (backend, console) = console_with(FakeBackend::new().with_answer(Some("Three entities.")));

    chat::send_message(&console, "  ", QueryMode::Local).await;
    assert_eq!(backend.calls(Endpoint::Query), 0);

    chat::send_message(&console, "How many entities?", QueryMode::Global).await;
    let history = console.store.read(|s| s.chat_history.clone());
    assert_eq!(history.len(), 2);
    assert_eq!((history[0].role, history[0].content.as_str()), (ChatRole::User, "How many entities?"));
    assert_eq!((history[1].role, history[1].content.as_str()), (ChatRole::Assistant, "Three entities."));
}

#[tokio::test]
async fn chat_failures_become_assistant_replies() {
    let (backend, console) = console_with(FakeBackend::new().with_answer(None));

    chat::send_message(&console, "q1", QueryMode::Local).await;
    backend.fail_next(Endpoint::Query, Failure::Api("Graph not built".into()));
    chat::send_message(&console, "q2", QueryMode::Local).await;
    backend.fail_next(Endpoint::Query, Failure::Transport);
    chat::send_message(&console, "q3", QueryMode::Local).await;

    let replies: Vec<String> = console.store.read(|s| {
        s.chat_history
            .iter()
            .filter(|m| m.role == ChatRole::Assistant)
            .map(|m| m.content.clone())
            .collect()
    });
    assert_eq!(
        replies,
        vec![
            "Sorry, the query failed: unknown error".to_string(),
            "Sorry, the query failed: Graph not built".to_string(),
            "Sorry, the network request failed, please try again later.".to_string(),
        ]
    );
}

#[tokio::test]
async fn empty_answer_is_reported_as_unknown_error() {
    let (_backend, console) = console_with(FakeBackend::new().with_answer(Some("")));

    chat::send_message(&console, "q", QueryMode::Local).await;

    let last = console.store.read(|s| s.chat_history.last().cloned()).unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.content, "Sorry, the query failed: unknown error");
}

// ── Settings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unchanged_masked_key_is_not_sent() {
    let (backend, console) = console_with(FakeBackend::new().with_api_key("sk-abcdefghijkl"));
    console.navigate(Page::Settings).await;

    let form = settings::current_form(&console);
    assert_eq!(form.api_key, "sk-a*******ijkl");
    assert_eq!(form.extract_model, "gpt-4o-mini");

    assert!(settings::save_config(&console, &form).await);
    assert_eq!(backend.config_updates()[0].openai.api_key, None);
    assert_eq!(toast(&console).unwrap().level, ToastLevel::Success);

    let mut edited = settings::current_form(&console);
    edited.api_key = "sk-replacement-key".into();
    assert!(settings::save_config(&console, &edited).await);
    assert_eq!(backend.config_updates()[1].openai.api_key.as_deref(), Some("sk-replacement-key"));

    // The newly masked key is what the form shows now, and it is not resent.
    let reloaded = settings::current_form(&console);
    assert_eq!(reloaded.api_key, "sk-r**********-key");
    assert!(settings::save_config(&console, &reloaded).await);
    assert_eq!(backend.config_updates()[2].openai.api_key, None);
}

#[tokio::test]
async fn connection_test_requires_successful_save() {
    let (backend, console) = console_with(FakeBackend::new());
    console.navigate(Page::Settings).await;

    // No key stored and none typed: the backend rejects the save.
    let form = settings::current_form(&console);
    settings::test_connection(&console, &form).await;
    assert_eq!(backend.calls(Endpoint::TestOpenai), 0);
    assert_eq!(toast(&console).unwrap().message, "Save failed: OpenAI API Key cannot be empty");

    let mut form = settings::current_form(&console);
    form.api_key = "sk-working-key-1".into();
    settings::test_connection(&console, &form).await;
    assert_eq!(backend.calls(Endpoint::TestOpenai), 1);
    assert_eq!(
        toast(&console),
        Some(Toast { level: ToastLevel::Success, message: "OpenAI connection OK".into() })
    );
}

#[tokio::test]
async fn reset_repopulates_from_loaded_config() {
    let (_backend, console) = console_with(FakeBackend::new().with_api_key("sk-abcdefghijkl"));
    console.navigate(Page::Settings).await;
    let before = settings::current_form(&console);

    settings::reset_config(&console);

    assert_eq!(settings::current_form(&console), before);
    assert_eq!(
        toast(&console),
        Some(Toast { level: ToastLevel::Info, message: "Settings reset".into() })
    );
}

// ── Papers and tasks ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn extraction_is_polled_until_completed() {
    let (backend, console) =
        console_with(FakeBackend::new().with_collected(vec![collected("p1", ExtractionStatus::NotExtracted)]));
    backend.next_task_id("t-9");
    backend.script_task(
        "t-9",
        vec![status(TaskState::Running, 50.0, "extracting"), status(TaskState::Completed, 100.0, "done")],
    );

    console.navigate(Page::Graph).await;
    papers::extract_paper(&console, "p1").await;

    assert!(console.poller.is_polling("t-9"));
    assert!(console.store.read(|s| s.extracting.contains("p1")));
    assert_eq!(
        toast(&console),
        Some(Toast { level: ToastLevel::Info, message: "Extraction task started".into() })
    );

    tokio::time::sleep(INTERVAL * 3).await;

    assert!(!console.poller.is_polling("t-9"));
    assert_eq!(backend.status_queries("t-9"), 2);
    assert!(console.store.read(|s| s.extracting.is_empty()));
    assert_eq!(toast(&console).unwrap().message, "Paper extraction completed");
    assert_eq!(backend.calls(Endpoint::CollectedPapers), 2);
    assert_eq!(backend.calls(Endpoint::SystemStatus), 1);
}

#[tokio::test(start_paused = true)]
async fn graph_build_progress_closes_exactly_once() {
    let (backend, console) = console_with(FakeBackend::new());
    backend.next_task_id("b-1");
    backend.script_task(
        "b-1",
        vec![status(TaskState::Running, 40.0, "communities"), status(TaskState::Completed, 100.0, "built")],
    );
    let mut events = console.store.subscribe();

    papers::build_graph(&console).await;
    assert!(console.store.read(|s| s.progress.open));

    tokio::time::sleep(INTERVAL * 3).await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.iter().filter(|e| **e == UiEvent::ProgressClosed).count(), 1);
    assert!(seen.contains(&UiEvent::ProgressUpdated { percent: 100.0, message: "built".into() }));

    let progress = console.store.read(|s| s.progress.clone());
    assert!(!progress.open);
    assert_eq!(progress.percent, 100.0);
    assert_eq!(toast(&console).unwrap().message, "Knowledge graph build completed");
}

#[tokio::test(start_paused = true)]
async fn finished_build_without_progress_keeps_last_percentage() {
    let (backend, console) = console_with(FakeBackend::new());
    backend.next_task_id("b-2");
    backend.script_task(
        "b-2",
        vec![status(TaskState::Running, 70.0, "indexing"), status_without_progress(TaskState::Completed, "built")],
    );

    papers::build_graph(&console).await;
    tokio::time::sleep(INTERVAL * 3).await;

    let progress = console.store.read(|s| s.progress.clone());
    assert!(!progress.open);
    assert_eq!(progress.percent, 70.0);
    assert_eq!(progress.message, "built");
}

#[tokio::test(start_paused = true)]
async fn failed_task_reports_message_and_reloads_papers() {
    let (backend, console) =
        console_with(FakeBackend::new().with_collected(vec![collected("p1", ExtractionStatus::Pending)]));
    backend.next_task_id("t-1");
    backend.script_task("t-1", vec![status(TaskState::Failed, 0.0, "X")]);

    papers::extract_paper(&console, "p1").await;
    tokio::time::sleep(INTERVAL * 2).await;

    let toast = toast(&console).unwrap();
    assert_eq!(toast.level, ToastLevel::Error);
    assert!(toast.message.contains('X'));
    assert_eq!(backend.calls(Endpoint::CollectedPapers), 1);
    assert!(console.poller.active().is_empty());
}

#[tokio::test]
async fn extraction_start_failure_is_reported() {
    let (backend, console) = console_with(FakeBackend::new());
    backend.fail_next(Endpoint::ExtractPaper, Failure::Api("Paper not collected".into()));

    papers::extract_paper(&console, "p1").await;

    assert_eq!(toast(&console).unwrap().message, "Extraction start failed: Paper not collected");
    assert!(console.poller.active().is_empty());
    assert!(console.store.read(|s| s.extracting.is_empty()));
}

#[tokio::test]
async fn clear_data_reloads_everything() {
    let (backend, console) =
        console_with(FakeBackend::new().with_collected(vec![collected("p1", ExtractionStatus::Completed)]));
    console.navigate(Page::Graph).await;
    assert_eq!(console.store.read(|s| s.papers.len()), 1);

    papers::clear_data(&console).await;

    assert!(console.store.read(|s| s.papers.is_empty()));
    assert_eq!(toast(&console).unwrap().message, "All data cleared");
    assert_eq!(backend.calls(Endpoint::CollectedPapers), 2);
    assert_eq!(backend.calls(Endpoint::SystemStatus), 1);
}

#[tokio::test]
async fn panel_toggles() {
    let (_backend, console) = console_with(FakeBackend::new());
    papers::toggle_panel(&console);
    assert!(console.store.read(|s| s.panel_collapsed));
    papers::toggle_panel(&console);
    assert!(!console.store.read(|s| s.panel_collapsed));
}

#[tokio::test]
async fn failed_paper_load_toasts() {
    let (backend, console) = console_with(FakeBackend::new());
    backend.fail_next(Endpoint::CollectedPapers, Failure::Transport);

    console.navigate(Page::Graph).await;

    assert_eq!(console.store.read(|s| s.current_page), Page::Graph);
    assert_eq!(toast(&console).unwrap().message, "Failed to load collected papers");
}
