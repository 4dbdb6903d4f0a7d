use papergraph_common::models::QueryMode;
use tracing::warn;

use crate::console::Console;
use crate::store::{Action, ChatMessage};

/// Ask the knowledge graph a question. Both the question and the reply
/// (or an apology) are appended to the chat history.
pub async fn send_message(console: &Console, question: &str, mode: QueryMode) {
    let question = question.trim();
    if question.is_empty() {
        return;
    }
    console.store.dispatch(Action::ChatAppended(ChatMessage::user(question)));

    let reply = match console.backend.query(question, mode).await {
        Ok(answer) => answer
            .answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Sorry, the query failed: unknown error".to_string()),
        Err(e) => match e.api_message() {
            Some(msg) => format!("Sorry, the query failed: {}", msg),
            None => {
                warn!(error = %e, "Query request failed");
                "Sorry, the network request failed, please try again later.".to_string()
            }
        },
    };
    console.store.dispatch(Action::ChatAppended(ChatMessage::assistant(reply)));
}
