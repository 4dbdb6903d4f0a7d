//! User actions. Each one validates its input, issues a single backend
//! request and turns the outcome into store actions and toasts.

pub mod chat;
pub mod papers;
pub mod search;
pub mod settings;
pub mod status;

use papergraph_common::PapergraphError;
use tracing::warn;

use crate::events::ToastLevel;
use crate::store::Store;

/// Toast a failed request: `"{prefix}: {error}"` when the backend reported an
/// error, `transport_msg` otherwise.
pub(crate) fn report_failure(store: &Store, err: &PapergraphError, prefix: &str, transport_msg: &str) {
    match err.api_message() {
        Some(msg) => store.toast(ToastLevel::Error, format!("{}: {}", prefix, msg)),
        None => {
            warn!(error = %err, "{}", transport_msg);
            store.toast(ToastLevel::Error, transport_msg);
        }
    }
}
