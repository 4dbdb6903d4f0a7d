use papergraph_client::Backend;
use tracing::{debug, warn};

use crate::store::{Action, Store};

/// Reload the collected/entity counters. Failures are only logged.
pub async fn refresh_status(store: &Store, backend: &dyn Backend) {
    match backend.system_status().await {
        Ok(status) => {
            debug!(
                collected = status.collected_papers,
                entities = status.entities_count,
                "System status refreshed"
            );
            store.dispatch(Action::StatusLoaded(status));
        }
        Err(e) => warn!(error = %e, "Failed to refresh system status"),
    }
}
