//! `/api/events`: UI events as named Server-Sent Events.
//!
//! Each [`UiEvent`] goes out with its `type` tag as the SSE event name and the
//! full JSON as data, so the browser registers one listener per kind.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_core::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::events::UiEvent;
use crate::state::SharedState;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Browser subscribed to UI events");
    let stream = BroadcastStream::new(state.subscribe()).filter_map(to_sse_event);
    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("keep-alive"))
}

/// A lagging browser skips what it missed; the next page load resyncs it.
fn to_sse_event(
    received: Result<UiEvent, BroadcastStreamRecvError>,
) -> Option<Result<Event, Infallible>> {
    let event = match received {
        Ok(event) => event,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(skipped, "SSE subscriber lagged; events dropped");
            return None;
        }
    };
    match Event::default().event(event.kind()).json_data(&event) {
        Ok(sse) => Some(Ok(sse)),
        Err(e) => {
            warn!(kind = event.kind(), error = %e, "Failed to encode UI event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ToastLevel;

    #[test]
    fn lagged_receivers_skip_missed_events() {
        assert!(to_sse_event(Err(BroadcastStreamRecvError::Lagged(3))).is_none());
    }

    #[test]
    fn events_are_encoded() {
        let toast = UiEvent::Toast { level: ToastLevel::Success, message: "Paper collected".into() };
        assert!(matches!(to_sse_event(Ok(toast)), Some(Ok(_))));
    }
}
