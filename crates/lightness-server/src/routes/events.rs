use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use lightness_core::db::StoreChange;
use std::convert::Infallible;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// One frame of the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    Changed(StoreChange),
    /// Store changes were dropped before reaching the feed; clients re-read
    /// everything.
    Resync,
}

impl FeedEvent {
    fn into_sse(self) -> Event {
        let data = match self {
            FeedEvent::Changed(change) => serde_json::json!({
                "id": change.id,
                "kind": change.kind.as_str(),
            })
            .to_string(),
            FeedEvent::Resync => "resync".to_string(),
        };
        Event::default().event("update").data(data)
    }
}

/// Relay store changes into the feed until the store goes away.
pub(crate) async fn forward(
    mut changes: broadcast::Receiver<StoreChange>,
    feed: broadcast::Sender<FeedEvent>,
) {
    loop {
        let event = match changes.recv().await {
            Ok(change) => FeedEvent::Changed(change),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!(skipped = n, "change feed lagged");
                FeedEvent::Resync
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        // No open streams is fine.
        let _ = feed.send(event);
    }
}

/// GET /api/events: SSE stream with one `update` frame per store write.
///
/// A slow client that falls behind gets a single `resync` frame instead of
/// the frames it missed.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let stream = BroadcastStream::new(app.event_tx.subscribe()).map(|msg| {
        let event = msg.unwrap_or(FeedEvent::Resync);
        Ok::<Event, Infallible>(event.into_sse())
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
