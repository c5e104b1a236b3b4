//! Live views over the record store.
//!
//! [`DataSubscriber`] recomputes the home-screen partitions whenever the store
//! announces a change and pushes them into [`ExperienceState`].

use crate::db::StoreChange;
use crate::state::ExperienceState;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct DataSubscriber {
    state: Arc<ExperienceState>,
}

impl DataSubscriber {
    pub fn new(state: Arc<ExperienceState>) -> Self {
        Self { state }
    }

    /// Recompute the three live views from one store snapshot and push them
    /// into the container.
    ///
    /// When the query fails the views keep their previous values.
    pub fn publish(&self) {
        match self.state.db().partitions() {
            Ok(parts) => {
                tracing::debug!(
                    undesigned = parts.undesigned.len(),
                    designed = parts.designed.len(),
                    logged = parts.logged.len(),
                    "views published"
                );
                self.state.set_partitions(parts);
            }
            Err(e) => tracing::warn!("live query failed: {e}"),
        }
    }

    /// Publish once, then again after every store change until the channel
    /// closes. Queries run on the blocking pool.
    pub async fn run(self: Arc<Self>, mut rx: broadcast::Receiver<StoreChange>) {
        self.publish_blocking().await;
        loop {
            match rx.recv().await {
                Ok(change) => {
                    tracing::debug!(id = change.id, kind = ?change.kind, "store changed");
                    self.publish_blocking().await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Views are rebuilt from scratch, so skipped events lose nothing.
                    tracing::debug!(skipped = n, "subscriber lagged");
                    self.publish_blocking().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn publish_blocking(self: &Arc<Self>) {
        let this = Arc::clone(self);
        if let Err(e) = tokio::task::spawn_blocking(move || this.publish()).await {
            tracing::warn!("publish task failed: {e}");
        }
    }
}
