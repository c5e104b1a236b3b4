use lightness_core::config::Config;
use lightness_core::db::ExperienceDb;
use lightness_core::state::ExperienceState;
use lightness_core::subscriber::DataSubscriber;
use std::path::PathBuf;
use std::sync::Arc;
use suggestion_agent::SuggestionGenerator;
use tokio::sync::broadcast;

use crate::routes::events::{forward, FeedEvent};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub experiences: Arc<ExperienceState>,
    pub suggestions: Arc<SuggestionGenerator>,
    pub event_tx: broadcast::Sender<FeedEvent>,
}

impl AppState {
    /// Load config, open the record store, and build the suggestion
    /// generator for the data root.
    pub fn new(root: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load(&root)?;
        let db = ExperienceDb::open_in(&root)?;
        let suggestions = SuggestionGenerator::from_config(&config.suggestions)?;
        if !suggestions.has_model() {
            tracing::warn!(
                "{} is not set; suggestions will come from fallback templates",
                config.suggestions.api_key_env
            );
        }
        Ok(Self::with_parts(root, config, db, suggestions))
    }

    pub fn with_parts(
        root: PathBuf,
        config: Config,
        db: ExperienceDb,
        suggestions: SuggestionGenerator,
    ) -> Self {
        let (tx, _) = broadcast::channel(64);
        let changes = db.subscribe();
        let experiences = Arc::new(ExperienceState::new(Arc::new(db)));
        let state = Self {
            root,
            config: Arc::new(config),
            experiences: Arc::clone(&experiences),
            suggestions: Arc::new(suggestions),
            event_tx: tx.clone(),
        };

        // Keep the live views current and fan store changes out to SSE
        // clients. Only spawned inside a Tokio runtime (skipped in sync unit
        // tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let subscriber = Arc::new(DataSubscriber::new(experiences));
            let sub_rx = changes.resubscribe();
            tokio::spawn(subscriber.run(sub_rx));

            tokio::spawn(forward(changes, tx));
        }

        state
    }
}
