use crate::db::{ExperienceDb, Partitions};
use crate::error::{LightnessError, Result};
use crate::experience::Experience;
use crate::types::{SortOrder, Status};
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ---------------------------------------------------------------------------
// TaskLists
// ---------------------------------------------------------------------------

/// Cached partitions of the store, as shown on the home and playbook screens.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLists {
    pub undesigned_tasks: Vec<Experience>,
    /// `designed` and `played` records together.
    pub designed_tasks: Vec<Experience>,
    /// Newest first.
    pub logged_tasks: Vec<Experience>,
    /// Filled by [`ExperienceState::refresh_logged_experiences`].
    pub logged_experiences: Vec<Experience>,
}

// ---------------------------------------------------------------------------
// ExperienceState
// ---------------------------------------------------------------------------

/// Application state container.
///
/// A derived cache over [`ExperienceDb`]: lists start empty and are filled
/// either by the subscriber or by the explicit refresh operations. The store
/// stays the authority.
pub struct ExperienceState {
    db: Arc<ExperienceDb>,
    lists: RwLock<TaskLists>,
}

impl ExperienceState {
    pub fn new(db: Arc<ExperienceDb>) -> Self {
        Self {
            db,
            lists: RwLock::new(TaskLists::default()),
        }
    }

    pub fn db(&self) -> &Arc<ExperienceDb> {
        &self.db
    }

    // A panicked writer cannot leave a list half-replaced, so poisoned locks
    // are recovered.
    fn read(&self) -> RwLockReadGuard<'_, TaskLists> {
        self.lists.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TaskLists> {
        self.lists.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a new `undesigned` record. Local lists are left alone; they
    /// catch up through the subscriber or a refresh.
    pub fn add_task(&self, title: &str) -> Result<u64> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LightnessError::InvalidInput(
                "title must not be empty".to_string(),
            ));
        }
        self.db.create(title)
    }

    /// Re-query all three partitions straight from the store, from a single
    /// snapshot.
    pub fn refresh_tasks(&self) -> Result<()> {
        self.set_partitions(self.db.partitions()?);
        Ok(())
    }

    /// Replace the three home-screen lists at once.
    pub fn set_partitions(&self, parts: Partitions) {
        let mut lists = self.write();
        lists.undesigned_tasks = parts.undesigned;
        lists.designed_tasks = parts.designed;
        lists.logged_tasks = parts.logged;
    }

    pub fn refresh_logged_experiences(&self) -> Result<()> {
        let logged = self
            .db
            .query_by_status(Status::Logged, SortOrder::Descending)?;
        self.write().logged_experiences = logged;
        Ok(())
    }

    pub fn set_undesigned_tasks(&self, tasks: Vec<Experience>) {
        self.write().undesigned_tasks = tasks;
    }

    pub fn set_designed_tasks(&self, tasks: Vec<Experience>) {
        self.write().designed_tasks = tasks;
    }

    pub fn set_logged_tasks(&self, tasks: Vec<Experience>) {
        self.write().logged_tasks = tasks;
    }

    pub fn set_logged_experiences(&self, experiences: Vec<Experience>) {
        self.write().logged_experiences = experiences;
    }

    pub fn snapshot(&self) -> TaskLists {
        self.read().clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{DesignInput, TransitionPayload};
    use tempfile::TempDir;

    fn state() -> (TempDir, ExperienceState) {
        let dir = TempDir::new().unwrap();
        let db = ExperienceDb::open(&dir.path().join("state.redb")).unwrap();
        (dir, ExperienceState::new(Arc::new(db)))
    }

    #[test]
    fn starts_empty() {
        let (_dir, state) = state();
        assert_eq!(state.snapshot(), TaskLists::default());
    }

    #[test]
    fn add_task_writes_store_but_not_lists() {
        let (_dir, state) = state();
        let first = state.add_task("  洗碗  ").unwrap();
        let second = state.add_task("倒垃圾").unwrap();
        assert!(second > first);

        assert!(state.snapshot().undesigned_tasks.is_empty());
        assert_eq!(state.db().get_required(first).unwrap().title, "洗碗");
    }

    #[test]
    fn add_task_rejects_blank_title() {
        let (_dir, state) = state();
        assert!(matches!(
            state.add_task("\t "),
            Err(LightnessError::InvalidInput(_))
        ));
        assert!(state.db().list_all().unwrap().is_empty());
    }

    #[test]
    fn refresh_tasks_partitions_by_status() {
        let (_dir, state) = state();
        let a = state.add_task("a").unwrap();
        let b = state.add_task("b").unwrap();
        let c = state.add_task("c").unwrap();
        state
            .db()
            .transition(
                b,
                Status::Undesigned,
                Status::Designed,
                TransitionPayload::Design(DesignInput {
                    imagination: "游戏".into(),
                    persona: "competitor".into(),
                    side_quests: vec![],
                }),
            )
            .unwrap();
        state
            .db()
            .transition(b, Status::Designed, Status::Played, TransitionPayload::Play)
            .unwrap();

        state.refresh_tasks().unwrap();
        let lists = state.snapshot();
        let ids = |v: &[Experience]| v.iter().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(ids(&lists.undesigned_tasks), vec![a, c]);
        assert_eq!(ids(&lists.designed_tasks), vec![b]);
        assert!(lists.logged_tasks.is_empty());
        assert!(lists.logged_experiences.is_empty());
    }

    #[test]
    fn setters_replace_single_lists() {
        let (_dir, state) = state();
        let id = state.add_task("洗碗").unwrap();
        let record = state.db().get_required(id).unwrap();

        state.set_undesigned_tasks(vec![record.clone()]);
        state.set_logged_experiences(vec![record]);
        let lists = state.snapshot();
        assert_eq!(lists.undesigned_tasks.len(), 1);
        assert_eq!(lists.logged_experiences.len(), 1);
        assert!(lists.designed_tasks.is_empty());

        state.set_undesigned_tasks(Vec::new());
        assert!(state.snapshot().undesigned_tasks.is_empty());
    }
}
