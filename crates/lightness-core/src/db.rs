//! Persistent record store for experiences using redb.
//!
//! # Table design
//!
//! ```text
//! experiences  u64 id                                   → JSON Experience
//! meta         "next_id"                                → u64
//! by_status    [ status u8 | created_ms u64 BE | id u64 BE ] → ()
//! by_created   [ created_ms u64 BE | id u64 BE ]           → ()
//! by_persona   persona id  ⇉ record ids   (multimap)
//! by_emotion   emotion id  ⇉ record ids   (multimap)
//! ```
//!
//! Big-endian timestamps make byte order equal creation order, so a status
//! partition is a single prefix range scan. Ids break ties inside one
//! millisecond and only ever grow.
//!
//! Every committed write is announced on a broadcast channel; see
//! [`ExperienceDb::subscribe`].

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{
    Database, MultimapTableDefinition, ReadableMultimapTable, ReadableTable, TableDefinition,
    WriteTransaction,
};
use tokio::sync::broadcast;

use crate::error::{LightnessError, Result};
use crate::experience::{Experience, ExperiencePatch};
use crate::lifecycle::{attempt_transition, TransitionPayload};
use crate::types::{Emotion, Persona, SortOrder, Status};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const EXPERIENCES: TableDefinition<u64, &[u8]> = TableDefinition::new("experiences");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");
const BY_STATUS: TableDefinition<&[u8], ()> = TableDefinition::new("by_status");
const BY_CREATED: TableDefinition<&[u8], ()> = TableDefinition::new("by_created");
const BY_PERSONA: MultimapTableDefinition<&str, u64> = MultimapTableDefinition::new("by_persona");
const BY_EMOTION: MultimapTableDefinition<&str, u64> = MultimapTableDefinition::new("by_emotion");

const NEXT_ID: &str = "next_id";
const CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn created_ms(ts: DateTime<Utc>) -> u64 {
    ts.timestamp_millis().max(0) as u64
}

fn created_key(ts: DateTime<Utc>, id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&created_ms(ts).to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

fn status_key(status: Status, ts: DateTime<Utc>, id: u64) -> [u8; 17] {
    let mut key = [0u8; 17];
    key[0] = status.tag();
    key[1..].copy_from_slice(&created_key(ts, id));
    key
}

/// Inclusive bounds covering every key with the given status tag.
fn status_bounds(status: Status) -> ([u8; 17], [u8; 17]) {
    let mut lower = [0u8; 17];
    lower[0] = status.tag();
    let mut upper = [0xffu8; 17];
    upper[0] = status.tag();
    (lower, upper)
}

fn id_from_key(key: &[u8]) -> Result<u64> {
    let start = key
        .len()
        .checked_sub(8)
        .ok_or_else(|| LightnessError::Db(format!("index key too short: {} bytes", key.len())))?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&key[start..]);
    Ok(u64::from_be_bytes(bytes))
}

// ---------------------------------------------------------------------------
// Change notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
        }
    }
}

/// Emitted after every committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub id: u64,
    pub kind: ChangeKind,
}

/// Status partitions as shown on the home screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitions {
    /// Oldest first.
    pub undesigned: Vec<Experience>,
    /// `designed` and `played` together, oldest first.
    pub designed: Vec<Experience>,
    /// Newest first.
    pub logged: Vec<Experience>,
}

// ---------------------------------------------------------------------------
// ExperienceDb
// ---------------------------------------------------------------------------

/// Persistent store for `Experience` records.
pub struct ExperienceDb {
    db: Database,
    changes: broadcast::Sender<StoreChange>,
}

impl ExperienceDb {
    /// Open or create the redb database at `path`.
    ///
    /// Creates every table up front so read transactions never hit a
    /// missing table.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(LightnessError::db)?;
        let wt = db.begin_write().map_err(LightnessError::db)?;
        wt.open_table(EXPERIENCES).map_err(LightnessError::db)?;
        wt.open_table(META).map_err(LightnessError::db)?;
        wt.open_table(BY_STATUS).map_err(LightnessError::db)?;
        wt.open_table(BY_CREATED).map_err(LightnessError::db)?;
        wt.open_multimap_table(BY_PERSONA)
            .map_err(LightnessError::db)?;
        wt.open_multimap_table(BY_EMOTION)
            .map_err(LightnessError::db)?;
        wt.commit().map_err(LightnessError::db)?;

        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Ok(Self { db, changes })
    }

    /// Open the database under a data root (`<root>/.lightness/experiences.redb`).
    pub fn open_in(root: &Path) -> Result<Self> {
        Self::open(&crate::paths::db_path(root))
    }

    /// Receive a `StoreChange` for every write committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    fn notify(&self, id: u64, kind: ChangeKind) {
        // No receivers is fine: nobody is watching.
        let _ = self.changes.send(StoreChange { id, kind });
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new `undesigned` experience and return its id.
    pub fn create(&self, title: &str) -> Result<u64> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LightnessError::InvalidInput(
                "title must not be empty".to_string(),
            ));
        }

        let wt = self.db.begin_write().map_err(LightnessError::db)?;
        let id = {
            let mut meta = wt.open_table(META).map_err(LightnessError::db)?;
            let id = meta
                .get(NEXT_ID)
                .map_err(LightnessError::db)?
                .map(|g| g.value())
                .unwrap_or(1);
            meta.insert(NEXT_ID, id + 1).map_err(LightnessError::db)?;
            id
        };
        let experience = Experience::new(id, title, Utc::now());
        write_record(&wt, None, &experience)?;
        wt.commit().map_err(LightnessError::db)?;

        tracing::info!(id, title = %experience.title, "experience created");
        self.notify(id, ChangeKind::Created);
        Ok(id)
    }

    /// Merge `patch` into the stored record.
    ///
    /// This is a raw write: it does not check that the status change is a
    /// legal lifecycle step. Screens use [`ExperienceDb::transition`].
    pub fn update(&self, id: u64, patch: ExperiencePatch) -> Result<Experience> {
        let wt = self.db.begin_write().map_err(LightnessError::db)?;
        let old = read_record(&wt, id)?.ok_or(LightnessError::NotFound(id))?;
        let mut updated = old.clone();
        updated.apply(patch);
        write_record(&wt, Some(&old), &updated)?;
        wt.commit().map_err(LightnessError::db)?;

        self.notify(id, ChangeKind::Updated);
        Ok(updated)
    }

    /// Validate and apply one lifecycle transition inside a single write
    /// transaction. Nothing is written when validation fails.
    pub fn transition(
        &self,
        id: u64,
        expected: Status,
        next: Status,
        payload: TransitionPayload,
    ) -> Result<Experience> {
        let wt = self.db.begin_write().map_err(LightnessError::db)?;
        let old = read_record(&wt, id)?.ok_or(LightnessError::NotFound(id))?;
        let patch = attempt_transition(&old, expected, next, payload, Utc::now())?;
        let mut updated = old.clone();
        updated.apply(patch);
        write_record(&wt, Some(&old), &updated)?;
        wt.commit().map_err(LightnessError::db)?;

        tracing::info!(id, from = %old.status, to = %updated.status, "experience transitioned");
        self.notify(id, ChangeKind::Updated);
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get(&self, id: u64) -> Result<Option<Experience>> {
        let rt = self.db.begin_read().map_err(LightnessError::db)?;
        let table = rt.open_table(EXPERIENCES).map_err(LightnessError::db)?;
        let value = table.get(id).map_err(LightnessError::db)?;
        match value {
            Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_required(&self, id: u64) -> Result<Experience> {
        self.get(id)?.ok_or(LightnessError::NotFound(id))
    }

    /// Records with `status`, ordered by creation time.
    pub fn query_by_status(&self, status: Status, order: SortOrder) -> Result<Vec<Experience>> {
        self.query_by_statuses(&[status], order)
    }

    /// Records whose status is any of `statuses`, merged and ordered by
    /// creation time. Every partition is read from the same snapshot.
    pub fn query_by_statuses(
        &self,
        statuses: &[Status],
        order: SortOrder,
    ) -> Result<Vec<Experience>> {
        let rt = self.db.begin_read().map_err(LightnessError::db)?;
        let index = rt.open_table(BY_STATUS).map_err(LightnessError::db)?;
        let records = rt.open_table(EXPERIENCES).map_err(LightnessError::db)?;
        scan_statuses(&index, &records, statuses, order)
    }

    /// The three home-screen partitions, read from one snapshot.
    pub fn partitions(&self) -> Result<Partitions> {
        let rt = self.db.begin_read().map_err(LightnessError::db)?;
        let index = rt.open_table(BY_STATUS).map_err(LightnessError::db)?;
        let records = rt.open_table(EXPERIENCES).map_err(LightnessError::db)?;
        Ok(Partitions {
            undesigned: scan_statuses(
                &index,
                &records,
                &[Status::Undesigned],
                SortOrder::Ascending,
            )?,
            designed: scan_statuses(
                &index,
                &records,
                &[Status::Designed, Status::Played],
                SortOrder::Ascending,
            )?,
            logged: scan_statuses(
                &index,
                &records,
                &[Status::Logged],
                SortOrder::Descending,
            )?,
        })
    }

    pub fn query_by_persona(&self, persona: Persona) -> Result<Vec<Experience>> {
        let rt = self.db.begin_read().map_err(LightnessError::db)?;
        let index = rt
            .open_multimap_table(BY_PERSONA)
            .map_err(LightnessError::db)?;
        let records = rt.open_table(EXPERIENCES).map_err(LightnessError::db)?;

        let mut ids = Vec::new();
        for id in index.get(persona.as_str()).map_err(LightnessError::db)? {
            ids.push(id.map_err(LightnessError::db)?.value());
        }
        load_many(&records, ids)
    }

    pub fn query_by_emotion(&self, emotion: Emotion) -> Result<Vec<Experience>> {
        let rt = self.db.begin_read().map_err(LightnessError::db)?;
        let index = rt
            .open_multimap_table(BY_EMOTION)
            .map_err(LightnessError::db)?;
        let records = rt.open_table(EXPERIENCES).map_err(LightnessError::db)?;

        let mut ids = Vec::new();
        for id in index.get(emotion.as_str()).map_err(LightnessError::db)? {
            ids.push(id.map_err(LightnessError::db)?.value());
        }
        load_many(&records, ids)
    }

    /// Every record, oldest first.
    pub fn list_all(&self) -> Result<Vec<Experience>> {
        let rt = self.db.begin_read().map_err(LightnessError::db)?;
        let index = rt.open_table(BY_CREATED).map_err(LightnessError::db)?;
        let records = rt.open_table(EXPERIENCES).map_err(LightnessError::db)?;

        let mut ids = Vec::new();
        for entry in index.iter().map_err(LightnessError::db)? {
            let (k, _) = entry.map_err(LightnessError::db)?;
            ids.push(id_from_key(k.value())?);
        }
        load_many(&records, ids)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

fn read_record(wt: &WriteTransaction, id: u64) -> Result<Option<Experience>> {
    let table = wt.open_table(EXPERIENCES).map_err(LightnessError::db)?;
    let value = table.get(id).map_err(LightnessError::db)?;
    match value {
        Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
        None => Ok(None),
    }
}

/// Write `new` and bring every index in line with it, removing the entries
/// that belonged to `old`.
fn write_record(wt: &WriteTransaction, old: Option<&Experience>, new: &Experience) -> Result<()> {
    let value = serde_json::to_vec(new)?;
    {
        let mut table = wt.open_table(EXPERIENCES).map_err(LightnessError::db)?;
        table
            .insert(new.id, value.as_slice())
            .map_err(LightnessError::db)?;
    }
    {
        let mut by_status = wt.open_table(BY_STATUS).map_err(LightnessError::db)?;
        if let Some(old) = old {
            let key = status_key(old.status, old.created_at, old.id);
            by_status
                .remove(key.as_slice())
                .map_err(LightnessError::db)?;
        }
        let key = status_key(new.status, new.created_at, new.id);
        by_status
            .insert(key.as_slice(), ())
            .map_err(LightnessError::db)?;
    }
    if old.is_none() {
        let mut by_created = wt.open_table(BY_CREATED).map_err(LightnessError::db)?;
        let key = created_key(new.created_at, new.id);
        by_created
            .insert(key.as_slice(), ())
            .map_err(LightnessError::db)?;
    }
    {
        let mut by_persona = wt
            .open_multimap_table(BY_PERSONA)
            .map_err(LightnessError::db)?;
        if let Some(persona) = old.and_then(Experience::persona) {
            by_persona
                .remove(persona.as_str(), new.id)
                .map_err(LightnessError::db)?;
        }
        if let Some(persona) = new.persona() {
            by_persona
                .insert(persona.as_str(), new.id)
                .map_err(LightnessError::db)?;
        }
    }
    {
        let mut by_emotion = wt
            .open_multimap_table(BY_EMOTION)
            .map_err(LightnessError::db)?;
        if let Some(emotion) = old.and_then(Experience::emotion) {
            by_emotion
                .remove(emotion.as_str(), new.id)
                .map_err(LightnessError::db)?;
        }
        if let Some(emotion) = new.emotion() {
            by_emotion
                .insert(emotion.as_str(), new.id)
                .map_err(LightnessError::db)?;
        }
    }
    Ok(())
}

/// Index keys sort by creation time within a status, and ids never repeat
/// across statuses, so merging is a sort of the collected keys.
fn scan_statuses(
    index: &impl ReadableTable<&'static [u8], ()>,
    records: &impl ReadableTable<u64, &'static [u8]>,
    statuses: &[Status],
    order: SortOrder,
) -> Result<Vec<Experience>> {
    let mut keys: Vec<[u8; 16]> = Vec::new();
    for &status in statuses {
        let (lower, upper) = status_bounds(status);
        for entry in index
            .range(lower.as_slice()..=upper.as_slice())
            .map_err(LightnessError::db)?
        {
            let (k, _) = entry.map_err(LightnessError::db)?;
            let k = k.value();
            let mut key = [0u8; 16];
            key.copy_from_slice(k.get(1..17).ok_or_else(|| {
                LightnessError::Db(format!("status key has {} bytes", k.len()))
            })?);
            keys.push(key);
        }
    }
    keys.sort_unstable();
    if order == SortOrder::Descending {
        keys.reverse();
    }
    let ids = keys
        .iter()
        .map(|k| id_from_key(k.as_slice()))
        .collect::<Result<Vec<_>>>()?;
    load_many(records, ids)
}

fn load_many(
    records: &impl ReadableTable<u64, &'static [u8]>,
    ids: Vec<u64>,
) -> Result<Vec<Experience>> {
    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        let value = records.get(id).map_err(LightnessError::db)?;
        match value {
            Some(v) => result.push(serde_json::from_slice(v.value())?),
            None => {
                return Err(LightnessError::Db(format!(
                    "index points at missing experience {id}"
                )))
            }
        }
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
