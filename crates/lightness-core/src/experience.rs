use crate::types::{Emotion, Persona, Polarity, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sub-records
// ---------------------------------------------------------------------------

/// Written by the design wizard when an experience becomes `designed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub imagination: String,
    pub persona: Persona,
    #[serde(default)]
    pub side_quests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_idea: Option<String>,
    pub designed_at: DateTime<Utc>,
}

/// Written by the log screen when an experience becomes `logged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub reflection: String,
    pub emotion: Emotion,
    pub emotion_polarity: Polarity,
    #[serde(default)]
    pub follow_up_answer: String,
    pub logged_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

/// One reframed obligation and everything recorded about it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: u64,
    pub title: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Log>,
}

impl Experience {
    pub fn new(id: u64, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            status: Status::Undesigned,
            created_at,
            design: None,
            played_at: None,
            logged_at: None,
            log: None,
        }
    }

    pub fn persona(&self) -> Option<Persona> {
        self.design.as_ref().map(|d| d.persona)
    }

    pub fn emotion(&self) -> Option<Emotion> {
        self.log.as_ref().map(|l| l.emotion)
    }

    /// Merge `patch` into this record. Fields absent from the patch are left
    /// untouched; present sub-records replace the stored ones.
    pub fn apply(&mut self, patch: ExperiencePatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(design) = patch.design {
            self.design = Some(design);
        }
        if let Some(played_at) = patch.played_at {
            self.played_at = Some(played_at);
        }
        if let Some(logged_at) = patch.logged_at {
            self.logged_at = Some(logged_at);
        }
        if let Some(log) = patch.log {
            self.log = Some(log);
        }
    }

    /// Check the structural invariants tying sub-records to status.
    pub fn is_consistent(&self) -> bool {
        let design_ok = match self.status {
            Status::Undesigned => self.design.is_none(),
            _ => self.design.is_some(),
        };
        let played_ok = self.status < Status::Played || self.played_at.is_some();
        let log_ok = match self.status {
            Status::Logged => self.log.is_some(),
            _ => self.log.is_none(),
        };
        design_ok && played_ok && log_ok
    }
}

// ---------------------------------------------------------------------------
// ExperiencePatch
// ---------------------------------------------------------------------------

/// Partial update merged into a stored experience by `ExperienceDb::update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperiencePatch {
    pub status: Option<Status>,
    pub design: Option<Design>,
    pub played_at: Option<DateTime<Utc>>,
    pub logged_at: Option<DateTime<Utc>>,
    pub log: Option<Log>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
