//! Task lifecycle state machine.
//!
//! ```text
//! undesigned ──design──▶ designed ──play──▶ played ──log──▶ logged
//! ```
//!
//! Every screen goes through [`attempt_transition`], which checks the
//! record's current status, the requested target, and the payload, and
//! returns the patch to persist. Nothing here touches the store.

use crate::error::{LightnessError, Result};
use crate::experience::{Design, Experience, ExperiencePatch, Log};
use crate::types::{Emotion, Persona, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Raw wizard input. `persona` is parsed during validation so callers can
/// pass user-supplied identifiers straight through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignInput {
    pub imagination: String,
    pub persona: String,
    pub side_quests: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogInput {
    pub reflection: String,
    pub emotion: String,
    pub follow_up_answer: String,
}

#[derive(Debug, Clone)]
pub enum TransitionPayload {
    Design(DesignInput),
    Play,
    Log(LogInput),
}

impl TransitionPayload {
    /// The status this payload moves a record into.
    pub fn target(&self) -> Status {
        match self {
            TransitionPayload::Design(_) => Status::Designed,
            TransitionPayload::Play => Status::Played,
            TransitionPayload::Log(_) => Status::Logged,
        }
    }
}

// ---------------------------------------------------------------------------
// attempt_transition
// ---------------------------------------------------------------------------

/// Validate a single forward transition and build the patch that performs it.
///
/// Fails with `InvalidTransition` when `record.status != expected`, when
/// `next` is not the immediate successor of `expected`, or when the payload
/// belongs to a different transition. Payload fields are validated after the
/// status checks.
pub fn attempt_transition(
    record: &Experience,
    expected: Status,
    next: Status,
    payload: TransitionPayload,
    now: DateTime<Utc>,
) -> Result<ExperiencePatch> {
    if record.status != expected {
        return Err(invalid(
            record.status,
            next,
            format!("expected status '{expected}', found '{}'", record.status),
        ));
    }

    if expected.next() != Some(next) {
        return Err(invalid(
            expected,
            next,
            "transitions move forward exactly one step".to_string(),
        ));
    }

    if payload.target() != next {
        return Err(invalid(
            expected,
            next,
            format!("payload is for the '{}' transition", payload.target()),
        ));
    }

    match payload {
        TransitionPayload::Design(input) => {
            let design = build_design(input, now)?;
            Ok(ExperiencePatch {
                status: Some(Status::Designed),
                design: Some(design),
                ..Default::default()
            })
        }
        TransitionPayload::Play => Ok(ExperiencePatch {
            status: Some(Status::Played),
            played_at: Some(now),
            ..Default::default()
        }),
        TransitionPayload::Log(input) => {
            let log = build_log(input, now)?;
            Ok(ExperiencePatch {
                status: Some(Status::Logged),
                logged_at: Some(now),
                log: Some(log),
                ..Default::default()
            })
        }
    }
}

fn invalid(from: Status, to: Status, reason: String) -> LightnessError {
    LightnessError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason,
    }
}

fn build_design(input: DesignInput, now: DateTime<Utc>) -> Result<Design> {
    let imagination = input.imagination.trim().to_string();
    if imagination.is_empty() {
        return Err(LightnessError::InvalidInput(
            "imagination must not be empty".to_string(),
        ));
    }
    let persona: Persona = input.persona.trim().parse()?;
    let side_quests = input
        .side_quests
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    Ok(Design {
        fun_idea: Some(imagination.clone()),
        imagination,
        persona,
        side_quests,
        designed_at: now,
    })
}

fn build_log(input: LogInput, now: DateTime<Utc>) -> Result<Log> {
    let reflection = input.reflection.trim().to_string();
    if reflection.is_empty() {
        return Err(LightnessError::InvalidInput(
            "reflection must not be empty".to_string(),
        ));
    }
    let emotion: Emotion = input.emotion.trim().parse()?;

    Ok(Log {
        reflection,
        emotion,
        emotion_polarity: emotion.polarity(),
        follow_up_answer: input.follow_up_answer.trim().to_string(),
        logged_at: now,
    })
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

/// A stage of the app that performs one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Design,
    Play,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenGuard {
    Proceed,
    RedirectHome,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Design => "design",
            Screen::Play => "play",
            Screen::Log => "log",
        }
    }

    /// Status a record must hold for this screen to be shown.
    pub fn expected_status(self) -> Status {
        match self {
            Screen::Design => Status::Undesigned,
            Screen::Play => Status::Designed,
            Screen::Log => Status::Played,
        }
    }

    pub fn target_status(self) -> Status {
        match self {
            Screen::Design => Status::Designed,
            Screen::Play => Status::Played,
            Screen::Log => Status::Logged,
        }
    }

    pub fn guard(self, record: &Experience) -> ScreenGuard {
        if record.status == self.expected_status() {
            ScreenGuard::Proceed
        } else {
            ScreenGuard::RedirectHome
        }
    }

    /// Where the user goes after completing this screen for `id`.
    pub fn next_route(self, id: u64) -> String {
        match self {
            Screen::Design => format!("/play/{id}"),
            Screen::Play => format!("/log/{id}"),
            Screen::Log => "/".to_string(),
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Screen {
    type Err = LightnessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "design" => Ok(Screen::Design),
            "play" => Ok(Screen::Play),
            "log" => Ok(Screen::Log),
            _ => Err(LightnessError::InvalidInput(format!("unknown screen '{s}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
