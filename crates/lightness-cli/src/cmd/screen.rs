//! `design`, `play`, and `log`: one lifecycle step each.

use crate::output::print_json;
use lightness_core::experience::Experience;
use lightness_core::lifecycle::{DesignInput, LogInput, Screen, ScreenGuard, TransitionPayload};
use std::path::Path;

pub fn design(
    root: &Path,
    id: u64,
    imagination: String,
    persona: String,
    side_quests: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let payload = TransitionPayload::Design(DesignInput {
        imagination,
        persona,
        side_quests,
    });
    complete(root, id, Screen::Design, payload, json)
}

pub fn play(root: &Path, id: u64, json: bool) -> anyhow::Result<()> {
    complete(root, id, Screen::Play, TransitionPayload::Play, json)
}

pub fn log(
    root: &Path,
    id: u64,
    reflection: String,
    emotion: String,
    follow_up_answer: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let payload = TransitionPayload::Log(LogInput {
        reflection,
        emotion,
        follow_up_answer: follow_up_answer.unwrap_or_default(),
    });
    complete(root, id, Screen::Log, payload, json)
}

fn complete(
    root: &Path,
    id: u64,
    screen: Screen,
    payload: TransitionPayload,
    json: bool,
) -> anyhow::Result<()> {
    let db = super::open_db(root)?;

    let current = db.get_required(id)?;
    if screen.guard(&current) == ScreenGuard::RedirectHome {
        anyhow::bail!(
            "experience {id} is {}; the {screen} step needs it to be {}",
            current.status,
            screen.expected_status()
        );
    }

    let record = db.transition(id, screen.expected_status(), screen.target_status(), payload)?;
    if json {
        return print_json(&serde_json::json!({
            "experience": record,
            "next": screen.next_route(id),
        }));
    }
    print_outcome(screen, &record);
    Ok(())
}

fn print_outcome(screen: Screen, record: &Experience) {
    match screen {
        Screen::Design => {
            println!("Designed #{} {}", record.id, record.title);
            println!("Next: lightness play {}", record.id);
        }
        Screen::Play => {
            println!("Played #{} {}", record.id, record.title);
            println!("Next: lightness log {}", record.id);
        }
        Screen::Log => {
            println!("Logged #{} {}", record.id, record.title);
            if let Some(log) = &record.log {
                println!(
                    "{} {}  {}",
                    log.emotion.emoji(),
                    log.emotion.label(),
                    log.emotion_polarity.follow_up_question()
                );
            }
        }
    }
}
