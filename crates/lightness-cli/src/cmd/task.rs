use crate::output::{print_json, print_table};
use clap::Subcommand;
use lightness_core::experience::Experience;
use lightness_core::state::{ExperienceState, TaskLists};
use lightness_core::types::{SortOrder, Status};
use std::path::Path;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Record a new chore
    Add {
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// List experiences, grouped like the home screen
    List {
        /// Only show one status (undesigned, designed, played, logged)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show full details for one experience
    Show { id: u64 },
    /// Re-read the home-screen lists from the store
    Refresh,
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    let state = ExperienceState::new(Arc::new(super::open_db(root)?));
    match subcmd {
        TaskSubcommand::Add { title } => add(&state, &title.join(" "), json),
        TaskSubcommand::List { status } => list(&state, status.as_deref(), json),
        TaskSubcommand::Show { id } => show(&state, id, json),
        TaskSubcommand::Refresh => refresh(&state, json),
    }
}

fn add(state: &ExperienceState, title: &str, json: bool) -> anyhow::Result<()> {
    let id = state.add_task(title)?;
    if json {
        print_json(&state.db().get_required(id)?)?;
    } else {
        println!("Added experience {id}: {}", title.trim());
    }
    Ok(())
}

fn list(state: &ExperienceState, status: Option<&str>, json: bool) -> anyhow::Result<()> {
    if let Some(status) = status {
        let status: Status = status.parse()?;
        let records = state.db().query_by_status(status, SortOrder::Ascending)?;
        if json {
            return print_json(&records);
        }
        print_records(&records);
        return Ok(());
    }

    state.refresh_tasks()?;
    let lists = state.snapshot();
    if json {
        print_json(&lists)
    } else {
        print_lists(&lists);
        Ok(())
    }
}

fn show(state: &ExperienceState, id: u64, json: bool) -> anyhow::Result<()> {
    let record = state.db().get_required(id)?;
    if json {
        return print_json(&record);
    }
    print_experience(&record);
    Ok(())
}

fn refresh(state: &ExperienceState, json: bool) -> anyhow::Result<()> {
    state.refresh_tasks()?;
    let lists = state.snapshot();
    if json {
        print_json(&lists)
    } else {
        println!(
            "{} to design, {} to play or log, {} logged",
            lists.undesigned_tasks.len(),
            lists.designed_tasks.len(),
            lists.logged_tasks.len()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_lists(lists: &TaskLists) {
    let groups = [
        ("To design", &lists.undesigned_tasks),
        ("Ready to play", &lists.designed_tasks),
        ("Logged", &lists.logged_tasks),
    ];
    for (i, (heading, records)) in groups.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{heading} ({})", records.len());
        if !records.is_empty() {
            print_records(records);
        }
    }
}

fn print_records(records: &[Experience]) {
    let rows = records
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.status.to_string(),
                e.title.clone(),
                e.persona().map(|p| p.to_string()).unwrap_or_default(),
                e.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "TITLE", "PERSONA", "CREATED"], rows);
}

pub fn print_experience(e: &Experience) {
    println!("#{} {}", e.id, e.title);
    println!("  status:   {}", e.status);
    println!("  created:  {}", e.created_at.to_rfc3339());
    if let Some(design) = &e.design {
        println!(
            "  persona:  {} ({})",
            design.persona,
            design.persona.display_name()
        );
        println!("  imagine:  {}", design.imagination);
        for quest in &design.side_quests {
            println!("    - {quest}");
        }
    }
    if let Some(played_at) = e.played_at {
        println!("  played:   {}", played_at.to_rfc3339());
    }
    if let Some(log) = &e.log {
        println!(
            "  feeling:  {} {} ({})",
            log.emotion.emoji(),
            log.emotion.label(),
            log.emotion_polarity
        );
        println!("  reflect:  {}", log.reflection);
        if !log.follow_up_answer.is_empty() {
            println!("  answer:   {}", log.follow_up_answer);
        }
    }
}
