use crate::output::{print_json, print_table};
use lightness_core::playbook::{Playbook, PlaybookEntry, PlaybookFilter};
use lightness_core::state::ExperienceState;
use std::path::Path;
use std::sync::Arc;

pub fn run(root: &Path, query: Option<&str>, filter: &str, json: bool) -> anyhow::Result<()> {
    let filter: PlaybookFilter = filter.parse()?;
    let state = ExperienceState::new(Arc::new(super::open_db(root)?));
    state.refresh_logged_experiences()?;
    let logged = state.snapshot().logged_experiences;
    let book = Playbook::build(&logged, query.unwrap_or(""), filter);

    if json {
        return print_json(&book);
    }

    println!(
        "{} logged, {} successes, {} data points",
        book.stats.total, book.stats.positive, book.stats.negative
    );
    if !book.successes.is_empty() {
        println!("\nSuccesses");
        print_entries(&book.successes);
    }
    if !book.data_points.is_empty() {
        println!("\nData points");
        print_entries(&book.data_points);
    }
    Ok(())
}

fn print_entries(entries: &[PlaybookEntry]) {
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.title.clone(),
                e.persona.clone(),
                format!("{} {}", e.emotion.emoji(), e.emotion.label()),
                e.reflection.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "PERSONA", "FEELING", "REFLECTION"], rows);
}
