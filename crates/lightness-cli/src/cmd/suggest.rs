use crate::output::print_json;
use anyhow::Context;
use lightness_core::config::Config;
use std::path::Path;
use suggestion_agent::{SuggestionGenerator, SuggestionSource};

pub fn run(root: &Path, task: &str, persona: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let generator = SuggestionGenerator::from_config(&config.suggestions)?;

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(generator.generate(task, persona));

    if json {
        return print_json(&outcome);
    }
    for s in &outcome.suggestions {
        println!("- {s}");
    }
    if let SuggestionSource::Fallback { reason } = &outcome.source {
        eprintln!("(fallback suggestions: {reason})");
    }
    Ok(())
}
