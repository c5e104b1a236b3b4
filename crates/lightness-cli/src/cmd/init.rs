use anyhow::Context;
use lightness_core::{config::Config, db::ExperienceDb, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing lightness in: {}", root.display());

    let dir = paths::lightness_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_yaml = serde_yaml::to_string(&Config::default())?;
    let config_path = paths::config_path(root);
    if io::write_if_missing(&config_path, config_yaml.as_bytes())? {
        println!("  created {}", paths::CONFIG_FILE);
    } else {
        println!("  exists  {}", paths::CONFIG_FILE);
    }

    ExperienceDb::open_in(root).context("failed to create experience store")?;
    println!("  ready   {}", paths::DB_FILE);

    Ok(())
}
