pub mod config;
pub mod init;
pub mod playbook;
pub mod screen;
pub mod serve;
pub mod suggest;
pub mod task;

use anyhow::Context;
use lightness_core::db::ExperienceDb;
use lightness_core::paths;
use std::path::Path;

/// Open the record store, refusing to create one outside an initialized root.
pub fn open_db(root: &Path) -> anyhow::Result<ExperienceDb> {
    if !paths::lightness_dir(root).is_dir() {
        anyhow::bail!(
            "no {} directory in {}; run `lightness init` first",
            paths::LIGHTNESS_DIR,
            root.display()
        );
    }
    ExperienceDb::open_in(root).context("failed to open experience store")
}
