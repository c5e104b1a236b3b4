use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const LIGHTNESS_DIR: &str = ".lightness";
pub const CONFIG_FILE: &str = ".lightness/config.yaml";
pub const DB_FILE: &str = ".lightness/experiences.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn lightness_dir(root: &Path) -> PathBuf {
    root.join(LIGHTNESS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}
