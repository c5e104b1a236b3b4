pub mod config;
pub mod db;
pub mod error;
pub mod experience;
pub mod io;
pub mod lifecycle;
pub mod paths;
pub mod playbook;
pub mod state;
pub mod subscriber;
pub mod types;

pub use error::{LightnessError, Result};
