//! `suggestion-agent` asks a hosted chat-completion model for three playful
//! side quests that fit a task and a persona.
//!
//! ```text
//! SuggestionGenerator::generate(task, persona)
//!     │
//!     ├── build_prompt ─▶ CompletionClient::complete ─▶ parse_completion
//!     │                                                    │
//!     │                                  3 lines ◀─────────┘
//!     │
//!     └── any failure ─▶ fallback_suggestions (static persona tables)
//! ```
//!
//! The generator never fails: callers learn where the answer came from via
//! [`SuggestionSource`].

pub mod client;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod types;


pub use client::CompletionClient;
pub use error::AgentError;
pub use fallback::fallback_suggestions;
pub use generator::{SuggestionGenerator, SuggestionOutcome, SuggestionSource};
pub use prompt::{build_prompt, parse_completion};

pub type Result<T> = std::result::Result<T, AgentError>;
