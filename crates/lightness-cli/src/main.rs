mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, task::TaskSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lightness",
    about = "Turn chores into small playful experiments: design them, play them, log how they felt",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: nearest ancestor holding .lightness/, else cwd)
    #[arg(long, global = true, env = "LIGHTNESS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .lightness/ with a default config and an empty store
    Init,

    /// Add, list, and inspect experiences
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Finish the design wizard for an undesigned experience
    Design {
        id: u64,
        /// How would you like to imagine this chore?
        #[arg(long)]
        imagination: String,
        /// collector, competitor, explorer, creator, storyteller, comedian, leader, or mover
        #[arg(long)]
        persona: String,
        /// Side quest to attach (repeatable, kept in order)
        #[arg(long = "quest", value_name = "QUEST")]
        side_quests: Vec<String>,
    },

    /// Mark a designed experience as played
    Play { id: u64 },

    /// Log how a played experience felt
    Log {
        id: u64,
        #[arg(long)]
        reflection: String,
        /// happy, calm, thoughtful, amused, bored, anxious, frustrated, or mixed
        #[arg(long)]
        emotion: String,
        /// Answer to the follow-up question
        #[arg(long)]
        answer: Option<String>,
    },

    /// Browse logged experiences
    Playbook {
        /// Search title, persona, and reflection
        #[arg(long = "search", short = 'q')]
        query: Option<String>,
        /// all, positive, or negative
        #[arg(long, default_value = "all")]
        filter: String,
    },

    /// Ask for three side-quest ideas
    Suggest {
        #[arg(required = true)]
        task: Vec<String>,
        #[arg(long)]
        persona: String,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the HTTP server
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Design {
            id,
            imagination,
            persona,
            side_quests,
        } => cmd::screen::design(&root, id, imagination, persona, side_quests, cli.json),
        Commands::Play { id } => cmd::screen::play(&root, id, cli.json),
        Commands::Log {
            id,
            reflection,
            emotion,
            answer,
        } => cmd::screen::log(&root, id, reflection, emotion, answer, cli.json),
        Commands::Playbook { query, filter } => {
            cmd::playbook::run(&root, query.as_deref(), &filter, cli.json)
        }
        Commands::Suggest { task, persona } => {
            cmd::suggest::run(&root, &task.join(" "), &persona, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
