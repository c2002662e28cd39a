use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mission_control::board::models::{TaskPriority, TaskStatus};
use mission_control::config::{CliOverrides, LogFormat, MissionControlConfig};

mod cmd;

#[derive(Parser)]
#[command(name = "mission-control")]
#[command(version, about = "Live Mission Control board client")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    /// Backend base URL. Overrides MISSION_CONTROL_API_URL and the config file.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token. Overrides MISSION_CONTROL_TOKEN and the config file.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Path to a config.toml to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output on stderr: pretty or json
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            log_format: self.log_format,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a board once and print it
    Snapshot {
        board: String,
        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow a board live until Ctrl-C
    Watch { board: String },
    /// Create, edit, move and comment on tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// List and decide approvals
    Approval {
        #[command(subcommand)]
        command: ApprovalCommands,
    },
    /// Board chat
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    /// Create a task in the inbox
    Create {
        board: String,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: TaskPriority,
    },
    /// Edit a task's fields
    Update {
        board: String,
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Assign to an agent by id
        #[arg(long, conflicts_with = "unassign")]
        assign: Option<String>,
        #[arg(long)]
        unassign: bool,
    },
    /// Move a task to another column (inbox, in_progress, review, done)
    Move {
        board: String,
        task_id: String,
        status: TaskStatus,
    },
    /// Delete a task
    Delete { board: String, task_id: String },
    /// Comment on a task
    Comment {
        board: String,
        task_id: String,
        message: String,
    },
    /// Show a task with its comment thread
    Comments { board: String, task_id: String },
}

#[derive(Subcommand, Clone)]
pub enum ApprovalCommands {
    /// List pending approvals
    List {
        board: String,
        /// Include approvals that were already decided
        #[arg(long)]
        all: bool,
    },
    Approve { board: String, approval_id: String },
    Reject { board: String, approval_id: String },
}

#[derive(Subcommand, Clone)]
pub enum ChatCommands {
    /// Send a message to board chat
    Send { board: String, message: String },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration, token masked
    Show,
    /// Validate configuration and show any warnings
    Validate,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_directive = if verbose { "warn,mission_control=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = match format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(err) = result {
        eprintln!("Failed to initialise logging: {}", err);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = MissionControlConfig::resolve(cli.config.as_deref(), cli.overrides())?;
    init_tracing(cli.verbose, config.log_format());

    match &cli.command {
        Commands::Snapshot { board, json } => cmd::cmd_snapshot(&config, board, *json).await?,
        Commands::Watch { board } => cmd::cmd_watch(&config, board).await?,
        Commands::Task { command } => cmd::cmd_task(&config, command.clone(), cli.yes).await?,
        Commands::Approval { command } => cmd::cmd_approval(&config, command.clone()).await?,
        Commands::Chat { command } => cmd::cmd_chat(&config, command.clone()).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
