use anyhow::Result;
use clap::Parser;
use intervector_setup::directory::{
    AgentStatusUpdate, MessageFilter, NewMessage, NewRestorePoint, DEFAULT_MESSAGE_LIMIT,
    DEFAULT_RESTORE_POINT_LIMIT,
};
use intervector_setup::Config;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "intervector", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Store directory (default: $CHROMA_DB_PATH, then ./chromadb)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Create the command center collections and seed records (default)
    ///
    /// Opens (or creates) the store directory and makes sure the seven
    /// command center collections exist, then registers the core agents and
    /// writes the initialization message.
    ///
    /// The run is safe to repeat: collections and records that already exist
    /// are reported and left untouched. Individual failures are reported and
    /// skipped; only a store that cannot be opened makes the command fail.
    ///
    /// Exit status: 0 on success (including "everything already existed"),
    /// 1 if the store could not be opened.
    Setup,
    /// List collections with their metadata and record counts
    Status,
    /// List registered agents
    Agents,
    /// List messages from the agent message log, or send one
    #[command(args_conflicts_with_subcommands = true)]
    Messages {
        #[command(subcommand)]
        action: Option<MessageAction>,
        #[command(flatten)]
        list: MessageListArgs,
    },
    /// List session restore points, or save one
    #[command(args_conflicts_with_subcommands = true)]
    RestorePoints {
        #[command(subcommand)]
        action: Option<RestoreAction>,
        /// Maximum number of restore points to show
        #[arg(long, default_value_t = DEFAULT_RESTORE_POINT_LIMIT)]
        limit: usize,
    },
    /// Record a status heartbeat for an agent
    AgentStatus {
        /// Agent identifier (stored as `agent_<ID>`)
        agent_id: String,
        /// New status (default: online)
        #[arg(long)]
        status: Option<String>,
        /// Agent type (default: coordinator)
        #[arg(long)]
        agent_type: Option<String>,
        /// Comma-separated specialties
        #[arg(long)]
        specialties: Option<String>,
        /// Task the agent is working on
        #[arg(long)]
        task: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Args)]
struct MessageListArgs {
    /// Only messages sent by this agent
    #[arg(long = "from")]
    from_agent: Option<String>,
    /// Only messages addressed to this agent
    #[arg(long = "to")]
    to_agent: Option<String>,
    /// Only messages in this thread
    #[arg(long = "thread")]
    thread_id: Option<String>,
    /// Maximum number of messages to show
    #[arg(long, default_value_t = DEFAULT_MESSAGE_LIMIT)]
    limit: usize,
    /// Number of messages to skip
    #[arg(long, default_value_t = 0)]
    offset: usize,
}

#[derive(Debug, clap::Subcommand)]
enum MessageAction {
    /// Append a message to the log
    Send {
        /// Sending agent
        #[arg(long = "from")]
        from_agent: String,
        /// Receiving agent, or ALL_AGENTS
        #[arg(long = "to")]
        to_agent: String,
        /// Message body
        content: String,
        /// Message type
        #[arg(long = "type", default_value = "direct_message")]
        message_type: String,
        /// Priority label
        #[arg(long, default_value = "NORMAL")]
        priority: String,
        /// Thread the message belongs to
        #[arg(long = "thread")]
        thread_id: Option<String>,
        /// Short subject line
        #[arg(long)]
        subject: Option<String>,
        /// Message id (default: generated)
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum RestoreAction {
    /// Save a restore point
    Create {
        /// What the restore point captures
        summary: String,
        /// Agent saving the restore point
        #[arg(long)]
        created_by: String,
        /// Restore point type
        #[arg(long = "type", default_value = "session_checkpoint")]
        kind: String,
        /// Priority label
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Effort needed to resume from this point
        #[arg(long, default_value = "low")]
        complexity: String,
        /// Restore point id (default: generated)
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// A broken config file falls back to defaults instead of aborting.
fn config_or_default(loaded: Result<Config>) -> Config {
    loaded.unwrap_or_else(|e| {
        eprintln!("⚠️  Ignoring configuration: {e:#}");
        Config::default()
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = config_or_default(Config::load());
    init_logging(&config.log_level);

    match dispatch(cli, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli, config: &Config) -> Result<ExitCode> {
    let db_path = config.db_path(cli.db);
    log::debug!("Using store directory {}", db_path.display());

    match cli.command.unwrap_or(Commands::Setup) {
        Commands::Setup => return Ok(commands::run_setup(&db_path)),
        Commands::Status => commands::show_status(&db_path)?,
        Commands::Agents => commands::show_agents(&db_path)?,
        Commands::Messages { action, list } => match action {
            None => {
                let filter = MessageFilter {
                    from_agent: list.from_agent,
                    to_agent: list.to_agent,
                    thread_id: list.thread_id,
                    limit: list.limit,
                    offset: list.offset,
                };
                commands::show_messages(&db_path, &filter)?;
            }
            Some(MessageAction::Send {
                from_agent,
                to_agent,
                content,
                message_type,
                priority,
                thread_id,
                subject,
                id,
            }) => {
                let message = NewMessage {
                    id,
                    message_type,
                    priority,
                    thread_id,
                    subject,
                    ..NewMessage::new(from_agent, to_agent, content)
                };
                commands::post_message(&db_path, &message)?;
            }
        },
        Commands::RestorePoints { action, limit } => match action {
            None => commands::show_restore_points(&db_path, limit)?,
            Some(RestoreAction::Create {
                summary,
                created_by,
                kind,
                priority,
                tags,
                complexity,
                id,
            }) => {
                let input = NewRestorePoint {
                    id,
                    priority,
                    tags,
                    restore_complexity: complexity,
                    ..NewRestorePoint::new(kind, created_by, summary)
                };
                commands::save_restore_point(&db_path, &input)?;
            }
        },
        Commands::AgentStatus {
            agent_id,
            status,
            agent_type,
            specialties,
            task,
        } => {
            let update = AgentStatusUpdate {
                agent_id,
                status,
                agent_type,
                specialties,
                current_task: task,
            };
            commands::set_agent_status(&db_path, &update)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(config, &db_path),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
