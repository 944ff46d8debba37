use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use factory::{FactoryPaths, Result};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "factory")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jira to Code to PR - Automated with Claude Code", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config directory (default: ~/.factory)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the background daemon
    Start,

    /// Stop the background daemon
    Stop,

    /// Show daemon state and processed items
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Process one issue now, bypassing the daemon
    Trigger {
        /// Issue key (e.g., PROJ-123)
        key: String,
    },

    /// Forget processed issues so they are picked up again
    Clear {
        /// Issue key; clears everything when omitted
        key: Option<String>,
    },

    /// Show the daemon log
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,

        /// Print and exit instead of following
        #[arg(long)]
        no_follow: bool,
    },

    /// Write a default config.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Run the poll loop in the foreground (used by `start`)
    #[command(hide = true)]
    Run,
}

/// Diagnostics go to stderr, which is the log file when detached
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    match runtime.block_on(run_async(cli)) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            std::process::exit(1);
        }
    }
}

/// Returns the process exit code
async fn run_async(cli: Cli) -> Result<i32> {
    let verbose = matches!(cli.command, Commands::Run | Commands::Trigger { .. });
    init_tracing(if verbose { "info" } else { "warn" });

    let paths = FactoryPaths::resolve(cli.config_dir)?;

    match cli.command {
        Commands::Start => factory::cli::start::run(&paths)?,
        Commands::Stop => factory::cli::stop::run(&paths)?,
        Commands::Status { json } => factory::cli::status::run(&paths, json)?,
        Commands::Trigger { key } => {
            let result = factory::cli::trigger::run(&paths, &key).await?;
            if !result.is_completed() {
                return Ok(1);
            }
        }
        Commands::Clear { key } => factory::cli::clear::run(&paths, key.as_deref())?,
        Commands::Logs { lines, no_follow } => {
            factory::cli::logs::run(&paths, lines, !no_follow).await?
        }
        Commands::Init { force } => factory::cli::init::run(&paths, force)?,
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "factory", &mut io::stdout());
        }
        Commands::Run => factory::cli::run::run(&paths).await?,
    }
    Ok(0)
}
