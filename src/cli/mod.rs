pub mod manifest;
pub mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use manifest::{process_manifest_command, ManifestCommand};
use status::{process_remote_command, process_status_command, RemoteCommand, StatusCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    tracker::{
        args::ServeArgs,
        config::TrackerConfig,
        start_tracker,
        storage::{load_or_create_user_id, local_store::JsonFileStore},
    },
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, CLI_PREFIX, HOST_PREFIX},
        runtime::run_abandoning_blocking,
    },
};

#[derive(Parser, Debug)]
#[command(name = "tabtally", version, long_about = None)]
#[command(about = "Tracks time spent on websites and syncs it to a log store", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(
        about = "Run the native messaging host in the current console. Messages are read from stdin and replies written to stdout"
    )]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
    #[command(about = "Show time waiting to be synced, per site")]
    Status {
        #[command(flatten)]
        command: StatusCommand,
    },
    #[command(about = "Show time already synced to the log store, per site")]
    Remote {
        #[command(flatten)]
        command: RemoteCommand,
    },
    #[command(about = "Print the user id used for syncing, creating it if needed")]
    UserId {
        #[arg(
            long,
            env = "TABTALLY_DIR",
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(about = "Print the native messaging manifest for a browser extension")]
    Manifest {
        #[command(flatten)]
        command: ManifestCommand,
    },
}

/// Parses the command line and runs the command. `serve` reads stdin, so the runtime is shut
/// down without waiting on that read once the command is done.
pub fn run_cli() -> Result<()> {
    run_abandoning_blocking(run_command(Args::parse()))?
}

async fn run_command(args: Args) -> Result<()> {
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };

    match args.commands {
        Commands::Serve { args } => {
            let config = TrackerConfig::from_args(&args)?;
            enable_logging(
                HOST_PREFIX,
                &config.dir,
                args.log_filter.or(logging_level),
                args.log_console,
            )?;
            start_tracker(config).await
        }
        Commands::Status { command } => {
            enable_logging(CLI_PREFIX, &command.dir()?, logging_level, args.log)?;
            process_status_command(command).await
        }
        Commands::Remote { command } => {
            enable_logging(CLI_PREFIX, &command.dir()?, logging_level, args.log)?;
            process_remote_command(command).await
        }
        Commands::UserId { dir } => {
            let dir = resolve_application_path(dir)?;
            enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;
            let store = JsonFileStore::new(&dir)?;
            println!("{}", load_or_create_user_id(&store).await?);
            Ok(())
        }
        Commands::Manifest { command } => process_manifest_command(command),
    }
}
