use clap::{Parser, Subcommand};
use photofold::cli::{Command, run_cli};
use photofold::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to .photofoldrc.toml, then
    /// ~/.config/photofold/config.toml)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count files per extension
    Scan {
        /// Folder to scan
        root: PathBuf,
        /// Include subfolders
        #[arg(long, short = 'r')]
        recursive: bool,
        /// Print the counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy photos into MM-YYYY folders and everything else into unknown/
    Organize {
        /// Folder to organize
        root: PathBuf,
        /// Destination base folder
        destination: PathBuf,
        /// Show what would be copied without copying
        #[arg(long)]
        dry_run: bool,
    },
    /// Scan, then organize
    Run {
        /// Folder to scan and organize
        root: PathBuf,
        /// Destination base folder
        destination: PathBuf,
        /// Include subfolders in the scan report
        #[arg(long, short = 'r')]
        recursive: bool,
    },
    /// Rename images after their modification time (YYYYMMDD_HHMMSS)
    Rename {
        /// Folder whose images are renamed (subfolders are not visited)
        directory: PathBuf,
        /// Add microseconds to the new names
        #[arg(long)]
        subsec: bool,
    },
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Scan {
                root,
                recursive,
                json,
            } => Command::Scan {
                root,
                recursive,
                json,
            },
            Commands::Organize {
                root,
                destination,
                dry_run,
            } => Command::Organize {
                root,
                destination,
                dry_run,
            },
            Commands::Run {
                root,
                destination,
                recursive,
            } => Command::Run {
                root,
                destination,
                recursive,
            },
            Commands::Rename { directory, subsec } => Command::Rename {
                directory,
                subsecond: subsec,
            },
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match run_cli(args.command.into(), args.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
