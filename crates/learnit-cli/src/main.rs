//! learnit CLI — drill flashcards from learndata files.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use learnit_core::error::LearnError;
use learnit_core::model::Mode;

mod commands;
mod config;
mod console;

use commands::drill::SessionArgs;

#[derive(Parser)]
#[command(name = "learnit", version, about = "Flashcard training and testing")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Repeat every item until it is answered correctly
    Train(SessionArgs),

    /// Ask every item once and grade the result
    Test(SessionArgs),

    /// Ask which mode to use, then drill
    Drill(SessionArgs),

    /// Check learndata files without drilling
    Validate {
        /// Learndata files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Override a flag (NAME=VALUE, or NAME for true)
        #[arg(short = 'f', long = "flag", value_name = "NAME=VALUE")]
        flags: Vec<String>,
    },

    /// Show the resolved flags of a learndata file
    Flags {
        /// Learndata file
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Override a flag (NAME=VALUE, or NAME for true)
        #[arg(short = 'f', long = "flag", value_name = "NAME=VALUE")]
        flags: Vec<String>,
    },

    /// Create a starter config, preset store and example learndata
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("learnit=info".parse().unwrap())
                .add_directive("learnit_core=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Train(args) => commands::drill::execute(Some(Mode::Training), args, config).await,
        Commands::Test(args) => commands::drill::execute(Some(Mode::Testing), args, config).await,
        Commands::Drill(args) => commands::drill::execute(None, args, config).await,
        Commands::Validate { paths, flags } => commands::validate::execute(paths, flags, config),
        Commands::Flags { file, json, flags } => {
            commands::flags::execute(file, json, flags, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        match e.downcast_ref::<LearnError>() {
            Some(LearnError::Cancelled) => process::exit(1),
            Some(LearnError::NoItems { .. }) => {
                eprintln!("Error: {e:#}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        }
    }
}
