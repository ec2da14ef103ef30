//! The `learnit train`, `learnit test` and `learnit drill` commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use learnit_core::blacklist::merge_into_file;
use learnit_core::engine::{run_session, SessionOutcome};
use learnit_core::error::LearnError;
use learnit_core::model::{LearnItem, Mode};
use learnit_core::parser::LearndataParser;
use learnit_core::prompt::{select, TerminalPrompter};
use learnit_core::transform::{prepare, Prepared};

use super::Context;
use crate::console::{self, ConsoleReporter};

/// Options shared by every drilling subcommand.
#[derive(Debug, clap::Args)]
pub struct SessionArgs {
    /// Learndata files to drill, one after the other
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Override a flag for this session (NAME=VALUE, or NAME for true)
    #[arg(short = 'f', long = "flag", value_name = "NAME=VALUE")]
    pub flags: Vec<String>,

    /// Seed the shuffle and training order
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ignore every blacklist
    #[arg(short = 'B', long)]
    pub no_blacklist: bool,
}

pub async fn execute(
    mode: Option<Mode>,
    args: SessionArgs,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let context = Context::load(config_path.as_deref())?;
    let overrides = context.overrides(&args.flags, args.no_blacklist)?;
    let parser = LearndataParser::new(&context.syntax, &context.presets);
    let mode = match mode.or_else(|| context.config.default_mode()) {
        Some(mode) => mode,
        None => match run_blocking(|| choose_mode(&mut TerminalPrompter::stdio())).await {
            Ok(mode) => mode,
            Err(LearnError::Cancelled) => {
                println!("\nProcess closed by user.");
                return Err(LearnError::Cancelled.into());
            }
            Err(e) => return Err(e.into()),
        },
    };

    for (index, file) in args.files.iter().enumerate() {
        let path = context.resolve_path(file)?;
        let parsed = parser.parse_file(&path)?;

        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        };
        let prepared = prepare(&parsed, &context.schema, &overrides, &mut rng)?;
        announce(&prepared);

        let reporter = Arc::new(ConsoleReporter::new());
        let outcome = drill_file(mode, &prepared, Arc::clone(&reporter), rng).await;

        match outcome {
            Ok(SessionOutcome::Testing(report)) => {
                if let Some(grade) = &report.grade {
                    console::print_grade(grade);
                }
                console::print_recap(&report.missed);

                if prepared.flags.auto_blacklist() && !report.found.is_empty() {
                    merge_into_file(&path, &report.found, &context.syntax).with_context(
                        || format!("failed to update blacklist of {}", path.display()),
                    )?;
                    println!(
                        "Blacklisted {} question(s) in {}",
                        report.found.len(),
                        path.display()
                    );
                }
            }
            Ok(SessionOutcome::Training { passes }) => {
                for (direction, stats) in passes {
                    tracing::debug!(
                        "{direction:?}: learned {} item(s) in {} question(s)",
                        stats.learned,
                        stats.asked
                    );
                }
                println!("\nEverything learned!");
            }
            Err(LearnError::Cancelled) => {
                println!("\nProcess closed by user.");
                console::print_recap(&reporter.missed());
                return Err(LearnError::Cancelled.into());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn announce(prepared: &Prepared) {
    for diagnostic in &prepared.diagnostics {
        tracing::debug!("{}: {diagnostic}", prepared.source);
    }

    let flags = &prepared.flags;
    if flags.debug() {
        console::print_debug(flags, &prepared.items);
    }
    if let Some(title) = flags.custom_title() {
        console::print_header(flags, title);
    }
    if flags.show_items_count() {
        println!(
            "Loaded {} of {} item(s) from {}",
            prepared.items.len(),
            prepared.total_parsed,
            prepared.source
        );
    }
}

/// Run one session over the prepared items.
async fn drill_file(
    mode: Mode,
    prepared: &Prepared,
    reporter: Arc<ConsoleReporter>,
    mut rng: StdRng,
) -> learnit_core::Result<SessionOutcome> {
    let items: Vec<LearnItem> = prepared.items.clone();
    let flags = prepared.flags.clone();

    run_blocking(move || {
        let mut prompter = TerminalPrompter::stdio();
        run_session(mode, &items, &flags, &mut prompter, reporter.as_ref(), &mut rng)
    })
    .await
}

/// Run terminal interaction on a blocking task, racing it against Ctrl-C.
async fn run_blocking<T, F>(interaction: F) -> learnit_core::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> learnit_core::Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(interaction);

    tokio::select! {
        joined = task => match joined {
            Ok(result) => result,
            Err(e) => Err(LearnError::Terminal(std::io::Error::other(e.to_string()))),
        },
        _ = interrupted() => Err(LearnError::Cancelled),
    }
}

fn choose_mode(prompter: &mut dyn learnit_core::prompt::Prompter) -> learnit_core::Result<Mode> {
    let choice = select(prompter, "Choose a mode", &["Training", "Testing"])?;
    Ok(if choice == 0 {
        Mode::Training
    } else {
        Mode::Testing
    })
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
