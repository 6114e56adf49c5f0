//! Translation Trainer - adaptive Portuguese to English drills
//!
//! Single-user terminal application. Each sentence's right/wrong counts are
//! kept in a ledger file, and sentences answered wrongly come back more often.

mod catalog;
mod cli;
mod config;
mod error;
mod ledger;
mod logging;
mod selector;
mod session;

use catalog::CatalogSource;
use clap::Parser;
use cli::display::{table_lines, Display};
use cli::input::{InputHandler, KeyAction};
use config::{CliOverrides, TrainerConfig};
use ledger::LedgerStore;
use selector::Selector;
use session::{Feedback, Phase, SessionController, SessionSummary};
use std::error::Error;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "trainer")]
#[command(about = "Adaptive Portuguese to English translation drills")]
struct Args {
    /// Sentence catalog (CSV with PT and EN columns)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Performance ledger file
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Config file (defaults to ./trainer.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible sentence order
    #[arg(long)]
    seed: Option<u64>,

    /// Print the performance table and exit
    #[arg(long)]
    stats: bool,

    /// Print the ledger as JSON and exit
    #[arg(long, conflicts_with = "stats")]
    export_json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            catalog_path: self.catalog.clone(),
            ledger_path: self.ledger.clone(),
            seed: self.seed,
        }
    }
}

/// Load catalog and ledger and pick the first sentence
fn open_session(
    source: &mut CatalogSource,
    store: &LedgerStore,
    seed: Option<u64>,
) -> error::Result<SessionController> {
    let catalog = source.load()?.clone();
    let ledger = store.load_or_init(&catalog)?;
    let selector = match seed {
        Some(seed) => Selector::seeded(seed),
        None => Selector::from_entropy(),
    };

    let mut controller = SessionController::new(catalog, ledger, store.clone(), selector);
    controller.start()?;
    Ok(controller)
}

/// Redraw the whole screen for the current state
fn render(
    display: &Display,
    controller: &SessionController,
    answer: &str,
    feedback: Option<&Feedback>,
    show_table: bool,
) -> error::Result<()> {
    display.clear()?;
    if let Some(pair) = controller.current_pair() {
        display.show_sentence(&pair.source_text)?;
    }
    display.show_input(answer)?;

    if controller.phase() == Phase::Checked {
        if let Some(feedback) = feedback {
            display.show_feedback(feedback)?;
        }
        if let Some(previous) = controller.last_checked() {
            display.show_previous(previous)?;
        }
    }

    display.show_progress(&controller.summary())?;
    display.show_help(controller.phase())?;

    if show_table {
        display.show_table(&table_lines(&controller.ledger().rows()))?;
    }
    Ok(())
}

/// Event loop; returns when the user exits
fn drive(
    display: &Display,
    source: &mut CatalogSource,
    store: &LedgerStore,
    seed: Option<u64>,
) -> error::Result<SessionSummary> {
    let input = InputHandler::new();
    let mut controller = open_session(source, store, seed)?;

    let mut answer = String::new();
    let mut feedback: Option<Feedback> = None;
    let mut show_table = false;
    let mut dirty = true;

    loop {
        if dirty {
            render(display, &controller, &answer, feedback.as_ref(), show_table)?;
            dirty = false;
        }

        let Some(key) = input.read_key()? else {
            continue;
        };
        dirty = true;

        match InputHandler::classify(&key) {
            KeyAction::Exit => break,
            KeyAction::Char(c) => {
                if controller.phase() == Phase::AwaitingAnswer {
                    answer.push(c);
                }
            }
            KeyAction::Backspace => {
                if controller.phase() == Phase::AwaitingAnswer {
                    answer.pop();
                }
            }
            KeyAction::Submit => match controller.phase() {
                Phase::AwaitingAnswer => {
                    feedback = Some(controller.check(&answer)?);
                }
                Phase::Checked => {
                    controller.next()?;
                    answer.clear();
                    feedback = None;
                }
            },
            KeyAction::Skip => {
                controller.next()?;
                answer.clear();
                feedback = None;
            }
            KeyAction::ToggleTable => show_table = !show_table,
            KeyAction::Restart => {
                info!("reloading catalog and ledger");
                source.invalidate();
                controller = open_session(source, store, seed)?;
                answer.clear();
                feedback = None;
            }
            KeyAction::Ignore => dirty = false,
        }
    }

    Ok(controller.summary())
}

fn run(args: &Args, config: &TrainerConfig) -> error::Result<()> {
    let mut source = CatalogSource::new(&config.catalog_path, config.catalog_format());
    let store = LedgerStore::new(&config.ledger_path, config.ledger_columns());

    if args.stats || args.export_json {
        let ledger = store.load_or_init(source.load()?)?;
        if args.export_json {
            println!("{}", serde_json::to_string_pretty(&ledger)?);
        } else {
            for line in table_lines(&ledger.rows()) {
                println!("{line}");
            }
        }
        return Ok(());
    }

    println!("📘 Translation Trainer v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Catalog: {} | Ledger: {}",
        config.catalog_path.display(),
        config.ledger_path.display()
    );

    InputHandler::enable_raw_mode()?;
    let mut display = Display::interactive();
    let outcome = drive(&display, &mut source, &store, config.seed);
    display.shutdown()?;
    let summary = outcome?;

    println!("🎉 Session Complete!");
    println!(
        "📊 {} of {} correct ({:.0}%) in {:.1} min",
        summary.correct,
        summary.checks,
        summary.accuracy * 100.0,
        summary.duration_secs / 60.0
    );
    info!(checks = summary.checks, correct = summary.correct, "session ended");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = TrainerConfig::load(args.config.as_deref(), &args.overrides())?;
    logging::init_tracing(&config.log_path, args.debug)?;

    if let Err(e) = run(&args, &config) {
        error!(error = %e, "trainer stopped");
        return Err(e.into());
    }
    Ok(())
}
