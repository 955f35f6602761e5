//! Target-cycling CLI.
//!
//! Drives the cycle engine against a page fixture and a file-backed session
//! store under `.cycler/`. Each command is one "page load" (or a sequence of
//! them for `run`), so repeated invocations behave like a browser tab that
//! reloads after every visit.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cycler::exit_codes;
use cycler::io::clock::{Clock, SystemClock};
use cycler::io::config::{CyclerConfig, load_config, write_config};
use cycler::io::cycle_state::{apply_auto_toggle, load_cycle_state};
use cycler::io::fixture::{FixtureNavigator, PageFixture, load_page};
use cycler::io::paths::{DEFAULT_SESSION_DIR, SessionPaths};
use cycler::io::store::FileStore;
use cycler::io::summary::render_summary;
use cycler::logging;
use cycler::looping::{LoopConfig, LoopStop, run_loop};
use cycler::step::{StepMode, StepNext, StepOutcome, fire_interaction, run_step};
use cycler::watchdog::{WatchdogOutcome, fire_watchdog};

#[derive(Parser)]
#[command(
    name = "cycler",
    version,
    about = "Resumable target-cycling engine with resource totals"
)]
struct Cli {
    /// Session directory holding the store, config and page fixture.
    #[arg(long, global = true, default_value = DEFAULT_SESSION_DIR)]
    dir: PathBuf,
    /// Page fixture to drive (defaults to `<dir>/page.json`).
    #[arg(long, global = true)]
    page: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `config.toml` if missing.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Start a new cycle from the targets on the page, then dispatch the first.
    Start,
    /// One page load: capture, dequeue the next target, dispatch it.
    Step,
    /// One watchdog firing (may restart the cycle when auto-cycle is on).
    Watch,
    /// Keep loading pages until the session goes idle.
    Run {
        /// Stop after this many page loads.
        #[arg(long, default_value_t = 100)]
        max_loads: u32,
    },
    /// Turn auto-cycle on or off. Turning it off cancels the current queue.
    Auto { state: Toggle },
    /// Print the cycled resource totals.
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut paths = SessionPaths::new(&cli.dir);
    if let Some(page) = cli.page {
        paths = paths.with_page(page);
    }
    match cli.command {
        Command::Init { force } => cmd_init(&paths, force),
        Command::Start => cmd_step(&paths, StepMode::Restart),
        Command::Step => cmd_step(&paths, StepMode::Resume),
        Command::Watch => cmd_watch(&paths),
        Command::Run { max_loads } => cmd_run(&paths, max_loads),
        Command::Auto { state } => cmd_auto(&paths, matches!(state, Toggle::On)),
        Command::Status => cmd_status(&paths),
    }
}

fn cmd_init(paths: &SessionPaths, force: bool) -> Result<i32> {
    if force || !paths.config_path.exists() {
        write_config(&paths.config_path, &CyclerConfig::default())?;
        println!("wrote {}", paths.config_path.display());
    }
    Ok(exit_codes::OK)
}

fn cmd_step(paths: &SessionPaths, mode: StepMode) -> Result<i32> {
    let cfg = load_config(&paths.config_path)?;
    let mut store = FileStore::open(&paths.store_path);
    let page = load_page(&paths.page_path)?;
    let mut rng = rand::thread_rng();

    let outcome = run_step(&mut store, &page, &mut rng, &cfg.delay, mode)?;
    print_step(&outcome);
    dispatch_next(paths, &mut store, &page, &outcome)
}

fn cmd_watch(paths: &SessionPaths) -> Result<i32> {
    let cfg = load_config(&paths.config_path)?;
    let mut store = FileStore::open(&paths.store_path);
    let page = load_page(&paths.page_path)?;
    let mut rng = rand::thread_rng();

    let outcome = fire_watchdog(&mut store, &page, &mut rng, &SystemClock, &cfg)?;
    print_watchdog(&outcome);
    let effective = outcome.restart.as_ref().unwrap_or(&outcome.resume);
    dispatch_next(paths, &mut store, &page, effective)
}

fn cmd_run(paths: &SessionPaths, max_loads: u32) -> Result<i32> {
    let cfg = load_config(&paths.config_path)?;
    let mut store = FileStore::open(&paths.store_path);
    let mut navigator = FixtureNavigator::new(&paths.page_path);
    let mut rng = rand::thread_rng();
    let loop_config = LoopConfig {
        cycler: cfg,
        max_loads,
    };

    let outcome = run_loop(
        &mut store,
        || load_page(&paths.page_path),
        &mut navigator,
        &mut rng,
        &SystemClock,
        &loop_config,
        print_watchdog,
    )?;
    println!(
        "loads={} dispatched={} restarts={}",
        outcome.loads, outcome.dispatched, outcome.restarts
    );
    let code = match outcome.stop {
        LoopStop::Idle => {
            println!("idle");
            exit_codes::COMPLETE
        }
        LoopStop::NotReady => {
            println!("page has no target list");
            exit_codes::NOT_READY
        }
        LoopStop::Stalled { target } => {
            println!("stalled: target {target} vanished before dispatch");
            exit_codes::OK
        }
        LoopStop::MaxLoads { loads } => {
            println!("stopped after {loads} loads");
            exit_codes::OK
        }
    };
    Ok(code)
}

fn cmd_auto(paths: &SessionPaths, enabled: bool) -> Result<i32> {
    let mut store = FileStore::open(&paths.store_path);
    apply_auto_toggle(&mut store, enabled)?;
    println!("auto cycle {}", if enabled { "on" } else { "off" });
    Ok(exit_codes::OK)
}

fn cmd_status(paths: &SessionPaths) -> Result<i32> {
    let store = FileStore::open(&paths.store_path);
    let state = load_cycle_state(&store);
    print!("{}", render_summary(&state)?);
    Ok(exit_codes::OK)
}

/// Wait out the scheduled delay and fire the interaction, as the page would.
fn dispatch_next(
    paths: &SessionPaths,
    store: &mut FileStore,
    page: &PageFixture,
    outcome: &StepOutcome,
) -> Result<i32> {
    match &outcome.next {
        StepNext::NotReady => Ok(exit_codes::NOT_READY),
        StepNext::Complete { .. } => Ok(exit_codes::COMPLETE),
        StepNext::Scheduled { interaction, .. } => {
            SystemClock.sleep(interaction.delay);
            let mut navigator = FixtureNavigator::new(&paths.page_path);
            if fire_interaction(store, page, &mut navigator, interaction)? {
                println!("dispatched {}", interaction.target);
            } else {
                println!("target {} vanished before dispatch", interaction.target);
            }
            Ok(exit_codes::OK)
        }
    }
}

fn print_step(outcome: &StepOutcome) {
    if let Some(id) = &outcome.captured {
        println!("captured {id}");
    }
    if let Some(policy) = outcome.rebuilt {
        println!("cycle started ({} order)", policy.as_str());
    }
    for id in &outcome.skipped {
        println!("skipped {id} (not on page)");
    }
    match &outcome.next {
        StepNext::NotReady => println!("page has no target list"),
        StepNext::Complete { totals, visited } => println!(
            "cycle complete: {visited} visited, metal={} crystal={} deuterium={}",
            totals.metal, totals.crystal, totals.deuterium
        ),
        StepNext::Scheduled {
            interaction,
            remaining,
        } => println!(
            "next {} in {}s ({remaining} left)",
            interaction.target,
            interaction.delay.as_secs()
        ),
    }
}

fn print_watchdog(outcome: &WatchdogOutcome) {
    print_step(&outcome.resume);
    if let Some(restart) = &outcome.restart {
        println!("auto cycle restart");
        print_step(restart);
    }
}
