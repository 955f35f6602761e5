//! CLI tests for the `cycler` binary.
//!
//! Spawns the binary against a temporary session directory and checks exit
//! codes and the persisted session after each command.

use std::fs;
use std::process::{Command, Output};

use cycler::core::types::ResourceSnapshot;
use cycler::exit_codes;
use cycler::io::config::{CyclerConfig, DelayConfig, write_config};
use cycler::io::cycle_state::load_cycle_state;
use cycler::io::fixture::{PageFixture, load_page, write_page};
use cycler::io::store::FileStore;
use cycler::test_support::{TestSession, planet};

fn planets() -> PageFixture {
    PageFixture {
        links: Some(vec![
            planet("101", ResourceSnapshot::new(100, 50, 10)),
            planet("102", ResourceSnapshot::new(200, 0, 5)),
            planet("103", ResourceSnapshot::new(1_500, 0, 0)),
        ]),
        active: None,
    }
}

/// Session with an instant-delay config so commands never sleep.
fn session(page: &PageFixture) -> TestSession {
    let session = TestSession::new(page).expect("session");
    let cfg = CyclerConfig {
        delay: DelayConfig {
            fast_secs: 0,
            slow_secs: 0,
        },
        ..CyclerConfig::default()
    };
    write_config(&session.paths.config_path, &cfg).expect("config");
    session
}

fn run_cli(session: &TestSession, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cycler"))
        .arg("--dir")
        .arg(&session.paths.session_dir)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("run cycler")
}

#[test]
fn status_on_fresh_session_is_ok() {
    let session = session(&planets());
    let output = run_cli(&session, &["status"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Start a cycle"), "{stdout}");
}

#[test]
fn start_dispatches_first_target() {
    let session = session(&planets());
    let output = run_cli(&session, &["start"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let page = load_page(&session.paths.page_path).expect("page");
    assert!(page.active.is_some());
    let state = load_cycle_state(&FileStore::open(&session.paths.store_path));
    assert_eq!(state.queue.len(), 2);
    assert!(state.pending_target.is_some());
}

#[test]
fn step_without_cycle_reports_complete() {
    let session = session(&planets());
    let output = run_cli(&session, &["step"]);
    assert_eq!(output.status.code(), Some(exit_codes::COMPLETE));
}

#[test]
fn step_on_unrecognized_page_reports_not_ready() {
    let session = session(&PageFixture::default());
    let output = run_cli(&session, &["step"]);
    assert_eq!(output.status.code(), Some(exit_codes::NOT_READY));
}

#[test]
fn start_then_run_sums_all_targets() {
    let session = session(&planets());
    assert_eq!(
        run_cli(&session, &["start"]).status.code(),
        Some(exit_codes::OK)
    );
    let output = run_cli(&session, &["run", "--max-loads", "10"]);
    assert_eq!(output.status.code(), Some(exit_codes::COMPLETE));

    let state = load_cycle_state(&FileStore::open(&session.paths.store_path));
    assert_eq!(state.totals.len(), 3);
    assert!(state.queue.is_empty());

    let status = run_cli(&session, &["status"]);
    let stdout = String::from_utf8_lossy(&status.stdout);
    assert!(stdout.contains("Metal: 1.800"), "{stdout}");
    assert!(stdout.contains("Crystal: 50"), "{stdout}");
    assert!(stdout.contains("Deuterium: 15"), "{stdout}");
}

#[test]
fn auto_off_cancels_running_cycle() {
    let session = session(&planets());
    run_cli(&session, &["start"]);
    assert_eq!(
        run_cli(&session, &["auto", "off"]).status.code(),
        Some(exit_codes::OK)
    );
    let state = load_cycle_state(&FileStore::open(&session.paths.store_path));
    assert!(state.queue.is_empty());
    assert!(!state.auto_enabled);
}

#[test]
fn invalid_config_exits_invalid() {
    let session = session(&planets());
    fs::write(
        &session.paths.config_path,
        "[auto_cycle]\nmin_minutes = 50\nmax_minutes = 10\n",
    )
    .expect("write config");
    let output = run_cli(&session, &["step"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn init_keeps_existing_config_without_force() {
    let session = session(&planets());
    let before = fs::read_to_string(&session.paths.config_path).expect("config");
    assert_eq!(
        run_cli(&session, &["init"]).status.code(),
        Some(exit_codes::OK)
    );
    let after = fs::read_to_string(&session.paths.config_path).expect("config");
    assert_eq!(before, after);

    run_cli(&session, &["init", "--force"]);
    let forced = fs::read_to_string(&session.paths.config_path).expect("config");
    assert_ne!(before, forced);
}
