use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trivia::cli::Cli;
use trivia::config;
use trivia::persist::{self, SessionStore};
use trivia::source::{Fetcher, OpenTdbSource};
use trivia::state::QuizApp;
use trivia::store::FileStore;
use trivia::tui;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(config::default_data_dir);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("cannot create {}", data_dir.display()))?;
    init_logging(&data_dir)?;

    let mut config = config::load(cli.config.as_deref());
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    info!("starting with {:?}", config);

    let store = FileStore::open(&data_dir.join("storage.json"))?;
    let mut session = SessionStore::new(store);

    if cli.clear {
        session.clear_session()?;
        eprintln!("Saved quiz cleared.");
    }

    if cli.status || cli.export.is_some() {
        let snapshot = session.load_snapshot().unwrap_or_default();
        if cli.status {
            persist::print_status(&snapshot, session.high_score());
        }
        if let Some(path) = &cli.export {
            persist::export_answers(&snapshot, path)?;
            eprintln!("Answers exported to {}", path.display());
        }
        return Ok(());
    }

    let app = QuizApp::restore(session, config.difficulty)
        .with_seconds_per_question(config.seconds_per_question);

    let source = OpenTdbSource::new(&config.api_url, config.request_timeout())?;
    let fetcher = Fetcher::new(Arc::new(source), config.question_count);

    tui::run_tui(app, fetcher)
}

/// The terminal belongs to the TUI, so logs go to a file next to the data.
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    let log_path = data_dir.join("trivia.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("cannot open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trivia=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
