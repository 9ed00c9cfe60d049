use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Local};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, trace};

use crate::error::QuizError;
use crate::model::QuizState;
use crate::source::Fetcher;
use crate::state::{QuizApp, Route};
use crate::store::{KeyValueStore, StoreEvent};
use crate::timer::{spawn_ticker, TimerEvent, TimerHandle};

/// Presentation-only state; the quiz itself lives in [`QuizApp`].
#[derive(Debug, Default)]
pub struct View {
    pub cursor: usize,
    pub results_scroll: u16,
    pub last_saved: Option<DateTime<Local>>,
    pub notice: Option<String>,
    pub should_quit: bool,
}

pub fn run_tui<S: KeyValueStore>(mut app: QuizApp<S>, mut fetcher: Fetcher) -> anyhow::Result<()> {
    let store_rx = app.store_mut().subscribe();

    if let Some(generation) = app.resume_fetch() {
        fetcher.request(generation, app.difficulty());
    }

    enable_raw_mode().context("cannot enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("cannot enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("cannot create terminal")?;

    let mut view = View::default();
    let result = main_loop(&mut terminal, &mut app, &mut view, &mut fetcher, &store_rx);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn main_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut QuizApp<S>,
    view: &mut View,
    fetcher: &mut Fetcher,
    store_rx: &mpsc::Receiver<StoreEvent>,
) -> anyhow::Result<()> {
    let mut ticker: Option<TimerHandle> = None;

    loop {
        sync_ticker(app, &mut ticker);

        terminal
            .draw(|f| crate::ui::draw(f, app, view))
            .context("draw error")?;

        if view.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100)).context("poll error")? {
            if let Event::Key(key) = event::read().context("read error")? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, app, view, fetcher);
                }
            }
        }

        while let Some(outcome) = fetcher.try_recv() {
            let result = app.complete_fetch(outcome.generation, outcome.result);
            if result.is_ok() {
                view.cursor = 0;
            }
        }

        if let Some(handle) = &ticker {
            while let Some(TimerEvent::Tick { index }) = handle.try_recv() {
                app.tick(index);
            }
        }

        while let Ok(ev) = store_rx.try_recv() {
            trace!("store event {:?}", ev);
            view.last_saved = Some(Local::now());
        }
    }

    Ok(())
}

/// Keeps exactly one ticker alive, for the question the app is counting down.
fn sync_ticker<S: KeyValueStore>(app: &QuizApp<S>, ticker: &mut Option<TimerHandle>) {
    let wanted = app.active_timer_index();
    let running = ticker.as_ref().map(|t| t.index());
    if wanted != running {
        *ticker = wanted.map(spawn_ticker);
    }
}

fn handle_key<S: KeyValueStore>(
    key: KeyEvent,
    app: &mut QuizApp<S>,
    view: &mut View,
    fetcher: &mut Fetcher,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Char('q') || (ctrl && key.code == KeyCode::Char('c')) {
        view.should_quit = true;
        return;
    }

    match app.route() {
        Route::Home => handle_home_key(key, app, view, fetcher),
        Route::Quiz => match app.quiz_state() {
            QuizState::Ongoing => handle_question_key(key, app, view),
            QuizState::Error => handle_error_key(key, app, view, fetcher),
            _ => {}
        },
        Route::Results => handle_results_key(key, app, view),
    }
}

fn handle_home_key<S: KeyValueStore>(
    key: KeyEvent,
    app: &mut QuizApp<S>,
    view: &mut View,
    fetcher: &mut Fetcher,
) {
    match key.code {
        KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
            let d = app.difficulty().prev();
            report(view, app.set_difficulty(d).map(|_| Route::Home));
        }
        KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
            let d = app.difficulty().next();
            report(view, app.set_difficulty(d).map(|_| Route::Home));
        }
        KeyCode::Enter | KeyCode::Char('s') => start_fetch(app, view, fetcher),
        _ => {}
    }
}

fn handle_error_key<S: KeyValueStore>(
    key: KeyEvent,
    app: &mut QuizApp<S>,
    view: &mut View,
    fetcher: &mut Fetcher,
) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
        start_fetch(app, view, fetcher);
    }
}

fn start_fetch<S: KeyValueStore>(app: &mut QuizApp<S>, view: &mut View, fetcher: &mut Fetcher) {
    match app.begin_fetch() {
        Ok(generation) => {
            view.notice = None;
            view.cursor = 0;
            fetcher.request(generation, app.difficulty());
        }
        Err(e) => report(view, Err(e)),
    }
}

fn handle_question_key<S: KeyValueStore>(key: KeyEvent, app: &mut QuizApp<S>, view: &mut View) {
    let option_count = app.current_question().map(|q| q.options.len()).unwrap_or(0);

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view.cursor = view.cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view.cursor + 1 < option_count {
                view.cursor += 1;
            }
        }
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            if idx < option_count {
                view.cursor = idx;
                report(view, app.select_option(idx));
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if app.current_answer().is_some() {
                advance(app, view);
            } else {
                let idx = view.cursor;
                report(view, app.select_option(idx));
            }
        }
        KeyCode::Right | KeyCode::Char('n') => advance(app, view),
        KeyCode::Left | KeyCode::Char('p') => {
            let result = app.previous();
            if result.is_ok() {
                view.cursor = 0;
            }
            report(view, result);
        }
        _ => {}
    }
}

fn advance<S: KeyValueStore>(app: &mut QuizApp<S>, view: &mut View) {
    let result = app.next();
    if result.is_ok() {
        view.cursor = 0;
        view.results_scroll = 0;
    }
    report(view, result);
}

fn handle_results_key<S: KeyValueStore>(key: KeyEvent, app: &mut QuizApp<S>, view: &mut View) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view.results_scroll = view.results_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view.results_scroll = view.results_scroll.saturating_add(1);
        }
        KeyCode::PageUp => {
            view.results_scroll = view.results_scroll.saturating_sub(10);
        }
        KeyCode::PageDown => {
            view.results_scroll = view.results_scroll.saturating_add(10);
        }
        KeyCode::Enter | KeyCode::Char('r') => {
            let result = app.restart();
            if result.is_ok() {
                view.results_scroll = 0;
                view.cursor = 0;
            }
            report(view, result);
        }
        _ => {}
    }
}

fn report(view: &mut View, result: Result<Route, QuizError>) {
    match result {
        Ok(_) => view.notice = None,
        Err(e) => {
            debug!("rejected: {}", e);
            view.notice = Some(e.to_string());
        }
    }
}
