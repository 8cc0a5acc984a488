//! Courtside - terminal scorekeeper for set-based two-team matches
//!
//! Rally scoring, sets, tie-breaks, undo and a match clock.

mod app;
mod engine;
mod stats;
mod storage;
mod tui;

use app::{AppCoordinator, Screen};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use engine::Team;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::Storage;
use tracing::{info, warn};
use tui::Tui;

fn main() -> io::Result<()> {
    init_logging();
    info!("starting courtside");

    let storage = match Storage::open() {
        Ok(storage) => storage,
        Err(e) => {
            warn!(error = %e, "could not open database, keeping this session in memory");
            Storage::open_in_memory().map_err(io::Error::other)?
        }
    };
    let mut coordinator = AppCoordinator::new(storage);

    // Initialize terminal
    let mut terminal = Tui::new()?;
    terminal.enter()?;

    // Main event loop. The clock keeps whole seconds against its own anchor,
    // so the redraw rate only affects display latency.
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| tui::render(frame, &coordinator))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut coordinator, key.code, Instant::now());
                }
            }
        }

        coordinator.process_notifications();
        terminal.bell(coordinator.app.take_bells())?;

        if last_tick.elapsed() >= tick_rate {
            coordinator.app.tick(Instant::now());
            last_tick = Instant::now();
        }

        if coordinator.should_quit {
            break;
        }
    }

    info!("exiting");
    // Terminal cleanup happens automatically via Tui::drop
    Ok(())
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_logging() {
    let Ok(dir) = Storage::data_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(log_file) = std::fs::File::create(dir.join("courtside.log")) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
}

fn handle_key(coordinator: &mut AppCoordinator, code: KeyCode, now: Instant) {
    match coordinator.screen {
        Screen::Setup(_) => handle_setup_key(coordinator, code),
        Screen::Match => handle_match_key(coordinator, code, now),
    }
}

fn handle_setup_key(coordinator: &mut AppCoordinator, code: KeyCode) {
    if coordinator.is_editing_name() {
        match code {
            KeyCode::Enter => coordinator.setup_select(),
            KeyCode::Esc => coordinator.setup_cancel_edit(),
            KeyCode::Backspace => coordinator.setup_backspace(),
            KeyCode::Char(c) => coordinator.setup_char(c),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') => coordinator.quit(),
        KeyCode::Up | KeyCode::Char('k') => coordinator.setup_up(),
        KeyCode::Down | KeyCode::Char('j') => coordinator.setup_down(),
        KeyCode::Left | KeyCode::Char('h') => coordinator.setup_adjust(false),
        KeyCode::Right | KeyCode::Char('l') => coordinator.setup_adjust(true),
        KeyCode::Enter | KeyCode::Char(' ') => coordinator.setup_select(),
        _ => {}
    }
}

fn handle_match_key(coordinator: &mut AppCoordinator, code: KeyCode, now: Instant) {
    let app = &mut coordinator.app;

    if app.rename.is_some() {
        match code {
            KeyCode::Enter => app.commit_rename(),
            KeyCode::Esc => app.cancel_rename(),
            KeyCode::Backspace => app.rename_backspace(),
            KeyCode::Char(c) => app.rename_char(c),
            _ => {}
        }
        return;
    }

    if app.confirm_reset {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_reset(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_reset(),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('a') | KeyCode::Left => app.on_point(Team::A, now),
        KeyCode::Char('b') | KeyCode::Right => app.on_point(Team::B, now),
        KeyCode::Char('u') | KeyCode::Backspace => app.on_undo(),
        KeyCode::Char(' ') => app.on_toggle_clock(now),
        KeyCode::Char('s') => app.toggle_stats(),
        KeyCode::Char('e') => app.toggle_report(),
        KeyCode::Char('x') => app.on_share(),
        KeyCode::Char('r') => app.request_reset(),
        KeyCode::Char('n') => app.begin_rename(Team::A),
        KeyCode::Char('m') => app.begin_rename(Team::B),
        KeyCode::Char('c') => app.cycle_color(Team::A),
        KeyCode::Char('v') => app.cycle_color(Team::B),
        KeyCode::Esc if app.show_stats => app.toggle_stats(),
        KeyCode::Esc if app.show_report => app.toggle_report(),
        KeyCode::Esc | KeyCode::Char('q') => coordinator.quit(),
        _ => {}
    }
}
