//! Runtime: terminal lifecycle and the event loop.
//!
//! A dedicated OS thread blocks on `crossterm::event::read()` and forwards
//! events over a Tokio channel, so the async loop only ever awaits channel
//! receives and the Ctrl+C signal. The screen is redrawn after every event
//! that reached the app.

use std::{
    io::{self, Stdout, Write},
    sync::Arc,
    thread,
};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::{signal, sync::mpsc};
use tracing::{info, warn};

use notepal_registry::ItemRegistry;
use notepal_util::DocumentStore;

use crate::app::App;
use crate::ui::{main_view, theme::Theme};

type Term = Terminal<CrosstermBackend<Stdout>>;

fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "Failed to read terminal event");
                    break;
                }
            }
        }
    });
    receiver
}

/// Switch `out` to the alternate screen with mouse capture; on failure run `restore` and return the error.
fn enter_screen<W: Write>(out: &mut W, restore: impl FnOnce() -> io::Result<()>) -> io::Result<()> {
    let Err(error) = execute!(out, EnterAlternateScreen, EnableMouseCapture) else {
        return Ok(());
    };
    if let Err(restore_error) = restore() {
        warn!(error = %restore_error, "Failed to restore the terminal");
    }
    Err(error)
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    enter_screen(&mut stdout, disable_raw_mode)?;
    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => Ok(terminal),
        Err(error) => {
            let mut stdout = io::stdout();
            let restored = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture).and_then(|()| disable_raw_mode());
            if let Err(restore_error) = restored {
                warn!(error = %restore_error, "Failed to restore the terminal");
            }
            Err(error.into())
        }
    }
}

fn cleanup_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) => app.handle_key(key),
        Event::Mouse(mouse) => app.handle_mouse(mouse),
        Event::Resize(width, height) => app.resize(width, height),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
    }
}

/// Set up the terminal, run until the user quits, and restore the terminal.
pub async fn run_app(registry: Arc<ItemRegistry>, store: Arc<dyn DocumentStore>) -> Result<()> {
    let mut app = App::new(registry, store, Theme::load());
    let mut terminal = setup_terminal()?;
    let mut input_receiver = spawn_input_thread();

    let outcome = event_loop(&mut terminal, &mut app, &mut input_receiver).await;
    cleanup_terminal(&mut terminal)?;
    info!("Terminal host stopped");
    outcome
}

async fn event_loop(terminal: &mut Term, app: &mut App, input_receiver: &mut mpsc::Receiver<Event>) -> Result<()> {
    let size = terminal.size()?;
    app.resize(size.width, size.height);
    terminal.draw(|frame| main_view::draw(frame, app))?;

    loop {
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                handle_event(app, event);
            }
            _ = signal::ctrl_c() => break,
        }
        if app.should_quit() {
            break;
        }
        terminal.draw(|frame| main_view::draw(frame, app))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_screen_switch_restores_the_terminal() {
        let restored = Cell::new(false);
        let outcome = enter_screen(&mut BrokenPipe, || {
            restored.set(true);
            Ok(())
        });
        assert_eq!(outcome.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(restored.get());
    }

    #[test]
    fn successful_screen_switch_keeps_raw_mode() {
        let restored = Cell::new(false);
        let mut out = Vec::new();
        enter_screen(&mut out, || {
            restored.set(true);
            Ok(())
        })
        .expect("screen entered");
        assert!(!out.is_empty());
        assert!(!restored.get());
    }
}
