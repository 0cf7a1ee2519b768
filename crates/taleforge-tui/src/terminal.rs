//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Gateway traffic never passes
//! through here; the runtime awaits it alongside [`Driver::poll_event`].

use std::{
    io::{self, Stdout, Write, stderr, stdout},
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use taleforge_app::{App, AppEvent, Driver, KeyInput, Route};
use thiserror::Error;

use crate::ui;

/// Idle period after which [`TerminalDriver::poll_event`] yields a tick.
const TICK: Duration = Duration::from_millis(15);

/// Printed once the screen is restored if a reply is still outstanding.
pub const DRAINING_NOTICE: &str = "Waiting for the server to answer...";

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal event stream closed.
    #[error("terminal event stream closed")]
    EventStreamClosed,
}

/// Where the session view went when it left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Destination.
    pub route: Route,
    /// Reason to show the player, if any.
    pub reason: Option<String>,
}

/// Shared slot the driver records its [`Departure`] in.
///
/// The runtime consumes the driver, so the caller keeps a clone of the slot
/// to learn where to go after the run.
#[derive(Debug, Clone, Default)]
pub struct DepartureSlot(Arc<Mutex<Option<Departure>>>);

impl DepartureSlot {
    /// Take the recorded departure. `None` if the player quit.
    pub fn take(&self) -> Option<Departure> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn set(&self, departure: Departure) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(departure);
    }
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the raw-mode terminal for its whole lifetime and restores it on
/// [`Driver::stop`] or drop, whichever comes first.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    departure: DepartureSlot,
    restored: bool,
}

impl TerminalDriver {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            departure: DepartureSlot::default(),
            restored: false,
        })
    }

    /// Slot receiving the view's departure.
    pub fn departure(&self) -> DepartureSlot {
        self.departure.clone()
    }

    /// Convert a crossterm key event to `KeyInput`.
    ///
    /// Ctrl+C maps to Esc so it leaves the view the same way.
    fn convert_key(event: KeyEvent) -> Option<KeyInput> {
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c') => Some(KeyInput::Esc),
                _ => None,
            };
        }

        match event.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            KeyCode::Tab => Some(KeyInput::Tab),
            _ => None,
        }
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Ok(_)) => Ok(None),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    None => Err(TerminalError::EventStreamClosed),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(TICK) => Ok(None),
        }
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn navigate(&mut self, route: Route, reason: Option<&str>) -> Result<(), Self::Error> {
        self.departure.set(Departure { route, reason: reason.map(str::to_owned) });
        Ok(())
    }

    fn stop(&mut self) {
        self.restore();
    }

    fn draining(&mut self, requests: usize) {
        tracing::debug!(requests, "shutdown waiting on the server");
        let _ = writeln!(stderr().lock(), "{DRAINING_NOTICE}");
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.restore();
    }
}
