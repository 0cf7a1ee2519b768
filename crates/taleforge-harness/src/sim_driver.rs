//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`taleforge_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Time is virtual: every idle poll advances the clock by a fixed step, so
//! typing animations finish after a predictable number of cycles no matter
//! how fast the host runs.

use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use taleforge_app::{App, AppEvent, Driver, KeyInput, Panel, Route};
use taleforge_core::SessionMode;

use crate::invariants::{InvariantRegistry, ViewSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// One scripted input step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Press a key.
    Key(KeyInput),
    /// Type each character of a string.
    Text(String),
    /// Let virtual time pass.
    Wait(Duration),
    /// Idle until the view renders in this mode.
    AwaitMode(SessionMode),
    /// Resize the terminal.
    Resize(u16, u16),
}

/// What the view showed at one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    /// Presentation mode.
    pub mode: SessionMode,
    /// Delivered messages.
    pub history_len: usize,
    /// Revealed part of the active message.
    pub typing_text: Option<String>,
    /// Draft being composed.
    pub draft: String,
    /// Inline error.
    pub input_error: Option<String>,
    /// Blocking notice.
    pub notice: Option<String>,
    /// Session-info panel.
    pub panel: Panel,
}

impl RenderedView {
    fn of(app: &App) -> Self {
        Self {
            mode: app.mode(),
            history_len: app.session().history().len(),
            typing_text: app.typing_text().map(str::to_owned),
            draft: app.draft().to_owned(),
            input_error: app.input_error().map(str::to_owned),
            notice: app.notice().map(str::to_owned),
            panel: app.panel().clone(),
        }
    }
}

/// Shared record of everything the driver was asked to do.
#[derive(Debug, Default)]
struct Record {
    renders: Vec<RenderedView>,
    navigations: Vec<(Route, Option<String>)>,
    stopped: bool,
    drained: Option<usize>,
}

/// Read access to a [`SimDriver`]'s record after the runtime consumed it.
#[derive(Debug, Clone, Default)]
pub struct SimHandle {
    record: Arc<Mutex<Record>>,
}

impl SimHandle {
    fn lock(&self) -> MutexGuard<'_, Record> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every render, in order.
    pub fn renders(&self) -> Vec<RenderedView> {
        self.lock().renders.clone()
    }

    /// Last render. `None` if nothing was rendered.
    pub fn last_render(&self) -> Option<RenderedView> {
        self.lock().renders.last().cloned()
    }

    /// Navigations requested by the view.
    pub fn navigations(&self) -> Vec<(Route, Option<String>)> {
        self.lock().navigations.clone()
    }

    /// Whether the runtime stopped the driver.
    pub fn stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Replies still outstanding when the run ended. `None` if there were none.
    pub fn drained(&self) -> Option<usize> {
        self.lock().drained
    }
}

/// Simulation driver for deterministic testing.
///
/// Replays a script of [`Input`]s. Once the script is exhausted the driver
/// presses Esc, which ends the run.
pub struct SimDriver {
    clock: Duration,
    step: Duration,
    script: VecDeque<Input>,
    keys: VecDeque<KeyInput>,
    wait_until: Option<Duration>,
    idle_budget: usize,
    idle_polls: usize,
    last_mode: Option<SessionMode>,
    last_history: Option<usize>,
    invariants: InvariantRegistry,
    handle: SimHandle,
}

impl SimDriver {
    /// Virtual time added by each idle poll.
    pub const DEFAULT_STEP: Duration = Duration::from_millis(10);

    /// Idle polls an [`Input::AwaitMode`] may take before the run fails.
    pub const DEFAULT_IDLE_BUDGET: usize = 100_000;

    /// Driver replaying `script`, checking the standard invariants.
    pub fn new(script: impl IntoIterator<Item = Input>) -> Self {
        Self {
            clock: Duration::ZERO,
            step: Self::DEFAULT_STEP,
            script: script.into_iter().collect(),
            keys: VecDeque::new(),
            wait_until: None,
            idle_budget: Self::DEFAULT_IDLE_BUDGET,
            idle_polls: 0,
            last_mode: None,
            last_history: None,
            invariants: InvariantRegistry::standard(),
            handle: SimHandle::default(),
        }
    }

    /// Use `step` of virtual time per idle poll.
    #[must_use]
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Check `registry` instead of the standard invariants.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = registry;
        self
    }

    /// Handle for inspecting the record after the run.
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    fn idle(&mut self) -> Result<Option<AppEvent>, SimDriverError> {
        self.idle_polls += 1;
        if self.idle_polls > self.idle_budget {
            return Err(SimDriverError(format!(
                "idle budget exhausted waiting for {:?} (last mode {:?})",
                self.script.front(),
                self.last_mode
            )));
        }
        self.clock += self.step;
        Ok(None)
    }

    fn next_input(&mut self) -> Result<Option<AppEvent>, SimDriverError> {
        if let Some(key) = self.keys.pop_front() {
            return Ok(Some(AppEvent::Key(key)));
        }
        if let Some(until) = self.wait_until {
            if self.clock < until {
                return self.idle();
            }
            self.wait_until = None;
        }

        match self.script.pop_front() {
            None => Ok(Some(AppEvent::Key(KeyInput::Esc))),
            Some(Input::Key(key)) => Ok(Some(AppEvent::Key(key))),
            Some(Input::Text(text)) => {
                self.keys.extend(text.chars().map(KeyInput::Char));
                self.next_input()
            },
            Some(Input::Wait(duration)) => {
                self.wait_until = Some(self.clock + duration);
                self.idle()
            },
            Some(Input::AwaitMode(mode)) => {
                if self.last_mode == Some(mode) {
                    self.idle_polls = 0;
                    return self.next_input();
                }
                self.script.push_front(Input::AwaitMode(mode));
                self.idle()
            },
            Some(Input::Resize(cols, rows)) => Ok(Some(AppEvent::Resize(cols, rows))),
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = Duration;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        self.next_input()
    }

    fn now(&self) -> Self::Instant {
        self.clock
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let snapshot = ViewSnapshot::from_app(app, self.last_history);
        if let Err(violations) = self.invariants.check_all(&snapshot) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            return Err(SimDriverError(format!("invariant violation: {}", messages.join("; "))));
        }

        self.last_mode = Some(snapshot.mode);
        self.last_history = Some(snapshot.history_len);
        self.handle.lock().renders.push(RenderedView::of(app));
        Ok(())
    }

    fn navigate(&mut self, route: Route, reason: Option<&str>) -> Result<(), Self::Error> {
        self.handle.lock().navigations.push((route, reason.map(str::to_owned)));
        Ok(())
    }

    fn stop(&mut self) {
        self.handle.lock().stopped = true;
    }

    fn draining(&mut self, requests: usize) {
        self.handle.lock().drained = Some(requests);
    }
}
