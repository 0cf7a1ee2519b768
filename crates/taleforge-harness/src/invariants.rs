//! Session view invariants.
//!
//! Properties every rendered frame of a session view must satisfy, whatever
//! the script. [`crate::SimDriver`] checks them at each render, so a scenario
//! test also proves the view never passed through a bad state on the way.
//!
//! # Architecture
//!
//! The observable state of an [`App`] is extracted into a [`ViewSnapshot`],
//! then every registered [`Invariant`] is checked against it.

use std::fmt;

use taleforge_app::{App, Lifecycle};
use taleforge_core::SessionMode;

/// Outcome of one invariant check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant and what was observed.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Which invariant broke.
    pub invariant: &'static str,
    /// Observed state.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Observable state of a session view at one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Presentation mode.
    pub mode: SessionMode,
    /// View lifecycle.
    pub lifecycle: Lifecycle,
    /// Whether a typing player is showing text.
    pub typing: bool,
    /// Whether a request awaits its reply.
    pub in_flight: bool,
    /// Delivered messages.
    pub history_len: usize,
    /// Delivered messages at the previous render. `None` on the first.
    pub previous_history_len: Option<usize>,
}

impl ViewSnapshot {
    /// Snapshot `app`, given the history length seen at the previous render.
    pub fn from_app(app: &App, previous_history_len: Option<usize>) -> Self {
        Self {
            mode: app.mode(),
            lifecycle: app.lifecycle(),
            typing: app.typing_text().is_some(),
            in_flight: app.in_flight().is_some(),
            history_len: app.session().history().len(),
            previous_history_len,
        }
    }
}

/// An invariant that can be checked against a view snapshot.
pub trait Invariant: Send + Sync {
    /// Stable name used in violation reports.
    fn name(&self) -> &'static str;

    /// Check one rendered frame.
    fn check(&self, state: &ViewSnapshot) -> InvariantResult;
}

/// Typing text is shown exactly while the view is in `Typing`.
pub struct TypingMatchesMode;

impl Invariant for TypingMatchesMode {
    fn name(&self) -> &'static str {
        "typing_matches_mode"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        if state.typing == (state.mode == SessionMode::Typing) {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!("typing={} in mode {:?}", state.typing, state.mode),
        })
    }
}

/// A request is only in flight while the view shows `Loading`.
pub struct LoadingWhileInFlight;

impl Invariant for LoadingWhileInFlight {
    fn name(&self) -> &'static str {
        "loading_while_in_flight"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        if !state.in_flight || state.mode == SessionMode::Loading {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!("request in flight in mode {:?}", state.mode),
        })
    }
}

/// Delivered messages are never removed.
pub struct HistoryOnlyGrows;

impl Invariant for HistoryOnlyGrows {
    fn name(&self) -> &'static str {
        "history_only_grows"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        match state.previous_history_len {
            Some(previous) if previous > state.history_len => Err(Violation {
                invariant: self.name(),
                message: format!("history shrank from {previous} to {}", state.history_len),
            }),
            _ => Ok(()),
        }
    }
}

/// Invariants checked together at every render.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Registry checking nothing.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Registry with every session view invariant.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(TypingMatchesMode);
        registry.add(LoadingWhileInFlight);
        registry.add(HistoryOnlyGrows);
        registry
    }

    /// Register `invariant`.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check every invariant against `state`, collecting each violation.
    pub fn check_all(&self, state: &ViewSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|check| check.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
