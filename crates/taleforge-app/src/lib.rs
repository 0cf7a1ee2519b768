//! Application layer for Taleforge
//!
//! The turn controller for one story session, written as a pure state
//! machine plus a generic runtime, so the same code runs in the terminal and
//! in deterministic simulation.
//!
//! # Components
//!
//! - [`App`]: Turn controller (input gating, lifecycle, error/revert policy)
//! - [`Bridge`]: Turns [`Request`]s into gateway futures
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
mod panel;
mod runtime;
mod state;

pub use action::{AppAction, Request, Ticket};
pub use app::{App, EMPTY_ACTION, GAME_OVER, NEXT_FLOOR};
pub use bridge::Bridge;
pub use driver::Driver;
pub use event::{AppEvent, Reply};
pub use input::KeyInput;
pub use panel::{PANEL_FAILURE, Panel};
pub use runtime::Runtime;
pub use state::{Lifecycle, Route, SessionOrigin};
