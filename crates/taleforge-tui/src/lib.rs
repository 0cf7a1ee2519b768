//! Terminal UI for Taleforge
//!
//! A thin shell over [`taleforge_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`taleforge_app::Runtime`]
//!
//! This crate only handles terminal rendering and key translation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use taleforge_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{Departure, DepartureSlot, TerminalDriver, TerminalError};
