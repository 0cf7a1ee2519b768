//! Deterministic simulation harness for Taleforge session testing.
//!
//! Test doubles for the two seams of [`taleforge_app::Runtime`]: the backend
//! [`Gateway`](taleforge_client::Gateway) and the I/O
//! [`Driver`](taleforge_app::Driver). Together they run the production
//! runtime end to end on a virtual clock, with no terminal and no server.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. [`SimDriver`] checks [`InvariantRegistry::standard()`] on every
//! render and fails the run on the first violation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gateway;
pub mod invariants;
pub mod sim_driver;

pub use gateway::{Call, ScriptedGateway};
pub use invariants::{
    HistoryOnlyGrows, Invariant, InvariantRegistry, InvariantResult, LoadingWhileInFlight,
    TypingMatchesMode, ViewSnapshot, Violation,
};
pub use sim_driver::{Input, RenderedView, SimDriver, SimDriverError, SimHandle};
pub use taleforge_client::MemoryCredentials;
