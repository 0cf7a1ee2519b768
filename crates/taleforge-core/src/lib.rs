//! Taleforge session core
//!
//! Sans-IO building blocks for a turn-based narrative session client. Nothing
//! in this crate performs I/O or owns a timer: callers feed events and
//! timestamps in, and read state back out.
//!
//! # Components
//!
//! - [`Message`]: Immutable role-tagged narrative entry
//! - [`SessionState`]: Session state machine driven by [`SessionEvent`]s
//! - [`TypingPlayer`]: Character-by-character reveal of the active message

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod message;
pub mod progress;
pub mod session;
pub mod typing;

pub use message::{Message, Role};
pub use progress::GameProgress;
pub use session::{IgnoreReason, SessionEvent, SessionMode, SessionState, Transition, transition};
pub use typing::{Reveal, TypingConfig, TypingPlayer, TypingStep, reveal};
