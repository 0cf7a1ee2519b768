//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and clock ticks.
//! - Gateway replies produced by the [`crate::Bridge`].

use std::time::Duration;

use taleforge_client::{
    ApiError, EventsResponse, NewFloorResponse, PlayerInfoResponse, PlayerInputResponse,
};

use crate::{KeyInput, Ticket};

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Clock tick.
    Tick {
        /// Time since the runtime started.
        now: Duration,
    },

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// A gateway request finished.
    Response {
        /// Ticket the request was issued with.
        ticket: Ticket,
        /// Gateway outcome.
        reply: Result<Reply, ApiError>,
    },
}

/// Successful gateway reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Transcript of a resumed session.
    History(EventsResponse),
    /// Narrative of the next floor.
    Floor(NewFloorResponse),
    /// Outcome of a player action.
    Action(PlayerInputResponse),
    /// Contents of the session-info panel.
    PlayerInfo(PlayerInfoResponse),
}
