//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use std::fmt;

use taleforge_client::{PlayerInputRequest, SessionId};

use crate::Route;

/// Identifies one gateway request.
///
/// Tickets increase monotonically per session view; a response is applied
/// only if its ticket is the one in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gateway request issued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Load the transcript of a resumed session.
    FetchHistory {
        /// Session to load.
        session_id: SessionId,
    },
    /// Move to the next floor.
    AdvanceFloor {
        /// Session to advance.
        session_id: SessionId,
    },
    /// Submit a player action.
    SubmitAction {
        /// Session acted in.
        session_id: SessionId,
        /// Trimmed action and the suggestions it was chosen from.
        input: PlayerInputRequest,
    },
    /// Load the session-info panel.
    FetchPlayerInfo {
        /// Session to describe.
        session_id: SessionId,
    },
}

impl Request {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchHistory { .. } => "fetch_history",
            Self::AdvanceFloor { .. } => "advance_floor",
            Self::SubmitAction { .. } => "submit_action",
            Self::FetchPlayerInfo { .. } => "fetch_player_info",
        }
    }
}

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Send a request through the gateway.
    Dispatch {
        /// Ticket the reply must carry.
        ticket: Ticket,
        /// Request to send.
        request: Request,
    },

    /// Leave the session view.
    Navigate {
        /// Destination.
        route: Route,
        /// Blocking notice to show on arrival. `None` if leaving silently.
        reason: Option<String>,
    },

    /// Clear every stored credential.
    ForgetCredentials,
}
