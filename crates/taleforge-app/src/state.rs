//! Controller lifecycle and navigation types.

/// Lifecycle of a session view.
///
/// Initialization happens once: [`crate::App::open`] is only accepted from
/// [`Lifecycle::Uninitialized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, not yet opened.
    Uninitialized,
    /// Opening request in flight or opening narrative still settling.
    Initializing,
    /// Accepting input.
    Ready,
    /// Torn down. Every later response is discarded.
    Closed,
}

/// Where the view goes when it leaves the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Authentication entry point.
    Login,
    /// Session list.
    Home,
}

/// How a session view is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Just created: the opening narrative is already known.
    Fresh {
        /// Opening narrative from create-game.
        narrative: String,
    },
    /// Existing session: the transcript is fetched.
    Resume,
}
