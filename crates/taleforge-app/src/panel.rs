//! Session-info side panel.

use taleforge_client::PlayerInfoResponse;

/// Shown in the panel when its request fails.
pub const PANEL_FAILURE: &str = "Failed to load session information";

/// What the side panel shows.
///
/// The panel has its own request slot: opening it never changes the session
/// mode and never blocks a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Panel {
    /// Closed.
    #[default]
    Hidden,
    /// Open, waiting for the server.
    Loading,
    /// Open, showing the session's theme, floor and character.
    Loaded(PlayerInfoResponse),
    /// Open, the request failed. Shows [`PANEL_FAILURE`].
    Failed,
}

impl Panel {
    /// Whether the panel takes screen space.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}
