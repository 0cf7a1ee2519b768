//! Backend gateway trait.
//!
//! The [`Gateway`] trait is the only way the session view talks to the story
//! server. Production uses the reqwest-backed `HttpGateway`; tests use a
//! scripted implementation that answers from queues.

use std::future::Future;

use crate::{
    ApiError, CharacterSheet, CreateGameResponse, EventsResponse, NewFloorResponse,
    PlayerInfoResponse, PlayerInputRequest, PlayerInputResponse, SessionId, SessionsResponse,
};

/// Backend operations available to a session.
///
/// Implementations are cheap to clone: a clone is handed to every in-flight
/// request so the caller never borrows the gateway across an await.
///
/// # Errors
///
/// Every operation fails with an [`ApiError`]; callers recover through
/// [`ApiError::class`].
pub trait Gateway: Clone + Send + Sync + 'static {
    /// Start a new session for `sheet`.
    fn create_game(
        &self,
        sheet: &CharacterSheet,
    ) -> impl Future<Output = Result<CreateGameResponse, ApiError>> + Send;

    /// Full transcript and progress of `session`.
    fn fetch_history(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<EventsResponse, ApiError>> + Send;

    /// Move `session` to its next floor.
    fn advance_floor(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<NewFloorResponse, ApiError>> + Send;

    /// Submit a player action to `session`.
    fn submit_action(
        &self,
        session: SessionId,
        input: &PlayerInputRequest,
    ) -> impl Future<Output = Result<PlayerInputResponse, ApiError>> + Send;

    /// Theme, floor and character of `session`. Read-only.
    fn player_info(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<PlayerInfoResponse, ApiError>> + Send;

    /// Sessions owned by the authenticated user.
    fn list_sessions(&self) -> impl Future<Output = Result<SessionsResponse, ApiError>> + Send;
}
