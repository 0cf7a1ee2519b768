//! Client
//!
//! Backend gateway for Taleforge sessions. Defines the request and response
//! shapes the story server speaks, how failed responses are classified, and
//! the capabilities the turn controller is given instead of reaching for
//! ambient globals.
//!
//! # Components
//!
//! - [`Gateway`]: The backend operations a session view can perform
//! - [`ApiError`]: Failure taxonomy with [`ErrorClass`] driving recovery
//! - [`CredentialStore`]: Injected token storage (`get`/`set`/`clear`)
//! - [`CharacterSheet`]: Validated create-game request
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides
//! [`http::HttpGateway`], a reqwest-backed [`Gateway`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod credentials;
mod error;
mod gateway;
mod wire;

#[cfg(feature = "transport")]
pub mod http;

pub use credentials::{
    ACCESS_TOKEN, CredentialStore, FileCredentials, MemoryCredentials, REFRESH_TOKEN,
};
pub use error::{
    ApiError, CharacterError, CredentialError, ErrorClass, GENERIC_FAILURE, MODEL_UNAVAILABLE,
    NO_RESPONSE,
};
pub use gateway::Gateway;
pub use taleforge_core::{GameProgress, Message, Role};
pub use wire::{
    CharacterSheet, CreateGameResponse, EventsResponse, NewFloorResponse, PlayerInfo,
    PlayerInfoResponse, PlayerInputRequest, PlayerInputResponse, SessionId, SessionInfo,
    SessionSummary, SessionsResponse,
};
