//! Request-to-gateway translation layer.
//!
//! The [`Bridge`] owns the [`Gateway`] and the injected [`CredentialStore`].
//! It turns a [`Request`] issued by the [`crate::App`] into a future that
//! resolves to the matching [`AppEvent::Response`], so the runtime only ever
//! deals in app events.
//!
//! Futures it hands out own a clone of the gateway and are never cancelled:
//! a reply that arrives after the view is torn down is still delivered, and
//! the closed [`crate::App`] discards it.

use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use taleforge_client::{CredentialStore, Gateway};

use crate::{AppEvent, Reply, Request, Ticket};

/// Bridge between App requests and the gateway.
pub struct Bridge<G: Gateway> {
    gateway: G,
    credentials: Arc<dyn CredentialStore>,
}

impl<G: Gateway> Bridge<G> {
    /// Create a bridge over `gateway`.
    pub fn new(gateway: G, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { gateway, credentials }
    }

    /// Start `request`. The returned future resolves to its response event.
    pub fn dispatch(&self, ticket: Ticket, request: Request) -> BoxFuture<'static, AppEvent> {
        let gateway = self.gateway.clone();
        tracing::debug!(%ticket, request = request.name(), "dispatching request");

        async move {
            let reply = match request {
                Request::FetchHistory { session_id } => {
                    gateway.fetch_history(session_id).await.map(Reply::History)
                },
                Request::AdvanceFloor { session_id } => {
                    gateway.advance_floor(session_id).await.map(Reply::Floor)
                },
                Request::SubmitAction { session_id, input } => {
                    gateway.submit_action(session_id, &input).await.map(Reply::Action)
                },
                Request::FetchPlayerInfo { session_id } => {
                    gateway.player_info(session_id).await.map(Reply::PlayerInfo)
                },
            };
            AppEvent::Response { ticket, reply }
        }
        .boxed()
    }

    /// Clear every stored credential. Failures are logged, not raised: the
    /// view is leaving for the login entry point either way.
    pub fn forget_credentials(&self) {
        if let Err(err) = self.credentials.clear() {
            tracing::warn!(error = %err, "failed to clear credentials");
        }
    }
}
