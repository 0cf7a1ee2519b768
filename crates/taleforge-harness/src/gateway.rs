//! Scripted gateway.
//!
//! [`ScriptedGateway`] answers every endpoint from its own queue of canned
//! replies and records each call it receives. An endpoint with nothing
//! scripted fails with a network error, so a test that forgets a reply sees
//! the failure path instead of hanging.

use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use taleforge_client::{
    ApiError, CharacterSheet, CreateGameResponse, EventsResponse, Gateway, NewFloorResponse,
    PlayerInfoResponse, PlayerInputRequest, PlayerInputResponse, SessionId, SessionsResponse,
};

/// A request the gateway received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `create_game`.
    CreateGame(CharacterSheet),
    /// `fetch_history`.
    FetchHistory(SessionId),
    /// `advance_floor`.
    AdvanceFloor(SessionId),
    /// `submit_action`.
    SubmitAction(SessionId, PlayerInputRequest),
    /// `player_info`.
    PlayerInfo(SessionId),
    /// `list_sessions`.
    ListSessions,
}

type Queue<T> = VecDeque<Result<T, ApiError>>;

#[derive(Default)]
struct Script {
    created: Queue<CreateGameResponse>,
    history: Queue<EventsResponse>,
    floors: Queue<NewFloorResponse>,
    actions: Queue<PlayerInputResponse>,
    info: Queue<PlayerInfoResponse>,
    sessions: Queue<SessionsResponse>,
    calls: Vec<Call>,
    latency: usize,
}

/// Gateway answering from per-endpoint queues.
///
/// Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGateway {
    /// Gateway with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every reply take `polls` extra polls before resolving.
    #[must_use]
    pub fn with_latency(self, polls: usize) -> Self {
        self.lock().latency = polls;
        self
    }

    /// Queue a `create_game` reply.
    pub fn push_created(&self, reply: Result<CreateGameResponse, ApiError>) {
        self.lock().created.push_back(reply);
    }

    /// Queue a `fetch_history` reply.
    pub fn push_history(&self, reply: Result<EventsResponse, ApiError>) {
        self.lock().history.push_back(reply);
    }

    /// Queue an `advance_floor` reply.
    pub fn push_floor(&self, reply: Result<NewFloorResponse, ApiError>) {
        self.lock().floors.push_back(reply);
    }

    /// Queue a `submit_action` reply.
    pub fn push_action(&self, reply: Result<PlayerInputResponse, ApiError>) {
        self.lock().actions.push_back(reply);
    }

    /// Queue a `player_info` reply.
    pub fn push_player_info(&self, reply: Result<PlayerInfoResponse, ApiError>) {
        self.lock().info.push_back(reply);
    }

    /// Queue a `list_sessions` reply.
    pub fn push_sessions(&self, reply: Result<SessionsResponse, ApiError>) {
        self.lock().sessions.push_back(reply);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer<T>(
        &self,
        call: Call,
        queue: impl FnOnce(&mut Script) -> &mut Queue<T>,
    ) -> Delayed<Result<T, ApiError>> {
        let mut script = self.lock();
        tracing::debug!(?call, "scripted gateway call");
        script.calls.push(call);
        let reply = queue(&mut script)
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted reply".into())));
        Delayed { remaining: script.latency, reply: Some(reply) }
    }
}

impl Gateway for ScriptedGateway {
    fn create_game(
        &self,
        sheet: &CharacterSheet,
    ) -> impl Future<Output = Result<CreateGameResponse, ApiError>> + Send {
        self.answer(Call::CreateGame(sheet.clone()), |s| &mut s.created)
    }

    fn fetch_history(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<EventsResponse, ApiError>> + Send {
        self.answer(Call::FetchHistory(session), |s| &mut s.history)
    }

    fn advance_floor(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<NewFloorResponse, ApiError>> + Send {
        self.answer(Call::AdvanceFloor(session), |s| &mut s.floors)
    }

    fn submit_action(
        &self,
        session: SessionId,
        input: &PlayerInputRequest,
    ) -> impl Future<Output = Result<PlayerInputResponse, ApiError>> + Send {
        self.answer(Call::SubmitAction(session, input.clone()), |s| &mut s.actions)
    }

    fn player_info(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<PlayerInfoResponse, ApiError>> + Send {
        self.answer(Call::PlayerInfo(session), |s| &mut s.info)
    }

    fn list_sessions(&self) -> impl Future<Output = Result<SessionsResponse, ApiError>> + Send {
        self.answer(Call::ListSessions, |s| &mut s.sessions)
    }
}

/// Resolves to a fixed reply after a number of self-waking polls.
struct Delayed<T> {
    remaining: usize,
    reply: Option<T>,
}

impl<T: Unpin> Future for Delayed<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if self.remaining > 0 {
            self.remaining -= 1;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        match self.reply.take() {
            Some(reply) => Poll::Ready(reply),
            None => Poll::Pending,
        }
    }
}
