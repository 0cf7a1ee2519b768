//! Turn controller.
//!
//! This module defines the [`App`] state machine, which owns one session view
//! completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Translates gestures and gateway replies into [`SessionEvent`]s.
//! - Gates submissions: a request is only issued from `AwaitInput` (submit) or
//!   `AwaitContinue` (advance floor), and the view moves to `Loading` before
//!   the request leaves, so at most one is ever in flight.
//! - Drives the [`TypingPlayer`] for the active message from clock ticks.
//! - Applies the failure policy: every failed request ends in a revert or a
//!   navigation, never in a stuck `Loading`.
//! - Keeps the session-info [`Panel`] beside the turn, on its own ticket.

use std::{iter, time::Duration};

use taleforge_client::{
    ApiError, ErrorClass, EventsResponse, NewFloorResponse, PlayerInputRequest,
    PlayerInputResponse, SessionId,
};
use taleforge_core::{
    GameProgress, Message, SessionEvent, SessionMode, SessionState, TypingConfig, TypingPlayer,
    TypingStep,
};

use crate::{
    AppAction, AppEvent, KeyInput, Lifecycle, Panel, Reply, Request, Route, SessionOrigin,
    Ticket,
};

/// Inline error for an empty submission.
pub const EMPTY_ACTION: &str = "Please enter a message.";

/// Narrator line closing a finished story.
pub const GAME_OVER: &str = "You are defeated. The game is over. Good luck next time!";

/// Suggestion always offered after the server's list.
pub const NEXT_FLOOR: &str = "Go to the next floor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    History,
    Floor,
    Action,
    PlayerInfo,
}

impl RequestKind {
    fn of(request: &Request) -> Self {
        match request {
            Request::FetchHistory { .. } => Self::History,
            Request::AdvanceFloor { .. } => Self::Floor,
            Request::SubmitAction { .. } => Self::Action,
            Request::FetchPlayerInfo { .. } => Self::PlayerInfo,
        }
    }
}

/// Turn controller for one session view.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Session this view shows.
    session_id: SessionId,
    /// Presentation state. Mutated only through [`SessionState::apply`].
    session: SessionState,
    /// Open/ready/closed.
    lifecycle: Lifecycle,
    /// Reveal timing for new typing players.
    typing: TypingConfig,
    /// Player for the active message. `None` if nothing is being typed.
    player: Option<TypingPlayer>,
    /// Latest clock reading.
    now: Duration,
    /// Action being composed.
    draft: String,
    /// Cursor position in the draft, in characters.
    cursor: usize,
    /// Inline, non-fatal error shown next to the input.
    input_error: Option<String>,
    /// Blocking notice. Must be dismissed before other input is accepted.
    notice: Option<String>,
    /// Suggestions offered with the last delivered message.
    offered: Vec<String>,
    /// Suggestion last copied into the draft.
    selected: Option<usize>,
    /// Ticket for the next request.
    next_ticket: u64,
    /// Turn request awaiting its reply.
    in_flight: Option<(Ticket, RequestKind)>,
    /// Session-info side panel.
    panel: Panel,
    /// Panel request awaiting its reply. Independent of `in_flight`.
    panel_request: Option<Ticket>,
}

impl App {
    /// Create an unopened view of `session_id`.
    pub fn new(session_id: SessionId, typing: TypingConfig) -> Self {
        Self {
            session_id,
            session: SessionState::new(),
            lifecycle: Lifecycle::Uninitialized,
            typing,
            player: None,
            now: Duration::ZERO,
            draft: String::new(),
            cursor: 0,
            input_error: None,
            notice: None,
            offered: Vec::new(),
            selected: None,
            next_ticket: 1,
            in_flight: None,
            panel: Panel::Hidden,
            panel_request: None,
        }
    }

    /// Open the view. Accepted once, from [`Lifecycle::Uninitialized`].
    ///
    /// A fresh session types its opening narrative and then waits for the
    /// player to continue to the first floor. A resumed session fetches its
    /// transcript.
    pub fn open(&mut self, origin: SessionOrigin) -> Vec<AppAction> {
        if self.lifecycle != Lifecycle::Uninitialized {
            tracing::warn!(session = self.session_id, lifecycle = ?self.lifecycle, "open ignored");
            return vec![];
        }
        self.lifecycle = Lifecycle::Initializing;

        match origin {
            SessionOrigin::Fresh { narrative } => {
                tracing::info!(session = self.session_id, "opening new session");
                self.session
                    .apply(SessionEvent::SetGameProgress(GameProgress::WaitingForNextFloor));
                self.session.apply(SessionEvent::StartTyping(Message::narrator(narrative)));
                self.settle_player();
                self.finish_init();
                vec![AppAction::Render]
            },
            SessionOrigin::Resume => {
                tracing::info!(session = self.session_id, "resuming session");
                let request = Request::FetchHistory { session_id: self.session_id };
                vec![self.dispatch(request), AppAction::Render]
            },
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        if self.lifecycle == Lifecycle::Closed {
            if let AppEvent::Response { ticket, .. } = event {
                tracing::debug!(%ticket, "response after close discarded");
            }
            return vec![];
        }

        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick { now } => self.tick(now),
            AppEvent::Resize(cols, rows) => {
                tracing::debug!(cols, rows, "resized");
                vec![AppAction::Render]
            },
            AppEvent::Response { ticket, reply } => self.handle_response(ticket, reply),
        }
    }

    /// Reveal the rest of the active message now.
    pub fn skip(&mut self) -> Vec<AppAction> {
        match self.player.as_mut().map(TypingPlayer::skip) {
            Some(TypingStep::Finished) => {
                self.complete_typing();
                vec![AppAction::Render]
            },
            Some(TypingStep::Revealing | TypingStep::Idle) | None => vec![],
        }
    }

    /// Submit the draft as the player's action.
    ///
    /// Only valid in `AwaitInput`. A blank draft is rejected locally with
    /// [`EMPTY_ACTION`] and never reaches the gateway.
    pub fn submit(&mut self) -> Vec<AppAction> {
        let mode = self.session.current_mode();
        if mode != SessionMode::AwaitInput {
            tracing::warn!(?mode, "submit ignored");
            return vec![];
        }

        let action = self.draft.trim();
        if action.is_empty() {
            self.input_error = Some(EMPTY_ACTION.to_owned());
            self.clear_draft();
            return vec![AppAction::Render];
        }

        let input = PlayerInputRequest {
            action: action.to_owned(),
            suggested_actions: self.offered.clone(),
        };
        self.input_error = None;
        self.session.apply(SessionEvent::SetLoading);

        let request = Request::SubmitAction { session_id: self.session_id, input };
        vec![self.dispatch(request), AppAction::Render]
    }

    /// Continue to the next floor. Only valid in `AwaitContinue`.
    pub fn advance_floor(&mut self) -> Vec<AppAction> {
        let mode = self.session.current_mode();
        if mode != SessionMode::AwaitContinue {
            tracing::warn!(?mode, "advance floor ignored");
            return vec![];
        }

        self.input_error = None;
        self.session.apply(SessionEvent::SetLoading);
        let request = Request::AdvanceFloor { session_id: self.session_id };
        vec![self.dispatch(request), AppAction::Render]
    }

    /// Copy suggestion `index` into the draft.
    ///
    /// Indexes past the server's list select [`NEXT_FLOOR`]; anything
    /// further is ignored.
    pub fn select_suggestion(&mut self, index: usize) -> Vec<AppAction> {
        if self.session.current_mode() != SessionMode::AwaitInput {
            return vec![];
        }
        let Some(suggestion) = self.suggestions().nth(index).map(str::to_owned) else {
            return vec![];
        };

        self.cursor = suggestion.chars().count();
        self.draft = suggestion;
        self.selected = Some(index);
        self.input_error = None;
        vec![AppAction::Render]
    }

    /// Open or close the session-info panel.
    ///
    /// Opening always fetches fresh contents. Closing forgets the request, so
    /// a reply that arrives afterwards is discarded.
    pub fn toggle_panel(&mut self) -> Vec<AppAction> {
        if self.panel.is_open() {
            self.panel = Panel::Hidden;
            self.panel_request = None;
            return vec![AppAction::Render];
        }

        self.panel = Panel::Loading;
        let request = Request::FetchPlayerInfo { session_id: self.session_id };
        vec![self.dispatch(request), AppAction::Render]
    }

    /// Tear the view down. Every later event is discarded.
    pub fn close(&mut self) -> Vec<AppAction> {
        self.teardown();
        vec![AppAction::Quit]
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.notice.is_some() {
            return match key {
                KeyInput::Enter | KeyInput::Esc => {
                    self.notice = None;
                    vec![AppAction::Render]
                },
                _ => vec![],
            };
        }

        match key {
            KeyInput::Enter => self.enter(),
            KeyInput::Esc => self.close(),
            KeyInput::Up => self.cycle_suggestion(false),
            KeyInput::Down => self.cycle_suggestion(true),
            KeyInput::Tab => self.toggle_panel(),
            KeyInput::Char(_)
            | KeyInput::Backspace
            | KeyInput::Delete
            | KeyInput::Left
            | KeyInput::Right
            | KeyInput::Home
            | KeyInput::End => self.edit(key),
        }
    }

    fn enter(&mut self) -> Vec<AppAction> {
        match self.session.current_mode() {
            SessionMode::Typing => self.skip(),
            SessionMode::AwaitContinue => self.advance_floor(),
            SessionMode::AwaitInput => self.submit(),
            mode @ (SessionMode::Loading | SessionMode::Completed) => {
                tracing::warn!(?mode, "enter ignored");
                vec![]
            },
        }
    }

    fn edit(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.session.current_mode() != SessionMode::AwaitInput {
            return vec![];
        }

        let len = self.draft.chars().count();
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.draft.insert(at, c);
                self.cursor += 1;
            },
            KeyInput::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.draft.remove(at);
            },
            KeyInput::Delete if self.cursor < len => {
                let at = self.byte_index(self.cursor);
                self.draft.remove(at);
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(len),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = len,
            _ => return vec![],
        }

        self.input_error = None;
        self.selected = None;
        vec![AppAction::Render]
    }

    fn cycle_suggestion(&mut self, forward: bool) -> Vec<AppAction> {
        let count = self.offered.len() + 1;
        let index = match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        self.select_suggestion(index)
    }

    fn tick(&mut self, now: Duration) -> Vec<AppAction> {
        self.now = self.now.max(now);
        let Some(player) = self.player.as_mut() else {
            return vec![];
        };

        let shown = player.visible().len();
        let step = player.advance(self.now);
        let grew = player.visible().len() != shown;

        match step {
            TypingStep::Finished => {
                self.complete_typing();
                vec![AppAction::Render]
            },
            TypingStep::Revealing if grew => vec![AppAction::Render],
            TypingStep::Revealing | TypingStep::Idle => vec![],
        }
    }

    fn handle_response(
        &mut self,
        ticket: Ticket,
        reply: Result<Reply, ApiError>,
    ) -> Vec<AppAction> {
        if self.panel_request == Some(ticket) {
            self.panel_request = None;
            return self.apply_panel(reply);
        }

        let kind = match self.in_flight {
            Some((expected, kind)) if expected == ticket => kind,
            _ => {
                tracing::debug!(%ticket, "stale response discarded");
                return vec![];
            },
        };
        self.in_flight = None;

        match reply {
            Ok(Reply::History(history)) => self.apply_history(history),
            Ok(Reply::Floor(floor)) => self.apply_floor(floor),
            Ok(Reply::Action(outcome)) => self.apply_action(outcome),
            Ok(Reply::PlayerInfo(_)) => {
                let err = ApiError::Decode(format!("{kind:?} request answered with player info"));
                self.fail(kind, &err)
            },
            Err(err) => self.fail(kind, &err),
        }
    }

    fn apply_panel(&mut self, reply: Result<Reply, ApiError>) -> Vec<AppAction> {
        match reply {
            Ok(Reply::PlayerInfo(info)) => {
                self.panel = Panel::Loaded(info);
                vec![AppAction::Render]
            },
            Ok(other) => {
                let err = ApiError::Decode(format!("player info answered with {other:?}"));
                self.fail(RequestKind::PlayerInfo, &err)
            },
            Err(err) => self.fail(RequestKind::PlayerInfo, &err),
        }
    }

    fn apply_history(&mut self, history: EventsResponse) -> Vec<AppAction> {
        let EventsResponse { events, state } = history;
        tracing::debug!(count = events.len(), ?state, "history loaded");

        self.offer_from(events.last());
        for event in events {
            self.session.apply(SessionEvent::AddMessage(event));
        }
        self.session.apply(SessionEvent::SetGameProgress(state));
        self.session.apply(SessionEvent::IdentifyMode);
        self.finish_init();
        vec![AppAction::Render]
    }

    fn apply_floor(&mut self, floor: NewFloorResponse) -> Vec<AppAction> {
        let NewFloorResponse { narrative, suggested_actions, state } = floor;

        self.offered.clone_from(&suggested_actions);
        self.selected = None;

        let mut message = Message::narrator(narrative);
        if !suggested_actions.is_empty() {
            message.set_suggested_actions(suggested_actions);
        }
        self.session.apply(SessionEvent::StartTyping(message));
        self.session.apply(SessionEvent::SetGameProgress(state));
        self.settle_player();
        vec![AppAction::Render]
    }

    fn apply_action(&mut self, outcome: PlayerInputResponse) -> Vec<AppAction> {
        let PlayerInputResponse { state, mut events, suggested_actions } = outcome;

        let attach = if state == GameProgress::InProgress { suggested_actions } else { None };
        if let (Some(actions), Some(last)) = (attach, events.last_mut()) {
            last.set_suggested_actions(actions);
        }
        self.offer_from(events.last());

        let settled_directly = events.is_empty();
        for event in events {
            self.session.apply(SessionEvent::StartTyping(event));
        }
        self.session.apply(SessionEvent::SetGameProgress(state));
        if settled_directly {
            self.session.apply(SessionEvent::IdentifyMode);
        }

        self.clear_draft();
        self.settle_player();
        vec![AppAction::Render]
    }

    fn fail(&mut self, kind: RequestKind, err: &ApiError) -> Vec<AppAction> {
        let class = err.class();
        tracing::warn!(request = ?kind, ?class, error = %err, "request failed");

        match (class, kind) {
            (ErrorClass::Auth, _) => {
                self.teardown();
                vec![AppAction::ForgetCredentials, AppAction::Navigate {
                    route: Route::Login,
                    reason: None,
                }]
            },
            (_, RequestKind::PlayerInfo) => {
                self.panel = Panel::Failed;
                vec![AppAction::Render]
            },
            (_, RequestKind::History) => {
                self.teardown();
                vec![AppAction::Navigate { route: Route::Home, reason: Some(err.to_string()) }]
            },
            (ErrorClass::Validation, _) => {
                self.input_error = Some(err.to_string());
                self.session.apply(SessionEvent::Revert);
                vec![AppAction::Render]
            },
            (ErrorClass::Server | ErrorClass::Network, _) => {
                self.notice = Some(err.to_string());
                self.session.apply(SessionEvent::Revert);
                vec![AppAction::Render]
            },
        }
    }

    fn dispatch(&mut self, request: Request) -> AppAction {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        match RequestKind::of(&request) {
            RequestKind::PlayerInfo => self.panel_request = Some(ticket),
            kind => self.in_flight = Some((ticket, kind)),
        }
        tracing::debug!(%ticket, request = request.name(), "request issued");
        AppAction::Dispatch { ticket, request }
    }

    /// Start a player for the active message, completing any message that
    /// finishes on its first frame.
    fn settle_player(&mut self) {
        if self.player.is_some() {
            return;
        }
        while let Some(message) = self.session.active_typing() {
            let mut player = TypingPlayer::start(message, self.typing, self.now);
            if player.advance(self.now) != TypingStep::Finished {
                self.player = Some(player);
                return;
            }
            self.session.apply(SessionEvent::TypingComplete);
        }
    }

    fn complete_typing(&mut self) {
        self.player = None;
        self.session.apply(SessionEvent::TypingComplete);
        self.settle_player();
    }

    fn finish_init(&mut self) {
        self.session.apply(SessionEvent::SetInitializing(false));
        self.lifecycle = Lifecycle::Ready;
        let mode = self.session.current_mode();
        tracing::info!(session = self.session_id, ?mode, "session ready");
    }

    fn teardown(&mut self) {
        if self.lifecycle != Lifecycle::Closed {
            tracing::info!(session = self.session_id, "session view closed");
        }
        self.lifecycle = Lifecycle::Closed;
        self.player = None;
    }

    fn offer_from(&mut self, last: Option<&Message>) {
        self.offered =
            last.and_then(Message::suggested_actions).map(<[String]>::to_vec).unwrap_or_default();
        self.selected = None;
    }

    fn clear_draft(&mut self) {
        self.draft.clear();
        self.cursor = 0;
        self.selected = None;
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.draft.char_indices().nth(chars).map_or(self.draft.len(), |(index, _)| index)
    }

    /// Session this view shows.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Presentation state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Current presentation mode.
    pub fn mode(&self) -> SessionMode {
        self.session.current_mode()
    }

    /// View lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Revealed part of the active message. `None` if nothing is being typed.
    pub fn typing_text(&self) -> Option<&str> {
        self.player.as_ref().map(TypingPlayer::visible)
    }

    /// Action being composed.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Cursor position in the draft, in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Inline error. `None` if the last input was fine.
    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    /// Blocking notice. `None` if nothing needs acknowledging.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Offered suggestions, ending with [`NEXT_FLOOR`].
    pub fn suggestions(&self) -> impl Iterator<Item = &str> {
        self.offered.iter().map(String::as_str).chain(iter::once(NEXT_FLOOR))
    }

    /// Suggestions the server offered with the last message, as they will be
    /// echoed back on the next submission.
    pub fn offered(&self) -> &[String] {
        &self.offered
    }

    /// Suggestion last copied into the draft. `None` after the draft is edited.
    pub fn selected_suggestion(&self) -> Option<usize> {
        self.selected
    }

    /// Ticket of the turn request awaiting its reply. `None` if idle.
    ///
    /// Panel requests are not counted.
    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight.map(|(ticket, _)| ticket)
    }

    /// Closing narrator line. `None` unless both the view and the server
    /// consider the story finished.
    pub fn epilogue(&self) -> Option<&'static str> {
        let finished = self.session.current_mode() == SessionMode::Completed
            && self.session.game_progress() == Some(GameProgress::Completed);
        finished.then_some(GAME_OVER)
    }

    /// Session-info side panel.
    pub fn panel(&self) -> &Panel {
        &self.panel
    }
}

#[cfg(test)]
mod tests {
    use taleforge_client::{PlayerInfoResponse, Role, SessionInfo};

    use super::*;

    const CADENCE: Duration = Duration::from_millis(10);

    fn slow_typing() -> TypingConfig {
        TypingConfig { cadence: CADENCE, linger: Duration::ZERO }
    }

    fn resumed(typing: TypingConfig) -> (App, Ticket) {
        let mut app = App::new(7, typing);
        let actions = app.open(SessionOrigin::Resume);
        let ticket = match actions.as_slice() {
            [
                AppAction::Dispatch { ticket, request: Request::FetchHistory { session_id: 7 } },
                AppAction::Render,
            ] => *ticket,
            other => panic!("unexpected actions: {other:?}"),
        };
        (app, ticket)
    }

    fn awaiting_input() -> App {
        let (mut app, ticket) = resumed(TypingConfig::instant());
        let history = EventsResponse {
            events: vec![
                Message::narrator("You wake in a cell.")
                    .with_suggested_actions(vec!["look around".into()]),
            ],
            state: GameProgress::InProgress,
        };
        app.handle(AppEvent::Response { ticket, reply: Ok(Reply::History(history)) });
        app
    }

    fn type_draft(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
    }

    fn dispatched(actions: &[AppAction]) -> (Ticket, Request) {
        actions
            .iter()
            .find_map(|action| match action {
                AppAction::Dispatch { ticket, request } => Some((*ticket, request.clone())),
                _ => None,
            })
            .expect("request dispatched")
    }

    #[test]
    fn open_is_accepted_once() {
        let (mut app, _) = resumed(TypingConfig::instant());
        assert_eq!(app.lifecycle(), Lifecycle::Initializing);
        assert!(app.open(SessionOrigin::Resume).is_empty());
    }

    #[test]
    fn fresh_session_types_narrative_then_awaits_continue() {
        let mut app = App::new(1, slow_typing());
        app.open(SessionOrigin::Fresh { narrative: "Dust.".into() });

        assert_eq!(app.lifecycle(), Lifecycle::Ready);
        assert_eq!(app.mode(), SessionMode::Typing);
        assert_eq!(app.typing_text(), Some(""));

        app.handle(AppEvent::Tick { now: Duration::from_millis(20) });
        assert_eq!(app.typing_text(), Some("Du"));

        app.handle(AppEvent::Tick { now: Duration::from_millis(50) });
        assert_eq!(app.mode(), SessionMode::AwaitContinue);
        assert_eq!(app.typing_text(), None);
        assert_eq!(app.session().history().len(), 1);
    }

    #[test]
    fn enter_while_typing_skips() {
        let mut app = App::new(1, slow_typing());
        app.open(SessionOrigin::Fresh { narrative: "A very long opening.".into() });

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.mode(), SessionMode::AwaitContinue);
        assert_eq!(app.session().history()[0].content(), "A very long opening.");
    }

    #[test]
    fn history_replay_remembers_last_suggestions() {
        let app = awaiting_input();

        assert_eq!(app.lifecycle(), Lifecycle::Ready);
        assert_eq!(app.mode(), SessionMode::AwaitInput);
        assert!(!app.session().is_initializing());
        assert_eq!(app.offered(), ["look around".to_string()]);
        assert_eq!(app.suggestions().collect::<Vec<_>>(), vec!["look around", NEXT_FLOOR]);
    }

    #[test]
    fn empty_submission_is_rejected_locally() {
        let mut app = awaiting_input();
        type_draft(&mut app, "   ");

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.input_error(), Some(EMPTY_ACTION));
        assert_eq!(app.mode(), SessionMode::AwaitInput);
        assert_eq!(app.in_flight(), None);
        assert_eq!(app.draft(), "");
    }

    #[test]
    fn submission_moves_to_loading_and_round_trips_suggestions() {
        let mut app = awaiting_input();
        type_draft(&mut app, "  open the door ");

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        let (_, request) = dispatched(&actions);

        assert_eq!(app.mode(), SessionMode::Loading);
        assert_eq!(request, Request::SubmitAction {
            session_id: 7,
            input: PlayerInputRequest {
                action: "open the door".into(),
                suggested_actions: vec!["look around".into()],
            },
        });

        // A second Enter while loading sends nothing.
        assert!(app.handle(AppEvent::Key(KeyInput::Enter)).is_empty());
    }

    #[test]
    fn suggestions_attach_to_last_event_only_in_progress() {
        let mut app = awaiting_input();
        type_draft(&mut app, "wait");
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Enter)));

        let outcome = PlayerInputResponse {
            state: GameProgress::InProgress,
            events: vec![Message::player("wait"), Message::narrator("Time passes.")],
            suggested_actions: Some(vec!["sleep".into()]),
        };
        app.handle(AppEvent::Response { ticket, reply: Ok(Reply::Action(outcome)) });

        let last = app.session().history().last().expect("narration");
        assert_eq!(last.suggested_actions(), Some(&["sleep".to_string()][..]));
        assert_eq!(app.offered(), ["sleep".to_string()]);
        assert_eq!(app.draft(), "");
    }

    #[test]
    fn empty_action_reply_settles_mode() {
        let mut app = awaiting_input();
        type_draft(&mut app, "wait");
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Enter)));

        let outcome = PlayerInputResponse {
            state: GameProgress::WaitingForNextFloor,
            events: Vec::new(),
            suggested_actions: None,
        };
        app.handle(AppEvent::Response { ticket, reply: Ok(Reply::Action(outcome)) });

        assert_eq!(app.mode(), SessionMode::AwaitContinue);
    }

    #[test]
    fn server_failure_raises_notice_and_reverts() {
        let mut app = awaiting_input();
        type_draft(&mut app, "wait");
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Enter)));

        let err = ApiError::from_response(503, "");
        app.handle(AppEvent::Response { ticket, reply: Err(err) });

        assert_eq!(app.mode(), SessionMode::AwaitInput);
        assert_eq!(app.notice(), Some(taleforge_client::MODEL_UNAVAILABLE));
        assert_eq!(app.draft(), "wait");

        // Keys other than Enter/Esc are swallowed until the notice is dismissed.
        app.handle(AppEvent::Key(KeyInput::Char('!')));
        assert_eq!(app.draft(), "wait");
        app.handle(AppEvent::Key(KeyInput::Esc));
        assert_eq!(app.notice(), None);
        assert_eq!(app.lifecycle(), Lifecycle::Ready);
    }

    #[test]
    fn auth_failure_forgets_credentials_and_leaves() {
        let mut app = awaiting_input();
        type_draft(&mut app, "wait");
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Enter)));

        let actions = app.handle(AppEvent::Response {
            ticket,
            reply: Err(ApiError::Unauthorized { status: 401 }),
        });

        assert_eq!(actions, vec![AppAction::ForgetCredentials, AppAction::Navigate {
            route: Route::Login,
            reason: None,
        }]);
        assert_eq!(app.lifecycle(), Lifecycle::Closed);
    }

    #[test]
    fn history_failure_navigates_home() {
        let (mut app, ticket) = resumed(TypingConfig::instant());

        let reply = Err(ApiError::no_response());
        let actions = app.handle(AppEvent::Response { ticket, reply });

        assert_eq!(actions, vec![AppAction::Navigate {
            route: Route::Home,
            reason: Some(taleforge_client::NO_RESPONSE.to_owned()),
        }]);
    }

    #[test]
    fn stale_and_late_responses_are_discarded() {
        let (mut app, ticket) = resumed(TypingConfig::instant());
        let history = EventsResponse { events: Vec::new(), state: GameProgress::Completed };

        let stale = Ticket(ticket.0 + 40);
        let reply = Ok(Reply::History(history.clone()));
        assert!(app.handle(AppEvent::Response { ticket: stale, reply }).is_empty());
        assert_eq!(app.lifecycle(), Lifecycle::Initializing);

        app.close();
        let reply = Ok(Reply::History(history));
        assert!(app.handle(AppEvent::Response { ticket, reply }).is_empty());
        assert_eq!(app.mode(), SessionMode::Loading);
    }

    #[test]
    fn cursor_editing_respects_multibyte_chars() {
        let mut app = awaiting_input();
        type_draft(&mut app, "héllo");

        app.handle(AppEvent::Key(KeyInput::Home));
        app.handle(AppEvent::Key(KeyInput::Right));
        app.handle(AppEvent::Key(KeyInput::Delete));
        assert_eq!(app.draft(), "hllo");

        app.handle(AppEvent::Key(KeyInput::End));
        app.handle(AppEvent::Key(KeyInput::Backspace));
        assert_eq!(app.draft(), "hll");
        assert_eq!(app.cursor(), 3);
    }

    #[test]
    fn arrows_cycle_suggestions_into_draft() {
        let mut app = awaiting_input();

        app.handle(AppEvent::Key(KeyInput::Down));
        assert_eq!(app.draft(), "look around");
        app.handle(AppEvent::Key(KeyInput::Down));
        assert_eq!(app.draft(), NEXT_FLOOR);
        app.handle(AppEvent::Key(KeyInput::Down));
        assert_eq!(app.draft(), "look around");
        app.handle(AppEvent::Key(KeyInput::Up));
        assert_eq!(app.draft(), NEXT_FLOOR);
        assert_eq!(app.cursor(), NEXT_FLOOR.chars().count());
    }

    #[test]
    fn unplayable_server_state_settles_completed() {
        let (mut app, ticket) = resumed(TypingConfig::instant());
        let history: EventsResponse = serde_json::from_str(
            r#"{"events": [{"role": "Narrator", "content": "Roll."}], "state": "Player Creation"}"#,
        )
        .unwrap();

        app.handle(AppEvent::Response { ticket, reply: Ok(Reply::History(history)) });

        assert_eq!(app.lifecycle(), Lifecycle::Ready);
        assert_eq!(app.mode(), SessionMode::Completed);
        assert_eq!(app.epilogue(), Some(GAME_OVER));
        assert!(app.handle(AppEvent::Key(KeyInput::Enter)).is_empty());
    }

    #[test]
    fn epilogue_waits_for_the_last_narration() {
        let mut app = awaiting_input();
        type_draft(&mut app, "charge");
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Enter)));
        app.typing = slow_typing();

        let outcome = PlayerInputResponse {
            state: GameProgress::Completed,
            events: vec![Message::narrator("The troll swings.")],
            suggested_actions: None,
        };
        app.handle(AppEvent::Response { ticket, reply: Ok(Reply::Action(outcome)) });
        assert_eq!(app.mode(), SessionMode::Typing);
        assert_eq!(app.epilogue(), None);

        app.skip();
        assert_eq!(app.mode(), SessionMode::Completed);
        assert_eq!(app.epilogue(), Some(GAME_OVER));
    }

    #[test]
    fn panel_has_its_own_request_slot() {
        let mut app = awaiting_input();

        let (panel_ticket, request) = dispatched(&app.handle(AppEvent::Key(KeyInput::Tab)));
        assert_eq!(request, Request::FetchPlayerInfo { session_id: 7 });
        assert_eq!(app.panel(), &Panel::Loading);
        assert_eq!(app.mode(), SessionMode::AwaitInput);
        assert_eq!(app.in_flight(), None);

        // A submission still goes out while the panel loads.
        type_draft(&mut app, "wait");
        let (turn_ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Enter)));
        assert_eq!(app.mode(), SessionMode::Loading);

        let info = PlayerInfoResponse {
            session_info: SessionInfo { theme: Some("Crypt".into()), current_floor: Some(2) },
            player_info: None,
        };
        let reply = Ok(Reply::PlayerInfo(info.clone()));
        app.handle(AppEvent::Response { ticket: panel_ticket, reply });

        assert_eq!(app.panel(), &Panel::Loaded(info));
        assert_eq!(app.mode(), SessionMode::Loading);
        assert_eq!(app.in_flight(), Some(turn_ticket));
    }

    #[test]
    fn panel_failure_stays_in_panel() {
        let mut app = awaiting_input();
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Tab)));

        let reply = Err(ApiError::from_response(500, ""));
        app.handle(AppEvent::Response { ticket, reply });

        assert_eq!(app.panel(), &Panel::Failed);
        assert_eq!(app.notice(), None);
        assert_eq!(app.mode(), SessionMode::AwaitInput);
        assert_eq!(app.lifecycle(), Lifecycle::Ready);
    }

    #[test]
    fn closed_panel_discards_late_reply() {
        let mut app = awaiting_input();
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Tab)));

        assert_eq!(app.handle(AppEvent::Key(KeyInput::Tab)), vec![AppAction::Render]);
        assert_eq!(app.panel(), &Panel::Hidden);

        let reply = Ok(Reply::PlayerInfo(PlayerInfoResponse::default()));
        assert!(app.handle(AppEvent::Response { ticket, reply }).is_empty());
        assert_eq!(app.panel(), &Panel::Hidden);
    }

    #[test]
    fn expired_token_on_panel_leaves_for_login() {
        let mut app = awaiting_input();
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Tab)));

        let reply = Err(ApiError::Unauthorized { status: 403 });
        let actions = app.handle(AppEvent::Response { ticket, reply });

        assert_eq!(actions, vec![AppAction::ForgetCredentials, AppAction::Navigate {
            route: Route::Login,
            reason: None,
        }]);
    }

    #[test]
    fn player_echo_is_not_animated() {
        let (mut app, ticket) = resumed(slow_typing());
        let history = EventsResponse { events: Vec::new(), state: GameProgress::InProgress };
        app.handle(AppEvent::Response { ticket, reply: Ok(Reply::History(history)) });
        type_draft(&mut app, "go");
        let (ticket, _) = dispatched(&app.handle(AppEvent::Key(KeyInput::Enter)));

        let outcome = PlayerInputResponse {
            state: GameProgress::InProgress,
            events: vec![Message::player("go"), Message::narrator("Ok.")],
            suggested_actions: None,
        };
        app.handle(AppEvent::Response { ticket, reply: Ok(Reply::Action(outcome)) });

        // The echo lands in history at once; the narration is being typed.
        assert_eq!(app.session().history().len(), 1);
        assert_eq!(app.session().history()[0].role(), Role::Player);
        assert_eq!(app.session().active_typing().map(Message::content), Some("Ok."));
    }
}
