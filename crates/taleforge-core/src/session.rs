//! Session state machine.
//!
//! [`SessionState`] is the single value describing a session view: what the
//! client is currently doing ([`SessionMode`]), what the server expects next
//! ([`GameProgress`]), the transcript so far and the backlog of messages
//! waiting to be revealed.
//!
//! All changes go through [`SessionState::apply`] (or the free function
//! [`transition`]), a flat match over [`SessionEvent`]. Derived transitions
//! such as mode identification are private helpers rather than re-dispatched
//! events, so every path through the table is visible in one place.
//!
//! # Invariants
//!
//! - An active typing message exists if and only if the mode is
//!   [`SessionMode::Typing`]. Mode changes that would break this are ignored.
//! - The history only grows.
//! - The pending queue is appended at the tail and consumed from the head.
//! - At most one previous mode is remembered; reverting consumes it.

use std::collections::VecDeque;

use crate::{GameProgress, Message};

/// Client-side presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// A message is being revealed.
    Typing,
    /// Waiting for the player to continue to the next floor.
    AwaitContinue,
    /// Waiting for the player to submit an action.
    AwaitInput,
    /// A request is in flight.
    Loading,
    /// The story is over.
    Completed,
}

impl SessionMode {
    /// Mode a settled session resolves to for the given progress.
    ///
    /// Anything other than an explicit in-progress or waiting signal resolves
    /// to [`SessionMode::Completed`].
    pub fn settled(progress: Option<GameProgress>) -> Self {
        match progress {
            Some(GameProgress::WaitingForNextFloor) => Self::AwaitContinue,
            Some(GameProgress::InProgress) => Self::AwaitInput,
            Some(GameProgress::Completed) | None => Self::Completed,
        }
    }

    /// Whether a player submission (action or continue) may start from here.
    pub fn accepts_submission(self) -> bool {
        matches!(self, Self::AwaitInput | Self::AwaitContinue)
    }
}

/// Events processed by the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Change mode, remembering the current one for a later revert.
    SetMode(SessionMode),
    /// Return to the remembered mode. One-shot.
    Revert,
    /// Shorthand for `SetMode(Loading)`.
    SetLoading,
    /// Record the server's progress signal. Does not change the mode.
    SetGameProgress(GameProgress),
    /// Record whether the view is still initializing.
    SetInitializing(bool),
    /// Reveal a message, or queue it behind the one being revealed.
    StartTyping(Message),
    /// The active message finished revealing.
    TypingComplete,
    /// Resolve the mode from the current game progress.
    IdentifyMode,
    /// Append directly to history without revealing.
    AddMessage(Message),
}

impl SessionEvent {
    /// Short event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetMode(_) => "SetMode",
            Self::Revert => "Revert",
            Self::SetLoading => "SetLoading",
            Self::SetGameProgress(_) => "SetGameProgress",
            Self::SetInitializing(_) => "SetInitializing",
            Self::StartTyping(_) => "StartTyping",
            Self::TypingComplete => "TypingComplete",
            Self::IdentifyMode => "IdentifyMode",
            Self::AddMessage(_) => "AddMessage",
        }
    }
}

/// Result of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State was updated.
    Applied,
    /// State is unchanged.
    Ignored(IgnoreReason),
}

/// Why an event left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Revert requested with no remembered mode.
    NothingToRevert,
    /// Entering `Typing` with no active message.
    NoActiveMessage,
    /// Leaving `Typing` while a message is still being revealed.
    MessageStillTyping,
}

/// The session state machine value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    current_mode: SessionMode,
    previous_mode: Option<SessionMode>,
    game_progress: Option<GameProgress>,
    is_initializing: bool,
    history: Vec<Message>,
    active_typing: Option<Message>,
    pending: VecDeque<Message>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh state for a view that has not loaded anything yet.
    ///
    /// Starts in [`SessionMode::Loading`] with no progress and an empty
    /// transcript.
    pub fn new() -> Self {
        Self {
            current_mode: SessionMode::Loading,
            previous_mode: None,
            game_progress: None,
            is_initializing: true,
            history: Vec::new(),
            active_typing: None,
            pending: VecDeque::new(),
        }
    }

    /// Apply an event in place.
    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        let name = event.name();
        let outcome = match event {
            SessionEvent::SetMode(mode) => self.set_mode(mode),
            SessionEvent::Revert => self.revert(),
            SessionEvent::SetLoading => self.set_mode(SessionMode::Loading),
            SessionEvent::SetGameProgress(progress) => {
                self.game_progress = Some(progress);
                Transition::Applied
            },
            SessionEvent::SetInitializing(flag) => {
                self.is_initializing = flag;
                Transition::Applied
            },
            SessionEvent::StartTyping(message) => self.start_typing(message),
            SessionEvent::TypingComplete => self.complete_typing(),
            SessionEvent::IdentifyMode => self.identify_mode(),
            SessionEvent::AddMessage(message) => {
                self.history.push(message);
                Transition::Applied
            },
        };

        if let Transition::Ignored(reason) = outcome {
            tracing::warn!(
                event = name,
                ?reason,
                mode = ?self.current_mode,
                "session event ignored"
            );
        }
        outcome
    }

    fn set_mode(&mut self, mode: SessionMode) -> Transition {
        if let Some(reason) = self.blocks_mode(mode) {
            return Transition::Ignored(reason);
        }
        self.previous_mode = Some(self.current_mode);
        self.current_mode = mode;
        Transition::Applied
    }

    fn revert(&mut self) -> Transition {
        let Some(previous) = self.previous_mode else {
            return Transition::Ignored(IgnoreReason::NothingToRevert);
        };
        if let Some(reason) = self.blocks_mode(previous) {
            return Transition::Ignored(reason);
        }
        self.current_mode = previous;
        self.previous_mode = None;
        Transition::Applied
    }

    fn start_typing(&mut self, message: Message) -> Transition {
        if self.current_mode == SessionMode::Typing && self.active_typing.is_some() {
            self.pending.push_back(message);
            return Transition::Applied;
        }
        self.previous_mode = Some(self.current_mode);
        self.current_mode = SessionMode::Typing;
        self.active_typing = Some(message);
        Transition::Applied
    }

    fn complete_typing(&mut self) -> Transition {
        if let Some(done) = self.active_typing.take() {
            self.history.push(done);
        }
        match self.pending.pop_front() {
            Some(next) => {
                self.active_typing = Some(next);
                Transition::Applied
            },
            None => self.identify_mode(),
        }
    }

    fn identify_mode(&mut self) -> Transition {
        self.set_mode(SessionMode::settled(self.game_progress))
    }

    /// Reason entering `mode` would break the typing invariant, if any.
    fn blocks_mode(&self, mode: SessionMode) -> Option<IgnoreReason> {
        match (mode == SessionMode::Typing, self.active_typing.is_some()) {
            (true, false) => Some(IgnoreReason::NoActiveMessage),
            (false, true) => Some(IgnoreReason::MessageStillTyping),
            _ => None,
        }
    }

    /// Current presentation mode.
    pub fn current_mode(&self) -> SessionMode {
        self.current_mode
    }

    /// Mode a revert would return to. `None` once consumed.
    pub fn previous_mode(&self) -> Option<SessionMode> {
        self.previous_mode
    }

    /// Last progress signal from the server. `None` before the first reply.
    pub fn game_progress(&self) -> Option<GameProgress> {
        self.game_progress
    }

    /// Whether the view is still loading its opening content.
    pub fn is_initializing(&self) -> bool {
        self.is_initializing
    }

    /// Fully revealed messages, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Message currently being revealed.
    pub fn active_typing(&self) -> Option<&Message> {
        self.active_typing.as_ref()
    }

    /// Messages waiting behind the active one, in arrival order.
    pub fn pending(&self) -> impl ExactSizeIterator<Item = &Message> {
        self.pending.iter()
    }
}

/// Pure transition: consume a state and an event, return the next state.
pub fn transition(mut state: SessionState, event: SessionEvent) -> SessionState {
    let _ = state.apply(event);
    state
}
