//! Role-tagged narrative messages.
//!
//! A [`Message`] is created once (from a server reply or by the client for
//! procedural notices) and never mutated afterwards. The only way to attach
//! suggested actions is the consuming [`Message::with_suggested_actions`]
//! builder, used before the message enters the session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Action submitted by the player.
    Player,
    /// Prose produced by the story engine.
    Narrator,
    /// Procedural notice generated by the client or server.
    System,
}

impl Role {
    /// Whether messages of this role are revealed character by character.
    pub fn is_animated(self) -> bool {
        !matches!(self, Self::Player)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Player => "Player",
            Self::Narrator => "Narrator",
            Self::System => "System",
        };
        f.write_str(label)
    }
}

/// A single entry in the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggested_actions: Option<Vec<String>>,
}

impl Message {
    /// Create a message with no suggested actions.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), suggested_actions: None }
    }

    /// Narrator message.
    pub fn narrator(content: impl Into<String>) -> Self {
        Self::new(Role::Narrator, content)
    }

    /// Player message.
    pub fn player(content: impl Into<String>) -> Self {
        Self::new(Role::Player, content)
    }

    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Attach the actions the server offers after this message.
    #[must_use]
    pub fn with_suggested_actions(mut self, actions: Vec<String>) -> Self {
        self.set_suggested_actions(actions);
        self
    }

    /// Replace the actions offered after this message.
    pub fn set_suggested_actions(&mut self, actions: Vec<String>) {
        self.suggested_actions = Some(actions);
    }

    /// Author role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Full message text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Actions offered with this message. `None` if the server sent none.
    pub fn suggested_actions(&self) -> Option<&[String]> {
        self.suggested_actions.as_deref()
    }
}
