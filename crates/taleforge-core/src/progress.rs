//! Server-authoritative game progress.

use serde::{Deserialize, Deserializer, Serialize};

/// What kind of turn the server expects next.
///
/// Encoded on the wire with the server's display strings. The server has
/// states this client never plays (character creation, for one); any string
/// other than the two playable ones decodes as [`GameProgress::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameProgress {
    /// Mid-floor: the player is expected to submit an action.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Floor finished: the player is expected to continue to the next floor.
    #[serde(rename = "Waiting for Next Floor")]
    WaitingForNextFloor,
    /// The story is over.
    #[serde(rename = "Completed")]
    Completed,
}

impl GameProgress {
    /// Server display string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::WaitingForNextFloor => "Waiting for Next Floor",
            Self::Completed => "Completed",
        }
    }

    /// Parse a server display string. Unrecognised strings are `Completed`.
    pub fn from_wire(wire: &str) -> Self {
        match wire {
            "In Progress" => Self::InProgress,
            "Waiting for Next Floor" => Self::WaitingForNextFloor,
            "Completed" => Self::Completed,
            other => {
                tracing::warn!(state = other, "unrecognised game progress, treating as completed");
                Self::Completed
            },
        }
    }
}

impl<'de> Deserialize<'de> for GameProgress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&wire))
    }
}
