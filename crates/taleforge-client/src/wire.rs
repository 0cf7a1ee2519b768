//! Request and response bodies exchanged with the story server.

use serde::{Deserialize, Serialize};
use taleforge_core::{GameProgress, Message};

use crate::CharacterError;

/// Server-assigned session identifier.
pub type SessionId = u64;

/// Create-game request: a named character with six attribute scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterSheet {
    /// Character name.
    pub player_name: String,
    /// Strength score.
    pub strength: u8,
    /// Dexterity score.
    pub dexterity: u8,
    /// Constitution score.
    pub constitution: u8,
    /// Intelligence score.
    pub intelligence: u8,
    /// Wisdom score.
    pub wisdom: u8,
    /// Charisma score.
    pub charisma: u8,
}

impl CharacterSheet {
    /// Lowest score any attribute may have.
    pub const MIN_SCORE: u8 = 1;
    /// Highest score any attribute may have.
    pub const MAX_SCORE: u8 = 9;
    /// Points the six scores must add up to.
    pub const TOTAL_POINTS: u32 = 30;

    /// Check the sheet before it is sent.
    pub fn validate(&self) -> Result<(), CharacterError> {
        if self.player_name.trim().is_empty() {
            return Err(CharacterError::EmptyName);
        }

        for (attribute, value) in self.scores() {
            if !(Self::MIN_SCORE..=Self::MAX_SCORE).contains(&value) {
                return Err(CharacterError::ScoreOutOfRange {
                    attribute,
                    value,
                    min: Self::MIN_SCORE,
                    max: Self::MAX_SCORE,
                });
            }
        }

        let actual: u32 = self.scores().iter().map(|(_, value)| u32::from(*value)).sum();
        if actual != Self::TOTAL_POINTS {
            return Err(CharacterError::PointTotal { expected: Self::TOTAL_POINTS, actual });
        }
        Ok(())
    }

    fn scores(&self) -> [(&'static str, u8); 6] {
        [
            ("strength", self.strength),
            ("dexterity", self.dexterity),
            ("constitution", self.constitution),
            ("intelligence", self.intelligence),
            ("wisdom", self.wisdom),
            ("charisma", self.charisma),
        ]
    }
}

/// `POST /session/create-game` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateGameResponse {
    /// New session.
    pub session_id: SessionId,
    /// Opening narrative.
    pub narrative: String,
}

/// `GET /session/{id}/get-events` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventsResponse {
    /// Transcript so far, oldest first.
    #[serde(default)]
    pub events: Vec<Message>,
    /// What the server expects next.
    pub state: GameProgress,
}

/// `POST /session/{id}/new-floor` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewFloorResponse {
    /// Narrative opening the new floor.
    pub narrative: String,
    /// Actions offered for the first turn of the floor.
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    /// What the server expects next.
    #[serde(default = "in_progress")]
    pub state: GameProgress,
}

fn in_progress() -> GameProgress {
    GameProgress::InProgress
}

/// `POST /session/{id}/player-input` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerInputRequest {
    /// Trimmed action text.
    pub action: String,
    /// Actions offered with the last turn, echoed back for validation.
    pub suggested_actions: Vec<String>,
}

/// `POST /session/{id}/player-input` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerInputResponse {
    /// What the server expects next.
    pub state: GameProgress,
    /// Resulting events in delivery order (player echo, notices, narration).
    #[serde(default)]
    pub events: Vec<Message>,
    /// Actions offered for the next turn.
    #[serde(default)]
    pub suggested_actions: Option<Vec<String>>,
}

/// One entry of `GET /get-sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: SessionId,
    /// Story theme. `None` if the server has not picked one.
    #[serde(default)]
    pub theme: Option<String>,
    /// Character name.
    pub player_name: String,
    /// Floor the character is on.
    pub current_floor: u32,
    /// Progress of the session.
    pub game_state: GameProgress,
}

/// `GET /get-sessions` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionsResponse {
    /// The caller's sessions.
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

/// Session half of the `GET /session/{id}/player-info` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionInfo {
    /// Story theme. `None` if the server has not picked one.
    #[serde(default)]
    pub theme: Option<String>,
    /// Floor the character is on. `None` before the first floor.
    #[serde(default)]
    pub current_floor: Option<u32>,
}

/// The session's character, as the server tracks it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerInfo {
    /// Character name.
    #[serde(default)]
    pub player_name: Option<String>,
    /// Free-form character description.
    #[serde(default)]
    pub description: String,
    /// Whether the character is ready for the next floor.
    #[serde(default)]
    pub is_ready: bool,
    /// Hit points left.
    #[serde(default)]
    pub current_health: i32,
    /// Hit point ceiling.
    #[serde(default)]
    pub max_health: i32,
    /// Strength score.
    #[serde(default)]
    pub strength: Option<i32>,
    /// Dexterity score.
    #[serde(default)]
    pub dexterity: Option<i32>,
    /// Constitution score.
    #[serde(default)]
    pub constitution: Option<i32>,
    /// Intelligence score.
    #[serde(default)]
    pub intelligence: Option<i32>,
    /// Wisdom score.
    #[serde(default)]
    pub wisdom: Option<i32>,
    /// Charisma score.
    #[serde(default)]
    pub charisma: Option<i32>,
}

impl PlayerInfo {
    /// Known attribute scores as `(abbreviation, score)`, in sheet order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        [
            ("STR", self.strength),
            ("DEX", self.dexterity),
            ("CON", self.constitution),
            ("INT", self.intelligence),
            ("WIS", self.wisdom),
            ("CHA", self.charisma),
        ]
        .into_iter()
        .filter_map(|(name, score)| score.map(|score| (name, score)))
    }
}

/// `GET /session/{id}/player-info` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerInfoResponse {
    /// Theme and floor.
    #[serde(default)]
    pub session_info: SessionInfo,
    /// The character. `None` if the session has none yet.
    #[serde(default)]
    pub player_info: Option<PlayerInfo>,
}
