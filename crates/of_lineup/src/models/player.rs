use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use validator::Validate;

use super::role::Role;
use crate::error::{PositioningError, Result};

/// Opaque player identity supplied by the roster owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Core attribute set, each 1-99
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PlayerAttributes {
    #[validate(range(min = 1, max = 99))]
    pub speed: u8,
    #[validate(range(min = 1, max = 99))]
    pub passing: u8,
    #[validate(range(min = 1, max = 99))]
    pub tackling: u8,
    #[validate(range(min = 1, max = 99))]
    pub shooting: u8,
    #[validate(range(min = 1, max = 99))]
    pub dribbling: u8,
    #[validate(range(min = 1, max = 99))]
    pub positioning: u8,
    #[validate(range(min = 1, max = 99))]
    pub stamina: u8,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self {
            speed: 50,
            passing: 50,
            tackling: 50,
            shooting: 50,
            dribbling: 50,
            positioning: 50,
            stamina: 50,
        }
    }
}

impl PlayerAttributes {
    pub fn average(&self) -> f32 {
        let sum = self.speed as u32
            + self.passing as u32
            + self.tackling as u32
            + self.shooting as u32
            + self.dribbling as u32
            + self.positioning as u32
            + self.stamina as u32;
        sum as f32 / 7.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Morale {
    Abysmal,
    Poor,
    Okay,
    Good,
    Superb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    Terrible,
    Poor,
    Average,
    Good,
    Excellent,
}

/// Attributes as they were at some earlier point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    pub recorded_at: DateTime<Utc>,
    pub attributes: PlayerAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistory {
    #[serde(default)]
    pub snapshots: Vec<AttributeSnapshot>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub morale: Option<Morale>,
    #[serde(default)]
    pub form: Option<Form>,
}

/// Roster entry as handed to the positioning engine.
///
/// The engine never mutates players; roster updates happen outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub attributes: PlayerAttributes,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub history: PlayerHistory,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: &str, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            role,
            attributes: PlayerAttributes::default(),
            team_id: String::new(),
            history: PlayerHistory::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: PlayerAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_team(mut self, team_id: &str) -> Self {
        self.team_id = team_id.to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(PositioningError::InvalidPlayer("player id is empty".to_string()));
        }
        self.attributes
            .validate()
            .map_err(|e| PositioningError::InvalidPlayer(format!("{}: {}", self.id, e)))
    }
}

/// The squad available to the positioning engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Result<Self> {
        let mut seen = HashSet::new();
        for player in &players {
            player.validate()?;
            if !seen.insert(player.id.clone()) {
                return Err(PositioningError::InvalidPlayer(format!(
                    "duplicate player id {}",
                    player.id
                )));
            }
        }
        Ok(Self { players })
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn require(&self, id: &PlayerId) -> Result<&Player> {
        self.get(id).ok_or_else(|| PositioningError::PlayerNotFound(id.clone()))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
