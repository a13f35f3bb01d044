use thiserror::Error;

use crate::formation::SlotId;
use crate::models::{PlayerId, Role};
use crate::positioning::DragHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositioningError {
    /// Direct bind onto a slot held by someone else. Normal drag flow routes
    /// these through the conflict resolver instead.
    #[error("Slot {slot} is already occupied by {occupant}")]
    SlotOccupied { slot: SlotId, occupant: PlayerId },

    #[error("Player {player} ({player_role}) cannot play in a {slot_role} slot")]
    InvalidRole { player: PlayerId, player_role: Role, slot_role: Role },

    #[error("No compatible free slot is available as an alternative")]
    NoAlternativeSlot,

    #[error("Drag session {0} not found or already finished")]
    SessionNotFound(DragHandle),

    #[error("Slot {0} not found in formation")]
    SlotNotFound(SlotId),

    #[error("Player {0} not found in roster")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} is bound to more than one slot")]
    DuplicateBinding(PlayerId),

    #[error("Formation changed while the conflict was pending")]
    StaleConflict,

    #[error("Another drag is in progress")]
    SessionBusy,

    #[error("Event {event} is not accepted in state {state}")]
    InvalidTransition { state: &'static str, event: &'static str },

    #[error("Invalid player data: {0}")]
    InvalidPlayer(String),

    #[error("Invalid positioning config: {0}")]
    InvalidConfig(String),
}

impl PositioningError {
    /// Every error leaves the engine usable; the caller re-renders or re-offers
    /// options. Bad input data is the exception: retrying won't help.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PositioningError::InvalidPlayer(_) => false,
            PositioningError::InvalidConfig(_) => false,
            PositioningError::DuplicateBinding(_) => false,
            _ => true,
        }
    }

    /// Stable code for the JSON layer.
    pub fn code(&self) -> &'static str {
        match self {
            PositioningError::SlotOccupied { .. } => "SLOT_OCCUPIED",
            PositioningError::InvalidRole { .. } => "INVALID_ROLE",
            PositioningError::NoAlternativeSlot => "NO_ALTERNATIVE_SLOT",
            PositioningError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            PositioningError::SlotNotFound(_) => "SLOT_NOT_FOUND",
            PositioningError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            PositioningError::DuplicateBinding(_) => "DUPLICATE_BINDING",
            PositioningError::StaleConflict => "STALE_CONFLICT",
            PositioningError::SessionBusy => "SESSION_BUSY",
            PositioningError::InvalidTransition { .. } => "INVALID_TRANSITION",
            PositioningError::InvalidPlayer(_) => "INVALID_PLAYER",
            PositioningError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, PositioningError>;
