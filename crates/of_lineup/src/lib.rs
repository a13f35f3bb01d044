//! # of_lineup - Tactical Formation Positioning Engine
//!
//! Drag-and-drop lineup editing for a football management game, with
//! pairwise chemistry scoring and a JSON API for UI hosts.
//!
//! ## Features
//! - Snap and free placement modes over a 0-100 field grid
//! - Explicit drag state machine; cancelled drags never touch the formation
//! - Four-outcome conflict resolution (swap, replace, find alternative, cancel)
//! - Deterministic, symmetric 0-100 chemistry scores

// Conflict states carry full formations
#![allow(clippy::large_enum_variant)]
// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]

pub mod api;
pub mod chemistry;
pub mod config;
pub mod error;
pub mod formation;
pub mod models;
pub mod positioning;

pub use api::{apply_interaction_json, compute_chemistry_json, formation_preset_json};
pub use chemistry::{compute_chemistry, ChemistryEngine, ChemistryReport};
pub use config::PositioningConfig;
pub use error::{PositioningError, Result};
pub use formation::{FieldPoint, Formation, FormationPreset, Slot, SlotId};
pub use models::{Player, PlayerId, Role, Roster};
pub use positioning::{
    DragHandle, DragUpdate, PositioningMode, ReleaseOutcome, ResolutionOutcome, TacticsBoard,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
