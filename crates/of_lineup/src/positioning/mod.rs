//! Drag-and-drop positioning
//!
//! - `mode`: what a pointer coordinate means (snap vs free placement)
//! - `session`: pure drag state machine
//! - `conflict`: four-outcome resolver for contested releases
//! - `board`: handle-based facade the UI talks to

pub mod board;
pub mod conflict;
pub mod mode;
pub mod session;

pub use board::{DragHandle, DragUpdate, ReleaseOutcome, TacticsBoard};
pub use conflict::{
    ConflictContext, ConflictRequest, OutcomeOption, RankedAlternative, Resolution,
    ResolutionOutcome,
};
pub use mode::{Candidate, PendingConflict, PositioningMode, Probe};
pub use session::{
    transition, CancelReason, Commit, DragEnv, DragEvent, DragSession, DragState, PickGesture,
};
