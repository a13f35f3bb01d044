//! Tactics board: the caller-facing facade over the drag state machine.
//!
//! Holds the working copy of the formation plus every live drag session,
//! keyed by `DragHandle`. Sessions are removed once they reach a terminal
//! state, so a handle that has been released or cancelled reports
//! `SessionNotFound` afterwards. A drag cancelled by a pointer move (left the
//! field) stays parked until the caller releases or cancels it, and the
//! release reports the cancellation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use super::conflict::{ConflictContext, ResolutionOutcome};
use super::mode::{Candidate, PositioningMode};
use super::session::{transition, CancelReason, DragEnv, DragEvent, DragState};
use crate::chemistry::{
    ChemistryEngine, ChemistryInputs, ChemistryReport, FamiliarityTable, MentoringGroups,
    RelationshipBook,
};
use crate::config::PositioningConfig;
use crate::error::{PositioningError, Result};
use crate::formation::{FieldPoint, Formation};
use crate::models::{PlayerId, Roster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DragHandle(pub u64);

impl fmt::Display for DragHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the UI needs after each pointer move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragUpdate {
    pub candidate: Candidate,
    pub is_valid: bool,
    pub has_pending_conflict: bool,
    /// Set when this move ended the drag
    pub cancelled: Option<CancelReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    Committed { formation: Formation, chemistry: ChemistryReport },
    Conflict(ConflictContext),
    Cancelled(CancelReason),
}

pub struct TacticsBoard {
    formation: Formation,
    roster: Roster,
    config: PositioningConfig,
    engine: ChemistryEngine,
    relationships: RelationshipBook,
    mentoring: MentoringGroups,
    familiarity: FamiliarityTable,
    sessions: BTreeMap<DragHandle, DragState>,
    next_handle: u64,
}

impl TacticsBoard {
    pub fn new(formation: Formation, roster: Roster, config: PositioningConfig) -> Result<Self> {
        config.validate()?;
        formation.validate_bindings(&roster)?;
        Ok(Self {
            engine: ChemistryEngine::new(&config),
            formation,
            roster,
            config,
            relationships: RelationshipBook::new(),
            mentoring: MentoringGroups::default(),
            familiarity: FamiliarityTable::new(),
            sessions: BTreeMap::new(),
            next_handle: 1,
        })
    }

    pub fn with_chemistry(
        mut self,
        relationships: RelationshipBook,
        mentoring: MentoringGroups,
        familiarity: FamiliarityTable,
    ) -> Self {
        self.relationships = relationships;
        self.mentoring = mentoring;
        self.familiarity = familiarity;
        self
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &PositioningConfig {
        &self.config
    }

    pub fn familiarity(&self) -> &FamiliarityTable {
        &self.familiarity
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn state(&self, handle: DragHandle) -> Option<&DragState> {
        self.sessions.get(&handle)
    }

    pub fn start_drag(&mut self, player_id: &PlayerId, at: FieldPoint, mode: PositioningMode) -> Result<DragHandle> {
        let event = DragEvent::PickUp { player_id: player_id.clone(), at, mode };
        self.pick_up(player_id, event)
    }

    /// Touch variant: same session, entered without pointer movement
    pub fn start_long_press(&mut self, player_id: &PlayerId, at: FieldPoint, mode: PositioningMode) -> Result<DragHandle> {
        let event = DragEvent::LongPress { player_id: player_id.clone(), at, mode };
        self.pick_up(player_id, event)
    }

    fn pick_up(&mut self, player_id: &PlayerId, event: DragEvent) -> Result<DragHandle> {
        if self.pointer_held_by_other(None) {
            warn!(player = %player_id, "pick-up rejected: another drag holds the pointer");
            return Err(PositioningError::SessionBusy);
        }
        if self.sessions.values().any(|s| s.session().is_some_and(|s| &s.player_id == player_id)) {
            warn!(player = %player_id, "pick-up rejected: player already picked up");
            return Err(PositioningError::SessionBusy);
        }

        let next = transition(&DragState::Idle, event, &self.env())?;
        let handle = DragHandle(self.next_handle);
        self.next_handle += 1;
        self.sessions.insert(handle, next);
        debug!(%handle, player = %player_id, "drag session opened");
        Ok(handle)
    }

    pub fn update_drag(&mut self, handle: DragHandle, at: FieldPoint) -> Result<DragUpdate> {
        let state = self.live(handle)?;
        if matches!(state, DragState::Picked(_)) && self.pointer_held_by_other(Some(handle)) {
            return Err(PositioningError::SessionBusy);
        }

        let next = transition(state, DragEvent::Move { at }, &self.env())?;
        let update = match &next {
            DragState::Picked(s) | DragState::Dragging(s) | DragState::Contested { session: s, .. } => DragUpdate {
                candidate: s.candidate().clone(),
                is_valid: s.is_valid(),
                has_pending_conflict: s.has_pending_conflict(),
                cancelled: None,
            },
            other => DragUpdate {
                candidate: Candidate::None,
                is_valid: false,
                has_pending_conflict: false,
                cancelled: match other {
                    DragState::Cancelled(reason) => Some(*reason),
                    _ => None,
                },
            },
        };
        if let DragState::Cancelled(reason) = next {
            // Parked until the pointer comes up
            debug!(%handle, ?reason, "drag session cancelled by move");
            self.sessions.insert(handle, next);
        } else {
            self.store(handle, next);
        }
        Ok(update)
    }

    pub fn release_drag(&mut self, handle: DragHandle) -> Result<ReleaseOutcome> {
        let state = self.live(handle)?;
        if let DragState::Cancelled(reason) = *state {
            self.sessions.remove(&handle);
            return Ok(ReleaseOutcome::Cancelled(reason));
        }
        let next = transition(state, DragEvent::Release, &self.env())?;
        self.settle(handle, next)
    }

    pub fn resolve_conflict(&mut self, handle: DragHandle, outcome: ResolutionOutcome) -> Result<ReleaseOutcome> {
        let state = self.live(handle)?;
        if !matches!(state, DragState::Contested { .. }) {
            return Err(PositioningError::InvalidTransition { state: state.name(), event: "choose" });
        }
        let next = transition(state, DragEvent::Choose { outcome }, &self.env())?;
        self.settle(handle, next)
    }

    /// External cancel signal; the formation is never touched
    pub fn cancel_drag(&mut self, handle: DragHandle) -> Result<()> {
        let state = self.live(handle)?;
        if matches!(state, DragState::Cancelled(_)) {
            self.sessions.remove(&handle);
            return Ok(());
        }
        let next = transition(state, DragEvent::Abort, &self.env())?;
        self.store(handle, next);
        Ok(())
    }

    pub fn pending_conflict(&self, handle: DragHandle) -> Option<&ConflictContext> {
        match self.sessions.get(&handle) {
            Some(DragState::Contested { conflict, .. }) => Some(conflict),
            _ => None,
        }
    }

    pub fn compute_chemistry(&self) -> ChemistryReport {
        self.engine.formation_chemistry(&self.formation, &self.inputs())
    }

    /// Write-back after a completed match: every bound pair gains `units` of
    /// shared time
    pub fn record_match(&mut self, units: f64) {
        self.familiarity.record_shared_time(&self.formation, units);
        info!(units, pairs = self.familiarity.len(), "familiarity recorded");
    }

    fn inputs(&self) -> ChemistryInputs<'_> {
        ChemistryInputs {
            relationships: &self.relationships,
            mentoring: &self.mentoring,
            familiarity: &self.familiarity,
        }
    }

    fn env(&self) -> DragEnv<'_> {
        DragEnv {
            formation: &self.formation,
            roster: &self.roster,
            config: &self.config,
            engine: &self.engine,
            inputs: self.inputs(),
        }
    }

    fn live(&self, handle: DragHandle) -> Result<&DragState> {
        self.sessions.get(&handle).ok_or(PositioningError::SessionNotFound(handle))
    }

    fn pointer_held_by_other(&self, me: Option<DragHandle>) -> bool {
        self.sessions.iter().any(|(h, s)| Some(*h) != me && s.holds_pointer())
    }

    fn store(&mut self, handle: DragHandle, state: DragState) {
        if state.is_terminal() {
            self.sessions.remove(&handle);
            if let DragState::Cancelled(reason) = state {
                debug!(%handle, ?reason, "drag session cancelled");
            }
        } else {
            self.sessions.insert(handle, state);
        }
    }

    fn settle(&mut self, handle: DragHandle, next: DragState) -> Result<ReleaseOutcome> {
        let outcome = match &next {
            DragState::Resolved(commit) => {
                self.formation = commit.formation.clone();
                let chemistry = self.compute_chemistry();
                info!(
                    %handle,
                    player = %commit.player_id,
                    outcome = ?commit.outcome,
                    revision = self.formation.revision,
                    average = chemistry.formation_average,
                    "drag committed"
                );
                ReleaseOutcome::Committed { formation: self.formation.clone(), chemistry }
            }
            DragState::Contested { conflict, .. } => {
                info!(%handle, occupant = %conflict.occupant, slot = %conflict.candidate_slot, "conflict raised");
                ReleaseOutcome::Conflict(conflict.clone())
            }
            DragState::Cancelled(reason) => ReleaseOutcome::Cancelled(*reason),
            other => {
                return Err(PositioningError::InvalidTransition { state: other.name(), event: "release" });
            }
        };
        self.store(handle, next);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::Relationship;
    use crate::formation::{FormationPreset, SlotId};
    use crate::models::{Player, Role};

    fn id(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    fn board() -> TacticsBoard {
        let players = vec![
            Player::new("gk", "Keeper", Role::GK),
            Player::new("lb", "Left Back", Role::LB),
            Player::new("lcb", "Left CB", Role::LCB),
            Player::new("rcb", "Right CB", Role::RCB),
            Player::new("sub", "Sub", Role::CB),
        ];
        let mut formation = FormationPreset::T442.build();
        formation.bind_player(SlotId(0), &players[0]).unwrap();
        formation.bind_player(SlotId(1), &players[1]).unwrap();
        formation.bind_player(SlotId(2), &players[2]).unwrap();
        formation.bind_player(SlotId(3), &players[3]).unwrap();
        TacticsBoard::new(formation, Roster::new(players).unwrap(), PositioningConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = PositioningConfig::default();
        config.snap_radius = 0.0;
        let result = TacticsBoard::new(FormationPreset::T442.build(), Roster::default(), config);
        assert!(matches!(result, Err(PositioningError::InvalidConfig(_))));
    }

    #[test]
    fn test_drag_to_free_slot_commits() {
        let mut board = board();
        let h = board.start_drag(&id("rcb"), FieldPoint::new(60.0, 20.0), PositioningMode::Snap).unwrap();
        let update = board.update_drag(h, FieldPoint::new(78.0, 21.0)).unwrap();
        assert!(update.is_valid);
        assert!(!update.has_pending_conflict);

        let ReleaseOutcome::Committed { formation, .. } = board.release_drag(h).unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(formation.occupant(SlotId(4)), Some(&id("rcb")));
        assert_eq!(board.formation().occupant(SlotId(3)), None);
        assert_eq!(board.active_sessions(), 0);
        assert_eq!(board.release_drag(h), Err(PositioningError::SessionNotFound(h)));
    }

    #[test]
    fn test_conflict_then_replace() {
        let mut board = board();
        let h = board.start_drag(&id("sub"), FieldPoint::new(50.0, 95.0), PositioningMode::Snap).unwrap();
        board.update_drag(h, FieldPoint::new(41.0, 19.0)).unwrap();
        let ReleaseOutcome::Conflict(conflict) = board.release_drag(h).unwrap() else {
            panic!("expected conflict");
        };
        assert_eq!(conflict.occupant, id("lcb"));
        assert_eq!(board.pending_conflict(h), Some(&conflict));
        // still readable while waiting
        assert_eq!(board.formation().occupant(SlotId(2)), Some(&id("lcb")));

        board.resolve_conflict(h, ResolutionOutcome::Replace).unwrap();
        assert_eq!(board.formation().occupant(SlotId(2)), Some(&id("sub")));
        assert!(board.formation().slot_of(&id("lcb")).is_none());
    }

    #[test]
    fn test_pick_up_rejected_while_dragging() {
        let mut board = board();
        let h = board.start_drag(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Snap).unwrap();
        board.update_drag(h, FieldPoint::new(45.0, 30.0)).unwrap();
        assert_eq!(
            board.start_drag(&id("rcb"), FieldPoint::new(60.0, 20.0), PositioningMode::Snap),
            Err(PositioningError::SessionBusy)
        );
        board.cancel_drag(h).unwrap();
        assert!(board.start_drag(&id("rcb"), FieldPoint::new(60.0, 20.0), PositioningMode::Snap).is_ok());
    }

    #[test]
    fn test_second_picked_session_cannot_start_dragging() {
        let mut board = board();
        let a = board.start_drag(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Snap).unwrap();
        let b = board.start_drag(&id("rcb"), FieldPoint::new(60.0, 20.0), PositioningMode::Snap).unwrap();
        board.update_drag(a, FieldPoint::new(42.0, 25.0)).unwrap();
        assert_eq!(board.update_drag(b, FieldPoint::new(62.0, 25.0)), Err(PositioningError::SessionBusy));
    }

    #[test]
    fn test_same_player_twice_is_busy() {
        let mut board = board();
        board.start_drag(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Snap).unwrap();
        assert_eq!(
            board.start_long_press(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Snap),
            Err(PositioningError::SessionBusy)
        );
    }

    #[test]
    fn test_cancel_leaves_formation_untouched() {
        let mut board = board();
        let before = board.formation().clone();
        let h = board.start_drag(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Snap).unwrap();
        board.update_drag(h, FieldPoint::new(59.0, 20.0)).unwrap();
        board.release_drag(h).unwrap();
        let outcome = board.resolve_conflict(h, ResolutionOutcome::Cancel).unwrap();
        assert_eq!(outcome, ReleaseOutcome::Cancelled(CancelReason::ConflictCancelled));
        assert_eq!(board.formation(), &before);
    }

    #[test]
    fn test_left_field_cancel_is_reported_on_move_and_release() {
        let mut board = board();
        let before = board.formation().clone();
        let h = board.start_drag(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Free).unwrap();
        let update = board.update_drag(h, FieldPoint::new(-20.0, 20.0)).unwrap();
        assert!(!update.is_valid);
        assert_eq!(update.cancelled, Some(CancelReason::LeftField));

        // a parked session does not hold the pointer
        let other = board.start_drag(&id("rcb"), FieldPoint::new(60.0, 20.0), PositioningMode::Snap).unwrap();
        board.cancel_drag(other).unwrap();

        assert_eq!(board.release_drag(h), Ok(ReleaseOutcome::Cancelled(CancelReason::LeftField)));
        assert_eq!(board.active_sessions(), 0);
        assert_eq!(board.release_drag(h), Err(PositioningError::SessionNotFound(h)));
        assert_eq!(board.formation(), &before);
    }

    #[test]
    fn test_cancel_drops_parked_session() {
        let mut board = board();
        let h = board.start_drag(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Snap).unwrap();
        board.update_drag(h, FieldPoint::new(40.0, 125.0)).unwrap();
        assert!(matches!(board.state(h), Some(DragState::Cancelled(CancelReason::LeftField))));
        board.cancel_drag(h).unwrap();
        assert_eq!(board.active_sessions(), 0);
    }

    #[test]
    fn test_resolve_without_conflict_is_rejected() {
        let mut board = board();
        let h = board.start_drag(&id("lcb"), FieldPoint::new(40.0, 20.0), PositioningMode::Snap).unwrap();
        assert!(matches!(
            board.resolve_conflict(h, ResolutionOutcome::Swap),
            Err(PositioningError::InvalidTransition { state: "picked", .. })
        ));
        assert_eq!(
            board.resolve_conflict(DragHandle(99), ResolutionOutcome::Swap),
            Err(PositioningError::SessionNotFound(DragHandle(99)))
        );
    }

    #[test]
    fn test_record_match_feeds_chemistry() {
        let mut relationships = RelationshipBook::new();
        relationships.set(&id("lcb"), &id("rcb"), Relationship::Friendship);
        let mut board = board().with_chemistry(relationships, MentoringGroups::default(), FamiliarityTable::new());

        let before = board.compute_chemistry();
        assert_eq!(before.score(&id("lcb"), &id("rcb")), Some(20));
        assert_eq!(before.score(&id("gk"), &id("lb")), Some(0));

        board.record_match(90.0);
        let after = board.compute_chemistry();
        assert!(after.score(&id("gk"), &id("lb")).unwrap_or(0) > 0);
        assert!(after.formation_average > before.formation_average);
        assert_eq!(board.familiarity().shared_units(&id("sub"), &id("gk")), 0.0);
    }
}
