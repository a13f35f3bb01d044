//! Drag session state machine
//!
//! ```text
//! Idle ──PickUp/LongPress──▶ Picked ──Move──▶ Dragging ──Release──▶ Resolved
//!                              │                 │  │
//!                              │                 │  └──Release (occupied)──▶ Contested ──Choose──▶ Resolved
//!                              └──Abort──────────┴──Abort / left field / no target──────▶ Cancelled
//! ```
//!
//! `transition` is pure: it reads the formation through `DragEnv` and returns
//! the next state. Commits carry a new formation; the caller decides when to
//! adopt it. A cancelled session never produced one, so there is nothing to
//! roll back.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::conflict::{ConflictContext, ConflictRequest, Resolution, ResolutionOutcome};
use super::mode::{Candidate, PositioningMode, Probe};
use crate::chemistry::{ChemistryEngine, ChemistryInputs};
use crate::config::PositioningConfig;
use crate::error::{PositioningError, Result};
use crate::formation::{FieldPoint, Formation, SlotId};
use crate::models::{Player, PlayerId, Roster};

/// Everything a transition may read
#[derive(Debug, Clone, Copy)]
pub struct DragEnv<'a> {
    pub formation: &'a Formation,
    pub roster: &'a Roster,
    pub config: &'a PositioningConfig,
    pub engine: &'a ChemistryEngine,
    pub inputs: ChemistryInputs<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickGesture {
    Pointer,
    /// Touch screens: hold without moving
    LongPress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    pub player_id: PlayerId,
    pub source_slot: Option<SlotId>,
    pub pointer: FieldPoint,
    pub mode: PositioningMode,
    pub gesture: PickGesture,
    pub probe: Probe,
}

impl DragSession {
    pub fn candidate(&self) -> &Candidate {
        &self.probe.candidate
    }

    pub fn is_valid(&self) -> bool {
        self.probe.is_valid
    }

    pub fn has_pending_conflict(&self) -> bool {
        self.probe.has_pending_conflict()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    PickUp { player_id: PlayerId, at: FieldPoint, mode: PositioningMode },
    LongPress { player_id: PlayerId, at: FieldPoint, mode: PositioningMode },
    Move { at: FieldPoint },
    Release,
    Abort,
    Choose { outcome: ResolutionOutcome },
}

impl DragEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DragEvent::PickUp { .. } => "pick_up",
            DragEvent::LongPress { .. } => "long_press",
            DragEvent::Move { .. } => "move",
            DragEvent::Release => "release",
            DragEvent::Abort => "abort",
            DragEvent::Choose { .. } => "choose",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    NoValidTarget,
    LeftField,
    Aborted,
    ConflictCancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub player_id: PlayerId,
    pub formation: Formation,
    /// Set when the commit came through conflict resolution
    pub outcome: Option<ResolutionOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Picked(DragSession),
    Dragging(DragSession),
    Contested { session: DragSession, conflict: ConflictContext },
    Resolved(Commit),
    Cancelled(CancelReason),
}

impl DragState {
    pub fn name(&self) -> &'static str {
        match self {
            DragState::Idle => "idle",
            DragState::Picked(_) => "picked",
            DragState::Dragging(_) => "dragging",
            DragState::Contested { .. } => "contested",
            DragState::Resolved(_) => "resolved",
            DragState::Cancelled(_) => "cancelled",
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Picked(s) | DragState::Dragging(s) => Some(s),
            DragState::Contested { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DragState::Resolved(_) | DragState::Cancelled(_))
    }

    /// Dragging or waiting on a conflict choice; at most one session may be here
    pub fn holds_pointer(&self) -> bool {
        matches!(self, DragState::Dragging(_) | DragState::Contested { .. })
    }
}

/// `(state, event) -> state'`
pub fn transition(state: &DragState, event: DragEvent, env: &DragEnv<'_>) -> Result<DragState> {
    match (state, event) {
        (DragState::Idle, DragEvent::PickUp { player_id, at, mode }) => {
            pick_up(player_id, at, mode, PickGesture::Pointer, env)
        }
        (DragState::Idle, DragEvent::LongPress { player_id, at, mode }) => {
            pick_up(player_id, at, mode, PickGesture::LongPress, env)
        }

        (DragState::Picked(session) | DragState::Dragging(session), DragEvent::Move { at }) => {
            drag_to(session, at, env)
        }
        (DragState::Picked(session), DragEvent::Release) => Ok(release_in_place(session, env)),
        (DragState::Dragging(session), DragEvent::Release) => release(session, env),

        (DragState::Picked(session) | DragState::Dragging(session), DragEvent::Abort)
        | (DragState::Contested { session, .. }, DragEvent::Abort) => {
            debug!(player = %session.player_id, "drag aborted");
            Ok(DragState::Cancelled(CancelReason::Aborted))
        }

        // Pointer noise while the choice is pending changes nothing
        (DragState::Contested { .. }, DragEvent::Move { .. } | DragEvent::Release) => {
            Ok(state.clone())
        }
        (DragState::Contested { session, conflict }, DragEvent::Choose { outcome }) => {
            match conflict.apply(outcome, env.formation, env.roster)? {
                Resolution::Committed(formation) => Ok(DragState::Resolved(Commit {
                    player_id: session.player_id.clone(),
                    formation,
                    outcome: Some(outcome),
                })),
                Resolution::Cancelled => Ok(DragState::Cancelled(CancelReason::ConflictCancelled)),
            }
        }

        (state, event) => Err(PositioningError::InvalidTransition {
            state: state.name(),
            event: event.name(),
        }),
    }
}

fn pick_up(
    player_id: PlayerId,
    at: FieldPoint,
    mode: PositioningMode,
    gesture: PickGesture,
    env: &DragEnv<'_>,
) -> Result<DragState> {
    let mover = env.roster.require(&player_id)?;
    let source = env.formation.slot_of(&player_id);
    let pointer = source.map(|s| s.position).unwrap_or_else(|| at.clamped());

    debug!(player = %player_id, ?mode, ?gesture, benched = source.is_none(), "player picked up");
    Ok(DragState::Picked(DragSession {
        source_slot: source.map(|s| s.id),
        player_id,
        pointer,
        mode,
        gesture,
        probe: Probe::at_source(env.formation, mover),
    }))
}

fn drag_to(session: &DragSession, at: FieldPoint, env: &DragEnv<'_>) -> Result<DragState> {
    if at.overshoot() > env.config.leave_margin {
        debug!(player = %session.player_id, x = at.x, y = at.y, "pointer left the field");
        return Ok(DragState::Cancelled(CancelReason::LeftField));
    }
    let mover = env.roster.require(&session.player_id)?;
    let probe = session.mode.probe(env.formation, mover, at, env.config);
    trace!(player = %session.player_id, valid = probe.is_valid, conflict = probe.has_pending_conflict(), "candidate updated");

    Ok(DragState::Dragging(DragSession {
        source_slot: env.formation.slot_of(&session.player_id).map(|s| s.id),
        pointer: at,
        probe,
        ..session.clone()
    }))
}

/// Released without moving: a bound player stays put, a benched one has
/// nowhere to go
fn release_in_place(session: &DragSession, env: &DragEnv<'_>) -> DragState {
    if env.formation.slot_of(&session.player_id).is_some() {
        DragState::Resolved(Commit {
            player_id: session.player_id.clone(),
            formation: env.formation.clone(),
            outcome: None,
        })
    } else {
        DragState::Cancelled(CancelReason::NoValidTarget)
    }
}

fn release(session: &DragSession, env: &DragEnv<'_>) -> Result<DragState> {
    let mover = env.roster.require(&session.player_id)?;
    // Re-evaluate against the formation as it is now; only the last pointer
    // position before release matters
    let probe = session.mode.probe(env.formation, mover, session.pointer, env.config);

    if !probe.is_valid {
        debug!(player = %session.player_id, "released without a valid target");
        return Ok(DragState::Cancelled(CancelReason::NoValidTarget));
    }

    if let Some(pending) = &probe.pending_conflict {
        let conflict = ConflictContext::build(
            ConflictRequest {
                mover,
                occupant: pending.occupant.clone(),
                candidate_slot: pending.slot_id,
                drop_point: session.pointer.clamped(),
                mode: session.mode,
            },
            env.formation,
            env.engine,
            &env.inputs,
            env.config,
        )?;
        return Ok(DragState::Contested {
            session: DragSession { probe, ..session.clone() },
            conflict,
        });
    }

    let Some(target) = probe.target_slot else {
        return Ok(DragState::Cancelled(CancelReason::NoValidTarget));
    };
    Ok(DragState::Resolved(Commit {
        player_id: mover.id.clone(),
        formation: place(env.formation, mover, target, probe.relocate_to)?,
        outcome: None,
    }))
}

fn place(
    formation: &Formation,
    mover: &Player,
    target: SlotId,
    relocate_to: Option<FieldPoint>,
) -> Result<Formation> {
    let mut next = formation.clone();
    next.bind_player(target, mover)?;
    if let Some(point) = relocate_to {
        next.move_slot(target, point)?;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::{FamiliarityTable, MentoringGroups, RelationshipBook};
    use crate::formation::FormationPreset;
    use crate::models::Role;

    struct World {
        formation: Formation,
        roster: Roster,
        config: PositioningConfig,
        engine: ChemistryEngine,
        relationships: RelationshipBook,
        mentoring: MentoringGroups,
        familiarity: FamiliarityTable,
    }

    impl World {
        fn new() -> Self {
            let players = vec![
                Player::new("gk", "Keeper", Role::GK),
                Player::new("lcb", "Left CB", Role::LCB),
                Player::new("rcb", "Right CB", Role::RCB),
                Player::new("sub", "Sub", Role::CM),
            ];
            let mut formation = FormationPreset::T442.build();
            formation.bind_player(SlotId(0), &players[0]).unwrap();
            formation.bind_player(SlotId(2), &players[1]).unwrap();
            formation.bind_player(SlotId(3), &players[2]).unwrap();
            Self {
                formation,
                roster: Roster::new(players).unwrap(),
                config: PositioningConfig::default(),
                engine: ChemistryEngine::default(),
                relationships: RelationshipBook::new(),
                mentoring: MentoringGroups::default(),
                familiarity: FamiliarityTable::new(),
            }
        }

        fn env(&self) -> DragEnv<'_> {
            DragEnv {
                formation: &self.formation,
                roster: &self.roster,
                config: &self.config,
                engine: &self.engine,
                inputs: ChemistryInputs {
                    relationships: &self.relationships,
                    mentoring: &self.mentoring,
                    familiarity: &self.familiarity,
                },
            }
        }

        fn run(&self, events: Vec<DragEvent>) -> Result<DragState> {
            let env = self.env();
            events.into_iter().try_fold(DragState::Idle, |state, event| transition(&state, event, &env))
        }
    }

    fn pick(id: &str, x: f32, y: f32, mode: PositioningMode) -> DragEvent {
        DragEvent::PickUp { player_id: PlayerId::from(id), at: FieldPoint::new(x, y), mode }
    }

    fn mv(x: f32, y: f32) -> DragEvent {
        DragEvent::Move { at: FieldPoint::new(x, y) }
    }

    #[test]
    fn test_pick_up_sets_candidate_to_source() {
        let world = World::new();
        let state = world.run(vec![pick("lcb", 40.0, 20.0, PositioningMode::Snap)]).unwrap();
        let DragState::Picked(session) = state else { panic!("expected picked") };
        assert_eq!(session.source_slot, Some(SlotId(2)));
        assert_eq!(session.candidate(), &Candidate::Slot { slot_id: SlotId(2), position: FieldPoint::new(40.0, 20.0) });
    }

    #[test]
    fn test_pick_up_unknown_player() {
        let world = World::new();
        let err = world.run(vec![pick("ghost", 10.0, 10.0, PositioningMode::Snap)]).unwrap_err();
        assert_eq!(err, PositioningError::PlayerNotFound(PlayerId::from("ghost")));
    }

    #[test]
    fn test_snap_drag_to_empty_slot_commits() {
        let world = World::new();
        let state = world
            .run(vec![pick("lcb", 40.0, 20.0, PositioningMode::Snap), mv(30.0, 20.0), mv(21.0, 21.0), DragEvent::Release])
            .unwrap();
        let DragState::Resolved(commit) = state else { panic!("expected resolved") };
        assert_eq!(commit.formation.occupant(SlotId(1)), Some(&PlayerId::from("lcb")));
        assert_eq!(commit.formation.occupant(SlotId(2)), None);
        assert_eq!(commit.outcome, None);
    }

    #[test]
    fn test_release_off_target_cancels() {
        let world = World::new();
        let state = world
            .run(vec![pick("lcb", 40.0, 20.0, PositioningMode::Snap), mv(50.0, 35.0), DragEvent::Release])
            .unwrap();
        assert_eq!(state, DragState::Cancelled(CancelReason::NoValidTarget));
    }

    #[test]
    fn test_leaving_the_field_cancels() {
        let world = World::new();
        let state = world.run(vec![pick("lcb", 40.0, 20.0, PositioningMode::Free), mv(-20.0, 20.0)]).unwrap();
        assert_eq!(state, DragState::Cancelled(CancelReason::LeftField));

        // slightly outside is clamped, not cancelled
        let state = world.run(vec![pick("lcb", 40.0, 20.0, PositioningMode::Free), mv(-3.0, 30.0)]).unwrap();
        assert!(matches!(state, DragState::Dragging(_)));
    }

    #[test]
    fn test_release_on_occupied_slot_is_contested() {
        let world = World::new();
        let state = world
            .run(vec![pick("lcb", 40.0, 20.0, PositioningMode::Snap), mv(59.0, 20.0), DragEvent::Release])
            .unwrap();
        let DragState::Contested { conflict, .. } = &state else { panic!("expected contested") };
        assert_eq!(conflict.occupant, PlayerId::from("rcb"));
        assert_eq!(conflict.candidate_slot, SlotId(3));

        // pointer noise is ignored, pick-ups are rejected
        let env = world.env();
        assert_eq!(transition(&state, mv(10.0, 10.0), &env).unwrap(), state);
        assert!(matches!(
            transition(&state, pick("gk", 50.0, 5.0, PositioningMode::Snap), &env),
            Err(PositioningError::InvalidTransition { state: "contested", event: "pick_up" })
        ));

        let resolved = transition(&state, DragEvent::Choose { outcome: ResolutionOutcome::Swap }, &env).unwrap();
        let DragState::Resolved(commit) = resolved else { panic!("expected resolved") };
        assert_eq!(commit.formation.occupant(SlotId(2)), Some(&PlayerId::from("rcb")));
        assert_eq!(commit.formation.occupant(SlotId(3)), Some(&PlayerId::from("lcb")));
        assert_eq!(commit.outcome, Some(ResolutionOutcome::Swap));
    }

    #[test]
    fn test_choose_cancel_ends_cancelled() {
        let world = World::new();
        let state = world
            .run(vec![
                pick("lcb", 40.0, 20.0, PositioningMode::Snap),
                mv(59.0, 20.0),
                DragEvent::Release,
                DragEvent::Choose { outcome: ResolutionOutcome::Cancel },
            ])
            .unwrap();
        assert_eq!(state, DragState::Cancelled(CancelReason::ConflictCancelled));
    }

    #[test]
    fn test_free_mode_relocates_slot() {
        let world = World::new();
        let state = world
            .run(vec![pick("lcb", 40.0, 20.0, PositioningMode::Free), mv(35.0, 30.0), DragEvent::Release])
            .unwrap();
        let DragState::Resolved(commit) = state else { panic!("expected resolved") };
        let slot = commit.formation.slot(SlotId(2)).unwrap();
        assert_eq!(slot.position, FieldPoint::new(35.0, 30.0));
        assert_eq!(slot.player, Some(PlayerId::from("lcb")));
    }

    #[test]
    fn test_long_press_then_release_keeps_player() {
        let world = World::new();
        let state = world
            .run(vec![
                DragEvent::LongPress {
                    player_id: PlayerId::from("rcb"),
                    at: FieldPoint::new(60.0, 20.0),
                    mode: PositioningMode::Snap,
                },
                DragEvent::Release,
            ])
            .unwrap();
        let DragState::Resolved(commit) = state else { panic!("expected resolved") };
        assert_eq!(commit.formation.bindings(), world.formation.bindings());
    }

    #[test]
    fn test_benched_release_in_place_cancels() {
        let world = World::new();
        let state = world.run(vec![pick("sub", 50.0, 50.0, PositioningMode::Snap), DragEvent::Release]).unwrap();
        assert_eq!(state, DragState::Cancelled(CancelReason::NoValidTarget));
    }

    #[test]
    fn test_abort_from_any_active_state() {
        let world = World::new();
        for events in [
            vec![pick("lcb", 40.0, 20.0, PositioningMode::Snap)],
            vec![pick("lcb", 40.0, 20.0, PositioningMode::Snap), mv(45.0, 25.0)],
            vec![pick("lcb", 40.0, 20.0, PositioningMode::Snap), mv(59.0, 20.0), DragEvent::Release],
        ] {
            let mut events = events;
            events.push(DragEvent::Abort);
            assert_eq!(world.run(events).unwrap(), DragState::Cancelled(CancelReason::Aborted));
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        let world = World::new();
        let env = world.env();
        let done = DragState::Cancelled(CancelReason::Aborted);
        assert!(transition(&done, DragEvent::Release, &env).is_err());
        assert!(transition(&DragState::Idle, DragEvent::Release, &env).is_err());
    }
}
