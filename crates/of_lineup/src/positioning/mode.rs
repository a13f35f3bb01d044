//! Positioning mode policy
//!
//! Decides what a pointer coordinate means while a player token is dragged.
//!
//! - **Snap**: the nearest slot within `snap_radius` is the candidate. Nothing
//!   in range means no candidate, and releasing there cancels.
//! - **Free**: the clamped pointer itself is the candidate. Landing within
//!   `collision_radius` of another bound player flags a pending conflict
//!   with the nearest one the mover could trade places with. The drop is
//!   invalid only when every such player is role-incompatible.

use serde::{Deserialize, Serialize};

use crate::config::PositioningConfig;
use crate::formation::{FieldPoint, Formation, Slot, SlotId};
use crate::models::{Player, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositioningMode {
    #[default]
    Snap,
    Free,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Candidate {
    None,
    Slot { slot_id: SlotId, position: FieldPoint },
    Point { position: FieldPoint },
}

/// Release target is held by someone else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConflict {
    pub occupant: PlayerId,
    pub slot_id: SlotId,
}

/// Result of evaluating one pointer position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub candidate: Candidate,
    pub is_valid: bool,
    pub pending_conflict: Option<PendingConflict>,
    /// Slot that receives the player on an uncontested release
    pub target_slot: Option<SlotId>,
    /// Free placement moves the target slot to the drop point
    pub relocate_to: Option<FieldPoint>,
}

impl Probe {
    pub fn invalid(candidate: Candidate) -> Self {
        Self {
            candidate,
            is_valid: false,
            pending_conflict: None,
            target_slot: None,
            relocate_to: None,
        }
    }

    pub fn has_pending_conflict(&self) -> bool {
        self.pending_conflict.is_some()
    }

    /// Candidate at pick-up: wherever the player already stands
    pub fn at_source(formation: &Formation, mover: &Player) -> Self {
        match formation.slot_of(&mover.id) {
            Some(slot) => Self {
                candidate: Candidate::Slot { slot_id: slot.id, position: slot.position },
                is_valid: true,
                pending_conflict: None,
                target_slot: Some(slot.id),
                relocate_to: None,
            },
            None => Self::invalid(Candidate::None),
        }
    }
}

impl PositioningMode {
    /// Evaluate `pointer` for `mover`. O(number of slots).
    pub fn probe(
        &self,
        formation: &Formation,
        mover: &Player,
        pointer: FieldPoint,
        config: &PositioningConfig,
    ) -> Probe {
        match self {
            PositioningMode::Snap => snap_probe(formation, mover, pointer, config),
            PositioningMode::Free => free_probe(formation, mover, pointer, config),
        }
    }
}

fn nearest_within<'a>(
    slots: impl Iterator<Item = &'a Slot>,
    point: FieldPoint,
    radius: f32,
) -> Option<&'a Slot> {
    slots
        .map(|s| (s, s.position.distance(&point)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|(a, da), (b, db)| da.total_cmp(db).then(a.id.cmp(&b.id)))
        .map(|(s, _)| s)
}

fn snap_probe(
    formation: &Formation,
    mover: &Player,
    pointer: FieldPoint,
    config: &PositioningConfig,
) -> Probe {
    let Some(slot) = nearest_within(formation.slots.iter(), pointer, config.snap_radius) else {
        return Probe::invalid(Candidate::None);
    };
    let candidate = Candidate::Slot { slot_id: slot.id, position: slot.position };

    if !mover.role.fit_for(slot.role).is_compatible() {
        return Probe::invalid(candidate);
    }

    let pending_conflict = match &slot.player {
        Some(occupant) if occupant != &mover.id => {
            Some(PendingConflict { occupant: occupant.clone(), slot_id: slot.id })
        }
        _ => None,
    };

    Probe {
        candidate,
        is_valid: true,
        target_slot: Some(slot.id),
        pending_conflict,
        relocate_to: None,
    }
}

fn free_probe(
    formation: &Formation,
    mover: &Player,
    pointer: FieldPoint,
    config: &PositioningConfig,
) -> Probe {
    let point = pointer.clamped();
    let candidate = Candidate::Point { position: point };

    let colliding: Vec<(&Slot, &PlayerId, f32)> = formation
        .slots
        .iter()
        .filter_map(|s| match &s.player {
            Some(occupant) if occupant != &mover.id => Some((s, occupant)),
            _ => None,
        })
        .map(|(s, occupant)| (s, occupant, s.position.distance(&point)))
        .filter(|(_, _, d)| *d <= config.collision_radius)
        .collect();

    let nearest_compatible = colliding
        .iter()
        .filter(|(s, _, _)| mover.role.fit_for(s.role).is_compatible())
        .min_by(|(a, _, da), (b, _, db)| da.total_cmp(db).then(a.id.cmp(&b.id)));

    if let Some((slot, occupant, _)) = nearest_compatible {
        return Probe {
            candidate,
            is_valid: true,
            pending_conflict: Some(PendingConflict { occupant: (*occupant).clone(), slot_id: slot.id }),
            target_slot: Some(slot.id),
            relocate_to: None,
        };
    }
    // Only occupants the mover can never trade places with (keeper vs outfield)
    if !colliding.is_empty() {
        return Probe::invalid(candidate);
    }

    // The slot travels with the player; benched players adopt the nearest free slot
    let target = match formation.slot_of(&mover.id) {
        Some(own) => Some(own.id),
        None => formation.find_nearest_free_slot(mover.role, point, &[]).map(|s| s.id),
    };

    match target {
        Some(slot_id) => Probe {
            candidate,
            is_valid: true,
            pending_conflict: None,
            target_slot: Some(slot_id),
            relocate_to: Some(point),
        },
        None => Probe::invalid(candidate),
    }
}
