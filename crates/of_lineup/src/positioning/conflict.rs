//! Conflict resolution
//!
//! A release onto another player's slot (or, in free mode, within collision
//! radius of another player) never binds directly. It produces a
//! `ConflictContext` and waits for the caller to pick one of four outcomes:
//!
//! | Outcome | Effect |
//! |---------|--------|
//! | `Swap` | Mover and occupant exchange slots (recommended) |
//! | `Replace` | Mover takes the slot, occupant goes to the bench |
//! | `FindAlternative` | Occupant stays, mover takes the best-ranked free slot |
//! | `Cancel` | Nothing changes |

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

use super::mode::PositioningMode;
use crate::chemistry::{ChemistryEngine, ChemistryInputs};
use crate::config::PositioningConfig;
use crate::error::{PositioningError, Result};
use crate::formation::{FieldPoint, Formation, SlotId};
use crate::models::{Player, PlayerId, Role, RoleFit, Roster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Swap,
    Replace,
    FindAlternative,
    Cancel,
}

impl ResolutionOutcome {
    pub fn all() -> [ResolutionOutcome; 4] {
        [Self::Swap, Self::Replace, Self::FindAlternative, Self::Cancel]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Swap => "Swap positions",
            Self::Replace => "Send to bench",
            Self::FindAlternative => "Find another slot",
            Self::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeOption {
    pub outcome: ResolutionOutcome,
    pub recommended: bool,
}

/// Free slot the mover could take instead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    pub slot_id: SlotId,
    pub role_fit: RoleFit,
    /// Link chemistry at this slot minus link chemistry where the mover stands now
    pub chemistry_delta: f64,
    /// Distance from the drop point
    pub distance: f32,
}

impl RankedAlternative {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.role_fit
            .cmp(&other.role_fit)
            .then_with(|| other.chemistry_delta.total_cmp(&self.chemistry_delta))
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then_with(|| self.slot_id.cmp(&other.slot_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Committed(Formation),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictContext {
    pub moving_player: PlayerId,
    pub occupant: PlayerId,
    pub candidate_slot: SlotId,
    /// None when the mover came from the bench
    pub source_slot: Option<SlotId>,
    pub drop_point: FieldPoint,
    pub mode: PositioningMode,
    /// Best first
    pub alternatives: Vec<RankedAlternative>,
    /// Formation revision the context was built against
    pub formation_revision: u64,
}

pub struct ConflictRequest<'a> {
    pub mover: &'a Player,
    pub occupant: PlayerId,
    pub candidate_slot: SlotId,
    pub drop_point: FieldPoint,
    pub mode: PositioningMode,
}

impl ConflictContext {
    pub fn build(
        request: ConflictRequest<'_>,
        formation: &Formation,
        engine: &ChemistryEngine,
        inputs: &ChemistryInputs<'_>,
        config: &PositioningConfig,
    ) -> Result<Self> {
        let ConflictRequest { mover, occupant, candidate_slot, drop_point, mode } = request;
        formation.require_slot(candidate_slot)?;

        let source = formation.slot_of(&mover.id);
        let source_slot = source.map(|s| s.id);
        let current_link = match source {
            Some(s) => engine.link_chemistry(
                formation,
                &mover.id,
                s.position,
                Some(s.id),
                config.link_radius,
                inputs,
            ),
            None => 0.0,
        };

        let mut alternatives: Vec<RankedAlternative> = formation
            .free_slots()
            .filter(|s| s.id != candidate_slot && Some(s.id) != source_slot)
            .filter_map(|s| {
                let role_fit = mover.role.fit_for(s.role);
                if !role_fit.is_compatible() {
                    return None;
                }
                let link = engine.link_chemistry(
                    formation,
                    &mover.id,
                    s.position,
                    source_slot,
                    config.link_radius,
                    inputs,
                );
                Some(RankedAlternative {
                    slot_id: s.id,
                    role_fit,
                    chemistry_delta: link - current_link,
                    distance: s.position.distance(&drop_point),
                })
            })
            .collect();
        alternatives.sort_by(|a, b| a.rank_cmp(b));

        info!(
            mover = %mover.id,
            occupant = %occupant,
            slot = %candidate_slot,
            alternatives = alternatives.len(),
            "placement conflict raised"
        );

        Ok(Self {
            moving_player: mover.id.clone(),
            occupant,
            candidate_slot,
            source_slot,
            drop_point,
            mode,
            alternatives,
            formation_revision: formation.revision,
        })
    }

    pub fn best_alternative(&self) -> Option<&RankedAlternative> {
        self.alternatives.first()
    }

    pub fn is_available(&self, outcome: ResolutionOutcome) -> bool {
        match outcome {
            ResolutionOutcome::FindAlternative => !self.alternatives.is_empty(),
            ResolutionOutcome::Swap | ResolutionOutcome::Replace | ResolutionOutcome::Cancel => true,
        }
    }

    /// Menu to present; `FindAlternative` is omitted when nothing qualifies
    pub fn available_outcomes(&self) -> Vec<OutcomeOption> {
        ResolutionOutcome::all()
            .into_iter()
            .filter(|o| self.is_available(*o))
            .map(|outcome| OutcomeOption {
                outcome,
                recommended: outcome == ResolutionOutcome::Swap,
            })
            .collect()
    }

    /// Apply `outcome` to a copy of `formation`. The input is never touched,
    /// so a failed or cancelled resolution leaves the caller's state as it was.
    pub fn apply(
        &self,
        outcome: ResolutionOutcome,
        formation: &Formation,
        roster: &Roster,
    ) -> Result<Resolution> {
        if outcome != ResolutionOutcome::Cancel && formation.revision != self.formation_revision {
            return Err(PositioningError::StaleConflict);
        }
        let mut next = formation.clone();

        match outcome {
            ResolutionOutcome::Cancel => {
                debug!(mover = %self.moving_player, "conflict cancelled");
                return Ok(Resolution::Cancelled);
            }
            ResolutionOutcome::Swap => {
                let mover = roster.require(&self.moving_player)?;
                match self.source_slot {
                    Some(source) => {
                        let occupant = roster.require(&self.occupant)?;
                        check_fit(mover, next.require_slot(self.candidate_slot)?.role)?;
                        check_fit(occupant, next.require_slot(source)?.role)?;
                        next.swap_bindings(source, self.candidate_slot)?;
                    }
                    // Nowhere to send the occupant but the bench
                    None => {
                        next.unbind_slot(self.candidate_slot)?;
                        next.bind_player(self.candidate_slot, mover)?;
                    }
                }
            }
            ResolutionOutcome::Replace => {
                let mover = roster.require(&self.moving_player)?;
                next.unbind_slot(self.candidate_slot)?;
                next.bind_player(self.candidate_slot, mover)?;
            }
            ResolutionOutcome::FindAlternative => {
                let best = self.best_alternative().ok_or(PositioningError::NoAlternativeSlot)?;
                let mover = roster.require(&self.moving_player)?;
                next.bind_player(best.slot_id, mover)?;
            }
        }

        info!(mover = %self.moving_player, ?outcome, "conflict resolved");
        Ok(Resolution::Committed(next))
    }
}

fn check_fit(player: &Player, slot_role: Role) -> Result<()> {
    if player.role.fit_for(slot_role).is_compatible() {
        Ok(())
    } else {
        Err(PositioningError::InvalidRole {
            player: player.id.clone(),
            player_role: player.role,
            slot_role,
        })
    }
}
