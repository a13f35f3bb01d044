use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use super::geometry::FieldPoint;
use crate::error::{PositioningError, Result};
use crate::models::{Player, PlayerId, Role, RoleCategory, Roster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormationId(pub Uuid);

impl FormationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FormationId {
    fn default() -> Self {
        Self::new()
    }
}

/// A position in a formation that can hold one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub role: Role,
    pub position: FieldPoint,
    #[serde(default)]
    pub player: Option<PlayerId>,
}

impl Slot {
    pub fn new(id: u32, role: Role, x: f32, y: f32) -> Self {
        Self { id: SlotId(id), role, position: FieldPoint::new(x, y).clamped(), player: None }
    }

    pub fn is_free(&self) -> bool {
        self.player.is_none()
    }
}

/// Named tactical layout.
///
/// Invariant: a player id is bound to at most one slot. Every mutating
/// method preserves it; `validate_bindings` checks data coming from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    #[serde(default)]
    pub id: FormationId,
    pub name: String,
    pub slots: Vec<Slot>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Bumped on every mutation; lets stale conflict contexts be detected
    #[serde(default)]
    pub revision: u64,
}

impl Formation {
    pub fn new(name: &str, slots: Vec<Slot>) -> Self {
        let now = Utc::now();
        Self {
            id: FormationId::new(),
            name: name.to_string(),
            slots,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn require_slot(&self, id: SlotId) -> Result<&Slot> {
        self.slot(id).ok_or(PositioningError::SlotNotFound(id))
    }

    fn slot_index(&self, id: SlotId) -> Result<usize> {
        self.slots.iter().position(|s| s.id == id).ok_or(PositioningError::SlotNotFound(id))
    }

    pub fn occupant(&self, id: SlotId) -> Option<&PlayerId> {
        self.slot(id).and_then(|s| s.player.as_ref())
    }

    pub fn slot_of(&self, player: &PlayerId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.player.as_ref() == Some(player))
    }

    pub fn free_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.is_free())
    }

    /// Bound players in slot order
    pub fn bound_players(&self) -> Vec<&PlayerId> {
        self.slots.iter().filter_map(|s| s.player.as_ref()).collect()
    }

    /// Slot -> player pairs, ignoring positions and timestamps
    pub fn bindings(&self) -> Vec<(SlotId, Option<PlayerId>)> {
        self.slots.iter().map(|s| (s.id, s.player.clone())).collect()
    }

    /// Bind `player` into `slot_id`.
    ///
    /// Fails with `SlotOccupied` if another player holds the slot. If the
    /// player was bound elsewhere, that slot is cleared in the same step.
    pub fn bind_player(&mut self, slot_id: SlotId, player: &Player) -> Result<()> {
        let target = self.slot_index(slot_id)?;
        let slot = &self.slots[target];

        match &slot.player {
            Some(current) if current == &player.id => return Ok(()),
            Some(current) => {
                return Err(PositioningError::SlotOccupied {
                    slot: slot_id,
                    occupant: current.clone(),
                })
            }
            None => {}
        }

        if !player.role.fit_for(slot.role).is_compatible() {
            return Err(PositioningError::InvalidRole {
                player: player.id.clone(),
                player_role: player.role,
                slot_role: slot.role,
            });
        }

        for other in self.slots.iter_mut() {
            if other.player.as_ref() == Some(&player.id) {
                other.player = None;
            }
        }
        self.slots[target].player = Some(player.id.clone());
        self.touch();
        debug!(slot = %slot_id, player = %player.id, "player bound");
        Ok(())
    }

    /// Clear a slot, returning who was in it
    pub fn unbind_slot(&mut self, slot_id: SlotId) -> Result<Option<PlayerId>> {
        let index = self.slot_index(slot_id)?;
        let previous = self.slots[index].player.take();
        if previous.is_some() {
            self.touch();
        }
        Ok(previous)
    }

    /// Exchange the bindings of two slots. Applying it twice restores the
    /// original bindings.
    pub fn swap_bindings(&mut self, a: SlotId, b: SlotId) -> Result<()> {
        let ia = self.slot_index(a)?;
        let ib = self.slot_index(b)?;
        if ia == ib {
            return Ok(());
        }
        let pa = self.slots[ia].player.take();
        let pb = self.slots[ib].player.take();
        self.slots[ia].player = pb;
        self.slots[ib].player = pa;
        self.touch();
        Ok(())
    }

    /// Relocate a slot (free placement)
    pub fn move_slot(&mut self, slot_id: SlotId, to: FieldPoint) -> Result<()> {
        let index = self.slot_index(slot_id)?;
        let to = to.clamped();
        if self.slots[index].position != to {
            self.slots[index].position = to;
            self.touch();
        }
        Ok(())
    }

    /// Nearest unoccupied slot that `role` can play in.
    ///
    /// Ties on distance go to the lower slot id.
    pub fn find_nearest_free_slot(
        &self,
        role: Role,
        position: FieldPoint,
        exclude: &[SlotId],
    ) -> Option<&Slot> {
        self.free_slots()
            .filter(|s| !exclude.contains(&s.id))
            .filter(|s| role.fit_for(s.role).is_compatible())
            .min_by(|a, b| {
                a.position
                    .distance(&position)
                    .total_cmp(&b.position.distance(&position))
                    .then(a.id.cmp(&b.id))
            })
    }

    /// Role categories that have slots but no bound player in any of them.
    /// Goalkeeper is always required, even if the layout forgot the slot.
    pub fn missing_categories(&self) -> Vec<RoleCategory> {
        let mut required: Vec<RoleCategory> = vec![RoleCategory::Goalkeeper];
        for slot in &self.slots {
            let category = slot.role.category();
            if !required.contains(&category) {
                required.push(category);
            }
        }

        required
            .into_iter()
            .filter(|category| {
                !self
                    .slots
                    .iter()
                    .any(|s| s.role.category() == *category && s.player.is_some())
            })
            .collect()
    }

    /// Advisory only; nothing refuses an incomplete formation
    pub fn is_complete(&self) -> bool {
        self.missing_categories().is_empty()
    }

    /// Slot ids and bound players must each appear once
    pub fn check_unique_bindings(&self) -> Result<()> {
        let mut slot_ids = HashSet::new();
        let mut seen = HashSet::new();
        for slot in &self.slots {
            if !slot_ids.insert(slot.id) {
                return Err(PositioningError::InvalidConfig(format!(
                    "slot id {} appears twice in formation {}",
                    slot.id, self.name
                )));
            }
            if let Some(player_id) = &slot.player {
                if !seen.insert(player_id) {
                    return Err(PositioningError::DuplicateBinding(player_id.clone()));
                }
            }
        }
        Ok(())
    }

    /// Check bindings that arrived from outside the engine
    pub fn validate_bindings(&self, roster: &Roster) -> Result<()> {
        self.check_unique_bindings()?;
        for slot in &self.slots {
            let Some(player_id) = &slot.player else {
                continue;
            };
            let player = roster.require(player_id)?;
            if !player.role.fit_for(slot.role).is_compatible() {
                return Err(PositioningError::InvalidRole {
                    player: player.id.clone(),
                    player_role: player.role,
                    slot_role: slot.role,
                });
            }
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}
