// Pairwise chemistry scoring

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::records::{FamiliarityTable, MentoringGroups, Relationship, RelationshipBook};
use crate::config::PositioningConfig;
use crate::formation::{FieldPoint, Formation, SlotId};
use crate::models::PlayerId;

pub const MAX_FAMILIARITY: f64 = 60.0;
pub const FRIENDSHIP_BONUS: i32 = 20;
pub const RIVALRY_PENALTY: i32 = -20;
pub const MENTOR_BONUS: i32 = 15;

/// Read-only view of the externally owned records
#[derive(Debug, Clone, Copy)]
pub struct ChemistryInputs<'a> {
    pub relationships: &'a RelationshipBook,
    pub mentoring: &'a MentoringGroups,
    pub familiarity: &'a FamiliarityTable,
}

/// Score for one unordered pair, valid for the formation it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemistryEdge {
    pub a: PlayerId,
    pub b: PlayerId,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemistryReport {
    pub pair_scores: Vec<ChemistryEdge>,
    /// Mean over all bound pairs; 0.0 with fewer than two bound players
    pub formation_average: f64,
}

impl ChemistryReport {
    pub fn score(&self, a: &PlayerId, b: &PlayerId) -> Option<u8> {
        self.pair_scores
            .iter()
            .find(|e| (&e.a == a && &e.b == b) || (&e.a == b && &e.b == a))
            .map(|e| e.score)
    }

    /// Average of the pairs one player is part of
    pub fn player_average(&self, player: &PlayerId) -> Option<f64> {
        let scores: Vec<u8> = self
            .pair_scores
            .iter()
            .filter(|e| &e.a == player || &e.b == player)
            .map(|e| e.score)
            .collect();
        mean(&scores)
    }
}

/// Stateless scorer. Same inputs, same output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChemistryEngine {
    familiarity_rate: f64,
}

impl Default for ChemistryEngine {
    fn default() -> Self {
        Self::new(&PositioningConfig::default())
    }
}

impl ChemistryEngine {
    pub fn new(config: &PositioningConfig) -> Self {
        Self { familiarity_rate: config.familiarity_rate }
    }

    /// `60 * (1 - e^(-k*t))`: early shared time counts most, never exceeds 60
    pub fn base_familiarity(&self, shared_units: f64) -> f64 {
        if !shared_units.is_finite() || shared_units <= 0.0 {
            return 0.0;
        }
        MAX_FAMILIARITY * (1.0 - (-self.familiarity_rate * shared_units).exp())
    }

    pub fn relationship_modifier(relationship: Relationship) -> i32 {
        match relationship {
            Relationship::Friendship => FRIENDSHIP_BONUS,
            Relationship::Rivalry => RIVALRY_PENALTY,
            Relationship::None => 0,
        }
    }

    pub fn mentoring_modifier(is_mentor_pair: bool) -> i32 {
        if is_mentor_pair {
            MENTOR_BONUS
        } else {
            0
        }
    }

    pub fn pair_score(&self, a: &PlayerId, b: &PlayerId, inputs: &ChemistryInputs<'_>) -> u8 {
        let familiarity = self.base_familiarity(inputs.familiarity.shared_units(a, b)).round() as i32;
        let total = familiarity
            + Self::relationship_modifier(inputs.relationships.get(a, b))
            + Self::mentoring_modifier(inputs.mentoring.is_mentor_pair(a, b));
        total.clamp(0, 100) as u8
    }

    /// Scores every bound pair. Pairs are scored in parallel; the output order
    /// follows slot order so repeated calls compare equal.
    pub fn formation_chemistry(
        &self,
        formation: &Formation,
        inputs: &ChemistryInputs<'_>,
    ) -> ChemistryReport {
        let players = formation.bound_players();
        let pairs: Vec<(&PlayerId, &PlayerId)> = players
            .iter()
            .enumerate()
            .flat_map(|(i, a)| players[i + 1..].iter().map(move |b| (*a, *b)))
            .collect();

        let pair_scores: Vec<ChemistryEdge> = pairs
            .par_iter()
            .map(|(a, b)| ChemistryEdge {
                a: (*a).clone(),
                b: (*b).clone(),
                score: self.pair_score(a, b, inputs),
            })
            .collect();

        let scores: Vec<u8> = pair_scores.iter().map(|e| e.score).collect();
        ChemistryReport { pair_scores, formation_average: mean(&scores).unwrap_or(0.0) }
    }

    /// Mean score between `player` and teammates whose slots lie within
    /// `link_radius` of `at`. `skip_slot` is the player's own slot.
    pub fn link_chemistry(
        &self,
        formation: &Formation,
        player: &PlayerId,
        at: FieldPoint,
        skip_slot: Option<SlotId>,
        link_radius: f32,
        inputs: &ChemistryInputs<'_>,
    ) -> f64 {
        let scores: Vec<u8> = formation
            .slots
            .iter()
            .filter(|s| Some(s.id) != skip_slot)
            .filter(|s| s.position.distance(&at) <= link_radius)
            .filter_map(|s| s.player.as_ref())
            .filter(|other| *other != player)
            .map(|other| self.pair_score(player, other, inputs))
            .collect();
        mean(&scores).unwrap_or(0.0)
    }
}

/// One-shot scoring of a formation against explicit, read-only records
pub fn compute_chemistry(
    formation: &Formation,
    relationships: &RelationshipBook,
    mentoring: &MentoringGroups,
    familiarity: &FamiliarityTable,
    config: &PositioningConfig,
) -> ChemistryReport {
    let inputs = ChemistryInputs { relationships, mentoring, familiarity };
    ChemistryEngine::new(config).formation_chemistry(formation, &inputs)
}

fn mean(scores: &[u8]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64)
    }
}
