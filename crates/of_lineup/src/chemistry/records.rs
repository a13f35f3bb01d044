//! Externally owned chemistry inputs
//!
//! Relationships, mentoring groups and familiarity accumulators belong to the
//! management layer. The engine reads them; only `FamiliarityTable` has a
//! write-back helper, called once per completed match.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::formation::Formation;
use crate::models::PlayerId;

/// Unordered pair of players; `PairKey::new(a, b) == PairKey::new(b, a)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: &PlayerId, b: &PlayerId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }

    pub fn first(&self) -> &PlayerId {
        &self.0
    }

    pub fn second(&self) -> &PlayerId {
        &self.1
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        &self.0 == player || &self.1 == player
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Friendship,
    Rivalry,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub a: PlayerId,
    pub b: PlayerId,
    pub kind: Relationship,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RelationshipRecord>", into = "Vec<RelationshipRecord>")]
pub struct RelationshipBook {
    entries: HashMap<PairKey, Relationship>,
}

impl RelationshipBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, a: &PlayerId, b: &PlayerId, kind: Relationship) {
        let key = PairKey::new(a, b);
        match kind {
            Relationship::None => {
                self.entries.remove(&key);
            }
            _ => {
                self.entries.insert(key, kind);
            }
        }
    }

    pub fn get(&self, a: &PlayerId, b: &PlayerId) -> Relationship {
        self.entries.get(&PairKey::new(a, b)).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<RelationshipRecord>> for RelationshipBook {
    fn from(records: Vec<RelationshipRecord>) -> Self {
        let mut book = Self::new();
        for record in records {
            book.set(&record.a, &record.b, record.kind);
        }
        book
    }
}

impl From<RelationshipBook> for Vec<RelationshipRecord> {
    fn from(book: RelationshipBook) -> Self {
        let mut records: Vec<_> = book
            .entries
            .into_iter()
            .map(|(key, kind)| RelationshipRecord { a: key.0, b: key.1, kind })
            .collect();
        records.sort_by(|x, y| (&x.a, &x.b).cmp(&(&y.a, &y.b)));
        records
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentoringGroup {
    pub mentor: PlayerId,
    pub mentees: Vec<PlayerId>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentoringGroups(pub Vec<MentoringGroup>);

impl MentoringGroups {
    /// True if either player mentors the other in an active group
    pub fn is_mentor_pair(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.0.iter().filter(|g| g.active).any(|g| {
            (&g.mentor == a && g.mentees.contains(b)) || (&g.mentor == b && g.mentees.contains(a))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamiliarityRecord {
    pub a: PlayerId,
    pub b: PlayerId,
    pub shared_units: f64,
}

/// Accumulated shared on-field time per pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FamiliarityRecord>", into = "Vec<FamiliarityRecord>")]
pub struct FamiliarityTable {
    units: HashMap<PairKey, f64>,
}

impl FamiliarityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared_units(&self, a: &PlayerId, b: &PlayerId) -> f64 {
        self.units.get(&PairKey::new(a, b)).copied().unwrap_or(0.0)
    }

    /// Monotonic: negative or non-finite amounts are ignored
    pub fn add(&mut self, a: &PlayerId, b: &PlayerId, units: f64) {
        if a == b || !units.is_finite() || units <= 0.0 {
            return;
        }
        *self.units.entry(PairKey::new(a, b)).or_insert(0.0) += units;
    }

    /// Write-back after a match: every bound pair shared `units` of time
    pub fn record_shared_time(&mut self, formation: &Formation, units: f64) {
        let players = formation.bound_players();
        for (i, a) in players.iter().enumerate() {
            for b in &players[i + 1..] {
                self.add(a, b, units);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl From<Vec<FamiliarityRecord>> for FamiliarityTable {
    fn from(records: Vec<FamiliarityRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.add(&record.a, &record.b, record.shared_units);
        }
        table
    }
}

impl From<FamiliarityTable> for Vec<FamiliarityRecord> {
    fn from(table: FamiliarityTable) -> Self {
        let mut records: Vec<_> = table
            .units
            .into_iter()
            .map(|(key, shared_units)| FamiliarityRecord { a: key.0, b: key.1, shared_units })
            .collect();
        records.sort_by(|x, y| (&x.a, &x.b).cmp(&(&y.a, &y.b)));
        records
    }
}
