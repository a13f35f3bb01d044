//! Chemistry scoring
//!
//! ```text
//! score = clamp(familiarity(t) + relationship + mentoring, 0, 100)
//! ```
//!
//! - familiarity: `60 * (1 - e^(-k*t))`, t = shared on-field units
//! - relationship: +20 friendship, -20 rivalry
//! - mentoring: +15 when one player mentors the other

pub mod records;
pub mod scoring;

pub use records::{
    FamiliarityRecord, FamiliarityTable, MentoringGroup, MentoringGroups, PairKey, Relationship,
    RelationshipBook, RelationshipRecord,
};
pub use scoring::{
    compute_chemistry, ChemistryEdge, ChemistryEngine, ChemistryInputs, ChemistryReport,
};
