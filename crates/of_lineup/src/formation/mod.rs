// Formation/slot model: layouts, bindings and field geometry

pub mod geometry;
pub mod model;
pub mod presets;

pub use geometry::{FieldPoint, FIELD_MAX, FIELD_MIN};
pub use model::{Formation, FormationId, Slot, SlotId};
pub use presets::FormationPreset;
