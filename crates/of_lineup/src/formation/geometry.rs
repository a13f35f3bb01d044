//! Field coordinate system
//!
//! Normalized pitch coordinates shared by slots and pointer input:
//! - X: 0 = left touchline, 100 = right touchline
//! - Y: 0 = own goal line, 100 = opponent goal line
//!
//! Radii in `PositioningConfig` use the same units, so they read as a
//! percentage of field width.

use serde::{Deserialize, Serialize};

pub const FIELD_MIN: f32 = 0.0;
pub const FIELD_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldPoint {
    pub x: f32,
    pub y: f32,
}

impl FieldPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &FieldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn clamped(&self) -> FieldPoint {
        FieldPoint {
            x: clamp_axis(self.x),
            y: clamp_axis(self.y),
        }
    }

    pub fn in_bounds(&self) -> bool {
        (FIELD_MIN..=FIELD_MAX).contains(&self.x) && (FIELD_MIN..=FIELD_MAX).contains(&self.y)
    }

    /// How far outside the pitch this point lies (0 when inside)
    pub fn overshoot(&self) -> f32 {
        let dx = (FIELD_MIN - self.x).max(self.x - FIELD_MAX).max(0.0);
        let dy = (FIELD_MIN - self.y).max(self.y - FIELD_MAX).max(0.0);
        dx.max(dy)
    }
}

// NaN collapses to the centre line instead of poisoning every distance
fn clamp_axis(v: f32) -> f32 {
    if v.is_nan() {
        (FIELD_MIN + FIELD_MAX) / 2.0
    } else {
        v.clamp(FIELD_MIN, FIELD_MAX)
    }
}
