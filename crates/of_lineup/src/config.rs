//! Positioning Configuration
//!
//! Radii and curve constants for the positioning engine. All distances are in
//! field units: the pitch is a 0-100 square on both axes, so a radius of 8.0
//! means 8% of field width.
//!
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | `snap_radius` | 8.0 | Snap mode attracts the pointer to the nearest slot within this distance |
//! | `collision_radius` | 5.0 | Free mode flags a conflict when dropping this close to another player |
//! | `link_radius` | 30.0 | Slots within this distance count as chemistry links |
//! | `leave_margin` | 10.0 | Pointer this far outside the field cancels the drag |
//! | `familiarity_rate` | 0.05 | `k` in `60 * (1 - e^(-k*t))` |
//!
//! ## Environment Variables
//!
//! - `OF_POSITIONING_PROFILE`: Select preset (touch, precise, default)

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{PositioningError, Result};
use crate::formation::FIELD_MAX;

pub const POSITIONING_PROFILE_ENV: &str = "OF_POSITIONING_PROFILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    pub snap_radius: f32,
    pub collision_radius: f32,
    pub link_radius: f32,
    pub leave_margin: f32,
    pub familiarity_rate: f64,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            snap_radius: 8.0,
            collision_radius: 5.0,
            link_radius: 30.0,
            leave_margin: 10.0,
            familiarity_rate: 0.05,
        }
    }
}

impl PositioningConfig {
    /// Touch screens: fingers cover more of the pitch than a cursor does
    pub fn touch() -> Self {
        Self { snap_radius: 12.0, collision_radius: 7.0, ..Self::default() }
    }

    /// Mouse with a large canvas
    pub fn precise() -> Self {
        Self { snap_radius: 5.0, collision_radius: 3.0, ..Self::default() }
    }

    /// Load from `OF_POSITIONING_PROFILE` or use default
    pub fn from_env_or_default() -> Self {
        let profile = env::var(POSITIONING_PROFILE_ENV).unwrap_or_default();
        Self::from_profile(&profile)
    }

    pub fn from_profile(profile: &str) -> Self {
        match profile.trim().to_lowercase().as_str() {
            "touch" => Self::touch(),
            "precise" => Self::precise(),
            _ => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PositioningError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let radii = [
            ("snap_radius", self.snap_radius),
            ("collision_radius", self.collision_radius),
            ("link_radius", self.link_radius),
        ];
        for (name, value) in radii {
            if !value.is_finite() || value <= 0.0 || value > FIELD_MAX {
                return Err(PositioningError::InvalidConfig(format!(
                    "{name} must be in (0, {FIELD_MAX}], got {value}"
                )));
            }
        }
        if !self.leave_margin.is_finite() || self.leave_margin < 0.0 {
            return Err(PositioningError::InvalidConfig(format!(
                "leave_margin must be non-negative, got {}",
                self.leave_margin
            )));
        }
        if !self.familiarity_rate.is_finite() || self.familiarity_rate <= 0.0 {
            return Err(PositioningError::InvalidConfig(format!(
                "familiarity_rate must be positive, got {}",
                self.familiarity_rate
            )));
        }
        Ok(())
    }
}
