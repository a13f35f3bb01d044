// Playing roles and slot compatibility

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fine-grained playing role (22 roles).
///
/// Used both as a player's natural role and as the role a slot asks for.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    GK,
    SW,
    LB,
    LCB,
    CB,
    RCB,
    RB,
    LWB,
    RWB,
    CDM,
    LM,
    LCM,
    CM,
    RCM,
    RM,
    LAM,
    CAM,
    RAM,
    LW,
    CF,
    RW,
    ST,
}

/// Broad role category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

/// How well a player's role fits a slot's role.
///
/// Ordered best-first, so sorting by `RoleFit` puts exact matches on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFit {
    /// Same role
    Exact,
    /// Same category (e.g. LCB in a CB slot)
    Category,
    /// Outfield player out of category (e.g. CM in a LB slot)
    Outfield,
    /// Goalkeeper in an outfield slot or vice versa
    Incompatible,
}

impl RoleFit {
    pub fn is_compatible(&self) -> bool {
        !matches!(self, RoleFit::Incompatible)
    }
}

impl Role {
    pub fn all() -> [Role; 22] {
        [
            Role::GK,
            Role::SW,
            Role::LB,
            Role::LCB,
            Role::CB,
            Role::RCB,
            Role::RB,
            Role::LWB,
            Role::RWB,
            Role::CDM,
            Role::LM,
            Role::LCM,
            Role::CM,
            Role::RCM,
            Role::RM,
            Role::LAM,
            Role::CAM,
            Role::RAM,
            Role::LW,
            Role::CF,
            Role::RW,
            Role::ST,
        ]
    }

    pub fn category(&self) -> RoleCategory {
        match self {
            Role::GK => RoleCategory::Goalkeeper,
            Role::SW | Role::LB | Role::LCB | Role::CB | Role::RCB | Role::RB => {
                RoleCategory::Defender
            }
            // Wingbacks defend first
            Role::LWB | Role::RWB => RoleCategory::Defender,
            Role::CDM
            | Role::LM
            | Role::LCM
            | Role::CM
            | Role::RCM
            | Role::RM
            | Role::LAM
            | Role::CAM
            | Role::RAM => RoleCategory::Midfielder,
            Role::LW | Role::CF | Role::RW | Role::ST => RoleCategory::Forward,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Role::GK => "GK",
            Role::SW => "SW",
            Role::LB => "LB",
            Role::LCB => "LCB",
            Role::CB => "CB",
            Role::RCB => "RCB",
            Role::RB => "RB",
            Role::LWB => "LWB",
            Role::RWB => "RWB",
            Role::CDM => "CDM",
            Role::LM => "LM",
            Role::LCM => "LCM",
            Role::CM => "CM",
            Role::RCM => "RCM",
            Role::RM => "RM",
            Role::LAM => "LAM",
            Role::CAM => "CAM",
            Role::RAM => "RAM",
            Role::LW => "LW",
            Role::CF => "CF",
            Role::RW => "RW",
            Role::ST => "ST",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::GK => "Goalkeeper",
            Role::SW => "Sweeper",
            Role::LB => "Left Back",
            Role::LCB => "Left Centre Back",
            Role::CB => "Centre Back",
            Role::RCB => "Right Centre Back",
            Role::RB => "Right Back",
            Role::LWB => "Left Wingback",
            Role::RWB => "Right Wingback",
            Role::CDM => "Defensive Midfielder",
            Role::LM => "Left Midfielder",
            Role::LCM => "Left Centre Midfielder",
            Role::CM => "Centre Midfielder",
            Role::RCM => "Right Centre Midfielder",
            Role::RM => "Right Midfielder",
            Role::LAM => "Left Attacking Midfielder",
            Role::CAM => "Attacking Midfielder",
            Role::RAM => "Right Attacking Midfielder",
            Role::LW => "Left Winger",
            Role::CF => "Centre Forward",
            Role::RW => "Right Winger",
            Role::ST => "Striker",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Role> {
        Role::all().into_iter().find(|r| r.short_name().eq_ignore_ascii_case(name.trim()))
    }

    /// Fit of a player with this role in a slot asking for `slot_role`
    pub fn fit_for(&self, slot_role: Role) -> RoleFit {
        let mine = self.category();
        let theirs = slot_role.category();
        let keeper_mismatch =
            (mine == RoleCategory::Goalkeeper) != (theirs == RoleCategory::Goalkeeper);

        if keeper_mismatch {
            RoleFit::Incompatible
        } else if *self == slot_role {
            RoleFit::Exact
        } else if mine == theirs {
            RoleFit::Category
        } else {
            RoleFit::Outfield
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
