//! Standard formation layouts
//!
//! The 14 stock layouts offered to the caller as starting points. Slot ids
//! run 0..=10 with the goalkeeper in slot 0.

use serde::{Deserialize, Serialize};

use super::model::{Formation, Slot};
use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationPreset {
    T442,
    T433,
    T451,
    T4231,
    T352,
    T442Diamond,
    T442DiamondWide,
    T442Narrow,
    T4141,
    T4411,
    T343,
    T1333,
    T4312,
    T4222,
}

type Layout = [(Role, f32, f32); 11];

const BACK_FOUR: [(Role, f32, f32); 5] = [
    (Role::GK, 50.0, 5.0),
    (Role::LB, 20.0, 20.0),
    (Role::LCB, 40.0, 20.0),
    (Role::RCB, 60.0, 20.0),
    (Role::RB, 80.0, 20.0),
];

const fn with_back_four(rest: [(Role, f32, f32); 6]) -> Layout {
    [
        BACK_FOUR[0], BACK_FOUR[1], BACK_FOUR[2], BACK_FOUR[3], BACK_FOUR[4],
        rest[0], rest[1], rest[2], rest[3], rest[4], rest[5],
    ]
}

const T442: Layout = with_back_four([
    (Role::LM, 15.0, 50.0),
    (Role::LCM, 40.0, 50.0),
    (Role::RCM, 60.0, 50.0),
    (Role::RM, 85.0, 50.0),
    (Role::CF, 35.0, 80.0),
    (Role::ST, 65.0, 80.0),
]);

const T433: Layout = with_back_four([
    (Role::LCM, 35.0, 45.0),
    (Role::CM, 50.0, 45.0),
    (Role::RCM, 65.0, 45.0),
    (Role::LW, 15.0, 80.0),
    (Role::CF, 50.0, 85.0),
    (Role::RW, 85.0, 80.0),
]);

const T451: Layout = with_back_four([
    (Role::LM, 15.0, 50.0),
    (Role::LCM, 35.0, 50.0),
    (Role::CM, 50.0, 50.0),
    (Role::RCM, 65.0, 50.0),
    (Role::RM, 85.0, 50.0),
    (Role::ST, 50.0, 80.0),
]);

const T4231: Layout = with_back_four([
    (Role::CDM, 40.0, 35.0),
    (Role::CM, 60.0, 35.0),
    (Role::LAM, 20.0, 60.0),
    (Role::CAM, 50.0, 60.0),
    (Role::RAM, 80.0, 60.0),
    (Role::ST, 50.0, 85.0),
]);

const T352: Layout = [
    (Role::GK, 50.0, 5.0),
    (Role::LCB, 35.0, 20.0),
    (Role::CB, 50.0, 20.0),
    (Role::RCB, 65.0, 20.0),
    (Role::LWB, 10.0, 45.0),
    (Role::LCM, 35.0, 50.0),
    (Role::CM, 50.0, 50.0),
    (Role::RCM, 65.0, 50.0),
    (Role::RWB, 90.0, 45.0),
    (Role::CF, 40.0, 80.0),
    (Role::ST, 60.0, 80.0),
];

const T442_DIAMOND: Layout = with_back_four([
    (Role::CDM, 50.0, 35.0),
    (Role::LM, 30.0, 50.0),
    (Role::RM, 70.0, 50.0),
    (Role::CAM, 50.0, 65.0),
    (Role::CF, 40.0, 85.0),
    (Role::ST, 60.0, 85.0),
]);

const T442_DIAMOND_WIDE: Layout = with_back_four([
    (Role::CDM, 50.0, 35.0),
    (Role::LM, 15.0, 50.0),
    (Role::RM, 85.0, 50.0),
    (Role::CAM, 50.0, 65.0),
    (Role::CF, 40.0, 85.0),
    (Role::ST, 60.0, 85.0),
]);

const T442_NARROW: Layout = with_back_four([
    (Role::LCM, 35.0, 50.0),
    (Role::CM, 50.0, 45.0),
    (Role::RCM, 65.0, 50.0),
    (Role::CAM, 50.0, 60.0),
    (Role::CF, 40.0, 80.0),
    (Role::ST, 60.0, 80.0),
]);

const T4141: Layout = with_back_four([
    (Role::CDM, 50.0, 35.0),
    (Role::LM, 15.0, 55.0),
    (Role::LCM, 40.0, 55.0),
    (Role::RCM, 60.0, 55.0),
    (Role::RM, 85.0, 55.0),
    (Role::ST, 50.0, 85.0),
]);

const T4411: Layout = with_back_four([
    (Role::LM, 15.0, 50.0),
    (Role::LCM, 40.0, 50.0),
    (Role::RCM, 60.0, 50.0),
    (Role::RM, 85.0, 50.0),
    (Role::CAM, 50.0, 70.0),
    (Role::ST, 50.0, 85.0),
]);

const T343: Layout = [
    (Role::GK, 50.0, 5.0),
    (Role::LCB, 35.0, 20.0),
    (Role::CB, 50.0, 20.0),
    (Role::RCB, 65.0, 20.0),
    (Role::LWB, 15.0, 50.0),
    (Role::LCM, 40.0, 50.0),
    (Role::RCM, 60.0, 50.0),
    (Role::RWB, 85.0, 50.0),
    (Role::LW, 20.0, 80.0),
    (Role::CF, 50.0, 85.0),
    (Role::RW, 80.0, 80.0),
];

const T1333: Layout = [
    (Role::GK, 50.0, 5.0),
    (Role::LCB, 35.0, 25.0),
    (Role::CB, 50.0, 25.0),
    (Role::RCB, 65.0, 25.0),
    (Role::LM, 25.0, 50.0),
    (Role::CM, 50.0, 50.0),
    (Role::RM, 75.0, 50.0),
    (Role::LW, 25.0, 75.0),
    (Role::CF, 50.0, 75.0),
    (Role::RW, 75.0, 75.0),
    (Role::ST, 50.0, 90.0),
];

const T4312: Layout = with_back_four([
    (Role::LCM, 35.0, 40.0),
    (Role::CM, 50.0, 40.0),
    (Role::RCM, 65.0, 40.0),
    (Role::CAM, 50.0, 65.0),
    (Role::CF, 40.0, 85.0),
    (Role::ST, 60.0, 85.0),
]);

const T4222: Layout = with_back_four([
    (Role::CDM, 40.0, 35.0),
    (Role::CM, 60.0, 35.0),
    (Role::LAM, 25.0, 60.0),
    (Role::RAM, 75.0, 60.0),
    (Role::CF, 35.0, 85.0),
    (Role::ST, 65.0, 85.0),
]);

impl FormationPreset {
    pub fn all() -> [FormationPreset; 14] {
        [
            Self::T442,
            Self::T433,
            Self::T451,
            Self::T4231,
            Self::T352,
            Self::T442Diamond,
            Self::T442DiamondWide,
            Self::T442Narrow,
            Self::T4141,
            Self::T4411,
            Self::T343,
            Self::T1333,
            Self::T4312,
            Self::T4222,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::T442 => "T442",
            Self::T433 => "T433",
            Self::T451 => "T451",
            Self::T4231 => "T4231",
            Self::T352 => "T352",
            Self::T442Diamond => "T442Diamond",
            Self::T442DiamondWide => "T442DiamondWide",
            Self::T442Narrow => "T442Narrow",
            Self::T4141 => "T4141",
            Self::T4411 => "T4411",
            Self::T343 => "T343",
            Self::T1333 => "T1333",
            Self::T4312 => "T4312",
            Self::T4222 => "T4222",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::T442 => "4-4-2",
            Self::T433 => "4-3-3",
            Self::T451 => "4-5-1",
            Self::T4231 => "4-2-3-1",
            Self::T352 => "3-5-2",
            Self::T442Diamond => "4-4-2 Diamond",
            Self::T442DiamondWide => "4-4-2 Diamond Wide",
            Self::T442Narrow => "4-4-2 Narrow",
            Self::T4141 => "4-1-4-1",
            Self::T4411 => "4-4-1-1",
            Self::T343 => "3-4-3",
            Self::T1333 => "1-3-3-3",
            Self::T4312 => "4-3-1-2",
            Self::T4222 => "4-2-2-2",
        }
    }

    /// Accepts either the id ("T4231") or the display name ("4-2-3-1")
    pub fn parse(name: &str) -> Option<FormationPreset> {
        let name = name.trim();
        Self::all().into_iter().find(|p| {
            p.id().eq_ignore_ascii_case(name) || p.display_name().eq_ignore_ascii_case(name)
        })
    }

    fn layout(&self) -> &'static Layout {
        match self {
            Self::T442 => &T442,
            Self::T433 => &T433,
            Self::T451 => &T451,
            Self::T4231 => &T4231,
            Self::T352 => &T352,
            Self::T442Diamond => &T442_DIAMOND,
            Self::T442DiamondWide => &T442_DIAMOND_WIDE,
            Self::T442Narrow => &T442_NARROW,
            Self::T4141 => &T4141,
            Self::T4411 => &T4411,
            Self::T343 => &T343,
            Self::T1333 => &T1333,
            Self::T4312 => &T4312,
            Self::T4222 => &T4222,
        }
    }

    /// Fresh, unbound formation for this layout
    pub fn build(&self) -> Formation {
        let slots = self
            .layout()
            .iter()
            .enumerate()
            .map(|(i, &(role, x, y))| Slot::new(i as u32, role, x, y))
            .collect();
        Formation::new(self.display_name(), slots)
    }
}
