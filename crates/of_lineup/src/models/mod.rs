// Roster-side data: players and roles

pub mod player;
pub mod role;

pub use player::{
    AttributeSnapshot, Form, Morale, Player, PlayerAttributes, PlayerHistory, PlayerId, Roster,
};
pub use role::{Role, RoleCategory, RoleFit};
