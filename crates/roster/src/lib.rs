//! # Roster
//!
//! Keeps the team–driver relationship consistent across Add, Update and
//! Delete:
//!
//! - a linked driver always points at an existing team,
//! - a team never has more than [`MAX_ROSTER_SIZE`] members,
//! - every existence and conflict check runs before the first write.
//!
//! The engine is generic over [`RosterStore`]; the `database` crate provides
//! the SQL implementation.

pub mod engine;
pub mod error;
pub mod store;

#[cfg(test)]
mod test_support;

pub use engine::{
    MAX_ROSTER_SIZE, RosterPlan, RosterSlots, Slot, assign_driver, check_assignable,
    delete_driver, delete_team, plan_roster, update_team_roster,
};
pub use error::RosterError;
pub use store::RosterStore;
