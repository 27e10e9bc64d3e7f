pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use structs::{
    Driver, DriverChanges, DriverId, NewDriver, NewRace, NewTeam, Race, RaceId, Team, TeamId,
};
