use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type DriverId = i64;
pub type TeamId = i64;
pub type RaceId = i64;

/// A row of the `drivers` table.
///
/// `team_id` is the only link between drivers and teams; a team's roster is
/// always derived from it, never stored on the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    /// Generated attachment filename, relative to the driver image store.
    pub image: Option<String>,
    pub team_id: Option<TeamId>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// A row of the `teams` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub manufacturer: String,
    pub image: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// A row of the `races` table. Races have no relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: RaceId,
    pub winner_name: Option<String>,
    pub winner_time: Option<String>,
    pub grand_prix: Option<String>,
    pub number_of_laps: Option<i32>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Insert payload for a driver. New drivers never start on a team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDriver {
    pub name: String,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub image: Option<String>,
}

/// Scalar changes applied by a driver update.
///
/// `image` is only written when `Some`, so an update without an upload keeps
/// the previous reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverChanges {
    pub name: String,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub image: Option<String>,
}

/// Insert payload for a team (and the scalar part of a team update).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTeam {
    pub manufacturer: String,
    pub image: Option<String>,
}

/// Insert/update payload for a race.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRace {
    pub winner_name: Option<String>,
    pub winner_time: Option<String>,
    pub grand_prix: Option<String>,
    pub number_of_laps: Option<i32>,
}
