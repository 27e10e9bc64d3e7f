use core_types::{Driver, DriverId, TeamId};
use std::future::Future;

/// The persistence operations the roster engine needs.
///
/// Membership is a single forward reference (`driver.team_id`); a team's
/// roster is whatever `team_members` returns. Implementations must never keep
/// a second copy of the membership on the team side.
pub trait RosterStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up a driver by id.
    fn find_driver(
        &self,
        id: DriverId,
    ) -> impl Future<Output = Result<Option<Driver>, Self::Error>> + Send;

    /// Drivers whose `team_id` is `team`, ordered by driver id.
    fn team_members(
        &self,
        team: TeamId,
    ) -> impl Future<Output = Result<Vec<Driver>, Self::Error>> + Send;

    /// Sets `driver.team_id = team`.
    fn link_driver(
        &self,
        driver: DriverId,
        team: TeamId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Clears `driver.team_id`.
    fn unlink_driver(&self, driver: DriverId)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Removes the team row. Members must already be unlinked.
    fn remove_team(&self, team: TeamId) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Removes the driver row.
    fn remove_driver(
        &self,
        driver: DriverId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
