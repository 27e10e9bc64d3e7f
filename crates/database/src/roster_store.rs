use crate::{DbError, DbRepository};
use core_types::{Driver, DriverId, TeamId};
use roster::RosterStore;

impl RosterStore for DbRepository {
    type Error = DbError;

    async fn find_driver(&self, id: DriverId) -> Result<Option<Driver>, DbError> {
        DbRepository::find_driver(self, id).await
    }

    async fn team_members(&self, team: TeamId) -> Result<Vec<Driver>, DbError> {
        self.drivers_for_team(team).await
    }

    async fn link_driver(&self, driver: DriverId, team: TeamId) -> Result<(), DbError> {
        self.set_driver_team(driver, Some(team)).await
    }

    async fn unlink_driver(&self, driver: DriverId) -> Result<(), DbError> {
        self.set_driver_team(driver, None).await
    }

    async fn remove_team(&self, team: TeamId) -> Result<(), DbError> {
        DbRepository::delete_team(self, team).await.map(|_| ())
    }

    async fn remove_driver(&self, driver: DriverId) -> Result<(), DbError> {
        DbRepository::delete_driver(self, driver).await.map(|_| ())
    }
}
