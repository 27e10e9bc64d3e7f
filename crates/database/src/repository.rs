use crate::DbError;
use chrono::Utc;
use core_types::{
    Driver, DriverChanges, DriverId, NewDriver, NewRace, NewTeam, Race, RaceId, Team, TeamId,
};
use sqlx::sqlite::SqlitePool;

const DRIVER_COLUMNS: &str =
    "id, name, age, nationality, image, team_id, created_date, modified_date";
const TEAM_COLUMNS: &str = "id, manufacturer, image, created_date, modified_date";
const RACE_COLUMNS: &str =
    "id, winner_name, winner_time, grand_prix, number_of_laps, created_date, modified_date";

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// Every insert stamps both audit columns; every update refreshes
/// `modified_date` only.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

/// Unicode-aware substring match; SQLite's `LOWER` only folds ASCII.
fn name_matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // --- Drivers ---

    pub async fn insert_driver(&self, driver: &NewDriver) -> Result<Driver, DbError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Driver>(&format!(
            "INSERT INTO drivers (name, age, nationality, image, team_id, created_date, modified_date) \
             VALUES (?, ?, ?, ?, NULL, ?, ?) RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(&driver.name)
        .bind(driver.age)
        .bind(&driver.nationality)
        .bind(&driver.image)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Applies `changes` to driver `id`. Returns `None` when no such driver
    /// exists. The team link is never touched here.
    pub async fn update_driver(
        &self,
        id: DriverId,
        changes: &DriverChanges,
    ) -> Result<Option<Driver>, DbError> {
        let row = sqlx::query_as::<_, Driver>(&format!(
            "UPDATE drivers SET name = ?, age = ?, nationality = ?, image = COALESCE(?, image), \
             modified_date = ? WHERE id = ? RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(&changes.name)
        .bind(changes.age)
        .bind(&changes.nationality)
        .bind(&changes.image)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_driver(&self, id: DriverId) -> Result<Option<Driver>, DbError> {
        let row = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// All drivers, or those whose name contains `search` (case-insensitive).
    pub async fn list_drivers(&self, search: Option<&str>) -> Result<Vec<Driver>, DbError> {
        let rows = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(match search.filter(|s| !s.is_empty()) {
            Some(search) => {
                let needle = search.to_lowercase();
                rows.into_iter()
                    .filter(|driver| name_matches(&driver.name, &needle))
                    .collect()
            }
            None => rows,
        })
    }

    /// Drivers a team editor may pick from: every unassigned driver, plus the
    /// current members of `team` when given.
    pub async fn lookup_drivers(&self, team: Option<TeamId>) -> Result<Vec<Driver>, DbError> {
        let rows = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers \
             WHERE team_id IS NULL OR (?1 IS NOT NULL AND team_id = ?1) ORDER BY id"
        ))
        .bind(team)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The derived roster of `team`, ordered by driver id.
    pub async fn drivers_for_team(&self, team: TeamId) -> Result<Vec<Driver>, DbError> {
        let rows = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE team_id = ? ORDER BY id"
        ))
        .bind(team)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every driver that belongs to some team, ordered by driver id.
    pub async fn assigned_drivers(&self) -> Result<Vec<Driver>, DbError> {
        let rows = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE team_id IS NOT NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Sets or clears the team link of a driver.
    pub async fn set_driver_team(
        &self,
        driver: DriverId,
        team: Option<TeamId>,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE drivers SET team_id = ?, modified_date = ? WHERE id = ?")
            .bind(team)
            .bind(Utc::now())
            .bind(driver)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns `false` when no row was removed.
    pub async fn delete_driver(&self, id: DriverId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Teams ---

    pub async fn insert_team(&self, team: &NewTeam) -> Result<Team, DbError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Team>(&format!(
            "INSERT INTO teams (manufacturer, image, created_date, modified_date) \
             VALUES (?, ?, ?, ?) RETURNING {TEAM_COLUMNS}"
        ))
        .bind(&team.manufacturer)
        .bind(&team.image)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Updates the scalar columns of a team. `image` is only replaced when a
    /// new reference is given.
    pub async fn update_team(&self, id: TeamId, team: &NewTeam) -> Result<Option<Team>, DbError> {
        let row = sqlx::query_as::<_, Team>(&format!(
            "UPDATE teams SET manufacturer = ?, image = COALESCE(?, image), modified_date = ? \
             WHERE id = ? RETURNING {TEAM_COLUMNS}"
        ))
        .bind(&team.manufacturer)
        .bind(&team.image)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_team(&self, id: TeamId) -> Result<Option<Team>, DbError> {
        let row = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, DbError> {
        let rows = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Removes the team row. Fails with a foreign-key error while any driver
    /// still references the team.
    pub async fn delete_team(&self, id: TeamId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Races ---

    pub async fn insert_race(&self, race: &NewRace) -> Result<Race, DbError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Race>(&format!(
            "INSERT INTO races (winner_name, winner_time, grand_prix, number_of_laps, created_date, modified_date) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {RACE_COLUMNS}"
        ))
        .bind(&race.winner_name)
        .bind(&race.winner_time)
        .bind(&race.grand_prix)
        .bind(race.number_of_laps)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_race(&self, id: RaceId, race: &NewRace) -> Result<Option<Race>, DbError> {
        let row = sqlx::query_as::<_, Race>(&format!(
            "UPDATE races SET winner_name = ?, winner_time = ?, grand_prix = ?, number_of_laps = ?, \
             modified_date = ? WHERE id = ? RETURNING {RACE_COLUMNS}"
        ))
        .bind(&race.winner_name)
        .bind(&race.winner_time)
        .bind(&race.grand_prix)
        .bind(race.number_of_laps)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_races(&self) -> Result<Vec<Race>, DbError> {
        let rows = sqlx::query_as::<_, Race>(&format!(
            "SELECT {RACE_COLUMNS} FROM races ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_race(&self, id: RaceId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM races WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
