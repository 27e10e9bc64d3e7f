//! In-memory `RosterStore` used by the engine tests.

use crate::engine::MAX_ROSTER_SIZE;
use crate::store::RosterStore;
use chrono::Utc;
use core_types::{Driver, DriverId, TeamId};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    drivers: BTreeMap<DriverId, Driver>,
    teams: BTreeSet<TeamId>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn add_team(&self) -> TeamId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.teams.insert(id);
        id
    }

    pub fn add_driver(&self, name: &str) -> DriverId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();
        state.drivers.insert(
            id,
            Driver {
                id,
                name: name.to_string(),
                age: None,
                nationality: None,
                image: None,
                team_id: None,
                created_date: now,
                modified_date: now,
            },
        );
        id
    }

    pub fn team_of(&self, driver: DriverId) -> Option<TeamId> {
        self.state.lock().unwrap().drivers.get(&driver).and_then(|d| d.team_id)
    }

    pub fn roster(&self, team: TeamId) -> Vec<DriverId> {
        let state = self.state.lock().unwrap();
        state
            .drivers
            .values()
            .filter(|d| d.team_id == Some(team))
            .map(|d| d.id)
            .collect()
    }

    pub fn has_team(&self, team: TeamId) -> bool {
        self.state.lock().unwrap().teams.contains(&team)
    }

    /// Every linked driver points at an existing team and no team has more
    /// than two members.
    pub fn assert_consistent(&self) {
        let state = self.state.lock().unwrap();
        let mut sizes: BTreeMap<TeamId, usize> = BTreeMap::new();
        for driver in state.drivers.values() {
            if let Some(team) = driver.team_id {
                assert!(state.teams.contains(&team), "driver {} points at missing team {team}", driver.id);
                *sizes.entry(team).or_default() += 1;
            }
        }
        for (team, size) in sizes {
            assert!(size <= MAX_ROSTER_SIZE, "team {team} has {size} members");
        }
    }
}

impl RosterStore for MemoryStore {
    type Error = Infallible;

    async fn find_driver(&self, id: DriverId) -> Result<Option<Driver>, Infallible> {
        Ok(self.state.lock().unwrap().drivers.get(&id).cloned())
    }

    async fn team_members(&self, team: TeamId) -> Result<Vec<Driver>, Infallible> {
        let state = self.state.lock().unwrap();
        Ok(state
            .drivers
            .values()
            .filter(|d| d.team_id == Some(team))
            .cloned()
            .collect())
    }

    async fn link_driver(&self, driver: DriverId, team: TeamId) -> Result<(), Infallible> {
        if let Some(d) = self.state.lock().unwrap().drivers.get_mut(&driver) {
            d.team_id = Some(team);
        }
        Ok(())
    }

    async fn unlink_driver(&self, driver: DriverId) -> Result<(), Infallible> {
        if let Some(d) = self.state.lock().unwrap().drivers.get_mut(&driver) {
            d.team_id = None;
        }
        Ok(())
    }

    async fn remove_team(&self, team: TeamId) -> Result<(), Infallible> {
        self.state.lock().unwrap().teams.remove(&team);
        Ok(())
    }

    async fn remove_driver(&self, driver: DriverId) -> Result<(), Infallible> {
        self.state.lock().unwrap().drivers.remove(&driver);
        Ok(())
    }
}
