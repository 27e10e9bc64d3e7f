use crate::error::RosterError;
use crate::store::RosterStore;
use core_types::{CoreError, Driver, DriverId, TeamId};
use std::fmt;

/// Upper bound on the number of drivers linked to one team.
pub const MAX_ROSTER_SIZE: usize = 2;

/// The positional slot a driver id arrived in. Only used to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Driver1,
    Driver2,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Driver1 => f.write_str("Driver1"),
            Slot::Driver2 => f.write_str("Driver2"),
        }
    }
}

/// The desired roster of a team as submitted by the client: two optional slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterSlots {
    pub driver1: Option<DriverId>,
    pub driver2: Option<DriverId>,
}

impl RosterSlots {
    pub fn new(driver1: Option<DriverId>, driver2: Option<DriverId>) -> Self {
        Self { driver1, driver2 }
    }

    /// Filled slots in slot order. A slot repeating an earlier slot's id is
    /// dropped, so the result is an ordered set of at most two ids.
    pub fn entries(&self) -> Vec<(Slot, DriverId)> {
        let mut entries = Vec::with_capacity(MAX_ROSTER_SIZE);
        for (slot, id) in [(Slot::Driver1, self.driver1), (Slot::Driver2, self.driver2)] {
            if let Some(id) = id {
                if !entries.iter().any(|(_, seen)| *seen == id) {
                    entries.push((slot, id));
                }
            }
        }
        entries
    }

    pub fn contains(&self, id: DriverId) -> bool {
        self.driver1 == Some(id) || self.driver2 == Some(id)
    }
}

/// The mutations needed to move a team from its current roster to the desired
/// one. Only [`plan_roster`] builds a plan, so holding one means every
/// existence and conflict check has already passed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a roster plan does nothing until it is applied"]
pub struct RosterPlan {
    unlink: Vec<DriverId>,
    link: Vec<DriverId>,
}

impl RosterPlan {
    /// Current members that will lose their team.
    pub fn unlinks(&self) -> &[DriverId] {
        &self.unlink
    }

    /// Drivers that will be attached to the team.
    pub fn links(&self) -> &[DriverId] {
        &self.link
    }

    pub fn is_noop(&self) -> bool {
        self.unlink.is_empty() && self.link.is_empty()
    }

    /// Writes the plan: removals first, then additions.
    pub async fn apply<S>(&self, store: &S, team: TeamId) -> Result<(), RosterError<S::Error>>
    where
        S: RosterStore + Sync,
    {
        for &driver in &self.unlink {
            store.unlink_driver(driver).await.map_err(RosterError::Store)?;
            tracing::debug!(team, driver, "Driver removed from team.");
        }
        for &driver in &self.link {
            store.link_driver(driver, team).await.map_err(RosterError::Store)?;
            tracing::debug!(team, driver, "Driver added to team.");
        }
        Ok(())
    }
}

/// Existence and conflict checks for putting `id` on a team.
///
/// Fails with `NotFound` when the driver does not exist and with `Conflict`
/// when it already has a team.
pub async fn check_assignable<S>(
    store: &S,
    slot: Slot,
    id: DriverId,
) -> Result<Driver, RosterError<S::Error>>
where
    S: RosterStore + Sync,
{
    let driver = store
        .find_driver(id)
        .await
        .map_err(RosterError::Store)?
        .ok_or_else(|| CoreError::not_found(slot))?;
    if driver.team_id.is_some() {
        return Err(CoreError::already_in_team(slot).into());
    }
    Ok(driver)
}

/// AssignDriver: checks `id` and links it to `team`.
pub async fn assign_driver<S>(
    store: &S,
    team: TeamId,
    slot: Slot,
    id: DriverId,
) -> Result<(), RosterError<S::Error>>
where
    S: RosterStore + Sync,
{
    check_assignable(store, slot, id).await?;
    store.link_driver(id, team).await.map_err(RosterError::Store)
}

/// Computes the plan that turns the roster of `team` into `slots`.
///
/// `team` is `None` for a team that has not been inserted yet, which has no
/// members. Nothing is written here.
pub async fn plan_roster<S>(
    store: &S,
    team: Option<TeamId>,
    slots: &RosterSlots,
) -> Result<RosterPlan, RosterError<S::Error>>
where
    S: RosterStore + Sync,
{
    let members = match team {
        Some(team) => store.team_members(team).await.map_err(RosterError::Store)?,
        None => Vec::new(),
    };

    let unlink: Vec<DriverId> = members
        .iter()
        .filter(|member| !slots.contains(member.id))
        .map(|member| member.id)
        .collect();

    let mut link = Vec::new();
    for (slot, id) in slots.entries() {
        if members.iter().any(|member| member.id == id) {
            continue;
        }
        check_assignable(store, slot, id).await?;
        link.push(id);
    }

    debug_assert!(members.len() - unlink.len() + link.len() <= MAX_ROSTER_SIZE);
    Ok(RosterPlan { unlink, link })
}

/// UpdateTeamRoster: plans and applies in one go.
pub async fn update_team_roster<S>(
    store: &S,
    team: TeamId,
    slots: &RosterSlots,
) -> Result<RosterPlan, RosterError<S::Error>>
where
    S: RosterStore + Sync,
{
    let plan = plan_roster(store, Some(team), slots).await?;
    plan.apply(store, team).await?;
    Ok(plan)
}

/// DeleteTeam: unlinks every member, then removes the row. Returns the number
/// of drivers released.
pub async fn delete_team<S>(store: &S, team: TeamId) -> Result<usize, RosterError<S::Error>>
where
    S: RosterStore + Sync,
{
    let members = store.team_members(team).await.map_err(RosterError::Store)?;
    for member in &members {
        store.unlink_driver(member.id).await.map_err(RosterError::Store)?;
    }
    store.remove_team(team).await.map_err(RosterError::Store)?;
    Ok(members.len())
}

/// DeleteDriver: the team side holds no state, so there is nothing to cascade.
pub async fn delete_driver<S>(store: &S, driver: DriverId) -> Result<(), RosterError<S::Error>>
where
    S: RosterStore + Sync,
{
    store.remove_driver(driver).await.map_err(RosterError::Store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    fn conflict_message<E: std::fmt::Debug>(result: Result<impl std::fmt::Debug, RosterError<E>>) -> String {
        match result {
            Err(RosterError::Rule(rule)) => rule.to_string(),
            other => panic!("expected a business-rule failure, got {other:?}"),
        }
    }

    #[test]
    fn slots_collapse_duplicate_ids() {
        let slots = RosterSlots::new(Some(4), Some(4));
        assert_eq!(slots.entries(), vec![(Slot::Driver1, 4)]);

        let slots = RosterSlots::new(None, Some(7));
        assert_eq!(slots.entries(), vec![(Slot::Driver2, 7)]);
    }

    #[tokio::test]
    async fn assign_links_a_free_driver() {
        let store = MemoryStore::default();
        let team = store.add_team();
        let hamilton = store.add_driver("Hamilton");

        assign_driver(&store, team, Slot::Driver1, hamilton).await.unwrap();

        assert_eq!(store.team_of(hamilton), Some(team));
        assert_eq!(store.roster(team), vec![hamilton]);
    }

    #[tokio::test]
    async fn assign_rejects_missing_driver() {
        let store = MemoryStore::default();
        let team = store.add_team();

        let message = conflict_message(assign_driver(&store, team, Slot::Driver2, 9999).await);
        assert_eq!(message, "Driver2 not found");
        assert!(store.roster(team).is_empty());
    }

    #[tokio::test]
    async fn assign_rejects_driver_on_another_team() {
        let store = MemoryStore::default();
        let team_a = store.add_team();
        let team_b = store.add_team();
        let driver = store.add_driver("Russell");
        assign_driver(&store, team_a, Slot::Driver1, driver).await.unwrap();

        let message = conflict_message(assign_driver(&store, team_b, Slot::Driver1, driver).await);

        assert_eq!(message, "Driver1 is already a part of a team");
        assert_eq!(store.roster(team_a), vec![driver]);
        assert!(store.roster(team_b).is_empty());
    }

    #[tokio::test]
    async fn failing_slot_leaves_roster_untouched() {
        let store = MemoryStore::default();
        let team = store.add_team();
        let first = store.add_driver("Norris");
        let second = store.add_driver("Piastri");
        update_team_roster(&store, team, &RosterSlots::new(Some(first), None))
            .await
            .unwrap();

        // Driver2 does not exist: the removal of `first` must not happen either.
        let result =
            update_team_roster(&store, team, &RosterSlots::new(Some(second), Some(4242))).await;

        assert_eq!(conflict_message(result), "Driver2 not found");
        assert_eq!(store.roster(team), vec![first]);
        assert_eq!(store.team_of(second), None);
    }

    #[tokio::test]
    async fn update_swaps_members() {
        let store = MemoryStore::default();
        let team = store.add_team();
        let a = store.add_driver("Alonso");
        let b = store.add_driver("Stroll");
        let c = store.add_driver("Vettel");
        update_team_roster(&store, team, &RosterSlots::new(Some(a), Some(b)))
            .await
            .unwrap();

        let plan = update_team_roster(&store, team, &RosterSlots::new(Some(a), Some(c)))
            .await
            .unwrap();

        assert_eq!(plan.unlinks(), &[b]);
        assert_eq!(plan.links(), &[c]);
        assert_eq!(store.roster(team), vec![a, c]);
        assert_eq!(store.team_of(b), None);
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let store = MemoryStore::default();
        let team = store.add_team();
        let a = store.add_driver("Leclerc");
        let b = store.add_driver("Sainz");
        let slots = RosterSlots::new(Some(a), Some(b));

        update_team_roster(&store, team, &slots).await.unwrap();
        let first = store.roster(team);
        let second_plan = update_team_roster(&store, team, &slots).await.unwrap();

        assert!(second_plan.is_noop());
        assert_eq!(store.roster(team), first);
    }

    #[tokio::test]
    async fn empty_slots_release_everyone() {
        let store = MemoryStore::default();
        let team = store.add_team();
        let a = store.add_driver("Ocon");
        update_team_roster(&store, team, &RosterSlots::new(Some(a), None))
            .await
            .unwrap();

        update_team_roster(&store, team, &RosterSlots::default()).await.unwrap();

        assert!(store.roster(team).is_empty());
        assert_eq!(store.team_of(a), None);
    }

    #[tokio::test]
    async fn plan_for_new_team_checks_every_slot_first() {
        let store = MemoryStore::default();
        let hamilton = store.add_driver("Hamilton");

        let result = plan_roster(&store, None, &RosterSlots::new(Some(hamilton), Some(9999))).await;

        assert_eq!(conflict_message(result), "Driver2 not found");
        assert_eq!(store.team_of(hamilton), None);
    }

    #[tokio::test]
    async fn delete_team_releases_members_first() {
        let store = MemoryStore::default();
        let team = store.add_team();
        let a = store.add_driver("Bottas");
        let b = store.add_driver("Zhou");
        update_team_roster(&store, team, &RosterSlots::new(Some(a), Some(b)))
            .await
            .unwrap();

        let released = delete_team(&store, team).await.unwrap();

        assert_eq!(released, 2);
        assert!(!store.has_team(team));
        assert_eq!(store.team_of(a), None);
        assert_eq!(store.team_of(b), None);
        store.assert_consistent();
    }

    #[tokio::test]
    async fn delete_driver_needs_no_cascade() {
        let store = MemoryStore::default();
        let team = store.add_team();
        let a = store.add_driver("Gasly");
        assign_driver(&store, team, Slot::Driver1, a).await.unwrap();

        delete_driver(&store, a).await.unwrap();

        assert!(store.roster(team).is_empty());
        store.assert_consistent();
    }

    #[tokio::test]
    async fn rosters_never_exceed_two_members() {
        let store = MemoryStore::default();
        let teams: Vec<_> = (0..3).map(|_| store.add_team()).collect();
        let drivers: Vec<_> = (0..6).map(|i| store.add_driver(&format!("D{i}"))).collect();

        // Every combination of slot pairs, applied in sequence to every team.
        for &team in &teams {
            for &d1 in &drivers {
                for &d2 in &drivers {
                    let _ = update_team_roster(&store, team, &RosterSlots::new(Some(d1), Some(d2)))
                        .await;
                    store.assert_consistent();
                }
            }
        }
    }
}
