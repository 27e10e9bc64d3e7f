use super::required_id;
use crate::{
    AppState,
    envelope::ApiResponse,
    error::AppError,
    extract::{FormData, RequestOrigin},
    validation::{self, FieldErrors},
};
use attachments::{ImageCategory, PublicOrigin, Upload};
use axum::extract::{Path, State};
use axum_extra::extract::WithRejection;
use core_types::{Driver, DriverId, NewTeam, Team, TeamId};
use roster::RosterSlots;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

/// The multipart payload of Add and Update. The slots accept both the
/// `driver1ID` and the short `driver1` field names.
#[derive(Debug, Default, Validate)]
pub struct TeamForm {
    #[validate(
        required(message = "The Manufacturer field is required."),
        length(
            max = 500,
            message = "The field Manufacturer must be a string with a maximum length of 500."
        )
    )]
    pub manufacturer: Option<String>,
    pub driver1: Option<DriverId>,
    pub driver2: Option<DriverId>,
    pub image: Option<Upload>,
}

impl TeamForm {
    fn read(mut form: FormData, errors: &mut FieldErrors) -> Self {
        Self {
            manufacturer: form.non_blank(&["manufacturer"]),
            driver1: errors.parse("driver1", "Driver1ID", form.text(&["driver1ID", "driver1"])),
            driver2: errors.parse("driver2", "Driver2ID", form.text(&["driver2ID", "driver2"])),
            image: form.take_image(),
        }
    }

    fn slots(&self) -> RosterSlots {
        RosterSlots::new(self.driver1, self.driver2)
    }
}

/// A team with its roster flattened into two positional slots.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub id: TeamId,
    pub manufacturer: String,
    pub image: Option<String>,
    #[serde(rename = "driver1ID")]
    pub driver1_id: Option<DriverId>,
    pub driver1_name: Option<String>,
    #[serde(rename = "driver2ID")]
    pub driver2_id: Option<DriverId>,
    pub driver2_name: Option<String>,
}

impl TeamView {
    /// `members` must be ordered by driver id; the first two fill the slots.
    pub fn new(team: Team, members: Vec<Driver>, origin: &PublicOrigin) -> Self {
        let mut members = members.into_iter();
        let first = members.next();
        let second = members.next();
        Self {
            id: team.id,
            manufacturer: team.manufacturer,
            image: origin.rehydrate(ImageCategory::Team, team.image),
            driver1_id: first.as_ref().map(|d| d.id),
            driver1_name: first.map(|d| d.name),
            driver2_id: second.as_ref().map(|d| d.id),
            driver2_name: second.map(|d| d.name),
        }
    }
}

/// # POST /api/Team/Add
///
/// Every slot is checked before the image is written or the team inserted,
/// so a rejected request leaves no trace.
pub async fn add_team(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<ApiResponse<bool>, AppError> {
    let mut errors = FieldErrors::default();
    let team = TeamForm::read(form, &mut errors);
    validation::validate(&team, errors)?;

    let plan = roster::plan_roster(&state.db_repo, None, &team.slots()).await?;
    let image = state
        .attachments
        .store(ImageCategory::Team, team.image.as_ref())
        .await?;
    let stored = state
        .db_repo
        .insert_team(&NewTeam {
            manufacturer: team.manufacturer.unwrap_or_default(),
            image,
        })
        .await?;
    plan.apply(&state.db_repo, stored.id).await?;

    tracing::info!(team_id = stored.id, drivers = plan.links().len(), "Team added.");
    Ok(ApiResponse::ok("Team added successfully", true))
}

/// # PUT /api/Team/Update
///
/// Drivers missing from the submitted slots are released; new ones must be
/// free.
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<ApiResponse<bool>, AppError> {
    let mut errors = FieldErrors::default();
    let id = errors.parse::<TeamId>("id", "ID", form.text(&["id"]));
    errors.require("id", "ID", &id);
    let team = TeamForm::read(form, &mut errors);
    validation::validate(&team, errors)?;
    let id = required_id(id)?;

    if state.db_repo.find_team(id).await?.is_none() {
        return Err(AppError::not_found("Team"));
    }

    let plan = roster::plan_roster(&state.db_repo, Some(id), &team.slots()).await?;
    let image = state
        .attachments
        .store(ImageCategory::Team, team.image.as_ref())
        .await?;
    state
        .db_repo
        .update_team(
            id,
            &NewTeam {
                manufacturer: team.manufacturer.unwrap_or_default(),
                image,
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("Team"))?;
    plan.apply(&state.db_repo, id).await?;

    tracing::info!(
        team_id = id,
        released = plan.unlinks().len(),
        linked = plan.links().len(),
        "Team updated."
    );
    Ok(ApiResponse::ok("Team updated successfully", true))
}

/// # GET /api/Team/Get
pub async fn get_teams(
    State(state): State<Arc<AppState>>,
    RequestOrigin(origin): RequestOrigin,
) -> Result<ApiResponse<Vec<TeamView>>, AppError> {
    let teams = state.db_repo.list_teams().await?;

    let mut rosters: HashMap<TeamId, Vec<Driver>> = HashMap::new();
    for driver in state.db_repo.assigned_drivers().await? {
        if let Some(team_id) = driver.team_id {
            rosters.entry(team_id).or_default().push(driver);
        }
    }

    let views = teams
        .into_iter()
        .map(|team| {
            let members = rosters.remove(&team.id).unwrap_or_default();
            TeamView::new(team, members, &origin)
        })
        .collect();
    Ok(ApiResponse::fetched(views))
}

/// # DELETE /api/Team/Delete/:id
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<TeamId>, AppError>,
) -> Result<ApiResponse<bool>, AppError> {
    if state.db_repo.find_team(id).await?.is_none() {
        return Err(AppError::not_found("Team"));
    }
    let released = roster::delete_team(&state.db_repo, id).await?;

    tracing::info!(team_id = id, released, "Team deleted.");
    Ok(ApiResponse::ok("Team deleted successfully", true))
}
