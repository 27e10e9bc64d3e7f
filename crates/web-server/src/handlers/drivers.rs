use super::{lenient_number, required_id};
use crate::{
    AppState,
    envelope::ApiResponse,
    error::AppError,
    extract::{FormData, RequestOrigin},
    validation::{self, FieldErrors},
};
use attachments::{ImageCategory, PublicOrigin, Upload};
use axum::extract::{Path, Query, State};
use axum_extra::extract::WithRejection;
use core_types::{Driver, DriverChanges, DriverId, NewDriver, TeamId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// The multipart payload of Add and Update.
#[derive(Debug, Default, Validate)]
pub struct DriverForm {
    #[validate(
        required(message = "The Name field is required."),
        length(max = 100, message = "The field Name must be a string with a maximum length of 100.")
    )]
    pub name: Option<String>,
    pub age: Option<i32>,
    #[validate(length(
        max = 200,
        message = "The field Nationality must be a string with a maximum length of 200."
    ))]
    pub nationality: Option<String>,
    pub image: Option<Upload>,
}

impl DriverForm {
    fn read(mut form: FormData, errors: &mut FieldErrors) -> Self {
        Self {
            name: form.non_blank(&["name"]),
            age: errors.parse("age", "Age", form.text(&["age"])),
            nationality: form.non_blank(&["nationality"]),
            image: form.take_image(),
        }
    }
}

/// A driver as returned by the read endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverView {
    pub id: DriverId,
    pub name: String,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    /// Absolute URL of the driver's image.
    pub image: Option<String>,
}

impl DriverView {
    pub fn new(driver: Driver, origin: &PublicOrigin) -> Self {
        Self {
            id: driver.id,
            name: driver.name,
            age: driver.age,
            nationality: driver.nationality,
            image: origin.rehydrate(ImageCategory::Driver, driver.image),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverSearch {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverLookup {
    #[serde(
        rename = "teamID",
        alias = "teamId",
        alias = "teamid",
        default,
        deserialize_with = "lenient_number"
    )]
    pub team_id: Option<TeamId>,
}

/// # POST /api/Driver/Add
pub async fn add_driver(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<ApiResponse<bool>, AppError> {
    let mut errors = FieldErrors::default();
    let driver = DriverForm::read(form, &mut errors);
    validation::validate(&driver, errors)?;

    let image = state
        .attachments
        .store(ImageCategory::Driver, driver.image.as_ref())
        .await?;
    let stored = state
        .db_repo
        .insert_driver(&NewDriver {
            name: driver.name.unwrap_or_default(),
            age: driver.age,
            nationality: driver.nationality,
            image,
        })
        .await?;

    tracing::info!(driver_id = stored.id, "Driver added.");
    Ok(ApiResponse::ok("Driver added successfully", true))
}

/// # PUT /api/Driver/Update
/// A new image replaces the reference; the previous file stays on disk.
pub async fn update_driver(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<ApiResponse<bool>, AppError> {
    let mut errors = FieldErrors::default();
    let id = errors.parse::<DriverId>("id", "ID", form.text(&["id"]));
    errors.require("id", "ID", &id);
    let driver = DriverForm::read(form, &mut errors);
    validation::validate(&driver, errors)?;
    let id = required_id(id)?;

    if state.db_repo.find_driver(id).await?.is_none() {
        return Err(AppError::not_found("Driver"));
    }

    let image = state
        .attachments
        .store(ImageCategory::Driver, driver.image.as_ref())
        .await?;
    state
        .db_repo
        .update_driver(
            id,
            &DriverChanges {
                name: driver.name.unwrap_or_default(),
                age: driver.age,
                nationality: driver.nationality,
                image,
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("Driver"))?;

    tracing::info!(driver_id = id, "Driver updated.");
    Ok(ApiResponse::ok("Driver updated successfully", true))
}

/// # GET /api/Driver/Get?search=
pub async fn get_drivers(
    State(state): State<Arc<AppState>>,
    RequestOrigin(origin): RequestOrigin,
    WithRejection(Query(query), _): WithRejection<Query<DriverSearch>, AppError>,
) -> Result<ApiResponse<Vec<DriverView>>, AppError> {
    let drivers = state.db_repo.list_drivers(query.search.as_deref()).await?;
    let views = drivers
        .into_iter()
        .map(|driver| DriverView::new(driver, &origin))
        .collect();
    Ok(ApiResponse::fetched(views))
}

/// # GET /api/Driver/GetDriversLookup?teamID=
/// Drivers selectable for a team: the unassigned ones plus the team's own.
pub async fn get_drivers_lookup(
    State(state): State<Arc<AppState>>,
    RequestOrigin(origin): RequestOrigin,
    WithRejection(Query(query), _): WithRejection<Query<DriverLookup>, AppError>,
) -> Result<ApiResponse<Vec<DriverView>>, AppError> {
    let drivers = state.db_repo.lookup_drivers(query.team_id).await?;
    let views = drivers
        .into_iter()
        .map(|driver| DriverView::new(driver, &origin))
        .collect();
    Ok(ApiResponse::fetched(views))
}

/// # DELETE /api/Driver/Delete/:id
pub async fn delete_driver(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<DriverId>, AppError>,
) -> Result<ApiResponse<bool>, AppError> {
    if state.db_repo.find_driver(id).await?.is_none() {
        return Err(AppError::not_found("Driver"));
    }
    roster::delete_driver(&state.db_repo, id).await?;

    tracing::info!(driver_id = id, "Driver deleted.");
    Ok(ApiResponse::ok("Driver deleted successfully", true))
}
