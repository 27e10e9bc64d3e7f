use super::{lenient_number, required_id};
use crate::{
    AppState,
    envelope::ApiResponse,
    error::AppError,
    validation::{self, FieldErrors},
};
use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use core_types::{NewRace, Race, RaceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// The JSON payload of Add and Update.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaceForm {
    #[serde(default, alias = "ID", deserialize_with = "lenient_number")]
    pub id: Option<RaceId>,
    #[validate(length(
        max = 200,
        message = "The field WinnerName must be a string with a maximum length of 200."
    ))]
    pub winner_name: Option<String>,
    #[validate(length(
        max = 200,
        message = "The field WinnerTime must be a string with a maximum length of 200."
    ))]
    pub winner_time: Option<String>,
    #[validate(length(
        max = 200,
        message = "The field GrandPrix must be a string with a maximum length of 200."
    ))]
    pub grand_prix: Option<String>,
    #[serde(default, alias = "lapCount", deserialize_with = "lenient_number")]
    pub number_of_laps: Option<i32>,
}

impl RaceForm {
    fn into_new_race(self) -> NewRace {
        NewRace {
            winner_name: self.winner_name,
            winner_time: self.winner_time,
            grand_prix: self.grand_prix,
            number_of_laps: self.number_of_laps,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceView {
    pub id: RaceId,
    pub winner_name: Option<String>,
    pub winner_time: Option<String>,
    pub grand_prix: Option<String>,
    pub number_of_laps: Option<i32>,
}

impl From<Race> for RaceView {
    fn from(race: Race) -> Self {
        Self {
            id: race.id,
            winner_name: race.winner_name,
            winner_time: race.winner_time,
            grand_prix: race.grand_prix,
            number_of_laps: race.number_of_laps,
        }
    }
}

/// # POST /api/Race/Add
pub async fn add_race(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(race), _): WithRejection<Json<RaceForm>, AppError>,
) -> Result<ApiResponse<bool>, AppError> {
    validation::validate(&race, FieldErrors::default())?;

    let stored = state.db_repo.insert_race(&race.into_new_race()).await?;

    tracing::info!(race_id = stored.id, "Race added.");
    Ok(ApiResponse::ok("Race added successfully", true))
}

/// # PUT /api/Race/Update
pub async fn update_race(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(race), _): WithRejection<Json<RaceForm>, AppError>,
) -> Result<ApiResponse<bool>, AppError> {
    let mut errors = FieldErrors::default();
    errors.require("id", "ID", &race.id);
    validation::validate(&race, errors)?;
    let id = required_id(race.id)?;

    state
        .db_repo
        .update_race(id, &race.into_new_race())
        .await?
        .ok_or_else(|| AppError::not_found("Race"))?;

    tracing::info!(race_id = id, "Race updated.");
    Ok(ApiResponse::ok("Race updated successfully", true))
}

/// # GET /api/Race/Get
pub async fn get_races(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<RaceView>>, AppError> {
    let races = state.db_repo.list_races().await?;
    Ok(ApiResponse::fetched(races.into_iter().map(RaceView::from).collect()))
}

/// # DELETE /api/Race/Delete/:id
pub async fn delete_race(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<RaceId>, AppError>,
) -> Result<ApiResponse<bool>, AppError> {
    if !state.db_repo.delete_race(id).await? {
        return Err(AppError::not_found("Race"));
    }

    tracing::info!(race_id = id, "Race deleted.");
    Ok(ApiResponse::ok("Race deleted successfully", true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_accepts_lap_count_alias_and_string_numbers() {
        let form: RaceForm = serde_json::from_str(
            r#"{"id": "4", "winnerName": "Verstappen", "grandPrix": "Monaco", "lapCount": "78"}"#,
        )
        .unwrap();
        assert_eq!(form.id, Some(4));
        assert_eq!(form.number_of_laps, Some(78));
        assert_eq!(form.winner_name.as_deref(), Some("Verstappen"));
        assert_eq!(form.winner_time, None);
    }

    #[test]
    fn long_fields_fail_the_gate() {
        let form = RaceForm {
            grand_prix: Some("x".repeat(201)),
            ..RaceForm::default()
        };
        let err = validation::validate(&form, FieldErrors::default()).unwrap_err();
        match err {
            AppError::Validation(messages) => assert_eq!(
                messages,
                vec!["The field GrandPrix must be a string with a maximum length of 200."]
            ),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }
}
