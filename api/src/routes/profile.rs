use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use speakcoach_core::profile::MovingAverages;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::state::{AppState, DEFAULT_USER_ID};
use crate::store::load_or_create_profile;

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

#[derive(Deserialize, IntoParams)]
pub struct ProfileQuery {
    /// Defaults to the single-learner user
    pub user_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub level: i64,
    pub target_cefr: String,
    pub sessions_count: i64,
    pub ma: MovingAverages,
}

/// Current skill profile for the dashboard
#[utoipa::path(
    get,
    path = "/api/profile",
    params(ProfileQuery),
    responses(
        (status = 200, description = "Skill profile (created lazily on first access)", body = ProfileResponse)
    ),
    tag = "profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = query.user_id.unwrap_or(DEFAULT_USER_ID);
    let profile = load_or_create_profile(&state.db, user_id).await?;

    Ok(Json(ProfileResponse {
        user_id: profile.user_id,
        level: profile.level,
        target_cefr: profile.target_cefr.clone(),
        sessions_count: profile.sessions_count,
        ma: MovingAverages::from(&profile),
    }))
}
