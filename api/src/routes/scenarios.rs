use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/scenarios", get(list_scenarios))
}

#[derive(sqlx::FromRow, Serialize, ToSchema)]
pub struct Scenario {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

/// List the seeded practice scenarios
#[utoipa::path(
    get,
    path = "/api/scenarios",
    responses(
        (status = 200, description = "Available practice scenarios", body = Vec<Scenario>)
    ),
    tag = "scenarios"
)]
pub async fn list_scenarios(
    State(state): State<AppState>,
) -> Result<Json<Vec<Scenario>>, AppError> {
    let rows = sqlx::query_as::<_, Scenario>(
        "SELECT id, title, description FROM scenarios ORDER BY id ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}
