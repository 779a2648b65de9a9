use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use speakcoach_core::profile::{MovingAverages, SessionScores};
use speakcoach_core::scores::clamp_score;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::state::{AppState, DEFAULT_USER_ID};
use crate::store::{load_or_create_profile, persist_profile};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(save_session))
        .route("/sessions/recent", get(recent_sessions))
        .route("/sessions/stats", get(session_stats))
}

/// Session-save payload. Scores are loosely typed on purpose: numbers,
/// numeric strings, null, or garbage all coerce through the clamp rather
/// than rejecting the session.
#[derive(Deserialize, ToSchema)]
pub struct SaveSessionRequest {
    pub scenario: String,
    #[serde(default)]
    pub score_overall: Value,
    #[serde(default)]
    pub score_pronunciation: Value,
    #[serde(default)]
    pub score_grammar: Value,
    #[serde(default)]
    pub score_fluency: Value,
    #[serde(default)]
    pub score_vocabulary: Value,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub duration_min: Option<f64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileSummary {
    pub level: i64,
    pub ma: MovingAverages,
    pub sessions_count: i64,
}

#[derive(Serialize, ToSchema)]
pub struct SaveSessionResponse {
    pub id: i64,
    pub saved: bool,
    pub profile: ProfileSummary,
}

/// Append an immutable session record. Never updated or deleted afterwards.
async fn insert_session(
    pool: &sqlx::SqlitePool,
    req: &SaveSessionRequest,
    scores: &SessionScores,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO sessions (scenario, score_overall, score_pronunciation, score_grammar,
                              score_fluency, score_vocabulary, comment, duration_min, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&req.scenario)
    .bind(scores.overall)
    .bind(scores.pronunciation)
    .bind(scores.grammar)
    .bind(scores.fluency)
    .bind(scores.vocabulary)
    .bind(req.comment.as_deref().unwrap_or(""))
    .bind(req.duration_min.unwrap_or(0.0))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Save a completed session and fold it into the skill profile
///
/// The profile read-modify-write (moving averages, session count, level
/// hysteresis) runs inside the per-user critical section so concurrent
/// saves cannot lose updates.
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = SaveSessionRequest,
    responses(
        (status = 200, description = "Session stored and profile updated", body = SaveSessionResponse)
    ),
    tag = "sessions"
)]
pub async fn save_session(
    State(state): State<AppState>,
    Json(req): Json<SaveSessionRequest>,
) -> Result<Json<SaveSessionResponse>, AppError> {
    let scores = SessionScores {
        pronunciation: clamp_score(Some(&req.score_pronunciation)),
        grammar: clamp_score(Some(&req.score_grammar)),
        fluency: clamp_score(Some(&req.score_fluency)),
        vocabulary: clamp_score(Some(&req.score_vocabulary)),
        overall: clamp_score(Some(&req.score_overall)),
    };

    let id = insert_session(&state.db, &req, &scores).await?;

    let user_id = req.user_id.unwrap_or(DEFAULT_USER_ID);
    let _guard = state.locks.acquire(user_id).await;

    let mut profile = load_or_create_profile(&state.db, user_id).await?;
    profile.apply_session(&scores);
    persist_profile(&state.db, &profile).await?;

    tracing::info!(
        user_id,
        session_id = id,
        level = profile.level,
        sessions_count = profile.sessions_count,
        "session saved"
    );

    Ok(Json(SaveSessionResponse {
        id,
        saved: true,
        profile: ProfileSummary {
            level: profile.level,
            ma: MovingAverages::from(&profile),
            sessions_count: profile.sessions_count,
        },
    }))
}

#[derive(Deserialize, IntoParams)]
pub struct RecentQuery {
    /// 1..=50, default 10
    pub limit: Option<i64>,
}

#[derive(sqlx::FromRow, Serialize, ToSchema)]
pub struct RecentSession {
    pub id: i64,
    pub scenario: String,
    pub score_overall: f64,
    pub created_at: DateTime<Utc>,
}

/// Most recent sessions, newest first
#[utoipa::path(
    get,
    path = "/api/sessions/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent sessions", body = Vec<RecentSession>)
    ),
    tag = "sessions"
)]
pub async fn recent_sessions(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<RecentSession>>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    let rows = sqlx::query_as::<_, RecentSession>(
        r#"
        SELECT id, scenario, score_overall, created_at
        FROM sessions
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

#[derive(Serialize, ToSchema)]
pub struct SessionStats {
    pub total_minutes: f64,
    pub total_hours: f64,
    pub sessions_count: i64,
}

/// Aggregate practice time across all sessions
#[utoipa::path(
    get,
    path = "/api/sessions/stats",
    responses(
        (status = 200, description = "Practice totals", body = SessionStats)
    ),
    tag = "sessions"
)]
pub async fn session_stats(State(state): State<AppState>) -> Result<Json<SessionStats>, AppError> {
    let (total_minutes, sessions_count): (f64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(duration_min), 0.0), COUNT(id) FROM sessions",
    )
    .fetch_one(&state.db)
    .await?;

    Ok(Json(SessionStats {
        total_minutes,
        total_hours: (total_minutes / 60.0 * 100.0).round() / 100.0,
        sessions_count,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use speakcoach_core::profile::SessionScores;

    use super::{SaveSessionRequest, insert_session};
    use crate::store::{load_or_create_profile, persist_profile, test_pool};

    fn request(scenario: &str) -> SaveSessionRequest {
        serde_json::from_value(json!({
            "scenario": scenario,
            "score_overall": 7.5,
            "score_pronunciation": "8",
            "score_grammar": 6,
            "score_fluency": 7,
            "score_vocabulary": 9,
            "duration_min": 5.0
        }))
        .unwrap()
    }

    #[test]
    fn loose_score_fields_deserialize() {
        let req: SaveSessionRequest = serde_json::from_value(json!({
            "scenario": "Daily Conversation",
            "score_overall": "not a number"
        }))
        .unwrap();
        assert!(req.score_pronunciation.is_null());
        assert_eq!(req.score_overall, json!("not a number"));
    }

    #[tokio::test]
    async fn session_rows_accumulate_into_stats() {
        let pool = test_pool().await;
        let scores = SessionScores {
            pronunciation: 8.0,
            grammar: 6.0,
            fluency: 7.0,
            vocabulary: 9.0,
            overall: 7.5,
        };
        let first = insert_session(&pool, &request("Daily Conversation"), &scores)
            .await
            .unwrap();
        let second = insert_session(&pool, &request("Job Interview"), &scores)
            .await
            .unwrap();
        assert!(second > first);

        let (minutes, count): (f64, i64) =
            sqlx::query_as("SELECT COALESCE(SUM(duration_min), 0.0), COUNT(id) FROM sessions")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(minutes, 10.0);
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn repeated_sessions_move_profile_through_levels() {
        let pool = test_pool().await;
        let scores = SessionScores {
            pronunciation: 9.0,
            grammar: 9.0,
            fluency: 9.0,
            vocabulary: 9.0,
            overall: 9.0,
        };

        for _ in 0..3 {
            let mut profile = load_or_create_profile(&pool, 1).await.unwrap();
            profile.apply_session(&scores);
            persist_profile(&pool, &profile).await.unwrap();
        }

        let profile = load_or_create_profile(&pool, 1).await.unwrap();
        assert_eq!(profile.sessions_count, 3);
        // three 9.0 sessions: MA is 9.0, promotion gate met once
        assert_eq!(profile.level, 3);
    }
}
