use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use speakcoach_core::memory::{
    DEFAULT_WEIGHT, DESCRIPTION_MAX_CHARS, SUMMARY_MAX_CHARS, join_examples, join_vocab_items,
    normalize_tag, normalize_topic, parse_weight, truncate_chars,
};
use speakcoach_core::metrics::DialogueTurn;
use speakcoach_core::planner::{practice_prompt, scenario_for, weakest_focus};
use speakcoach_core::profile::SkillProfile;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::groq::message;
use crate::state::{AppState, DEFAULT_USER_ID};
use crate::store::{load_or_create_profile, persist_profile};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agent/next", get(next_item))
        .route("/agent/complete", post(complete_item))
        .route("/agent/reflect", post(reflect))
        .route("/agent/plan", post(generate_plan))
}

const REFLECT_TURNS: usize = 60;
const ERROR_PATTERNS_MAX: usize = 5;
const VOCAB_TARGETS_MAX: usize = 2;
const OBJECTIVES_MAX: usize = 5;
const PLAN_OBJECTIVES_MAX: usize = 6;

// ---- next item ----

#[derive(Deserialize, IntoParams)]
pub struct NextQuery {
    pub user_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct NextItemResponse {
    pub item_id: i64,
    pub scenario: String,
    pub level: i64,
    pub prompt: String,
}

#[derive(sqlx::FromRow)]
struct PlanItemRow {
    id: i64,
    scenario: String,
    level: i64,
    prompt: String,
}

/// The single active plan for a user, created lazily with a default title
/// and goal when none exists.
async fn resolve_active_plan(pool: &sqlx::SqlitePool, user_id: i64) -> Result<i64, AppError> {
    let existing = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM plans
        WHERE user_id = ? AND active = 1
        ORDER BY start_date DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if let Some(plan_id) = existing {
        return Ok(plan_id);
    }

    let plan_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO plans (user_id, title, goal_text, start_date, active)
        VALUES (?, 'Auto Plan', 'Improve speaking skills adaptively.', ?, 1)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(plan_id)
}

/// Oldest not-done item if the queue is non-empty; otherwise synthesize one
/// from the profile and append it at max(order_idx)+1. Items are only ever
/// appended or flipped done, never reordered or deleted.
async fn resolve_next_item(
    pool: &sqlx::SqlitePool,
    profile: &SkillProfile,
    plan_id: i64,
) -> Result<PlanItemRow, AppError> {
    let pending = sqlx::query_as::<_, PlanItemRow>(
        r#"
        SELECT id, scenario, level, prompt FROM plan_items
        WHERE plan_id = ? AND done = 0
        ORDER BY order_idx ASC
        LIMIT 1
        "#,
    )
    .bind(plan_id)
    .fetch_optional(pool)
    .await?;

    if let Some(item) = pending {
        return Ok(item);
    }

    let focus = weakest_focus(profile);
    let scenario = scenario_for(focus);
    let prompt = practice_prompt(focus, profile.level);

    let last_idx = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(order_idx), -1) FROM plan_items WHERE plan_id = ?",
    )
    .bind(plan_id)
    .fetch_one(pool)
    .await?;

    let item = sqlx::query_as::<_, PlanItemRow>(
        r#"
        INSERT INTO plan_items (plan_id, order_idx, scenario, focus, level, prompt, done)
        VALUES (?, ?, ?, ?, ?, ?, 0)
        RETURNING id, scenario, level, prompt
        "#,
    )
    .bind(plan_id)
    .bind(last_idx + 1)
    .bind(scenario)
    .bind(focus.tag())
    .bind(profile.level)
    .bind(&prompt)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

/// Next practice item for the adaptive queue
///
/// Plan resolution and the possible append run inside the per-user critical
/// section; two concurrent calls cannot both observe an empty queue and
/// append duplicates.
#[utoipa::path(
    get,
    path = "/api/agent/next",
    params(NextQuery),
    responses(
        (status = 200, description = "Pending or freshly queued practice item", body = NextItemResponse)
    ),
    tag = "agent"
)]
pub async fn next_item(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> Result<Json<NextItemResponse>, AppError> {
    let user_id = query.user_id.unwrap_or(DEFAULT_USER_ID);
    let _guard = state.locks.acquire(user_id).await;

    let profile = load_or_create_profile(&state.db, user_id).await?;
    let plan_id = resolve_active_plan(&state.db, user_id).await?;
    let item = resolve_next_item(&state.db, &profile, plan_id).await?;

    Ok(Json(NextItemResponse {
        item_id: item.id,
        scenario: item.scenario,
        level: item.level,
        prompt: item.prompt,
    }))
}

// ---- complete item ----

#[derive(Deserialize, ToSchema)]
pub struct CompleteRequest {
    pub item_id: i64,
    #[serde(default = "default_done")]
    pub done: bool,
}

fn default_done() -> bool {
    true
}

#[derive(Serialize, ToSchema)]
pub struct CompletedItem {
    pub id: i64,
    pub done: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CompleteResponse {
    pub ok: bool,
    pub item: CompletedItem,
}

async fn set_item_done(
    pool: &sqlx::SqlitePool,
    item_id: i64,
    done: bool,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE plan_items SET done = ? WHERE id = ?")
        .bind(done)
        .bind(item_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound {
            resource: format!("plan item {item_id}"),
        });
    }
    Ok(())
}

/// Mark a practice item done (idempotent)
#[utoipa::path(
    post,
    path = "/api/agent/complete",
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Item state after the flip", body = CompleteResponse),
        (status = 404, description = "No such item", body = speakcoach_core::error::ApiError)
    ),
    tag = "agent"
)]
pub async fn complete_item(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    set_item_done(&state.db, req.item_id, req.done).await?;

    Ok(Json(CompleteResponse {
        ok: true,
        item: CompletedItem {
            id: req.item_id,
            done: req.done,
        },
    }))
}

// ---- reflect ----

#[derive(Deserialize, ToSchema)]
pub struct ReflectRequest {
    #[serde(default)]
    pub messages: Vec<DialogueTurn>,
    #[serde(default)]
    pub feedback: Value,
    #[serde(default = "default_user_id")]
    pub user_id: i64,
}

fn default_user_id() -> i64 {
    DEFAULT_USER_ID
}

#[derive(Serialize, ToSchema)]
pub struct ReflectResponse {
    pub summary: String,
    pub error_patterns: Vec<Value>,
    pub vocab_targets: Vec<Value>,
    pub objectives_next: Vec<String>,
}

const CRITIC_PROMPT: &str = concat!(
    "You are an English speaking coach (critic). Return STRICT JSON only:\n",
    "{\n",
    "  \"summary\": \"3-5 sentences recap\",\n",
    "  \"error_patterns\": [\n",
    "    {\"tag\":\"articles|tense|word_stress|prepositions|run_on|filler\",\n",
    "     \"description\":\"short explanation\",\n",
    "     \"examples\":[\"wrong -> better\",\"...\"],\n",
    "     \"weight\": 0..3}\n",
    "  ],\n",
    "  \"vocab_targets\": [{\"topic\":\"job_interview\",\"items\":[\"term1\",\"term2\",\"term3\"]}],\n",
    "  \"objectives_next\": [\"objective1\",\"objective2\"]\n",
    "}\n",
    "No extra text.",
);

fn string_items(value: Option<&Value>, cap: usize) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(cap)
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Level from loosely-typed model output; float-typed values truncate
/// instead of being discarded.
fn plan_level(value: Option<&Value>, fallback: i64) -> i64 {
    value
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(fallback)
}

fn value_items(value: Option<&Value>, cap: usize) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().take(cap).cloned().collect())
        .unwrap_or_default()
}

/// Upsert one error pattern keyed by (user_id, tag). The conditional
/// overwrites ride on COALESCE: absent description/examples/weight keep the
/// stored value, the last-seen timestamp always refreshes.
async fn upsert_error_pattern(
    pool: &sqlx::SqlitePool,
    user_id: i64,
    pattern: &Value,
) -> Result<(), AppError> {
    let tag = normalize_tag(pattern.get("tag").and_then(Value::as_str));
    let description = pattern
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| truncate_chars(d, DESCRIPTION_MAX_CHARS).to_string());
    let examples = pattern
        .get("examples")
        .and_then(Value::as_array)
        .map(|items| join_examples(items));
    let weight = match pattern.get("weight") {
        Some(v) => {
            let parsed = parse_weight(Some(v), f64::NAN);
            (!parsed.is_nan()).then_some(parsed)
        }
        None => None,
    };

    sqlx::query(
        r#"
        INSERT INTO error_patterns (user_id, tag, description, examples, weight, last_seen_at)
        VALUES (?, ?, COALESCE(?, ''), COALESCE(?, ''), COALESCE(?, ?), ?)
        ON CONFLICT(user_id, tag) DO UPDATE SET
            description = COALESCE(?, error_patterns.description),
            examples = COALESCE(?, error_patterns.examples),
            weight = COALESCE(?, error_patterns.weight),
            last_seen_at = excluded.last_seen_at
        "#,
    )
    .bind(user_id)
    .bind(&tag)
    .bind(&description)
    .bind(&examples)
    .bind(weight)
    .bind(DEFAULT_WEIGHT)
    .bind(Utc::now())
    .bind(&description)
    .bind(&examples)
    .bind(weight)
    .execute(pool)
    .await?;
    Ok(())
}

/// Vocab targets are append-only history, never deduplicated by topic.
async fn append_vocab_target(
    pool: &sqlx::SqlitePool,
    user_id: i64,
    target: &Value,
) -> Result<(), AppError> {
    let topic = normalize_topic(target.get("topic").and_then(Value::as_str));
    let items = target
        .get("items")
        .and_then(Value::as_array)
        .map(|items| join_vocab_items(items))
        .unwrap_or_default();

    sqlx::query(
        r#"
        INSERT INTO vocab_targets (user_id, topic, items, due_next, created_at)
        VALUES (?, ?, ?, 1, ?)
        "#,
    )
    .bind(user_id)
    .bind(&topic)
    .bind(&items)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Post-session reflection: critic call plus memory writes
///
/// The provider call runs without any lock held; persistence uses the
/// returned data as plain input afterwards.
#[utoipa::path(
    post,
    path = "/api/agent/reflect",
    request_body = ReflectRequest,
    responses(
        (status = 200, description = "Capped reflection with persisted memory", body = ReflectResponse),
        (status = 502, description = "Provider failure", body = speakcoach_core::error::ApiError)
    ),
    tag = "agent"
)]
pub async fn reflect(
    State(state): State<AppState>,
    Json(req): Json<ReflectRequest>,
) -> Result<Json<ReflectResponse>, AppError> {
    let tail_start = req.messages.len().saturating_sub(REFLECT_TURNS);
    let dialogue: Vec<Value> = req.messages[tail_start..]
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let context = json!({"dialogue": dialogue, "feedback": req.feedback}).to_string();
    let messages = [message("system", CRITIC_PROMPT), message("user", &context)];

    let data = state
        .groq
        .json_chat(&messages, 0.2)
        .await
        .map_err(|e| AppError::upstream("groq_reflect_failed", e))?;

    let summary = data
        .get("summary")
        .and_then(Value::as_str)
        .map(|s| truncate_chars(s, SUMMARY_MAX_CHARS).to_string())
        .unwrap_or_default();
    let error_patterns = value_items(data.get("error_patterns"), ERROR_PATTERNS_MAX);
    let vocab_targets = value_items(data.get("vocab_targets"), VOCAB_TARGETS_MAX);
    let objectives_next = string_items(data.get("objectives_next"), OBJECTIVES_MAX);

    for pattern in &error_patterns {
        upsert_error_pattern(&state.db, req.user_id, pattern).await?;
    }
    for target in &vocab_targets {
        append_vocab_target(&state.db, req.user_id, target).await?;
    }

    tracing::info!(
        user_id = req.user_id,
        error_patterns = error_patterns.len(),
        vocab_targets = vocab_targets.len(),
        "reflection persisted"
    );

    Ok(Json(ReflectResponse {
        summary,
        error_patterns,
        vocab_targets,
        objectives_next,
    }))
}

// ---- plan generation ----

#[derive(Deserialize, ToSchema)]
pub struct PlanRequest {
    #[serde(default = "default_user_id")]
    pub user_id: i64,
    #[serde(default)]
    pub profile: Option<Value>,
    #[serde(default)]
    pub error_patterns: Vec<Value>,
    #[serde(default)]
    pub objectives_next: Vec<String>,
    #[serde(default)]
    pub vocab_targets: Vec<Value>,
}

#[derive(Serialize, ToSchema)]
pub struct PlanResponse {
    pub scenario: String,
    pub level: i64,
    pub objectives: Vec<String>,
    pub rubric: Vec<String>,
    pub starter_turns: Vec<String>,
    pub target_time_min: i64,
}

const PLANNER_PROMPT: &str = concat!(
    "You are a session planner. Produce JSON only:\n",
    "{\n",
    "  \"scenario\":\"Job Interview|Daily Conversation|Business Meeting|Travel Situations|...\",\n",
    "  \"level\": 1..5,\n",
    "  \"objectives\": [\"...\"],\n",
    "  \"rubric\": [\"...\"],\n",
    "  \"starter_turns\": [\"...\"],\n",
    "  \"target_time_min\": 5|7|10\n",
    "}\n",
    "Prioritize weakest skills & recent error patterns; weave 2-3 vocab targets.\n",
    "No extra text.",
);

/// Generate the next session plan from profile and memory context
///
/// Also records a small `last_objectives` trace on the profile, purely for
/// inspection; the trace is never authoritative.
#[utoipa::path(
    post,
    path = "/api/agent/plan",
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Planned session parameters", body = PlanResponse),
        (status = 502, description = "Provider failure", body = speakcoach_core::error::ApiError)
    ),
    tag = "agent"
)]
pub async fn generate_plan(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let stored = load_or_create_profile(&state.db, req.user_id).await?;
    let profile_context = req.profile.clone().unwrap_or_else(|| {
        json!({
            "level": stored.level,
            "ma": {
                "pron": stored.ma_pron,
                "gram": stored.ma_gram,
                "flu": stored.ma_flu,
                "vocab": stored.ma_vocab,
                "overall": stored.ma_overall,
            },
        })
    });

    let context = json!({
        "profile": profile_context,
        "error_patterns": req.error_patterns,
        "objectives_next": req.objectives_next,
        "vocab_targets": req.vocab_targets,
    })
    .to_string();
    let messages = [message("system", PLANNER_PROMPT), message("user", &context)];

    let plan = state
        .groq
        .json_chat(&messages, 0.3)
        .await
        .map_err(|e| AppError::upstream("groq_plan_failed", e))?;

    let objectives = string_items(plan.get("objectives"), PLAN_OBJECTIVES_MAX);

    {
        let _guard = state.locks.acquire(req.user_id).await;
        let mut profile = load_or_create_profile(&state.db, req.user_id).await?;
        profile.last_objectives = Some(objectives.join("\n"));
        persist_profile(&state.db, &profile).await?;
    }

    let fallback_level = plan_level(profile_context.get("level"), stored.level);
    let rubric = {
        let parsed = string_items(plan.get("rubric"), PLAN_OBJECTIVES_MAX);
        if parsed.is_empty() {
            vec![
                "Speak clearly".to_string(),
                "Use correct tense".to_string(),
                "Use 2 specific terms".to_string(),
            ]
        } else {
            parsed
        }
    };
    let starter_turns = {
        let parsed = string_items(plan.get("starter_turns"), 3);
        if parsed.is_empty() {
            vec!["Tell me about your day.".to_string()]
        } else {
            parsed
        }
    };

    Ok(Json(PlanResponse {
        scenario: plan
            .get("scenario")
            .and_then(Value::as_str)
            .unwrap_or("Daily Conversation")
            .to_string(),
        level: plan_level(plan.get("level"), fallback_level),
        objectives,
        rubric,
        starter_turns,
        target_time_min: plan
            .get("target_time_min")
            .and_then(Value::as_i64)
            .unwrap_or(7),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlx::SqlitePool;

    use super::{
        append_vocab_target, plan_level, resolve_active_plan, resolve_next_item, set_item_done,
        upsert_error_pattern,
    };
    use crate::error::AppError;
    use crate::store::{load_or_create_profile, test_pool};

    async fn setup(pool: &SqlitePool) -> (speakcoach_core::profile::SkillProfile, i64) {
        let profile = load_or_create_profile(pool, 1).await.unwrap();
        let plan_id = resolve_active_plan(pool, 1).await.unwrap();
        (profile, plan_id)
    }

    #[test]
    fn plan_level_accepts_float_typed_output() {
        assert_eq!(plan_level(Some(&json!(3.0)), 2), 3);
        assert_eq!(plan_level(Some(&json!(4)), 2), 4);
        assert_eq!(plan_level(Some(&json!("advanced")), 2), 2);
        assert_eq!(plan_level(None, 2), 2);
    }

    #[tokio::test]
    async fn active_plan_is_created_once() {
        let pool = test_pool().await;
        let first = resolve_active_plan(&pool, 1).await.unwrap();
        let second = resolve_active_plan(&pool, 1).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn next_item_is_idempotent_until_completed() {
        let pool = test_pool().await;
        let (profile, plan_id) = setup(&pool).await;

        let first = resolve_next_item(&pool, &profile, plan_id).await.unwrap();
        let second = resolve_next_item(&pool, &profile, plan_id).await.unwrap();
        assert_eq!(first.id, second.id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plan_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        // completing the item frees the queue for a fresh append
        set_item_done(&pool, first.id, true).await.unwrap();
        let third = resolve_next_item(&pool, &profile, plan_id).await.unwrap();
        assert_ne!(third.id, first.id);
    }

    #[tokio::test]
    async fn order_idx_strictly_increases() {
        let pool = test_pool().await;
        let (profile, plan_id) = setup(&pool).await;

        for _ in 0..3 {
            let item = resolve_next_item(&pool, &profile, plan_id).await.unwrap();
            set_item_done(&pool, item.id, true).await.unwrap();
        }

        let indices: Vec<i64> =
            sqlx::query_scalar("SELECT order_idx FROM plan_items ORDER BY id ASC")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn fresh_profile_queues_pronunciation_item() {
        let pool = test_pool().await;
        let (profile, plan_id) = setup(&pool).await;
        let item = resolve_next_item(&pool, &profile, plan_id).await.unwrap();
        // all averages zero: pronunciation wins the tie-break
        assert_eq!(item.scenario, "Daily Conversation");
        assert_eq!(item.level, 2);
        assert!(item.prompt.contains("Focus: pron."));
    }

    #[tokio::test]
    async fn completing_twice_is_a_noop() {
        let pool = test_pool().await;
        let (profile, plan_id) = setup(&pool).await;
        let item = resolve_next_item(&pool, &profile, plan_id).await.unwrap();

        set_item_done(&pool, item.id, true).await.unwrap();
        set_item_done(&pool, item.id, true).await.unwrap();

        let done: bool = sqlx::query_scalar("SELECT done FROM plan_items WHERE id = ?")
            .bind(item.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(done);
    }

    #[tokio::test]
    async fn completing_missing_item_is_not_found() {
        let pool = test_pool().await;
        let err = set_item_done(&pool, 9999, true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn error_pattern_upsert_keeps_one_row_per_tag() {
        let pool = test_pool().await;

        let first = json!({
            "tag": "articles",
            "description": "Drops definite articles",
            "examples": ["I went to store -> I went to the store"],
            "weight": 1.5
        });
        upsert_error_pattern(&pool, 1, &first).await.unwrap();

        let second = json!({
            "tag": "articles",
            "description": "Confuses a/an",
            "weight": "2.5"
        });
        upsert_error_pattern(&pool, 1, &second).await.unwrap();

        let rows: Vec<(String, f64, String)> = sqlx::query_as(
            "SELECT description, weight, examples FROM error_patterns WHERE user_id = 1 AND tag = 'articles'",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "Confuses a/an");
        assert_eq!(rows[0].1, 2.5);
        // examples were not supplied the second time, so the old ones stay
        assert!(rows[0].2.contains("I went to store"));
    }

    #[tokio::test]
    async fn unparsable_weight_keeps_stored_value() {
        let pool = test_pool().await;
        upsert_error_pattern(&pool, 1, &json!({"tag": "tense", "weight": 2.0}))
            .await
            .unwrap();
        upsert_error_pattern(&pool, 1, &json!({"tag": "tense", "weight": "heavy"}))
            .await
            .unwrap();

        let weight: f64 =
            sqlx::query_scalar("SELECT weight FROM error_patterns WHERE tag = 'tense'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(weight, 2.0);
    }

    #[tokio::test]
    async fn missing_weight_defaults_on_insert() {
        let pool = test_pool().await;
        upsert_error_pattern(&pool, 1, &json!({"tag": "filler"}))
            .await
            .unwrap();
        let weight: f64 =
            sqlx::query_scalar("SELECT weight FROM error_patterns WHERE tag = 'filler'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(weight, 1.0);
    }

    #[tokio::test]
    async fn vocab_targets_accumulate_history() {
        let pool = test_pool().await;
        let target = json!({"topic": "job_interview", "items": ["resume", "salary"]});
        append_vocab_target(&pool, 1, &target).await.unwrap();
        append_vocab_target(&pool, 1, &target).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vocab_targets WHERE user_id = 1 AND topic = 'job_interview'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }
}
