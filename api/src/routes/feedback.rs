use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use speakcoach_core::metrics::{DialogueTurn, ObjectiveMetrics, objective_metrics};
use speakcoach_core::scores::{ScoreSet, extract_structured_block, normalize_feedback};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::groq::message;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/feedback", post(feedback))
}

/// Only the tail of long dialogues is sent for assessment.
const ASSESSED_TURNS: usize = 40;

const EXAMINER_PROMPT: &str = concat!(
    "You are an impartial English speaking examiner.\n",
    "Evaluate ONLY the USER's performance across this session.\n",
    "Return STRICT JSON with EXACT keys (no prose, no code fences):\n",
    "{\n",
    "  \"scores\": {\n",
    "    \"pronunciation\": number 0-10,\n",
    "    \"grammar\": number 0-10,\n",
    "    \"fluency\": number 0-10,\n",
    "    \"vocabulary\": number 0-10,\n",
    "    \"coherence\": number 0-10,\n",
    "    \"overall\": number 0-10\n",
    "  },\n",
    "  \"descriptors\": {\n",
    "    \"pronunciation\": \"1-2 sentences (segmentals/suprasegmentals/intelligibility)\",\n",
    "    \"grammar\": \"1-2 sentences (range & accuracy; common errors)\",\n",
    "    \"fluency\": \"1-2 sentences (rate, pauses, self-correction)\",\n",
    "    \"vocabulary\": \"1-2 sentences (range/precision/collocations)\",\n",
    "    \"coherence\": \"1-2 sentences (organization, cohesion, discourse markers)\"\n",
    "  },\n",
    "  \"comment\": \"One concise paragraph with strengths + 2-3 specific improvements\",\n",
    "  \"standards\": {\"rubric\": \"CEFR-aligned v1\", \"notes\": \"Descriptors adapted/operationalized for automated rating\"}\n",
    "}\n",
    "Do NOT add any text outside JSON.",
);

#[derive(Deserialize, ToSchema)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub messages: Vec<DialogueTurn>,
    #[serde(default)]
    pub duration_min: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub scores: ScoreSet,
    pub descriptors: Value,
    pub comment: String,
    pub standards: Value,
    pub objective_metrics: ObjectiveMetrics,
}

fn empty_descriptors() -> Value {
    json!({
        "pronunciation": "",
        "grammar": "",
        "fluency": "",
        "vocabulary": "",
        "coherence": "",
    })
}

fn default_standards() -> Value {
    json!({"rubric": "CEFR-aligned v1", "notes": ""})
}

/// Assemble the response from raw model output. Separated from the handler
/// so parse/degrade behavior is testable without a provider.
fn build_feedback_response(
    content: &str,
    turns: &[DialogueTurn],
    duration_min: Option<f64>,
) -> FeedbackResponse {
    let metrics = objective_metrics(turns, duration_min);

    let parsed = serde_json::from_str::<Value>(content)
        .ok()
        .filter(Value::is_object)
        .or_else(|| extract_structured_block(content));

    let Some(parsed) = parsed else {
        // Malformed model output is never an error: degrade to zeroed
        // scores with the raw text as comment so the session survives.
        let comment = if content.is_empty() {
            "No structured feedback could be parsed.".to_string()
        } else {
            content.to_string()
        };
        return FeedbackResponse {
            scores: ScoreSet::zeroed(),
            descriptors: empty_descriptors(),
            comment,
            standards: default_standards(),
            objective_metrics: metrics,
        };
    };

    let normalized = normalize_feedback(&parsed);
    let descriptors = parsed
        .get("descriptors")
        .cloned()
        .unwrap_or_else(empty_descriptors);
    let standards = parsed
        .get("standards")
        .cloned()
        .unwrap_or_else(default_standards);

    FeedbackResponse {
        scores: normalized.scores,
        descriptors,
        comment: normalized.comment,
        standards,
        objective_metrics: metrics,
    }
}

/// Final session assessment: model scores plus objective transcript metrics
///
/// The examiner is asked for strict JSON; anything less structured runs
/// through the block extractor, and a total parse failure degrades to a
/// zeroed default rather than failing the request.
#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Normalized scores, descriptors, and objective metrics", body = FeedbackResponse),
        (status = 502, description = "Provider failure", body = speakcoach_core::error::ApiError)
    ),
    tag = "conversation"
)]
pub async fn feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let tail_start = req.messages.len().saturating_sub(ASSESSED_TURNS);
    let turns = &req.messages[tail_start..];

    let mut messages: Vec<Value> = Vec::with_capacity(turns.len() + 1);
    messages.push(message("system", EXAMINER_PROMPT));
    messages.extend(turns.iter().map(|m| message(&m.role, &m.content)));

    let content = state
        .groq
        .chat(&messages, 0.2, true)
        .await
        .map_err(|e| AppError::upstream("groq_feedback_failed", e))?;

    Ok(Json(build_feedback_response(
        &content,
        turns,
        req.duration_min,
    )))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use speakcoach_core::metrics::DialogueTurn;

    use super::build_feedback_response;

    fn turns() -> Vec<DialogueTurn> {
        vec![DialogueTurn {
            role: "user".to_string(),
            content: "um I think I think I went to the market.".to_string(),
        }]
    }

    #[test]
    fn strict_json_is_normalized() {
        let content = r#"{"scores":{"pronunciation":8,"grammar":6,"fluency":7,"vocabulary":9},"comment":"good"}"#;
        let resp = build_feedback_response(content, &turns(), Some(2.0));
        assert_eq!(resp.scores.overall, 7.5);
        assert_eq!(resp.comment, "good");
        assert_eq!(resp.objective_metrics.total_words, 10);
        assert_eq!(resp.objective_metrics.speech_rate_wpm, Some(5.0));
    }

    #[test]
    fn fenced_output_still_parses() {
        let content = "Sure!\n```json\n{\"scores\":{\"grammar\":7}}\n```";
        let resp = build_feedback_response(content, &turns(), None);
        assert_eq!(resp.scores.grammar, 7.0);
    }

    #[test]
    fn descriptors_and_standards_pass_through() {
        let content = r#"{"scores":{"grammar":7},"descriptors":{"grammar":"solid"},"standards":{"rubric":"CEFR-aligned v1","notes":"x"}}"#;
        let resp = build_feedback_response(content, &turns(), None);
        assert_eq!(resp.descriptors["grammar"], json!("solid"));
        assert_eq!(resp.standards["notes"], json!("x"));
    }

    #[test]
    fn unparseable_output_degrades_to_defaults() {
        let resp = build_feedback_response("just vibes, no structure", &turns(), None);
        assert_eq!(resp.scores.overall, 0.0);
        assert_eq!(resp.scores.coherence, Some(0.0));
        assert_eq!(resp.comment, "just vibes, no structure");
        // objective metrics still computed
        assert_eq!(resp.objective_metrics.total_words, 10);
    }

    #[test]
    fn empty_output_gets_placeholder_comment() {
        let resp = build_feedback_response("", &turns(), None);
        assert_eq!(resp.comment, "No structured feedback could be parsed.");
    }
}
