use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use speakcoach_core::metrics::DialogueTurn;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::groq::message;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/transcribe", post(transcribe))
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Scenario selector; numbers and strings both accepted
    #[serde(rename = "scenarioId", default)]
    pub scenario_id: Value,
    #[serde(default)]
    pub messages: Vec<DialogueTurn>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub content: String,
}

fn scenario_title(id: &Value) -> &'static str {
    let id = match id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => "custom".to_string(),
    };
    match id.as_str() {
        "1" => "Job Interview",
        "2" => "Daily Conversation",
        "3" => "Business Meeting",
        "4" => "Travel Situations",
        "agent" => "Agent",
        _ => "Custom",
    }
}

fn conversation_system_prompt(scenario: &str) -> String {
    format!(
        "You are an English speaking practice assistant for TOEFL/IELTS. \
         Keep replies 2\u{2013}5 sentences. Ask one question at a time. \
         Add one short improvement tip at the end. \
         Scenario: {scenario}"
    )
}

/// Practice conversation turn, proxied to the chat model
///
/// A scenario-specific system prompt is prepended unless the client already
/// leads with its own system message.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 502, description = "Provider failure", body = speakcoach_core::error::ApiError)
    ),
    tag = "conversation"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let scenario = scenario_title(&req.scenario_id);

    let mut messages: Vec<Value> = Vec::with_capacity(req.messages.len() + 1);
    if req.messages.first().map(|m| m.role.as_str()) != Some("system") {
        messages.push(message("system", &conversation_system_prompt(scenario)));
    }
    messages.extend(req.messages.iter().map(|m| message(&m.role, &m.content)));

    let content = state
        .groq
        .chat(&messages, 0.3, false)
        .await
        .map_err(|e| AppError::upstream("groq_chat_failed", e))?;

    Ok(Json(ChatResponse { content }))
}

/// Transcribe an uploaded audio clip
///
/// Multipart fields: `audio` (the clip) and optional `language` (default
/// "en"). The provider's JSON body is returned untouched.
#[utoipa::path(
    post,
    path = "/api/transcribe",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Provider transcription payload"),
        (status = 400, description = "Missing audio field", body = speakcoach_core::error::ApiError),
        (status = 502, description = "Provider failure", body = speakcoach_core::error::ApiError)
    ),
    tag = "conversation"
)]
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut audio: Option<(String, String, Vec<u8>)> = None;
    let mut language = "en".to_string();

    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation {
        message: format!("Malformed multipart body: {e}"),
        field: None,
        received: None,
        docs_hint: None,
    })? {
        match field.name() {
            Some("audio") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("speech.webm")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("audio/webm")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| AppError::Validation {
                    message: format!("Failed to read audio field: {e}"),
                    field: Some("audio".to_string()),
                    received: None,
                    docs_hint: None,
                })?;
                audio = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("language") => {
                language = field.text().await.unwrap_or_else(|_| "en".to_string());
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) = audio.ok_or_else(|| AppError::Validation {
        message: "audio field is required".to_string(),
        field: Some("audio".to_string()),
        received: None,
        docs_hint: Some("Send the clip as a multipart field named 'audio'.".to_string()),
    })?;

    let transcript = state
        .groq
        .transcribe(file_name, &content_type, bytes, &language)
        .await
        .map_err(|e| AppError::upstream("groq_transcribe_failed", e))?;

    Ok(Json(transcript))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{conversation_system_prompt, scenario_title};

    #[test]
    fn scenario_ids_map_to_titles() {
        assert_eq!(scenario_title(&json!("1")), "Job Interview");
        assert_eq!(scenario_title(&json!(2)), "Daily Conversation");
        assert_eq!(scenario_title(&json!("agent")), "Agent");
        assert_eq!(scenario_title(&json!("weird")), "Custom");
        assert_eq!(scenario_title(&json!(null)), "Custom");
    }

    #[test]
    fn system_prompt_names_the_scenario() {
        let prompt = conversation_system_prompt("Travel Situations");
        assert!(prompt.ends_with("Scenario: Travel Situations"));
        assert!(prompt.contains("Ask one question at a time."));
    }
}
