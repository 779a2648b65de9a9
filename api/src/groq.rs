use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use thiserror::Error;

const TRANSCRIBE_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
const CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub const CHAT_MODEL: &str = "llama3-8b-8192";
pub const WHISPER_MODEL: &str = "whisper-large-v3";

/// Transcription uploads get a longer budget than chat turns; neither call
/// may hang without bound.
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(120);
const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure talking to the LLM provider. Transport covers connect errors and
/// timeouts; Status carries the provider's non-success response verbatim.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned status {status}")]
    Status { status: u16, detail: String },
    #[error("GROQ_API_KEY is not configured")]
    MissingKey,
}

/// Thin client for the Groq OpenAI-compatible endpoints. Holds no per-user
/// state; calls are independent and run outside any per-user lock.
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl GroqClient {
    pub fn from_env() -> Self {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or(ProviderError::MissingKey)
    }

    /// Proxy an audio upload to the Whisper transcription endpoint and
    /// return the provider's JSON body untouched.
    pub async fn transcribe(
        &self,
        file_name: String,
        content_type: &str,
        bytes: Vec<u8>,
        language: &str,
    ) -> Result<Value, ProviderError> {
        let key = self.key()?;

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("model", WHISPER_MODEL)
            .text("language", language.to_string());

        let response = self
            .http
            .post(TRANSCRIBE_URL)
            .bearer_auth(key)
            .multipart(form)
            .timeout(TRANSCRIBE_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                detail: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    /// One chat completion. Returns the first choice's message content; a
    /// response without one reads as empty, which downstream parsing treats
    /// as "nothing structured" rather than an error.
    pub async fn chat(
        &self,
        messages: &[Value],
        temperature: f64,
        json_mode: bool,
    ) -> Result<String, ProviderError> {
        let key = self.key()?;

        let mut body = json!({
            "model": CHAT_MODEL,
            "messages": messages,
            "temperature": temperature,
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .http
            .post(CHAT_URL)
            .bearer_auth(key)
            .json(&body)
            .timeout(CHAT_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                detail: response.text().await.unwrap_or_default(),
            });
        }

        let data: Value = response.json().await?;
        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        Ok(content)
    }

    /// JSON-mode chat for the critic/planner roles. Upstream failures
    /// propagate; content that fails to parse as an object degrades to an
    /// empty object, since malformed model output is never an error.
    pub async fn json_chat(
        &self,
        messages: &[Value],
        temperature: f64,
    ) -> Result<Value, ProviderError> {
        let content = self.chat(messages, temperature, true).await?;
        Ok(serde_json::from_str(&content).unwrap_or_else(|_| json!({})))
    }
}

/// Build a `{"role": ..., "content": ...}` chat message.
pub fn message(role: &str, content: &str) -> Value {
    json!({"role": role, "content": content})
}
