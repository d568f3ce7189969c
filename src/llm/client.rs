//! Chat-completion client.
//!
//! One awaited request per `/process` call against an Azure-OpenAI-style
//! chat completions endpoint, with the actions schema attached as
//! `response_format`. Every failure mode is a typed `LlmError` that the
//! HTTP layer maps to a 502 — the model call never fails silently.

use serde_json::json;

use super::schema::{response_format, ActionsList};
use crate::config::Settings;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat completion returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chat completion response carried no message content")]
    MissingContent,

    #[error("model output did not match the actions schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Encapsulates the interaction with the chat-completion service.
pub struct ChatService {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatService {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: settings.chat_url(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    /// Send the prompt pair and parse the structured action list.
    pub async fn propose_actions(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ActionsList, LlmError> {
        let start = std::time::Instant::now();
        log::info!("[LLM] Model: {}", self.model);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "response_format": response_format(),
        });

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[LLM] API returned {}: {}", status, body);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::MissingContent)?;

        let actions: ActionsList = serde_json::from_str(content).map_err(|e| {
            log::error!("[LLM] Unparseable model output: {}", content);
            LlmError::Schema(e)
        })?;

        if let Some(usage) = payload.get("usage") {
            log::info!(
                "[LLM] Tokens: {} in / {} out",
                usage["prompt_tokens"].as_u64().unwrap_or(0),
                usage["completion_tokens"].as_u64().unwrap_or(0)
            );
        }
        log::info!(
            "[LLM] {} actions proposed in {}ms",
            actions.actions.len(),
            start.elapsed().as_millis()
        );
        Ok(actions)
    }
}
