//! Environment-backed settings.
//!
//! Everything the service needs is read once at startup; a missing or
//! unusable variable fails the boot instead of surfacing mid-request.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("environment variable {0} has an invalid value")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Full chat-completions endpoint URL, without the api-version query.
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub model: String,
    /// Where `/upload` stores the working copy and `/process` reads it.
    pub current_ppt: PathBuf,
    /// Directory the processed decks are written into.
    pub output_dir: PathBuf,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: required("AZURE_OPENAI_ENDPOINT")?,
            api_key: required("AZURE_OPENAI_KEY")?,
            api_version: required("AZURE_API_VERSION")?,
            model: required("GPT_MODEL")?,
            current_ppt: PathBuf::from(required("LOCAL_PPT_FILENAME")?),
            output_dir: optional("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("slides_ppt")),
            port: match optional("PORT") {
                Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
                None => 8000,
            },
        })
    }

    /// The URL chat completions are POSTed to.
    pub fn chat_url(&self) -> String {
        format!("{}?api-version={}", self.endpoint, self.api_version)
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::MissingVar(key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url() {
        let settings = Settings {
            endpoint: "https://example.openai.azure.com/openai/deployments/gpt/chat/completions"
                .into(),
            api_key: "key".into(),
            api_version: "2024-08-01-preview".into(),
            model: "gpt-4o".into(),
            current_ppt: PathBuf::from("current_ppt.pptx"),
            output_dir: PathBuf::from("slides_ppt"),
            port: 8000,
        };
        assert_eq!(
            settings.chat_url(),
            "https://example.openai.azure.com/openai/deployments/gpt/chat/completions?api-version=2024-08-01-preview"
        );
    }
}
