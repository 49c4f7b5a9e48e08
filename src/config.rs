//! Application settings loaded from the environment
//!
//! Reads .env via dotenv; a missing API credential is fatal at startup.

use crate::error::AgentError;
use crate::Result;

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_PORT: u16 = 8000;

/// Process-wide settings, built once at startup and passed explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub groq_api_key: String,
    pub groq_model: String,
    pub port: u16,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// `GROQ_API_KEY` is required; `GROQ_MODEL` and `PORT` fall back to
    /// defaults when unset or unparseable.
    pub fn from_env() -> Result<Self> {
        let groq_api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Configuration("GROQ_API_KEY is required but not set".to_string())
            })?;

        let groq_model =
            std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            groq_api_key,
            groq_model,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_fatal() {
        std::env::remove_var("GROQ_API_KEY");

        let result = Settings::from_env();
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }
}
