//! Environment-driven configuration
//!
//! Credentials are read once at startup. Missing values abort before
//! any network call is attempted.

use crate::error::AgentError;
use crate::Result;
use std::env;

pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_PLATFORM_BASE_URL: &str = "https://api.openbb.co/api/v1";

/// Startup configuration for both external services.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Groq API key (required).
    pub groq_api_key: String,
    /// OpenBB personal access token (required).
    pub openbb_pat: String,
    /// Chat model identifier.
    pub model: String,
    /// Base URL of the OpenAI-compatible chat endpoint.
    pub llm_base_url: String,
    /// Base URL of the OpenBB REST API.
    pub platform_base_url: String,
}

impl AgentConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let groq_api_key = require_env("GROQ_API_KEY")?;
        let openbb_pat = require_env("OPENBB_PAT")?;

        Ok(Self {
            groq_api_key,
            openbb_pat,
            model: env_or("GROQ_MODEL", DEFAULT_MODEL),
            llm_base_url: trimmed_url(env_or("GROQ_BASE_URL", DEFAULT_LLM_BASE_URL)),
            platform_base_url: trimmed_url(env_or("OPENBB_BASE_URL", DEFAULT_PLATFORM_BASE_URL)),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AgentError::Configuration(format!(
            "{} must be set and non-empty",
            key
        ))),
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn trimmed_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
