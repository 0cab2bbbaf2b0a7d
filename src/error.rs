//! Error types for the market answer agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Pipeline Errors
    // =============================

    /// Missing or empty credentials. The only error allowed to
    /// terminate the process before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model's output could not be parsed into a valid
    /// operation + parameter structure.
    #[error("Translation error: {0}")]
    Translation(String),

    /// Validation failure, unknown operation, provider fault or timeout.
    /// Folded into `ExecutionResult::Failure` at the executor boundary.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Internal fault while formatting the answer.
    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("LLM error: {0}")]
    Llm(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
