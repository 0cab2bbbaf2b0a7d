//! Market Answer Agent
//!
//! Answers a natural-language financial question in three stages:
//! - Synthesis: translate the question into one structured
//!   (operation, parameters) request against the capability catalog
//! - Execution: validate the request against the allow-list and fetch
//!   the data from the financial-data platform
//! - Summarization: render the (possibly truncated) result back into
//!   a grounded natural-language answer
//!
//! PIPELINE: QUERY → SYNTHESIZE → EXECUTE → SUMMARIZE → ANSWER

pub mod agent;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod models;
pub mod summarizer;
pub mod synthesizer;

pub use error::Result;

// Re-export common types
pub use models::*;
