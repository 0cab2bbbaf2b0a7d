//! Data-to-answer summarization
//!
//! Terminal stage before the caller: always produces a Summary, even
//! when the fetch failed or the summarization call itself faults.

use crate::llm::ChatModel;
use crate::models::ExecutionResult;
use tracing::{info, warn};

/// Ceiling on the serialized JSON handed to the model, to bound cost
/// and stay under provider context limits.
pub const MAX_DATA_LENGTH: usize = 15_000;

/// Appended when the serialized payload is cut at `MAX_DATA_LENGTH`.
pub const TRUNCATION_MARKER: &str = "... [data truncated]";

const SYSTEM_PROMPT: &str = "\
You are an expert financial analyst AI. You will be given a user's question and the corresponding data retrieved from a financial data platform.
Provide a clear, concise and helpful answer to the question based *only* on the provided data.
If the data contains an error, acknowledge the error and explain what might have gone wrong. Never invent data.
Format your answer in well-structured markdown.";

/// Renders an `ExecutionResult` into a natural-language answer.
pub struct ResultSummarizer<'a> {
    llm: &'a dyn ChatModel,
}

impl<'a> ResultSummarizer<'a> {
    pub fn new(llm: &'a dyn ChatModel) -> Self {
        Self { llm }
    }

    /// Summarize one result. Total: an internal fault degrades to a
    /// best-effort textual explanation instead of propagating.
    pub async fn summarize(&self, query: &str, result: &ExecutionResult) -> String {
        info!("Summarizing result");

        let data = prepare_payload(result);
        let user_content = format!(
            "Original Question: {}\n\nRetrieved Data (in JSON format):\n{}",
            query, data
        );

        // Default sampling temperature: natural-language variety is
        // acceptable here, unlike command synthesis.
        match self.llm.complete(SYSTEM_PROMPT, &user_content, None).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => {
                warn!("Model returned an empty summary");
                fallback_summary(result)
            }
            Err(e) => {
                warn!(error = %e, "Summarization call failed");
                fallback_summary(result)
            }
        }
    }
}

/// Serialize the result and truncate the string to `MAX_DATA_LENGTH`.
/// The cut happens on the serialized string, not on record boundaries.
pub(crate) fn prepare_payload(result: &ExecutionResult) -> String {
    let payload = result.to_payload();
    let mut data =
        serde_json::to_string(&payload).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));

    if data.len() > MAX_DATA_LENGTH {
        let mut cut = MAX_DATA_LENGTH;
        while !data.is_char_boundary(cut) {
            cut -= 1;
        }
        data.truncate(cut);
        data.push_str(TRUNCATION_MARKER);
    }

    data
}

fn fallback_summary(result: &ExecutionResult) -> String {
    match result {
        ExecutionResult::Success(_) => {
            "The requested data was retrieved, but the answer could not be formatted. \
             Please try again."
                .to_string()
        }
        ExecutionResult::Failure(message) => format!(
            "The requested data could not be retrieved: {}. \
             The answer could not be formatted further.",
            message
        ),
    }
}
