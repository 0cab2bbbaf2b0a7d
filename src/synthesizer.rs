//! Query-to-request synthesis
//!
//! Translates a natural-language question into one structured
//! (operation, parameters) request. The model is sampled at
//! temperature 0 so repeated calls on identical input are maximally
//! reproducible.

use crate::catalog;
use crate::error::AgentError;
use crate::llm::ChatModel;
use crate::models::StructuredRequest;
use crate::Result;
use tracing::info;

/// Converts a query into a `StructuredRequest` via one LLM call.
pub struct CommandSynthesizer<'a> {
    llm: &'a dyn ChatModel,
}

impl<'a> CommandSynthesizer<'a> {
    pub fn new(llm: &'a dyn ChatModel) -> Self {
        Self { llm }
    }

    pub async fn synthesize(&self, query: &str) -> Result<StructuredRequest> {
        info!(query = %query, "Translating query to structured request");

        let prompt = build_contract_prompt();

        let response = self
            .llm
            .complete(&prompt, query, Some(0.0))
            .await
            .map_err(|e| AgentError::Translation(e.to_string()))?;

        let request = parse_request_response(&response)?;

        info!(request = %request, "Synthesized request");

        Ok(request)
    }
}

/// Build the fixed instruction contract enumerating the allowed output
/// shape: exactly one catalog operation plus keyword arguments.
fn build_contract_prompt() -> String {
    format!(
        r#"You are an expert financial analyst AI. Translate the user's natural language query into exactly one data-retrieval request against the operations listed below.

Available operations:
{}
Rules:
1. Choose exactly one operation from the list above. Never invent an operation.
2. Respond with a single JSON object of the form {{"operation": "<name>", "parameters": {{...}}}}.
3. Parameter values must match the declared types. Dates use YYYY-MM-DD.
4. Do not generate any text other than the JSON object. No explanations, no markdown fences.

Examples:
- User Query: "What's the latest news for Microsoft?"
- Response: {{"operation": "news.company", "parameters": {{"symbol": "MSFT", "limit": 5}}}}

- User Query: "Get historical stock prices for NVDA from the start of 2024"
- Response: {{"operation": "equity.price.historical", "parameters": {{"symbol": "NVDA", "start_date": "2024-01-01"}}}}

- User Query: "Show me the latest analyst estimates for GOOGL"
- Response: {{"operation": "equity.estimates.price_target", "parameters": {{"symbol": "GOOGL"}}}}"#,
        catalog::render_catalog()
    )
}

/// Strip incidental markdown wrapping the model may still emit.
/// Normalization only; validation happens in the executor.
fn strip_fences(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop an optional language tag after the opening fence.
        let rest = match rest.find('\n') {
            Some(idx) if !rest[..idx].contains('{') => &rest[idx + 1..],
            _ => rest,
        };
        return rest.trim_end_matches("```").trim();
    }

    trimmed.trim_matches('`').trim()
}

fn parse_request_response(response: &str) -> Result<StructuredRequest> {
    let cleaned = strip_fences(response);

    let request: StructuredRequest = serde_json::from_str(cleaned).map_err(|e| {
        AgentError::Translation(format!(
            "failed to parse model output: {} | raw={}",
            e, response
        ))
    })?;

    if request.operation.trim().is_empty() {
        return Err(AgentError::Translation(
            "model output named no operation".to_string(),
        ));
    }

    Ok(request)
}
