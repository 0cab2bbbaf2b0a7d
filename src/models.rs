//! Core data models for the answer pipeline

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

//
// ================= Structured Request =================
//

/// A validated (operation, parameters) pair produced from natural
/// language. Holds declarative identifiers and arguments only, never
/// executable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRequest {
    /// Dotted operation identifier, e.g. `news.company`.
    pub operation: String,
    /// Keyword arguments: string / number / date-typed values.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl fmt::Display for StructuredRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}({})", self.operation, args.join(", "))
    }
}

//
// ================= Execution Result =================
//

/// Outcome of one data-platform fetch. Exactly one case holds.
///
/// Failures here are expected business outcomes (bad symbol, rate
/// limit), not exceptional program states, so they travel as values
/// all the way to the summarizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionResult {
    Success(Value),
    Failure(String),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    /// JSON form handed to the summarizer: the raw data on success, an
    /// `{"error": ...}` object on failure so the model is told to
    /// acknowledge the fault instead of inventing an answer.
    pub fn to_payload(&self) -> Value {
        match self {
            ExecutionResult::Success(data) => data.clone(),
            ExecutionResult::Failure(message) => serde_json::json!({ "error": message }),
        }
    }
}

//
// ================= Final Answer =================
//

/// Everything one pipeline run produced: the synthesized request (when
/// translation succeeded), the fetch outcome, and the rendered summary.
#[derive(Debug, Clone, Serialize)]
pub struct AgentAnswer {
    pub request: Option<StructuredRequest>,
    pub result: ExecutionResult,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_display_is_call_shaped() {
        let mut parameters = Map::new();
        parameters.insert("symbol".to_string(), json!("MSFT"));
        let request = StructuredRequest {
            operation: "news.company".to_string(),
            parameters,
        };
        assert_eq!(request.to_string(), "news.company(symbol=\"MSFT\")");
    }

    #[test]
    fn failure_payload_carries_error_key() {
        let result = ExecutionResult::Failure("rate limited".to_string());
        assert_eq!(result.to_payload(), json!({ "error": "rate limited" }));
        assert!(!result.is_success());
    }

    #[test]
    fn success_payload_is_the_data() {
        let data = json!([{ "title": "Quarterly results", "date": "2024-01-01" }]);
        let result = ExecutionResult::Success(data.clone());
        assert_eq!(result.to_payload(), data);
        assert!(result.is_success());
    }

    #[test]
    fn request_roundtrips_through_serde() {
        let mut parameters = Map::new();
        parameters.insert("symbol".to_string(), json!("NVDA"));
        parameters.insert("limit".to_string(), json!(5));
        let request = StructuredRequest {
            operation: "equity.price.historical".to_string(),
            parameters,
        };

        let encoded = serde_json::to_string(&request).unwrap();
        let decoded: StructuredRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, request);
    }
}
