//! Allow-listed request execution
//!
//! This is the safety boundary between model output and the live data
//! platform. Requests are validated against the catalog before any
//! external call; every fault becomes `ExecutionResult::Failure` and
//! nothing is thrown past this boundary.

use crate::catalog::{self, DataPlatform};
use crate::models::{ExecutionResult, StructuredRequest};
use serde_json::Value;
use tracing::{info, warn};

/// Validates and dispatches one `StructuredRequest`.
pub struct CommandExecutor<'a> {
    platform: &'a dyn DataPlatform,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(platform: &'a dyn DataPlatform) -> Self {
        Self { platform }
    }

    /// Execute one request. Total: never returns `Err`.
    ///
    /// Result values are retained in full here; truncation is the
    /// summarizer's concern.
    pub async fn execute(&self, request: &StructuredRequest) -> ExecutionResult {
        info!(request = %request, "Executing request");

        let operation = match catalog::find_operation(&request.operation) {
            Some(op) => op,
            None => {
                warn!(operation = %request.operation, "Unknown operation requested");
                return ExecutionResult::Failure(format!(
                    "unknown operation: {}",
                    request.operation
                ));
            }
        };

        if let Err(reason) = operation.validate(&request.parameters) {
            warn!(operation = operation.name, reason = %reason, "Parameter validation failed");
            return ExecutionResult::Failure(format!("invalid parameters: {}", reason));
        }

        let mut parameters = request.parameters.clone();
        if let Some(provider) = operation.default_provider {
            parameters
                .entry("provider".to_string())
                .or_insert_with(|| Value::String(provider.to_string()));
        }

        match self.platform.fetch(operation, &parameters).await {
            Ok(data) => {
                info!(operation = operation.name, "Request executed successfully");
                ExecutionResult::Success(data)
            }
            Err(e) => {
                warn!(operation = operation.name, error = %e, "Request execution failed");
                ExecutionResult::Failure(e.to_string())
            }
        }
    }
}
