//! Pipeline orchestrator
//!
//! QUERY → SYNTHESIZE → EXECUTE → SUMMARIZE → ANSWER
//!
//! The three stages run strictly in sequence; every fault past the
//! configuration check is folded into the answer rather than
//! propagated, because the contract is "always produce an answer,
//! even if the answer explains what went wrong."

use crate::catalog::{DataPlatform, OpenBbPlatform};
use crate::config::AgentConfig;
use crate::executor::CommandExecutor;
use crate::llm::{ChatModel, GroqClient};
use crate::models::{AgentAnswer, ExecutionResult};
use crate::summarizer::ResultSummarizer;
use crate::synthesizer::CommandSynthesizer;
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Process-wide authenticated state for both external services.
/// Created once at startup, read-only afterwards.
pub struct Session {
    llm: Arc<dyn ChatModel>,
    platform: Arc<dyn DataPlatform>,
}

impl Session {
    /// Build authenticated clients from configuration. Requires both
    /// credentials to be present; `AgentConfig::from_env` enforces
    /// that before this runs. Requests carry the bearer token, so no
    /// separate login round-trip is needed.
    pub fn connect(config: &AgentConfig) -> Result<Self> {
        let llm = GroqClient::new(
            config.groq_api_key.clone(),
            config.model.clone(),
            config.llm_base_url.clone(),
        )?;
        let platform = OpenBbPlatform::new(
            config.platform_base_url.clone(),
            config.openbb_pat.clone(),
        )?;

        info!(model = %config.model, "Session ready for both services");

        Ok(Self {
            llm: Arc::new(llm),
            platform: Arc::new(platform),
        })
    }

    /// Assemble a session from existing clients. Used by tests to
    /// substitute scripted transports for the live services.
    pub fn with_clients(llm: Arc<dyn ChatModel>, platform: Arc<dyn DataPlatform>) -> Self {
        Self { llm, platform }
    }
}

/// Drives the three pipeline stages for one query.
pub struct Agent {
    session: Session,
}

impl Agent {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Answer one query. Total past construction: translation and
    /// execution faults surface inside the returned answer.
    pub async fn answer(&self, query: &str) -> AgentAnswer {
        let synthesizer = CommandSynthesizer::new(self.session.llm.as_ref());
        let executor = CommandExecutor::new(self.session.platform.as_ref());
        let summarizer = ResultSummarizer::new(self.session.llm.as_ref());

        let (request, result) = match synthesizer.synthesize(query).await {
            Ok(request) => {
                let result = executor.execute(&request).await;
                (Some(request), result)
            }
            // The user still deserves an explained answer, so a failed
            // translation feeds the summarizer as a failure value.
            Err(e) => (None, ExecutionResult::Failure(e.to_string())),
        };

        let summary = summarizer.summarize(query, &result).await;

        AgentAnswer {
            request,
            result,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OperationSpec;
    use crate::error::AgentError;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted model: pops one response per call and counts calls.
    struct ScriptedModel {
        responses: Mutex<VecDeque<crate::Result<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<crate::Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_content: &str,
            _temperature: Option<f32>,
        ) -> crate::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AgentError::Llm("no scripted response".to_string())))
        }
    }

    struct StubPlatform {
        payload: Value,
        calls: AtomicUsize,
    }

    impl StubPlatform {
        fn new(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                payload,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DataPlatform for StubPlatform {
        async fn fetch(
            &self,
            _operation: &OperationSpec,
            _parameters: &Map<String, Value>,
        ) -> crate::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    #[tokio::test]
    async fn end_to_end_news_query() {
        let model = ScriptedModel::new(vec![
            Ok(r#"{"operation": "news.company", "parameters": {"symbol": "MSFT", "limit": 5}}"#
                .to_string()),
            Ok("Microsoft's latest coverage centers on its quarterly cloud earnings."
                .to_string()),
        ]);
        let platform = StubPlatform::new(json!([
            { "title": "Cloud revenue beats expectations", "date": "2024-01-01" }
        ]));

        let agent = Agent::new(Session::with_clients(model.clone(), platform.clone()));
        let answer = agent.answer("What's the latest news for Microsoft?").await;

        assert!(answer.result.is_success());
        let request = answer.request.unwrap();
        assert_eq!(request.operation, "news.company");

        assert!(!answer.summary.is_empty());
        assert!(answer.summary.contains("Microsoft"));
        // Natural-language rendering, not a passthrough of the records.
        assert!(!answer.summary.contains("\"title\""));

        assert_eq!(platform.call_count(), 1);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn end_to_end_unknown_operation_is_acknowledged() {
        let model = ScriptedModel::new(vec![
            Ok(r#"{"operation": "crypto.orderbook", "parameters": {"symbol": "BTC"}}"#.to_string()),
            Ok("The requested data source is not available, so no figures can be reported."
                .to_string()),
        ]);
        let platform = StubPlatform::new(json!({}));

        let agent = Agent::new(Session::with_clients(model.clone(), platform.clone()));
        let answer = agent.answer("Show me the BTC order book").await;

        match &answer.result {
            ExecutionResult::Failure(message) => {
                assert!(message.contains("unknown operation"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!answer.summary.is_empty());
        assert_eq!(platform.call_count(), 0);
    }

    #[tokio::test]
    async fn translation_fault_still_yields_an_answer() {
        let model = ScriptedModel::new(vec![
            Ok("Sorry, I can only chat about the weather.".to_string()),
            Ok("I could not turn that question into a data request.".to_string()),
        ]);
        let platform = StubPlatform::new(json!({}));

        let agent = Agent::new(Session::with_clients(model.clone(), platform.clone()));
        let answer = agent.answer("Tell me a joke").await;

        assert!(answer.request.is_none());
        assert!(!answer.result.is_success());
        assert!(!answer.summary.is_empty());
        assert_eq!(platform.call_count(), 0);
    }

    #[tokio::test]
    async fn total_even_when_every_model_call_faults() {
        let model = ScriptedModel::new(vec![
            Err(AgentError::Llm("timeout".to_string())),
            Err(AgentError::Llm("timeout".to_string())),
        ]);
        let platform = StubPlatform::new(json!({}));

        let agent = Agent::new(Session::with_clients(model.clone(), platform.clone()));
        let answer = agent.answer("Anything").await;

        assert!(!answer.summary.is_empty());
        assert_eq!(platform.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_credentials_mean_no_external_calls() {
        // Session construction is gated on AgentConfig, which fails
        // before any client exists; here we assert the other half of
        // the property: nothing dials out until a query is answered.
        let model = ScriptedModel::new(vec![]);
        let platform = StubPlatform::new(json!({}));

        let _agent = Agent::new(Session::with_clients(model.clone(), platform.clone()));

        assert_eq!(model.call_count(), 0);
        assert_eq!(platform.call_count(), 0);
    }
}
