//! Capability catalog and data-platform boundary
//!
//! The catalog is the closed allow-list of retrievable operations.
//! Every request is validated against it before any external call;
//! there is no dynamic code path from model output to execution.

use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Declared type of one operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Ticker symbol, e.g. "MSFT".
    Symbol,
    /// Free-form string (provider names, search terms).
    Str,
    /// ISO date, `YYYY-MM-DD`.
    Date,
    /// Whole number (limits, counts).
    Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

/// One retrievable operation: identifier, REST path, parameter schema
/// and the provider used when the request names none.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    pub name: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub default_provider: Option<&'static str>,
}

const fn required(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: false,
    }
}

/// Fixed operation allow-list. Mirrors the slice of the OpenBB REST
/// surface this agent is permitted to reach.
pub const OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "news.company",
        path: "news/company",
        description: "Latest news articles for a company",
        params: &[
            required("symbol", ParamKind::Symbol),
            optional("limit", ParamKind::Integer),
            optional("provider", ParamKind::Str),
        ],
        default_provider: Some("benzinga"),
    },
    OperationSpec {
        name: "equity.price.historical",
        path: "equity/price/historical",
        description: "Historical OHLCV prices for a symbol over a date range",
        params: &[
            required("symbol", ParamKind::Symbol),
            optional("start_date", ParamKind::Date),
            optional("end_date", ParamKind::Date),
            optional("provider", ParamKind::Str),
        ],
        default_provider: Some("fmp"),
    },
    OperationSpec {
        name: "equity.price.quote",
        path: "equity/price/quote",
        description: "Latest market quote for a symbol",
        params: &[
            required("symbol", ParamKind::Symbol),
            optional("provider", ParamKind::Str),
        ],
        default_provider: Some("fmp"),
    },
    OperationSpec {
        name: "equity.estimates.price_target",
        path: "equity/estimates/price_target",
        description: "Analyst price targets and estimates for a symbol",
        params: &[
            required("symbol", ParamKind::Symbol),
            optional("limit", ParamKind::Integer),
            optional("provider", ParamKind::Str),
        ],
        default_provider: Some("fmp"),
    },
    OperationSpec {
        name: "equity.fundamental.income",
        path: "equity/fundamental/income",
        description: "Income statement fundamentals for a symbol",
        params: &[
            required("symbol", ParamKind::Symbol),
            optional("limit", ParamKind::Integer),
            optional("provider", ParamKind::Str),
        ],
        default_provider: Some("fmp"),
    },
    OperationSpec {
        name: "equity.profile",
        path: "equity/profile",
        description: "Company profile and general information",
        params: &[
            required("symbol", ParamKind::Symbol),
            optional("provider", ParamKind::Str),
        ],
        default_provider: Some("fmp"),
    },
];

/// Look up an operation by its dotted identifier.
pub fn find_operation(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Render the catalog for the synthesis contract prompt.
pub fn render_catalog() -> String {
    let mut out = String::new();
    for op in OPERATIONS {
        let args: Vec<String> = op
            .params
            .iter()
            .map(|p| {
                let kind = match p.kind {
                    ParamKind::Symbol => "symbol",
                    ParamKind::Str => "string",
                    ParamKind::Date => "date YYYY-MM-DD",
                    ParamKind::Integer => "integer",
                };
                if p.required {
                    format!("{} ({}, required)", p.name, kind)
                } else {
                    format!("{} ({})", p.name, kind)
                }
            })
            .collect();
        out.push_str(&format!(
            "- {}: {}. Parameters: {}\n",
            op.name,
            op.description,
            args.join(", ")
        ));
    }
    out
}

impl OperationSpec {
    fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Check parameter names and value types against the declared
    /// schema. Returns a human-readable reason on the first mismatch.
    pub fn validate(&self, parameters: &Map<String, Value>) -> std::result::Result<(), String> {
        for (name, value) in parameters {
            let spec = self
                .param(name)
                .ok_or_else(|| format!("unexpected parameter '{}'", name))?;
            check_kind(spec, value)?;
        }

        for spec in self.params.iter().filter(|p| p.required) {
            if !parameters.contains_key(spec.name) {
                return Err(format!("missing required parameter '{}'", spec.name));
            }
        }

        Ok(())
    }
}

fn check_kind(spec: &ParamSpec, value: &Value) -> std::result::Result<(), String> {
    match spec.kind {
        ParamKind::Symbol => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("parameter '{}' must be a string symbol", spec.name))?;
            if s.trim().is_empty() {
                return Err(format!("parameter '{}' must be a non-empty symbol", spec.name));
            }
        }
        ParamKind::Str => {
            if !value.is_string() {
                return Err(format!("parameter '{}' must be a string", spec.name));
            }
        }
        ParamKind::Date => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("parameter '{}' must be a date string", spec.name))?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| format!("parameter '{}' must be a YYYY-MM-DD date", spec.name))?;
        }
        ParamKind::Integer => {
            if value.as_i64().is_none() && value.as_u64().is_none() {
                return Err(format!("parameter '{}' must be an integer", spec.name));
            }
        }
    }
    Ok(())
}

/// Boundary to the financial-data platform. The live client and test
/// stubs both sit behind this trait so the executor never knows which
/// it is talking to.
#[async_trait]
pub trait DataPlatform: Send + Sync {
    /// Fetch one validated operation. Implementations report provider,
    /// network and decoding faults through `AgentError::Execution`.
    async fn fetch(
        &self,
        operation: &OperationSpec,
        parameters: &Map<String, Value>,
    ) -> Result<Value>;
}

/// HTTP client for the OpenBB REST API.
pub struct OpenBbPlatform {
    client: Client,
    base_url: String,
    token: String,
}

impl OpenBbPlatform {
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AgentError::Execution(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn query_pairs(parameters: &Map<String, Value>) -> Vec<(String, String)> {
        parameters
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect()
    }
}

#[async_trait]
impl DataPlatform for OpenBbPlatform {
    async fn fetch(
        &self,
        operation: &OperationSpec,
        parameters: &Map<String, Value>,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, operation.path);

        debug!(operation = operation.name, url = %url, "Fetching from data platform");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&Self::query_pairs(parameters))
            .send()
            .await
            .map_err(|e| {
                warn!(operation = operation.name, error = %e, "Data platform request failed");
                AgentError::Execution(format!("platform request failed: {}", e))
            })?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| AgentError::Execution(format!("failed to read platform response: {}", e)))?;

        if !status.is_success() {
            warn!(
                operation = operation.name,
                status = %status,
                "Data platform returned an error"
            );
            return Err(AgentError::Execution(format!(
                "platform returned {}: {}",
                status, body_text
            )));
        }

        let body: Value = serde_json::from_str(&body_text)
            .map_err(|e| AgentError::Execution(format!("invalid provider response: {}", e)))?;

        // The REST API wraps records in a "results" envelope.
        let data = match body {
            Value::Object(mut obj) if obj.contains_key("results") => {
                obj.remove("results").unwrap_or(Value::Null)
            }
            other => other,
        };

        Ok(data)
    }
}
