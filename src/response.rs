//! Worker responses as received from the query layer.
//!
//! The query layer sends loosely shaped JSON where `output` and `error` are
//! both optional. [`QueryPayload::into_responses`] converts every entry into
//! a [`ModelResponse`] carrying a closed [`WorkerOutcome`], so the rest of the
//! pipeline never has to guess which of the two fields is meaningful.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sampling parameters a worker was queried with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerParams {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
}

/// What a single worker produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The worker answered with text.
    Output(String),
    /// The worker failed; the text describes why.
    Error(String),
    /// Neither output nor error was reported.
    Empty,
}

/// One worker's answer to a query. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub model: String,
    pub outcome: WorkerOutcome,
    pub processing_time_ms: u64,
    pub confidence: Option<f64>,
    pub worker_params: Option<WorkerParams>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ModelResponse {
    /// Creates a successful response.
    pub fn success(model: impl Into<String>, output: impl Into<String>) -> Self {
        Self::with_outcome(model, WorkerOutcome::Output(output.into()))
    }

    /// Creates a failed response.
    pub fn failure(model: impl Into<String>, error: impl Into<String>) -> Self {
        Self::with_outcome(model, WorkerOutcome::Error(error.into()))
    }

    fn with_outcome(model: impl Into<String>, outcome: WorkerOutcome) -> Self {
        Self {
            model: model.into(),
            outcome,
            processing_time_ms: 0,
            confidence: None,
            worker_params: None,
            timestamp: None,
        }
    }

    /// Sets the reported confidence.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Sets the processing time in milliseconds.
    pub fn processing_time(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }

    /// Sets the worker sampling parameters.
    pub fn worker_params(mut self, params: WorkerParams) -> Self {
        self.worker_params = Some(params);
        self
    }

    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            WorkerOutcome::Output(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            WorkerOutcome::Error(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, WorkerOutcome::Error(_))
    }

    /// Returns the output when it is eligible for ranking: no error and not blank.
    pub fn ranked_output(&self) -> Option<&str> {
        self.output().filter(|text| !text.trim().is_empty())
    }
}

/// A response entry exactly as the query layer serializes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResponse {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub processing_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_params: Option<WorkerParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<WireResponse> for ModelResponse {
    fn from(wire: WireResponse) -> Self {
        // An empty error string is how the backend serializes "no error".
        let error = wire.error.filter(|e| !e.is_empty());
        let outcome = match (error, wire.output) {
            (Some(error), _) => WorkerOutcome::Error(error),
            (None, Some(output)) => WorkerOutcome::Output(output),
            (None, None) => WorkerOutcome::Empty,
        };
        Self {
            model: wire.model,
            outcome,
            processing_time_ms: wire.processing_time,
            confidence: wire.confidence,
            worker_params: wire.worker_params,
            timestamp: wire.timestamp,
        }
    }
}

/// Body of a successful query-layer reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    #[serde(default)]
    pub query_id: String,
    #[serde(default)]
    pub results: Vec<WireResponse>,
}

impl QueryPayload {
    /// Parses a query-layer reply from JSON.
    pub fn from_json(raw: &str) -> Result<Self, crate::error::HivemindError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Converts the wire entries into closed responses, preserving order.
    pub fn into_responses(self) -> (String, Vec<ModelResponse>) {
        let responses = self.results.into_iter().map(ModelResponse::from).collect();
        (self.query_id, responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_error_string_means_success() {
        let json = r#"{"model":"qwen","output":"hi","error":"","processingTime":12}"#;
        let wire: WireResponse = serde_json::from_str(json).unwrap();
        let response = ModelResponse::from(wire);
        assert_eq!(response.outcome, WorkerOutcome::Output("hi".into()));
        assert_eq!(response.processing_time_ms, 12);
    }

    #[test]
    fn error_wins_over_output() {
        let json = r#"{"model":"qwen","output":"","error":"timeout"}"#;
        let wire: WireResponse = serde_json::from_str(json).unwrap();
        let response = ModelResponse::from(wire);
        assert_eq!(response.error(), Some("timeout"));
        assert!(response.output().is_none());
    }

    #[test]
    fn missing_fields_become_empty() {
        let wire: WireResponse = serde_json::from_str(r#"{"model":"qwen"}"#).unwrap();
        let response = ModelResponse::from(wire);
        assert_eq!(response.outcome, WorkerOutcome::Empty);
        assert!(response.ranked_output().is_none());
    }

    #[test]
    fn blank_output_is_not_ranked() {
        let response = ModelResponse::success("a", "   \n");
        assert!(response.output().is_some());
        assert!(response.ranked_output().is_none());
    }

    #[test]
    fn payload_keeps_order_and_query_id() {
        let json = r#"{
            "queryId": "query_1",
            "results": [
                {"model": "a", "output": "one", "workerParams": {"temperature": 0.7, "top_k": 40, "top_p": 0.8, "worker_id": "a"}},
                {"model": "b", "error": "boom"}
            ]
        }"#;
        let (query_id, responses) = QueryPayload::from_json(json).unwrap().into_responses();
        assert_eq!(query_id, "query_1");
        assert_eq!(responses[0].model, "a");
        assert_eq!(responses[0].worker_params.as_ref().unwrap().top_k, 40);
        assert!(responses[1].is_error());
    }

    #[test]
    fn invalid_json_reports_position() {
        let err = QueryPayload::from_json("{").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
