//! One query round from received responses to display payload.
//!
//! A round has two phases. [`Pipeline::begin`] produces escaped placeholder
//! content that can be shown right away. [`Pipeline::complete`] ranks the full
//! response list once and renders every output as markdown from its cleaned
//! text. Highlighting happens later, after the display layer inserted the
//! HTML, through [`Pipeline::render_completion`].

use serde::Serialize;

use crate::completion::{CompletionConfig, RenderCompletion};
use crate::config::PipelineConfig;
use crate::error::HivemindError;
use crate::markdown::{escape_html, MarkdownRenderer, RenderedContent};
use crate::ranking::{MasterEvaluation, RankingEngine};
use crate::response::{ModelResponse, QueryPayload};
use crate::stats::RoundStats;
use crate::summary::consultation_html;

pub const DEFAULT_TRANSPORT_ERROR: &str = "Failed to process query";

/// What the query layer delivered for one submitted query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Received {
        query_id: String,
        responses: Vec<ModelResponse>,
    },
    /// No worker could be reached. Never ranked.
    TransportFailed { message: Option<String> },
}

impl QueryOutcome {
    pub fn from_payload(payload: QueryPayload) -> Self {
        let (query_id, responses) = payload.into_responses();
        QueryOutcome::Received {
            query_id,
            responses,
        }
    }

    /// Maps a failed request to [`QueryOutcome::TransportFailed`].
    pub fn from_result(result: Result<QueryPayload, HivemindError>) -> Self {
        match result {
            Ok(payload) => Self::from_payload(payload),
            Err(HivemindError::Transport(message)) => QueryOutcome::TransportFailed {
                message: Some(message).filter(|m| !m.is_empty()),
            },
            Err(err) => QueryOutcome::TransportFailed {
                message: Some(err.to_string()),
            },
        }
    }
}

/// Who a display message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Assistant,
    System,
}

/// Everything the display layer needs for one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPayload {
    pub kind: MessageKind,
    /// Safe interim HTML built from escaped placeholders.
    pub raw_response: String,
    /// Final HTML with rendered markdown.
    pub rendered_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_evaluation: Option<MasterEvaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RoundStats>,
}

impl DisplayPayload {
    /// Synthetic system message for a transport failure.
    pub fn transport_error(message: Option<&str>) -> Self {
        let text = format!("Error: {}", message.unwrap_or(DEFAULT_TRANSPORT_ERROR));
        let html = format!("<div class=\"system-message\">{}</div>", escape_html(&text));
        Self {
            kind: MessageKind::System,
            raw_response: html.clone(),
            rendered_html: html,
            master_evaluation: None,
            stats: None,
        }
    }
}

/// Phase one of a round: placeholders are ready, nothing is ranked yet.
#[derive(Debug, Clone)]
pub struct PendingRound {
    pub query_id: String,
    pub responses: Vec<ModelResponse>,
    pub placeholders: Vec<RenderedContent>,
}

impl PendingRound {
    /// Summary HTML built from the escaped placeholders.
    pub fn placeholder_html(&self) -> String {
        consultation_html(&self.responses, &self.placeholders, None)
    }
}

/// Phase two of a round.
#[derive(Debug, Clone)]
pub struct CompletedRound {
    pub query_id: String,
    pub responses: Vec<ModelResponse>,
    pub contents: Vec<RenderedContent>,
    pub evaluation: Option<MasterEvaluation>,
    pub stats: RoundStats,
    raw_response: String,
}

impl CompletedRound {
    pub fn rendered_html(&self) -> String {
        consultation_html(&self.responses, &self.contents, self.evaluation.as_ref())
    }

    pub fn display_payload(&self) -> DisplayPayload {
        DisplayPayload {
            kind: MessageKind::Assistant,
            raw_response: self.raw_response.clone(),
            rendered_html: self.rendered_html(),
            master_evaluation: self.evaluation.clone(),
            stats: Some(self.stats),
        }
    }
}

/// Scoring and rendering pipeline. Holds only its configuration.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    renderer: MarkdownRenderer,
    ranking: RankingEngine,
    completion: CompletionConfig,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::new(config.render.clone()),
            ranking: RankingEngine::new(config.ranking.clone()),
            completion: config.completion.clone(),
        }
    }

    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    pub fn ranking(&self) -> &RankingEngine {
        &self.ranking
    }

    /// First phase: cleans every output and escapes it for immediate display.
    pub fn begin(&self, query_id: impl Into<String>, responses: Vec<ModelResponse>) -> PendingRound {
        let placeholders = responses
            .iter()
            .map(|response| self.renderer.placeholder(response.output()))
            .collect();
        PendingRound {
            query_id: query_id.into(),
            responses,
            placeholders,
        }
    }

    /// Second phase: ranks the complete list once and renders the markdown.
    pub fn complete(&self, pending: PendingRound) -> CompletedRound {
        let raw_response = pending.placeholder_html();
        let evaluation = self.ranking.evaluate(&pending.responses);
        let contents = pending
            .placeholders
            .iter()
            .map(|placeholder| self.renderer.finalize(placeholder))
            .collect();
        let stats = RoundStats::from_responses(&pending.responses);

        match &evaluation {
            Some(eval) => log::info!(
                "Query {}: ranked {} of {} response(s), best #{}",
                pending.query_id,
                eval.rankings.len(),
                stats.total_models,
                eval.best_index
            ),
            None => log::info!(
                "Query {}: no response qualified for ranking ({} received)",
                pending.query_id,
                stats.total_models
            ),
        }

        CompletedRound {
            query_id: pending.query_id,
            responses: pending.responses,
            contents,
            evaluation,
            stats,
            raw_response,
        }
    }

    /// Runs both phases, or builds the system message for a transport failure.
    pub fn process(&self, outcome: QueryOutcome) -> DisplayPayload {
        match outcome {
            QueryOutcome::Received {
                query_id,
                responses,
            } => self.complete(self.begin(query_id, responses)).display_payload(),
            QueryOutcome::TransportFailed { message } => {
                log::warn!(
                    "Query failed before reaching any worker: {}",
                    message.as_deref().unwrap_or(DEFAULT_TRANSPORT_ERROR)
                );
                DisplayPayload::transport_error(message.as_deref())
            }
        }
    }

    /// Coordinator for highlighting once the display layer inserted the HTML.
    pub fn render_completion(&self) -> RenderCompletion {
        RenderCompletion::new(self.completion.clone())
    }
}
