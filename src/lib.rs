//! Hivemind: ranks the answers of several language-model workers to one query
//! and turns their raw outputs into safe, highlighted display content.
//!
//! ```no_run
//! use hivemind::{ModelResponse, Pipeline, PipelineConfig, QueryOutcome};
//!
//! let pipeline = Pipeline::new(&PipelineConfig::default());
//! let payload = pipeline.process(QueryOutcome::Received {
//!     query_id: "query_1".into(),
//!     responses: vec![ModelResponse::success("gpt-4", "**hello**").confidence(0.8)],
//! });
//! println!("{}", payload.rendered_html);
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod markdown;
pub mod pipeline;
pub mod ranking;
pub mod response;
pub mod stats;
pub mod summary;

pub use completion::{CompletionConfig, HighlightReport, HtmlDocument, RenderCompletion};
pub use config::{load_config, save_config, ConfigError, LoggingConfig, PipelineConfig};
pub use error::HivemindError;
pub use markdown::{Language, LanguageClassifier, MarkdownRenderer, RenderOptions};
pub use pipeline::{CompletedRound, DisplayPayload, MessageKind, PendingRound, Pipeline, QueryOutcome};
pub use ranking::{MasterEvaluation, RankingConfig, RankingEngine, RankingEntry};
pub use response::{ModelResponse, QueryPayload, WorkerOutcome, WorkerParams};
pub use stats::{model_display_name, RoundStats};
