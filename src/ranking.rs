//! Composite scoring of worker responses.
//!
//! Every response with a non-blank output gets a score from three parts:
//! output length (saturating), reported confidence and speed. The highest
//! score becomes the best response; ties keep the original order.

#[path = "ranking/config.rs"]
mod config;

#[path = "ranking/types.rs"]
mod types;

#[path = "ranking/engine.rs"]
mod engine;

pub use config::RankingConfig;
pub use engine::RankingEngine;
pub use types::{MasterEvaluation, RankingEntry, ScoreBreakdown};
