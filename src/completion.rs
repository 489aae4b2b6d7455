//! Highlighting of code blocks once rendered HTML has reached the document.
//!
//! Insertion into a document is not observable from the pipeline, so
//! [`RenderCompletion`] polls the [`CodeSurface`] for code elements that have
//! not been highlighted yet, waiting `attempt * base_delay` between polls. The
//! number of polls is bounded; there is no wall-clock deadline.

#[path = "completion/config.rs"]
mod config;

#[path = "completion/timer.rs"]
mod timer;

#[path = "completion/surface.rs"]
mod surface;

#[path = "completion/coordinator.rs"]
mod coordinator;

pub use config::CompletionConfig;
pub use coordinator::{HighlightReport, RenderCompletion};
pub use surface::{BlockUpdate, CodeElement, CodeSurface, HtmlDocument};
pub use timer::{Timer, TokioTimer};
