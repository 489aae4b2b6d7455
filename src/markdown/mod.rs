//! Turning raw worker output into safe display content.
//!
//! Raw text flows through [`sanitize()`], [`process_nested_markdown`] and the
//! [`MarkdownRenderer`]. Code blocks are tagged by the [`LanguageClassifier`]
//! and highlighted later by a [`Highlighter`].

mod language;
mod nested;
mod render;
mod sanitize;
mod syntax;

pub use language::{Language, LanguageClassifier, LanguageRule};
pub use nested::{matching_rule, process_nested_markdown, UnwrapRule, RULES as UNWRAP_RULES};
pub use render::{MarkdownRenderer, NormalizedContent, RenderOptions, RenderPhase, RenderedContent};
pub use sanitize::{escape_html, sanitize, unescape_html};
pub use syntax::{Highlighter, SyntectHighlighter};
