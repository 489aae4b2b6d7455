use std::sync::OnceLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::language::Language;
use crate::error::HivemindError;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

/// Turns code into highlighted HTML for the inside of a `<code>` element.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &Language) -> Result<String, HivemindError>;
}

/// Class-based highlighter backed by syntect's default syntaxes.
///
/// Output uses space-separated scope classes, leaving colors to a stylesheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntectHighlighter;

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &Language) -> Result<String, HivemindError> {
        let syntax_set = syntax_set();
        let syntax = syntax_token(language)
            .and_then(|token| syntax_set.find_syntax_by_token(token))
            .unwrap_or_else(|| syntax_set.find_syntax_plain_text());
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

fn syntax_token(language: &Language) -> Option<&str> {
    match language {
        Language::Shell => Some("bash"),
        Language::JavaScript => Some("js"),
        // The default syntax set has no TypeScript grammar.
        Language::TypeScript => Some("js"),
        Language::Python => Some("py"),
        Language::Java => Some("java"),
        Language::CSharp => Some("cs"),
        Language::Go => Some("go"),
        Language::Rust => Some("rs"),
        Language::Sql => Some("sql"),
        Language::Json => Some("json"),
        Language::Yaml => Some("yaml"),
        Language::Html => Some("html"),
        Language::Css => Some("css"),
        Language::Other(tag) => Some(tag),
        Language::None => None,
    }
}

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}
