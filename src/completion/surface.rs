use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::markdown::{escape_html, unescape_html, Language};

const PROCESSED_MARKER: &str = "data-highlighted=\"yes\"";

static CODE_ELEMENT: OnceLock<Regex> = OnceLock::new();
static LANGUAGE_CLASS: OnceLock<Regex> = OnceLock::new();

fn code_element() -> &'static Regex {
    CODE_ELEMENT.get_or_init(|| {
        Regex::new(r"(?s)<pre><code(?P<attrs>[^>]*)>(?P<body>.*?)</code></pre>")
            .expect("valid code element regex")
    })
}

fn language_class() -> &'static Regex {
    LANGUAGE_CLASS.get_or_init(|| {
        Regex::new(r#"class="(?:[^"]*\s)?language-(?P<lang>[^"\s]+)"#)
            .expect("valid language class regex")
    })
}

/// A code element that has not been highlighted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeElement {
    /// Position among all code elements of the surface.
    pub id: usize,
    /// Language tag written by the author, if any.
    pub language: Option<String>,
    /// Plain code text.
    pub code: String,
}

/// What to write back into a processed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockUpdate {
    pub language: Language,
    /// Highlighted inner HTML; `None` keeps the original escaped text.
    pub highlighted: Option<String>,
}

/// Somewhere code elements live after insertion, such as a document.
pub trait CodeSurface {
    /// Code elements not yet marked as processed.
    fn unprocessed(&self) -> Vec<CodeElement>;

    /// Writes `update` into element `id` and marks it processed for good.
    fn mark_processed(&mut self, id: usize, update: BlockUpdate);
}

/// An HTML document kept as markup.
///
/// Code elements are `<pre><code>` pairs as produced by the markdown renderer;
/// processed ones carry `data-highlighted="yes"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    html: String,
}

impl HtmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Appends a rendered fragment.
    pub fn insert(&mut self, fragment: &str) {
        self.html.push_str(fragment);
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

impl CodeSurface for HtmlDocument {
    fn unprocessed(&self) -> Vec<CodeElement> {
        code_element()
            .captures_iter(&self.html)
            .enumerate()
            .filter(|(_, caps)| !caps["attrs"].contains(PROCESSED_MARKER))
            .map(|(id, caps)| CodeElement {
                id,
                language: language_class()
                    .captures(&caps["attrs"])
                    .map(|lang| lang["lang"].to_string()),
                code: unescape_html(&caps["body"]),
            })
            .collect()
    }

    fn mark_processed(&mut self, id: usize, update: BlockUpdate) {
        let mut seen = 0usize;
        let replaced = code_element().replace_all(&self.html, |caps: &Captures<'_>| {
            let current = seen;
            seen += 1;
            if current != id {
                return caps[0].to_string();
            }
            let class = if update.language.is_none() {
                "nohighlight".to_string()
            } else {
                format!("language-{}", escape_html(update.language.tag()))
            };
            let body = update.highlighted.as_deref().unwrap_or(&caps["body"]);
            format!("<pre><code class=\"{class}\" {PROCESSED_MARKER}>{body}</code></pre>")
        });
        self.html = replaced.into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BLOCKS: &str = "<p>x</p>\n<pre><code class=\"language-rust\">let a = &amp;b;\n</code></pre>\n<pre><code>SELECT 1;\n</code></pre>\n";

    #[test]
    fn lists_unprocessed_elements() {
        let doc = HtmlDocument::from_html(TWO_BLOCKS);
        let elements = doc.unprocessed();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].language.as_deref(), Some("rust"));
        assert_eq!(elements[0].code, "let a = &b;\n");
        assert_eq!(elements[1].id, 1);
        assert_eq!(elements[1].language, None);
    }

    #[test]
    fn marking_is_monotonic() {
        let mut doc = HtmlDocument::from_html(TWO_BLOCKS);
        doc.mark_processed(
            1,
            BlockUpdate {
                language: Language::Sql,
                highlighted: Some("<span>SELECT</span> 1;\n".into()),
            },
        );
        let remaining = doc.unprocessed();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 0);
        assert!(doc
            .html()
            .contains("<pre><code class=\"language-sql\" data-highlighted=\"yes\"><span>SELECT</span> 1;\n</code></pre>"));
    }

    #[test]
    fn skipped_block_keeps_text() {
        let mut doc = HtmlDocument::from_html("<pre><code>plain &lt;text&gt;</code></pre>");
        doc.mark_processed(
            0,
            BlockUpdate {
                language: Language::None,
                highlighted: None,
            },
        );
        assert_eq!(
            doc.html(),
            "<pre><code class=\"nohighlight\" data-highlighted=\"yes\">plain &lt;text&gt;</code></pre>"
        );
        assert!(doc.unprocessed().is_empty());
    }
}
