use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use super::language::{Language, LanguageClassifier};
use super::nested::process_nested_markdown;
use super::sanitize::{escape_html, sanitize};

/// Fixed renderer configuration.
///
/// Heading ids are never generated and code is never highlighted here;
/// highlighting happens once the HTML is in the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Tables, strikethrough, task lists and footnotes
    pub gfm: bool,
    /// Render soft line breaks as `<br />`
    pub hard_breaks: bool,
    /// Typographic quotes and dashes
    pub smart_punctuation: bool,
    /// Show raw HTML from the model as text instead of passing it through
    pub escape_raw_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            hard_breaks: true,
            smart_punctuation: true,
            escape_raw_html: true,
        }
    }
}

impl RenderOptions {
    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }
}

/// Which render pass produced a [`RenderedContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPhase {
    /// Escaped text shown while scoring is still running.
    Placeholder,
    /// Final markdown rendering.
    Rendered,
}

/// Display content for one worker output.
///
/// Always keeps the cleaned source text, so the final pass renders from it and
/// never from HTML produced earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedContent {
    pub cleaned_text: String,
    pub html: String,
    pub phase: RenderPhase,
}

/// Everything derived from one output string. Pure function of its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedContent {
    pub cleaned_text: String,
    pub rendered_html: String,
    pub detected_language_tags: Vec<Language>,
}

/// Markdown to HTML adapter around pulldown-cmark.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
    classifier: LanguageClassifier,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            classifier: LanguageClassifier::default(),
        }
    }

    /// Replaces the classifier used for untagged code blocks.
    pub fn classifier(mut self, classifier: LanguageClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Strips reasoning spans and redundant markdown fences.
    pub fn clean(&self, raw: Option<&str>) -> String {
        process_nested_markdown(&sanitize(raw))
    }

    /// First pass: escaped text that is safe to insert right away.
    pub fn placeholder(&self, raw: Option<&str>) -> RenderedContent {
        let cleaned_text = self.clean(raw);
        let html = format!(
            "<div class=\"pending-render\">{}</div>",
            escape_html(&cleaned_text).replace('\n', "<br>")
        );
        RenderedContent {
            cleaned_text,
            html,
            phase: RenderPhase::Placeholder,
        }
    }

    /// Second pass: renders the cleaned text of `content` as markdown.
    pub fn finalize(&self, content: &RenderedContent) -> RenderedContent {
        RenderedContent {
            cleaned_text: content.cleaned_text.clone(),
            html: self.render_html(&content.cleaned_text),
            phase: RenderPhase::Rendered,
        }
    }

    /// Runs both passes and reports the code block languages.
    pub fn normalize(&self, raw: Option<&str>) -> NormalizedContent {
        let cleaned_text = self.clean(raw);
        NormalizedContent {
            rendered_html: self.render_html(&cleaned_text),
            detected_language_tags: self.code_languages(&cleaned_text),
            cleaned_text,
        }
    }

    /// Renders markdown to HTML with the configured options.
    ///
    /// Link and image destinations with a scheme other than http, https or
    /// mailto are replaced by `#`.
    pub fn render_html(&self, markdown: &str) -> String {
        let hard_breaks = self.options.hard_breaks;
        let escape_raw_html = self.options.escape_raw_html;
        let parser = Parser::new_ext(markdown, self.options.parser_options()).map(|event| {
            match event {
                Event::SoftBreak if hard_breaks => Event::HardBreak,
                Event::Html(raw) | Event::InlineHtml(raw) if escape_raw_html => Event::Text(raw),
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
                    link_type,
                    dest_url: "#".into(),
                    title,
                    id,
                }),
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
                    link_type,
                    dest_url: "#".into(),
                    title,
                    id,
                }),
                other => other,
            }
        });
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    /// Languages of all code blocks in order; untagged blocks are classified.
    pub fn code_languages(&self, markdown: &str) -> Vec<Language> {
        let mut collector = CodeBlockCollector::new(&self.classifier);
        for event in Parser::new_ext(markdown, self.options.parser_options()) {
            collector.handle_event(event);
        }
        collector.languages
    }
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Relative paths, fragments and http(s)/mailto URLs are safe to emit.
fn is_safe_url(url: &str) -> bool {
    let url = url.trim_start();
    let scheme_end = url.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(pos) if url[pos..].starts_with(':') => SAFE_SCHEMES
            .iter()
            .any(|scheme| url[..pos].eq_ignore_ascii_case(scheme)),
        _ => true,
    }
}

struct CodeBlockCollector<'c> {
    classifier: &'c LanguageClassifier,
    languages: Vec<Language>,
    in_code_block: bool,
    code_block_lang: Option<String>,
    code_block_buf: String,
}

impl<'c> CodeBlockCollector<'c> {
    fn new(classifier: &'c LanguageClassifier) -> Self {
        Self {
            classifier,
            languages: Vec::new(),
            in_code_block: false,
            code_block_lang: None,
            code_block_buf: String::new(),
        }
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => self.start_code_block(kind),
            Event::End(TagEnd::CodeBlock) => self.end_code_block(),
            Event::Text(text) if self.in_code_block => self.code_block_buf.push_str(&text),
            _ => {}
        }
    }

    fn start_code_block(&mut self, kind: CodeBlockKind<'_>) {
        self.in_code_block = true;
        self.code_block_buf.clear();
        self.code_block_lang = match kind {
            CodeBlockKind::Fenced(info) => info
                .split(|c: char| c.is_whitespace() || c == ',')
                .next()
                .filter(|lang| !lang.is_empty())
                .map(str::to_string),
            CodeBlockKind::Indented => None,
        };
    }

    fn end_code_block(&mut self) {
        let lang = self.code_block_lang.take();
        let language = self
            .classifier
            .resolve(lang.as_deref(), &self.code_block_buf);
        self.languages.push(language);
        self.in_code_block = false;
        self.code_block_buf.clear();
    }
}
