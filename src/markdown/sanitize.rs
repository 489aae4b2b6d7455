use std::sync::OnceLock;

use regex::Regex;

static REASONING_SPAN: OnceLock<Regex> = OnceLock::new();

fn reasoning_span() -> &'static Regex {
    REASONING_SPAN
        .get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid reasoning regex"))
}

/// Removes every `<think>...</think>` span and trims the result.
///
/// Spans are matched non-greedily, so text between two spans survives.
/// Code fences and markdown punctuation are left as they are.
pub fn sanitize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    reasoning_span().replace_all(raw, "").trim().to_string()
}

/// Escapes text so it can be placed into HTML without being interpreted.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Reverses [`escape_html`] plus the entities pulldown-cmark emits for code.
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
