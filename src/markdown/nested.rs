//! Removal of redundant ```` ```markdown ```` wrapping.
//!
//! Some workers wrap their whole answer (or the interesting part of it) in a
//! fence labeled `markdown`, which a renderer would show as a literal code
//! block. The input is scanned line by line into prose and markdown-fence
//! segments, then the first rule of [`RULES`] that applies produces the
//! output.
//!
//! Inside a markdown fence, a fence line carrying an info string opens a
//! nested block and a bare fence line closes the innermost open block, so
//! code samples inside the wrapped answer stay intact. Outside markdown
//! fences, regular code blocks are skipped whole: a ```` ```markdown ```` line
//! inside a ```` ```text ```` block is never unwrapped.
//!
//! Every top-level markdown fence is unwrapped, and unwrapping repeats until
//! none is left. This makes [`process_nested_markdown`] idempotent.

use std::sync::OnceLock;

use regex::Regex;

static FENCE_LINE: OnceLock<Regex> = OnceLock::new();

fn fence_line() -> &'static Regex {
    FENCE_LINE.get_or_init(|| {
        Regex::new(r"^[ \t]{0,3}(?P<ticks>`{3,})[ \t]*(?P<info>[^`\s]*)[^`]*$")
            .expect("valid fence regex")
    })
}

/// Unwrap rules in precedence order.
pub const RULES: [UnwrapRule; 3] = [
    UnwrapRule::WholeFence,
    UnwrapRule::EmbeddedFence,
    UnwrapRule::Passthrough,
];

/// One way of turning scanned segments into output text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwrapRule {
    /// The whole input is one markdown fence: return its interior.
    WholeFence,
    /// Prose and markdown fences are mixed: join prose and interiors with blank lines.
    EmbeddedFence,
    /// Nothing to unwrap: return the input unchanged.
    Passthrough,
}

impl UnwrapRule {
    fn apply(self, text: &str, segments: &[Segment<'_>]) -> Option<String> {
        match self {
            UnwrapRule::WholeFence => match segments {
                [Segment::Markdown(inner)] => Some(inner.join("\n").trim().to_string()),
                _ => None,
            },
            UnwrapRule::EmbeddedFence => {
                if !segments.iter().any(Segment::is_markdown) {
                    return None;
                }
                let parts = segments
                    .iter()
                    .map(|segment| segment.lines().join("\n").trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>();
                Some(parts.join("\n\n"))
            }
            UnwrapRule::Passthrough => Some(text.to_string()),
        }
    }
}

/// Picks the first rule of [`RULES`] that applies to `text`.
pub fn matching_rule(text: &str) -> UnwrapRule {
    let segments = scan(text);
    RULES
        .iter()
        .copied()
        .find(|rule| rule.apply(text, &segments).is_some())
        .unwrap_or(UnwrapRule::Passthrough)
}

/// Removes markdown-labeled fences wrapping worker output.
///
/// Malformed input (for example an unclosed fence) is returned trimmed but
/// otherwise unchanged.
pub fn process_nested_markdown(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let segments = scan(&current);
        let applied = RULES
            .iter()
            .find_map(|rule| rule.apply(&current, &segments).map(|out| (*rule, out)));
        match applied {
            Some((UnwrapRule::Passthrough, _)) | None => return current,
            Some((rule, out)) => {
                log::debug!("nested markdown: applied {rule:?}");
                current = out;
            }
        }
    }
}

#[derive(Debug)]
enum Segment<'a> {
    Prose(Vec<&'a str>),
    Markdown(Vec<&'a str>),
}

impl<'a> Segment<'a> {
    fn is_markdown(&self) -> bool {
        matches!(self, Segment::Markdown(_))
    }

    fn lines(&self) -> &[&'a str] {
        match self {
            Segment::Prose(lines) | Segment::Markdown(lines) => lines,
        }
    }
}

struct Fence<'a> {
    ticks: usize,
    info: &'a str,
}

impl Fence<'_> {
    fn is_bare(&self) -> bool {
        self.info.is_empty()
    }

    fn is_markdown(&self) -> bool {
        self.info.eq_ignore_ascii_case("markdown") || self.info.eq_ignore_ascii_case("md")
    }
}

fn parse_fence(line: &str) -> Option<Fence<'_>> {
    let caps = fence_line().captures(line)?;
    Some(Fence {
        ticks: caps.name("ticks")?.as_str().len(),
        info: caps.name("info").map_or("", |m| m.as_str()),
    })
}

struct OpenFence<'a> {
    ticks: usize,
    opener: &'a str,
    nested: Vec<usize>,
    interior: Vec<&'a str>,
}

enum State<'a> {
    Prose,
    Code { ticks: usize },
    Markdown(OpenFence<'a>),
}

struct Scanner<'a> {
    segments: Vec<Segment<'a>>,
    prose: Vec<&'a str>,
    state: State<'a>,
}

impl<'a> Scanner<'a> {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            prose: Vec::new(),
            state: State::Prose,
        }
    }

    fn feed(&mut self, line: &'a str) {
        let fence = parse_fence(line);
        self.state = match std::mem::replace(&mut self.state, State::Prose) {
            State::Prose => self.prose_line(line, fence),
            State::Code { ticks } => {
                self.prose.push(line);
                match fence {
                    Some(fence) if fence.is_bare() && fence.ticks >= ticks => State::Prose,
                    _ => State::Code { ticks },
                }
            }
            State::Markdown(open) => self.markdown_line(open, line, fence),
        };
    }

    fn prose_line(&mut self, line: &'a str, fence: Option<Fence<'a>>) -> State<'a> {
        match fence {
            Some(fence) if fence.is_markdown() => State::Markdown(OpenFence {
                ticks: fence.ticks,
                opener: line,
                nested: Vec::new(),
                interior: Vec::new(),
            }),
            Some(fence) => {
                self.prose.push(line);
                State::Code { ticks: fence.ticks }
            }
            None => {
                self.prose.push(line);
                State::Prose
            }
        }
    }

    fn markdown_line(
        &mut self,
        mut open: OpenFence<'a>,
        line: &'a str,
        fence: Option<Fence<'a>>,
    ) -> State<'a> {
        match fence {
            Some(fence) if !fence.is_bare() => open.nested.push(fence.ticks),
            Some(fence) => {
                if open.nested.pop().is_none() && fence.ticks >= open.ticks {
                    self.flush_prose();
                    self.segments.push(Segment::Markdown(open.interior));
                    return State::Prose;
                }
            }
            None => {}
        }
        open.interior.push(line);
        State::Markdown(open)
    }

    fn flush_prose(&mut self) {
        if !self.prose.is_empty() {
            self.segments
                .push(Segment::Prose(std::mem::take(&mut self.prose)));
        }
    }

    fn finish(mut self) -> Vec<Segment<'a>> {
        // An unclosed markdown fence is ordinary text.
        if let State::Markdown(open) = std::mem::replace(&mut self.state, State::Prose) {
            self.prose.push(open.opener);
            self.prose.extend(open.interior);
        }
        self.flush_prose();
        self.segments
    }
}

fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut scanner = Scanner::new();
    for line in text.lines() {
        scanner.feed(line);
    }
    scanner.finish()
}
