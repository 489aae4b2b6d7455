use crate::markdown::{Highlighter, LanguageClassifier, SyntectHighlighter};

use super::config::CompletionConfig;
use super::surface::{BlockUpdate, CodeElement, CodeSurface};
use super::timer::{Timer, TokioTimer};

/// Summary of one coordinator run. Never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightReport {
    /// Polls performed.
    pub attempts: usize,
    /// Elements highlighted.
    pub highlighted: usize,
    /// Elements tagged as "no highlighting".
    pub skipped: usize,
    /// Elements whose highlighting failed; they are marked processed anyway.
    pub failed: usize,
}

impl HighlightReport {
    pub fn processed(&self) -> usize {
        self.highlighted + self.skipped + self.failed
    }

    /// True when no unprocessed element was ever found.
    pub fn found_nothing(&self) -> bool {
        self.processed() == 0
    }
}

/// Applies language classification and highlighting to newly inserted code.
pub struct RenderCompletion {
    config: CompletionConfig,
    classifier: LanguageClassifier,
    highlighter: Box<dyn Highlighter>,
    timer: Box<dyn Timer>,
}

impl RenderCompletion {
    /// Creates a coordinator with the syntect highlighter and the tokio timer.
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            classifier: LanguageClassifier::default(),
            highlighter: Box::new(SyntectHighlighter),
            timer: Box::new(TokioTimer),
        }
    }

    pub fn classifier(mut self, classifier: LanguageClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn highlighter<H>(mut self, highlighter: H) -> Self
    where
        H: Highlighter + 'static,
    {
        self.highlighter = Box::new(highlighter);
        self
    }

    pub fn timer<T>(mut self, timer: T) -> Self
    where
        T: Timer + 'static,
    {
        self.timer = Box::new(timer);
        self
    }

    /// Polls `surface` until unprocessed code shows up or attempts run out.
    ///
    /// The first poll is immediate; poll `n` waits `n * base_delay` first.
    /// Polling stops after the first poll that finds anything.
    pub async fn run<S>(&self, surface: &mut S) -> HighlightReport
    where
        S: CodeSurface + ?Sized,
    {
        for attempt in 0..self.config.max_attempts {
            if attempt > 0 {
                self.timer.sleep(self.config.delay_for(attempt)).await;
            }
            let pending = surface.unprocessed();
            log::debug!(
                "render completion attempt {}: {} unprocessed code block(s)",
                attempt + 1,
                pending.len()
            );
            if pending.is_empty() {
                continue;
            }
            let mut report = HighlightReport {
                attempts: attempt + 1,
                ..HighlightReport::default()
            };
            for element in pending {
                self.process(surface, element, &mut report);
            }
            return report;
        }

        log::info!(
            "No new code blocks highlighted after {} attempt(s)",
            self.config.max_attempts
        );
        HighlightReport {
            attempts: self.config.max_attempts,
            ..HighlightReport::default()
        }
    }

    fn process<S>(&self, surface: &mut S, element: CodeElement, report: &mut HighlightReport)
    where
        S: CodeSurface + ?Sized,
    {
        let language = self
            .classifier
            .resolve(element.language.as_deref(), &element.code);
        if language.is_none() {
            report.skipped += 1;
            surface.mark_processed(
                element.id,
                BlockUpdate {
                    language,
                    highlighted: None,
                },
            );
            return;
        }
        let highlighted = match self.highlighter.highlight(&element.code, &language) {
            Ok(html) => {
                report.highlighted += 1;
                Some(html)
            }
            Err(err) => {
                log::warn!("Failed to highlight {language} block #{}: {err}", element.id);
                report.failed += 1;
                None
            }
        };
        surface.mark_processed(
            element.id,
            BlockUpdate {
                language,
                highlighted,
            },
        );
    }
}
