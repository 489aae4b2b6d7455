use std::time::Instant;

use crate::response::ModelResponse;

use super::config::RankingConfig;
use super::types::{MasterEvaluation, RankingEntry, ScoreBreakdown};

/// Heuristic ranking of worker responses. Makes no network calls.
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Scores one response, or returns `None` when it is not eligible.
    pub fn score(&self, response: &ModelResponse) -> Option<ScoreBreakdown> {
        let output = response.ranked_output()?;
        let length = self.length_score(output);
        let confidence = self.confidence_score(response.confidence);
        let speed = self.speed_score(response.processing_time_ms);
        let weighted = self.config.length_weight * length
            + self.config.confidence_weight * confidence
            + self.config.speed_weight * speed;
        let composite = round2(weighted / self.config.weight_sum()).clamp(0.0, 1.0);
        Some(ScoreBreakdown {
            length,
            confidence,
            speed,
            composite,
        })
    }

    /// Ranks all eligible responses. Returns `None` when none is eligible.
    pub fn evaluate(&self, responses: &[ModelResponse]) -> Option<MasterEvaluation> {
        let start = Instant::now();
        let mut rankings = responses
            .iter()
            .enumerate()
            .filter_map(|(index, response)| {
                self.score(response).map(|breakdown| RankingEntry {
                    index,
                    score: breakdown.composite,
                    reasoning: self.entry_reasoning(response, breakdown.composite),
                })
            })
            .collect::<Vec<_>>();

        for (index, response) in responses.iter().enumerate() {
            if let Some(error) = response.error() {
                log::warn!("Excluding {} (#{index}) from ranking: {error}", response.model);
            }
        }

        // Stable sort: equal scores keep their original order.
        rankings.sort_by(|a, b| b.score.total_cmp(&a.score));
        let best = rankings.first()?;
        let best_index = best.index;
        let reasoning = self.best_reasoning(&responses[best_index], best.score);
        let evaluation_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        log::debug!(
            "Ranked {} of {} responses in {evaluation_time_ms} ms, best #{best_index}",
            rankings.len(),
            responses.len()
        );

        Some(MasterEvaluation {
            best_index,
            reasoning,
            rankings,
            evaluation_time_ms,
        })
    }

    fn length_score(&self, output: &str) -> f64 {
        let chars = output.chars().count() as f64;
        (chars / self.config.length_saturation as f64).min(1.0)
    }

    fn confidence_score(&self, confidence: Option<f64>) -> f64 {
        confidence
            .filter(|c| c.is_finite())
            .unwrap_or(self.config.default_confidence)
            .clamp(0.0, 1.0)
    }

    fn speed_score(&self, processing_time_ms: u64) -> f64 {
        let ceiling = self.config.speed_ceiling_ms as f64;
        ((ceiling - processing_time_ms as f64) / ceiling).max(0.0)
    }

    fn entry_reasoning(&self, response: &ModelResponse, score: f64) -> String {
        let mut reasons = vec![quality_tag(score)];
        let confidence = self.confidence_score(response.confidence);
        if confidence >= 0.8 {
            reasons.push("high confidence");
        } else if confidence >= 0.6 {
            reasons.push("moderate confidence");
        }
        let length = trimmed_len(response);
        if (200..=800).contains(&length) {
            reasons.push("optimal length");
        } else if length < 100 {
            reasons.push("too brief");
        } else if length > 1000 {
            reasons.push("verbose");
        }
        reasons.join(", ")
    }

    fn best_reasoning(&self, response: &ModelResponse, score: f64) -> String {
        format!(
            "{} provided the best response with {} quality (score: {:.2}). \
             The response reports confidence {:.2}, has {} chars and took {} ms.",
            response.model,
            best_quality(score),
            score,
            self.confidence_score(response.confidence),
            trimmed_len(response),
            response.processing_time_ms
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trimmed_len(response: &ModelResponse) -> usize {
    response
        .output()
        .map(|text| text.trim().chars().count())
        .unwrap_or(0)
}

fn quality_tag(score: f64) -> &'static str {
    if score >= 0.8 {
        "excellent quality"
    } else if score >= 0.6 {
        "good quality"
    } else if score >= 0.4 {
        "fair quality"
    } else {
        "needs improvement"
    }
}

fn best_quality(score: f64) -> &'static str {
    if score >= 0.8 {
        "exceptional"
    } else if score >= 0.7 {
        "high"
    } else if score >= 0.6 {
        "good"
    } else {
        "acceptable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn engine() -> RankingEngine {
        RankingEngine::default()
    }

    #[test]
    fn ranks_long_confident_fast_answer_first() {
        let responses = vec![
            ModelResponse::success("A", "x".repeat(600))
                .confidence(0.9)
                .processing_time(1000),
            ModelResponse::success("B", "short")
                .confidence(0.5)
                .processing_time(4000),
        ];
        let evaluation = engine().evaluate(&responses).unwrap();
        assert_eq!(evaluation.best_index, 0);
        assert_eq!(evaluation.rankings[0].score, 0.90);
        assert_eq!(evaluation.rankings[1].index, 1);
        assert_eq!(evaluation.rankings[1].score, 0.26);
        assert!(evaluation.reasoning.starts_with("A provided the best response"));
        assert!(evaluation.reasoning.contains("confidence 0.90"));
        assert!(evaluation.reasoning.contains("600 chars"));
        assert!(evaluation.reasoning.contains("1000 ms"));
    }

    #[test]
    fn all_errors_yield_no_evaluation() {
        let responses = vec![
            ModelResponse::failure("A", "timeout"),
            ModelResponse::failure("B", "refused"),
        ];
        assert!(engine().evaluate(&responses).is_none());
    }

    #[test]
    fn empty_list_yields_no_evaluation() {
        assert!(engine().evaluate(&[]).is_none());
    }

    #[test]
    fn errors_keep_original_indices_of_siblings() {
        let responses = vec![
            ModelResponse::failure("A", "timeout"),
            ModelResponse::success("B", "an answer"),
        ];
        let evaluation = engine().evaluate(&responses).unwrap();
        assert_eq!(evaluation.rankings.len(), 1);
        assert_eq!(evaluation.best_index, 1);
    }

    #[test]
    fn ties_resolve_to_first_seen() {
        let responses = vec![
            ModelResponse::success("A", "same"),
            ModelResponse::success("B", "same"),
            ModelResponse::success("C", "same"),
        ];
        let evaluation = engine().evaluate(&responses).unwrap();
        let order: Vec<usize> = evaluation.rankings.iter().map(|e| e.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(evaluation.best_index, 0);
    }

    #[test]
    fn missing_confidence_is_neutral() {
        let breakdown = engine()
            .score(&ModelResponse::success("A", "text"))
            .unwrap();
        assert_eq!(breakdown.confidence, 0.5);
        assert_eq!(breakdown.speed, 1.0);
    }

    #[test]
    fn slow_answers_get_no_speed_score() {
        let breakdown = engine()
            .score(&ModelResponse::success("A", "text").processing_time(9000))
            .unwrap();
        assert_eq!(breakdown.speed, 0.0);
    }

    #[test]
    fn custom_weights_are_normalized() {
        let config = RankingConfig {
            length_weight: 1.0,
            confidence_weight: 1.0,
            speed_weight: 1.0,
            ..RankingConfig::default()
        };
        let breakdown = RankingEngine::new(config)
            .score(&ModelResponse::success("A", "x".repeat(500)).confidence(1.0))
            .unwrap();
        assert_eq!(breakdown.composite, 1.0);
    }

    #[rstest]
    #[case(0.85, "excellent quality")]
    #[case(0.8, "excellent quality")]
    #[case(0.65, "good quality")]
    #[case(0.45, "fair quality")]
    #[case(0.1, "needs improvement")]
    fn quality_bands(#[case] score: f64, #[case] expected: &str) {
        assert_eq!(quality_tag(score), expected);
    }

    #[test]
    fn entry_reasoning_lists_factors() {
        let response = ModelResponse::success("A", "y".repeat(300)).confidence(0.85);
        let reasoning = engine().entry_reasoning(&response, 0.82);
        assert_eq!(reasoning, "excellent quality, high confidence, optimal length");
    }

    fn response(len: usize, confidence: f64, ms: u64) -> ModelResponse {
        ModelResponse::success("M", "z".repeat(len))
            .confidence(confidence)
            .processing_time(ms)
    }

    proptest! {
        #[test]
        fn composite_is_within_unit_range(
            len in 1usize..2000,
            confidence in -1.0f64..2.0,
            ms in 0u64..20_000,
        ) {
            let score = engine().score(&response(len, confidence, ms)).unwrap().composite;
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn monotonic_in_each_factor(
            len in 1usize..600,
            extra_len in 0usize..600,
            confidence in 0.0f64..1.0,
            extra_conf in 0.0f64..1.0,
            ms in 0u64..8000,
            extra_ms in 0u64..8000,
        ) {
            let e = engine();
            let base = e.score(&response(len, confidence, ms)).unwrap().composite;
            let longer = e.score(&response(len + extra_len, confidence, ms)).unwrap().composite;
            let surer = e
                .score(&response(len, (confidence + extra_conf).min(1.0), ms))
                .unwrap()
                .composite;
            let slower = e.score(&response(len, confidence, ms + extra_ms)).unwrap().composite;
            prop_assert!(longer >= base);
            prop_assert!(surer >= base);
            prop_assert!(slower <= base);
        }

        #[test]
        fn best_index_is_highest_scored(
            specs in prop::collection::vec((1usize..800, 0.0f64..1.0, 0u64..6000), 1..8),
        ) {
            let responses: Vec<_> = specs.iter().map(|(l, c, m)| response(*l, *c, *m)).collect();
            let evaluation = engine().evaluate(&responses).unwrap();
            prop_assert_eq!(evaluation.best_index, evaluation.rankings[0].index);
            for pair in evaluation.rankings.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].index < pair[1].index);
                }
            }
        }
    }
}
