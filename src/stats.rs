//! Round statistics shown next to a consultation.

use serde::Serialize;

use crate::response::ModelResponse;

/// Aggregate numbers for one query round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStats {
    pub total_models: usize,
    pub successful: usize,
    pub failed: usize,
    /// Rounded percentage of responses without an error; 0 for an empty round.
    pub success_rate: u32,
    /// Rounded mean over responses that reported a processing time.
    pub average_response_time_ms: u64,
}

impl RoundStats {
    pub fn from_responses(responses: &[ModelResponse]) -> Self {
        let total_models = responses.len();
        let failed = responses.iter().filter(|r| r.is_error()).count();
        let successful = total_models - failed;
        let success_rate = if total_models == 0 {
            0
        } else {
            (successful as f64 * 100.0 / total_models as f64).round() as u32
        };

        let timed: Vec<u64> = responses
            .iter()
            .map(|r| r.processing_time_ms)
            .filter(|ms| *ms > 0)
            .collect();
        let average_response_time_ms = if timed.is_empty() {
            0
        } else {
            (timed.iter().sum::<u64>() as f64 / timed.len() as f64).round() as u64
        };

        Self {
            total_models,
            successful,
            failed,
            success_rate,
            average_response_time_ms,
        }
    }
}

const KNOWN_MODELS: [(&str, &str); 4] = [
    ("gpt-4", "GPT-4"),
    ("claude-3-sonnet", "Claude 3 Sonnet"),
    ("llama-3.1", "LLaMA 3.1"),
    ("deepseek-coder", "DeepSeek Coder"),
];

/// Human-readable name for a model identifier; unknown ids pass through.
pub fn model_display_name(model: &str) -> String {
    if let Some((_, name)) = KNOWN_MODELS.iter().find(|(id, _)| *id == model) {
        return (*name).to_string();
    }
    if let Some(n) = model.strip_prefix("Qwen-Worker-") {
        if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) {
            return format!("Qwen W{n}");
        }
    }
    model.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn counts_successes_and_averages_timed_responses() {
        let responses = vec![
            ModelResponse::success("a", "x").processing_time(1000),
            ModelResponse::success("b", "y").processing_time(2001),
            ModelResponse::failure("c", "boom"),
        ];
        let stats = RoundStats::from_responses(&responses);
        assert_eq!(stats.total_models, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.success_rate, 67);
        assert_eq!(stats.average_response_time_ms, 1501);
    }

    #[test]
    fn empty_round_is_all_zero() {
        assert_eq!(RoundStats::from_responses(&[]), RoundStats::default());
    }

    #[rstest]
    #[case("gpt-4", "GPT-4")]
    #[case("claude-3-sonnet", "Claude 3 Sonnet")]
    #[case("llama-3.1", "LLaMA 3.1")]
    #[case("deepseek-coder", "DeepSeek Coder")]
    #[case("Qwen-Worker-3", "Qwen W3")]
    #[case("Qwen-Worker-", "Qwen-Worker-")]
    #[case("mistral", "mistral")]
    fn display_names(#[case] model: &str, #[case] expected: &str) {
        assert_eq!(model_display_name(model), expected);
    }
}
