//! Consultation summary: the HTML block shown for one answered query.

use crate::markdown::{escape_html, RenderedContent};
use crate::ranking::MasterEvaluation;
use crate::response::ModelResponse;
use crate::stats::model_display_name;

pub const NO_RESPONSE_MESSAGE: &str = "No response received from the models.";

/// Builds the summary HTML.
///
/// `contents[i]` is the display content of `responses[i]`; model names and
/// error texts are escaped here, contents are inserted as given.
pub fn consultation_html(
    responses: &[ModelResponse],
    contents: &[RenderedContent],
    evaluation: Option<&MasterEvaluation>,
) -> String {
    if responses.is_empty() {
        return NO_RESPONSE_MESSAGE.to_string();
    }

    let mut html = String::from("<div class=\"response-summary\">");

    if let Some(eval) = evaluation {
        let best = &responses[eval.best_index];
        html.push_str("<div class=\"master-evaluation\">");
        html.push_str(&format!(
            "<h4>🏆 Best Response: {}</h4>",
            display_name(best)
        ));
        html.push_str(&format!(
            "<p class=\"evaluation-reasoning\">{}</p>",
            escape_html(&eval.reasoning)
        ));
        html.push_str("</div>");
    }

    html.push_str(&format!(
        "<div class=\"consultation-header\"><strong>Consulted {} AI model(s):</strong></div>",
        responses.len()
    ));

    for (index, response) in responses.iter().enumerate() {
        let is_best = evaluation.is_some_and(|eval| eval.best_index == index);
        push_model_block(&mut html, response, contents.get(index), is_best);
    }

    if let Some(eval) = evaluation {
        html.push_str("<div class=\"rankings\"><h5>📊 Performance Ranking:</h5>");
        html.push_str("<ol class=\"ranking-list\">");
        for entry in &eval.rankings {
            html.push_str(&format!(
                "<li>{} (Score: {:.2})</li>",
                display_name(&responses[entry.index]),
                entry.score
            ));
        }
        html.push_str("</ol></div>");
    }

    html.push_str("</div>");
    html
}

fn push_model_block(
    html: &mut String,
    response: &ModelResponse,
    content: Option<&RenderedContent>,
    is_best: bool,
) {
    if is_best {
        html.push_str("<div class=\"model-response best-response\">");
        html.push_str("<div class=\"best-badge\">🏆 Best Response</div>");
    } else {
        html.push_str("<div class=\"model-response\">");
    }

    html.push_str(&format!(
        "<div class=\"model-header\"><strong>{}</strong>",
        display_name(response)
    ));
    if response.processing_time_ms > 0 {
        html.push_str(&format!(
            " <span class=\"processing-time\">({}ms)</span>",
            response.processing_time_ms
        ));
    }
    html.push_str("</div>");

    match response.error() {
        Some(error) => html.push_str(&format!(
            "<div class=\"error\">⚠️ Error: {}</div>",
            escape_html(error)
        )),
        None => {
            html.push_str(&format!(
                "<div class=\"response-content\">{}</div>",
                content.map(|c| c.html.as_str()).unwrap_or_default()
            ));
            if let Some(confidence) = response.confidence.filter(|c| c.is_finite()) {
                html.push_str(&format!(
                    "<div class=\"confidence\">Confidence: {}%</div>",
                    (confidence.clamp(0.0, 1.0) * 100.0).round()
                ));
            }
        }
    }
    html.push_str("</div>");
}

fn display_name(response: &ModelResponse) -> String {
    escape_html(&model_display_name(&response.model))
}
