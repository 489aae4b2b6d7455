use hivemind::completion::{CodeSurface, HtmlDocument};
use hivemind::markdown::process_nested_markdown;
use hivemind::{
    Language, LanguageClassifier, MessageKind, Pipeline, PipelineConfig, QueryOutcome,
    QueryPayload,
};

const REPLY: &str = r#"{
    "queryId": "query_42",
    "results": [
        {
            "model": "Qwen-Worker-1",
            "output": "<think>work it out</think>```markdown\n# Answer\n\nUse this:\n\n```sql\nSELECT * FROM users WHERE id = 1\n```\n```",
            "error": "",
            "processingTime": 1200,
            "confidence": 0.82,
            "workerParams": {"temperature": 0.7, "top_k": 40, "top_p": 0.8, "worker_id": "w1"}
        },
        {
            "model": "Qwen-Worker-2",
            "error": "worker timed out",
            "processingTime": 30000
        },
        {
            "model": "Qwen-Worker-3",
            "output": "ok",
            "processingTime": 300,
            "confidence": 0.4
        }
    ]
}"#;

#[test]
fn reply_is_ranked_and_rendered() {
    let payload = QueryPayload::from_json(REPLY).unwrap();
    let pipeline = Pipeline::new(&PipelineConfig::default());
    let display = pipeline.process(QueryOutcome::from_payload(payload));

    assert_eq!(display.kind, MessageKind::Assistant);
    let evaluation = display.master_evaluation.as_ref().unwrap();
    assert_eq!(evaluation.rankings.len(), 2);
    assert_eq!(evaluation.best_index, 0);
    assert!(evaluation.reasoning.starts_with("Qwen-Worker-1 provided"));

    let html = &display.rendered_html;
    assert!(html.contains("<h4>🏆 Best Response: Qwen W1</h4>"));
    assert!(html.contains("<h1>Answer</h1>"));
    assert!(html.contains("<pre><code class=\"language-sql\">"));
    assert!(html.contains("⚠️ Error: worker timed out"));
    assert!(!html.contains("work it out"));
    assert!(!html.contains("```markdown"));

    let stats = display.stats.unwrap();
    assert_eq!(stats.success_rate, 67);
    assert_eq!(stats.average_response_time_ms, 10500);
}

#[tokio::test]
async fn highlighting_after_insertion() {
    let payload = QueryPayload::from_json(REPLY).unwrap();
    let pipeline = Pipeline::default();
    let display = pipeline.process(QueryOutcome::from_payload(payload));

    let mut document = HtmlDocument::new();
    document.insert(&display.rendered_html);
    assert_eq!(document.unprocessed().len(), 1);

    let report = pipeline.render_completion().run(&mut document).await;
    assert_eq!(report.attempts, 1);
    assert_eq!(report.highlighted, 1);
    assert!(document.unprocessed().is_empty());
    assert!(document.html().contains("data-highlighted=\"yes\""));
}

#[test]
fn transport_failure_never_ranks() {
    let display = Pipeline::default().process(QueryOutcome::TransportFailed {
        message: Some("connection refused".into()),
    });
    assert_eq!(display.kind, MessageKind::System);
    assert!(display.master_evaluation.is_none());
    assert!(display.rendered_html.contains("Error: connection refused"));

    let json = serde_json::to_value(&display).unwrap();
    assert!(json.get("masterEvaluation").is_none());
    assert_eq!(json["kind"], "system");
}

#[test]
fn display_payload_uses_camel_case() {
    let payload = QueryPayload::from_json(REPLY).unwrap();
    let display = Pipeline::default().process(QueryOutcome::from_payload(payload));
    let json = serde_json::to_value(&display).unwrap();
    assert!(json["rawResponse"].is_string());
    assert!(json["renderedHtml"].is_string());
    assert_eq!(json["masterEvaluation"]["bestIndex"], 0);
    assert!(json["masterEvaluation"]["evaluationTimeMs"].is_u64());
}

#[test]
fn single_outer_fence_unwraps() {
    assert_eq!(
        process_nested_markdown("```markdown\n# Title\ntext\n```"),
        "# Title\ntext"
    );
}

#[test]
fn sql_snippet_classifies_as_sql() {
    let classifier = LanguageClassifier::default();
    assert_eq!(
        classifier.classify("SELECT * FROM users WHERE id = 1"),
        Language::Sql
    );
}
