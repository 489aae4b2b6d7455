use std::io::Read;

use anyhow::Context;
use clap::Parser;
use hivemind::completion::HtmlDocument;
use hivemind::config::load_config;
use hivemind::{Pipeline, QueryOutcome, QueryPayload};

use crate::args::{CliArgs, OutputFormat};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let loaded = load_config(args.config.clone())?;
    init_logging(&loaded.config.logging, &loaded.paths, args.log_stderr)?;

    let raw = read_input(&args)?;
    let outcome = QueryOutcome::from_result(QueryPayload::from_json(&raw));
    let pipeline = Pipeline::new(&loaded.config);
    let mut payload = pipeline.process(outcome);

    if args.highlight {
        let mut document = HtmlDocument::from_html(payload.rendered_html);
        let report = pipeline.render_completion().run(&mut document).await;
        log::debug!(
            "highlighted {} block(s), skipped {}, failed {}",
            report.highlighted,
            report.skipped,
            report.failed
        );
        payload.rendered_html = document.into_html();
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&payload)?),
        OutputFormat::Html => println!("{}", payload.rendered_html),
    }
    Ok(())
}

fn read_input(args: &CliArgs) -> anyhow::Result<String> {
    if args.reads_stdin() {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(&args.input).with_context(|| format!("failed to read {}", args.input))
}
