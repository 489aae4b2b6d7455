use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hivemind-render",
    about = "Rank worker answers from a query-layer reply and render them for display"
)]
pub struct CliArgs {
    /// Query-layer JSON reply, or `-` for stdin
    #[arg(index = 1, default_value = "-")]
    pub input: String,
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Log to stderr instead of the rotating log file
    #[arg(long)]
    pub log_stderr: bool,
    /// Highlight code blocks in the final HTML
    #[arg(long)]
    pub highlight: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Display payload as JSON
    Json,
    /// Final HTML only
    Html,
}

impl CliArgs {
    pub fn reads_stdin(&self) -> bool {
        self.input == "-"
    }
}
