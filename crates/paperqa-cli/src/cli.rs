use clap::Parser;
use paperqa_types::Language;

/// Ask questions about an uploaded paper and stream the answers
#[derive(Debug, Parser)]
#[command(name = "paperqa", version, about)]
pub struct Cli {
    /// Session id returned when the paper was uploaded
    #[arg(short, long, env = "PAPERQA_SESSION")]
    pub session: Option<String>,

    /// Model to answer with (defaults to the configured or server default)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Storyline language: en or ko
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Override the API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Ask a single question and exit instead of starting the prompt
    #[arg(short, long)]
    pub question: Option<String>,

    /// List the models the server offers and exit
    #[arg(long)]
    pub list_models: bool,

    /// Print a summary of the paper and exit
    #[arg(long, conflicts_with_all = ["question", "storyline"])]
    pub summary: bool,

    /// Print the paper's storyline in the chosen language and exit
    #[arg(long, conflicts_with = "question")]
    pub storyline: bool,

    /// Print the answer again with math normalized to display blocks
    #[arg(long)]
    pub render_math: bool,
}
