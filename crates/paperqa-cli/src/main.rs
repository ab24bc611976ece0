use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paperqa_chat::ChatSession;
use paperqa_cli::{
    cli::Cli,
    config::Config,
    repl::{ctrl_c, Repl, Turn},
};
use paperqa_llm::{ModelInfo, PaperApiClient};
use paperqa_markup::normalize;
use paperqa_types::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    let mut client_config = config.client_config();
    if let Some(base_url) = cli.base_url.clone() {
        client_config.base_url = base_url;
    }
    tracing::info!(base_url = %client_config.base_url, "Starting paperqa");

    let client = Arc::new(PaperApiClient::new(client_config)?);

    if cli.list_models {
        let models = client.models().await?;
        let default_id = ModelInfo::default_of(&models).map(|m| m.id.clone());
        for model in &models {
            let marker = if Some(&model.id) == default_id.as_ref() { "*" } else { " " };
            println!("{} {:<24} {}", marker, model.id, model.name);
        }
        return Ok(());
    }

    let session_id = cli
        .session
        .context("A session id is required (--session or PAPERQA_SESSION)")?;

    let mut session = Session::new(session_id)
        .with_language(cli.language.unwrap_or(config.chat.language));
    session.model = cli.model.or(config.chat.model);

    if cli.summary {
        let response = client.summarize(&session.summarize_request()).await?;
        tracing::info!(model = %response.model, "Summary received");
        println!("{}", normalize(&response.summary));
        return Ok(());
    }
    if cli.storyline {
        let response = client.storyline(&session.storyline_request()).await?;
        tracing::info!(model = %response.model, language = %session.language, "Storyline received");
        println!("{}", normalize(&response.storyline));
        return Ok(());
    }

    let chat = ChatSession::new(session, client);
    let mut repl = Repl::new(chat).with_render_math(cli.render_math || config.chat.render_math);

    match cli.question {
        Some(question) => {
            let mut stdout = std::io::stdout();
            let turn = repl
                .ask(&question, &mut stdout, ctrl_c())
                .await?;
            if !matches!(turn, Turn::Answered(_)) {
                anyhow::bail!("No answer received");
            }
        }
        None => repl.run().await?,
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Answers go to stdout; keep logs out of them
    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
