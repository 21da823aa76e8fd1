//! Single-page web tool: upload a slide deck, review its cleaned text, and
//! generate multiple-choice questions and a summary from it.

mod app;
mod page;

use anyhow::{Context, Result};
use clap::Parser;
use slidequiz_core::TextCleaner;
use slidequiz_llm::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use slidequiz_llm::{LlmConfig, QuizClient};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Turn lecture slides into a multiple-choice quiz and summary.
#[derive(Parser, Debug)]
#[command(name = "slidequiz")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to serve the page on
    #[arg(short, long, env = "SLIDEQUIZ_BIND", default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    /// API key for the chat-completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the chat-completion API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_base: String,

    /// Model used for quiz generation
    #[arg(short, long, env = "SLIDEQUIZ_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value = "50")]
    max_upload_mb: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file may supply OPENAI_API_KEY and the other settings.
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let mut config = LlmConfig::default()
        .with_base_url(args.api_base.as_str())
        .with_model(args.model.as_str());
    match args.api_key {
        Some(ref key) => config = config.with_api_key(key.as_str()),
        None => log::warn!("OPENAI_API_KEY is not set; quiz generation requests will be rejected"),
    }

    let quiz_client = QuizClient::new(config).context("Failed to create chat-completion client")?;
    let state = app::AppState::new(TextCleaner::new(), quiz_client);
    let router = app::router(state, args.max_upload_mb * 1024 * 1024);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    log::info!("Serving on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_env_file_feeds_args() {
        let path = std::env::temp_dir().join(format!("slidequiz-{}.env", std::process::id()));
        fs::write(&path, "SLIDEQUIZ_MODEL=model-from-env-file\n").unwrap();

        dotenvy::from_path(&path).unwrap();
        let args = Args::try_parse_from(["slidequiz"]).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(args.model, "model-from-env-file");
        assert_eq!(args.max_upload_mb, 50);
    }
}
