use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use na_core::input::{demo_articles, load_articles};
use na_core::logging::{init_logging, LogConfig, Logger, DEFAULT_LOG_FILE};
use na_core::{Article, BatchOutput};
use na_inference::prelude::*;
use na_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Batch news article analysis with a language model", long_about = None)]
pub struct Cli {
    /// Model backend: openai (default) or dummy for offline runs
    #[arg(long, default_value = "openai", global = true)]
    model_backend: ModelBackend,
    #[arg(long, default_value = na_inference::DEFAULT_MODEL, global = true)]
    model: String,
    /// Retries per model call after the first attempt
    #[arg(long, default_value_t = 3, global = true)]
    max_retries: u32,
    /// Base URL of an OpenAI-compatible API
    #[arg(long, default_value = na_inference::DEFAULT_BASE_URL, global = true)]
    base_url: String,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    #[arg(long, default_value = DEFAULT_LOG_FILE, global = true)]
    log_file: PathBuf,
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
    /// Leave failed sentiment and topic steps out of the summary
    #[arg(long, global = true)]
    exclude_errors: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Analyze a batch of articles and write the report JSON
    Analyze {
        /// CSV or JSON file with an Article column
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "Summary.json")]
        output: PathBuf,
        /// Article texts; take precedence over --input
        articles: Vec<String>,
    },
    /// Serve the upload endpoint
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
}

impl Commands {
    fn log_prefix(&self) -> &'static str {
        match self {
            Commands::Analyze { .. } => "[analyze]",
            Commands::Serve { .. } => "[serve]",
        }
    }
}

impl Cli {
    fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model: self.model.clone(),
            max_retries: self.max_retries,
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            ..ModelConfig::default()
        }
    }

    fn error_tally(&self) -> ErrorTally {
        if self.exclude_errors {
            ErrorTally::Exclude
        } else {
            ErrorTally::Count
        }
    }
}

fn resolve_articles(articles: Vec<String>, input: Option<&Path>) -> anyhow::Result<Vec<Article>> {
    if !articles.is_empty() {
        return Ok(articles.into_iter().map(Article::from).collect());
    }
    match input {
        Some(path) => load_articles(path).with_context(|| format!("Failed to load articles from {}", path.display())),
        None => {
            info!("No articles given, using the built-in demo set");
            Ok(demo_articles())
        }
    }
}

fn write_output(output: &BatchOutput, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&LogConfig {
        level: cli.log_level.clone(),
        file: Some(cli.log_file.clone()),
    })?;

    let model = create_model(cli.model_backend, cli.model_config())?;
    let processor = BatchProcessor::new(model)
        .with_error_tally(cli.error_tally())
        .with_logger(Logger::new().with_prefix(cli.command.log_prefix()));

    match cli.command {
        Commands::Analyze { input, output, articles } => {
            let articles = resolve_articles(articles, input.as_deref())?;
            info!("📰 Analyzing {} article(s)", articles.len());
            let result = processor.process_batch(&articles).await;
            write_output(&result, &output)?;
            info!("💾 Report written to {}", output.display());
            println!("✅ Done. Output saved to {}.", output.display());
        }
        Commands::Serve { addr } => {
            na_web::serve(addr, AppState::new(processor)).await?;
        }
    }

    Ok(())
}
