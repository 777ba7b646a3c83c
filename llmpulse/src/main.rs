/*
llmpulse - batch CLI main.rs
Fetches the configured feeds, summarizes them with the LLM service and
writes the weekly report.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::{Config, OutputFormat};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use llmpulse::llm::anthropic::AnthropicProvider;
use llmpulse::llm::LlmProvider;
use llmpulse::pipeline::{Outcome, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "llmpulse", about = "AI/LLM weekly report generator")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the report output format (markdown or html)
    #[arg(long)]
    format: Option<String>,

    /// Skip the cross-category insights stage
    #[arg(long)]
    no_insights: bool,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    let mut config = Config::load_with_defaults(
        if default_path.exists() {
            Some(&default_path)
        } else {
            None
        },
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    info!(default = ?default_path, override_file = ?override_path, "configuration loaded");

    if let Some(format) = args.format.as_deref() {
        config.report.output_format = match format {
            "markdown" | "md" => OutputFormat::Markdown,
            "html" => OutputFormat::Html,
            other => anyhow::bail!("unknown output format: {}", other),
        };
    }
    if args.no_insights {
        config.report.generate_insights = false;
    }

    let provider = create_llm_provider(&config.llm)?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "LLM provider initialized");

    let pipeline = Pipeline::new(config, Arc::from(provider))?;

    // Run the pipeline, but stop cleanly on ctrl-c. The report write is
    // atomic, so an interrupt never leaves a partial file.
    tokio::select! {
        result = pipeline.run() => match result {
            Ok(Outcome::Report(path)) => {
                info!(path = %path.display(), "report written");
                Ok(())
            }
            Ok(Outcome::NoContent) => {
                info!("no content in the configured window; nothing to report");
                Ok(())
            }
            Err(e) => {
                error!(%e, "pipeline run failed");
                Err(e)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, stopping without writing a report");
            Ok(())
        }
    }
}

/// Create the inference client from configuration. The API key comes from
/// the config file or, failing that, the configured environment variable.
fn create_llm_provider(llm: &common::LlmConfig) -> Result<Box<dyn LlmProvider>> {
    match llm.provider.as_str() {
        "anthropic" => {
            let api_key = match &llm.api_key {
                Some(key) => key.clone(),
                None => std::env::var(&llm.api_key_env)
                    .with_context(|| format!("LLM API key env var '{}' not set", llm.api_key_env))?,
            };
            let provider = AnthropicProvider::new(llm.api_url.clone(), api_key, llm.model.clone())
                .with_defaults(llm.timeout_seconds, llm.max_tokens, 0.7);
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unsupported LLM provider: {}", other),
    }
}
