use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use assessor_core::source::read_jsonl;
use assessor_core::{Config, JsonlSink, run_batch};
use assessor_llm::{AnyProvider, ProviderKind};
use clap::Parser;
use tokio_util::sync::CancellationToken;

/// Extract structured performance insights from assessment narratives.
#[derive(Debug, Parser)]
#[command(name = "assessor", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSONL file with one assessment record per line.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Destination JSONL file for extracted insights.
    #[arg(long)]
    output: Option<PathBuf>,

    /// LLM backend: claude, mistral or gemini.
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Maximum number of records processed at once.
    #[arg(long)]
    concurrency: Option<usize>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.pipeline.input.clone_from(input);
        }
        if let Some(output) = &self.output {
            config.pipeline.output.clone_from(output);
        }
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(concurrency) = self.concurrency {
            config.pipeline.concurrency = concurrency;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    cli.apply(&mut config);
    config.validate()?;

    let mut provider = AnyProvider::from_env(config.llm.provider, config.generation_options())
        .context("failed to configure LLM provider")?;
    if let Some(base_url) = &config.llm.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    let element = config.build_element(Arc::new(provider))?;

    let records = read_jsonl(&config.pipeline.input).with_context(|| {
        format!(
            "failed to read records from {}",
            config.pipeline.input.display()
        )
    })?;
    let mut sink = JsonlSink::create(&config.pipeline.output).with_context(|| {
        format!("failed to create {}", config.pipeline.output.display())
    })?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        shutdown.cancel();
    });

    let report = run_batch(
        &element,
        &records,
        config.pipeline.concurrency,
        &cancel,
        &mut sink,
    )
    .await?;

    tracing::info!(
        emitted = report.emitted,
        dropped = report.dropped,
        "wrote insights to {}",
        config.pipeline.output.display()
    );
    if report.dropped > 0 {
        tracing::warn!("{} of {} records produced no insights", report.dropped, report.total);
    }
    Ok(())
}

fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("ASSESSOR_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_path_wins() {
        let path = resolve_config_path(Some(Path::new("custom.toml")));
        assert_eq!(path, PathBuf::from("custom.toml"));
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::parse_from([
            "assessor",
            "--input",
            "in.jsonl",
            "--provider",
            "claude",
            "--concurrency",
            "2",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.pipeline.input, PathBuf::from("in.jsonl"));
        assert_eq!(config.pipeline.output, PathBuf::from("processed.jsonl"));
        assert_eq!(config.llm.provider, ProviderKind::Claude);
        assert_eq!(config.pipeline.concurrency, 2);
    }

    #[test]
    fn unknown_provider_flag_is_rejected() {
        assert!(Cli::try_parse_from(["assessor", "--provider", "openai"]).is_err());
    }
}
