mod env;
mod types;


pub use types::*;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use assessor_llm::config::{with_max_tokens, with_model_name, with_temperature, with_top_p};
use assessor_llm::{ConfigOption, GenerateOptions, GenerationConfig, GenerationProvider};

use crate::extract::ExtractInsights;
use crate::retry::RetryPolicy;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the resulting configuration is invalid.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error naming the first out-of-range value.
    pub fn validate(&self) -> anyhow::Result<()> {
        GenerationConfig::build(self.llm.provider, self.generation_options())
            .context("invalid [llm] settings")?;
        self.retry_policy().context("invalid [extraction] settings")?;
        if self.extraction.attempt_timeout_secs == 0 {
            bail!("extraction.attempt_timeout_secs must be greater than zero");
        }
        if self.extraction.response_mime_type.trim().is_empty() {
            bail!("extraction.response_mime_type must not be empty");
        }
        if self.pipeline.concurrency == 0 {
            bail!("pipeline.concurrency must be at least 1");
        }
        Ok(())
    }

    /// Builder options for the configured provider, in override order.
    #[must_use]
    pub fn generation_options(&self) -> Vec<ConfigOption> {
        let mut options = Vec::with_capacity(4);
        if let Some(model) = &self.llm.model {
            options.push(with_model_name(model.clone()));
        }
        options.push(with_temperature(self.llm.temperature));
        options.push(with_max_tokens(self.llm.max_tokens));
        options.push(with_top_p(self.llm.top_p));
        options
    }

    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero.
    pub fn retry_policy(&self) -> anyhow::Result<RetryPolicy> {
        let policy = RetryPolicy::fixed(
            self.extraction.max_attempts,
            Duration::from_secs(self.extraction.retry_delay_secs),
        )?;
        Ok(policy.with_retry_parse_errors(self.extraction.retry_parse_errors))
    }

    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction.attempt_timeout_secs)
    }

    #[must_use]
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions::new().with_response_mime_type(self.extraction.response_mime_type.clone())
    }

    /// Assemble the extraction element around `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry settings are invalid or the schema file
    /// cannot be read.
    pub fn build_element<P: GenerationProvider>(
        &self,
        provider: Arc<P>,
    ) -> anyhow::Result<ExtractInsights<P>> {
        let mut element = ExtractInsights::new(provider)
            .with_retry_policy(self.retry_policy()?)
            .with_attempt_timeout(self.attempt_timeout())
            .with_options(self.generate_options());
        if let Some(path) = &self.extraction.schema_path {
            let schema = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read schema file {}", path.display()))?;
            element = element.with_schema(schema);
        }
        Ok(element)
    }
}
