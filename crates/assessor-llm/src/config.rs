//! Generation parameters shared by every provider adapter.

use crate::error::LlmError;
use crate::tool::ProviderKind;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TOP_P: f64 = 1.0;

/// A single override applied while building a [`GenerationConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOption {
    ModelName(String),
    Temperature(f64),
    MaxTokens(u32),
    TopP(f64),
}

#[must_use]
pub fn with_model_name(name: impl Into<String>) -> ConfigOption {
    ConfigOption::ModelName(name.into())
}

#[must_use]
pub fn with_temperature(temperature: f64) -> ConfigOption {
    ConfigOption::Temperature(temperature)
}

#[must_use]
pub fn with_max_tokens(max_tokens: u32) -> ConfigOption {
    ConfigOption::MaxTokens(max_tokens)
}

#[must_use]
pub fn with_top_p(top_p: f64) -> ConfigOption {
    ConfigOption::TopP(top_p)
}

/// Immutable generation parameters for one adapter instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    model_name: String,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

impl GenerationConfig {
    /// Provider defaults with no overrides.
    #[must_use]
    pub fn defaults(kind: ProviderKind) -> Self {
        Self {
            model_name: kind.default_model().to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
        }
    }

    /// Apply `options` in order on top of the defaults for `kind`, then validate.
    ///
    /// Later options overwrite earlier ones for the same field.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidConfig` if the final values are out of range.
    pub fn build(
        kind: ProviderKind,
        options: impl IntoIterator<Item = ConfigOption>,
    ) -> Result<Self, LlmError> {
        let mut config = Self::defaults(kind);
        for option in options {
            config.apply(option);
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, option: ConfigOption) {
        match option {
            ConfigOption::ModelName(name) => self.model_name = name,
            ConfigOption::Temperature(t) => self.temperature = t,
            ConfigOption::MaxTokens(n) => self.max_tokens = n,
            ConfigOption::TopP(p) => self.top_p = p,
        }
    }

    fn validate(&self) -> Result<(), LlmError> {
        if self.model_name.trim().is_empty() {
            return Err(LlmError::InvalidConfig("model name must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::InvalidConfig(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(LlmError::InvalidConfig(
                "max tokens must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(LlmError::InvalidConfig(format!(
                "top-p must be within [0, 1], got {}",
                self.top_p
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    #[must_use]
    pub fn top_p(&self) -> f64 {
        self.top_p
    }

    // Wire formats take single precision.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn temperature_f32(&self) -> f32 {
        self.temperature as f32
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn top_p_f32(&self) -> f32 {
        self.top_p as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_options_yields_defaults() {
        let config = GenerationConfig::build(ProviderKind::Mistral, []).unwrap();
        assert_eq!(config.model_name(), "mistral-small-latest");
        assert!((config.temperature() - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens(), 512);
        assert!((config.top_p() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults_are_provider_specific() {
        assert_eq!(
            GenerationConfig::defaults(ProviderKind::Claude).model_name(),
            "claude-instant-1.2"
        );
        assert_eq!(
            GenerationConfig::defaults(ProviderKind::Gemini).model_name(),
            "gemini-1.5-pro-exp-0801"
        );
    }

    #[test]
    fn last_write_wins() {
        let config = GenerationConfig::build(
            ProviderKind::Claude,
            [with_model_name("X"), with_model_name("Y")],
        )
        .unwrap();
        assert_eq!(config.model_name(), "Y");
    }

    #[test]
    fn options_touch_only_their_field() {
        let config = GenerationConfig::build(
            ProviderKind::Gemini,
            [with_max_tokens(8192), with_temperature(0.2)],
        )
        .unwrap();
        assert_eq!(config.max_tokens(), 8192);
        assert!((config.temperature() - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.model_name(), "gemini-1.5-pro-exp-0801");
        assert!((config.top_p() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validation_runs_after_all_options() {
        // An out-of-range intermediate value is fine if a later option fixes it.
        let config =
            GenerationConfig::build(ProviderKind::Claude, [with_top_p(3.0), with_top_p(0.9)])
                .unwrap();
        assert!((config.top_p() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_empty_model() {
        let err = GenerationConfig::build(ProviderKind::Claude, [with_model_name("  ")]);
        assert!(matches!(err, Err(LlmError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_max_tokens() {
        let err = GenerationConfig::build(ProviderKind::Claude, [with_max_tokens(0)]);
        assert!(matches!(err, Err(LlmError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_out_of_range_sampling() {
        assert!(GenerationConfig::build(ProviderKind::Claude, [with_temperature(2.5)]).is_err());
        assert!(GenerationConfig::build(ProviderKind::Claude, [with_temperature(-0.1)]).is_err());
        assert!(GenerationConfig::build(ProviderKind::Claude, [with_top_p(1.01)]).is_err());
        assert!(GenerationConfig::build(ProviderKind::Claude, [with_temperature(f64::NAN)]).is_err());
    }

    proptest! {
        #[test]
        fn in_range_values_always_build(t in 0.0f64..=2.0, p in 0.0f64..=1.0, n in 1u32..) {
            let config = GenerationConfig::build(
                ProviderKind::Mistral,
                [with_temperature(t), with_top_p(p), with_max_tokens(n)],
            ).unwrap();
            prop_assert_eq!(config.max_tokens(), n);
            prop_assert!((config.temperature() - t).abs() < f64::EPSILON);
            prop_assert!((config.top_p() - p).abs() < f64::EPSILON);
        }
    }
}
