use std::fmt;

use crate::error::LlmError;
use crate::tool::ProviderKind;

/// Wrapper for sensitive strings with redacted Debug/Display.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Read the API key for `provider` from its environment variable.
///
/// # Errors
///
/// Returns `LlmError::MissingCredential` if the variable is unset or empty.
pub fn api_key_from_env(provider: ProviderKind) -> Result<Secret, LlmError> {
    let var = provider.api_key_var();
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(Secret::new(value)),
        _ => Err(LlmError::MissingCredential { provider, var }),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn secret_is_redacted() {
        let secret = Secret::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.to_string(), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    #[serial]
    fn reads_key_from_named_variable() {
        unsafe { std::env::set_var("MISTRAL_API_KEY", "mk-test") };
        let key = api_key_from_env(ProviderKind::Mistral).unwrap();
        assert_eq!(key.expose(), "mk-test");
        unsafe { std::env::remove_var("MISTRAL_API_KEY") };
    }

    #[test]
    #[serial]
    fn missing_key_names_the_variable() {
        unsafe { std::env::remove_var("GEMINI_API_KEY") };
        let err = api_key_from_env(ProviderKind::Gemini).unwrap_err();
        assert!(matches!(
            err,
            LlmError::MissingCredential {
                provider: ProviderKind::Gemini,
                var: "GEMINI_API_KEY",
            }
        ));
    }

    #[test]
    #[serial]
    fn blank_key_counts_as_missing() {
        unsafe { std::env::set_var("CLAUDE_API_KEY", "   ") };
        assert!(api_key_from_env(ProviderKind::Claude).is_err());
        unsafe { std::env::remove_var("CLAUDE_API_KEY") };
    }
}
