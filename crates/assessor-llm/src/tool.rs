//! Provider-tagged tool descriptors.
//!
//! Every provider describes callable functions in its own JSON shape. The
//! generic [`GenerateOptions`](crate::provider::GenerateOptions) carries them as
//! [`ToolDescriptor`] values so the shapes never collapse into one; each
//! adapter narrows the list back to its own payload type and rejects the rest.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// LLM provider backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Claude,
    Mistral,
    Gemini,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Mistral => "mistral",
            Self::Gemini => "gemini",
        }
    }

    /// Environment variable holding this provider's API key.
    #[must_use]
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::Claude => "CLAUDE_API_KEY",
            Self::Mistral => "MISTRAL_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Claude => "claude-instant-1.2",
            Self::Mistral => "mistral-small-latest",
            Self::Gemini => "gemini-1.5-pro-exp-0801",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "mistral" => Ok(Self::Mistral),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(LlmError::InvalidConfig(format!(
                "unknown provider: {other}"
            ))),
        }
    }
}

/// Anthropic `tools[]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaudeTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Mistral `tools[]` entry, always of type `function`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistralTool {
    pub r#type: String,
    pub function: MistralFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistralFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Gemini `tools[]` entry grouping one or more function declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiFunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool definition tagged with the provider whose wire shape it uses.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolDescriptor {
    Claude(ClaudeTool),
    Mistral(MistralTool),
    Gemini(GeminiTool),
}

impl ToolDescriptor {
    #[must_use]
    pub fn claude(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self::Claude(ClaudeTool {
            name: name.into(),
            description: description.into(),
            input_schema,
        })
    }

    #[must_use]
    pub fn mistral(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self::Mistral(MistralTool {
            r#type: "function".into(),
            function: MistralFunction {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        })
    }

    #[must_use]
    pub fn gemini(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self::Gemini(GeminiTool {
            function_declarations: vec![GeminiFunctionDeclaration {
                name: name.into(),
                description: description.into(),
                parameters,
            }],
        })
    }

    /// The provider tag of this descriptor's payload.
    #[must_use]
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::Claude(_) => ProviderKind::Claude,
            Self::Mistral(_) => ProviderKind::Mistral,
            Self::Gemini(_) => ProviderKind::Gemini,
        }
    }

    #[must_use]
    pub fn as_claude(&self) -> Option<&ClaudeTool> {
        match self {
            Self::Claude(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mistral(&self) -> Option<&MistralTool> {
        match self {
            Self::Mistral(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_gemini(&self) -> Option<&GeminiTool> {
        match self {
            Self::Gemini(t) => Some(t),
            _ => None,
        }
    }
}

/// Narrow `tools` to one provider's payload type, in order.
///
/// # Errors
///
/// Returns `LlmError::ToolMismatch` for the first descriptor whose tag is not
/// `expected`. Later descriptors are not inspected.
pub fn narrow<'a, T>(
    tools: &'a [ToolDescriptor],
    expected: ProviderKind,
    project: fn(&'a ToolDescriptor) -> Option<&'a T>,
) -> Result<Vec<&'a T>, LlmError> {
    tools
        .iter()
        .map(|tool| {
            project(tool).ok_or(LlmError::ToolMismatch {
                expected,
                found: tool.provider(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> serde_json::Value {
        json!({"type": "object", "properties": {"city": {"type": "string"}}})
    }

    #[test]
    fn provider_tag_matches_variant() {
        assert_eq!(
            ToolDescriptor::claude("a", "b", schema()).provider(),
            ProviderKind::Claude
        );
        assert_eq!(
            ToolDescriptor::mistral("a", "b", schema()).provider(),
            ProviderKind::Mistral
        );
        assert_eq!(
            ToolDescriptor::gemini("a", "b", schema()).provider(),
            ProviderKind::Gemini
        );
    }

    #[test]
    fn narrow_keeps_order() {
        let tools = vec![
            ToolDescriptor::claude("first", "", schema()),
            ToolDescriptor::claude("second", "", schema()),
        ];
        let narrowed = narrow(&tools, ProviderKind::Claude, ToolDescriptor::as_claude).unwrap();
        let names: Vec<_> = narrowed.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn narrow_fails_on_first_mismatch() {
        let tools = vec![
            ToolDescriptor::mistral("ok", "", schema()),
            ToolDescriptor::gemini("bad", "", schema()),
            ToolDescriptor::claude("also_bad", "", schema()),
        ];
        let err = narrow(&tools, ProviderKind::Mistral, ToolDescriptor::as_mistral).unwrap_err();
        assert!(matches!(
            err,
            LlmError::ToolMismatch {
                expected: ProviderKind::Mistral,
                found: ProviderKind::Gemini,
            }
        ));
    }

    #[test]
    fn narrow_empty_is_empty() {
        let narrowed = narrow(&[], ProviderKind::Gemini, ToolDescriptor::as_gemini).unwrap();
        assert!(narrowed.is_empty());
    }

    #[test]
    fn mistral_tool_wire_shape() {
        let tool = ToolDescriptor::mistral("lookup", "Find a city", schema());
        let value = serde_json::to_value(tool.as_mistral().unwrap()).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "lookup");
        assert_eq!(value["function"]["parameters"], schema());
    }

    #[test]
    fn gemini_tool_wire_shape() {
        let tool = ToolDescriptor::gemini("lookup", "Find a city", schema());
        let value = serde_json::to_value(tool.as_gemini().unwrap()).unwrap();
        assert_eq!(value["functionDeclarations"][0]["name"], "lookup");
    }

    #[test]
    fn provider_kind_parses_aliases() {
        assert_eq!("Anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(" mistral ".parse::<ProviderKind>().unwrap(), ProviderKind::Mistral);
        assert!("openai".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn provider_kind_serde_lowercase() {
        let kind: ProviderKind = serde_json::from_value(json!("mistral")).unwrap();
        assert_eq!(kind, ProviderKind::Mistral);
        assert_eq!(serde_json::to_value(ProviderKind::Claude).unwrap(), "claude");
    }
}
