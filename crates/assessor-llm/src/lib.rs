//! Provider-agnostic text generation with Claude, Mistral, and Gemini adapters.

pub mod any;
pub mod claude;
pub mod config;
pub mod credential;
pub mod error;
pub mod gemini;
pub mod http;
pub mod mistral;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;
pub mod tool;

pub use any::AnyProvider;
pub use config::{ConfigOption, GenerationConfig};
pub use error::LlmError;
pub use provider::{GenerateOptions, GenerationProvider};
pub use tool::{ProviderKind, ToolDescriptor};
