use async_trait::async_trait;
use thiserror::Error;

/// Text returned by a generation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Raw provider output.
    pub text: String,
    /// Model that produced the text, when the provider reports it.
    pub model: Option<String>,
    /// Provider's own confidence signal, when it has one.
    pub confidence: Option<f32>,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            confidence: None,
        }
    }
}

/// Upstream failure reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProviderFailure(pub String);

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Opaque text-generation capability: prompt in, text out.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Identifier reported in results when a completion carries no model.
    fn model_id(&self) -> &str;

    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderFailure>;
}
