//! [`TextProvider`] adapter over an `autoagents_llm` chat model.

use async_trait::async_trait;
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::openai::OpenAI;
use autoagents_llm::builder::LLMBuilder;
use autoagents_llm::chat::{ChatMessage, ChatRole, MessageType};
use cardsmith_config::ProviderConfig;
use cardsmith_protocol::{Completion, ProviderFailure, TextProvider};
use log::info;
use std::sync::Arc;

use crate::error::GenerationError;

/// Sends each prompt as a single user message to a chat model.
#[derive(Clone)]
pub struct LlmTextProvider {
    llm: Arc<dyn LLMProvider>,
    model: String,
}

impl LlmTextProvider {
    pub fn new(llm: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Build an OpenAI-backed provider from config and the given API key.
    pub fn openai(config: &ProviderConfig, api_key: String) -> Result<Self, GenerationError> {
        if !config.kind.eq_ignore_ascii_case("openai") {
            return Err(GenerationError::Provider(format!(
                "unsupported provider kind: {}",
                config.kind
            )));
        }
        info!("building text provider (kind=openai, model={})", config.model);
        let llm: Arc<dyn LLMProvider> = LLMBuilder::<OpenAI>::new()
            .api_key(api_key)
            .model(config.model.clone())
            .build()
            .map_err(|err| GenerationError::Provider(err.to_string()))?;
        Ok(Self::new(llm, config.model.clone()))
    }
}

impl std::fmt::Debug for LlmTextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmTextProvider")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextProvider for LlmTextProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderFailure> {
        let messages = [ChatMessage {
            role: ChatRole::User,
            message_type: MessageType::Text,
            content: prompt.to_string(),
        }];
        let response = self
            .llm
            .chat_with_tools(&messages, None, None)
            .await
            .map_err(|err| ProviderFailure::new(err.to_string()))?;
        let text = response
            .text()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ProviderFailure::new("provider returned an empty response"))?;
        Ok(Completion {
            text,
            model: Some(self.model.clone()),
            confidence: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsmith_test_utils::{FailingLLM, FixedLLM};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn forwards_prompt_as_user_message() {
        let llm = Arc::new(FixedLLM::new("{\"cards\": []}"));
        let provider = LlmTextProvider::new(llm.clone(), "gpt-test");

        let completion = provider.complete("make cards").await.expect("completion");

        assert_eq!(completion.text, "{\"cards\": []}");
        assert_eq!(completion.model.as_deref(), Some("gpt-test"));
        let messages = llm.last_messages.lock().clone();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, "make cards");
    }

    #[tokio::test]
    async fn maps_llm_errors_to_failures() {
        let provider = LlmTextProvider::new(Arc::new(FailingLLM::new("quota exceeded")), "gpt-test");
        let err = provider.complete("make cards").await.unwrap_err();
        assert!(err.0.contains("quota exceeded"), "{err}");
    }

    #[tokio::test]
    async fn empty_response_is_a_failure() {
        let provider = LlmTextProvider::new(Arc::new(FixedLLM::silent()), "gpt-test");
        let err = provider.complete("make cards").await.unwrap_err();
        assert_eq!(err.0, "provider returned an empty response");
    }

    #[test]
    fn rejects_unknown_provider_kind() {
        let config = ProviderConfig {
            kind: "carrier-pigeon".to_string(),
            ..ProviderConfig::default()
        };
        let err = LlmTextProvider::openai(&config, "key".to_string()).unwrap_err();
        assert!(matches!(err, GenerationError::Provider(ref message) if message.contains("carrier-pigeon")));
    }
}
