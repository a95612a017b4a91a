use async_trait::async_trait;
use cardsmith_protocol::{Completion, ProviderFailure, TextProvider};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Returns the same completion for every prompt and records what it saw.
#[derive(Debug)]
pub struct FixedProvider {
    completion: Completion,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FixedProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            completion: Completion::from_text(text),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.completion.model = Some(model.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.completion.confidence = Some(confidence);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

#[async_trait]
impl TextProvider for FixedProvider {
    fn model_id(&self) -> &str {
        "fixed-model"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());
        Ok(self.completion.clone())
    }
}

/// Plays back a fixed sequence of outcomes, one per call.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Completion, ProviderFailure>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<Completion, ProviderFailure>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, _prompt: &str) -> Result<Completion, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderFailure::new("script exhausted")))
    }
}

/// Sleeps before answering; pair with `tokio::time::pause` to test timeouts.
#[derive(Debug)]
pub struct SlowProvider {
    delay: Duration,
    text: String,
    calls: AtomicUsize,
}

impl SlowProvider {
    pub fn new(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for SlowProvider {
    fn model_id(&self) -> &str {
        "slow-model"
    }

    async fn complete(&self, _prompt: &str) -> Result<Completion, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Completion::from_text(self.text.clone()))
    }
}

/// Fails every call with the same message.
#[derive(Debug)]
pub struct FailingProvider {
    message: String,
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for FailingProvider {
    fn model_id(&self) -> &str {
        "failing-model"
    }

    async fn complete(&self, _prompt: &str) -> Result<Completion, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderFailure::new(self.message.clone()))
    }
}
