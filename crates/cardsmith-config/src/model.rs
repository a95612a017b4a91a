//! Configuration schema for Cardsmith.

use cardsmith_protocol::Plan;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root config for a Cardsmith deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CardsmithConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub billing: BillingConfig,
}

impl CardsmithConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> CardsmithConfigBuilder {
        CardsmithConfigBuilder::new()
    }
}

/// Builder for assembling a `CardsmithConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct CardsmithConfigBuilder {
    config: CardsmithConfig,
}

impl CardsmithConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CardsmithConfig::default(),
        }
    }

    /// Replace the generation limits.
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.config.generation = generation;
        self
    }

    /// Replace the text provider settings.
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.config.provider = provider;
        self
    }

    /// Replace the flashcard store settings.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the HTTP server settings.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the subscription settings.
    pub fn billing(mut self, billing: BillingConfig) -> Self {
        self.config.billing = billing;
        self
    }

    pub fn build(self) -> CardsmithConfig {
        self.config
    }
}

/// How a pinned difficulty filter treats cards classified differently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPolicy {
    /// Overwrite every card's difficulty with the requested one.
    #[default]
    Relabel,
    /// Drop cards whose classified difficulty does not match.
    Constrain,
}

/// Limits and defaults applied by the flashcard generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_cards_per_request")]
    pub max_cards_per_request: usize,
    #[serde(default = "default_max_notes_chars")]
    pub max_notes_chars: usize,
    #[serde(default = "default_confidence")]
    pub default_confidence: f32,
    #[serde(default)]
    pub difficulty_policy: DifficultyPolicy,
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_cards_per_request: default_max_cards_per_request(),
            max_notes_chars: default_max_notes_chars(),
            default_confidence: default_confidence(),
            difficulty_policy: DifficultyPolicy::default(),
            excerpt_max_chars: default_excerpt_max_chars(),
        }
    }
}

/// Hard ceiling on cards per request regardless of plan.
fn default_max_cards_per_request() -> usize {
    20
}

/// Longest notes input accepted, in characters.
fn default_max_notes_chars() -> usize {
    20_000
}

/// Confidence reported when the provider supplies none.
fn default_confidence() -> f32 {
    0.5
}

fn default_excerpt_max_chars() -> usize {
    240
}

/// Text-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_kind")]
    pub kind: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_provider_kind() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Environment variable holding the provider API key.
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Per-attempt provider timeout.
fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    2
}

/// Base delay for exponential backoff between provider retries.
fn default_backoff_ms() -> u64 {
    250
}

/// Flashcard store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_provider")]
    pub provider: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_store_provider(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// Store root, falling back to the default relative directory.
    pub fn resolved_path(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| ".cardsmith/flashcards".to_string())
    }
}

/// Default store provider identifier.
fn default_store_provider() -> String {
    "file".to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_user_header")]
    pub user_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            user_header: default_user_header(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    256 * 1024
}

/// Header the auth gateway uses to forward the caller's user id.
fn default_user_header() -> String {
    "x-user-id".to_string()
}

/// Limits and price for a single plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanLimits {
    pub max_cards_per_request: usize,
    #[serde(default)]
    pub price_cents: u64,
}

/// Limits for every plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlansConfig {
    #[serde(default = "default_free_plan")]
    pub free: PlanLimits,
    #[serde(default = "default_pro_plan")]
    pub pro: PlanLimits,
}

impl Default for PlansConfig {
    fn default() -> Self {
        Self {
            free: default_free_plan(),
            pro: default_pro_plan(),
        }
    }
}

impl PlansConfig {
    pub fn limits(&self, plan: Plan) -> &PlanLimits {
        match plan {
            Plan::Free => &self.free,
            Plan::Pro => &self.pro,
        }
    }
}

fn default_free_plan() -> PlanLimits {
    PlanLimits {
        max_cards_per_request: 10,
        price_cents: 0,
    }
}

fn default_pro_plan() -> PlanLimits {
    PlanLimits {
        max_cards_per_request: 50,
        price_cents: 900,
    }
}

/// Subscription settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BillingConfig {
    #[serde(default)]
    pub default_plan: Plan,
    #[serde(default)]
    pub plans: PlansConfig,
    /// Known subscribers keyed by user id.
    #[serde(default)]
    pub subscribers: HashMap<String, Plan>,
}
