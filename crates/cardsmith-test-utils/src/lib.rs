//! Test helpers shared across Cardsmith crates.

pub mod fixtures;
pub mod llm;
pub mod provider;

pub use fixtures::{MITOCHONDRIA_NOTES, draft, mitochondria_response};
pub use llm::{FailingLLM, FixedChatResponse, FixedLLM};
pub use provider::{FailingProvider, FixedProvider, ScriptedProvider, SlowProvider};
