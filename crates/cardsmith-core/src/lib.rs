//! Flashcard generation for Cardsmith.
//!
//! [`FlashcardGenerator`] validates a request, asks a [`TextProvider`] for
//! cards under a timeout and retry policy, then parses and classifies what
//! comes back. Billing lives here too because plans decide how many cards a
//! single request may ask for.
//!
//! [`TextProvider`]: cardsmith_protocol::TextProvider

pub mod billing;
pub mod classify;
pub mod error;
pub mod generator;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod retry;
pub mod validate;

pub use billing::{BillingProvider, StaticBillingProvider};
pub use error::{BillingError, GenerationError};
pub use generator::FlashcardGenerator;
pub use llm::LlmTextProvider;
pub use retry::RetryPolicy;
pub use validate::{ValidatedRequest, clean_notes, validate_request};
