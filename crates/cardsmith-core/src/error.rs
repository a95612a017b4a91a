//! Error types for generation and billing.

use cardsmith_protocol::Plan;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`crate::FlashcardGenerator`].
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request was rejected before any provider call.
    #[error("validation error: {0}")]
    Validation(String),
    /// The provider failed after retries, or returned nothing usable.
    #[error("provider error: {0}")]
    Provider(String),
    /// The provider did not answer within the configured timeout.
    #[error("provider timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Errors returned by billing providers.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Plan name is not one of the known tiers.
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    /// The user already holds the requested plan.
    #[error("user {user_id} is already on the {plan} plan")]
    AlreadySubscribed { user_id: String, plan: Plan },
    /// The charge was refused.
    #[error("charge rejected: {0}")]
    Rejected(String),
}
