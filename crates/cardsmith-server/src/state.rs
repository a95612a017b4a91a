use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cardsmith_config::CardsmithConfig;
use cardsmith_core::{BillingProvider, FlashcardGenerator};
use cardsmith_protocol::UserId;
use cardsmith_store::FlashcardStore;
use std::sync::Arc;

const MAX_USER_ID_CHARS: usize = 128;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<FlashcardGenerator>,
    pub store: Arc<dyn FlashcardStore>,
    pub billing: Arc<dyn BillingProvider>,
    pub config: Arc<CardsmithConfig>,
}

impl AppState {
    pub fn new(
        generator: FlashcardGenerator,
        store: Arc<dyn FlashcardStore>,
        billing: Arc<dyn BillingProvider>,
        config: CardsmithConfig,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            store,
            billing,
            config: Arc::new(config),
        }
    }
}

/// Caller identity taken from the configured user header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.server.user_header.as_str();
        let user_id = parts
            .headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| {
                !value.is_empty()
                    && value.chars().count() <= MAX_USER_ID_CHARS
                    && !value.chars().any(char::is_control)
            })
            .ok_or(ApiError::Unauthorized)?;
        Ok(Self(user_id.to_string()))
    }
}
