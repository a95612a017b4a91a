use crate::error::ApiError;
use crate::state::{AppState, CurrentUser};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use cardsmith_config::PlanLimits;
use cardsmith_core::BillingError;
use cardsmith_protocol::{
    Flashcard, FlashcardDraft, FlashcardEdit, FlashcardId, GenerationRequest, GenerationResult,
    Plan, Receipt,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct SaveCardsRequest {
    cards: Vec<FlashcardDraft>,
}

#[derive(Debug, Serialize)]
struct CardsResponse {
    cards: Vec<Flashcard>,
}

#[derive(Debug, Serialize)]
struct SubscriptionResponse {
    plan: Plan,
    limits: PlanLimits,
}

#[derive(Debug, Deserialize)]
struct ChangePlanRequest {
    plan: String,
}

/// Build the API router over `state`.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_bytes;
    Router::new()
        .route("/healthz", get(health))
        .route("/api/flashcards/generate", post(generate))
        .route("/api/flashcards", get(list_cards).post(save_cards))
        .route("/api/flashcards/{id}", patch(update_card).delete(delete_card))
        .route("/api/subscription", get(subscription).post(change_plan))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(request) = payload?;
    let plan = state.billing.plan_for(&user_id).await?;
    let ceiling = state
        .config
        .billing
        .plans
        .limits(plan)
        .max_cards_per_request;
    info!(
        "generate requested (user_id={}, plan={}, count={}, ceiling={})",
        user_id, plan, request.count, ceiling
    );
    let result = state.generator.generate(&request, ceiling).await?;
    Ok(Json(result))
}

async fn save_cards(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<SaveCardsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CardsResponse>), ApiError> {
    let Json(SaveCardsRequest { cards: drafts }) = payload?;
    if drafts.is_empty() {
        return Err(ApiError::bad_request("no cards to save"));
    }
    if let Some(index) = drafts.iter().position(|draft| !draft.is_complete()) {
        return Err(ApiError::bad_request(format!(
            "card {index} is missing a question or answer"
        )));
    }

    let mut saved: Vec<Flashcard> = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let card = Flashcard::from_draft(user_id.clone(), draft);
        if let Err(err) = state.store.save(card.clone()).await {
            // The batch is all or nothing: undo the cards already written.
            for earlier in &saved {
                if let Err(undo) = state.store.delete(&user_id, earlier.id).await {
                    warn!(
                        "failed to roll back saved flashcard (user_id={}, id={}, err={})",
                        user_id, earlier.id, undo
                    );
                }
            }
            return Err(err.into());
        }
        saved.push(card);
    }
    info!(
        "saved flashcards (user_id={}, count={})",
        user_id,
        saved.len()
    );
    Ok((StatusCode::CREATED, Json(CardsResponse { cards: saved })))
}

async fn list_cards(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CardsResponse>, ApiError> {
    let cards = state.store.list(&user_id).await?;
    Ok(Json(CardsResponse { cards }))
}

async fn update_card(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    id: Result<Path<FlashcardId>, PathRejection>,
    payload: Result<Json<FlashcardEdit>, JsonRejection>,
) -> Result<Json<Flashcard>, ApiError> {
    let Path(id) = id?;
    let Json(edit) = payload?;
    let card = state.store.update(&user_id, id, edit).await?;
    info!("updated flashcard (user_id={}, id={})", user_id, id);
    Ok(Json(card))
}

async fn delete_card(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    id: Result<Path<FlashcardId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.store.delete(&user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn subscription(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let plan = state.billing.plan_for(&user_id).await?;
    Ok(Json(SubscriptionResponse {
        plan,
        limits: state.config.billing.plans.limits(plan).clone(),
    }))
}

async fn change_plan(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<ChangePlanRequest>, JsonRejection>,
) -> Result<Json<Receipt>, ApiError> {
    let Json(ChangePlanRequest { plan }) = payload?;
    let plan = plan
        .parse::<Plan>()
        .map_err(|_| BillingError::UnknownPlan(plan.clone()))?;
    let receipt = state.billing.charge(&user_id, plan).await?;
    Ok(Json(receipt))
}
