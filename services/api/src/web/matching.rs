//! services/api/src/web/matching.rs
//!
//! The matching endpoints: candidate batches, swipe submission, and the
//! caller's match list. Handlers stay thin; the decision logic lives in
//! `study_match_core`.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::error::port_error_response;
use crate::web::middleware::AuthUid;
use crate::web::profile::ProfileResponse;
use crate::web::state::AppState;
use study_match_core::batch::next_batch;
use study_match_core::domain::{Direction, Match};
use study_match_core::swipes::{record_swipe, resolve_right_swipe};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSwipeRequest {
    pub target_uid: String,
    /// "left" | "right".
    pub direction: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchModel {
    pub match_id: String,
    pub user_a: String,
    pub user_b: String,
}

impl MatchModel {
    fn from_match(m: &Match) -> Self {
        Self {
            match_id: m.match_id.clone(),
            user_a: m.user_a.clone(),
            user_b: m.user_b.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct NextBatchResponse {
    pub batch: Vec<ProfileResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct SubmitSwipeResponse {
    #[serde(rename = "match")]
    pub matched: Option<MatchModel>,
}

#[derive(Serialize, ToSchema)]
pub struct MatchesResponse {
    pub matches: Vec<MatchModel>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/next_batch - Fetch the next batch of candidate users
#[utoipa::path(
    get,
    path = "/api/next_batch",
    responses(
        (status = 200, description = "Up to 20 ranked candidates", body = NextBatchResponse),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn next_batch_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUid(uid)): Extension<AuthUid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut rng = StdRng::from_entropy();
    let candidates = next_batch(state.store.as_ref(), &mut rng, &uid)
        .await
        .map_err(|e| {
            error!("Failed to assemble batch for {}: {:?}", uid, e);
            port_error_response(e)
        })?;

    let batch = candidates.iter().map(ProfileResponse::from_profile).collect();
    Ok(Json(NextBatchResponse { batch }))
}

/// POST /api/submit_swipe - Submit a swipe for a target user
#[utoipa::path(
    post,
    path = "/api/submit_swipe",
    request_body = SubmitSwipeRequest,
    responses(
        (status = 200, description = "Swipe recorded; match present if mutual", body = SubmitSwipeResponse),
        (status = 400, description = "Self-swipe or malformed direction"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Failed to record the swipe")
    )
)]
pub async fn submit_swipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUid(uid)): Extension<AuthUid>,
    Json(req): Json<SubmitSwipeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let direction = Direction::parse(&req.direction).ok_or((
        StatusCode::BAD_REQUEST,
        "direction must be \"left\" or \"right\"".to_string(),
    ))?;

    // The ledger write is the durable side effect; its failure aborts.
    record_swipe(state.store.as_ref(), &uid, req.target_uid.trim(), direction)
        .await
        .map_err(|e| {
            error!("Failed to record swipe {} -> {}: {:?}", uid, req.target_uid, e);
            port_error_response(e)
        })?;

    // Match detection failure must not fail the recorded swipe; the pair
    // resolves on a later interaction instead.
    let matched = if direction == Direction::Right {
        match resolve_right_swipe(state.store.as_ref(), &uid, req.target_uid.trim()).await {
            Ok(result) => result.map(|m| MatchModel::from_match(&m)),
            Err(e) => {
                warn!("Match detection failed for {} -> {}: {:?}", uid, req.target_uid, e);
                None
            }
        }
    } else {
        None
    };

    Ok(Json(SubmitSwipeResponse { matched }))
}

/// GET /api/matches - Get all matches for the current user
#[utoipa::path(
    get,
    path = "/api/matches",
    responses(
        (status = 200, description = "All matches involving the caller", body = MatchesResponse),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn matches_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUid(uid)): Extension<AuthUid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let matches = state.store.matches_involving(&uid).await.map_err(|e| {
        error!("Failed to fetch matches for {}: {:?}", uid, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch matches".to_string(),
        )
    })?;

    Ok(Json(MatchesResponse {
        matches: matches.iter().map(MatchModel::from_match).collect(),
    }))
}
