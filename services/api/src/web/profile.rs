//! services/api/src/web/profile.rs
//!
//! Profile endpoints: fetch the caller's profile and create/update it.
//! Updates are merge writes; the matching core never mutates profiles.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::middleware::AuthUid;
use crate::web::state::AppState;
use study_match_core::domain::{Profile, StudyTime, Year};
use study_match_core::normalize::normalize;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: String,
    /// "morning" | "afternoon" | "evening" (legacy "night" accepted).
    pub preferred_study_time: String,
    /// Class name to proficiency level (0=weak, 1=okay, 2=strong).
    #[serde(default)]
    pub classes: BTreeMap<String, i64>,
    pub major: String,
    /// "freshman" | "sophomore" | "junior" | "senior".
    pub year: String,
    pub description: String,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub status: String,
    pub uid: String,
}

/// A profile as emitted to clients. This is the output boundary: an
/// unknown study time is defaulted to MORNING here and nowhere earlier.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub uid: String,
    pub full_name: String,
    pub preferred_study_time: String,
    pub classes: BTreeMap<String, u8>,
    pub major: String,
    pub year: String,
    pub description: String,
}

impl ProfileResponse {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            uid: profile.uid.clone(),
            full_name: profile.full_name.clone(),
            preferred_study_time: profile
                .study_time
                .unwrap_or(StudyTime::Morning)
                .as_str()
                .to_string(),
            classes: profile
                .classes
                .iter()
                .map(|(name, level)| (name.clone(), level.level()))
                .collect(),
            major: profile.major.clone(),
            year: profile.year.as_str().to_string(),
            description: profile.description.clone(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/profile - Fetch the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No profile document yet"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUid(uid)): Extension<AuthUid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let raw = state.store.get_raw_profile(&uid).await.map_err(|e| {
        error!("Failed to read profile: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read profile".to_string(),
        )
    })?;

    match raw {
        Some(raw) => Ok(Json(ProfileResponse::from_profile(&normalize(&raw)))),
        None => Err((StatusCode::NOT_FOUND, "Profile not found".to_string())),
    }
}

/// POST /api/update-profile - Create or update the authenticated user's profile
///
/// Behavior: merge write, so fields outside this payload survive.
#[utoipa::path(
    post,
    path = "/api/update-profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile written", body = UpdateProfileResponse),
        (status = 400, description = "Invalid profile payload"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUid(uid)): Extension<AuthUid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the payload
    let bad = |msg: &str| (StatusCode::BAD_REQUEST, msg.to_string());

    let full_name = req.full_name.trim();
    if full_name.is_empty() {
        return Err(bad("fullName must be a non-empty string"));
    }
    let study_time = StudyTime::parse(&req.preferred_study_time)
        .ok_or_else(|| bad("preferredStudyTime must be morning, afternoon, or evening"))?;
    for (class, level) in &req.classes {
        if class.trim().is_empty() {
            return Err(bad("class names must be non-empty strings"));
        }
        if !(0..=2).contains(level) {
            return Err(bad("each class level must be an integer 0, 1, or 2"));
        }
    }
    let major = req.major.trim();
    if major.is_empty() {
        return Err(bad("major must be a non-empty string"));
    }
    let year = Year::parse(&req.year)
        .ok_or_else(|| bad("year must be freshman, sophomore, junior, or senior"))?;
    let description = req.description.trim();
    if description.is_empty() || description.len() > 1000 {
        return Err(bad("description must be between 1 and 1000 characters"));
    }

    // 2. Merge-write the canonical document
    let doc = json!({
        "fullName": full_name,
        "preferredStudyTime": study_time.as_str(),
        "classes": req.classes,
        "major": major,
        "year": year.as_str(),
        "description": description,
    });

    state.store.upsert_profile(&uid, &doc).await.map_err(|e| {
        error!("Failed to write profile: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to write profile".to_string(),
        )
    })?;

    Ok(Json(UpdateProfileResponse {
        status: "success".to_string(),
        uid,
    }))
}
