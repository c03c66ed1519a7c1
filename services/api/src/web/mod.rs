//! services/api/src/web/mod.rs
//!
//! The HTTP layer: handlers, auth middleware, shared state, and the master
//! definition for the OpenAPI specification.

pub mod auth;
pub mod matching;
pub mod middleware;
pub mod profile;
pub mod state;

pub use middleware::require_auth;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        profile::get_profile_handler,
        profile::update_profile_handler,
        matching::next_batch_handler,
        matching::submit_swipe_handler,
        matching::matches_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            profile::UpdateProfileRequest,
            profile::UpdateProfileResponse,
            profile::ProfileResponse,
            matching::SubmitSwipeRequest,
            matching::SubmitSwipeResponse,
            matching::MatchModel,
            matching::NextBatchResponse,
            matching::MatchesResponse,
        )
    ),
    tags(
        (name = "Study Buddy API", description = "Profiles, candidate batches, swipes, and matches.")
    )
)]
pub struct ApiDoc;
