//! services/api/src/lib.rs
//!
//! Library root for the api service: configuration, error type, the HTTP
//! layer, the Postgres adapter, and the router assembly shared by the
//! binary and the integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::web::{
    auth::{login_handler, logout_handler, signup_handler},
    matching::{matches_handler, next_batch_handler, submit_swipe_handler},
    profile::{get_profile_handler, update_profile_handler},
    require_auth,
    state::AppState,
};
use study_match_core::ports::StoreService;

/// Builds the application router: public auth routes plus the
/// cookie-protected profile and matching routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    let protected_routes = Router::new()
        .route("/api/profile", get(get_profile_handler))
        .route("/api/update-profile", post(update_profile_handler))
        .route("/api/next_batch", get(next_batch_handler))
        .route("/api/submit_swipe", post(submit_swipe_handler))
        .route("/api/matches", get(matches_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// An `AppState` over any store, with test configuration. Used by the
/// integration tests to run the router against the in-memory store.
pub fn test_state(store: Arc<dyn StoreService>) -> Arc<AppState> {
    Arc::new(AppState {
        store,
        config: Arc::new(Config::for_tests()),
    })
}
