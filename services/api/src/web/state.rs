//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_match_core::ports::StoreService;

/// The shared application state, created once at startup and passed to all handlers.
///
/// The store is held behind the core's port trait, so handlers and core
/// operations never know whether they are talking to Postgres or to the
/// in-memory store the tests use.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoreService>,
    pub config: Arc<Config>,
}
