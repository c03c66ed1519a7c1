//! crates/study_match_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::domain::{Match, RawProfile, Swipe, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    Invalid(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port (Trait)
//=========================================================================================

/// The narrow read/write interface the core uses for all persistent state.
///
/// Implemented by the Postgres adapter in the api service and by the
/// in-memory store in [`crate::testing`]. Core operations receive this as
/// an explicit value rather than reaching for any process-wide handle.
#[async_trait]
pub trait StoreService: Send + Sync {
    // --- Users & Auth ---
    async fn create_user_with_email(
        &self,
        uid: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<()>;

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        uid: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Validates a session id, returning the uid it belongs to.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Profiles ---
    /// Fetches one stored profile document. `None` means the document does
    /// not exist; callers treat that as "not a candidate", not an error.
    async fn get_raw_profile(&self, uid: &str) -> PortResult<Option<RawProfile>>;

    /// Full scan of all stored profile documents, used to build the unseen
    /// pool. Rows that cannot be decoded are skipped by the adapter.
    async fn scan_raw_profiles(&self) -> PortResult<Vec<RawProfile>>;

    /// Merge-writes a profile document for `uid`.
    async fn upsert_profile(&self, uid: &str, doc: &serde_json::Value) -> PortResult<()>;

    // --- Swipes ---
    /// Upsert keyed by `(actor, target)`: resubmission overwrites direction
    /// and timestamp, it never creates a second row.
    async fn upsert_swipe(&self, swipe: &Swipe) -> PortResult<()>;

    async fn get_swipe(&self, actor: &str, target: &str) -> PortResult<Option<Swipe>>;

    /// All targets `actor` has swiped, in either direction.
    async fn swiped_targets(&self, actor: &str) -> PortResult<HashSet<String>>;

    // --- Matches ---
    async fn get_match(&self, match_id: &str) -> PortResult<Option<Match>>;

    /// Conditional create: if a match with the same id already exists, the
    /// existing row is returned unchanged. Two racing writers for the same
    /// pair must both end up observing a single record.
    async fn create_match_if_absent(&self, candidate: &Match) -> PortResult<Match>;

    /// All matches where `uid` appears as either participant. The adapter
    /// owns whatever query shape its store needs to express this.
    async fn matches_involving(&self, uid: &str) -> PortResult<Vec<Match>>;
}
