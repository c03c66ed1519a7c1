//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StoreService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Profile documents are stored as JSONB in the raw, schema-version-varied
//! shape the normalizer consumes; swipes and matches are relational rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashSet;
use tracing::warn;

use study_match_core::domain::{Direction, Match, RawProfile, Swipe, UserCredentials};
use study_match_core::ports::{PortError, PortResult, StoreService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StoreService` port.
#[derive(Clone)]
pub struct PgStoreAdapter {
    pool: PgPool,
}

impl PgStoreAdapter {
    /// Creates a new `PgStoreAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn conflict_or_unexpected(e: sqlx::Error, msg: &str) -> PortError {
    // 23505 is the Postgres SQLSTATE for a unique violation.
    match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            PortError::Conflict(msg.to_string())
        }
        _ => unexpected(e),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CredentialsRecord {
    uid: String,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            uid: self.uid,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    uid: String,
    doc: serde_json::Value,
}
impl ProfileRecord {
    fn to_domain(self) -> RawProfile {
        RawProfile {
            uid: self.uid,
            doc: self.doc,
        }
    }
}

#[derive(FromRow)]
struct SwipeRecord {
    actor: String,
    target: String,
    direction: String,
    swiped_at: DateTime<Utc>,
}
impl SwipeRecord {
    fn to_domain(self) -> PortResult<Swipe> {
        let direction = Direction::parse(&self.direction).ok_or_else(|| {
            PortError::Unexpected(format!("stored swipe has direction '{}'", self.direction))
        })?;
        Ok(Swipe {
            actor: self.actor,
            target: self.target,
            direction,
            swiped_at: self.swiped_at,
        })
    }
}

#[derive(FromRow)]
struct MatchRecord {
    match_id: String,
    user_a: String,
    user_b: String,
    created_at: DateTime<Utc>,
}
impl MatchRecord {
    fn to_domain(self) -> Match {
        Match {
            match_id: self.match_id,
            user_a: self.user_a,
            user_b: self.user_b,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `StoreService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoreService for PgStoreAdapter {
    async fn create_user_with_email(
        &self,
        uid: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO users (uid, email, hashed_password) VALUES ($1, $2, $3)")
            .bind(uid)
            .bind(email)
            .bind(hashed_password)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_unexpected(e, "email already registered"))?;
        Ok(())
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT uid, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("no user with email {email}")),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        uid: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, uid, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(uid)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String> {
        let uid: Option<(String,)> = sqlx::query_as(
            "SELECT uid FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        uid.map(|(uid,)| uid).ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_raw_profile(&self, uid: &str) -> PortResult<Option<RawProfile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT uid, doc FROM profiles WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(ProfileRecord::to_domain))
    }

    async fn scan_raw_profiles(&self) -> PortResult<Vec<RawProfile>> {
        let rows = sqlx::query_as::<_, ProfileRecord>("SELECT uid, doc FROM profiles")
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(rows.into_iter().map(ProfileRecord::to_domain).collect())
    }

    async fn upsert_profile(&self, uid: &str, doc: &serde_json::Value) -> PortResult<()> {
        // JSONB || merges top-level keys, preserving fields outside the payload.
        sqlx::query(
            "INSERT INTO profiles (uid, doc) VALUES ($1, $2)
             ON CONFLICT (uid) DO UPDATE
             SET doc = profiles.doc || EXCLUDED.doc, updated_at = now()",
        )
        .bind(uid)
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn upsert_swipe(&self, swipe: &Swipe) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO swipes (actor, target, direction, swiped_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (actor, target) DO UPDATE
             SET direction = EXCLUDED.direction, swiped_at = EXCLUDED.swiped_at",
        )
        .bind(&swipe.actor)
        .bind(&swipe.target)
        .bind(swipe.direction.as_str())
        .bind(swipe.swiped_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_swipe(&self, actor: &str, target: &str) -> PortResult<Option<Swipe>> {
        let record = sqlx::query_as::<_, SwipeRecord>(
            "SELECT actor, target, direction, swiped_at FROM swipes
             WHERE actor = $1 AND target = $2",
        )
        .bind(actor)
        .bind(target)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(SwipeRecord::to_domain).transpose()
    }

    async fn swiped_targets(&self, actor: &str) -> PortResult<HashSet<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT target FROM swipes WHERE actor = $1")
                .bind(actor)
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(rows.into_iter().map(|(target,)| target).collect())
    }

    async fn get_match(&self, match_id: &str) -> PortResult<Option<Match>> {
        let record = sqlx::query_as::<_, MatchRecord>(
            "SELECT match_id, user_a, user_b, created_at FROM matches WHERE match_id = $1",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(MatchRecord::to_domain))
    }

    async fn create_match_if_absent(&self, candidate: &Match) -> PortResult<Match> {
        // Conditional create: losing the race to the other party's request
        // is fine, the follow-up read returns whichever row won.
        let inserted = sqlx::query(
            "INSERT INTO matches (match_id, user_a, user_b, created_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (match_id) DO NOTHING",
        )
        .bind(&candidate.match_id)
        .bind(&candidate.user_a)
        .bind(&candidate.user_b)
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if inserted.rows_affected() == 0 {
            warn!("match {} already existed; returning existing row", candidate.match_id);
        }

        self.get_match(&candidate.match_id).await?.ok_or_else(|| {
            PortError::Unexpected(format!("match {} vanished after create", candidate.match_id))
        })
    }

    async fn matches_involving(&self, uid: &str) -> PortResult<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRecord>(
            "SELECT match_id, user_a, user_b, created_at FROM matches
             WHERE user_a = $1 OR user_b = $1",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(MatchRecord::to_domain).collect())
    }
}
