//! crates/study_match_core/src/testing.rs
//!
//! An in-memory [`StoreService`] implementation plus small builders, used
//! by this crate's unit tests and by the api service's router tests. Keeps
//! the same observable semantics as the Postgres adapter: upsert swipes,
//! conditional match creation, merge-written profile documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use crate::domain::{AuthSession, Match, RawProfile, Swipe, UserCredentials};
use crate::ports::{PortError, PortResult, StoreService};

#[derive(Default)]
pub struct MemStore {
    users: Mutex<HashMap<String, UserCredentials>>,
    sessions: Mutex<HashMap<String, AuthSession>>,
    profiles: Mutex<BTreeMap<String, Value>>,
    swipes: Mutex<BTreeMap<(String, String), Swipe>>,
    matches: Mutex<BTreeMap<String, Match>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a profile document directly, bypassing validation.
    pub fn seed_profile(&self, uid: &str, doc: Value) {
        self.profiles.lock().unwrap().insert(uid.to_string(), doc);
    }
}

/// Builds a stored profile document in the current schema shape.
pub fn profile_doc(name: &str, study_time: Option<&str>, classes: &[(&str, i64)]) -> Value {
    let classes: serde_json::Map<String, Value> = classes
        .iter()
        .map(|(class, level)| (class.to_string(), json!(level)))
        .collect();
    let mut doc = json!({
        "fullName": name,
        "classes": classes,
        "major": "Undeclared",
        "year": "freshman",
        "description": "seeded test profile",
    });
    if let Some(time) = study_time {
        doc["preferredStudyTime"] = json!(time);
    }
    doc
}

#[async_trait]
impl StoreService for MemStore {
    async fn create_user_with_email(
        &self,
        uid: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(PortError::Conflict(format!("email {email} already registered")));
        }
        users.insert(
            uid.to_string(),
            UserCredentials {
                uid: uid.to_string(),
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(())
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("no user with email {email}")))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        uid: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions.lock().unwrap().insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                uid: uid.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String> {
        let sessions = self.sessions.lock().unwrap();
        match sessions.get(session_id) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.uid.clone()),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn get_raw_profile(&self, uid: &str) -> PortResult<Option<RawProfile>> {
        Ok(self.profiles.lock().unwrap().get(uid).map(|doc| RawProfile {
            uid: uid.to_string(),
            doc: doc.clone(),
        }))
    }

    async fn scan_raw_profiles(&self) -> PortResult<Vec<RawProfile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .map(|(uid, doc)| RawProfile {
                uid: uid.clone(),
                doc: doc.clone(),
            })
            .collect())
    }

    async fn upsert_profile(&self, uid: &str, doc: &Value) -> PortResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        let entry = profiles
            .entry(uid.to_string())
            .or_insert_with(|| json!({}));
        // Merge write: incoming top-level fields overwrite, others survive.
        if let (Value::Object(existing), Value::Object(incoming)) = (entry, doc) {
            for (key, value) in incoming {
                existing.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn upsert_swipe(&self, swipe: &Swipe) -> PortResult<()> {
        self.swipes
            .lock()
            .unwrap()
            .insert((swipe.actor.clone(), swipe.target.clone()), swipe.clone());
        Ok(())
    }

    async fn get_swipe(&self, actor: &str, target: &str) -> PortResult<Option<Swipe>> {
        Ok(self
            .swipes
            .lock()
            .unwrap()
            .get(&(actor.to_string(), target.to_string()))
            .cloned())
    }

    async fn swiped_targets(&self, actor: &str) -> PortResult<HashSet<String>> {
        Ok(self
            .swipes
            .lock()
            .unwrap()
            .keys()
            .filter(|(a, _)| a == actor)
            .map(|(_, target)| target.clone())
            .collect())
    }

    async fn get_match(&self, match_id: &str) -> PortResult<Option<Match>> {
        Ok(self.matches.lock().unwrap().get(match_id).cloned())
    }

    async fn create_match_if_absent(&self, candidate: &Match) -> PortResult<Match> {
        let mut matches = self.matches.lock().unwrap();
        Ok(matches
            .entry(candidate.match_id.clone())
            .or_insert_with(|| candidate.clone())
            .clone())
    }

    async fn matches_involving(&self, uid: &str) -> PortResult<Vec<Match>> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.user_a == uid || m.user_b == uid)
            .cloned()
            .collect())
    }
}
