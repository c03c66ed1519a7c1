//! crates/study_match_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Preferred time of day for studying, in its canonical normalized form.
///
/// Stored documents may carry lowercase variants or the legacy `NIGHT`
/// value; parsing handles both. An unrecognized value is *unknown* and is
/// represented as `Option<StudyTime>::None`, never silently coerced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyTime {
    Morning,
    Afternoon,
    Evening,
}

impl StudyTime {
    /// Parses a stored study-time string. Case-insensitive; the legacy
    /// `NIGHT` value maps to `Evening`. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MORNING" => Some(StudyTime::Morning),
            "AFTERNOON" => Some(StudyTime::Afternoon),
            "EVENING" => Some(StudyTime::Evening),
            "NIGHT" => Some(StudyTime::Evening),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudyTime::Morning => "MORNING",
            StudyTime::Afternoon => "AFTERNOON",
            StudyTime::Evening => "EVENING",
        }
    }
}

/// Self-reported proficiency in a class: 0 = weak, 1 = okay, 2 = strong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proficiency {
    Weak,
    Okay,
    Strong,
}

impl Proficiency {
    /// Converts a stored integer level. Out-of-range values return `None`
    /// and are dropped during normalization.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Proficiency::Weak),
            1 => Some(Proficiency::Okay),
            2 => Some(Proficiency::Strong),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Proficiency::Weak => 0,
            Proficiency::Okay => 1,
            Proficiency::Strong => 2,
        }
    }
}

/// Academic year. Carries no matching semantics; it is profile metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Year {
    #[default]
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl Year {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "freshman" => Some(Year::Freshman),
            "sophomore" => Some(Year::Sophomore),
            "junior" => Some(Year::Junior),
            "senior" => Some(Year::Senior),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Year::Freshman => "freshman",
            Year::Sophomore => "sophomore",
            Year::Junior => "junior",
            Year::Senior => "senior",
        }
    }
}

/// A user profile in canonical in-memory shape, produced by the
/// normalizer from a stored [`RawProfile`] document.
#[derive(Debug, Clone)]
pub struct Profile {
    pub uid: String,
    pub full_name: String,
    /// `None` means the stored value was missing or unrecognized. The
    /// unknown state survives through scoring; output boundaries decide
    /// what to default it to.
    pub study_time: Option<StudyTime>,
    pub classes: BTreeMap<String, Proficiency>,
    pub major: String,
    pub year: Year,
    pub description: String,
}

impl Profile {
    /// An empty profile for a user with no stored document. Such a user
    /// can still browse candidates.
    pub fn empty(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            full_name: String::new(),
            study_time: None,
            classes: BTreeMap::new(),
            major: String::new(),
            year: Year::default(),
            description: String::new(),
        }
    }
}

/// A stored profile document as the store hands it back: the uid plus the
/// raw JSON body, whose field names may vary across schema versions.
#[derive(Debug, Clone)]
pub struct RawProfile {
    pub uid: String,
    pub doc: serde_json::Value,
}

/// Swipe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// A directed swipe edge. At most one exists per ordered `(actor, target)`
/// pair; resubmission overwrites direction and timestamp.
#[derive(Debug, Clone)]
pub struct Swipe {
    pub actor: String,
    pub target: String,
    pub direction: Direction,
    pub swiped_at: DateTime<Utc>,
}

/// A mutual match between two users. `user_a` is the lexicographically
/// smaller uid; `match_id` is the canonical pair id, identical regardless
/// of which party triggered creation. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Match {
    pub match_id: String,
    pub user_a: String,
    pub user_b: String,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub uid: String,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub uid: String,
    pub expires_at: DateTime<Utc>,
}
