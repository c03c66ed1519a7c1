//! crates/study_match_core/src/swipes.rs
//!
//! The swipe ledger and the match resolver. Recording a swipe and
//! detecting a match are deliberately separate operations: the ledger
//! write is the durable side effect the caller expects, and a resolver
//! failure afterwards must never undo or mask it.

use chrono::Utc;

use crate::domain::{Direction, Match, Swipe};
use crate::ports::{PortError, PortResult, StoreService};

/// The canonical pair id for an unordered pair of uids: the two ids
/// joined lexicographically, smaller first. Symmetric by construction.
pub fn match_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}_{b}")
    } else {
        format!("{b}_{a}")
    }
}

/// Records a directional swipe from `actor` to `target`.
///
/// Self-swipes and empty targets are rejected before anything is written.
/// The write is an upsert keyed by `(actor, target)`: swiping the same
/// person again overwrites direction and timestamp, last write wins.
pub async fn record_swipe(
    store: &dyn StoreService,
    actor: &str,
    target: &str,
    direction: Direction,
) -> PortResult<Swipe> {
    if target.trim().is_empty() {
        return Err(PortError::Invalid("target uid must be non-empty".to_string()));
    }
    if actor == target {
        return Err(PortError::Invalid("cannot swipe on yourself".to_string()));
    }

    let swipe = Swipe {
        actor: actor.to_string(),
        target: target.to_string(),
        direction,
        swiped_at: Utc::now(),
    };
    store.upsert_swipe(&swipe).await?;
    Ok(swipe)
}

/// Checks whether `actor`'s right-swipe on `target` completes a mutual
/// pair, creating the canonical match if so.
///
/// Returns `None` when the reverse swipe is absent or a left. Creation
/// goes through the store's conditional create, so two racing resolutions
/// of the same pair both come back with the single existing record.
pub async fn resolve_right_swipe(
    store: &dyn StoreService,
    actor: &str,
    target: &str,
) -> PortResult<Option<Match>> {
    let reverse = store.get_swipe(target, actor).await?;
    match reverse {
        Some(swipe) if swipe.direction == Direction::Right => {
            let (user_a, user_b) = if actor <= target {
                (actor, target)
            } else {
                (target, actor)
            };
            let candidate = Match {
                match_id: match_id(actor, target),
                user_a: user_a.to_string(),
                user_b: user_b.to_string(),
                created_at: Utc::now(),
            };
            store.create_match_if_absent(&candidate).await.map(Some)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{profile_doc, MemStore};

    #[test]
    fn match_id_is_symmetric_and_ordered() {
        assert_eq!(match_id("alice", "bob"), "alice_bob");
        assert_eq!(match_id("bob", "alice"), "alice_bob");
    }

    #[tokio::test]
    async fn self_swipe_is_rejected_without_a_write() {
        let store = MemStore::new();
        let err = record_swipe(&store, "a", "a", Direction::Right).await.unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
        assert!(store.get_swipe("a", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_target_is_rejected() {
        let store = MemStore::new();
        let err = record_swipe(&store, "a", "  ", Direction::Left).await.unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }

    #[tokio::test]
    async fn resubmission_overwrites_instead_of_duplicating() {
        let store = MemStore::new();
        record_swipe(&store, "a", "b", Direction::Right).await.unwrap();
        record_swipe(&store, "a", "b", Direction::Left).await.unwrap();

        let stored = store.get_swipe("a", "b").await.unwrap().unwrap();
        assert_eq!(stored.direction, Direction::Left);
        assert_eq!(store.swiped_targets("a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_match_until_both_sides_swiped_right() {
        let store = MemStore::new();

        // No reverse swipe at all.
        record_swipe(&store, "a", "b", Direction::Right).await.unwrap();
        assert!(resolve_right_swipe(&store, "a", "b").await.unwrap().is_none());

        // Reverse swipe exists but is a left.
        record_swipe(&store, "b", "a", Direction::Left).await.unwrap();
        assert!(resolve_right_swipe(&store, "a", "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mutual_right_swipes_create_one_canonical_match() {
        let store = MemStore::new();
        store.seed_profile("a", profile_doc("A", Some("MORNING"), &[("Calc", 0)]));
        store.seed_profile("b", profile_doc("B", Some("MORNING"), &[("Calc", 2)]));

        record_swipe(&store, "a", "b", Direction::Right).await.unwrap();
        assert!(resolve_right_swipe(&store, "a", "b").await.unwrap().is_none());

        record_swipe(&store, "b", "a", Direction::Right).await.unwrap();
        let created = resolve_right_swipe(&store, "b", "a").await.unwrap().unwrap();
        assert_eq!(created.match_id, "a_b");
        assert_eq!(created.user_a, "a");
        assert_eq!(created.user_b, "b");

        // Both participants see exactly the one match.
        for uid in ["a", "b"] {
            let matches = store.matches_involving(uid).await.unwrap();
            assert_eq!(matches.len(), 1);
            assert_eq!(matches[0].match_id, "a_b");
        }
    }

    #[tokio::test]
    async fn resolution_is_idempotent_for_the_pair() {
        let store = MemStore::new();
        record_swipe(&store, "a", "b", Direction::Right).await.unwrap();
        record_swipe(&store, "b", "a", Direction::Right).await.unwrap();

        // Both parties' requests resolve; the second gets the first's record.
        let first = resolve_right_swipe(&store, "b", "a").await.unwrap().unwrap();
        let second = resolve_right_swipe(&store, "a", "b").await.unwrap().unwrap();
        assert_eq!(first.match_id, second.match_id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(store.matches_involving("a").await.unwrap().len(), 1);
    }
}
