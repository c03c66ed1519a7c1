//! crates/study_match_core/src/batch.rs
//!
//! The candidate filter/relaxation pipeline. Given a requester, assembles
//! a ranked batch of unseen candidates: a strict pass requiring matching
//! study times, a relaxed pass dropping the time constraint when the
//! strict pass comes up short, randomized tie-breaking, and a random
//! back-fill from the rest of the unseen pool.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::domain::Profile;
use crate::normalize::normalize;
use crate::ports::{PortResult, StoreService};
use crate::scoring::complementarity;

/// Fixed batch size.
pub const BATCH_SIZE: usize = 20;

/// Assembles the next batch of up to [`BATCH_SIZE`] candidates for `uid`.
///
/// A requester without a stored profile browses with an empty self
/// profile. The rng drives tie-break shuffling and back-fill order; tests
/// pass a seeded one.
pub async fn next_batch<R: Rng + ?Sized>(
    store: &dyn StoreService,
    rng: &mut R,
    uid: &str,
) -> PortResult<Vec<Profile>> {
    let me = match store.get_raw_profile(uid).await? {
        Some(raw) => normalize(&raw),
        None => Profile::empty(uid),
    };

    // The unseen pool: everyone except the requester, anyone the requester
    // has swiped in either direction, and anyone already matched.
    let swiped = store.swiped_targets(uid).await?;
    let matched: HashSet<String> = store
        .matches_involving(uid)
        .await?
        .into_iter()
        .map(|m| if m.user_a == uid { m.user_b } else { m.user_a })
        .collect();

    let unseen: Vec<Profile> = store
        .scan_raw_profiles()
        .await?
        .iter()
        .filter(|raw| raw.uid != uid && !swiped.contains(&raw.uid) && !matched.contains(&raw.uid))
        .map(normalize)
        .collect();

    // Scores candidates by index into `unseen`, keeping those >= 1. The
    // strict stage requires both study times to be known and equal; an
    // unknown time cannot assert equality and is skipped.
    let stage = |require_time_match: bool| -> Vec<(usize, u32)> {
        unseen
            .iter()
            .enumerate()
            .filter_map(|(i, candidate)| {
                if require_time_match {
                    match (me.study_time, candidate.study_time) {
                        (Some(mine), Some(theirs)) if mine == theirs => {}
                        _ => return None,
                    }
                }
                let score = complementarity(&me, candidate);
                (score >= 1).then_some((i, score))
            })
            .collect()
    };

    let mut scored = stage(true);
    if scored.len() < BATCH_SIZE {
        // Relaxed stage: no time constraint. Merge by candidate, keeping
        // the higher score wherever both stages saw the same one.
        let mut best: HashMap<usize, u32> = scored.into_iter().collect();
        for (i, score) in stage(false) {
            let entry = best.entry(i).or_insert(score);
            if score > *entry {
                *entry = score;
            }
        }
        scored = best.into_iter().collect();
    }

    // Shuffle before the stable sort so tied scores surface in random
    // order rather than a fixed one.
    scored.shuffle(rng);
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(BATCH_SIZE);

    let mut selected: Vec<usize> = scored.into_iter().map(|(i, _)| i).collect();

    // Back-fill with random unseen candidates until the batch is full or
    // the pool runs out.
    if selected.len() < BATCH_SIZE {
        let taken: HashSet<usize> = selected.iter().copied().collect();
        let mut remaining: Vec<usize> = (0..unseen.len()).filter(|i| !taken.contains(i)).collect();
        remaining.shuffle(rng);
        selected.extend(remaining.into_iter().take(BATCH_SIZE - selected.len()));
    }

    Ok(selected.into_iter().map(|i| unseen[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, StudyTime};
    use crate::swipes::{record_swipe, resolve_right_swipe};
    use crate::testing::{profile_doc, MemStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[tokio::test]
    async fn excludes_self_swiped_and_matched() {
        let store = MemStore::new();
        store.seed_profile("me", profile_doc("Me", Some("MORNING"), &[("Calc", 0)]));
        store.seed_profile("swiped", profile_doc("S", Some("MORNING"), &[("Calc", 2)]));
        store.seed_profile("matched", profile_doc("M", Some("MORNING"), &[("Calc", 2)]));
        store.seed_profile("fresh", profile_doc("F", Some("MORNING"), &[("Calc", 2)]));

        record_swipe(&store, "me", "swiped", Direction::Left).await.unwrap();
        record_swipe(&store, "me", "matched", Direction::Right).await.unwrap();
        record_swipe(&store, "matched", "me", Direction::Right).await.unwrap();
        resolve_right_swipe(&store, "matched", "me").await.unwrap();

        let batch = next_batch(&store, &mut rng(), "me").await.unwrap();
        let uids: Vec<&str> = batch.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, vec!["fresh"]);
    }

    #[tokio::test]
    async fn strict_stage_scores_matching_time_candidate() {
        // Spec scenario: A weak in Calc, B strong in Calc, both MORNING.
        let store = MemStore::new();
        store.seed_profile("a", profile_doc("A", Some("MORNING"), &[("Calc", 0)]));
        store.seed_profile("b", profile_doc("B", Some("MORNING"), &[("Calc", 2)]));

        let batch = next_batch(&store, &mut rng(), "a").await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].uid, "b");
        assert_eq!(batch[0].study_time, Some(StudyTime::Morning));
    }

    #[tokio::test]
    async fn relaxed_stage_covers_mismatched_and_unknown_times() {
        let store = MemStore::new();
        store.seed_profile("me", profile_doc("Me", Some("MORNING"), &[("Calc", 0)]));
        // Complementary but wrong time, and complementary with no time.
        store.seed_profile("evening", profile_doc("E", Some("EVENING"), &[("Calc", 2)]));
        store.seed_profile("unknown", profile_doc("U", None, &[("Calc", 2)]));

        let batch = next_batch(&store, &mut rng(), "me").await.unwrap();
        let mut uids: Vec<&str> = batch.iter().map(|p| p.uid.as_str()).collect();
        uids.sort();
        assert_eq!(uids, vec!["evening", "unknown"]);
    }

    #[tokio::test]
    async fn scored_candidates_rank_above_backfill() {
        let store = MemStore::new();
        store.seed_profile("me", profile_doc("Me", Some("MORNING"), &[("Calc", 1)]));
        store.seed_profile("mutual", profile_doc("P", Some("MORNING"), &[("Calc", 1)]));
        // Zero-score profiles that can only arrive via back-fill.
        for i in 0..5 {
            store.seed_profile(&format!("filler{i}"), profile_doc("F", None, &[]));
        }

        let batch = next_batch(&store, &mut rng(), "me").await.unwrap();
        assert_eq!(batch.len(), 6);
        assert_eq!(batch[0].uid, "mutual");
    }

    #[tokio::test]
    async fn batch_is_bounded_and_fills_from_large_pools() {
        let store = MemStore::new();
        store.seed_profile("me", profile_doc("Me", Some("MORNING"), &[("Calc", 0)]));
        for i in 0..30 {
            store.seed_profile(
                &format!("cand{i:02}"),
                profile_doc("C", Some("MORNING"), &[("Calc", 2)]),
            );
        }

        let batch = next_batch(&store, &mut rng(), "me").await.unwrap();
        assert_eq!(batch.len(), BATCH_SIZE);
    }

    #[tokio::test]
    async fn requester_without_profile_still_browses() {
        let store = MemStore::new();
        store.seed_profile("other", profile_doc("O", Some("EVENING"), &[("Chem", 1)]));

        let batch = next_batch(&store, &mut rng(), "ghost").await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].uid, "other");
    }

    #[tokio::test]
    async fn everyone_swiped_means_empty_batch() {
        let store = MemStore::new();
        store.seed_profile("c", profile_doc("C", Some("MORNING"), &[("Calc", 1)]));
        for other in ["x", "y", "z"] {
            store.seed_profile(other, profile_doc("O", Some("MORNING"), &[("Calc", 1)]));
            record_swipe(&store, "c", other, Direction::Left).await.unwrap();
        }

        let batch = next_batch(&store, &mut rng(), "c").await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn empty_pool_is_not_an_error() {
        let store = MemStore::new();
        store.seed_profile("alone", profile_doc("A", Some("MORNING"), &[("Calc", 1)]));
        let batch = next_batch(&store, &mut rng(), "alone").await.unwrap();
        assert!(batch.is_empty());
    }
}
