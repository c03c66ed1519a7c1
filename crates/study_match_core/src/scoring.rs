//! crates/study_match_core/src/scoring.rs
//!
//! The complementarity scorer: a pure function over two normalized
//! profiles, rewarding class overlap where one party can teach the other
//! (weak paired with strong) or both can practice together (both okay).

use crate::domain::{Proficiency, Profile};

/// Points contributed by one shared class.
fn pair_points(a: Proficiency, b: Proficiency) -> u32 {
    use Proficiency::*;
    match (a, b) {
        (Weak, Strong) | (Strong, Weak) => 2,
        (Okay, Okay) => 1,
        _ => 0,
    }
}

/// Scores two profiles on the intersection of their class maps.
///
/// Summed without normalization: breadth of overlap is rewarded, a pair
/// sharing many classes can score arbitrarily higher than a pair sharing
/// one. Symmetric in its arguments.
pub fn complementarity(a: &Profile, b: &Profile) -> u32 {
    a.classes
        .iter()
        .filter_map(|(name, &level_a)| {
            b.classes.get(name).map(|&level_b| pair_points(level_a, level_b))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Proficiency::*;

    fn profile_with(classes: &[(&str, Proficiency)]) -> Profile {
        let mut p = Profile::empty("x");
        p.classes = classes
            .iter()
            .map(|(name, level)| (name.to_string(), *level))
            .collect();
        p
    }

    #[test]
    fn per_class_contributions() {
        let cases = [
            (Weak, Strong, 2),
            (Strong, Weak, 2),
            (Okay, Okay, 1),
            (Weak, Weak, 0),
            (Strong, Strong, 0),
            (Weak, Okay, 0),
            (Okay, Strong, 0),
        ];
        for (a, b, expected) in cases {
            let pa = profile_with(&[("X", a)]);
            let pb = profile_with(&[("X", b)]);
            assert_eq!(complementarity(&pa, &pb), expected, "{a:?}/{b:?}");
        }
    }

    #[test]
    fn sums_across_shared_classes_only() {
        let a = profile_with(&[("Calc", Weak), ("Chem", Okay), ("Bio", Strong)]);
        let b = profile_with(&[("Calc", Strong), ("Chem", Okay), ("Physics", Weak)]);
        // Calc contributes 2, Chem contributes 1, Bio/Physics are unshared.
        assert_eq!(complementarity(&a, &b), 3);
    }

    #[test]
    fn symmetric() {
        let a = profile_with(&[("Calc", Weak), ("Chem", Okay)]);
        let b = profile_with(&[("Calc", Strong), ("Chem", Okay)]);
        assert_eq!(complementarity(&a, &b), complementarity(&b, &a));
    }

    #[test]
    fn no_overlap_scores_zero() {
        let a = profile_with(&[("Calc", Weak)]);
        let b = profile_with(&[("Chem", Strong)]);
        assert_eq!(complementarity(&a, &b), 0);
    }
}
