use itertools::Itertools;

use crate::rules::can_finish_with_double;
use crate::target::Target;

/// Highest score that can still be checked out in one visit.
pub const MAX_CHECKOUT: i64 = 170;

fn triples() -> impl Iterator<Item = Target> {
    (1..=20u8).rev().map(Target::Triple)
}

fn singles() -> impl Iterator<Item = Target> {
    (1..=20u8).rev().map(Target::Single)
}

/// Setup-dart candidates in preference order. Triples lead while there are
/// darts to spare; with the last dart a single that leaves a double is the
/// safer play.
fn setup_candidates(throws_remaining: u8) -> Vec<Target> {
    let (first, second) = if throws_remaining > 1 {
        (triples().collect_vec(), singles().collect_vec())
    } else {
        (singles().collect_vec(), triples().collect_vec())
    };
    first
        .into_iter()
        .chain(second)
        .chain(std::iter::once(Target::OuterBull))
        .collect()
}

/// Best target for the next dart given what is left and how many darts remain
/// in the visit. `None` means no checkout play applies and the caller should
/// use its default target.
pub fn optimal_target(remaining: i64, throws_remaining: u8) -> Option<Target> {
    if remaining <= 1 || remaining > MAX_CHECKOUT {
        return None;
    }
    if remaining == 50 {
        return Some(Target::Bull);
    }
    if remaining <= 40 && remaining % 2 == 0 {
        return Some(Target::Double((remaining / 2) as u8));
    }

    let candidates = setup_candidates(throws_remaining);
    let leaves = |t: &Target| remaining - t.score() as i64;

    candidates
        .iter()
        .find(|t| can_finish_with_double(leaves(t)))
        .or_else(|| candidates.iter().find(|t| leaves(t) >= 2))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_direct_doubles() {
        assert_eq!(optimal_target(40, 3), Some(Target::Double(20)));
        assert_eq!(optimal_target(32, 1), Some(Target::Double(16)));
        assert_eq!(optimal_target(2, 2), Some(Target::Double(1)));
    }

    #[test]
    fn test_bull_finish() {
        assert_eq!(optimal_target(50, 1), Some(Target::Bull));
    }

    #[test]
    fn test_out_of_range_returns_none() {
        assert_eq!(optimal_target(1, 3), None);
        assert_eq!(optimal_target(0, 3), None);
        assert_eq!(optimal_target(-4, 3), None);
        assert_eq!(optimal_target(171, 3), None);
        assert_eq!(optimal_target(501, 3), None);
    }

    #[test]
    fn test_setup_prefers_triple_with_darts_in_hand() {
        // T20 leaves 40.
        assert_eq!(optimal_target(100, 3), Some(Target::Triple(20)));
        // T19 leaves 40 when T20 would leave an odd 41.
        assert_eq!(optimal_target(97, 2), Some(Target::Triple(19)));
    }

    #[test]
    fn test_last_dart_prefers_single_setup() {
        // S19 leaves 22; S20 would leave an odd 21.
        assert_eq!(optimal_target(41, 1), Some(Target::Single(19)));
        // S19 leaves 38.
        assert_eq!(optimal_target(57, 1), Some(Target::Single(19)));
    }

    #[test]
    fn test_falls_back_to_highest_score_that_leaves_two() {
        // 169 has no one-dart setup to a finish; T20 still leaves 109.
        assert_eq!(optimal_target(169, 3), Some(Target::Triple(20)));
    }

    #[test]
    fn test_odd_small_numbers() {
        // T1 would leave 0 without a double; S1 leaves D1.
        assert_eq!(optimal_target(3, 3), Some(Target::Single(1)));
    }

    proptest! {
        #[test]
        fn prop_suggestion_never_overshoots(remaining in 2i64..=170, darts in 1u8..=3) {
            let target = optimal_target(remaining, darts).unwrap();
            let left = remaining - target.score() as i64;
            prop_assert!(left >= 0);
            prop_assert!(left != 1);
            if left == 0 {
                prop_assert!(target.is_double());
            }
        }
    }
}
