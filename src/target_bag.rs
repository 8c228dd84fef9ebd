use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::target::Target;

/// Shuffled rotation over the basic target set. Every target comes up once
/// before any repeats.
#[derive(Debug, Clone)]
pub struct TargetBag {
    targets: Vec<Target>,
    cursor: usize,
}

impl TargetBag {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_targets(Target::basic_set(), rng)
    }

    pub fn with_targets<R: Rng + ?Sized>(mut targets: Vec<Target>, rng: &mut R) -> Self {
        targets.shuffle(rng);
        Self { targets, cursor: 0 }
    }

    pub fn current(&self) -> Option<Target> {
        self.targets.get(self.cursor).copied()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Moves to the next target, reshuffling once the bag is exhausted.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cursor += 1;
        if self.cursor >= self.targets.len() {
            self.targets.shuffle(rng);
            self.cursor = 0;
            debug!("target bag exhausted, reshuffled {} targets", self.targets.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_full_cycle_has_no_repeats() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut bag = TargetBag::new(&mut rng);
        assert_eq!(bag.len(), 62);

        let mut seen = HashSet::new();
        for _ in 0..bag.len() {
            assert!(seen.insert(bag.current().unwrap()));
            bag.advance(&mut rng);
        }
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn test_cursor_wraps_after_exhaustion() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut bag = TargetBag::new(&mut rng);
        for _ in 0..61 {
            bag.advance(&mut rng);
        }
        assert_eq!(bag.cursor(), 61);
        bag.advance(&mut rng);
        assert_eq!(bag.cursor(), 0);
        assert!(bag.current().is_some());
    }

    #[test]
    fn test_second_cycle_is_also_complete() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut bag = TargetBag::new(&mut rng);
        for _ in 0..62 {
            bag.advance(&mut rng);
        }
        let mut seen = HashSet::new();
        for _ in 0..62 {
            seen.insert(bag.current().unwrap());
            bag.advance(&mut rng);
        }
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn test_empty_bag_has_no_current() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut bag = TargetBag::with_targets(vec![], &mut rng);
        assert!(bag.is_empty());
        assert_eq!(bag.current(), None);
        bag.advance(&mut rng);
        assert_eq!(bag.cursor(), 0);
    }
}
