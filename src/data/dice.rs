use std::fmt;

use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};

/// A dice expression such as `3d6` or `3d6H2` (keep the two highest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dice {
    pub count: i32,
    pub sides: i32,
    /// Zero sums every die.
    pub keep_highest: i32,
}

impl Dice {
    pub const fn new(count: i32, sides: i32) -> Self {
        Self {
            count,
            sides,
            keep_highest: 0,
        }
    }

    pub const fn keep(count: i32, sides: i32, keep_highest: i32) -> Self {
        Self {
            count,
            sides,
            keep_highest,
        }
    }

    pub fn roll(&self, rng: &mut RandomNumberGenerator) -> i32 {
        roll_dice(rng, self.count, self.sides, self.keep_highest)
    }

    /// Largest value a roll can produce.
    pub fn max_total(&self) -> i32 {
        let kept = if self.keep_highest > 0 {
            self.keep_highest.min(self.count)
        } else {
            self.count
        };
        kept * self.sides
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.keep_highest > 0 {
            write!(f, "H{}", self.keep_highest)?;
        }
        Ok(())
    }
}

/// Rolls `count` dice with `sides` faces each.
///
/// With `keep_highest` above zero only that many of the highest rolls are
/// summed. Callers guarantee `count >= 1` and `sides >= 1`.
pub fn roll_dice(
    rng: &mut RandomNumberGenerator,
    count: i32,
    sides: i32,
    keep_highest: i32,
) -> i32 {
    let mut rolls: Vec<i32> = (0..count).map(|_| rng.range(1, sides + 1)).collect();
    total_of(&mut rolls, keep_highest)
}

/// Sums a set of individual die results under the keep-highest rule.
pub fn total_of(rolls: &mut [i32], keep_highest: i32) -> i32 {
    if keep_highest > 0 {
        rolls.sort_unstable_by(|a, b| b.cmp(a));
        rolls.iter().take(keep_highest as usize).sum()
    } else {
        rolls.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn display_uses_handbook_notation() {
        assert_eq!(Dice::new(4, 6).to_string(), "4d6");
        assert_eq!(Dice::keep(3, 6, 2).to_string(), "3d6H2");
    }

    #[test]
    fn keep_highest_drops_low_rolls() {
        let mut rolls = [1, 6, 3];
        assert_eq!(total_of(&mut rolls, 2), 9);
        let mut rolls = [1, 6, 3];
        assert_eq!(total_of(&mut rolls, 0), 10);
    }

    #[test]
    fn max_total_respects_keep() {
        assert_eq!(Dice::new(2, 10).max_total(), 20);
        assert_eq!(Dice::keep(4, 6, 3).max_total(), 18);
    }

    proptest! {
        #[test]
        fn sum_stays_within_bounds(seed in any::<u64>(), count in 1i32..12, sides in 1i32..20) {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let total = roll_dice(&mut rng, count, sides, 0);
            prop_assert!(total >= count);
            prop_assert!(total <= count * sides);
        }

        #[test]
        fn kept_sum_stays_within_bounds(seed in any::<u64>(), count in 2i32..12, sides in 1i32..20, keep in 1i32..12) {
            let keep = keep.min(count - 1);
            let mut rng = RandomNumberGenerator::seeded(seed);
            let total = roll_dice(&mut rng, count, sides, keep);
            prop_assert!(total >= keep);
            prop_assert!(total <= keep * sides);
        }

        #[test]
        fn kept_never_exceeds_full_sum(rolls in proptest::collection::vec(1i32..=20, 2..10), keep in 1i32..10) {
            let keep = keep.min(rolls.len() as i32 - 1);
            let mut kept = rolls.clone();
            let mut full = rolls.clone();
            prop_assert!(total_of(&mut kept, keep) <= total_of(&mut full, 0));
        }
    }
}
