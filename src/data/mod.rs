pub mod dice;
pub mod items;
pub mod monsters;

use bracket_random::prelude::RandomNumberGenerator;

pub use dice::{Dice, roll_dice};

/// Colour as stored in content tables and snapshots.
pub type Rgb8 = (u8, u8, u8);

/// Looks up a depth-keyed table of `(value, from_level)` pairs.
///
/// Returns the value of the last entry whose level is at or below `depth`,
/// or zero when the depth precedes every entry.
pub fn from_dungeon_level(table: &[(i32, i32)], depth: i32) -> i32 {
    table
        .iter()
        .rev()
        .find(|(_, level)| depth >= *level)
        .map(|(value, _)| *value)
        .unwrap_or(0)
}

/// Picks an index with probability proportional to its weight.
pub fn weighted_index(rng: &mut RandomNumberGenerator, chances: &[i32]) -> usize {
    let total: i32 = chances.iter().sum();
    if total <= 0 {
        return 0;
    }
    let dice = rng.range(1, total + 1);
    let mut running = 0;
    for (idx, weight) in chances.iter().enumerate() {
        running += weight;
        if dice <= running {
            return idx;
        }
    }
    chances.len() - 1
}

/// Uniform pick from a non-empty slice.
pub fn pick<'a, T>(rng: &mut RandomNumberGenerator, options: &'a [T]) -> &'a T {
    let idx = rng.range(0, options.len() as i32) as usize;
    &options[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dungeon_level_table_picks_latest_threshold() {
        let table = [(2, 1), (3, 4), (4, 6), (5, 8)];
        assert_eq!(from_dungeon_level(&table, 0), 0);
        assert_eq!(from_dungeon_level(&table, 1), 2);
        assert_eq!(from_dungeon_level(&table, 5), 3);
        assert_eq!(from_dungeon_level(&table, 13), 5);
    }

    #[test]
    fn weighted_index_never_picks_zero_weight() {
        let mut rng = RandomNumberGenerator::seeded(7);
        for _ in 0..200 {
            let idx = weighted_index(&mut rng, &[0, 5, 0, 1]);
            assert!(idx == 1 || idx == 3);
        }
    }
}
