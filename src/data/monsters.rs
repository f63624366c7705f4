use super::{Dice, Rgb8};

#[derive(Clone, Debug, PartialEq)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub hit_dice: Dice,
    pub color: Rgb8,
}

/// Combat numbers derived from a monster's hit dice.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterProfile {
    pub glyph: char,
    pub armor_class: i32,
    pub to_hit: i32,
    pub damage_roll: Dice,
    pub xp: i32,
}

// (name, first depth, hit dice count, hit dice sides, colour)
const MONSTERS: &[(&str, i32, i32, i32, Rgb8)] = &[
    ("felix", 1, 1, 4, (115, 185, 255)),
    ("skinless", 1, 1, 6, (255, 105, 180)),
    ("skeletal", 1, 1, 10, (222, 211, 195)),
    ("lobsterman", 1, 1, 6, (255, 0, 0)),
    ("cave mushroom", 1, 1, 6, (191, 255, 191)),
    ("anthropophagi", 1, 1, 8, (255, 218, 185)),
    ("capyfolk", 1, 1, 6, (191, 143, 79)),
    ("nagahide", 3, 2, 12, (0, 128, 0)),
    ("clawman", 3, 2, 12, (40, 40, 40)),
    ("hiverbug", 5, 3, 8, (255, 255, 0)),
    ("seeker drone", 5, 3, 12, (203, 203, 203)),
    ("neurovore", 7, 1, 6, (130, 110, 50)),
    ("paleworm", 7, 5, 6, (191, 0, 95)),
    ("gulper", 9, 5, 8, (223, 223, 223)),
    ("centipod", 9, 5, 6, (63, 0, 0)),
    ("blind troll", 9, 5, 10, (0, 63, 0)),
    ("scumsucker", 11, 6, 8, (255, 218, 185)),
    ("living weapon", 11, 6, 12, (40, 40, 40)),
    ("megaworm", 13, 8, 10, (203, 203, 203)),
];

impl MonsterTemplate {
    /// Every monster that may appear at `depth`.
    pub fn for_depth(depth: i32) -> Vec<Self> {
        let mut table = vec![Self {
            name: "deranged crewmember",
            hit_dice: Dice::new(depth.max(1), 8),
            color: (255, 115, 115),
        }];
        table.extend(
            MONSTERS
                .iter()
                .filter(|(_, first, ..)| *first <= depth)
                .map(|&(name, _, count, sides, color)| Self {
                    name,
                    hit_dice: Dice::new(count, sides),
                    color,
                }),
        );
        table
    }

    pub fn profile(&self) -> MonsterProfile {
        profile_for(self.name, self.hit_dice)
    }
}

pub fn profile_for(name: &str, hit_dice: Dice) -> MonsterProfile {
    let Dice { count, sides, .. } = hit_dice;
    let to_hit = if sides == 12 {
        count
    } else if (8..=11).contains(&sides) {
        count / 2
    } else {
        count / 3
    };

    let first = name.chars().next().unwrap_or('?');
    let glyph = if sides >= 10 {
        first.to_ascii_uppercase()
    } else {
        first
    };

    MonsterProfile {
        glyph,
        armor_class: 10 - count,
        to_hit,
        damage_roll: Dice::new((count / 2).max(1), sides),
        xp: count * sides * 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_levels_only_offer_weak_monsters() {
        let table = MonsterTemplate::for_depth(1);
        assert!(table.iter().all(|m| m.hit_dice.count <= 1));
        assert!(table.iter().any(|m| m.name == "felix"));
        assert!(!table.iter().any(|m| m.name == "megaworm"));
    }

    #[test]
    fn crewmember_scales_with_depth() {
        let table = MonsterTemplate::for_depth(6);
        let crew = table
            .iter()
            .find(|m| m.name == "deranged crewmember")
            .expect("crewmember is always present");
        assert_eq!(crew.hit_dice, Dice::new(6, 8));
    }

    #[test]
    fn profile_derives_from_hit_dice() {
        let troll = profile_for("blind troll", Dice::new(5, 10));
        assert_eq!(troll.glyph, 'B');
        assert_eq!(troll.armor_class, 5);
        assert_eq!(troll.to_hit, 2);
        assert_eq!(troll.damage_roll, Dice::new(2, 10));
        assert_eq!(troll.xp, 250);

        let felix = profile_for("felix", Dice::new(1, 4));
        assert_eq!(felix.glyph, 'f');
        assert_eq!(felix.to_hit, 0);
        assert_eq!(felix.damage_roll, Dice::new(1, 4));
    }
}
