use bracket_random::prelude::RandomNumberGenerator;

use super::{Dice, Rgb8, pick, roll_dice};
use crate::config::FIREBALL_RADIUS;
use crate::ecs::components::{
    Equipment, EquipmentSlot, Fixture, FixtureKind, ItemUses, LoreKind, UseEffect,
};

const BRASS: Rgb8 = (191, 151, 96);
const ARMOR_GRAY: Rgb8 = (95, 95, 95);
const DEVICE_YELLOW: Rgb8 = (255, 255, 115);

#[derive(Clone, Debug, PartialEq)]
pub enum ItemKind {
    Consumable { effect: UseEffect, uses: ItemUses },
    Gear(Equipment),
    Fixture(Fixture),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemTemplate {
    pub name: String,
    pub glyph: char,
    pub color: Rgb8,
    pub kind: ItemKind,
}

impl ItemTemplate {
    fn new(name: impl Into<String>, glyph: char, color: Rgb8, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            glyph,
            color,
            kind,
        }
    }
}

/// What the player wakes up holding.
pub fn starter_weapon() -> ItemTemplate {
    let mut knife = Equipment::new(EquipmentSlot::RightHand);
    knife.damage_roll = Some(Dice::new(1, 4));
    ItemTemplate::new("combat knife", '-', (0, 191, 255), ItemKind::Gear(knife))
}

/// One random floor item for a freshly stocked room.
pub fn random_item(rng: &mut RandomNumberGenerator, depth: i32) -> ItemTemplate {
    match rng.range(0, 4) {
        0 => make_consumable(rng),
        1 => make_armor(rng),
        2 => make_weapon(rng),
        _ => make_fixture(rng, depth),
    }
}

pub fn make_weapon(rng: &mut RandomNumberGenerator) -> ItemTemplate {
    const MODERN: &[(char, &str, Dice)] = &[
        ('-', "shiv", Dice::new(1, 3)),
        ('-', "combat knife", Dice::new(1, 4)),
        ('-', "vibro-blade", Dice::new(1, 6)),
        ('/', "cutlass", Dice::new(1, 8)),
        ('/', "vibro-sword", Dice::new(1, 10)),
        ('/', "laser sword", Dice::keep(2, 10, 1)),
        (')', "laser pistol", Dice::keep(2, 6, 1)),
        (')', "slug pistol", Dice::new(1, 8)),
        (')', "particle beamer", Dice::new(1, 10)),
        ('}', "pulse rifle", Dice::keep(3, 6, 2)),
        ('}', "plasma rifle", Dice::new(2, 6)),
        ('}', "bolt rifle", Dice::new(2, 10)),
        ('=', "naval pumpgun", Dice::new(2, 6)),
        ('=', "sonic wavegun", Dice::new(2, 8)),
        ('=', "plasma burster", Dice::new(2, 12)),
        ('&', "minigun", Dice::keep(4, 6, 3)),
        ('&', "flamethrower", Dice::new(1, 8)),
        ('&', "microrocket gun", Dice::new(3, 8)),
    ];
    const ANCIENT: &[(&str, char, bool, &[&str], &[Dice])] = &[
        (
            "dagger",
            '-',
            true,
            &["monomolecular", "phasic", "plasma", "hard light", "synthdiamond", "chitin"],
            &[Dice::new(1, 4), Dice::new(1, 6), Dice::new(1, 8), Dice::new(1, 10), Dice::keep(2, 10, 1)],
        ),
        (
            "sword",
            '/',
            true,
            &["monomolecular", "phasic", "plasma", "hard light", "synthdiamond", "chitin"],
            &[Dice::new(1, 8), Dice::new(1, 10), Dice::new(1, 12), Dice::keep(2, 12, 1), Dice::keep(3, 12, 1)],
        ),
        (
            "pistol",
            ')',
            true,
            &["neutron slug", "disintegrator", "electric arc", "quark accelerator", "pain ray", "dark matter beam"],
            &[Dice::new(1, 8), Dice::new(1, 10), Dice::new(1, 12), Dice::new(2, 8), Dice::new(2, 10)],
        ),
        (
            "rifle",
            '}',
            true,
            &["neutron slug", "disintegrator", "electric arc", "quark accelerator", "pain ray", "dark matter beam"],
            &[Dice::new(2, 8), Dice::new(2, 10), Dice::keep(3, 10, 2), Dice::new(2, 12), Dice::new(3, 6)],
        ),
        (
            "shotgun",
            '=',
            false,
            &["graviton wave gun", "spatial disruptor", "field projector", "waveform collapser", "superfluid blast emitter", "molecular vibrator"],
            &[Dice::new(2, 6), Dice::new(2, 8), Dice::new(2, 10), Dice::new(2, 12), Dice::keep(3, 10, 2)],
        ),
        (
            "heavy",
            '&',
            false,
            &["existential dequantifier", "remote fusion launcher", "antimatter pod launcher", "matter melter", "uncertainty resolver", "polarity reverser"],
            &[Dice::new(3, 8), Dice::new(3, 10), Dice::new(3, 12), Dice::new(4, 8), Dice::new(4, 10)],
        ),
    ];

    let (glyph, mut name, damage) = if rng.range(1, 5) < 4 {
        let &(glyph, name, damage) = pick(rng, MODERN);
        (glyph, name.to_string(), damage)
    } else {
        let &(kind, glyph, suffixed, names, damages) = pick(rng, ANCIENT);
        let prefix = *pick(rng, names);
        let name = if suffixed {
            format!("{prefix} {kind}")
        } else {
            prefix.to_string()
        };
        (glyph, name, *pick(rng, damages))
    };

    let bonus = rng.range(1, 4) - 1;
    if bonus > 0 {
        name = format!("{name} +{bonus}");
    }

    let mut weapon = Equipment::new(EquipmentSlot::RightHand);
    weapon.damage_roll = Some(damage);
    weapon.to_hit_bonus = bonus;
    weapon.damage_bonus = bonus;
    if matches!(glyph, ')' | '}' | '=' | '&') {
        weapon.ranged = true;
        weapon.ammo = Some(if glyph == '&' {
            roll_dice(rng, 1, 10, 0)
        } else {
            roll_dice(rng, 3, 10, 0)
        });
    }

    ItemTemplate::new(name, glyph, BRASS, ItemKind::Gear(weapon))
}

pub fn make_armor(rng: &mut RandomNumberGenerator) -> ItemTemplate {
    const MODERN: &[(char, &str, i32)] = &[
        (']', "envirosuit", -1),
        (']', "vacc suit", -2),
        (']', "fiberweave", -3),
        ('{', "EVA suit", -4),
        ('{', "carbon shell", -5),
        ('{', "\"Jump\" suit", -6),
        ('+', "combat pod", -7),
        ('+', "\"mirror\" suit", -8),
        ('?', "exo-armor", -9),
        ('?', "exo-jet suit", -10),
        ('[', "plexsteel shield", -1),
        ('[', "particle shield", -2),
    ];
    const SOFT: &[&str] = &[
        "hard light",
        "chitin",
        "steelskin",
        "megafauna hide",
        "titanium foil",
        "uncertainty field",
    ];
    const HARD: &[&str] = &[
        "diamond weave",
        "neutronium plate",
        "Schrodinger state",
        "crystal timber",
        "labyrinthum",
        "depleted uranium",
    ];
    const SHIELDS: &[&str] = &[
        "hard light",
        "Pauli field",
        "smart shield",
        "dark matter",
        "micro-singularity",
        "dephasic",
    ];

    let (glyph, mut name, mut ac, modern) = if roll_dice(rng, 1, 4, 0) < 4 {
        let &(glyph, name, ac) = pick(rng, MODERN);
        (glyph, name.to_string(), ac, true)
    } else {
        let (glyph, names, suffix, base) = match rng.range(0, 5) {
            0 => (']', SOFT, "suit", 10 - roll_dice(rng, 1, 4, 0)),
            1 => ('{', SOFT, "armor", 7 - roll_dice(rng, 1, 4, 0)),
            2 => ('+', HARD, "shell", 5 - roll_dice(rng, 1, 4, 0)),
            3 => ('?', HARD, "exo-suit", 1 - roll_dice(rng, 1, 2, 0)),
            _ => ('[', SHIELDS, "shield", 10 - roll_dice(rng, 1, 2, 0)),
        };
        let name = format!("{} {suffix}", pick(rng, names));
        // Ancient armour is rated as an absolute class; convert it to a bonus.
        (glyph, name, base - 10, false)
    };

    let bonus = roll_dice(rng, 1, 3, 0) - 3;
    if bonus < 0 {
        name = format!("{name} {bonus}");
        ac += bonus;
    }

    let (str_bonus, dex_bonus) = match (glyph, modern) {
        ('?', false) => (roll_dice(rng, 1, 2, 0), roll_dice(rng, 1, 2, 0) - 1),
        ('?', true) => (1, 0),
        _ => (0, 0),
    };

    let slot = if glyph == '[' {
        EquipmentSlot::Shield
    } else {
        EquipmentSlot::Armor
    };
    let mut armor = Equipment::new(slot);
    armor.armor_bonus = ac;
    armor.damage_bonus = str_bonus;
    armor.to_hit_bonus = dex_bonus;

    ItemTemplate::new(name, glyph, ARMOR_GRAY, ItemKind::Gear(armor))
}

pub fn make_consumable(rng: &mut RandomNumberGenerator) -> ItemTemplate {
    match rng.range(0, 3) {
        0 => make_heal_item(rng),
        1 => make_grenade(rng),
        _ => make_device(rng),
    }
}

pub fn make_heal_item(rng: &mut RandomNumberGenerator) -> ItemTemplate {
    const HEALS: &[(&str, Option<Dice>, Option<i32>)] = &[
        ("Opacaine", Some(Dice::new(1, 4)), None),
        ("first-aid kit", Some(Dice::new(1, 6)), Some(3)),
        ("Heal-X", None, None),
        ("Panacea", None, Some(10)),
    ];
    let &(name, dice, uses) = pick(rng, HEALS);
    let (name, uses) = match uses {
        Some(count) => (name.to_string(), ItemUses::Limited(count)),
        None => (format!("dose of {name}"), ItemUses::Single),
    };
    ItemTemplate::new(
        name,
        '!',
        (127, 0, 255),
        ItemKind::Consumable {
            effect: UseEffect::Heal { dice },
            uses,
        },
    )
}

pub fn make_grenade(rng: &mut RandomNumberGenerator) -> ItemTemplate {
    const GRENADES: &[(&str, Dice, f32, Dice, bool, bool)] = &[
        ("frag grenade", Dice::new(2, 6), FIREBALL_RADIUS, Dice::new(1, 6), false, false),
        ("incendiary grenade", Dice::new(3, 6), 2.0, Dice::new(2, 4), false, false),
        ("plasma charge", Dice::new(4, 6), 3.0, Dice::new(2, 6), false, false),
        ("singularity bomb", Dice::new(1, 6), 2.0, Dice::new(3, 6), true, false),
    ];
    let &(name, damage, radius, radius_damage, kills, kills_radius) = pick(rng, GRENADES);
    ItemTemplate::new(
        name,
        '*',
        DEVICE_YELLOW,
        ItemKind::Consumable {
            effect: UseEffect::Grenade {
                damage,
                radius,
                radius_damage,
                kills,
                kills_radius,
            },
            uses: ItemUses::Single,
        },
    )
}

pub fn make_buff(rng: &mut RandomNumberGenerator) -> ItemTemplate {
    // (name, max_hp, to_hit, damage, armour class, xp, resistance, message)
    const BUFFS: &[(&str, i32, i32, i32, i32, i32, i32, &str)] = &[
        ("combat stims", 0, 1, 0, 0, 0, 0, "Your reflexes sharpen."),
        ("muscle graft", 0, 0, 1, 0, 0, 0, "Your arms swell with new strength."),
        ("dermal plating", 0, 0, 0, -1, 0, 0, "Your skin hardens into scales."),
        ("nanite booster", 5, 0, 0, 0, 0, 0, "You feel a swarm of tiny repairs."),
        ("memory engram", 0, 0, 0, 0, 100, 0, "Someone else's battles flood your mind."),
        ("cortical shield", 0, 0, 0, 0, 0, 1, "Pain feels very far away."),
    ];
    let &(name, max_hp, to_hit, damage, armor_class, xp, damage_resistance, description) =
        pick(rng, BUFFS);
    ItemTemplate::new(
        name,
        '$',
        (128, 0, 128),
        ItemKind::Consumable {
            effect: UseEffect::Buff {
                max_hp,
                to_hit,
                damage,
                armor_class,
                xp,
                damage_resistance,
                description: Some(description.to_string()),
            },
            uses: ItemUses::Single,
        },
    )
}

fn make_device(rng: &mut RandomNumberGenerator) -> ItemTemplate {
    match rng.range(0, 7) {
        0 => ItemTemplate::new(
            "neural scrambler",
            '#',
            DEVICE_YELLOW,
            ItemKind::Consumable {
                effect: UseEffect::Confuse {
                    duration: crate::config::CONFUSE_NUM_TURNS,
                    range: crate::config::CONFUSE_RANGE,
                },
                uses: ItemUses::Single,
            },
        ),
        1 => make_buff(rng),
        2 => ItemTemplate::new(
            "Tesla arc device",
            '#',
            DEVICE_YELLOW,
            ItemKind::Consumable {
                effect: UseEffect::RandomDamage {
                    dice: Dice::new(2, 12),
                    range: crate::config::LIGHTNING_RANGE,
                },
                uses: ItemUses::Single,
            },
        ),
        3 => ItemTemplate::new(
            "motion tracker",
            '#',
            DEVICE_YELLOW,
            ItemKind::Consumable {
                effect: UseEffect::Detector { range: Some(10.0) },
                uses: ItemUses::Limited(roll_dice(rng, 1, 3, 0)),
            },
        ),
        4 => ItemTemplate::new(
            "TED-3",
            'T',
            (127, 101, 63),
            ItemKind::Consumable {
                effect: UseEffect::Summon {
                    name: "TED-3".to_string(),
                    hit_dice: Dice::new(4, 6),
                    color: (127, 101, 63),
                },
                uses: ItemUses::Single,
            },
        ),
        5 => ItemTemplate::new(
            "data pad",
            '#',
            (203, 203, 203),
            ItemKind::Consumable {
                effect: UseEffect::Lore {
                    kind: if rng.range(0, 2) == 0 {
                        LoreKind::Log
                    } else {
                        LoreKind::Hint
                    },
                },
                uses: ItemUses::Single,
            },
        ),
        _ => {
            let mut harness = Equipment::new(EquipmentSlot::Back);
            harness.armor_bonus = -1;
            ItemTemplate::new("vector-jet harness", '%', (40, 40, 40), ItemKind::Gear(harness))
        }
    }
}

pub fn make_fixture(rng: &mut RandomNumberGenerator, depth: i32) -> ItemTemplate {
    let (name, glyph, color, kind) = match rng.range(0, 3) {
        0 => {
            let lore = if rng.range(0, 2) == 0 {
                LoreKind::Log
            } else {
                LoreKind::Hint
            };
            ("terminal", '_', (203, 203, 203), FixtureKind::Terminal(lore))
        }
        1 => (
            "rest pod",
            '0',
            (160, 32, 240),
            FixtureKind::RestPod {
                heal: Dice::new(1, 6),
                bonus: depth,
            },
        ),
        _ => (
            "teleporter",
            '^',
            (0, 0, 191),
            FixtureKind::Teleporter {
                level: rng.range(1, crate::config::TELEPORT_MAX_LEVEL + 1),
            },
        ),
    };
    ItemTemplate::new(
        name,
        glyph,
        color,
        ItemKind::Fixture(Fixture {
            kind,
            reusable: false,
            used: false,
        }),
    )
}

const LOGS: &[&str] = &[
    "CAPTAIN'S LOG: The drive core is unstable. We are diverting to the nearest moon.",
    "MEDICAL LOG: Three more crew report hearing voices from the lower decks.",
    "ENGINEERING: Bulkheads on deck four sealed. Whatever is down there stays there.",
    "SECURITY: Armoury inventory does not match the manifest. Someone is arming up.",
    "PERSONAL LOG: If anyone reads this, do not trust the rest pods on deck nine.",
];

const HINTS: &[&str] = &[
    "Guns spend a round for every shot. Check your ammo before a fight.",
    "Armour bonuses stack only so far. Past a point, more plating does nothing.",
    "Confused creatures stumble blindly and recover after a while.",
    "Grenades hurt everything in the blast, including whoever threw them.",
    "Resting on the stairs down is the only sure way to catch your breath.",
];

/// A line of flavour text shown by terminals and data pads.
pub fn lore_line(rng: &mut RandomNumberGenerator, kind: LoreKind) -> &'static str {
    match kind {
        LoreKind::Log => *pick(rng, LOGS),
        LoreKind::Hint => *pick(rng, HINTS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guns_always_carry_ammo() {
        let mut rng = RandomNumberGenerator::seeded(11);
        for _ in 0..200 {
            let weapon = make_weapon(&mut rng);
            let ItemKind::Gear(gear) = weapon.kind else {
                panic!("weapons are gear");
            };
            assert_eq!(gear.slot, EquipmentSlot::RightHand);
            assert!(gear.damage_roll.is_some());
            assert_eq!(gear.ranged, gear.ammo.is_some());
            if let Some(ammo) = gear.ammo {
                assert!((1..=30).contains(&ammo));
            }
        }
    }

    #[test]
    fn armor_only_improves_class() {
        let mut rng = RandomNumberGenerator::seeded(12);
        for _ in 0..200 {
            let armor = make_armor(&mut rng);
            let ItemKind::Gear(gear) = armor.kind else {
                panic!("armour is gear");
            };
            assert!(gear.armor_bonus < 0, "{} has {}", armor.name, gear.armor_bonus);
            assert!(matches!(
                gear.slot,
                EquipmentSlot::Armor | EquipmentSlot::Shield
            ));
        }
    }

    #[test]
    fn single_use_heals_are_named_as_doses() {
        let mut rng = RandomNumberGenerator::seeded(13);
        for _ in 0..50 {
            let heal = make_heal_item(&mut rng);
            if let ItemKind::Consumable {
                uses: ItemUses::Single,
                ..
            } = heal.kind
            {
                assert!(heal.name.starts_with("dose of "));
            }
        }
    }

    #[test]
    fn lore_lines_come_from_their_own_pool() {
        let mut rng = RandomNumberGenerator::seeded(14);
        for _ in 0..20 {
            assert!(LOGS.contains(&lore_line(&mut rng, LoreKind::Log)));
            assert!(HINTS.contains(&lore_line(&mut rng, LoreKind::Hint)));
        }
    }
}
