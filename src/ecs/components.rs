use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};
use specs::prelude::{Component, Entity, NullStorage, VecStorage};

use crate::data::{Dice, Rgb8};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// Lower orders draw first, so remains and stairs sit beneath actors.
#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

pub mod render_order {
    pub const STAIRS: i32 = 0;
    pub const REMAINS: i32 = 1;
    pub const ITEM: i32 = 2;
    pub const ACTOR: i32 = 3;
    pub const PLAYER: i32 = 4;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name {
    pub name: String,
}

impl Component for Name {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

/// Shown once its tile is explored, even outside the field of view.
#[derive(Default)]
pub struct AlwaysVisible;

impl Component for AlwaysVisible {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Viewshed {
    pub radius: i32,
    pub dirty: bool,
    pub visible: HashSet<Point>,
}

impl Component for Viewshed {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub level: i32,
}

impl Component for Player {
    type Storage = VecStorage<Self>;
}

/// What happens when a fighter's hit points run out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathHandler {
    Player,
    Monster,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub base_max_hp: i32,
    pub hp: i32,
    /// Descending scale, lower is better.
    pub base_armor_class: i32,
    pub base_to_hit: i32,
    pub base_damage: i32,
    pub base_roll: Dice,
    pub xp: i32,
    pub damage_resistance: i32,
    pub kills: i32,
    pub death: Option<DeathHandler>,
}

impl Fighter {
    pub fn new(hp: i32, armor_class: i32, to_hit: i32, damage: i32, damage_roll: Dice) -> Self {
        Self {
            base_max_hp: hp,
            hp,
            base_armor_class: armor_class,
            base_to_hit: to_hit,
            base_damage: damage,
            base_roll: damage_roll,
            xp: 0,
            damage_resistance: 0,
            kills: 0,
            death: None,
        }
    }

    pub fn with_xp(mut self, xp: i32) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_death(mut self, death: DeathHandler) -> Self {
        self.death = Some(death);
        self
    }
}

impl Component for Fighter {
    type Storage = VecStorage<Self>;
}

/// Name of whatever dealt the killing blow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KilledBy {
    pub cause: String,
}

impl Component for KilledBy {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    RightHand,
    Armor,
    Shield,
    Back,
}

impl EquipmentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentSlot::RightHand => "right hand",
            EquipmentSlot::Armor => "armor",
            EquipmentSlot::Shield => "shield",
            EquipmentSlot::Back => "back",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub slot: EquipmentSlot,
    pub to_hit_bonus: i32,
    pub damage_bonus: i32,
    pub armor_bonus: i32,
    pub max_hp_bonus: i32,
    /// Replaces the wearer's own damage roll while equipped.
    pub damage_roll: Option<Dice>,
    pub equipped: bool,
    pub ranged: bool,
    pub ammo: Option<i32>,
}

impl Equipment {
    pub fn new(slot: EquipmentSlot) -> Self {
        Self {
            slot,
            to_hit_bonus: 0,
            damage_bonus: 0,
            armor_bonus: 0,
            max_hp_bonus: 0,
            damage_roll: None,
            equipped: false,
            ranged: false,
            ammo: None,
        }
    }
}

impl Component for Equipment {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemUses {
    Single,
    Limited(i32),
    Unlimited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoreKind {
    Log,
    Hint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UseEffect {
    /// `None` heals to full.
    Heal { dice: Option<Dice> },
    Buff {
        max_hp: i32,
        to_hit: i32,
        damage: i32,
        armor_class: i32,
        xp: i32,
        damage_resistance: i32,
        description: Option<String>,
    },
    RandomDamage { dice: Dice, range: f32 },
    Grenade {
        damage: Dice,
        radius: f32,
        radius_damage: Dice,
        kills: bool,
        kills_radius: bool,
    },
    Confuse { duration: i32, range: f32 },
    /// `None` reveals every monster on the level.
    Detector { range: Option<f32> },
    Summon {
        name: String,
        hit_dice: Dice,
        color: Rgb8,
    },
    Lore { kind: LoreKind },
}

impl UseEffect {
    pub fn needs_target(&self) -> bool {
        matches!(self, UseEffect::Grenade { .. } | UseEffect::Confuse { .. })
    }
}

/// Something that can be carried. Equipment items carry one with no effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub effect: Option<UseEffect>,
    pub uses: ItemUses,
}

impl Component for Item {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FixtureKind {
    Terminal(LoreKind),
    RestPod { heal: Dice, bonus: i32 },
    Teleporter { level: i32 },
}

/// Interactive map furniture used while standing on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub kind: FixtureKind,
    pub reusable: bool,
    pub used: bool,
}

impl Component for Fixture {
    type Storage = VecStorage<Self>;
}

/// Carried items in pick-up order.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    pub items: Vec<Entity>,
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}
