use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_terminal::prelude::{RED, RGB};
use log::trace;
use serde::{Deserialize, Serialize};
use specs::prelude::{Component, Entity, VecStorage};

use crate::{
    config::PURSUIT_RANGE,
    ecs::{GameWorld, combat::AttackMode},
};

/// Per-actor behaviour. Entities without this component never act.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Ai {
    /// Idles until the player has seen it, then hunts the player for good.
    Basic { seen_player: bool },
    /// Fights for the player. The chosen target is not persisted and is
    /// reacquired after a load.
    Friendly {
        max_range: f32,
        #[serde(skip)]
        target: Option<Entity>,
    },
    /// Staggers randomly, then hands control back to `prior`.
    Confused { prior: Option<Box<Ai>>, turns: i32 },
}

impl Component for Ai {
    type Storage = VecStorage<Self>;
}

impl Ai {
    pub fn basic() -> Self {
        Ai::Basic { seen_player: false }
    }

    pub fn friendly(max_range: f32) -> Self {
        Ai::Friendly {
            max_range,
            target: None,
        }
    }

    pub fn confused(prior: Option<Ai>, turns: i32) -> Self {
        Ai::Confused {
            prior: prior.map(Box::new),
            turns,
        }
    }

    pub fn is_friendly(&self) -> bool {
        match self {
            Ai::Friendly { .. } => true,
            Ai::Confused { prior, .. } => prior.as_deref().is_some_and(Ai::is_friendly),
            Ai::Basic { .. } => false,
        }
    }
}

/// Runs one turn for `entity` if it still carries an AI.
pub fn take_turn(world: &mut GameWorld, entity: Entity) {
    let Some(ai) = world.ai_of(entity) else {
        return;
    };
    trace!("{:?} acts as {:?}", entity, ai);
    match ai {
        Ai::Basic { seen_player } => basic_turn(world, entity, seen_player),
        Ai::Friendly { max_range, target } => friendly_turn(world, entity, max_range, target),
        Ai::Confused { prior, turns } => confused_turn(world, entity, prior, turns),
    }
}

fn basic_turn(world: &mut GameWorld, entity: Entity, seen_player: bool) {
    let Some(me) = world.position_of(entity) else {
        return;
    };
    let seen = seen_player || world.is_visible_to_player(me);
    if seen && !seen_player {
        world.set_ai(entity, Ai::Basic { seen_player: true });
    }
    if !seen {
        return;
    }

    let player = world.player_entity();
    let Some(target) = world.position_of(player) else {
        return;
    };
    engage(world, entity, me, player, target, PURSUIT_RANGE);
}

fn friendly_turn(world: &mut GameWorld, entity: Entity, max_range: f32, target: Option<Entity>) {
    let Some(me) = world.position_of(entity) else {
        return;
    };
    let target = target
        .filter(|enemy| world.is_alive_fighter(*enemy))
        .or_else(|| closest_hostile(world, entity, me, max_range));
    world.set_ai(entity, Ai::Friendly { max_range, target });

    let Some(enemy) = target else {
        return;
    };
    let Some(enemy_point) = world.position_of(enemy) else {
        return;
    };
    engage(world, entity, me, enemy, enemy_point, max_range);

    if !world.is_alive_fighter(enemy) && world.ai_of(entity).is_some_and(|ai| ai.is_friendly()) {
        world.set_ai(
            entity,
            Ai::Friendly {
                max_range,
                target: None,
            },
        );
    }
}

/// Step towards a distant target, strike an adjacent one.
fn engage(
    world: &mut GameWorld,
    entity: Entity,
    me: Point,
    target: Entity,
    target_point: Point,
    max_range: f32,
) {
    let distance = DistanceAlg::Pythagoras.distance2d(me, target_point);
    if distance < 2.0 {
        if world.is_alive_fighter(target) {
            world.attack(entity, target, AttackMode::Melee);
        }
    } else if distance <= max_range {
        world.move_towards(entity, target_point);
    }
}

fn closest_hostile(world: &GameWorld, entity: Entity, from: Point, max_range: f32) -> Option<Entity> {
    let player = world.player_entity();
    world
        .living_fighters()
        .into_iter()
        .filter(|(other, _)| *other != entity && *other != player)
        .filter(|(other, _)| !world.ai_of(*other).is_some_and(|ai| ai.is_friendly()))
        .filter(|(_, point)| world.is_visible_to_player(*point))
        .map(|(other, point)| (other, DistanceAlg::Pythagoras.distance2d(from, point)))
        .filter(|(_, distance)| *distance <= max_range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(other, _)| other)
}

fn confused_turn(world: &mut GameWorld, entity: Entity, prior: Option<Box<Ai>>, turns: i32) {
    let mut turns = turns;
    if turns > 0 {
        let dx = world.rng_range(-1, 2);
        let dy = world.rng_range(-1, 2);
        world.try_move(entity, dx, dy);
        turns -= 1;
    }

    if turns > 0 {
        world.set_ai(entity, Ai::Confused { prior, turns });
        return;
    }

    match prior {
        Some(prior) => world.set_ai(entity, *prior),
        None => world.clear_ai(entity),
    }
    let name = world.name_of(entity);
    world.log_color(
        format!("The {name} is no longer confused!"),
        RGB::named(RED),
    );
}
