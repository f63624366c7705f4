use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{CYAN, LIGHT_BLUE, LIGHT_CYAN, LIGHT_GREEN, ORANGE, RED, RGB, VIOLET};
use log::{debug, info};
use specs::prelude::{Entity, Join, WorldExt};

use super::{
    GameWorld,
    components::{AlwaysVisible, Fighter, Fixture, FixtureKind, LoreKind, Position, UseEffect},
    targeting::Targeting,
    turn::TurnOutcome,
};
use crate::{
    ai::Ai,
    data::{Dice, items::lore_line},
    error::GameResult,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectResult {
    Used,
    /// Nothing happened and nothing should be consumed.
    Cancelled,
}

impl GameWorld {
    pub(crate) fn apply_effect(
        &mut self,
        effect: &UseEffect,
        source: &str,
        targeting: &mut dyn Targeting,
    ) -> EffectResult {
        match effect {
            UseEffect::Heal { dice } => self.heal_player(*dice),
            UseEffect::Buff {
                max_hp,
                to_hit,
                damage,
                armor_class,
                xp,
                damage_resistance,
                description,
            } => {
                if let Some(fighter) = self.ecs.write_component::<Fighter>().get_mut(self.player) {
                    fighter.base_max_hp += max_hp;
                    fighter.base_to_hit += to_hit;
                    fighter.base_damage += damage;
                    fighter.base_armor_class += armor_class;
                    fighter.xp += xp;
                    fighter.damage_resistance += damage_resistance;
                }
                let text = description
                    .clone()
                    .unwrap_or_else(|| "You feel a change come over you.".to_string());
                self.log_color(text, RGB::named(VIOLET));
                EffectResult::Used
            }
            UseEffect::RandomDamage { dice, range } => {
                let Some(monster) = self.closest_visible_monster(Some(*range)) else {
                    self.log_color("No enemy is close enough to strike.", RGB::named(RED));
                    return EffectResult::Cancelled;
                };
                let damage = self.roll(*dice);
                let name = self.name_of(monster);
                self.log_color(
                    format!(
                        "An arc of lightning strikes the {name} with a loud crack! The damage is {damage} hit points."
                    ),
                    RGB::named(LIGHT_BLUE),
                );
                self.take_damage(monster, damage, source);
                EffectResult::Used
            }
            UseEffect::Grenade {
                damage,
                radius,
                radius_damage,
                kills,
                kills_radius,
            } => {
                let Some(ground_zero) = self.target_tile(targeting, None) else {
                    return EffectResult::Cancelled;
                };
                self.log_color(
                    format!("The {source} explodes, burning everything within {radius} tiles!"),
                    RGB::named(ORANGE),
                );
                for (entity, point) in self.living_fighters() {
                    let distance = DistanceAlg::Pythagoras.distance2d(ground_zero, point);
                    let (dice, instant) = if point == ground_zero {
                        (*damage, *kills)
                    } else if distance <= *radius {
                        (*radius_damage, *kills_radius)
                    } else {
                        continue;
                    };
                    let amount = if instant {
                        self.fighter_of(entity).map_or(0, |f| f.hp)
                    } else {
                        self.roll(dice)
                    };
                    let (name, cause) = if entity == self.player {
                        ("you".to_string(), "own grenade")
                    } else {
                        (format!("the {}", self.name_of(entity)), source)
                    };
                    self.log_color(
                        format!("The blast burns {name} for {amount} hit points."),
                        RGB::named(ORANGE),
                    );
                    self.take_damage(entity, amount, cause);
                }
                EffectResult::Used
            }
            UseEffect::Confuse { duration, range } => {
                let Some(monster) = self.target_monster(targeting, Some(*range)) else {
                    return EffectResult::Cancelled;
                };
                let prior = self.ai_of(monster);
                self.set_ai(monster, Ai::confused(prior, *duration));
                let name = self.name_of(monster);
                self.log_color(
                    format!("The eyes of the {name} look vacant, as it starts to stumble around!"),
                    RGB::named(LIGHT_GREEN),
                );
                EffectResult::Used
            }
            UseEffect::Detector { range } => {
                let origin = self.player_point();
                let found: Vec<Entity> = self
                    .living_fighters()
                    .into_iter()
                    .filter(|(entity, _)| *entity != self.player)
                    .filter(|(_, point)| {
                        range.is_none_or(|r| DistanceAlg::Pythagoras.distance2d(origin, *point) <= r)
                    })
                    .map(|(entity, _)| entity)
                    .collect();
                {
                    let mut always = self.ecs.write_component::<AlwaysVisible>();
                    for entity in &found {
                        let _ = always.insert(*entity, AlwaysVisible);
                    }
                }
                debug!("detector marked {} monsters", found.len());
                self.log_color("The machine goes \"Ping!\"", RGB::named(CYAN));
                EffectResult::Used
            }
            UseEffect::Summon {
                name,
                hit_dice,
                color,
            } => {
                let Some(point) = self.free_tile_near_player() else {
                    self.log(format!("There is no room to deploy the {name}."));
                    return EffectResult::Cancelled;
                };
                self.spawn_monster(name, *hit_dice, *color, point, true);
                self.log_color(
                    format!("The {name} whirs to life beside you."),
                    RGB::named(LIGHT_CYAN),
                );
                EffectResult::Used
            }
            UseEffect::Lore { kind } => {
                self.show_lore(*kind);
                EffectResult::Used
            }
        }
    }

    fn heal_player(&mut self, dice: Option<Dice>) -> EffectResult {
        let Some(max_hp) = self.effective_stats(self.player).map(|s| s.max_hp) else {
            return EffectResult::Cancelled;
        };
        let hp = self.player_fighter().map_or(0, |f| f.hp);
        if hp >= max_hp {
            self.log_color("You are already at full health.", RGB::named(RED));
            return EffectResult::Cancelled;
        }
        let amount = dice.map_or(max_hp, |dice| self.roll(dice));
        self.log_color("Your wounds start to feel better!", RGB::named(VIOLET));
        self.heal(self.player, amount);
        EffectResult::Used
    }

    fn show_lore(&mut self, kind: LoreKind) {
        let line = {
            let mut rng = self.ecs.write_resource::<RandomNumberGenerator>();
            lore_line(&mut rng, kind)
        };
        self.log_color(line, RGB::named(LIGHT_GREEN));
    }

    fn free_tile_near_player(&self) -> Option<Point> {
        let here = self.player_point();
        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| Point::new(here.x + dx, here.y + dy)))
            .find(|point| *point != here && !self.is_blocked(*point))
    }

    /// The fixture the player is standing on.
    pub fn fixture_at_player(&self) -> Option<Entity> {
        let here = self.player_point();
        let entities = self.ecs.entities();
        let positions = self.ecs.read_component::<Position>();
        let fixtures = self.ecs.read_component::<Fixture>();
        (&entities, &positions, &fixtures)
            .join()
            .find(|(_, pos, _)| pos.point == here)
            .map(|(entity, _, _)| entity)
    }

    pub fn use_fixture(&mut self) -> GameResult<TurnOutcome> {
        let Some(entity) = self.fixture_at_player() else {
            self.log("There is nothing here to use.");
            return Ok(TurnOutcome::NoTurn);
        };
        let Some(fixture) = self.ecs.read_component::<Fixture>().get(entity).cloned() else {
            return Ok(TurnOutcome::NoTurn);
        };
        if fixture.used && !fixture.reusable {
            self.log("You have already used that.");
            return Ok(TurnOutcome::NoTurn);
        }

        match fixture.kind {
            FixtureKind::Terminal(kind) => {
                self.log("The terminal flickers on.");
                self.show_lore(kind);
                self.mark_fixture_used(entity);
                Ok(TurnOutcome::TookTurn)
            }
            FixtureKind::RestPod { heal, bonus } => {
                let full = match (self.player_fighter(), self.effective_stats(self.player)) {
                    (Some(fighter), Some(stats)) => fighter.hp >= stats.max_hp,
                    _ => true,
                };
                if full {
                    self.log("You are already fully rested.");
                    return Ok(TurnOutcome::NoTurn);
                }
                let amount = self.roll(heal) + bonus;
                self.log_color(
                    "You lie down in the rest pod and feel much better.",
                    RGB::named(VIOLET),
                );
                self.heal(self.player, amount);
                self.mark_fixture_used(entity);
                Ok(TurnOutcome::TookTurn)
            }
            FixtureKind::Teleporter { level } => {
                self.mark_fixture_used(entity);
                self.log_color(
                    "The teleporter hums and the world dissolves around you.",
                    RGB::named(CYAN),
                );
                info!("teleporting from depth {} to {level}", self.depth);
                self.travel_to(level)?;
                Ok(TurnOutcome::NewLevel)
            }
        }
    }

    fn mark_fixture_used(&mut self, entity: Entity) {
        if let Some(fixture) = self.ecs.write_component::<Fixture>().get_mut(entity) {
            fixture.used = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use specs::prelude::Builder;

    use super::*;
    use crate::{
        config::CONFUSE_NUM_TURNS,
        ecs::{
            components::FixtureKind,
            resources::GameState,
            targeting::{FixedTarget, NoTarget},
            testing::{arena, dummy, edit_fighter},
        },
    };

    fn grenade() -> UseEffect {
        UseEffect::Grenade {
            damage: Dice::new(1, 1),
            radius: 3.0,
            radius_damage: Dice::new(1, 1),
            kills: true,
            kills_radius: false,
        }
    }

    #[test]
    fn confusion_wraps_the_current_brain() {
        let mut world = arena(51);
        let monster = dummy(&mut world, Point::new(8, 5), 10);
        let effect = UseEffect::Confuse {
            duration: CONFUSE_NUM_TURNS,
            range: 8.0,
        };
        let used = world.apply_effect(&effect, "neural scrambler", &mut FixedTarget(Some(Point::new(8, 5))));
        assert_eq!(used, EffectResult::Used);
        assert_eq!(
            world.ai_of(monster),
            Some(Ai::confused(Some(Ai::basic()), CONFUSE_NUM_TURNS))
        );
    }

    #[test]
    fn targeting_an_empty_tile_cancels() {
        let mut world = arena(52);
        let effect = UseEffect::Confuse {
            duration: 3,
            range: 8.0,
        };
        let used = world.apply_effect(&effect, "neural scrambler", &mut FixedTarget(Some(Point::new(8, 8))));
        assert_eq!(used, EffectResult::Cancelled);
        assert_eq!(world.apply_effect(&effect, "neural scrambler", &mut NoTarget), EffectResult::Cancelled);
    }

    #[test]
    fn grenades_kill_at_ground_zero_and_burn_nearby() {
        let mut world = arena(53);
        let player = world.player_entity();
        let center = dummy(&mut world, Point::new(8, 5), 50);
        let bystander = dummy(&mut world, Point::new(9, 5), 50);
        let far = dummy(&mut world, Point::new(15, 15), 50);

        let used = world.apply_effect(&grenade(), "frag grenade", &mut FixedTarget(Some(Point::new(8, 5))));
        assert_eq!(used, EffectResult::Used);
        assert!(!world.is_alive_fighter(center));
        assert_eq!(world.fighter_of(bystander).expect("bystander").hp, 49);
        assert_eq!(world.fighter_of(far).expect("far").hp, 50);
        assert!(world.is_alive_fighter(player));
        assert_eq!(world.player_fighter().expect("player").kills, 1);
    }

    #[test]
    fn grenades_do_not_spare_the_thrower() {
        let mut world = arena(54);
        let player = world.player_entity();
        let before = world.player_fighter().expect("player").hp;
        let beside = Point::new(6, 5);
        world.apply_effect(&grenade(), "frag grenade", &mut FixedTarget(Some(beside)));
        assert_eq!(world.fighter_of(player).expect("player").hp, before - 1);
    }

    #[test]
    fn a_grenade_underfoot_is_recorded_as_the_players_own() {
        let mut world = arena(58);
        let here = world.player_point();
        world.apply_effect(&grenade(), "frag grenade", &mut FixedTarget(Some(here)));
        assert_eq!(world.state(), GameState::Dead);
        let record = world.final_score().expect("score");
        assert_eq!(record.killed_by, "own grenade");
    }

    #[test]
    fn summons_need_an_open_tile() {
        let mut world = arena(55);
        let effect = UseEffect::Summon {
            name: "security bot".to_string(),
            hit_dice: Dice::new(2, 8),
            color: (0, 200, 255),
        };
        assert_eq!(world.apply_effect(&effect, "bot crate", &mut NoTarget), EffectResult::Used);
        let (ally, _) = world
            .living_fighters()
            .into_iter()
            .find(|(entity, _)| world.name_of(*entity) == "security bot")
            .expect("summoned ally");
        assert!(world.ai_of(ally).is_some_and(|ai| ai.is_friendly()));

        let here = world.player_point();
        for dy in -1..=1 {
            for dx in -1..=1 {
                let point = Point::new(here.x + dx, here.y + dy);
                if point != here && !world.is_blocked(point) {
                    dummy(&mut world, point, 5);
                }
            }
        }
        assert_eq!(world.apply_effect(&effect, "bot crate", &mut NoTarget), EffectResult::Cancelled);
    }

    #[test]
    fn rest_pods_refuse_the_healthy_and_heal_the_hurt() {
        let mut world = arena(56);
        let here = world.player_point();
        world
            .ecs
            .create_entity()
            .with(Position { point: here })
            .with(Fixture {
                kind: FixtureKind::RestPod {
                    heal: Dice::new(1, 1),
                    bonus: 2,
                },
                reusable: false,
                used: false,
            })
            .build();

        assert_eq!(world.use_fixture().expect("fixture"), TurnOutcome::NoTurn);
        let player = world.player_entity();
        edit_fighter(&mut world, player, |fighter| fighter.hp = 1);
        assert_eq!(world.use_fixture().expect("fixture"), TurnOutcome::TookTurn);
        assert_eq!(world.player_fighter().expect("player").hp, 4);
        assert_eq!(world.use_fixture().expect("fixture"), TurnOutcome::NoTurn);
        assert!(world.messages().contains("already used"));
    }

    #[test]
    fn teleporters_move_the_player_to_their_level() {
        let mut world = arena(57);
        let here = world.player_point();
        world
            .ecs
            .create_entity()
            .with(Position { point: here })
            .with(Fixture {
                kind: FixtureKind::Teleporter { level: 4 },
                reusable: false,
                used: false,
            })
            .build();
        assert_eq!(world.use_fixture().expect("fixture"), TurnOutcome::NewLevel);
        assert_eq!(world.depth(), 4);
    }
}
