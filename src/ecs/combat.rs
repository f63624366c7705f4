use bracket_terminal::prelude::{DARK_RED, LIGHT_BLUE, ORANGE, RED, RGB, WHITE, to_cp437};
use log::{debug, info};
use specs::prelude::{Entity, WorldExt};

use super::{
    GameWorld,
    components::{
        BlocksTile, DeathHandler, Equipment, Fighter, KilledBy, Name, Renderable,
        render_order,
    },
    resources::GameState,
};
use crate::{
    ai::Ai,
    config::{MAX_TARGET_NUMBER, MIN_TARGET_NUMBER, TO_HIT_OFFSET},
    data::Dice,
    score::ScoreRecord,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackMode {
    Melee,
    /// Fires the equipped gun and spends one round.
    Ranged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Attacker or defender is not a living fighter.
    Invalid,
    NoAmmo,
    Miss,
    NoEffect,
    Hit { damage: i32, killed: bool },
}

/// The d20 roll an attack must stay under to land.
pub fn target_number(to_hit: i32, armor_class: i32) -> i32 {
    (to_hit + armor_class + TO_HIT_OFFSET).clamp(MIN_TARGET_NUMBER, MAX_TARGET_NUMBER)
}

/// "deranged crewmember" becomes "Deranged Crewmember".
pub(crate) fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl GameWorld {
    /// Resolves one attack roll and applies its damage.
    pub fn attack(&mut self, attacker: Entity, defender: Entity, mode: AttackMode) -> AttackOutcome {
        if !self.is_alive_fighter(attacker) || !self.is_alive_fighter(defender) {
            return AttackOutcome::Invalid;
        }
        let (Some(offense), Some(defense)) =
            (self.effective_stats(attacker), self.effective_stats(defender))
        else {
            return AttackOutcome::Invalid;
        };

        if mode == AttackMode::Ranged && !self.spend_round(attacker) {
            if attacker == self.player {
                self.log_color("You don't have any ammo!", RGB::named(RED));
            }
            return AttackOutcome::NoAmmo;
        }

        let attacker_label = self.actor_label(attacker);
        let defender_label = self.target_label(defender);
        let color = self.attack_color(attacker);

        let roll = self.roll(Dice::new(1, 20));
        let needed = target_number(offense.to_hit, defense.armor_class);
        debug!("{attacker_label} vs {defender_label}: rolled {roll} against {needed} ({mode:?})");
        if roll >= needed {
            let verb = if attacker == self.player { "miss" } else { "misses" };
            self.log_color(format!("{attacker_label} {verb} {defender_label}."), color);
            return AttackOutcome::Miss;
        }

        let damage = self.roll(offense.damage_roll) + offense.damage - defense.damage_resistance;
        let verb = if attacker == self.player { "hit" } else { "hits" };
        if damage <= 0 {
            self.log_color(
                format!("{attacker_label} {verb} {defender_label} but it has no effect!"),
                color,
            );
            return AttackOutcome::NoEffect;
        }

        self.log_color(
            format!("{attacker_label} {verb} {defender_label} for {damage} hit points."),
            color,
        );
        let cause = self.name_of(attacker);
        let killed = self.take_damage(defender, damage, &cause);
        AttackOutcome::Hit { damage, killed }
    }

    /// Subtracts hit points and runs the death handler on the transition to
    /// zero. Returns whether this call killed the target.
    pub fn take_damage(&mut self, target: Entity, damage: i32, cause: &str) -> bool {
        let (was_alive, now_dead) = {
            let mut fighters = self.ecs.write_component::<Fighter>();
            let Some(fighter) = fighters.get_mut(target) else {
                return false;
            };
            let was_alive = fighter.hp > 0;
            if damage > 0 {
                fighter.hp -= damage;
            }
            (was_alive, fighter.hp <= 0)
        };
        if was_alive && now_dead {
            self.kill(target, cause);
            true
        } else {
            false
        }
    }

    fn kill(&mut self, target: Entity, cause: &str) {
        let Some(fighter) = self.fighter_of(target) else {
            return;
        };
        let _ = self.ecs.write_component::<KilledBy>().insert(
            target,
            KilledBy {
                cause: cause.to_string(),
            },
        );

        match fighter.death {
            Some(DeathHandler::Player) => self.player_death(cause),
            Some(DeathHandler::Monster) => self.monster_death(target, fighter.xp),
            None => {}
        }

        if target != self.player {
            if let Some(player) = self.ecs.write_component::<Fighter>().get_mut(self.player) {
                player.xp += fighter.xp;
                player.kills += 1;
            }
        }
    }

    fn player_death(&mut self, cause: &str) {
        self.state = GameState::Dead;
        if let Some(render) = self.ecs.write_component::<Renderable>().get_mut(self.player) {
            render.glyph = to_cp437('%');
            render.color = RGB::named(DARK_RED);
        }
        self.log_color("You died!", RGB::named(RED));

        let kills = self.player_fighter().map_or(0, |fighter| fighter.kills);
        let level = self.player_level();
        let record = ScoreRecord::new(
            self.player_name(),
            cause.to_string(),
            self.depth,
            kills * level * self.depth,
        );
        info!(
            "{} killed by {} on depth {} with score {}",
            record.name, record.killed_by, record.depth, record.score
        );
        self.final_score = Some(record);
    }

    fn monster_death(&mut self, monster: Entity, xp: i32) {
        let name = self.name_of(monster);
        self.log_color(
            format!("The {name} is dead! You gain {xp} experience points."),
            RGB::named(ORANGE),
        );
        if let Some(render) = self.ecs.write_component::<Renderable>().get_mut(monster) {
            render.glyph = to_cp437('%');
            render.color = RGB::named(DARK_RED);
            render.order = render_order::REMAINS;
        }
        self.ecs.write_component::<BlocksTile>().remove(monster);
        self.ecs.write_component::<Fighter>().remove(monster);
        self.ecs.write_component::<Ai>().remove(monster);
        let _ = self.ecs.write_component::<Name>().insert(
            monster,
            Name {
                name: format!("remains of {name}"),
            },
        );
        debug!("{name} died");
    }

    /// Takes one round from the attacker's equipped gun.
    fn spend_round(&mut self, attacker: Entity) -> bool {
        let Some((gun, _)) = self
            .equipment_of(attacker)
            .into_iter()
            .find(|(_, gear)| gear.equipped && gear.ranged)
        else {
            return false;
        };
        let mut gear = self.ecs.write_component::<Equipment>();
        match gear.get_mut(gun).and_then(|g| g.ammo.as_mut()) {
            Some(ammo) if *ammo > 0 => {
                *ammo -= 1;
                true
            }
            _ => false,
        }
    }

    fn actor_label(&self, entity: Entity) -> String {
        if entity == self.player {
            "You".to_string()
        } else {
            format!("The {}", title_case(&self.name_of(entity)))
        }
    }

    fn target_label(&self, entity: Entity) -> String {
        if entity == self.player {
            "you".to_string()
        } else {
            format!("the {}", self.name_of(entity))
        }
    }

    fn attack_color(&self, attacker: Entity) -> RGB {
        if attacker == self.player {
            RGB::named(WHITE)
        } else if self.ai_of(attacker).is_some_and(|ai| ai.is_friendly()) {
            RGB::named(LIGHT_BLUE)
        } else {
            RGB::named(RED)
        }
    }
}
