use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{RED, RGB, YELLOW};
use log::{debug, info};
use specs::prelude::{Entity, Join, WorldExt};

use super::{
    GameWorld,
    combat::AttackMode,
    components::{Fighter, Player},
    resources::GameState,
    targeting::Targeting,
};
use crate::{
    ai::{self, Ai},
    config::{LEVEL_UP_BASE, LEVEL_UP_FACTOR},
    data::Dice,
    error::{GameError, GameResult},
};

/// One player decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Step or bump-attack; a zero delta waits.
    Move { dx: i32, dy: i32 },
    Wait,
    PickUp,
    Drop { slot: usize },
    UseItem { slot: usize },
    Shoot,
    CheckAmmo,
    UseFixture,
    Descend,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The action used the turn; monsters act next.
    TookTurn,
    /// Rejected, cancelled or free; nobody else acts.
    NoTurn,
    /// The player arrived on a new level. Its monsters wait for the next turn.
    NewLevel,
}

/// XP needed to advance from `level`.
pub fn xp_to_level_up(level: i32) -> i32 {
    LEVEL_UP_BASE + level * LEVEL_UP_FACTOR
}

impl GameWorld {
    /// Resolves the player's command, then gives every AI one turn if the
    /// command used the turn, then checks for a level-up.
    pub fn play_turn(
        &mut self,
        command: Command,
        targeting: &mut dyn Targeting,
    ) -> GameResult<TurnOutcome> {
        if self.state != GameState::Playing {
            return Ok(TurnOutcome::NoTurn);
        }
        if let Command::Move { dx, dy } = command {
            if dx.abs() > 1 || dy.abs() > 1 {
                return Err(GameError::InvalidCommand(format!(
                    "cannot step {dx},{dy} in one turn"
                )));
            }
        }

        let outcome = match command {
            Command::Move { dx: 0, dy: 0 } | Command::Wait => TurnOutcome::TookTurn,
            Command::Move { dx, dy } => self.move_or_attack(dx, dy),
            Command::PickUp => self.pick_up(),
            Command::Drop { slot } => self.drop_item(slot),
            Command::UseItem { slot } => self.use_item(slot, targeting),
            Command::Shoot => self.shoot(targeting),
            Command::CheckAmmo => {
                self.check_ammo();
                TurnOutcome::NoTurn
            }
            Command::UseFixture => self.use_fixture()?,
            Command::Descend => self.descend()?,
        };

        if outcome == TurnOutcome::TookTurn {
            self.turn += 1;
            self.run_ai_turns();
        }
        if self.state == GameState::Playing {
            self.check_level_up();
        }
        self.refresh_visibility();
        debug!("turn {} {:?} -> {:?}", self.turn, command, outcome);
        Ok(outcome)
    }

    fn move_or_attack(&mut self, dx: i32, dy: i32) -> TurnOutcome {
        let here = self.player_point();
        let dest = Point::new(here.x + dx, here.y + dy);
        if let Some(target) = self.fighter_at(dest).filter(|e| *e != self.player) {
            self.attack(self.player, target, AttackMode::Melee);
        } else {
            self.try_move(self.player, dx, dy);
        }
        TurnOutcome::TookTurn
    }

    /// Every entity holding an AI when the turn starts acts once, in entity
    /// order. Stops early if the player dies.
    fn run_ai_turns(&mut self) {
        let actors: Vec<Entity> = {
            let entities = self.ecs.entities();
            let ais = self.ecs.read_component::<Ai>();
            (&entities, &ais).join().map(|(entity, _)| entity).collect()
        };
        for actor in actors {
            if self.state != GameState::Playing {
                break;
            }
            ai::take_turn(self, actor);
        }
    }

    fn equipped_gun(&self) -> Option<(Entity, Option<i32>)> {
        self.equipment_of(self.player)
            .into_iter()
            .find(|(_, gear)| gear.equipped && gear.ranged)
            .map(|(item, gear)| (item, gear.ammo))
    }

    fn shoot(&mut self, targeting: &mut dyn Targeting) -> TurnOutcome {
        let Some((_, ammo)) = self.equipped_gun() else {
            self.log_color("You're not holding a gun.", RGB::named(RED));
            return TurnOutcome::NoTurn;
        };
        if ammo.unwrap_or(0) < 1 {
            self.log_color("You're out of ammo!", RGB::named(RED));
            return TurnOutcome::NoTurn;
        }
        let Some(target) = self.target_monster(targeting, None) else {
            return TurnOutcome::NoTurn;
        };
        self.attack(self.player, target, AttackMode::Ranged);
        TurnOutcome::TookTurn
    }

    fn check_ammo(&mut self) {
        match self.equipped_gun() {
            Some((gun, ammo)) => {
                let name = self.name_of(gun);
                let rounds = ammo.unwrap_or(0);
                self.log_color(
                    format!("Your {name} has {rounds} rounds left."),
                    RGB::named(YELLOW),
                );
            }
            None => self.log("You're not holding a gun."),
        }
    }

    /// Grants at most one level per turn boundary; surplus experience waits
    /// for the next check.
    fn check_level_up(&mut self) {
        let level = self.player_level();
        let needed = xp_to_level_up(level);
        let ready = {
            let mut fighters = self.ecs.write_component::<Fighter>();
            match fighters.get_mut(self.player) {
                Some(fighter) if fighter.xp >= needed => {
                    fighter.xp -= needed;
                    true
                }
                _ => false,
            }
        };
        if !ready {
            return;
        }

        let new_level = level + 1;
        let hp_gain = if new_level <= 6 {
            self.roll(Dice::new(1, 10))
        } else {
            3
        };
        if let Some(player) = self.ecs.write_component::<Player>().get_mut(self.player) {
            player.level = new_level;
        }
        if let Some(fighter) = self.ecs.write_component::<Fighter>().get_mut(self.player) {
            fighter.base_max_hp += hp_gain;
            fighter.hp += hp_gain;
            if new_level <= 6 || new_level % 2 == 0 {
                fighter.base_to_hit += 1;
                fighter.base_damage += 1;
            }
        }
        self.log_color(
            format!("Your battle skills grow stronger! You reached level {new_level}!"),
            RGB::named(YELLOW),
        );
        info!("player reached level {new_level}");
    }
}
