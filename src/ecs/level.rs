use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{GREEN, RGB, VIOLET};
use log::info;
use specs::prelude::{Entity, Join, WorldExt};

use super::{GameWorld, components::Position, resources::GameState, turn::TurnOutcome};
use crate::{
    config::FINAL_LEVEL,
    error::GameResult,
    map::{GeneratedLevel, Placement, generate},
};

impl GameWorld {
    /// Generates and installs the level for the current depth.
    pub(crate) fn build_level(&mut self) -> GameResult<()> {
        let level = self.generate_level(self.depth)?;
        self.install_level(level);
        Ok(())
    }

    fn generate_level(&mut self, depth: i32) -> GameResult<GeneratedLevel> {
        let mut rng = self.ecs.write_resource::<RandomNumberGenerator>();
        generate(&mut rng, &self.params, depth)
    }

    /// Swaps in a freshly generated level. Everything on the old level goes
    /// away except the player and what they carry.
    pub(crate) fn install_level(&mut self, level: GeneratedLevel) {
        let leftovers: Vec<Entity> = {
            let entities = self.ecs.entities();
            let positions = self.ecs.read_component::<Position>();
            (&entities, &positions)
                .join()
                .map(|(entity, _)| entity)
                .filter(|entity| *entity != self.player)
                .collect()
        };
        for entity in leftovers {
            let _ = self.ecs.delete_entity(entity);
        }
        self.ecs.maintain();

        self.ecs.insert(level.map);
        self.place(self.player, level.spawn);
        for placement in level.placements {
            match placement {
                Placement::Monster { point, template } => {
                    self.spawn_monster(template.name, template.hit_dice, template.color, point, false);
                }
                Placement::Item { point, template } => {
                    self.create_item(&template, Some(point));
                }
            }
        }
        self.stairs = Some(self.spawn_stairs(level.stairs));
        self.mark_player_fov_dirty();
        self.refresh_visibility();
    }

    pub fn on_stairs(&self) -> bool {
        self.stairs_point() == Some(self.player_point())
    }

    /// Takes the stairs down, or wins the game from the final level.
    pub(crate) fn descend(&mut self) -> GameResult<TurnOutcome> {
        if !self.on_stairs() {
            self.log("There are no stairs here.");
            return Ok(TurnOutcome::NoTurn);
        }
        if self.depth >= FINAL_LEVEL {
            self.state = GameState::Won;
            self.log_color(
                "You escape the wreck. Against all odds, you survived!",
                RGB::named(GREEN),
            );
            info!("{} won on depth {}", self.player_name(), self.depth);
            return Ok(TurnOutcome::NewLevel);
        }

        let next = self.depth + 1;
        let level = self.generate_level(next)?;
        self.log_color(
            "You take a moment to rest, and recover your strength.",
            RGB::named(VIOLET),
        );
        let half = self
            .effective_stats(self.player)
            .map_or(0, |stats| stats.max_hp / 2);
        self.heal(self.player, half);
        self.depth = next;
        self.install_level(level);
        self.log_color(
            "After a rare moment of peace, you descend deeper into the wreck...",
            RGB::named(VIOLET),
        );
        info!("descended to depth {next}");
        Ok(TurnOutcome::NewLevel)
    }

    /// Moves the player straight to `depth` without the stair rest.
    pub(crate) fn travel_to(&mut self, depth: i32) -> GameResult<()> {
        let depth = depth.clamp(1, FINAL_LEVEL);
        let level = self.generate_level(depth)?;
        self.depth = depth;
        self.install_level(level);
        self.log(format!("You find yourself on level {depth}."));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bracket_geometry::prelude::Point;

    use super::*;
    use crate::ecs::testing::{arena, edit_fighter};

    #[test]
    fn stairs_heal_half_and_go_deeper() {
        let mut world = arena(31);
        let player = world.player_entity();
        edit_fighter(&mut world, player, |fighter| fighter.hp = 1);
        let max_hp = world.effective_stats(player).expect("stats").max_hp;
        world.place(player, Point::new(10, 10));

        assert_eq!(world.descend().expect("descend"), TurnOutcome::NewLevel);
        assert_eq!(world.depth(), 2);
        let hp = world.player_fighter().expect("player").hp;
        assert_eq!(hp, (1 + max_hp / 2).min(max_hp));
        assert_eq!(world.inventory().len(), 1);
        assert_eq!(world.map().width, world.params().width);
        assert!(world.stairs_point().is_some());
    }

    #[test]
    fn stairs_are_required() {
        let mut world = arena(32);
        assert_eq!(world.descend().expect("descend"), TurnOutcome::NoTurn);
        assert_eq!(world.depth(), 1);
        assert!(world.messages().contains("There are no stairs here."));
    }

    #[test]
    fn final_stairs_win_the_game() {
        let mut world = arena(33);
        world.depth = FINAL_LEVEL;
        let player = world.player_entity();
        world.place(player, Point::new(10, 10));
        assert_eq!(world.descend().expect("descend"), TurnOutcome::NewLevel);
        assert_eq!(world.state(), GameState::Won);
        assert_eq!(world.depth(), FINAL_LEVEL);
    }

    #[test]
    fn travel_is_clamped_to_the_wreck() {
        let mut world = arena(34);
        world.travel_to(40).expect("travel");
        assert_eq!(world.depth(), FINAL_LEVEL);
        world.travel_to(-3).expect("travel");
        assert_eq!(world.depth(), 1);
    }
}
