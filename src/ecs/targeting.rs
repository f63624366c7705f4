use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use specs::prelude::Entity;

use super::GameWorld;

/// Supplies a tile when an action needs the player to aim.
///
/// Returning `None` cancels the action; nothing is consumed and no turn
/// passes.
pub trait Targeting {
    fn pick_tile(&mut self, world: &GameWorld, max_range: Option<f32>) -> Option<Point>;
}

/// Cancels every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTarget;

impl Targeting for NoTarget {
    fn pick_tile(&mut self, _world: &GameWorld, _max_range: Option<f32>) -> Option<Point> {
        None
    }
}

/// Answers with a tile chosen ahead of time, once.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedTarget(pub Option<Point>);

impl Targeting for FixedTarget {
    fn pick_tile(&mut self, _world: &GameWorld, _max_range: Option<f32>) -> Option<Point> {
        self.0.take()
    }
}

/// Aims at the closest monster the player can see.
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestVisible;

impl Targeting for NearestVisible {
    fn pick_tile(&mut self, world: &GameWorld, max_range: Option<f32>) -> Option<Point> {
        world
            .closest_visible_monster(max_range)
            .and_then(|monster| world.position_of(monster))
    }
}

impl GameWorld {
    /// Whether `point` is visible and inside `max_range` of the player.
    pub fn is_valid_target_tile(&self, point: Point, max_range: Option<f32>) -> bool {
        let in_range = max_range.is_none_or(|range| {
            DistanceAlg::Pythagoras.distance2d(self.player_point(), point) <= range
        });
        in_range && self.is_visible_to_player(point)
    }

    /// The nearest living non-player fighter in the player's sight.
    pub fn closest_visible_monster(&self, max_range: Option<f32>) -> Option<Entity> {
        let origin = self.player_point();
        self.living_fighters()
            .into_iter()
            .filter(|(entity, point)| *entity != self.player && self.is_visible_to_player(*point))
            .map(|(entity, point)| (entity, DistanceAlg::Pythagoras.distance2d(origin, point)))
            .filter(|(_, distance)| max_range.is_none_or(|range| *distance <= range))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity)
    }

    /// Asks the picker for a tile and validates it against sight and range.
    pub(crate) fn target_tile(
        &self,
        targeting: &mut dyn Targeting,
        max_range: Option<f32>,
    ) -> Option<Point> {
        targeting
            .pick_tile(self, max_range)
            .filter(|point| self.is_valid_target_tile(*point, max_range))
    }

    /// Like [`GameWorld::target_tile`], but the tile must hold a monster.
    pub(crate) fn target_monster(
        &self,
        targeting: &mut dyn Targeting,
        max_range: Option<f32>,
    ) -> Option<Entity> {
        self.target_tile(targeting, max_range)
            .and_then(|point| self.fighter_at(point))
            .filter(|entity| *entity != self.player)
    }
}
