use specs::prelude::*;

use super::components::{Player, Position, Viewshed};
use crate::map::{Map, visibility};

/// Refreshes dirty viewsheds. Only the player's sight explores the map.
#[derive(Default)]
pub struct VisibilitySystem;

impl<'a> System<'a> for VisibilitySystem {
    type SystemData = (
        Entities<'a>,
        WriteExpect<'a, Map>,
        WriteStorage<'a, Viewshed>,
        ReadStorage<'a, Position>,
        ReadStorage<'a, Player>,
    );

    fn run(&mut self, (entities, mut map, mut viewsheds, positions, players): Self::SystemData) {
        for (entity, viewshed, pos) in (&entities, &mut viewsheds, &positions).join() {
            if !viewshed.dirty {
                continue;
            }
            viewshed.visible = if players.contains(entity) {
                visibility::recompute(&mut map, pos.point, viewshed.radius)
            } else {
                visibility::compute_visible(&map, pos.point, viewshed.radius)
            };
            viewshed.dirty = false;
        }
    }
}
