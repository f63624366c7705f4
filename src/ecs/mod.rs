pub mod combat;
pub mod components;
pub mod effects;
pub mod inventory;
pub mod level;
pub mod resources;
pub mod snapshot;
pub mod stats;
pub mod systems;
pub mod targeting;
pub mod turn;

use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, a_star_search};
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{RED, RGB, WHITE, to_cp437};
use log::info;
use specs::{
    prelude::{
        Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
    },
    shred::Fetch,
};

use crate::{
    ai::Ai,
    config::{DungeonParams, FRIENDLY_SCAN_RANGE},
    data::{
        Dice, Rgb8,
        items::{ItemKind, ItemTemplate},
        monsters::profile_for,
        roll_dice,
    },
    error::GameResult,
    map::Map,
    score::ScoreRecord,
};

use self::{
    components::{
        AlwaysVisible, BlocksTile, DeathHandler, Equipment, Fighter, Fixture, Inventory, Item,
        ItemUses, KilledBy, Name, Player, Position, Renderable, Viewshed, render_order,
    },
    resources::{GameState, MessageLog},
    systems::VisibilitySystem,
};

/// Everything the simulation owns: the entity store, the current level map,
/// the random source and the message log.
pub struct GameWorld {
    ecs: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
    stairs: Option<Entity>,
    depth: i32,
    state: GameState,
    turn: u64,
    params: DungeonParams,
    final_score: Option<ScoreRecord>,
}

/// One drawable entity, flattened for the renderer.
#[derive(Clone, Debug)]
pub struct RenderEntry {
    pub point: Point,
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
    pub always_visible: bool,
}

pub(crate) fn rgb(color: Rgb8) -> RGB {
    RGB::from_u8(color.0, color.1, color.2)
}

impl GameWorld {
    pub fn new(player_name: &str, seed: u64) -> GameResult<Self> {
        Self::with_params(player_name, seed, DungeonParams::default())
    }

    pub fn with_params(player_name: &str, seed: u64, params: DungeonParams) -> GameResult<Self> {
        let mut ecs = Self::fresh_ecs(&params, seed);
        let player = Self::spawn_player(&mut ecs, player_name, params.torch_radius);

        let mut world = Self {
            ecs,
            dispatcher: Self::build_dispatcher(),
            player,
            stairs: None,
            depth: 1,
            state: GameState::Playing,
            turn: 0,
            params,
            final_score: None,
        };
        world.give_starter_kit();
        world.build_level()?;
        world.log_color(
            "Welcome stranger! Prepare to perish in the Wreck of the Ganymede.",
            RGB::named(RED),
        );
        info!("new game for {player_name} with seed {seed}");
        Ok(world)
    }

    fn fresh_ecs(params: &DungeonParams, seed: u64) -> SpecsWorld {
        let mut ecs = SpecsWorld::new();
        Self::register_components(&mut ecs);
        ecs.insert(RandomNumberGenerator::seeded(seed));
        ecs.insert(MessageLog::default());
        ecs.insert(Map::new(params.width, params.height));
        ecs
    }

    fn build_dispatcher() -> Dispatcher<'static, 'static> {
        DispatcherBuilder::new()
            .with(VisibilitySystem, "visibility", &[])
            .build()
    }

    fn register_components(ecs: &mut SpecsWorld) {
        ecs.register::<Position>();
        ecs.register::<Renderable>();
        ecs.register::<Name>();
        ecs.register::<BlocksTile>();
        ecs.register::<AlwaysVisible>();
        ecs.register::<Viewshed>();
        ecs.register::<Player>();
        ecs.register::<Fighter>();
        ecs.register::<KilledBy>();
        ecs.register::<Equipment>();
        ecs.register::<Item>();
        ecs.register::<Fixture>();
        ecs.register::<Inventory>();
        ecs.register::<Ai>();
    }

    fn spawn_player(ecs: &mut SpecsWorld, name: &str, torch_radius: i32) -> Entity {
        let hp = {
            let mut rng = ecs.write_resource::<RandomNumberGenerator>();
            roll_dice(&mut rng, 3, 6, 0) + roll_dice(&mut rng, 1, 10, 0)
        };
        ecs.create_entity()
            .with(Position {
                point: Point::new(0, 0),
            })
            .with(Renderable {
                glyph: to_cp437('@'),
                color: RGB::named(WHITE),
                order: render_order::PLAYER,
            })
            .with(Name {
                name: name.to_string(),
            })
            .with(Player { level: 1 })
            .with(Viewshed {
                radius: torch_radius,
                dirty: true,
                visible: HashSet::new(),
            })
            .with(Fighter::new(hp, 10, 1, 1, Dice::new(1, 3)).with_death(DeathHandler::Player))
            .with(BlocksTile)
            .with(Inventory::default())
            .build()
    }

    fn give_starter_kit(&mut self) {
        let knife = self.create_item(&crate::data::items::starter_weapon(), None);
        let _ = self.ecs.write_component::<AlwaysVisible>().insert(knife, AlwaysVisible);
        if let Some(inventory) = self.ecs.write_component::<Inventory>().get_mut(self.player) {
            inventory.items.push(knife);
        }
        if let Some(gear) = self.ecs.write_component::<Equipment>().get_mut(knife) {
            gear.equipped = true;
        }
    }

    // ---- accessors ----

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn params(&self) -> &DungeonParams {
        &self.params
    }

    /// Set once the player has died.
    pub fn final_score(&self) -> Option<&ScoreRecord> {
        self.final_score.as_ref()
    }

    pub fn map(&self) -> Fetch<'_, Map> {
        self.ecs.fetch::<Map>()
    }

    pub fn messages(&self) -> Fetch<'_, MessageLog> {
        self.ecs.fetch::<MessageLog>()
    }

    pub fn player_point(&self) -> Point {
        self.position_of(self.player).unwrap_or_else(|| Point::new(0, 0))
    }

    pub fn player_name(&self) -> String {
        self.name_of(self.player)
    }

    pub fn player_level(&self) -> i32 {
        self.ecs
            .read_component::<Player>()
            .get(self.player)
            .map_or(1, |player| player.level)
    }

    pub fn player_fighter(&self) -> Option<Fighter> {
        self.fighter_of(self.player)
    }

    pub fn stairs_point(&self) -> Option<Point> {
        self.stairs.and_then(|stairs| self.position_of(stairs))
    }

    pub fn position_of(&self, entity: Entity) -> Option<Point> {
        self.ecs
            .read_component::<Position>()
            .get(entity)
            .map(|pos| pos.point)
    }

    pub fn name_of(&self, entity: Entity) -> String {
        self.ecs
            .read_component::<Name>()
            .get(entity)
            .map_or_else(|| "something".to_string(), |name| name.name.clone())
    }

    pub fn fighter_of(&self, entity: Entity) -> Option<Fighter> {
        self.ecs.read_component::<Fighter>().get(entity).cloned()
    }

    pub fn killed_by(&self, entity: Entity) -> Option<String> {
        self.ecs
            .read_component::<KilledBy>()
            .get(entity)
            .map(|killed| killed.cause.clone())
    }

    pub fn ai_of(&self, entity: Entity) -> Option<Ai> {
        self.ecs.read_component::<Ai>().get(entity).cloned()
    }

    pub fn set_ai(&mut self, entity: Entity, ai: Ai) {
        let _ = self.ecs.write_component::<Ai>().insert(entity, ai);
    }

    pub(crate) fn clear_ai(&mut self, entity: Entity) {
        self.ecs.write_component::<Ai>().remove(entity);
    }

    pub fn is_alive_fighter(&self, entity: Entity) -> bool {
        self.ecs.entities().is_alive(entity)
            && self
                .ecs
                .read_component::<Fighter>()
                .get(entity)
                .is_some_and(|fighter| fighter.hp > 0)
    }

    /// Every fighter still standing on the level, in entity order.
    pub fn living_fighters(&self) -> Vec<(Entity, Point)> {
        let entities = self.ecs.entities();
        let positions = self.ecs.read_component::<Position>();
        let fighters = self.ecs.read_component::<Fighter>();
        (&entities, &positions, &fighters)
            .join()
            .filter(|(_, _, fighter)| fighter.hp > 0)
            .map(|(entity, pos, _)| (entity, pos.point))
            .collect()
    }

    /// A living fighter standing on `point`, if any.
    pub fn fighter_at(&self, point: Point) -> Option<Entity> {
        self.living_fighters()
            .into_iter()
            .find(|(_, at)| *at == point)
            .map(|(entity, _)| entity)
    }

    pub fn is_visible_to_player(&self, point: Point) -> bool {
        self.ecs
            .read_component::<Viewshed>()
            .get(self.player)
            .is_some_and(|viewshed| viewshed.visible.contains(&point))
    }

    pub fn visible_tiles(&self) -> HashSet<Point> {
        self.ecs
            .read_component::<Viewshed>()
            .get(self.player)
            .map(|viewshed| viewshed.visible.clone())
            .unwrap_or_default()
    }

    // ---- movement ----

    pub fn is_blocked(&self, point: Point) -> bool {
        if !self.map().is_walkable(point) {
            return true;
        }
        let positions = self.ecs.read_component::<Position>();
        let blockers = self.ecs.read_component::<BlocksTile>();
        (&positions, &blockers).join().any(|(pos, _)| pos.point == point)
    }

    pub(crate) fn place(&mut self, entity: Entity, point: Point) {
        let _ = self
            .ecs
            .write_component::<Position>()
            .insert(entity, Position { point });
        if entity == self.player {
            self.mark_player_fov_dirty();
        }
    }

    /// Moves one step unless the destination is a wall or occupied.
    pub fn try_move(&mut self, entity: Entity, dx: i32, dy: i32) -> bool {
        if dx == 0 && dy == 0 {
            return false;
        }
        let Some(from) = self.position_of(entity) else {
            return false;
        };
        let dest = Point::new(from.x + dx, from.y + dy);
        if self.is_blocked(dest) {
            return false;
        }
        self.place(entity, dest);
        true
    }

    /// One step along a shortest path, falling back to a straight-line step
    /// when another actor stands on the path.
    pub fn move_towards(&mut self, entity: Entity, target: Point) {
        let Some(from) = self.position_of(entity) else {
            return;
        };
        let next = {
            let map = self.map();
            let path = a_star_search(
                map.point2d_to_index(from),
                map.point2d_to_index(target),
                &*map,
            );
            if path.success && path.steps.len() > 1 {
                Some(map.index_to_point2d(path.steps[1]))
            } else {
                None
            }
        };
        if let Some(step) = next {
            if self.try_move(entity, step.x - from.x, step.y - from.y) {
                return;
            }
        }
        let dx = (target.x - from.x).signum();
        let dy = (target.y - from.y).signum();
        let attempts = if dx.abs() >= dy.abs() {
            [(dx, dy), (dx, 0), (0, dy)]
        } else {
            [(dx, dy), (0, dy), (dx, 0)]
        };
        for (sx, sy) in attempts {
            if self.try_move(entity, sx, sy) {
                return;
            }
        }
    }

    // ---- randomness and messages ----

    pub(crate) fn rng_range(&mut self, min: i32, max: i32) -> i32 {
        self.ecs
            .write_resource::<RandomNumberGenerator>()
            .range(min, max)
    }

    pub(crate) fn roll(&mut self, dice: Dice) -> i32 {
        let mut rng = self.ecs.write_resource::<RandomNumberGenerator>();
        dice.roll(&mut rng)
    }

    pub fn log<S: Into<String>>(&mut self, message: S) {
        self.ecs.write_resource::<MessageLog>().push(message);
    }

    pub fn log_color<S: Into<String>>(&mut self, message: S, color: RGB) {
        self.ecs
            .write_resource::<MessageLog>()
            .push_color(message, color);
    }

    // ---- visibility ----

    pub(crate) fn mark_player_fov_dirty(&mut self) {
        if let Some(viewshed) = self.ecs.write_component::<Viewshed>().get_mut(self.player) {
            viewshed.dirty = true;
        }
    }

    /// Recomputes any dirty viewsheds and flushes pending entity changes.
    pub fn refresh_visibility(&mut self) {
        self.dispatcher.dispatch(&self.ecs);
        self.ecs.maintain();
    }

    // ---- spawning ----

    /// Spawns a monster whose combat numbers derive from its hit dice.
    pub(crate) fn spawn_monster(
        &mut self,
        name: &str,
        hit_dice: Dice,
        color: Rgb8,
        point: Point,
        friendly: bool,
    ) -> Entity {
        let profile = profile_for(name, hit_dice);
        let hp = self.roll(hit_dice).max(1);
        let ai = if friendly {
            Ai::friendly(FRIENDLY_SCAN_RANGE)
        } else {
            Ai::basic()
        };
        self.ecs
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437(profile.glyph),
                color: rgb(color),
                order: render_order::ACTOR,
            })
            .with(Name {
                name: name.to_string(),
            })
            .with(BlocksTile)
            .with(
                Fighter::new(
                    hp,
                    profile.armor_class,
                    profile.to_hit,
                    0,
                    profile.damage_roll,
                )
                .with_xp(profile.xp)
                .with_death(DeathHandler::Monster),
            )
            .with(ai)
            .build()
    }

    /// Creates an item entity on the floor at `point`, or unplaced when
    /// `point` is `None`.
    pub(crate) fn create_item(&mut self, template: &ItemTemplate, point: Option<Point>) -> Entity {
        let mut builder = self
            .ecs
            .create_entity()
            .with(Renderable {
                glyph: to_cp437(template.glyph),
                color: rgb(template.color),
                order: render_order::ITEM,
            })
            .with(Name {
                name: template.name.clone(),
            });
        if let Some(point) = point {
            builder = builder.with(Position { point });
        }
        builder = match &template.kind {
            ItemKind::Consumable { effect, uses } => builder.with(Item {
                effect: Some(effect.clone()),
                uses: *uses,
            }),
            ItemKind::Gear(equipment) => builder.with(equipment.clone()).with(Item {
                effect: None,
                uses: ItemUses::Unlimited,
            }),
            ItemKind::Fixture(fixture) => builder.with(fixture.clone()),
        };
        builder.build()
    }

    pub(crate) fn spawn_stairs(&mut self, point: Point) -> Entity {
        self.ecs
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437('>'),
                color: RGB::named(WHITE),
                order: render_order::STAIRS,
            })
            .with(Name {
                name: "stairs".to_string(),
            })
            .with(AlwaysVisible)
            .build()
    }

    /// Drawables in ascending render order, so later entries draw on top.
    pub fn render_entries(&self) -> Vec<RenderEntry> {
        let entities = self.ecs.entities();
        let positions = self.ecs.read_component::<Position>();
        let renderables = self.ecs.read_component::<Renderable>();
        let always = self.ecs.read_component::<AlwaysVisible>();
        let mut entries: Vec<RenderEntry> = (&entities, &positions, &renderables)
            .join()
            .map(|(entity, pos, render)| RenderEntry {
                point: pos.point,
                glyph: render.glyph,
                color: render.color,
                order: render.order,
                always_visible: always.contains(entity),
            })
            .collect();
        entries.sort_by_key(|entry| entry.order);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_starts_armed_on_depth_one() {
        let world = GameWorld::new("Tester", 7).expect("world");
        assert_eq!(world.depth(), 1);
        assert_eq!(world.state(), GameState::Playing);
        let fighter = world.player_fighter().expect("player fighter");
        assert!((4..=28).contains(&fighter.hp));
        assert_eq!(fighter.hp, fighter.base_max_hp);
        assert_eq!(fighter.base_armor_class, 10);
        assert!(world.is_visible_to_player(world.player_point()));
        assert!(world.map().is_explored(world.player_point()));
    }

    #[test]
    fn walls_stop_movement() {
        let mut world = GameWorld::new("Tester", 3).expect("world");
        let start = world.player_point();
        let mut wall = None;
        for dx in 1..world.params().width {
            let point = Point::new(start.x + dx, start.y);
            if !world.map().is_walkable(point) {
                wall = Some(dx);
                break;
            }
        }
        let Some(dx) = wall else { return };
        world.place(world.player_entity(), Point::new(start.x + dx - 1, start.y));
        let player = world.player_entity();
        let before = world.player_point();
        assert!(!world.try_move(player, 1, 0));
        assert_eq!(world.player_point(), before);
    }
}

/// Fixtures shared by the unit tests of the simulation modules.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::map::{GeneratedLevel, Tile};

    /// An empty 20x20 walled room with the player at (5, 5) and the stairs
    /// at (10, 10).
    pub(crate) fn arena(seed: u64) -> GameWorld {
        let mut world = GameWorld::new("Tester", seed).expect("world");
        let mut map = Map::new(20, 20);
        for y in 1..19 {
            for x in 1..19 {
                map.carve(Point::new(x, y));
            }
        }
        world.install_level(GeneratedLevel {
            map,
            rooms: Vec::new(),
            spawn: Point::new(5, 5),
            stairs: Point::new(10, 10),
            placements: Vec::new(),
        });
        world
    }

    /// A hostile monster with fixed numbers at `point`.
    pub(crate) fn dummy(world: &mut GameWorld, point: Point, hp: i32) -> Entity {
        let monster = world.spawn_monster("test drone", Dice::new(1, 8), (200, 0, 0), point, false);
        edit_fighter(world, monster, |fighter| {
            fighter.base_max_hp = hp;
            fighter.hp = hp;
        });
        monster
    }

    /// Walls off column `x` from top to bottom.
    pub(crate) fn wall_column(world: &mut GameWorld, x: i32) {
        {
            let mut map = world.ecs.write_resource::<Map>();
            for y in 0..map.height {
                map.set_tile(Point::new(x, y), Tile::wall());
            }
        }
        world.mark_player_fov_dirty();
        world.refresh_visibility();
    }

    pub(crate) fn edit_fighter(world: &mut GameWorld, entity: Entity, edit: impl FnOnce(&mut Fighter)) {
        if let Some(fighter) = world.ecs.write_component::<Fighter>().get_mut(entity) {
            edit(fighter);
        }
    }

    pub(crate) fn give(world: &mut GameWorld, template: &ItemTemplate) -> Entity {
        let item = world.create_item(template, None);
        let player = world.player_entity();
        if let Some(inventory) = world.ecs.write_component::<Inventory>().get_mut(player) {
            inventory.items.push(item);
        }
        item
    }
}
