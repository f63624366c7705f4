use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;
use log::info;
use serde::{Deserialize, Serialize};
use specs::prelude::{Builder, Entity, Join, WorldExt};

use super::{
    GameWorld,
    components::{
        AlwaysVisible, BlocksTile, Equipment, Fighter, Fixture, Inventory, Item, KilledBy, Name,
        Player, Position, Renderable, Viewshed,
    },
    resources::{GameState, LogLine, MessageLog},
};
use crate::{
    ai::Ai,
    config::DungeonParams,
    error::{GameError, GameResult},
    map::Map,
    score::ScoreRecord,
};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderRecord {
    pub glyph: u16,
    pub color: [f32; 3],
    pub order: i32,
}

/// One entity with all its components. Entity references are indices into
/// [`WorldSnapshot::entities`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: Option<String>,
    pub position: Option<(i32, i32)>,
    pub render: Option<RenderRecord>,
    pub blocks: bool,
    pub always_visible: bool,
    pub sight_radius: Option<i32>,
    pub player_level: Option<i32>,
    pub fighter: Option<Fighter>,
    pub killed_by: Option<String>,
    pub equipment: Option<Equipment>,
    pub item: Option<Item>,
    pub fixture: Option<Fixture>,
    pub inventory: Option<Vec<usize>>,
    pub ai: Option<Ai>,
}

/// Everything needed to resume a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub depth: i32,
    pub state: GameState,
    pub turn: u64,
    pub params: DungeonParams,
    pub rng_seed: u64,
    pub map: Map,
    pub entities: Vec<EntityRecord>,
    pub player: usize,
    pub stairs: Option<usize>,
    pub messages: Vec<(String, [f32; 3])>,
    pub final_score: Option<ScoreRecord>,
}

fn color_to_array(color: RGB) -> [f32; 3] {
    [color.r, color.g, color.b]
}

fn array_to_color(color: [f32; 3]) -> RGB {
    RGB::from_f32(color[0], color[1], color[2])
}

impl GameWorld {
    /// Captures the world. The random source is reseeded from itself so the
    /// live game and a restored copy continue identically.
    pub fn snapshot(&self) -> WorldSnapshot {
        let rng_seed = {
            let mut rng = self.ecs.write_resource::<RandomNumberGenerator>();
            let seed = rng.rand::<u64>();
            *rng = RandomNumberGenerator::seeded(seed);
            seed
        };

        let entities = self.ecs.entities();
        let all: Vec<Entity> = (&entities).join().collect();
        let index: HashMap<Entity, usize> =
            all.iter().enumerate().map(|(i, e)| (*e, i)).collect();

        let names = self.ecs.read_component::<Name>();
        let positions = self.ecs.read_component::<Position>();
        let renderables = self.ecs.read_component::<Renderable>();
        let blockers = self.ecs.read_component::<BlocksTile>();
        let always = self.ecs.read_component::<AlwaysVisible>();
        let viewsheds = self.ecs.read_component::<Viewshed>();
        let players = self.ecs.read_component::<Player>();
        let fighters = self.ecs.read_component::<Fighter>();
        let killed = self.ecs.read_component::<KilledBy>();
        let gear = self.ecs.read_component::<Equipment>();
        let items = self.ecs.read_component::<Item>();
        let fixtures = self.ecs.read_component::<Fixture>();
        let inventories = self.ecs.read_component::<Inventory>();
        let ais = self.ecs.read_component::<Ai>();

        let records = all
            .iter()
            .map(|entity| EntityRecord {
                name: names.get(*entity).map(|n| n.name.clone()),
                position: positions.get(*entity).map(|p| (p.point.x, p.point.y)),
                render: renderables.get(*entity).map(|r| RenderRecord {
                    glyph: r.glyph,
                    color: color_to_array(r.color),
                    order: r.order,
                }),
                blocks: blockers.contains(*entity),
                always_visible: always.contains(*entity),
                sight_radius: viewsheds.get(*entity).map(|v| v.radius),
                player_level: players.get(*entity).map(|p| p.level),
                fighter: fighters.get(*entity).cloned(),
                killed_by: killed.get(*entity).map(|k| k.cause.clone()),
                equipment: gear.get(*entity).cloned(),
                item: items.get(*entity).cloned(),
                fixture: fixtures.get(*entity).cloned(),
                inventory: inventories.get(*entity).map(|inv| {
                    inv.items.iter().filter_map(|item| index.get(item).copied()).collect()
                }),
                ai: ais.get(*entity).cloned(),
            })
            .collect();

        let messages = self
            .messages()
            .lines()
            .map(|line| (line.text.clone(), color_to_array(line.color)))
            .collect();

        WorldSnapshot {
            version: SNAPSHOT_VERSION,
            depth: self.depth,
            state: self.state,
            turn: self.turn,
            params: self.params,
            rng_seed,
            map: (*self.map()).clone(),
            entities: records,
            player: index.get(&self.player).copied().unwrap_or(0),
            stairs: self.stairs.and_then(|stairs| index.get(&stairs).copied()),
            messages,
            final_score: self.final_score.clone(),
        }
    }

    /// Rebuilds a world from a snapshot, rejecting dangling references.
    pub fn restore(snapshot: WorldSnapshot) -> GameResult<Self> {
        validate(&snapshot)?;

        let mut ecs = Self::fresh_ecs(&snapshot.params, snapshot.rng_seed);
        ecs.insert(snapshot.map);

        let created: Vec<Entity> = snapshot
            .entities
            .iter()
            .map(|record| build_entity(&mut ecs, record))
            .collect();

        {
            let mut inventories = ecs.write_component::<Inventory>();
            for (record, entity) in snapshot.entities.iter().zip(&created) {
                if let Some(items) = &record.inventory {
                    let items = items.iter().map(|i| created[*i]).collect();
                    let _ = inventories.insert(*entity, Inventory { items });
                }
            }
        }

        {
            let mut log = ecs.write_resource::<MessageLog>();
            log.replace_lines(snapshot.messages.into_iter().map(|(text, color)| LogLine {
                text,
                color: array_to_color(color),
            }));
        }

        let mut world = Self {
            ecs,
            dispatcher: Self::build_dispatcher(),
            player: created[snapshot.player],
            stairs: snapshot.stairs.map(|i| created[i]),
            depth: snapshot.depth,
            state: snapshot.state,
            turn: snapshot.turn,
            params: snapshot.params,
            final_score: snapshot.final_score,
        };
        world.mark_player_fov_dirty();
        world.refresh_visibility();
        Ok(world)
    }

    pub fn save_to_path(&self, path: &Path) -> GameResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &self.snapshot())?;
        info!("saved depth {} turn {} to {}", self.depth, self.turn, path.display());
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> GameResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: WorldSnapshot = serde_json::from_reader(reader)?;
        info!("loaded save from {}", path.display());
        Self::restore(snapshot)
    }
}

fn validate(snapshot: &WorldSnapshot) -> GameResult<()> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(GameError::InvalidSnapshot(format!(
            "version {} is not supported",
            snapshot.version
        )));
    }
    let expected = (snapshot.map.width * snapshot.map.height).max(0) as usize;
    if snapshot.map.tiles.len() != expected {
        return Err(GameError::InvalidSnapshot(format!(
            "map holds {} tiles, expected {expected}",
            snapshot.map.tiles.len()
        )));
    }
    let count = snapshot.entities.len();
    let player = snapshot
        .entities
        .get(snapshot.player)
        .ok_or_else(|| GameError::InvalidSnapshot(format!("player index {} out of range", snapshot.player)))?;
    if player.player_level.is_none() || player.fighter.is_none() {
        return Err(GameError::InvalidSnapshot(
            "player entry lacks player or fighter data".to_string(),
        ));
    }
    if snapshot.stairs.is_some_and(|i| i >= count) {
        return Err(GameError::InvalidSnapshot("stairs index out of range".to_string()));
    }
    let mut carried = HashSet::new();
    for record in &snapshot.entities {
        for item in record.inventory.iter().flatten() {
            if *item >= count || !carried.insert(*item) {
                return Err(GameError::InvalidSnapshot(format!(
                    "inventory entry {item} is out of range or carried twice"
                )));
            }
        }
    }
    Ok(())
}

fn build_entity(ecs: &mut specs::World, record: &EntityRecord) -> Entity {
    let mut builder = ecs.create_entity();
    if let Some(name) = &record.name {
        builder = builder.with(Name { name: name.clone() });
    }
    if let Some((x, y)) = record.position {
        builder = builder.with(Position {
            point: Point::new(x, y),
        });
    }
    if let Some(render) = &record.render {
        builder = builder.with(Renderable {
            glyph: render.glyph,
            color: array_to_color(render.color),
            order: render.order,
        });
    }
    if record.blocks {
        builder = builder.with(BlocksTile);
    }
    if record.always_visible {
        builder = builder.with(AlwaysVisible);
    }
    if let Some(radius) = record.sight_radius {
        builder = builder.with(Viewshed {
            radius,
            dirty: true,
            visible: HashSet::new(),
        });
    }
    if let Some(level) = record.player_level {
        builder = builder.with(Player { level });
    }
    if let Some(fighter) = &record.fighter {
        builder = builder.with(fighter.clone());
    }
    if let Some(cause) = &record.killed_by {
        builder = builder.with(KilledBy {
            cause: cause.clone(),
        });
    }
    if let Some(gear) = &record.equipment {
        builder = builder.with(gear.clone());
    }
    if let Some(item) = &record.item {
        builder = builder.with(item.clone());
    }
    if let Some(fixture) = &record.fixture {
        builder = builder.with(fixture.clone());
    }
    if let Some(ai) = &record.ai {
        builder = builder.with(ai.clone());
    }
    builder.build()
}
