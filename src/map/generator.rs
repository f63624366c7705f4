use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, warn};

use super::{Map, Room};
use crate::{
    config::DungeonParams,
    data::{from_dungeon_level, items, items::ItemTemplate, monsters::MonsterTemplate, pick},
    error::{GameError, GameResult},
};

const MAX_MONSTERS: &[(i32, i32)] = &[(2, 1), (3, 4), (4, 6), (5, 8)];
const MAX_ITEMS: &[(i32, i32)] = &[(1, 1), (2, 4)];

#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    Monster { point: Point, template: MonsterTemplate },
    Item { point: Point, template: ItemTemplate },
}

impl Placement {
    pub fn point(&self) -> Point {
        match self {
            Placement::Monster { point, .. } | Placement::Item { point, .. } => *point,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    pub map: Map,
    pub rooms: Vec<Room>,
    pub spawn: Point,
    pub stairs: Point,
    pub placements: Vec<Placement>,
}

/// Builds one dungeon level by rejection-sampling rooms and joining each new
/// room to the previous one with an L-shaped tunnel.
///
/// Every attempt either lands a room or is thrown away; rejected candidates
/// are not retried. If no room lands at all, a minimum-size room is carved in
/// the middle of the grid so the level is always playable.
pub fn generate(
    rng: &mut RandomNumberGenerator,
    params: &DungeonParams,
    depth: i32,
) -> GameResult<GeneratedLevel> {
    if params.room_min < 3 || params.room_max < params.room_min {
        return Err(GameError::GenerationFailed(format!(
            "room size range {}..={} is unusable",
            params.room_min, params.room_max
        )));
    }
    if params.width < params.room_min + 2 || params.height < params.room_min + 2 {
        return Err(GameError::GenerationFailed(format!(
            "{}x{} grid cannot hold a {} tile room",
            params.width, params.height, params.room_min
        )));
    }

    let mut map = Map::new(params.width, params.height);
    let mut rooms: Vec<Room> = Vec::new();
    let mut placements = Vec::new();
    let mut occupied: HashSet<Point> = HashSet::new();
    let mut spawn = Point::new(params.width / 2, params.height / 2);

    for _ in 0..params.max_rooms {
        let w = rng.range(params.room_min, params.room_max + 1);
        let h = rng.range(params.room_min, params.room_max + 1);
        if w >= params.width || h >= params.height {
            continue;
        }
        let x = rng.range(0, params.width - w);
        let y = rng.range(0, params.height - h);
        let candidate = Room::with_size(x, y, w, h);

        if rooms.iter().any(|room| room.intersect(&candidate)) {
            continue;
        }

        map.carve_room(&candidate);
        let center = candidate.center();

        if let Some(previous) = rooms.last() {
            let prev = previous.center();
            if rng.range(0, 2) == 1 {
                map.carve_h_tunnel(prev.x, center.x, prev.y);
                map.carve_v_tunnel(prev.y, center.y, center.x);
            } else {
                map.carve_v_tunnel(prev.y, center.y, prev.x);
                map.carve_h_tunnel(prev.x, center.x, center.y);
            }
        } else {
            spawn = center;
            occupied.insert(center);
        }

        stock_room(rng, &map, &candidate, depth, &mut occupied, &mut placements);
        rooms.push(candidate);
    }

    if rooms.is_empty() {
        let w = params.room_min;
        let h = params.room_min;
        let room = Room::with_size((params.width - w) / 2, (params.height - h) / 2, w, h);
        warn!(
            "no room fit after {} attempts, carving fallback room at {},{}",
            params.max_rooms, room.x1, room.y1
        );
        map.carve_room(&room);
        spawn = room.center();
        rooms.push(room);
    }

    let stairs = rooms
        .last()
        .map(|room| room.center())
        .ok_or_else(|| GameError::GenerationFailed("no room to hold the stairs".to_string()))?;

    debug!(
        "generated depth {depth}: {} rooms, {} placements",
        rooms.len(),
        placements.len()
    );

    Ok(GeneratedLevel {
        map,
        rooms,
        spawn,
        stairs,
        placements,
    })
}

/// Scatters monsters and items inside a freshly carved room.
///
/// Monsters block their tile, so a second monster rolled onto the same spot
/// is skipped just like one rolled onto a wall.
fn stock_room(
    rng: &mut RandomNumberGenerator,
    map: &Map,
    room: &Room,
    depth: i32,
    occupied: &mut HashSet<Point>,
    placements: &mut Vec<Placement>,
) {
    let monster_table = MonsterTemplate::for_depth(depth);

    let num_monsters = rng.range(0, from_dungeon_level(MAX_MONSTERS, depth) + 1);
    for _ in 0..num_monsters {
        let point = random_interior_point(rng, room);
        if !map.is_walkable(point) || occupied.contains(&point) {
            continue;
        }
        let template = pick(rng, &monster_table).clone();
        occupied.insert(point);
        placements.push(Placement::Monster { point, template });
    }

    let num_items = rng.range(0, from_dungeon_level(MAX_ITEMS, depth) + 1);
    for _ in 0..num_items {
        let point = random_interior_point(rng, room);
        if !map.is_walkable(point) || occupied.contains(&point) {
            continue;
        }
        let template = items::random_item(rng, depth);
        placements.push(Placement::Item { point, template });
    }
}

fn random_interior_point(rng: &mut RandomNumberGenerator, room: &Room) -> Point {
    Point::new(
        rng.range(room.x1 + 1, room.x2),
        rng.range(room.y1 + 1, room.y2),
    )
}
