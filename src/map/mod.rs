pub mod generator;
pub mod visibility;

use bracket_geometry::prelude::{Point, Rect};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use generator::{GeneratedLevel, Placement, generate};

/// Rooms are axis-aligned rectangles; touching edges count as overlap.
pub type Room = Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub blocked: bool,
    pub blocks_sight: bool,
    pub explored: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::wall()
    }
}

impl Tile {
    /// A tile that blocks movement and, unless told otherwise, sight.
    pub fn new(blocked: bool, blocks_sight: Option<bool>) -> Self {
        Self {
            blocked,
            blocks_sight: blocks_sight.unwrap_or(blocked),
            explored: false,
        }
    }

    pub fn wall() -> Self {
        Self::new(true, None)
    }

    pub fn floor() -> Self {
        Self::new(false, None)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl Map {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width * height).max(0) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); size],
        }
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.idx(point.x, point.y).map(|idx| &self.tiles[idx])
    }

    pub fn tile_at_mut(&mut self, point: Point) -> Option<&mut Tile> {
        self.idx(point.x, point.y).map(|idx| &mut self.tiles[idx])
    }

    pub fn set_tile(&mut self, point: Point, tile: Tile) {
        if let Some(idx) = self.idx(point.x, point.y) {
            self.tiles[idx] = tile;
        }
    }

    /// Unblocks a tile for both movement and sight.
    pub fn carve(&mut self, point: Point) {
        if let Some(tile) = self.tile_at_mut(point) {
            tile.blocked = false;
            tile.blocks_sight = false;
        }
    }

    /// Carves the interior of a room, leaving its one-tile border standing.
    pub fn carve_room(&mut self, room: &Room) {
        for y in room.y1 + 1..room.y2 {
            for x in room.x1 + 1..room.x2 {
                self.carve(Point::new(x, y));
            }
        }
    }

    pub fn carve_h_tunnel(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.carve(Point::new(x, y));
        }
    }

    pub fn carve_v_tunnel(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.carve(Point::new(x, y));
        }
    }

    pub fn reveal_point(&mut self, point: Point) {
        if let Some(tile) = self.tile_at_mut(point) {
            tile.explored = true;
        }
    }

    pub fn is_explored(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| tile.explored)
    }

    /// Out-of-bounds counts as blocked.
    pub fn is_walkable(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| !tile.blocked)
    }

    pub fn blocks_sight(&self, point: Point) -> bool {
        self.tile_at(point).is_none_or(|tile| tile.blocks_sight)
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if self.is_walkable(point) {
                    points.push(point);
                }
            }
        }
        points
    }
}

impl BaseMap for Map {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles.get(idx).is_none_or(|tile| tile.blocks_sight)
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let dest = Point::new(point.x + dx, point.y + dy);
                if self.is_walkable(dest) {
                    let cost = if dx != 0 && dy != 0 { 1.45 } else { 1.0 };
                    exits.push((self.point2d_to_index(dest), cost));
                }
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for Map {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        Map::in_bounds(self, point)
    }
}
