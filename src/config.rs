//! Tuning constants and dungeon generation parameters.

use serde::{Deserialize, Serialize};

pub const MAP_WIDTH: i32 = 80;
pub const MAP_HEIGHT: i32 = 43;
pub const MAX_ROOMS: usize = 30;
pub const ROOM_MIN_SIZE: i32 = 6;
pub const ROOM_MAX_SIZE: i32 = 10;
pub const TORCH_RADIUS: i32 = 10;

/// Lines kept in the message log before the oldest is evicted.
pub const MSG_HEIGHT: usize = 6;
/// Column width messages are wrapped to.
pub const MSG_WIDTH: usize = 58;

pub const INVENTORY_CAPACITY: usize = 26;

/// Descending from this depth ends the game with a win.
pub const FINAL_LEVEL: i32 = 13;

pub const LEVEL_UP_BASE: i32 = 300;
pub const LEVEL_UP_FACTOR: i32 = 200;

/// Floor on the summed armour bonus of all equipped items.
pub const ARMOR_BONUS_CAP: i32 = -12;

/// Added to attacker to-hit plus defender armour class.
pub const TO_HIT_OFFSET: i32 = 5;
pub const MIN_TARGET_NUMBER: i32 = 2;
pub const MAX_TARGET_NUMBER: i32 = 20;

/// Monsters stop chasing beyond this distance.
pub const PURSUIT_RANGE: f32 = 10.0;
pub const FRIENDLY_SCAN_RANGE: f32 = 10.0;

pub const CONFUSE_NUM_TURNS: i32 = 10;
pub const CONFUSE_RANGE: f32 = 8.0;
pub const LIGHTNING_RANGE: f32 = 5.0;
pub const FIREBALL_RADIUS: f32 = 3.0;

/// Highest level a teleporter can send the player to.
pub const TELEPORT_MAX_LEVEL: i32 = 12;

/// Shape of a generated level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonParams {
    pub width: i32,
    pub height: i32,
    pub max_rooms: usize,
    pub room_min: i32,
    pub room_max: i32,
    pub torch_radius: i32,
}

impl Default for DungeonParams {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            max_rooms: MAX_ROOMS,
            room_min: ROOM_MIN_SIZE,
            room_max: ROOM_MAX_SIZE,
            torch_radius: TORCH_RADIUS,
        }
    }
}
