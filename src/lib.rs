//! Turn-based roguelike engine for escaping the wreck of the Ganymede.
//!
//! [`GameWorld`] owns the dungeon and every entity in it. Drive it one
//! [`Command`] at a time with [`GameWorld::play_turn`]; the terminal front
//! end and the headless script runner in the binary both do exactly that.

pub mod ai;
pub mod config;
pub mod data;
pub mod ecs;
pub mod error;
pub mod map;
pub mod render;
pub mod score;
pub mod scripted_input;

pub use ecs::{
    GameWorld,
    turn::{Command, TurnOutcome},
};
pub use error::{GameError, GameResult};
