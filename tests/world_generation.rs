//! Integration tests for level generation and exploration through the public API.

use bracket_geometry::prelude::Point;
use gammarogue::{
    Command, GameResult, GameWorld,
    config::{MAP_HEIGHT, MAP_WIDTH},
    ecs::targeting::NoTarget,
};

fn explored_count(world: &GameWorld) -> usize {
    world.map().tiles.iter().filter(|tile| tile.explored).count()
}

/// Test that a new game lays out a full-size level around the player
#[test]
fn test_new_game_builds_a_full_level() -> GameResult<()> {
    let world = GameWorld::new("Explorer", 1234)?;
    let map = world.map();
    assert_eq!(map.width, MAP_WIDTH);
    assert_eq!(map.height, MAP_HEIGHT);
    assert_eq!(map.tiles.len(), (MAP_WIDTH * MAP_HEIGHT) as usize);

    let spawn = world.player_point();
    assert!(map.is_walkable(spawn));
    let stairs = world.stairs_point().expect("stairs on every level");
    assert!(map.is_walkable(stairs));

    // The outer ring is never carved.
    for x in 0..MAP_WIDTH {
        assert!(!map.is_walkable(Point::new(x, 0)));
        assert!(!map.is_walkable(Point::new(x, MAP_HEIGHT - 1)));
    }
    Ok(())
}

/// Test that the same seed reproduces the same level
#[test]
fn test_seeds_are_deterministic() -> GameResult<()> {
    let first = GameWorld::new("Explorer", 99)?;
    let second = GameWorld::new("Explorer", 99)?;
    assert_eq!(*first.map(), *second.map());
    assert_eq!(first.player_point(), second.player_point());
    assert_eq!(first.stairs_point(), second.stairs_point());
    assert_eq!(first.player_fighter(), second.player_fighter());
    Ok(())
}

/// Test that explored tiles stay explored as the player moves on
#[test]
fn test_explored_tiles_persist() -> GameResult<()> {
    let mut world = GameWorld::new("Explorer", 4321)?;
    let start = world.player_point();
    assert!(world.map().is_explored(start));
    assert!(world.is_visible_to_player(start));

    let mut seen = explored_count(&world);
    let steps = [(1, 0), (1, 0), (0, 1), (-1, 0), (0, -1), (1, 1), (-1, -1)];
    for (dx, dy) in steps {
        world.play_turn(Command::Move { dx, dy }, &mut NoTarget)?;
        let now = explored_count(&world);
        assert!(now >= seen);
        seen = now;
        assert!(world.map().is_explored(start));
    }
    Ok(())
}

/// Test that every visible tile is also marked explored
#[test]
fn test_visible_tiles_are_explored() -> GameResult<()> {
    let world = GameWorld::new("Explorer", 777)?;
    let map = world.map();
    for point in world.visible_tiles() {
        assert!(map.is_explored(point));
    }
    Ok(())
}
