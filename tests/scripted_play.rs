//! Integration tests driving whole games from command scripts.

use std::io::Write;

use gammarogue::{
    Command, GameResult, GameWorld, TurnOutcome,
    ecs::{resources::GameState, targeting::NearestVisible},
    scripted_input::ScriptedInput,
};
use tempfile::NamedTempFile;

/// Test that a script file is read and replayed command by command
#[test]
fn test_script_file_drives_the_game() -> GameResult<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "# wait a little, then look around")?;
    writeln!(file, "...")?;
    writeln!(file, "c")?;

    let script = ScriptedInput::from_file(file.path())?;
    assert_eq!(script.len(), 4);

    let mut world = GameWorld::new("Scripter", 8)?;
    let mut targeting = NearestVisible;
    let mut outcomes = Vec::new();
    for command in script {
        outcomes.push(world.play_turn(command, &mut targeting)?);
    }
    let expected_turns = outcomes
        .iter()
        .filter(|outcome| **outcome == TurnOutcome::TookTurn)
        .count();
    if world.state() == GameState::Playing {
        assert_eq!(outcomes.last(), Some(&TurnOutcome::NoTurn));
    }
    assert_eq!(world.turn(), expected_turns as u64);
    Ok(())
}

/// Test that descending away from the stairs is refused without using a turn
#[test]
fn test_descending_needs_stairs() -> GameResult<()> {
    let mut world = GameWorld::new("Scripter", 9)?;
    if world.on_stairs() {
        return Ok(());
    }
    let outcome = world.play_turn(Command::Descend, &mut NearestVisible)?;
    assert_eq!(outcome, TurnOutcome::NoTurn);
    assert_eq!(world.depth(), 1);
    assert_eq!(world.turn(), 0);
    Ok(())
}

/// Test that a long random walk never leaves the player on a wall
#[test]
fn test_long_walk_stays_on_the_floor() -> GameResult<()> {
    let mut world = GameWorld::new("Scripter", 10)?;
    let script = ScriptedInput::parse(&"hjklyubn".repeat(25));
    for command in script {
        if world.state() != GameState::Playing {
            break;
        }
        world.play_turn(command, &mut NearestVisible)?;
        assert!(world.map().is_walkable(world.player_point()));
    }
    Ok(())
}
