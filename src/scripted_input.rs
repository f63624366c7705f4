use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::warn;

use crate::{ecs::turn::Command, error::GameResult};

/// A canned sequence of player commands for headless runs.
pub struct ScriptedInput {
    script_commands: Vec<Command>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        Ok(Self::parse(&lines.join("\n")))
    }

    pub fn parse(script: &str) -> Self {
        let mut script_commands = Vec::new();

        for line in script.lines() {
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }

            let mut chars = trimmed_line.chars();
            while let Some(c) = chars.next() {
                if c == 'D' {
                    match chars.next().and_then(slot_for_digit) {
                        Some(slot) => script_commands.push(Command::Drop { slot }),
                        None => warn!("drop in script is missing its slot digit"),
                    }
                    continue;
                }
                match char_to_command(c) {
                    Some(command) => script_commands.push(command),
                    None if c.is_whitespace() => {}
                    None => warn!("unknown key in script: {c:?}"),
                }
            }
        }

        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn next_command(&mut self) -> Option<Command> {
        let command = self.script_commands.get(self.current_command_index).copied();
        if command.is_some() {
            self.current_command_index += 1;
        }
        command
    }

    pub fn len(&self) -> usize {
        self.script_commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script_commands.is_empty()
    }
}

impl Iterator for ScriptedInput {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        self.next_command()
    }
}

fn slot_for_digit(c: char) -> Option<usize> {
    c.to_digit(10)
        .filter(|digit| *digit >= 1)
        .map(|digit| digit as usize - 1)
}

fn char_to_command(c: char) -> Option<Command> {
    let step = |dx, dy| Some(Command::Move { dx, dy });
    match c {
        'h' | 'a' => step(-1, 0),
        'l' | 'd' => step(1, 0),
        'k' | 'w' => step(0, -1),
        'j' | 's' => step(0, 1),
        'y' => step(-1, -1),
        'u' => step(1, -1),
        'b' => step(-1, 1),
        'n' => step(1, 1),
        '.' => Some(Command::Wait),
        'g' => Some(Command::PickUp),
        '>' => Some(Command::Descend),
        'f' => Some(Command::Shoot),
        'c' => Some(Command::CheckAmmo),
        'e' => Some(Command::UseFixture),
        _ => slot_for_digit(c).map(|slot| Command::UseItem { slot }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves_and_actions() {
        let script = ScriptedInput::parse("# opening\nhjkl\n\n.g>f ce");
        let commands: Vec<Command> = script.collect();
        assert_eq!(
            commands,
            vec![
                Command::Move { dx: -1, dy: 0 },
                Command::Move { dx: 0, dy: 1 },
                Command::Move { dx: 0, dy: -1 },
                Command::Move { dx: 1, dy: 0 },
                Command::Wait,
                Command::PickUp,
                Command::Descend,
                Command::Shoot,
                Command::CheckAmmo,
                Command::UseFixture,
            ]
        );
    }

    #[test]
    fn digits_select_inventory_slots() {
        let commands: Vec<Command> = ScriptedInput::parse("13D2").collect();
        assert_eq!(
            commands,
            vec![
                Command::UseItem { slot: 0 },
                Command::UseItem { slot: 2 },
                Command::Drop { slot: 1 },
            ]
        );
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let script = ScriptedInput::parse("x0Zh");
        assert_eq!(script.len(), 1);
    }
}
