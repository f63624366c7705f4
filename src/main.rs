use std::path::{Path, PathBuf};

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use chrono::Utc;
use clap::Parser;
use log::{error, info, warn};

use gammarogue::{
    config::MAP_HEIGHT,
    ecs::{
        GameWorld,
        resources::GameState as WorldState,
        targeting::{FixedTarget, NearestVisible, NoTarget, Targeting},
        turn::{Command, TurnOutcome},
    },
    error::GameResult,
    render::{
        BAR_WIDTH, Hud, draw_entities, draw_inventory, draw_log, draw_map, draw_target_cursor,
        slot_for_letter,
    },
    score::HighScores,
    scripted_input::ScriptedInput,
};

const MAP_ORIGIN: Point = Point { x: 0, y: 0 };
const PANEL_TOP: i32 = MAP_HEIGHT;

#[derive(Parser, Debug)]
#[command(name = "gammarogue", version, about = "Escape the Wreck of the Ganymede")]
struct Cli {
    /// Seed for the dungeon and every roll. Defaults to the clock.
    #[arg(long)]
    seed: Option<u64>,
    /// Name recorded on the high-score table.
    #[arg(long, default_value = "Stranger")]
    name: String,
    /// Run a command script headlessly instead of opening a terminal.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Where the game is saved on quit.
    #[arg(long, default_value = "savegame.json")]
    save: PathBuf,
    /// Resume from the save file instead of starting over.
    #[arg(long = "continue")]
    resume: bool,
    #[arg(long, default_value = "highscores.json")]
    scores: PathBuf,
    /// Log filter, overridden by RUST_LOG.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Playing,
    Inventory { dropping: bool },
    Targeting { command: Command, cursor: Point },
    GameOver,
}

struct Gammarogue {
    world: GameWorld,
    mode: Mode,
    save_path: PathBuf,
    scores_path: PathBuf,
    high_scores: HighScores,
    score_recorded: bool,
}

impl GameState for Gammarogue {
    fn tick(&mut self, ctx: &mut BTerm) {
        match self.mode {
            Mode::Playing => self.handle_playing(ctx),
            Mode::Inventory { dropping } => self.handle_inventory(ctx, dropping),
            Mode::Targeting { command, cursor } => self.handle_targeting(ctx, command, cursor),
            Mode::GameOver => {
                if ctx.key == Some(VirtualKeyCode::Escape) {
                    ctx.quit();
                }
            }
        }
        if self.world.state() != WorldState::Playing && self.mode != Mode::GameOver {
            self.finish_game();
        }
        ctx.cls();
        self.draw_scene(ctx);
    }
}

impl Gammarogue {
    fn handle_playing(&mut self, ctx: &mut BTerm) {
        let Some(key) = ctx.key else {
            return;
        };
        let command = match key {
            VirtualKeyCode::Left | VirtualKeyCode::H | VirtualKeyCode::Numpad4 => {
                Command::Move { dx: -1, dy: 0 }
            }
            VirtualKeyCode::Right | VirtualKeyCode::L | VirtualKeyCode::Numpad6 => {
                Command::Move { dx: 1, dy: 0 }
            }
            VirtualKeyCode::Up | VirtualKeyCode::K | VirtualKeyCode::Numpad8 => {
                Command::Move { dx: 0, dy: -1 }
            }
            VirtualKeyCode::Down | VirtualKeyCode::J | VirtualKeyCode::Numpad2 => {
                Command::Move { dx: 0, dy: 1 }
            }
            VirtualKeyCode::Y | VirtualKeyCode::Numpad7 => Command::Move { dx: -1, dy: -1 },
            VirtualKeyCode::U | VirtualKeyCode::Numpad9 => Command::Move { dx: 1, dy: -1 },
            VirtualKeyCode::B | VirtualKeyCode::Numpad1 => Command::Move { dx: -1, dy: 1 },
            VirtualKeyCode::N | VirtualKeyCode::Numpad3 => Command::Move { dx: 1, dy: 1 },
            VirtualKeyCode::Period if ctx.shift => Command::Descend,
            VirtualKeyCode::Period | VirtualKeyCode::Numpad5 | VirtualKeyCode::Space => {
                Command::Wait
            }
            VirtualKeyCode::G => Command::PickUp,
            VirtualKeyCode::C => Command::CheckAmmo,
            VirtualKeyCode::E => Command::UseFixture,
            VirtualKeyCode::F => {
                self.begin_targeting(Command::Shoot);
                return;
            }
            VirtualKeyCode::I => {
                self.mode = Mode::Inventory { dropping: false };
                return;
            }
            VirtualKeyCode::D => {
                self.mode = Mode::Inventory { dropping: true };
                return;
            }
            VirtualKeyCode::Escape => {
                self.save_and_quit(ctx);
                return;
            }
            other => match slot_for_key(other) {
                Some(slot) => {
                    self.use_slot(slot);
                    return;
                }
                None => return,
            },
        };
        self.run(command, &mut NoTarget);
    }

    fn handle_inventory(&mut self, ctx: &mut BTerm, dropping: bool) {
        let Some(key) = ctx.key else {
            return;
        };
        if key == VirtualKeyCode::Escape {
            self.mode = Mode::Playing;
            return;
        }
        let Some(slot) = slot_for_letter(key) else {
            return;
        };
        self.mode = Mode::Playing;
        if dropping {
            self.run(Command::Drop { slot }, &mut NoTarget);
        } else {
            self.use_slot(slot);
        }
    }

    fn handle_targeting(&mut self, ctx: &mut BTerm, command: Command, cursor: Point) {
        let mut cursor = cursor;
        if ctx.left_click {
            self.mode = Mode::Playing;
            self.run(command, &mut FixedTarget(Some(ctx.mouse_point())));
            return;
        }
        let Some(key) = ctx.key else {
            let mouse = ctx.mouse_point();
            if self.world.map().in_bounds(mouse) {
                self.mode = Mode::Targeting {
                    command,
                    cursor: mouse,
                };
            }
            return;
        };
        match key {
            VirtualKeyCode::Escape => {
                self.world.log("Cancelled.");
                self.mode = Mode::Playing;
                return;
            }
            VirtualKeyCode::Return | VirtualKeyCode::F => {
                self.mode = Mode::Playing;
                self.run(command, &mut FixedTarget(Some(cursor)));
                return;
            }
            VirtualKeyCode::Left | VirtualKeyCode::H => cursor.x -= 1,
            VirtualKeyCode::Right | VirtualKeyCode::L => cursor.x += 1,
            VirtualKeyCode::Up | VirtualKeyCode::K => cursor.y -= 1,
            VirtualKeyCode::Down | VirtualKeyCode::J => cursor.y += 1,
            _ => {}
        }
        self.mode = Mode::Targeting { command, cursor };
    }

    fn use_slot(&mut self, slot: usize) {
        if self.world.item_needs_target(slot) {
            self.begin_targeting(Command::UseItem { slot });
        } else {
            self.run(Command::UseItem { slot }, &mut NoTarget);
        }
    }

    fn begin_targeting(&mut self, command: Command) {
        let cursor = NearestVisible
            .pick_tile(&self.world, None)
            .unwrap_or_else(|| self.world.player_point());
        self.world
            .log_color("Pick a target with the cursor or mouse, Esc cancels.", RGB::named(LIGHT_CYAN));
        self.mode = Mode::Targeting { command, cursor };
    }

    fn run(&mut self, command: Command, targeting: &mut dyn Targeting) {
        match self.world.play_turn(command, targeting) {
            Ok(TurnOutcome::NewLevel) => info!("now on wreck level {}", self.world.depth()),
            Ok(_) => {}
            Err(err) => {
                error!("turn failed: {err}");
                self.world
                    .log_color(format!("Something went wrong: {err}"), RGB::named(RED));
            }
        }
    }

    fn finish_game(&mut self) {
        self.mode = Mode::GameOver;
        if self.score_recorded {
            return;
        }
        self.score_recorded = true;
        if let Some(record) = self.world.final_score().cloned() {
            self.high_scores.add(record);
            if let Err(err) = self.high_scores.save(&self.scores_path) {
                warn!("could not save high scores: {err}");
            }
        }
        if self.save_path.exists() {
            if let Err(err) = std::fs::remove_file(&self.save_path) {
                warn!("could not remove finished save: {err}");
            }
        }
    }

    fn save_and_quit(&mut self, ctx: &mut BTerm) {
        match self.world.save_to_path(&self.save_path) {
            Ok(()) => info!("game saved to {}", self.save_path.display()),
            Err(err) => error!("save failed: {err}"),
        }
        ctx.quit();
    }

    fn draw_scene(&self, ctx: &mut BTerm) {
        draw_map(ctx, &self.world, MAP_ORIGIN);
        draw_entities(ctx, &self.world, MAP_ORIGIN);
        Hud::draw(ctx, &self.world, PANEL_TOP);
        draw_log(ctx, &self.world.messages(), BAR_WIDTH + 2, PANEL_TOP);

        match self.mode {
            Mode::Inventory { dropping } => {
                let title = if dropping {
                    "Drop which item?"
                } else {
                    "Use which item?"
                };
                draw_inventory(ctx, title, &self.world.inventory_entries());
            }
            Mode::Targeting { cursor, .. } => {
                let valid = self.world.is_visible_to_player(cursor);
                draw_target_cursor(ctx, cursor, MAP_ORIGIN, valid);
            }
            Mode::GameOver => self.draw_game_over(ctx),
            Mode::Playing => {}
        }
    }

    fn draw_game_over(&self, ctx: &mut BTerm) {
        let headline = match self.world.state() {
            WorldState::Won => "You escaped the wreck!",
            _ => "You died.",
        };
        ctx.print_color_centered(8, RGB::named(YELLOW), RGB::named(BLACK), headline);
        for (row, record) in self.high_scores.records().iter().enumerate() {
            ctx.print_centered(11 + row as i32, record.summary());
        }
        ctx.print_color_centered(23, RGB::named(GRAY), RGB::named(BLACK), "Press Esc to quit");
    }
}

fn slot_for_key(key: VirtualKeyCode) -> Option<usize> {
    let slot = match key {
        VirtualKeyCode::Key1 => 0,
        VirtualKeyCode::Key2 => 1,
        VirtualKeyCode::Key3 => 2,
        VirtualKeyCode::Key4 => 3,
        VirtualKeyCode::Key5 => 4,
        VirtualKeyCode::Key6 => 5,
        VirtualKeyCode::Key7 => 6,
        VirtualKeyCode::Key8 => 7,
        VirtualKeyCode::Key9 => 8,
        _ => return None,
    };
    Some(slot)
}

fn open_world(cli: &Cli) -> GameResult<GameWorld> {
    if cli.resume && cli.save.exists() {
        return GameWorld::load_from_path(&cli.save);
    }
    let seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);
    GameWorld::new(&cli.name, seed)
}

/// Plays a script to completion and prints where the game ended up.
fn run_script(cli: &Cli, script: &Path) -> GameResult<()> {
    let mut world = open_world(cli)?;
    let mut targeting = NearestVisible;
    for command in ScriptedInput::from_file(script)? {
        if world.state() != WorldState::Playing {
            break;
        }
        world.play_turn(command, &mut targeting)?;
    }

    for line in world.messages().lines() {
        println!("{}", line.text);
    }
    let hp = world.player_fighter().map_or(0, |fighter| fighter.hp);
    println!(
        "state={:?} depth={} turn={} hp={}",
        world.state(),
        world.depth(),
        world.turn(),
        hp
    );

    match world.final_score() {
        Some(record) => {
            let mut scores = HighScores::load(&cli.scores)?;
            scores.add(record.clone());
            scores.save(&cli.scores)?;
        }
        None if world.state() == WorldState::Playing => world.save_to_path(&cli.save)?,
        None => {}
    }
    Ok(())
}

fn main() -> BError {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str()))
        .init();

    if let Some(script) = &cli.script {
        run_script(&cli, script)?;
        return Ok(());
    }

    let world = open_world(&cli)?;
    let high_scores = HighScores::load(&cli.scores).unwrap_or_else(|err| {
        warn!("ignoring unreadable high scores: {err}");
        HighScores::default()
    });
    let context = BTermBuilder::simple80x50()
        .with_title("Gammarogue: Wreck of the Ganymede")
        .build()?;
    let game_state = Gammarogue {
        world,
        mode: Mode::Playing,
        save_path: cli.save.clone(),
        scores_path: cli.scores.clone(),
        high_scores,
        score_recorded: false,
    };
    main_loop(context, game_state)
}
