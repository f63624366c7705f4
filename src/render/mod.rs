use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::ecs::{
    GameWorld, inventory::InventoryEntry, resources::MessageLog, turn::xp_to_level_up,
};

const DARK_WALL: (u8, u8, u8) = (0, 0, 100);
const LIGHT_WALL: (u8, u8, u8) = (130, 110, 50);
const DARK_GROUND: (u8, u8, u8) = (50, 50, 150);
const LIGHT_GROUND: (u8, u8, u8) = (200, 180, 50);

pub const BAR_WIDTH: i32 = 20;

const SLOT_KEYS: [VirtualKeyCode; 26] = [
    VirtualKeyCode::A,
    VirtualKeyCode::B,
    VirtualKeyCode::C,
    VirtualKeyCode::D,
    VirtualKeyCode::E,
    VirtualKeyCode::F,
    VirtualKeyCode::G,
    VirtualKeyCode::H,
    VirtualKeyCode::I,
    VirtualKeyCode::J,
    VirtualKeyCode::K,
    VirtualKeyCode::L,
    VirtualKeyCode::M,
    VirtualKeyCode::N,
    VirtualKeyCode::O,
    VirtualKeyCode::P,
    VirtualKeyCode::Q,
    VirtualKeyCode::R,
    VirtualKeyCode::S,
    VirtualKeyCode::T,
    VirtualKeyCode::U,
    VirtualKeyCode::V,
    VirtualKeyCode::W,
    VirtualKeyCode::X,
    VirtualKeyCode::Y,
    VirtualKeyCode::Z,
];

/// Menu letter for an inventory slot, `a` through `z`.
pub fn slot_letter(slot: usize) -> char {
    (b'a' + (slot % SLOT_KEYS.len()) as u8) as char
}

/// Inventory slot picked by a letter key in the item menu.
pub fn slot_for_letter(key: VirtualKeyCode) -> Option<usize> {
    SLOT_KEYS.iter().position(|slot_key| *slot_key == key)
}

/// Status panel under the map: health bar, level, depth and experience.
pub struct Hud;

impl Hud {
    pub fn draw(ctx: &mut BTerm, world: &GameWorld, top: i32) {
        let (width, height) = ctx.get_char_size();
        ctx.draw_box(
            0,
            top,
            width as i32 - 1,
            height as i32 - top - 1,
            RGB::named(DARK_GRAY),
            RGB::named(BLACK),
        );

        let player = world.player_entity();
        if let (Some(fighter), Some(stats)) = (world.player_fighter(), world.effective_stats(player)) {
            ctx.draw_bar_horizontal(
                1,
                top + 1,
                BAR_WIDTH,
                fighter.hp.max(0),
                stats.max_hp,
                RGB::named(RED),
                RGB::named(DARK_RED),
            );
            ctx.print_color(
                2,
                top + 1,
                RGB::named(WHITE),
                RGB::named(RED),
                format!("HP: {}/{}", fighter.hp.max(0), stats.max_hp),
            );
            let level = world.player_level();
            ctx.print(1, top + 2, format!("{} (level {level})", world.player_name()));
            ctx.print(
                1,
                top + 3,
                format!("XP: {}/{}", fighter.xp, xp_to_level_up(level)),
            );
            ctx.print(
                1,
                top + 4,
                format!("AC {}  Hit {:+}  Dmg {}{:+}", stats.armor_class, stats.to_hit, stats.damage_roll, stats.damage),
            );
        }
        ctx.print_color(
            1,
            top + 5,
            RGB::named(LIGHT_CYAN),
            RGB::named(BLACK),
            format!("Wreck level {}  Turn {}", world.depth(), world.turn()),
        );
    }
}

pub fn draw_log(ctx: &mut BTerm, log: &MessageLog, x: i32, top: i32) {
    for (row, line) in log.lines().enumerate() {
        ctx.print_color(x, top + 1 + row as i32, line.color, RGB::named(BLACK), &line.text);
    }
}

/// Draws lit tiles in full colour and remembered tiles darkened. Tiles never
/// seen stay blank.
pub fn draw_map(ctx: &mut BTerm, world: &GameWorld, map_origin: Point) {
    let map = world.map();
    let visible = world.visible_tiles();
    for y in 0..map.height {
        for x in 0..map.width {
            let point = Point::new(x, y);
            let Some(tile) = map.tile_at(point) else {
                continue;
            };
            let (glyph, color) = match (visible.contains(&point), tile.explored, tile.blocks_sight) {
                (true, _, true) => ('#', LIGHT_WALL),
                (true, _, false) => ('.', LIGHT_GROUND),
                (false, true, true) => ('#', DARK_WALL),
                (false, true, false) => ('.', DARK_GROUND),
                (false, false, _) => continue,
            };
            let (r, g, b) = color;
            ctx.set(
                map_origin.x + x,
                map_origin.y + y,
                RGB::from_u8(r, g, b),
                RGB::named(BLACK),
                to_cp437(glyph),
            );
        }
    }
}

/// Entities in render order. Anything outside the field of view is hidden
/// unless it is marked always-visible and stands on an explored tile.
pub fn draw_entities(ctx: &mut BTerm, world: &GameWorld, map_origin: Point) {
    let visible = world.visible_tiles();
    let map = world.map();
    for entry in world.render_entries() {
        let shown = visible.contains(&entry.point)
            || (entry.always_visible && map.is_explored(entry.point));
        if !shown {
            continue;
        }
        ctx.set(
            map_origin.x + entry.point.x,
            map_origin.y + entry.point.y,
            entry.color,
            RGB::named(BLACK),
            entry.glyph,
        );
    }
}

/// Boxed list of carried items, lettered from `a`.
pub fn draw_inventory(ctx: &mut BTerm, title: &str, entries: &[InventoryEntry]) {
    let width = 50;
    let height = entries.len().max(1) as i32 + 3;
    let x = 15;
    let y = 5;
    ctx.draw_box(x, y, width, height, RGB::named(WHITE), RGB::named(BLACK));
    ctx.print_color(x + 2, y, RGB::named(YELLOW), RGB::named(BLACK), title);
    if entries.is_empty() {
        ctx.print(x + 2, y + 2, "Inventory is empty.");
    }
    for (idx, entry) in entries.iter().enumerate() {
        let mut label = format!("({}) {}", slot_letter(idx), entry.name);
        if let Some(gear) = &entry.equipment {
            if gear.equipped {
                label.push_str(&format!(" (on {})", gear.slot.as_str()));
            }
            if let Some(ammo) = gear.ammo {
                label.push_str(&format!(" [{ammo}]"));
            }
        }
        ctx.print(x + 2, y + 2 + idx as i32, label);
    }
    ctx.print_color(
        x + 2,
        y + height,
        RGB::named(GRAY),
        RGB::named(BLACK),
        "Press a letter, or Esc to close",
    );
}

pub fn draw_target_cursor(ctx: &mut BTerm, cursor: Point, map_origin: Point, valid: bool) {
    let color = if valid { CYAN } else { RED };
    ctx.set_bg(map_origin.x + cursor.x, map_origin.y + cursor.y, RGB::named(color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::INVENTORY_CAPACITY;

    #[test]
    fn every_inventory_slot_has_a_letter_key() {
        for slot in 0..INVENTORY_CAPACITY {
            let letter = slot_letter(slot);
            assert!(letter.is_ascii_lowercase());
            assert_eq!(slot_for_letter(SLOT_KEYS[slot]), Some(slot));
        }
        assert_eq!(slot_letter(0), 'a');
        assert_eq!(slot_letter(25), 'z');
        assert_eq!(slot_for_letter(VirtualKeyCode::Z), Some(25));
        assert_eq!(slot_for_letter(VirtualKeyCode::Key1), None);
    }
}
