use bracket_terminal::prelude::{GREEN, LIGHT_GREEN, RED, RGB, YELLOW};
use log::debug;
use specs::prelude::{Entity, Join, WorldExt};

use super::{
    GameWorld,
    components::{AlwaysVisible, Equipment, Inventory, Item, ItemUses, Position},
    effects::EffectResult,
    targeting::Targeting,
    turn::TurnOutcome,
};
use crate::config::INVENTORY_CAPACITY;

/// A carried item as the interface lists it.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryEntry {
    pub entity: Entity,
    pub name: String,
    pub equipment: Option<Equipment>,
    pub uses: Option<ItemUses>,
}

impl GameWorld {
    /// Carried items in pick-up order.
    pub fn inventory(&self) -> Vec<Entity> {
        self.ecs
            .read_component::<Inventory>()
            .get(self.player)
            .map(|inventory| inventory.items.clone())
            .unwrap_or_default()
    }

    pub fn inventory_entries(&self) -> Vec<InventoryEntry> {
        let gear = self.ecs.read_component::<Equipment>();
        let items = self.ecs.read_component::<Item>();
        self.inventory()
            .into_iter()
            .map(|entity| InventoryEntry {
                entity,
                name: self.name_of(entity),
                equipment: gear.get(entity).cloned(),
                uses: items.get(entity).map(|item| item.uses),
            })
            .collect()
    }

    /// Whether using the item in `slot` asks for a target tile first.
    pub fn item_needs_target(&self, slot: usize) -> bool {
        let Some(item) = self.inventory().get(slot).copied() else {
            return false;
        };
        self.ecs
            .read_component::<Item>()
            .get(item)
            .and_then(|it| it.effect.as_ref())
            .is_some_and(|effect| effect.needs_target())
    }

    /// A carryable item lying on the player's tile.
    pub fn item_at_player(&self) -> Option<Entity> {
        let here = self.player_point();
        let entities = self.ecs.entities();
        let positions = self.ecs.read_component::<Position>();
        let items = self.ecs.read_component::<Item>();
        (&entities, &positions, &items)
            .join()
            .find(|(_, pos, _)| pos.point == here)
            .map(|(entity, _, _)| entity)
    }

    pub fn pick_up(&mut self) -> TurnOutcome {
        let Some(item) = self.item_at_player() else {
            self.log("There is nothing here to pick up.");
            return TurnOutcome::NoTurn;
        };
        let name = self.name_of(item);
        if self.inventory().len() >= INVENTORY_CAPACITY {
            self.log_color(
                format!("Your inventory is full, cannot pick up {name}."),
                RGB::named(RED),
            );
            return TurnOutcome::NoTurn;
        }

        self.ecs.write_component::<Position>().remove(item);
        if let Some(inventory) = self.ecs.write_component::<Inventory>().get_mut(self.player) {
            inventory.items.push(item);
        }
        self.log_color(format!("You picked up a {name}!"), RGB::named(GREEN));
        debug!("picked up {name}");

        let slot = self
            .ecs
            .read_component::<Equipment>()
            .get(item)
            .map(|gear| gear.slot);
        if let Some(slot) = slot {
            let _ = self.ecs.write_component::<AlwaysVisible>().insert(item, AlwaysVisible);
            if self.equipped_in_slot(slot).is_none() {
                self.equip(item);
            }
        }
        TurnOutcome::TookTurn
    }

    pub fn drop_item(&mut self, slot: usize) -> TurnOutcome {
        let Some(item) = self.inventory().get(slot).copied() else {
            self.log("You have no item in that slot.");
            return TurnOutcome::NoTurn;
        };
        if self.is_equipped(item) {
            self.dequip(item);
        }
        self.remove_from_inventory(item);
        let here = self.player_point();
        let _ = self
            .ecs
            .write_component::<Position>()
            .insert(item, Position { point: here });
        let name = self.name_of(item);
        self.log_color(format!("You dropped a {name}."), RGB::named(YELLOW));
        TurnOutcome::TookTurn
    }

    /// Uses the item in `slot`. Equipment toggles between worn and carried;
    /// everything else applies its effect and spends a use.
    pub fn use_item(&mut self, slot: usize, targeting: &mut dyn Targeting) -> TurnOutcome {
        let Some(item) = self.inventory().get(slot).copied() else {
            self.log("You have no item in that slot.");
            return TurnOutcome::NoTurn;
        };
        if self.ecs.read_component::<Equipment>().contains(item) {
            self.toggle_equip(item);
            return TurnOutcome::TookTurn;
        }

        let name = self.name_of(item);
        let Some(effect) = self
            .ecs
            .read_component::<Item>()
            .get(item)
            .and_then(|it| it.effect.clone())
        else {
            self.log(format!("The {name} cannot be used."));
            return TurnOutcome::NoTurn;
        };

        match self.apply_effect(&effect, &name, targeting) {
            EffectResult::Used => {
                self.spend_use(item);
                TurnOutcome::TookTurn
            }
            EffectResult::Cancelled => TurnOutcome::NoTurn,
        }
    }

    fn spend_use(&mut self, item: Entity) {
        let exhausted = {
            let mut items = self.ecs.write_component::<Item>();
            match items.get_mut(item) {
                Some(Item {
                    uses: ItemUses::Single,
                    ..
                }) => true,
                Some(Item {
                    uses: ItemUses::Limited(left),
                    ..
                }) => {
                    *left -= 1;
                    *left < 1
                }
                _ => false,
            }
        };
        if exhausted {
            self.remove_from_inventory(item);
            let _ = self.ecs.delete_entity(item);
        }
    }

    fn remove_from_inventory(&mut self, item: Entity) {
        if let Some(inventory) = self.ecs.write_component::<Inventory>().get_mut(self.player) {
            inventory.items.retain(|carried| *carried != item);
        }
    }

    pub fn is_equipped(&self, item: Entity) -> bool {
        self.ecs
            .read_component::<Equipment>()
            .get(item)
            .is_some_and(|gear| gear.equipped)
    }

    pub fn toggle_equip(&mut self, item: Entity) {
        if self.is_equipped(item) {
            self.dequip(item);
        } else {
            self.equip(item);
        }
    }

    /// Equips `item`, first taking off whatever occupies the same slot.
    pub fn equip(&mut self, item: Entity) {
        let Some(slot) = self
            .ecs
            .read_component::<Equipment>()
            .get(item)
            .map(|gear| gear.slot)
        else {
            return;
        };
        if let Some(current) = self.equipped_in_slot(slot) {
            if current != item {
                self.dequip(current);
            }
        }
        if let Some(gear) = self.ecs.write_component::<Equipment>().get_mut(item) {
            gear.equipped = true;
        }
        let name = self.name_of(item);
        self.log_color(
            format!("Equipped {name} on {}.", slot.as_str()),
            RGB::named(LIGHT_GREEN),
        );
    }

    pub fn dequip(&mut self, item: Entity) {
        let slot = {
            let mut gear = self.ecs.write_component::<Equipment>();
            let Some(gear) = gear.get_mut(item) else {
                return;
            };
            if !gear.equipped {
                return;
            }
            gear.equipped = false;
            gear.slot
        };
        let name = self.name_of(item);
        self.log_color(
            format!("Dequipped {name} from {}.", slot.as_str()),
            RGB::named(YELLOW),
        );
        self.clamp_hp(self.player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::INVENTORY_CAPACITY,
        data::{
            Dice,
            items::{ItemKind, ItemTemplate},
        },
        ecs::{
            components::{EquipmentSlot, UseEffect},
            targeting::NoTarget,
            testing::{arena, edit_fighter, give},
        },
    };

    fn template(name: &str, kind: ItemKind) -> ItemTemplate {
        ItemTemplate {
            name: name.to_string(),
            glyph: '!',
            color: (255, 255, 255),
            kind,
        }
    }

    fn sword() -> ItemTemplate {
        let mut gear = Equipment::new(EquipmentSlot::RightHand);
        gear.damage_roll = Some(Dice::new(1, 8));
        template("monofilament sword", ItemKind::Gear(gear))
    }

    fn medkit(uses: ItemUses) -> ItemTemplate {
        template(
            "medkit",
            ItemKind::Consumable {
                effect: UseEffect::Heal {
                    dice: Some(Dice::new(2, 4)),
                },
                uses,
            },
        )
    }

    #[test]
    fn equipping_replaces_the_slot_holder() {
        let mut world = arena(41);
        let knife = world.inventory()[0];
        let sword = give(&mut world, &sword());
        assert_eq!(world.use_item(1, &mut NoTarget), TurnOutcome::TookTurn);
        assert!(world.is_equipped(sword));
        assert!(!world.is_equipped(knife));
        assert_eq!(world.equipped_in_slot(EquipmentSlot::RightHand), Some(sword));

        assert_eq!(world.use_item(1, &mut NoTarget), TurnOutcome::TookTurn);
        assert_eq!(world.equipped_in_slot(EquipmentSlot::RightHand), None);
    }

    #[test]
    fn pick_up_respects_capacity() {
        let mut world = arena(42);
        let here = world.player_point();
        world.create_item(&medkit(ItemUses::Single), Some(here));
        while world.inventory().len() < INVENTORY_CAPACITY {
            give(&mut world, &medkit(ItemUses::Single));
        }
        assert_eq!(world.pick_up(), TurnOutcome::NoTurn);
        assert!(world.item_at_player().is_some());
        assert!(world.messages().contains("Your inventory is full"));
    }

    #[test]
    fn picked_up_gear_fills_an_empty_slot() {
        let mut world = arena(43);
        let here = world.player_point();
        let mut vest = Equipment::new(EquipmentSlot::Armor);
        vest.armor_bonus = -2;
        let vest = world.create_item(&template("flak vest", ItemKind::Gear(vest)), Some(here));
        assert_eq!(world.pick_up(), TurnOutcome::TookTurn);
        assert!(world.is_equipped(vest));
        assert_eq!(world.position_of(vest), None);
        let player = world.player_entity();
        assert_eq!(world.effective_stats(player).expect("stats").armor_class, 8);
    }

    #[test]
    fn dropping_takes_gear_off_first() {
        let mut world = arena(44);
        let knife = world.inventory()[0];
        assert_eq!(world.drop_item(0), TurnOutcome::TookTurn);
        assert!(!world.is_equipped(knife));
        assert!(world.inventory().is_empty());
        assert_eq!(world.position_of(knife), Some(world.player_point()));
        assert_eq!(world.drop_item(0), TurnOutcome::NoTurn);
    }

    #[test]
    fn limited_items_run_out() {
        let mut world = arena(45);
        let player = world.player_entity();
        let kit = give(&mut world, &medkit(ItemUses::Limited(2)));
        for _ in 0..2 {
            edit_fighter(&mut world, player, |fighter| fighter.hp = 1);
            assert_eq!(world.use_item(1, &mut NoTarget), TurnOutcome::TookTurn);
        }
        assert!(!world.inventory().contains(&kit));
    }

    #[test]
    fn healing_at_full_health_is_refused() {
        let mut world = arena(46);
        let kit = give(&mut world, &medkit(ItemUses::Single));
        assert_eq!(world.use_item(1, &mut NoTarget), TurnOutcome::NoTurn);
        assert!(world.inventory().contains(&kit));
    }
}
