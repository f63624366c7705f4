use specs::prelude::{Entity, WorldExt};

use super::{
    GameWorld,
    components::{Equipment, EquipmentSlot, Fighter, Inventory},
};
use crate::{config::ARMOR_BONUS_CAP, data::Dice};

/// A fighter's numbers after equipment bonuses are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectiveStats {
    pub max_hp: i32,
    pub armor_class: i32,
    pub to_hit: i32,
    pub damage: i32,
    pub damage_roll: Dice,
    pub damage_resistance: i32,
}

/// Folds equipped items into the fighter's base values.
///
/// Unequipped entries are ignored. The summed armour bonus is floored at
/// [`ARMOR_BONUS_CAP`], and an equipped weapon's dice replace the base roll.
pub fn resolve(fighter: &Fighter, equipment: &[Equipment]) -> EffectiveStats {
    let equipped: Vec<&Equipment> = equipment.iter().filter(|gear| gear.equipped).collect();

    let armor_bonus: i32 = equipped.iter().map(|gear| gear.armor_bonus).sum();
    let damage_roll = equipped
        .iter()
        .find_map(|gear| gear.damage_roll)
        .unwrap_or(fighter.base_roll);

    EffectiveStats {
        max_hp: fighter.base_max_hp + equipped.iter().map(|gear| gear.max_hp_bonus).sum::<i32>(),
        armor_class: fighter.base_armor_class + armor_bonus.max(ARMOR_BONUS_CAP),
        to_hit: fighter.base_to_hit + equipped.iter().map(|gear| gear.to_hit_bonus).sum::<i32>(),
        damage: fighter.base_damage + equipped.iter().map(|gear| gear.damage_bonus).sum::<i32>(),
        damage_roll,
        damage_resistance: fighter.damage_resistance,
    }
}

impl GameWorld {
    /// Equipment components of everything `owner` carries.
    pub fn equipment_of(&self, owner: Entity) -> Vec<(Entity, Equipment)> {
        let inventories = self.ecs.read_component::<Inventory>();
        let gear = self.ecs.read_component::<Equipment>();
        inventories
            .get(owner)
            .map(|inventory| {
                inventory
                    .items
                    .iter()
                    .filter_map(|item| gear.get(*item).map(|g| (*item, g.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn effective_stats(&self, entity: Entity) -> Option<EffectiveStats> {
        let fighter = self.fighter_of(entity)?;
        let equipment: Vec<Equipment> = self
            .equipment_of(entity)
            .into_iter()
            .map(|(_, gear)| gear)
            .collect();
        Some(resolve(&fighter, &equipment))
    }

    /// The item the player has equipped in `slot`.
    pub fn equipped_in_slot(&self, slot: EquipmentSlot) -> Option<Entity> {
        self.equipment_of(self.player)
            .into_iter()
            .find(|(_, gear)| gear.equipped && gear.slot == slot)
            .map(|(item, _)| item)
    }

    /// Raises hit points by `amount`, never past the effective maximum.
    pub fn heal(&mut self, entity: Entity, amount: i32) {
        let Some(max_hp) = self.effective_stats(entity).map(|stats| stats.max_hp) else {
            return;
        };
        if let Some(fighter) = self.ecs.write_component::<Fighter>().get_mut(entity) {
            fighter.hp = (fighter.hp + amount.max(0)).min(max_hp);
        }
    }

    /// Brings hit points back under the effective maximum after gear changes.
    pub(crate) fn clamp_hp(&mut self, entity: Entity) {
        let Some(max_hp) = self.effective_stats(entity).map(|stats| stats.max_hp) else {
            return;
        };
        if let Some(fighter) = self.ecs.write_component::<Fighter>().get_mut(entity) {
            fighter.hp = fighter.hp.min(max_hp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter() -> Fighter {
        Fighter::new(20, 10, 1, 1, Dice::new(1, 3))
    }

    fn armor(bonus: i32) -> Equipment {
        let mut gear = Equipment::new(EquipmentSlot::Armor);
        gear.armor_bonus = bonus;
        gear.equipped = true;
        gear
    }

    #[test]
    fn base_values_without_gear() {
        let stats = resolve(&fighter(), &[]);
        assert_eq!(stats.max_hp, 20);
        assert_eq!(stats.armor_class, 10);
        assert_eq!(stats.to_hit, 1);
        assert_eq!(stats.damage, 1);
        assert_eq!(stats.damage_roll, Dice::new(1, 3));
    }

    #[test]
    fn weapon_dice_replace_base_roll() {
        let mut knife = Equipment::new(EquipmentSlot::RightHand);
        knife.damage_roll = Some(Dice::new(1, 4));
        knife.to_hit_bonus = 2;
        knife.damage_bonus = 2;
        knife.equipped = true;
        let stats = resolve(&fighter(), &[knife.clone()]);
        assert_eq!(stats.damage_roll, Dice::new(1, 4));
        assert_eq!(stats.to_hit, 3);
        assert_eq!(stats.damage, 3);

        knife.equipped = false;
        assert_eq!(resolve(&fighter(), &[knife]).damage_roll, Dice::new(1, 3));
    }

    #[test]
    fn armor_bonus_is_capped() {
        let stats = resolve(&fighter(), &[armor(-10), armor(-6)]);
        assert_eq!(stats.armor_class, 10 + ARMOR_BONUS_CAP);
        let stats = resolve(&fighter(), &[armor(-3)]);
        assert_eq!(stats.armor_class, 7);
    }
}
