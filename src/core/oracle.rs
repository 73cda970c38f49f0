//! Generation oracle: reproduces what the authority's enchanting table shows
//! for a given enchantment seed.
//!
//! Every function here builds its own generator from the seed, so results are
//! a pure function of `(seed, power, slot, item, pool)`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enchantment::{EnchantmentInstance, EnchantmentPool};
use crate::item::ItemClass;
use crate::lcg::{Lcg48, Seed};

/// Number of offer slots on the table.
pub const SLOTS: usize = 3;

/// Bookshelf power is clamped to this value before use.
pub const MAX_POWER: u32 = 15;

/// Raw cost for one slot, drawn from a generator shared by all three slots.
fn slot_cost(rand: &mut Lcg48, slot: usize, power: u32, item: &ItemClass) -> i32 {
    if !item.is_enchantable() {
        return 0;
    }
    let power = power.min(MAX_POWER) as i32;
    let j = rand.next_int_bounded(8) + 1 + (power >> 1) + rand.next_int_bounded(power + 1);
    match slot {
        0 => (j / 3).max(1),
        1 => j * 2 / 3 + 1,
        _ => j.max(power * 2),
    }
}

/// Level costs of the three slots. A slot whose cost falls below `slot + 1`
/// reports 0 (no offer).
pub fn costs(seed: Seed, power: u32, item: &ItemClass) -> [i32; SLOTS] {
    let mut rand = Lcg48::from_seed(seed);
    let mut out = [0; SLOTS];
    for (slot, cost) in out.iter_mut().enumerate() {
        let c = slot_cost(&mut rand, slot, power, item);
        *cost = if c < slot as i32 + 1 { 0 } else { c };
    }
    out
}

/// Candidates for one modified level: for each applicable enchantment the
/// highest level whose cost window contains `level`.
fn available(
    level: i32,
    item: &ItemClass,
    pool: &EnchantmentPool,
) -> Vec<EnchantmentInstance> {
    pool.iter()
        .filter(|e| !e.is_treasure() && e.is_discoverable() && e.can_enchant(item))
        .filter_map(|e| {
            (1..=e.max_level())
                .rev()
                .find(|&l| level >= e.min_cost(l) && level <= e.max_cost(l))
                .map(|l| EnchantmentInstance::new(e, l))
        })
        .collect()
}

fn weighted_pick(
    rand: &mut Lcg48,
    list: &[EnchantmentInstance],
) -> Option<EnchantmentInstance> {
    let total: i32 = list.iter().map(EnchantmentInstance::weight).sum();
    if total <= 0 {
        return None;
    }
    let mut j = rand.next_int_bounded(total);
    for e in list {
        j -= e.weight();
        if j < 0 {
            return Some(*e);
        }
    }
    None
}

/// Round half up, as the authority's float rounding does.
fn round_half_up(x: f32) -> i32 {
    (f64::from(x) + 0.5).floor() as i32
}

/// Draw the enchantments for a modified level from an already seeded generator.
fn select(
    rand: &mut Lcg48,
    item: &ItemClass,
    cost: i32,
    pool: &EnchantmentPool,
) -> Vec<EnchantmentInstance> {
    let mut out = Vec::new();
    let ench = item.enchantability();
    if ench <= 0 {
        return out;
    }

    let mut level =
        cost + 1 + rand.next_int_bounded(ench / 4 + 1) + rand.next_int_bounded(ench / 4 + 1);
    let f = (rand.next_float() + rand.next_float() - 1.0) * 0.15;
    let lf = level as f32;
    level = round_half_up(lf + lf * f).max(1);

    let mut candidates = available(level, item, pool);
    if candidates.is_empty() {
        return out;
    }

    out.extend(weighted_pick(rand, &candidates));
    while rand.next_int_bounded(50) <= level {
        if let Some(last) = out.last() {
            candidates.retain(|e| last.enchantment.is_compatible_with(e.enchantment));
        }
        if candidates.is_empty() {
            break;
        }
        out.extend(weighted_pick(rand, &candidates));
        level /= 2;
    }
    out
}

/// The result of rolling one slot: its enchantment list and the clue the
/// authority would reveal for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotRoll {
    pub enchantments: Vec<EnchantmentInstance>,
    pub clue: Option<EnchantmentInstance>,
}

/// Enchantment list for `slot` at `cost`, plus the clue draw that follows it.
///
/// The generator is reseeded with `seed + slot` (wrapping 32-bit add, then
/// sign extended). Zero-cost slots are unavailable and roll nothing.
pub fn roll_slot(
    seed: Seed,
    slot: usize,
    cost: i32,
    item: &ItemClass,
    pool: &EnchantmentPool,
) -> SlotRoll {
    if cost <= 0 {
        return SlotRoll::default();
    }
    let mut rand = Lcg48::from_seed(seed.wrapping_add(slot as i32));
    let mut enchantments = select(&mut rand, item, cost, pool);
    if item.is_book() && enchantments.len() > 1 {
        let drop = rand.next_int_bounded(enchantments.len() as i32) as usize;
        enchantments.remove(drop);
    }
    let clue = if enchantments.is_empty() {
        None
    } else {
        let pick = rand.next_int_bounded(enchantments.len() as i32) as usize;
        Some(enchantments[pick])
    };
    SlotRoll { enchantments, clue }
}

/// Just the enchantment list for one slot.
pub fn enchantments(
    seed: Seed,
    slot: usize,
    cost: i32,
    item: &ItemClass,
    pool: &EnchantmentPool,
) -> Vec<EnchantmentInstance> {
    roll_slot(seed, slot, cost, item, pool).enchantments
}

/// Everything the table shows for one seed: costs and per-slot rolls.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableRoll {
    pub costs: [i32; SLOTS],
    pub slots: [SlotRoll; SLOTS],
}

pub fn roll_table(seed: Seed, power: u32, item: &ItemClass, pool: &EnchantmentPool) -> TableRoll {
    let costs = costs(seed, power, item);
    let slots = core::array::from_fn(|slot| roll_slot(seed, slot, costs[slot], item, pool));
    TableRoll { costs, slots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enchantment::EnchantmentKind;

    fn pickaxe() -> ItemClass {
        ItemClass::vanilla("diamond_pickaxe").unwrap()
    }

    #[test]
    fn oracle_is_deterministic() {
        let pool = EnchantmentPool::vanilla();
        for seed in [0, 1, -1, 0x1234_5678, i32::MIN, i32::MAX] {
            for power in [0, 7, 15] {
                let a = roll_table(seed, power, &pickaxe(), &pool);
                let b = roll_table(seed, power, &pickaxe(), &pool);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn known_table_for_reference_seed() {
        let pool = EnchantmentPool::vanilla();
        let roll = roll_table(0x1234_5678, 15, &pickaxe(), &pool);
        assert_eq!(roll.costs, [7, 8, 30]);
        let clues: Vec<_> = roll.slots.iter().map(|s| s.clue).collect();
        assert_eq!(
            clues,
            vec![
                Some(EnchantmentInstance::new(EnchantmentKind::Efficiency, 1)),
                Some(EnchantmentInstance::new(EnchantmentKind::Efficiency, 1)),
                Some(EnchantmentInstance::new(EnchantmentKind::Efficiency, 4)),
            ]
        );

        let book = roll_table(0x1234_5678, 15, &ItemClass::book(), &pool);
        assert_eq!(book.costs, [7, 8, 30]);
        assert_eq!(
            book.slots[1].clue,
            Some(EnchantmentInstance::new(EnchantmentKind::ProjectileProtection, 2))
        );
        assert_eq!(
            book.slots[2].clue,
            Some(EnchantmentInstance::new(EnchantmentKind::Multishot, 1))
        );
    }

    #[test]
    fn power_above_fifteen_is_clamped() {
        let item = pickaxe();
        for seed in [3, 77, -4000] {
            assert_eq!(costs(seed, 15, &item), costs(seed, 30, &item));
        }
    }

    #[test]
    fn unenchantable_items_get_no_offer() {
        let stick = ItemClass::new("stick", 0, Default::default());
        let pool = EnchantmentPool::vanilla();
        let roll = roll_table(42, 15, &stick, &pool);
        assert_eq!(roll.costs, [0, 0, 0]);
        assert!(roll.slots.iter().all(|s| s.enchantments.is_empty() && s.clue.is_none()));
    }

    #[test]
    fn slot_costs_respect_minimum() {
        let item = pickaxe();
        for seed in 0..500 {
            let c = costs(seed, 0, &item);
            for (slot, cost) in c.iter().enumerate() {
                assert!(*cost == 0 || *cost >= slot as i32 + 1);
            }
        }
    }

    #[test]
    fn rolled_enchantments_are_applicable_and_compatible() {
        let pool = EnchantmentPool::vanilla();
        let item = pickaxe();
        for seed in 0..300 {
            let roll = roll_table(seed, 15, &item, &pool);
            for slot in &roll.slots {
                for (i, a) in slot.enchantments.iter().enumerate() {
                    assert!(a.enchantment.can_enchant(&item));
                    assert!(!a.enchantment.is_treasure());
                    for b in &slot.enchantments[i + 1..] {
                        assert!(a.enchantment.is_compatible_with(b.enchantment));
                    }
                }
                if let Some(clue) = slot.clue {
                    assert!(slot.enchantments.contains(&clue));
                }
            }
        }
    }

    #[test]
    fn slot_offset_aliases_across_seeds() {
        // seed + 1 at slot 0 draws from the same generator as seed at slot 1.
        let pool = EnchantmentPool::vanilla();
        let item = pickaxe();
        let a = roll_slot(1000, 1, 20, &item, &pool);
        let b = roll_slot(1001, 0, 20, &item, &pool);
        assert_eq!(a, b);
        let wrapped = roll_slot(i32::MAX, 1, 20, &item, &pool);
        assert_eq!(wrapped, roll_slot(i32::MIN, 0, 20, &item, &pool));
    }

    #[test]
    fn removed_pool_entries_never_roll() {
        let pool = EnchantmentPool::vanilla().without(EnchantmentKind::Efficiency);
        let item = pickaxe();
        for seed in 0..200 {
            let roll = roll_table(seed, 15, &item, &pool);
            assert!(roll
                .slots
                .iter()
                .flat_map(|s| &s.enchantments)
                .all(|e| e.enchantment != EnchantmentKind::Efficiency));
        }
    }
}
