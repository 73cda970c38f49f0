//! Constraint filter: removes every candidate whose simulated table disagrees
//! with what the authority reported.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::candidates::CandidateSet;
use crate::enchantment::{EnchantmentInstance, EnchantmentPool};
use crate::item::ItemClass;
use crate::lcg::Seed;
use crate::oracle::{self, SLOTS};

/// A clue as reported on the wire: registry id and level.
///
/// Kept raw so ids the registry does not know still compare (and mismatch)
/// instead of being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Clue {
    pub enchantment_id: i32,
    pub level: i32,
}

impl Clue {
    pub fn matches(&self, instance: &EnchantmentInstance) -> bool {
        self.enchantment_id == instance.enchantment.id() && self.level == i32::from(instance.level)
    }
}

impl From<EnchantmentInstance> for Clue {
    fn from(e: EnchantmentInstance) -> Self {
        Self {
            enchantment_id: e.enchantment.id(),
            level: i32::from(e.level),
        }
    }
}

/// One round of authority-reported table data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Level cost per slot; 0 means no offer.
    pub costs: [i32; SLOTS],
    pub clues: [Option<Clue>; SLOTS],
}

impl Observation {
    /// Build from the table's raw arrays, where `-1` marks "no clue".
    pub fn from_raw(
        costs: [i32; SLOTS],
        enchant_clue: [i32; SLOTS],
        level_clue: [i32; SLOTS],
    ) -> Self {
        let clues = core::array::from_fn(|i| {
            if enchant_clue[i] == -1 && level_clue[i] == -1 {
                None
            } else {
                Some(Clue {
                    enchantment_id: enchant_clue[i],
                    level: level_clue[i],
                })
            }
        });
        Self { costs, clues }
    }

    /// The observation the authority would produce for `seed`.
    pub fn simulate(seed: Seed, power: u32, item: &ItemClass, pool: &EnchantmentPool) -> Self {
        let roll = oracle::roll_table(seed, power, item, pool);
        Self {
            costs: roll.costs,
            clues: core::array::from_fn(|i| roll.slots[i].clue.map(Clue::from)),
        }
    }
}

/// Table context shared by every candidate in one filtering pass.
#[derive(Debug, Clone, Copy)]
pub struct TableContext<'a> {
    pub power: u32,
    pub item: &'a ItemClass,
    pub pool: &'a EnchantmentPool,
}

impl TableContext<'_> {
    /// Whether `seed` would have produced exactly `observation`.
    pub fn agrees(&self, seed: Seed, observation: &Observation) -> bool {
        if oracle::costs(seed, self.power, self.item) != observation.costs {
            return false;
        }
        (0..SLOTS).all(|slot| {
            let cost = observation.costs[slot];
            if cost <= 0 {
                return true;
            }
            let roll = oracle::roll_slot(seed, slot, cost, self.item, self.pool);
            match (roll.clue, observation.clues[slot]) {
                (None, None) => true,
                (Some(predicted), Some(seen)) => seen.matches(&predicted),
                _ => false,
            }
        })
    }
}

/// What one filtering pass did to the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Nothing survived: the observation contradicts every candidate.
    Exhausted,
    /// Exactly one candidate survived.
    Converged(Seed),
    /// More than one candidate survived.
    Narrowed(usize),
}

pub fn filter(
    candidates: &mut CandidateSet,
    observation: &Observation,
    ctx: TableContext<'_>,
) -> FilterOutcome {
    candidates.eliminate(|seed| ctx.agrees(seed, observation));
    match candidates.len() {
        0 => FilterOutcome::Exhausted,
        1 => candidates
            .sole()
            .map_or(FilterOutcome::Exhausted, FilterOutcome::Converged),
        n => FilterOutcome::Narrowed(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enchantment::EnchantmentKind;

    fn pickaxe() -> ItemClass {
        ItemClass::vanilla("diamond_pickaxe").unwrap()
    }

    #[test]
    fn raw_arrays_map_minus_one_to_no_clue() {
        let obs = Observation::from_raw([3, 0, 12], [20, -1, 22], [1, -1, 2]);
        assert_eq!(obs.clues[1], None);
        assert_eq!(
            obs.clues[0],
            Some(Clue {
                enchantment_id: 20,
                level: 1
            })
        );
        assert!(obs.clues[2]
            .unwrap()
            .matches(&EnchantmentInstance::new(EnchantmentKind::Unbreaking, 2)));
    }

    #[test]
    fn true_seed_always_agrees() {
        let pool = EnchantmentPool::vanilla();
        let item = pickaxe();
        let ctx = TableContext {
            power: 12,
            item: &item,
            pool: &pool,
        };
        for seed in [-9, 0, 17, 0x0bad_f00d, i32::MIN] {
            let obs = Observation::simulate(seed, 12, &item, &pool);
            assert!(ctx.agrees(seed, &obs));
        }
    }

    #[test]
    fn wrong_cost_or_clue_disagrees() {
        let pool = EnchantmentPool::vanilla();
        let item = pickaxe();
        let ctx = TableContext {
            power: 15,
            item: &item,
            pool: &pool,
        };
        let seed = 0x1234_5678;
        let obs = Observation::simulate(seed, 15, &item, &pool);

        let mut bad_cost = obs;
        bad_cost.costs[2] += 1;
        assert!(!ctx.agrees(seed, &bad_cost));

        let mut missing_clue = obs;
        missing_clue.clues[0] = None;
        assert!(!ctx.agrees(seed, &missing_clue));

        let mut other_clue = obs;
        other_clue.clues[1] = Some(Clue {
            enchantment_id: EnchantmentKind::SilkTouch.id(),
            level: 1,
        });
        assert!(!ctx.agrees(seed, &other_clue));
    }

    #[test]
    fn filtering_keeps_the_true_seed() {
        let pool = EnchantmentPool::vanilla();
        let item = pickaxe();
        let seed = 0x1234_5678;
        let mut set = CandidateSet::new();
        set.populate(seed);

        let obs = Observation::simulate(seed, 15, &item, &pool);
        let before = set.len();
        let outcome = filter(
            &mut set,
            &obs,
            TableContext {
                power: 15,
                item: &item,
                pool: &pool,
            },
        );
        assert!(set.len() <= before);
        assert!(set.contains(seed));
        assert_ne!(outcome, FilterOutcome::Exhausted);
    }
}
