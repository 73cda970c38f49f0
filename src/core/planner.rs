//! Manipulation planner.
//!
//! Searches for the fewest perturbing actions (item throws) that make the next
//! enchantment seed offer an outcome the caller wants. Priority is fixed:
//! fewer actions first, then lower power, then lower slot.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enchantment::{EnchantmentInstance, EnchantmentPool};
use crate::item::ItemClass;
use crate::lcg::Seed;
use crate::oracle::{self, MAX_POWER, SLOTS};
use crate::tracking::DrivingRng;

/// How many perturbing actions a plan needs before the triggering enchant.
///
/// Ordered so that `NoneNeeded < Actions(0) < Actions(1) < ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionCount {
    /// The table already offers the outcome; enchant now.
    NoneNeeded,
    /// Perform this many actions, then a throwaway enchant, then reopen the table.
    Actions(u32),
}

impl ActionCount {
    /// `-1` for [`ActionCount::NoneNeeded`], otherwise the count.
    pub fn as_raw(self) -> i64 {
        match self {
            Self::NoneNeeded => -1,
            Self::Actions(n) => i64::from(n),
        }
    }
}

impl fmt::Display for ActionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoneNeeded => f.write_str("none needed"),
            Self::Actions(n) => write!(f, "{n} actions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManipulationPlan {
    pub actions: ActionCount,
    /// Bookshelf power the table must have.
    pub power: u32,
    pub slot: usize,
    /// Level cost of `slot` at `power`.
    pub cost: i32,
    /// Enchantment seed the plan relies on.
    pub seed: Seed,
    pub outcome: Vec<EnchantmentInstance>,
}

/// What the planner may start from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSource {
    /// The sole surviving crack candidate, usable with zero actions.
    pub cracked: Option<Seed>,
    /// The exact driving state, needed for any plan with actions.
    pub driving: Option<DrivingRng>,
}

/// Find the first `(actions, power, slot)` whose outcome satisfies `predicate`.
///
/// Returns `None` when nothing within `max_actions` works, which is a normal
/// planning failure and not an error.
pub fn plan<P>(
    source: PlanSource,
    item: &ItemClass,
    pool: &EnchantmentPool,
    max_actions: u32,
    predicate: P,
) -> Option<ManipulationPlan>
where
    P: Fn(&[EnchantmentInstance]) -> bool,
{
    if let Some(seed) = source.cracked {
        if let Some(found) = search_seed(seed, item, pool, &predicate) {
            return Some(found.into_plan(ActionCount::NoneNeeded, seed));
        }
    }

    let mut driving = source.driving?;
    for actions in 0..max_actions {
        let seed = driving.peek_seed();
        if let Some(found) = search_seed(seed, item, pool, &predicate) {
            return Some(found.into_plan(ActionCount::Actions(actions), seed));
        }
        driving.on_perturbing_action();
    }
    None
}

struct Found {
    power: u32,
    slot: usize,
    cost: i32,
    outcome: Vec<EnchantmentInstance>,
}

impl Found {
    fn into_plan(self, actions: ActionCount, seed: Seed) -> ManipulationPlan {
        ManipulationPlan {
            actions,
            power: self.power,
            slot: self.slot,
            cost: self.cost,
            seed,
            outcome: self.outcome,
        }
    }
}

fn search_seed<P>(seed: Seed, item: &ItemClass, pool: &EnchantmentPool, predicate: &P) -> Option<Found>
where
    P: Fn(&[EnchantmentInstance]) -> bool,
{
    for power in 0..=MAX_POWER {
        let costs = oracle::costs(seed, power, item);
        for slot in 0..SLOTS {
            // A zero-cost slot has no offer to take, unless the item can
            // never be enchanted and every slot is zero.
            if costs[slot] <= 0 && item.is_enchantable() {
                continue;
            }
            let outcome = oracle::enchantments(seed, slot, costs[slot], item, pool);
            if predicate(&outcome) {
                return Some(Found {
                    power,
                    slot,
                    cost: costs[slot],
                    outcome,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enchantment::EnchantmentKind;
    use crate::item::CategorySet;

    fn pickaxe() -> ItemClass {
        ItemClass::vanilla("diamond_pickaxe").unwrap()
    }

    #[test]
    fn empty_outcome_on_cracked_candidate_needs_no_actions() {
        let stick = ItemClass::new("stick", 0, CategorySet::EMPTY);
        let source = PlanSource {
            cracked: Some(0x1234_5678),
            driving: None,
        };
        let plan = plan(source, &stick, &EnchantmentPool::vanilla(), 64, |list| list.is_empty())
            .expect("plan");
        assert_eq!(plan.actions, ActionCount::NoneNeeded);
        assert_eq!((plan.power, plan.slot), (0, 0));
        assert_eq!(plan.cost, 0);
        assert!(plan.outcome.is_empty());
    }

    #[test]
    fn nothing_known_means_no_plan() {
        let plan = plan(
            PlanSource::default(),
            &pickaxe(),
            &EnchantmentPool::vanilla(),
            64,
            |_| true,
        );
        assert_eq!(plan, None);
    }

    #[test]
    fn trivial_predicate_takes_lowest_power_and_slot() {
        let driving = DrivingRng::new(0xDEAD_BEEF);
        let plan = plan(
            PlanSource {
                cracked: None,
                driving: Some(driving),
            },
            &pickaxe(),
            &EnchantmentPool::vanilla(),
            8,
            |_| true,
        )
        .unwrap();
        assert_eq!(plan.actions, ActionCount::Actions(0));
        assert_eq!((plan.power, plan.slot), (0, 0));
        assert_eq!(plan.seed, driving.peek_seed());
    }

    #[test]
    fn cracked_candidate_is_tried_before_any_action() {
        let pool = EnchantmentPool::vanilla();
        let item = pickaxe();
        let seed = 0x1234_5678;
        let wanted = oracle::roll_table(seed, 15, &item, &pool).slots[2]
            .enchantments
            .clone();
        let plan = plan(
            PlanSource {
                cracked: Some(seed),
                driving: Some(DrivingRng::new(1)),
            },
            &item,
            &pool,
            16,
            |list| list == wanted.as_slice(),
        )
        .unwrap();
        assert_eq!(plan.actions, ActionCount::NoneNeeded);
        assert_eq!(plan.outcome, wanted);
    }

    #[test]
    fn plan_never_needs_more_actions_than_a_known_solution() {
        let pool = EnchantmentPool::vanilla();
        let item = pickaxe();
        let start = DrivingRng::new(0x0123_4567_89AB);

        for (k, power, slot) in [(0u32, 15u32, 2usize), (3, 8, 1), (11, 15, 2), (40, 12, 0)] {
            let mut rng = start;
            for _ in 0..k {
                rng.on_perturbing_action();
            }
            let seed = rng.peek_seed();
            let cost = oracle::costs(seed, power, &item)[slot];
            let wanted = oracle::enchantments(seed, slot, cost, &item, &pool);

            let plan = plan(
                PlanSource {
                    cracked: None,
                    driving: Some(start),
                },
                &item,
                &pool,
                64,
                |list| list == wanted.as_slice(),
            )
            .unwrap();
            assert!(plan.actions <= ActionCount::Actions(k), "k = {k}");
            assert_eq!(plan.outcome, wanted);
        }
    }

    #[test]
    fn unreachable_goal_reports_no_plan() {
        let pool = EnchantmentPool::vanilla();
        // Silk touch and fortune never roll together.
        let plan = plan(
            PlanSource {
                cracked: None,
                driving: Some(DrivingRng::new(42)),
            },
            &pickaxe(),
            &pool,
            32,
            |list| {
                list.iter().any(|e| e.enchantment == EnchantmentKind::SilkTouch)
                    && list.iter().any(|e| e.enchantment == EnchantmentKind::Fortune)
            },
        );
        assert_eq!(plan, None);
    }

    #[test]
    fn forbid_only_goal_lands_on_a_real_offer() {
        let pool = EnchantmentPool::vanilla();
        let goal = crate::goal::Goal::new().forbid(EnchantmentKind::Efficiency);
        let mut state = 0x5DEE_CE66_Du64;
        for _ in 0..50 {
            state = crate::lcg::advance(state);
            let plan = plan(
                PlanSource {
                    cracked: None,
                    driving: Some(DrivingRng::new(state)),
                },
                &pickaxe(),
                &pool,
                64,
                |list| goal.is_satisfied_by(list),
            )
            .expect("plan");
            assert!(plan.cost > 0, "{plan:?}");
            assert!(!plan.outcome.is_empty());
        }
    }

    #[test]
    fn action_counts_order_by_cost() {
        assert!(ActionCount::NoneNeeded < ActionCount::Actions(0));
        assert!(ActionCount::Actions(2) < ActionCount::Actions(10));
        assert_eq!(ActionCount::NoneNeeded.as_raw(), -1);
        assert_eq!(ActionCount::Actions(7).to_string(), "7 actions");
    }
}
