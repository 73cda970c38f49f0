use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enchantment::{EnchantmentInstance, EnchantmentKind};

/// What the user wants out of the table: enchantments that must appear (at
/// least at a given level) and enchantments that must not.
///
/// An outcome satisfies the goal when every requirement is met and nothing
/// forbidden is present. Persisting goals is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Goal {
    required: Vec<EnchantmentInstance>,
    forbidden: Vec<EnchantmentKind>,
}

impl Goal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `enchantment` at `min_level` or better. Requiring the same
    /// enchantment twice keeps the higher level.
    pub fn require(mut self, enchantment: EnchantmentKind, min_level: u8) -> Self {
        self.forbidden.retain(|&e| e != enchantment);
        match self.required.iter_mut().find(|r| r.enchantment == enchantment) {
            Some(existing) => existing.level = existing.level.max(min_level),
            None => self
                .required
                .push(EnchantmentInstance::new(enchantment, min_level)),
        }
        self
    }

    pub fn forbid(mut self, enchantment: EnchantmentKind) -> Self {
        self.required.retain(|r| r.enchantment != enchantment);
        if !self.forbidden.contains(&enchantment) {
            self.forbidden.push(enchantment);
        }
        self
    }

    pub fn required(&self) -> &[EnchantmentInstance] {
        &self.required
    }

    pub fn forbidden(&self) -> &[EnchantmentKind] {
        &self.forbidden
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }

    pub fn is_satisfied_by(&self, outcome: &[EnchantmentInstance]) -> bool {
        let has = |want: &EnchantmentInstance| {
            outcome
                .iter()
                .any(|e| e.enchantment == want.enchantment && e.level >= want.level)
        };
        self.required.iter().all(has)
            && !outcome.iter().any(|e| self.forbidden.contains(&e.enchantment))
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for r in &self.required {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{r}+")?;
        }
        for e in &self.forbidden {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "no {e}")?;
        }
        if first {
            f.write_str("anything")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EnchantmentKind::*;

    fn outcome(list: &[(EnchantmentKind, u8)]) -> Vec<EnchantmentInstance> {
        list.iter()
            .map(|&(e, l)| EnchantmentInstance::new(e, l))
            .collect()
    }

    #[test]
    fn required_levels_are_minimums() {
        let goal = Goal::new().require(Efficiency, 4).require(Unbreaking, 3);
        assert!(goal.is_satisfied_by(&outcome(&[(Efficiency, 5), (Unbreaking, 3)])));
        assert!(!goal.is_satisfied_by(&outcome(&[(Efficiency, 3), (Unbreaking, 3)])));
        assert!(!goal.is_satisfied_by(&outcome(&[(Efficiency, 4)])));
    }

    #[test]
    fn forbidden_entries_veto() {
        let goal = Goal::new().require(Fortune, 1).forbid(SilkTouch);
        assert!(goal.is_satisfied_by(&outcome(&[(Fortune, 2), (Efficiency, 1)])));
        assert!(!goal.is_satisfied_by(&outcome(&[(Fortune, 2), (SilkTouch, 1)])));
    }

    #[test]
    fn later_rules_override_earlier_ones() {
        let goal = Goal::new()
            .require(Sharpness, 2)
            .require(Sharpness, 4)
            .require(Sharpness, 3);
        assert_eq!(goal.required(), &[EnchantmentInstance::new(Sharpness, 4)]);

        let goal = goal.forbid(Sharpness);
        assert!(goal.required().is_empty());
        assert_eq!(goal.forbidden(), &[Sharpness]);
        let goal = goal.require(Sharpness, 1);
        assert!(goal.forbidden().is_empty());
    }

    #[test]
    fn empty_goal_accepts_anything() {
        let goal = Goal::new();
        assert!(goal.is_empty());
        assert!(goal.is_satisfied_by(&[]));
        assert_eq!(goal.to_string(), "anything");
    }
}
