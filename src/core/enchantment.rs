//! Enchantment registry as the authority defines it.
//!
//! Registry order matters: the numeric id reported in table clues is the
//! position in [`EnchantmentKind::ALL`], and candidate pools are walked in that
//! order when weighted draws are made.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::item::{Category, ItemClass};

/// Cost curve over enchantment levels (levels start at 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    /// `base + step * (level - 1)`
    Linear { base: i32, step: i32 },
    /// Fixed span above the minimum cost of the same level.
    AboveMin(i32),
}

const fn lin(base: i32, step: i32) -> Cost {
    Cost::Linear { base, step }
}

// Max cost shared by several enchantments: the generic minimum cost
// `1 + 10 * level` plus 50.
const GENERIC_MAX: Cost = lin(61, 10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum EnchantmentKind {
    Protection,
    FireProtection,
    FeatherFalling,
    BlastProtection,
    ProjectileProtection,
    Respiration,
    AquaAffinity,
    Thorns,
    DepthStrider,
    FrostWalker,
    BindingCurse,
    SoulSpeed,
    SwiftSneak,
    Sharpness,
    Smite,
    BaneOfArthropods,
    Knockback,
    FireAspect,
    Looting,
    SweepingEdge,
    Efficiency,
    SilkTouch,
    Unbreaking,
    Fortune,
    Power,
    Punch,
    Flame,
    Infinity,
    LuckOfTheSea,
    Lure,
    Loyalty,
    Impaling,
    Riptide,
    Channeling,
    Multishot,
    QuickCharge,
    Piercing,
    Mending,
    VanishingCurse,
}

struct Properties {
    key: &'static str,
    weight: i32,
    category: Category,
    max_level: u8,
    min_cost: Cost,
    max_cost: Cost,
    treasure: bool,
    discoverable: bool,
}

const fn props(
    key: &'static str,
    weight: i32,
    category: Category,
    max_level: u8,
    min_cost: Cost,
    max_cost: Cost,
) -> Properties {
    Properties {
        key,
        weight,
        category,
        max_level,
        min_cost,
        max_cost,
        treasure: false,
        discoverable: true,
    }
}

const fn treasure(p: Properties) -> Properties {
    Properties { treasure: true, ..p }
}

const fn undiscoverable(p: Properties) -> Properties {
    Properties {
        discoverable: false,
        ..p
    }
}

impl EnchantmentKind {
    pub const ALL: [EnchantmentKind; 39] = [
        Self::Protection,
        Self::FireProtection,
        Self::FeatherFalling,
        Self::BlastProtection,
        Self::ProjectileProtection,
        Self::Respiration,
        Self::AquaAffinity,
        Self::Thorns,
        Self::DepthStrider,
        Self::FrostWalker,
        Self::BindingCurse,
        Self::SoulSpeed,
        Self::SwiftSneak,
        Self::Sharpness,
        Self::Smite,
        Self::BaneOfArthropods,
        Self::Knockback,
        Self::FireAspect,
        Self::Looting,
        Self::SweepingEdge,
        Self::Efficiency,
        Self::SilkTouch,
        Self::Unbreaking,
        Self::Fortune,
        Self::Power,
        Self::Punch,
        Self::Flame,
        Self::Infinity,
        Self::LuckOfTheSea,
        Self::Lure,
        Self::Loyalty,
        Self::Impaling,
        Self::Riptide,
        Self::Channeling,
        Self::Multishot,
        Self::QuickCharge,
        Self::Piercing,
        Self::Mending,
        Self::VanishingCurse,
    ];

    const fn properties(self) -> Properties {
        use Category::*;
        match self {
            Self::Protection => props("protection", 10, Armor, 4, lin(1, 11), Cost::AboveMin(11)),
            Self::FireProtection => {
                props("fire_protection", 5, Armor, 4, lin(10, 8), Cost::AboveMin(8))
            }
            Self::FeatherFalling => {
                props("feather_falling", 5, ArmorFeet, 4, lin(5, 6), Cost::AboveMin(6))
            }
            Self::BlastProtection => {
                props("blast_protection", 2, Armor, 4, lin(5, 8), Cost::AboveMin(8))
            }
            Self::ProjectileProtection => props(
                "projectile_protection",
                5,
                Armor,
                4,
                lin(3, 6),
                Cost::AboveMin(6),
            ),
            Self::Respiration => {
                props("respiration", 2, ArmorHead, 3, lin(10, 10), Cost::AboveMin(30))
            }
            Self::AquaAffinity => {
                props("aqua_affinity", 2, ArmorHead, 1, lin(1, 0), Cost::AboveMin(40))
            }
            Self::Thorns => props("thorns", 1, ArmorChest, 3, lin(10, 20), GENERIC_MAX),
            Self::DepthStrider => {
                props("depth_strider", 2, ArmorFeet, 3, lin(10, 10), Cost::AboveMin(15))
            }
            Self::FrostWalker => treasure(props(
                "frost_walker",
                2,
                ArmorFeet,
                2,
                lin(10, 10),
                Cost::AboveMin(15),
            )),
            Self::BindingCurse => {
                treasure(props("binding_curse", 1, Wearable, 1, lin(25, 0), lin(50, 0)))
            }
            Self::SoulSpeed => undiscoverable(treasure(props(
                "soul_speed",
                1,
                ArmorFeet,
                3,
                lin(10, 10),
                Cost::AboveMin(15),
            ))),
            Self::SwiftSneak => undiscoverable(treasure(props(
                "swift_sneak",
                1,
                ArmorLegs,
                3,
                lin(25, 25),
                Cost::AboveMin(50),
            ))),
            Self::Sharpness => props("sharpness", 10, Weapon, 5, lin(1, 11), Cost::AboveMin(20)),
            Self::Smite => props("smite", 5, Weapon, 5, lin(5, 8), Cost::AboveMin(20)),
            Self::BaneOfArthropods => {
                props("bane_of_arthropods", 5, Weapon, 5, lin(5, 8), Cost::AboveMin(20))
            }
            Self::Knockback => props("knockback", 5, Weapon, 2, lin(5, 20), GENERIC_MAX),
            Self::FireAspect => props("fire_aspect", 2, Weapon, 2, lin(10, 20), GENERIC_MAX),
            Self::Looting => props("looting", 2, Weapon, 3, lin(15, 9), GENERIC_MAX),
            Self::SweepingEdge => {
                props("sweeping", 2, Weapon, 3, lin(5, 9), Cost::AboveMin(15))
            }
            Self::Efficiency => props("efficiency", 10, Digger, 5, lin(1, 10), GENERIC_MAX),
            Self::SilkTouch => props("silk_touch", 1, Digger, 1, lin(15, 0), GENERIC_MAX),
            Self::Unbreaking => props("unbreaking", 5, Breakable, 3, lin(5, 8), GENERIC_MAX),
            Self::Fortune => props("fortune", 2, Digger, 3, lin(15, 9), GENERIC_MAX),
            Self::Power => props("power", 10, Bow, 5, lin(1, 10), Cost::AboveMin(15)),
            Self::Punch => props("punch", 2, Bow, 2, lin(12, 20), Cost::AboveMin(25)),
            Self::Flame => props("flame", 2, Bow, 1, lin(20, 0), lin(50, 0)),
            Self::Infinity => props("infinity", 1, Bow, 1, lin(20, 0), lin(50, 0)),
            Self::LuckOfTheSea => {
                props("luck_of_the_sea", 2, FishingRod, 3, lin(15, 9), GENERIC_MAX)
            }
            Self::Lure => props("lure", 2, FishingRod, 3, lin(15, 9), GENERIC_MAX),
            Self::Loyalty => props("loyalty", 5, Trident, 3, lin(12, 7), lin(50, 0)),
            Self::Impaling => props("impaling", 2, Trident, 5, lin(1, 8), Cost::AboveMin(20)),
            Self::Riptide => props("riptide", 2, Trident, 3, lin(17, 7), lin(50, 0)),
            Self::Channeling => props("channeling", 1, Trident, 1, lin(25, 0), lin(50, 0)),
            Self::Multishot => props("multishot", 2, Crossbow, 1, lin(20, 0), lin(50, 0)),
            Self::QuickCharge => props("quick_charge", 5, Crossbow, 3, lin(12, 20), lin(50, 0)),
            Self::Piercing => props("piercing", 10, Crossbow, 4, lin(1, 10), lin(50, 0)),
            Self::Mending => treasure(props(
                "mending",
                2,
                Breakable,
                1,
                lin(25, 25),
                Cost::AboveMin(50),
            )),
            Self::VanishingCurse => {
                treasure(props("vanishing_curse", 1, Vanishable, 1, lin(25, 0), lin(50, 0)))
            }
        }
    }

    /// Registry id as reported in table clues.
    #[inline]
    pub const fn id(self) -> i32 {
        self as u8 as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.strip_prefix("minecraft:").unwrap_or(key);
        Self::ALL.iter().copied().find(|e| e.key() == key)
    }

    pub const fn key(self) -> &'static str {
        self.properties().key
    }

    pub const fn weight(self) -> i32 {
        self.properties().weight
    }

    pub const fn category(self) -> Category {
        self.properties().category
    }

    pub const fn max_level(self) -> u8 {
        self.properties().max_level
    }

    pub const fn is_treasure(self) -> bool {
        self.properties().treasure
    }

    pub const fn is_discoverable(self) -> bool {
        self.properties().discoverable
    }

    pub const fn is_curse(self) -> bool {
        matches!(self, Self::BindingCurse | Self::VanishingCurse)
    }

    pub const fn min_cost(self, level: u8) -> i32 {
        match self.properties().min_cost {
            Cost::Linear { base, step } => base + step * (level as i32 - 1),
            // Minimum costs are always linear.
            Cost::AboveMin(span) => span,
        }
    }

    pub const fn max_cost(self, level: u8) -> i32 {
        match self.properties().max_cost {
            Cost::Linear { base, step } => base + step * (level as i32 - 1),
            Cost::AboveMin(span) => self.min_cost(level) + span,
        }
    }

    /// Whether this enchantment may be offered for `item` at the table.
    pub fn can_enchant(self, item: &ItemClass) -> bool {
        item.is_book() || item.categories().contains(self.category())
    }

    fn protection_family(self) -> bool {
        matches!(
            self,
            Self::Protection
                | Self::FireProtection
                | Self::FeatherFalling
                | Self::BlastProtection
                | Self::ProjectileProtection
        )
    }

    fn damage_family(self) -> bool {
        matches!(self, Self::Sharpness | Self::Smite | Self::BaneOfArthropods)
    }

    fn accepts(self, other: Self) -> bool {
        if self == other {
            return false;
        }
        if self.protection_family() && other.protection_family() {
            return self == Self::FeatherFalling || other == Self::FeatherFalling;
        }
        if self.damage_family() && other.damage_family() {
            return false;
        }
        !matches!(
            (self, other),
            (Self::SilkTouch, Self::Fortune)
                | (Self::Fortune, Self::SilkTouch)
                | (Self::Infinity, Self::Mending)
                | (Self::Multishot, Self::Piercing)
                | (Self::Piercing, Self::Multishot)
                | (Self::Riptide, Self::Loyalty | Self::Channeling)
                | (Self::DepthStrider, Self::FrostWalker)
                | (Self::FrostWalker, Self::DepthStrider)
        )
    }

    /// Symmetric compatibility. An enchantment is never compatible with itself.
    pub fn is_compatible_with(self, other: Self) -> bool {
        self.accepts(other) && other.accepts(self)
    }
}

impl fmt::Display for EnchantmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One enchantment at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnchantmentInstance {
    pub enchantment: EnchantmentKind,
    pub level: u8,
}

impl EnchantmentInstance {
    pub const fn new(enchantment: EnchantmentKind, level: u8) -> Self {
        Self { enchantment, level }
    }

    pub fn weight(&self) -> i32 {
        self.enchantment.weight()
    }
}

impl fmt::Display for EnchantmentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.enchantment, roman(self.level))
    }
}

fn roman(level: u8) -> &'static str {
    match level {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        _ => "?",
    }
}

/// The enchantments the authority draws from, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnchantmentPool {
    entries: Vec<EnchantmentKind>,
}

impl EnchantmentPool {
    pub fn vanilla() -> Self {
        Self {
            entries: EnchantmentKind::ALL.to_vec(),
        }
    }

    /// Drop an enchantment the authority never offers.
    pub fn without(mut self, kind: EnchantmentKind) -> Self {
        self.entries.retain(|&e| e != kind);
        self
    }

    pub fn contains(&self, kind: EnchantmentKind) -> bool {
        self.entries.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = EnchantmentKind> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EnchantmentPool {
    fn default() -> Self {
        Self::vanilla()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_registry_order() {
        for (i, e) in EnchantmentKind::ALL.iter().enumerate() {
            assert_eq!(e.id(), i as i32);
            assert_eq!(EnchantmentKind::from_id(i as i32), Some(*e));
        }
        assert_eq!(EnchantmentKind::from_id(-1), None);
        assert_eq!(EnchantmentKind::from_id(39), None);
        assert_eq!(EnchantmentKind::Efficiency.id(), 20);
    }

    #[test]
    fn keys_round_trip() {
        for e in EnchantmentKind::ALL {
            assert_eq!(EnchantmentKind::from_key(e.key()), Some(e));
        }
        assert_eq!(
            EnchantmentKind::from_key("minecraft:silk_touch"),
            Some(EnchantmentKind::SilkTouch)
        );
        assert_eq!(EnchantmentKind::from_key("sharpness_vi"), None);
    }

    #[test]
    fn cost_curves() {
        use EnchantmentKind::*;
        assert_eq!(Protection.min_cost(4), 34);
        assert_eq!(Protection.max_cost(4), 45);
        assert_eq!(Efficiency.min_cost(5), 41);
        assert_eq!(Efficiency.max_cost(5), 101);
        assert_eq!(Loyalty.min_cost(1), 12);
        assert_eq!(Riptide.min_cost(3), 31);
        assert_eq!(Mending.min_cost(1), 25);
        assert_eq!(Mending.max_cost(1), 75);
        assert_eq!(AquaAffinity.max_cost(1), 41);
    }

    #[test]
    fn compatibility_rules_are_symmetric() {
        use EnchantmentKind::*;
        for a in EnchantmentKind::ALL {
            assert!(!a.is_compatible_with(a));
            for b in EnchantmentKind::ALL {
                assert_eq!(a.is_compatible_with(b), b.is_compatible_with(a));
            }
        }
        assert!(!Protection.is_compatible_with(FireProtection));
        assert!(Protection.is_compatible_with(FeatherFalling));
        assert!(!Sharpness.is_compatible_with(Smite));
        assert!(!SilkTouch.is_compatible_with(Fortune));
        assert!(!Infinity.is_compatible_with(Mending));
        assert!(!Riptide.is_compatible_with(Channeling));
        assert!(Loyalty.is_compatible_with(Channeling));
        assert!(Efficiency.is_compatible_with(Unbreaking));
    }

    #[test]
    fn pool_filtering_keeps_order() {
        let pool = EnchantmentPool::vanilla().without(EnchantmentKind::Mending);
        assert_eq!(pool.len(), 38);
        assert!(!pool.contains(EnchantmentKind::Mending));
        let ids: Vec<i32> = pool.iter().map(EnchantmentKind::id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn display_uses_roman_levels() {
        let e = EnchantmentInstance::new(EnchantmentKind::Efficiency, 4);
        assert_eq!(e.to_string(), "efficiency IV");
    }
}
