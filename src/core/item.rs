//! Item classes as the enchanting table sees them: an enchantability value and
//! the set of enchantment categories the item belongs to.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Category {
    Armor,
    ArmorFeet,
    ArmorLegs,
    ArmorChest,
    ArmorHead,
    Weapon,
    Digger,
    FishingRod,
    Trident,
    Breakable,
    Bow,
    Wearable,
    Crossbow,
    Vanishable,
}

impl Category {
    const fn bit(self) -> u16 {
        1 << self as u8
    }
}

/// Small bitset of [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategorySet(u16);

impl CategorySet {
    pub const EMPTY: Self = Self(0);

    pub const fn of(categories: &[Category]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < categories.len() {
            bits |= categories[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub const fn with(self, category: Category) -> Self {
        Self(self.0 | category.bit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemClass {
    name: String,
    enchantability: i32,
    categories: CategorySet,
    book: bool,
}

impl ItemClass {
    pub fn new(name: impl Into<String>, enchantability: i32, categories: CategorySet) -> Self {
        Self {
            name: name.into(),
            enchantability,
            categories,
            book: false,
        }
    }

    /// A book: accepts every discoverable enchantment, and loses one entry
    /// when the table rolls more than one.
    pub fn book() -> Self {
        Self {
            name: "book".to_string(),
            enchantability: 1,
            categories: CategorySet::EMPTY,
            book: true,
        }
    }

    /// Look up a vanilla enchantable item by its registry name.
    pub fn vanilla(name: &str) -> Option<Self> {
        let name = name.strip_prefix("minecraft:").unwrap_or(name);
        if name == "book" {
            return Some(Self::book());
        }

        use Category::*;
        let (material, kind) = name.split_once('_').unwrap_or(("", name));
        let (enchantability, categories) = match kind {
            "sword" | "pickaxe" | "axe" | "shovel" | "hoe" => {
                let ench = match material {
                    "wooden" => 15,
                    "stone" => 5,
                    "iron" => 14,
                    "golden" => 22,
                    "diamond" => 10,
                    "netherite" => 15,
                    _ => return None,
                };
                let primary = if kind == "sword" { Weapon } else { Digger };
                (ench, CategorySet::of(&[primary, Breakable, Vanishable]))
            }
            "helmet" | "chestplate" | "leggings" | "boots" => {
                let ench = match material {
                    "leather" => 15,
                    "chainmail" => 12,
                    "iron" => 9,
                    "golden" => 25,
                    "diamond" => 10,
                    "netherite" => 15,
                    "turtle" if kind == "helmet" => 9,
                    _ => return None,
                };
                let slot = match kind {
                    "helmet" => ArmorHead,
                    "chestplate" => ArmorChest,
                    "leggings" => ArmorLegs,
                    _ => ArmorFeet,
                };
                (
                    ench,
                    CategorySet::of(&[Armor, slot, Breakable, Wearable, Vanishable]),
                )
            }
            _ => match name {
                "bow" => (1, CategorySet::of(&[Bow, Breakable, Vanishable])),
                "crossbow" => (1, CategorySet::of(&[Crossbow, Breakable, Vanishable])),
                "trident" => (1, CategorySet::of(&[Trident, Breakable, Vanishable])),
                "fishing_rod" => (1, CategorySet::of(&[FishingRod, Breakable, Vanishable])),
                _ => return None,
            },
        };
        Some(Self::new(name, enchantability, categories))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enchantability(&self) -> i32 {
        self.enchantability
    }

    pub fn categories(&self) -> CategorySet {
        self.categories
    }

    pub fn is_book(&self) -> bool {
        self.book
    }

    /// Items with no enchantability never get a table offer.
    pub fn is_enchantable(&self) -> bool {
        self.enchantability > 0
    }
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_lookup() {
        let pick = ItemClass::vanilla("minecraft:diamond_pickaxe").unwrap();
        assert_eq!(pick.enchantability(), 10);
        assert!(pick.categories().contains(Category::Digger));
        assert!(!pick.categories().contains(Category::Weapon));

        let boots = ItemClass::vanilla("golden_boots").unwrap();
        assert_eq!(boots.enchantability(), 25);
        assert!(boots.categories().contains(Category::ArmorFeet));
        assert!(boots.categories().contains(Category::Armor));

        assert_eq!(ItemClass::vanilla("turtle_helmet").unwrap().enchantability(), 9);
        assert!(ItemClass::vanilla("turtle_boots").is_none());
        assert!(ItemClass::vanilla("fishing_rod").is_some());
        assert!(ItemClass::vanilla("stick").is_none());
    }

    #[test]
    fn book_is_special() {
        let book = ItemClass::book();
        assert!(book.is_book());
        assert!(book.is_enchantable());
        assert_eq!(ItemClass::vanilla("book"), Some(book));
    }

    #[test]
    fn category_set_membership() {
        let set = CategorySet::EMPTY.with(Category::Bow);
        assert!(set.contains(Category::Bow));
        assert!(!set.contains(Category::Crossbow));
    }
}
