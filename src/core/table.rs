//! Enchanting table power from the surrounding bookshelves.

use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// The block kinds that matter for table power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Block {
    #[default]
    Air,
    Bookshelf,
    /// Non-air blocks that newer authorities let power pass through
    /// (grass, snow layers, water, ...).
    Replaceable,
    Solid,
}

pub trait BlockView {
    fn block(&self, pos: BlockPos) -> Block;
}

/// Unlisted positions are air.
impl BlockView for HashMap<BlockPos, Block> {
    fn block(&self, pos: BlockPos) -> Block {
        self.get(&pos).copied().unwrap_or_default()
    }
}

/// How the authority decides whether a bookshelf is obstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TableEra {
    /// The block between shelf and table, clamped to the inner ring at table
    /// height, must be air.
    Legacy,
    /// The block half way to the shelf, on the shelf's own layer, must be air.
    HalfOffset,
    /// As `HalfOffset`, but any replaceable block also transmits power.
    #[default]
    Transmitter,
}

/// Shelf positions relative to the table: the outer ring of a 5x5 square on
/// the table's layer and the one above it.
pub fn shelf_offsets() -> impl Iterator<Item = (i32, i32, i32)> {
    (0..=1).flat_map(|y| {
        (-2..=2).flat_map(move |z: i32| {
            (-2..=2)
                .filter(move |&x: &i32| x.abs() == 2 || z.abs() == 2)
                .map(move |x| (x, y, z))
        })
    })
}

/// Count of valid bookshelves around `table`. The oracle clamps this to 15.
pub fn enchant_power<V: BlockView + ?Sized>(view: &V, table: BlockPos, era: TableEra) -> u32 {
    shelf_offsets()
        .filter(|&(dx, dy, dz)| {
            if view.block(table.offset(dx, dy, dz)) != Block::Bookshelf {
                return false;
            }
            match era {
                TableEra::Legacy => {
                    let gap = table.offset(dx.clamp(-1, 1), 0, dz.clamp(-1, 1));
                    view.block(gap) == Block::Air
                }
                TableEra::HalfOffset => {
                    view.block(table.offset(dx / 2, dy, dz / 2)) == Block::Air
                }
                TableEra::Transmitter => matches!(
                    view.block(table.offset(dx / 2, dy, dz / 2)),
                    Block::Air | Block::Replaceable
                ),
            }
        })
        .count() as u32
}
