use core::fmt;

use crate::enchantment::EnchantmentInstance;
use crate::lcg::Seed;
use crate::oracle::SLOTS;
use crate::scheduler::SchedulerPhase;
use crate::tracking::{CrackState, PlayerRngState};

/// What the engine knows about one table slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotView {
    /// Not cracked and no clue shown.
    Unknown,
    /// Not cracked yet; the authority revealed one entry.
    Clue(EnchantmentInstance),
    /// Cracked: the full list the slot will give. May be empty.
    Outcome(Vec<EnchantmentInstance>),
}

impl SlotView {
    pub fn enchantments(&self) -> &[EnchantmentInstance] {
        match self {
            Self::Unknown => &[],
            Self::Clue(clue) => core::slice::from_ref(clue),
            Self::Outcome(list) => list,
        }
    }
}

/// Snapshot of the engine, rendered as overlay lines by `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub crack: CrackState,
    pub player: PlayerRngState,
    pub candidates: usize,
    /// The sole candidate once cracked.
    pub seed: Option<Seed>,
    pub power: Option<u32>,
    pub slots: [SlotView; SLOTS],
    pub scheduler: SchedulerPhase,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Enchantment seed: {}", self.crack)?;
        writeln!(f, "Player RNG: {}", self.player)?;
        writeln!(f)?;

        match (self.crack, self.seed) {
            (CrackState::Cracked, Some(seed)) => writeln!(f, "Seed: {:#010x}", seed as u32)?,
            (CrackState::Cracking, _) => writeln!(f, "Possible seeds: {}", self.candidates)?,
            _ => {}
        }
        if let Some(power) = self.power {
            writeln!(f, "Bookshelves: {power}")?;
        }
        match self.scheduler {
            SchedulerPhase::Idle => {}
            SchedulerPhase::Performing { remaining } => {
                writeln!(f, "Manipulating: {remaining} actions left")?
            }
            phase => writeln!(f, "Manipulating: {phase:?}")?,
        }
        writeln!(f)?;

        if self.crack == CrackState::Cracked {
            writeln!(f, "Enchantments:")?;
        } else {
            writeln!(f, "Clues:")?;
        }
        for (i, slot) in self.slots.iter().enumerate() {
            writeln!(f, "Slot {}:", i + 1)?;
            for e in slot.enchantments() {
                writeln!(f, "   {e}")?;
            }
        }
        Ok(())
    }
}
