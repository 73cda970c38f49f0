//! # enchcrack
//!
//! Enchantment seed cracking and manipulation.
//!
//! The authority derives every enchanting table offer from a 32-bit seed drawn
//! from a per-player 48-bit LCG. This crate recovers that seed from what the
//! table shows, recovers the player generator itself from two consecutive
//! seeds, and plans how many item throws steer the next seed to an outcome the
//! user wants.
//!
//! ## Quick Start
//!
//! ```
//! use enchcrack::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let pickaxe = ItemClass::vanilla("diamond_pickaxe").unwrap();
//!
//! // The table opened: the authority revealed bits 4..=15 of the seed,
//! // then the costs and clues of all three slots.
//! let seed = 0x1234_5678;
//! engine.on_cracking_window_opened(seed & 0xFFF0, pickaxe.clone(), 15);
//! let observation = Observation::simulate(seed, 15, &pickaxe, engine.pool());
//! engine.on_observation_round(observation).unwrap();
//!
//! assert_eq!(engine.crack_state(), CrackState::Cracking);
//! assert!(engine.candidates().contains(seed));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialization/deserialization
//! - `parallel`: Filter candidates on all cores via rayon
//!
//! ## Modules
//!
//! - [`lcg`]: The 48-bit generator
//! - [`oracle`]: Table costs and enchantment lists for a seed
//! - [`candidates`], [`filter`]: Brute-force seed search
//! - [`recovery`]: Generator state from two seeds
//! - [`planner`], [`scheduler`]: Manipulation
//! - [`engine`]: The session object tying it together

#[path = "core/lcg.rs"]
pub mod lcg;

#[path = "core/item.rs"]
pub mod item;

#[path = "core/enchantment.rs"]
pub mod enchantment;

#[path = "core/oracle.rs"]
pub mod oracle;

#[path = "core/candidates.rs"]
pub mod candidates;

#[path = "core/filter.rs"]
pub mod filter;

#[path = "core/recovery.rs"]
pub mod recovery;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/tracking.rs"]
pub mod tracking;

#[path = "core/planner.rs"]
pub mod planner;

#[path = "core/scheduler.rs"]
pub mod scheduler;

#[path = "core/table.rs"]
pub mod table;

#[path = "core/goal.rs"]
pub mod goal;

pub mod engine;

/// Prelude module for convenient imports.
///
/// ```
/// use enchcrack::prelude::*;
/// ```
pub mod prelude {
    pub use crate::enchantment::{EnchantmentInstance, EnchantmentKind, EnchantmentPool};
    pub use crate::engine::{Engine, EngineConfig, RoundOutcome, SlotView, StatusReport};
    pub use crate::error::Contradiction;
    pub use crate::filter::{Clue, Observation};
    pub use crate::goal::Goal;
    pub use crate::item::{Category, CategorySet, ItemClass};
    pub use crate::lcg::Seed;
    pub use crate::planner::{ActionCount, ManipulationPlan};
    pub use crate::scheduler::{Readiness, StepOutcome, World};
    pub use crate::table::{enchant_power, Block, BlockPos, BlockView, TableEra};
    pub use crate::tracking::{CrackState, PlayerRngState};
}
