use std::fs;
use std::path::Path;

use enchcrack::engine::EngineConfig;
use enchcrack::enchantment::EnchantmentKind;
use enchcrack::goal::Goal;
use enchcrack::table::TableEra;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::SimError;

fn default_player_seed() -> i64 {
    0x2F00_DCBA
}

fn default_bookshelves() -> u32 {
    15
}

fn default_crack_items() -> Vec<String> {
    [
        "diamond_pickaxe",
        "book",
        "iron_sword",
        "golden_chestplate",
        "bow",
        "fishing_rod",
        "trident",
        "leather_boots",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_target_item() -> String {
    "diamond_pickaxe".to_string()
}

fn default_goal() -> Goal {
    Goal::new()
        .require(EnchantmentKind::Efficiency, 4)
        .require(EnchantmentKind::Unbreaking, 3)
}

fn default_max_ticks() -> u32 {
    1 << 16
}

fn default_save_session() -> bool {
    true
}

/// Simulator settings, read from `enchsim.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed of the simulated player's generator, scrambled like a fresh
    /// `java.util.Random`.
    #[serde(default = "default_player_seed")]
    pub player_seed: i64,

    /// Bookshelves around the table while cracking.
    #[serde(default = "default_bookshelves")]
    pub bookshelves: u32,

    #[serde(default)]
    pub era: TableEra,

    /// Items put on the table, in turn, until a seed cracks.
    #[serde(default = "default_crack_items")]
    pub crack_items: Vec<String>,

    #[serde(default = "default_target_item")]
    pub target_item: String,

    #[serde(default = "default_goal")]
    pub goal: Goal,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Give up on the scheduler after this many ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,

    #[serde(default = "default_save_session")]
    pub save_session: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_seed: default_player_seed(),
            bookshelves: default_bookshelves(),
            era: TableEra::default(),
            crack_items: default_crack_items(),
            target_item: default_target_item(),
            goal: default_goal(),
            engine: EngineConfig::default(),
            max_ticks: default_max_ticks(),
            save_session: default_save_session(),
        }
    }
}

impl SimConfig {
    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        if !path.exists() {
            info!("No config at {:?}; using defaults", path);
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let cfg = Self::from_json(&text)?;
        info!("Loaded config from {:?}", path);
        Ok(cfg)
    }

    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.engine.validate().map_err(SimError::Config)?;
        if self.crack_items.is_empty() {
            return Err(SimError::Config("crack_items must not be empty"));
        }
        if self.bookshelves > 32 {
            return Err(SimError::Config("bookshelves must be <= 32"));
        }
        if self.max_ticks == 0 {
            return Err(SimError::Config("max_ticks must be > 0"));
        }
        Ok(())
    }
}
