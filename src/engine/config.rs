#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Upper bound on perturbing actions the planner will consider. Doubles as
    /// the planning timeout.
    pub max_item_throws: u32,

    /// Start tracking the driving generator from the very first confirmed
    /// outcome, even when nothing is known about it yet.
    pub prediction_enabled: bool,
}

impl Default for EngineConfig {
    /// 64 stacks of 256 items.
    fn default() -> Self {
        Self {
            max_item_throws: 64 * 256,
            prediction_enabled: false,
        }
    }
}

impl EngineConfig {
    pub const MAX_ITEM_THROWS: u32 = 1 << 20;

    pub fn with_max_item_throws(mut self, throws: u32) -> Self {
        self.max_item_throws = throws;
        self
    }

    pub fn with_prediction(mut self, enabled: bool) -> Self {
        self.prediction_enabled = enabled;
        self
    }

    /// Validate the configuration, returning an error message if invalid.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_item_throws == 0 {
            return Err("max_item_throws must be > 0");
        }
        if self.max_item_throws > Self::MAX_ITEM_THROWS {
            return Err("max_item_throws too large");
        }
        Ok(())
    }
}
