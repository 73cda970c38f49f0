//! enchsim - Enchantment cracking session simulator
//!
//! Plays a vanilla server against the cracking engine for one full session:
//! - crack two consecutive enchantment seeds from table offers
//! - recover the player generator from them
//! - plan and perform item throws until the table offers the goal
//! - take the offer and check it matches the prediction
//!
//! Config is read from the path given as the first argument, or from
//! `<config dir>/enchcrack/enchsim.json`. A missing file means defaults.

use std::fs;
use std::path::PathBuf;

use enchcrack::enchantment::EnchantmentInstance;
use enchcrack::engine::{Engine, RoundOutcome};
use enchcrack::error::Contradiction;
use enchcrack::item::ItemClass;
use enchcrack::planner::ManipulationPlan;
use enchcrack::scheduler::StepOutcome;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

mod authority;
mod config;
mod paths;

use authority::Authority;
use config::SimConfig;
use paths::AppPaths;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(&'static str),

    #[error("could not determine the {0} directory")]
    NoAppDir(&'static str),

    #[error("unknown or unenchantable item {0:?}")]
    UnknownItem(String),

    #[error(transparent)]
    Contradiction(#[from] Contradiction),

    #[error("seed still ambiguous after {0} rounds")]
    NotConverged(usize),

    #[error("scheduler did not finish within {0} ticks")]
    Stalled(u32),

    #[error("slot {0} has no offer")]
    NoOffer(usize),

    #[error("engine disagrees with the server: {0}")]
    Mismatch(&'static str),
}

/// What happened, saved as JSON after each run.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub player_seed: i64,
    /// Seeds cracked by brute force, in order.
    pub cracked: Vec<u32>,
    pub rounds: usize,
    pub driving_state: Option<u64>,
    pub plan: Option<ManipulationPlan>,
    pub throws: u32,
    pub ticks: u32,
    pub result: Vec<EnchantmentInstance>,
    pub goal_met: bool,
}

fn item(name: &str) -> Result<ItemClass, SimError> {
    ItemClass::vanilla(name)
        .filter(ItemClass::is_enchantable)
        .ok_or_else(|| SimError::UnknownItem(name.to_string()))
}

struct Session<'a> {
    cfg: &'a SimConfig,
    engine: Engine,
    server: Authority,
    crack_items: Vec<ItemClass>,
    target: ItemClass,
    cracked: Vec<u32>,
    rounds: usize,
}

impl<'a> Session<'a> {
    fn new(cfg: &'a SimConfig) -> Result<Self, SimError> {
        cfg.validate()?;
        let crack_items = cfg
            .crack_items
            .iter()
            .map(|n| item(n))
            .collect::<Result<Vec<_>, _>>()?;
        let target = item(&cfg.target_item)?;

        let mut server = Authority::new(cfg.player_seed, cfg.era);
        server.set_bookshelves(cfg.bookshelves);

        Ok(Self {
            cfg,
            engine: Engine::new(cfg.engine),
            server,
            crack_items,
            target,
            cracked: Vec::new(),
            rounds: 0,
        })
    }

    /// Open the table with each crack item in turn until the seed is known.
    fn crack(&mut self) -> Result<RoundOutcome, SimError> {
        for it in &self.crack_items {
            let (masked, obs) = self.server.open_table(it, self.engine.pool());
            self.engine
                .on_cracking_window_opened(masked, it.clone(), self.server.power());
            self.rounds += 1;
            match self.engine.on_observation_round(obs)? {
                RoundOutcome::Narrowed(n) => debug!(item = %it, candidates = n, "round"),
                out => {
                    if let Some(seed) = self.engine.cracked_seed() {
                        self.cracked.push(seed as u32);
                    }
                    return Ok(out);
                }
            }
        }
        Err(SimError::NotConverged(self.crack_items.len()))
    }

    /// Take the cheapest offer on the first crack item.
    fn throwaway_enchant(&mut self) -> Result<(), SimError> {
        let it = &self.crack_items[0];
        self.server.enchant(it, 0, self.engine.pool())?;
        self.engine.on_outcome_confirmed();
        Ok(())
    }

    fn recover(&mut self) -> Result<u64, SimError> {
        self.engine.start_player_tracking();
        self.crack()?;
        self.throwaway_enchant()?;

        let RoundOutcome::Recovered { driving_state, .. } = self.crack()? else {
            return Err(SimError::Mismatch("second crack did not recover the player RNG"));
        };
        if driving_state != self.server.player_state() {
            return Err(SimError::Mismatch("recovered player RNG state"));
        }
        info!("Player RNG recovered after {} rounds", self.rounds);
        Ok(driving_state)
    }

    /// Run the plan through the scheduler. Returns ticks spent.
    fn perform(&mut self) -> Result<u32, SimError> {
        for ticks in 1..=self.cfg.max_ticks {
            let step = self.engine.tick(&mut self.server);
            if self.server.take_trigger() {
                self.throwaway_enchant()?;
            }
            match step {
                StepOutcome::Reported => return Ok(ticks),
                StepOutcome::Idle | StepOutcome::ReportSkipped | StepOutcome::Cancelled => {
                    return Err(SimError::Mismatch("manipulation stopped before the table was ready"));
                }
                _ => {}
            }
        }
        Err(SimError::Stalled(self.cfg.max_ticks))
    }

    fn run(mut self) -> Result<SessionSummary, SimError> {
        let driving_state = self.recover()?;

        let cfg = self.cfg;
        info!("Planning for {} on {}", cfg.goal, self.target);
        let found = self
            .engine
            .plan_manipulation(&self.target, |l| cfg.goal.is_satisfied_by(l), false);
        let Some(plan) = found else {
            info!("No manipulation reaches the goal");
            return Ok(self.summary(Some(driving_state), None, 0, Vec::new()));
        };

        let ticks = self.perform()?;
        if self.server.take_ready().as_ref() != Some(&plan) {
            return Err(SimError::Mismatch("reported plan"));
        }

        self.server.set_bookshelves(plan.power);
        let (masked, obs) = self.server.open_table(&self.target, self.engine.pool());
        self.engine
            .on_cracking_window_opened(masked, self.target.clone(), self.server.power());
        if self.engine.cracked_seed() != Some(self.server.seed()) {
            return Err(SimError::Mismatch("predicted enchantment seed"));
        }
        if obs.costs[plan.slot] != plan.cost {
            return Err(SimError::Mismatch("slot cost"));
        }

        let result = self
            .server
            .enchant(&self.target, plan.slot, self.engine.pool())?;
        self.engine.on_outcome_confirmed();
        if result != plan.outcome {
            return Err(SimError::Mismatch("enchantment result"));
        }

        let names: Vec<String> = result.iter().map(ToString::to_string).collect();
        info!("Enchanted {}: {}", self.target, names.join(", "));
        info!("\n{}", self.engine.status());
        Ok(self.summary(Some(driving_state), Some(plan), ticks, result))
    }

    fn summary(
        &self,
        driving_state: Option<u64>,
        plan: Option<ManipulationPlan>,
        ticks: u32,
        result: Vec<EnchantmentInstance>,
    ) -> SessionSummary {
        SessionSummary {
            player_seed: self.cfg.player_seed,
            cracked: self.cracked.clone(),
            rounds: self.rounds,
            driving_state,
            goal_met: plan.is_some() && self.cfg.goal.is_satisfied_by(&result),
            plan,
            throws: self.server.throws(),
            ticks,
            result,
        }
    }
}

pub fn run(cfg: &SimConfig) -> Result<SessionSummary, SimError> {
    Session::new(cfg)?.run()
}

fn main() -> Result<(), SimError> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let paths = AppPaths::new()?;
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| paths.config_file());
    let cfg = SimConfig::load(&config_path)?;

    let summary = match run(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!("Session failed: {}", e);
            return Err(e);
        }
    };

    if cfg.save_session {
        paths.ensure_data_dir()?;
        let file = paths.session_file();
        fs::write(&file, serde_json::to_string_pretty(&summary)?)?;
        info!("Session saved to {:?}", file);
    }
    Ok(())
}
