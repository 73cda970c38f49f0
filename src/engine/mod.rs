//! The session engine: one value that owns every piece of cracking state and
//! routes observations, confirmations and ticks through it.
//!
//! Observations and ticks interleave at method boundaries only. Every handler
//! takes `&mut self`, so a filtering pass and a planner search can never run
//! over the candidate set at the same time.

mod config;
mod status;

pub use config::EngineConfig;
pub use status::{SlotView, StatusReport};

use tracing::{debug, info, warn};

use crate::candidates::CandidateSet;
use crate::enchantment::{EnchantmentInstance, EnchantmentKind, EnchantmentPool};
use crate::error::Contradiction;
use crate::filter::{self, FilterOutcome, Observation, TableContext};
use crate::item::ItemClass;
use crate::lcg::{advance, Seed};
use crate::oracle::{self, SLOTS};
use crate::planner::{self, ActionCount, ManipulationPlan, PlanSource};
use crate::recovery::recover_state;
use crate::scheduler::{Progress, Scheduler, SchedulerPhase, StepOutcome, World};
use crate::tracking::{CrackState, DrivingRng, Effect, Event, PlayerRngState, Tracking};

/// The table the user currently has open.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableWindow {
    masked: Seed,
    item: ItemClass,
    power: u32,
}

/// What one observation round did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Not used: already cracked, no table open, or the item cannot be enchanted.
    Ignored,
    /// More than one candidate is still consistent.
    Narrowed(usize),
    Cracked(Seed),
    /// Cracked, and the seed completed a pair that pinned the driving state.
    Recovered { seed: Seed, driving_state: u64 },
}

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    pool: EnchantmentPool,
    tracking: Tracking,
    candidates: CandidateSet,
    window: Option<TableWindow>,
    observation: Option<Observation>,
    first_seed: Option<Seed>,
    driving: Option<DrivingRng>,
    scheduler: Scheduler,
    outcome_confirmed: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pool: EnchantmentPool::vanilla(),
            tracking: Tracking::default(),
            candidates: CandidateSet::new(),
            window: None,
            observation: None,
            first_seed: None,
            driving: None,
            scheduler: Scheduler::new(),
            outcome_confirmed: false,
        }
    }

    /// Use a non-vanilla enchantment pool (e.g. a server with some disabled).
    pub fn with_pool(mut self, pool: EnchantmentPool) -> Self {
        self.pool = pool;
        self
    }

    // ---------------------------------------------------------------------
    // Queries

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> &EnchantmentPool {
        &self.pool
    }

    pub fn crack_state(&self) -> CrackState {
        self.tracking.crack
    }

    pub fn player_state(&self) -> PlayerRngState {
        self.tracking.player
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// The cracked enchantment seed.
    pub fn cracked_seed(&self) -> Option<Seed> {
        match self.tracking.crack {
            CrackState::Cracked => self.candidates.sole(),
            _ => None,
        }
    }

    /// The exact driving state, once known.
    pub fn driving_state(&self) -> Option<u64> {
        self.driving.map(|d| d.state())
    }

    pub fn scheduler_phase(&self) -> SchedulerPhase {
        self.scheduler.phase()
    }

    /// What `slot` of the open table gives: the full list once cracked,
    /// otherwise the authority's clue, if any.
    pub fn solved_outcome_list(&self, slot: usize) -> SlotView {
        let Some(window) = &self.window else {
            return SlotView::Unknown;
        };
        if slot >= SLOTS {
            return SlotView::Unknown;
        }

        if let Some(seed) = self.cracked_seed() {
            let cost = oracle::costs(seed, window.power, &window.item)[slot];
            return SlotView::Outcome(oracle::enchantments(
                seed,
                slot,
                cost,
                &window.item,
                &self.pool,
            ));
        }

        self.observation
            .and_then(|obs| obs.clues[slot])
            .and_then(|clue| {
                let kind = EnchantmentKind::from_id(clue.enchantment_id)?;
                let level = u8::try_from(clue.level).ok()?;
                Some(SlotView::Clue(EnchantmentInstance::new(kind, level)))
            })
            .unwrap_or(SlotView::Unknown)
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            crack: self.tracking.crack,
            player: self.tracking.player,
            candidates: self.candidates.len(),
            seed: self.cracked_seed(),
            power: self.window.as_ref().map(|w| w.power),
            slots: core::array::from_fn(|slot| self.solved_outcome_list(slot)),
            scheduler: self.scheduler.phase(),
        }
    }

    // ---------------------------------------------------------------------
    // Events from the outside world

    /// The table opened (or its item or power changed). `masked` only needs
    /// bits 4..=15 to be right.
    pub fn on_cracking_window_opened(&mut self, masked: Seed, item: ItemClass, power: u32) {
        debug!(item = %item, power, "table opened");
        self.window = Some(TableWindow {
            masked,
            item,
            power,
        });
        self.observation = None;
    }

    /// Filter the candidates against one round of table data.
    ///
    /// On a contradiction the engine has already reset itself when this
    /// returns `Err`.
    pub fn on_observation_round(
        &mut self,
        observation: Observation,
    ) -> Result<RoundOutcome, Contradiction> {
        if self.tracking.crack == CrackState::Cracked {
            return Ok(RoundOutcome::Ignored);
        }
        match &self.window {
            Some(w) if w.item.is_enchantable() => {}
            _ => return Ok(RoundOutcome::Ignored),
        }

        self.observation = Some(observation);
        self.apply(Event::ObservationRound)?;

        let Some(window) = &self.window else {
            return Ok(RoundOutcome::Ignored);
        };
        let before = self.candidates.len();
        let outcome = filter::filter(
            &mut self.candidates,
            &observation,
            TableContext {
                power: window.power,
                item: &window.item,
                pool: &self.pool,
            },
        );

        match outcome {
            FilterOutcome::Exhausted => {
                warn!(
                    "Invalid enchantment seed information. Has the server got unknown mods, \
                     is there a desync, or was the table read wrong?"
                );
                self.apply(Event::CandidatesExhausted)?;
                Err(Contradiction::CandidatesExhausted)
            }
            FilterOutcome::Narrowed(n) => {
                debug!(before, after = n, "candidates narrowed");
                Ok(RoundOutcome::Narrowed(n))
            }
            FilterOutcome::Converged(seed) => {
                info!(seed = format_args!("{:#010x}", seed as u32), "enchantment seed cracked");
                let was = self.tracking.player;
                self.apply(Event::SeedCracked)?;
                match (was, self.driving) {
                    (PlayerRngState::Partial2, Some(driving)) => Ok(RoundOutcome::Recovered {
                        seed,
                        driving_state: driving.state(),
                    }),
                    _ => Ok(RoundOutcome::Cracked(seed)),
                }
            }
        }
    }

    /// An outcome was taken from the table; the driving generator produced
    /// the next enchantment seed.
    pub fn on_outcome_confirmed(&mut self) {
        let prediction_enabled = self.config.prediction_enabled;
        if self.tracking.player == PlayerRngState::Uncracked && !prediction_enabled {
            return;
        }
        self.apply_quiet(Event::OutcomeConfirmed { prediction_enabled });
        self.outcome_confirmed = true;
    }

    /// Something consumed the driving generator that the engine cannot account for.
    pub fn on_unexpected_driving_event(&mut self) {
        if self.tracking.player != PlayerRngState::Uncracked {
            warn!(player = %self.tracking.player, "driving generator perturbed unexpectedly");
        }
        self.apply_quiet(Event::UnexpectedDrivingEvent);
    }

    /// One known perturbing action happened (an item was thrown by hand).
    ///
    /// Actions the scheduler requests are accounted for by [`Engine::tick`];
    /// do not report those here as well.
    pub fn on_perturbing_action(&mut self) {
        if let Some(driving) = &mut self.driving {
            driving.on_perturbing_action();
        }
    }

    // ---------------------------------------------------------------------
    // Commands

    /// Forget the enchantment seed crack. The driving generator is untouched.
    pub fn reset_cracker(&mut self) {
        self.apply_quiet(Event::Reset);
    }

    /// Start recovering the driving generator from the next two cracks.
    pub fn start_player_tracking(&mut self) {
        self.apply_quiet(Event::TrackingRequested);
    }

    /// Search for the fewest actions after which `predicate` holds for some
    /// `(power, slot)` on `item`.
    ///
    /// Unless `simulate_only`, a found plan is queued for [`Engine::tick`],
    /// replacing any manipulation already in progress.
    pub fn plan_manipulation<P>(
        &mut self,
        item: &ItemClass,
        predicate: P,
        simulate_only: bool,
    ) -> Option<ManipulationPlan>
    where
        P: Fn(&[EnchantmentInstance]) -> bool,
    {
        let source = PlanSource {
            cracked: self.cracked_seed(),
            driving: self.driving.filter(|_| self.tracking.player.knows_seed()),
        };
        let Some(plan) = planner::plan(
            source,
            item,
            &self.pool,
            self.config.max_item_throws,
            predicate,
        ) else {
            info!(item = %item, max = self.config.max_item_throws, "no manipulation found");
            return None;
        };
        info!(
            actions = %plan.actions,
            power = plan.power,
            slot = plan.slot + 1,
            "manipulation found"
        );

        if !simulate_only {
            if !self.scheduler.is_idle() {
                info!(phase = ?self.scheduler.phase(), "replacing queued manipulation");
            }
            self.apply_quiet(Event::ManipulationReplaced);
            self.scheduler.load(&plan);
            self.outcome_confirmed = true;
            if matches!(plan.actions, ActionCount::Actions(n) if n > 0) {
                self.apply_quiet(Event::ManipulationStarted);
            }
        }
        Some(plan)
    }

    /// Drive the scheduler by one tick.
    pub fn tick<W: World + ?Sized>(&mut self, world: &mut W) -> StepOutcome {
        let progress = Progress {
            crack: self.tracking.crack,
            player: self.tracking.player,
            outcome_confirmed: self.outcome_confirmed,
        };
        let step = self.scheduler.tick(progress, world);
        match step {
            StepOutcome::ActionPerformed => self.on_perturbing_action(),
            StepOutcome::ConfirmationRequested => {
                self.outcome_confirmed = false;
                self.apply_quiet(Event::ConfirmationRequested);
            }
            StepOutcome::Cancelled => {
                warn!(player = %self.tracking.player, "left manipulation; plan cancelled");
                self.reset_cracker();
            }
            StepOutcome::Reported => info!("manipulation complete"),
            _ => {}
        }
        step
    }

    // ---------------------------------------------------------------------
    // Transitions

    fn apply(&mut self, event: Event) -> Result<(), Contradiction> {
        let before = self.tracking;
        let (next, effect) = before.apply(event);
        self.tracking = next;
        if next != before {
            debug!(?event, crack = %next.crack, player = %next.player, "tracking");
        }
        if !next.player.knows_seed() {
            self.driving = None;
        }

        match effect {
            None => {}
            Some(Effect::PopulateCandidates) => {
                if let Some(window) = &self.window {
                    self.candidates.populate(window.masked);
                }
            }
            Some(Effect::ClearCandidates) => self.candidates.clear(),
            Some(Effect::RememberFirstSeed) => self.first_seed = self.candidates.sole(),
            Some(Effect::RecoverState) => return self.recover(),
            Some(Effect::PredictNextSeed) => {
                if let Some(driving) = &mut self.driving {
                    let seed = driving.next_seed();
                    self.candidates.pin(seed);
                    debug!(seed = format_args!("{:#010x}", seed as u32), "predicted next seed");
                }
            }
            Some(Effect::AbandonManipulation) => {
                self.scheduler.cancel();
                self.candidates.clear();
            }
        }
        Ok(())
    }

    /// For events whose effects never recover state.
    fn apply_quiet(&mut self, event: Event) {
        if let Err(err) = self.apply(event) {
            warn!(%err, ?event, "unexpected contradiction");
        }
    }

    fn recover(&mut self) -> Result<(), Contradiction> {
        let (Some(first), Some(second)) = (self.first_seed.take(), self.candidates.sole()) else {
            self.apply(Event::RecoveryRejected)?;
            return Ok(());
        };
        match recover_state(first, second) {
            Ok(s0) => {
                self.apply(Event::StateRecovered)?;
                self.driving = Some(DrivingRng::new(advance(s0)));
                info!(state = format_args!("{:#014x}", s0), "player RNG recovered");
                Ok(())
            }
            Err(err) => {
                warn!(
                    "Invalid player RNG information. Has the server got unknown mods, is there a \
                     desync, has an operator used /give, or is the client just bugged?"
                );
                self.apply(Event::RecoveryRejected)?;
                Err(err)
            }
        }
    }
}
