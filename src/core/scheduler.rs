//! Tick-driven action scheduler.
//!
//! A plan becomes a queue of small tasks. Each call to [`Scheduler::tick`]
//! advances the head of the queue by at most one interaction with the world.
//! Nothing blocks: a task that is not ready reports [`StepOutcome::Waiting`]
//! and is polled again on the next tick.

use std::collections::VecDeque;

use tracing::debug;

use crate::planner::{ActionCount, ManipulationPlan};
use crate::tracking::{CrackState, PlayerRngState};

/// Answer to a once-per-tick precondition poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Waiting,
}

/// Commands the scheduler issues to the outside world.
pub trait World {
    /// Align the orientation actions depend on before the first action.
    fn request_orientation_sync(&mut self);

    /// Whether the next perturbing action can be performed this tick.
    fn poll_precondition(&mut self) -> Readiness;

    /// Perform one perturbing action (throw one item).
    fn request_perturbing_action(&mut self);

    /// Ask for the throwaway outcome that consumes the planned seed.
    fn request_outcome_trigger(&mut self);

    /// The table is ready: enchant `plan.slot` at `plan.power`.
    fn report_ready(&mut self, plan: &ManipulationPlan);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Task {
    Sync,
    PerformAction,
    AwaitConfirmation { requested: bool },
    Report(Box<ManipulationPlan>),
}

/// Tracked state the scheduler reads each tick. It never writes it; the
/// engine applies the returned [`StepOutcome`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub crack: CrackState,
    pub player: PlayerRngState,
    /// The triggering outcome has actually happened since it was requested.
    pub outcome_confirmed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing queued.
    Idle,
    Waiting,
    Synced,
    /// One perturbing action was performed; the driving state moved.
    ActionPerformed,
    /// The trigger was requested; the engine should await confirmation.
    ConfirmationRequested,
    /// The final report was delivered.
    Reported,
    /// The final report was suppressed because the crack or the trigger was
    /// invalidated mid-sequence.
    ReportSkipped,
    /// The player state left manipulation; the queue was dropped.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Syncing,
    Performing { remaining: usize },
    AwaitingConfirmation,
    Reporting,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: VecDeque<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is queued with the tasks for `plan`.
    pub fn load(&mut self, plan: &ManipulationPlan) {
        self.queue.clear();
        if let ActionCount::Actions(n) = plan.actions {
            if n > 0 {
                self.queue.push_back(Task::Sync);
                self.queue
                    .extend(core::iter::repeat(Task::PerformAction).take(n as usize));
            }
            self.queue
                .push_back(Task::AwaitConfirmation { requested: false });
        }
        self.queue.push_back(Task::Report(Box::new(plan.clone())));
        debug!(tasks = self.queue.len(), actions = %plan.actions, "scheduler loaded");
    }

    pub fn cancel(&mut self) {
        if !self.queue.is_empty() {
            debug!(dropped = self.queue.len(), "scheduler cancelled");
        }
        self.queue.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining_actions(&self) -> usize {
        self.queue
            .iter()
            .filter(|t| matches!(t, Task::PerformAction))
            .count()
    }

    pub fn phase(&self) -> SchedulerPhase {
        match self.queue.front() {
            None => SchedulerPhase::Idle,
            Some(Task::Sync) => SchedulerPhase::Syncing,
            Some(Task::PerformAction) => SchedulerPhase::Performing {
                remaining: self.remaining_actions(),
            },
            Some(Task::AwaitConfirmation { .. }) => SchedulerPhase::AwaitingConfirmation,
            Some(Task::Report(_)) => SchedulerPhase::Reporting,
        }
    }

    /// Advance the queue by one tick.
    pub fn tick<W: World + ?Sized>(&mut self, progress: Progress, world: &mut W) -> StepOutcome {
        loop {
            let Some(task) = self.queue.front_mut() else {
                return StepOutcome::Idle;
            };

            match task {
                Task::Sync => {
                    world.request_orientation_sync();
                    self.queue.pop_front();
                    return StepOutcome::Synced;
                }

                Task::PerformAction => {
                    if progress.player != PlayerRngState::Manipulating {
                        self.cancel();
                        return StepOutcome::Cancelled;
                    }
                    return match world.poll_precondition() {
                        Readiness::Waiting => StepOutcome::Waiting,
                        Readiness::Ready => {
                            world.request_perturbing_action();
                            self.queue.pop_front();
                            debug!(remaining = self.remaining_actions(), "action performed");
                            StepOutcome::ActionPerformed
                        }
                    };
                }

                Task::AwaitConfirmation { requested } => {
                    if !*requested {
                        *requested = true;
                        world.request_outcome_trigger();
                        return StepOutcome::ConfirmationRequested;
                    }
                    if progress.player == PlayerRngState::AwaitingConfirmation {
                        return StepOutcome::Waiting;
                    }
                    // Confirmed, or invalidated; the report decides which.
                    self.queue.pop_front();
                }

                Task::Report(plan) => {
                    let plan = plan.clone();
                    self.queue.pop_front();
                    if progress.crack == CrackState::Cracked && progress.outcome_confirmed {
                        world.report_ready(&plan);
                        return StepOutcome::Reported;
                    }
                    debug!(crack = %progress.crack, "report suppressed");
                    return StepOutcome::ReportSkipped;
                }
            }
        }
    }
}
