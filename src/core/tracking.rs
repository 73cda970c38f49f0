//! Crack progress and driving-generator tracking as one explicit state machine.
//!
//! [`Tracking::apply`] is the only place either state changes. It is pure: it
//! returns the next state plus at most one [`Effect`] for the engine to carry
//! out on the data it owns (candidate set, remembered seed, driving state).

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::lcg::{advance, high_bits, Seed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CrackState {
    #[default]
    Uncracked,
    Cracking,
    Cracked,
}

impl CrackState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Uncracked => "uncracked",
            Self::Cracking => "cracking",
            Self::Cracked => "cracked",
        }
    }
}

/// How much of the driving generator is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlayerRngState {
    /// Nothing known; seeds cracked now may predate tracking.
    #[default]
    Uncracked,
    /// Watching for the first usable seed.
    Partial1,
    /// One usable seed cracked.
    HalfKnown,
    /// Watching for the consecutive second seed.
    Partial2,
    /// Exact 48-bit state known.
    Known,
    /// Scheduled actions are being performed.
    Manipulating,
    /// Waiting for the triggering event that materializes the plan.
    AwaitingConfirmation,
}

impl PlayerRngState {
    pub fn knows_seed(self) -> bool {
        matches!(
            self,
            Self::Known | Self::Manipulating | Self::AwaitingConfirmation
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Uncracked => "uncracked",
            Self::Partial1 => "partial_1",
            Self::HalfKnown => "half_known",
            Self::Partial2 => "partial_2",
            Self::Known => "known",
            Self::Manipulating => "manipulating",
            Self::AwaitingConfirmation => "awaiting_confirmation",
        }
    }
}

impl fmt::Display for CrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for PlayerRngState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// An observation round arrived for an enchantable item.
    ObservationRound,
    /// Filtering emptied the candidate set.
    CandidatesExhausted,
    /// Filtering left exactly one candidate.
    SeedCracked,
    /// The two-seed solver verified its result.
    StateRecovered,
    /// The two-seed solver rejected its input.
    RecoveryRejected,
    /// An outcome (enchant) was confirmed, consuming one driving draw.
    OutcomeConfirmed { prediction_enabled: bool },
    /// Something this engine does not model used the driving generator.
    UnexpectedDrivingEvent,
    /// The scheduler is about to perform the first action.
    ManipulationStarted,
    /// A new plan is replacing whatever the scheduler was doing.
    ManipulationReplaced,
    /// The scheduler asked for the triggering event.
    ConfirmationRequested,
    /// The user asked to start recovering the driving generator.
    TrackingRequested,
    /// The user asked to start over.
    Reset,
}

/// Data work the engine must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Fill the candidate set from the current window.
    PopulateCandidates,
    ClearCandidates,
    /// Keep the sole candidate as the first half of a recovery pair.
    RememberFirstSeed,
    /// Solve for the driving state from the remembered and sole candidate.
    RecoverState,
    /// Draw the next seed from the known driving state and pin it.
    PredictNextSeed,
    /// Drop the scheduler queue and all candidates.
    AbandonManipulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tracking {
    pub crack: CrackState,
    pub player: PlayerRngState,
}

impl Tracking {
    pub fn apply(self, event: Event) -> (Tracking, Option<Effect>) {
        use CrackState as C;
        use PlayerRngState as P;

        let Tracking { crack, player } = self;
        let to = |crack, player| Tracking { crack, player };

        match event {
            Event::ObservationRound => match crack {
                C::Uncracked => (to(C::Cracking, player), Some(Effect::PopulateCandidates)),
                _ => (self, None),
            },

            Event::CandidatesExhausted => (to(C::Uncracked, player), Some(Effect::ClearCandidates)),

            Event::SeedCracked => match player {
                P::Partial1 => (to(C::Cracked, P::HalfKnown), Some(Effect::RememberFirstSeed)),
                P::Partial2 => (to(C::Cracked, P::Partial2), Some(Effect::RecoverState)),
                _ => (to(C::Cracked, player), None),
            },

            Event::StateRecovered => match player {
                P::Partial2 => (to(crack, P::Known), None),
                _ => (self, None),
            },

            Event::RecoveryRejected => match player {
                P::Partial2 => (to(crack, P::Uncracked), None),
                _ => (self, None),
            },

            Event::OutcomeConfirmed { prediction_enabled } => {
                if player.knows_seed() {
                    (to(C::Cracked, P::Known), Some(Effect::PredictNextSeed))
                } else if player == P::Uncracked && !prediction_enabled {
                    (self, None)
                } else if player == P::HalfKnown {
                    (to(C::Uncracked, P::Partial2), Some(Effect::ClearCandidates))
                } else {
                    (to(C::Uncracked, P::Partial1), Some(Effect::ClearCandidates))
                }
            }

            Event::UnexpectedDrivingEvent => match player {
                P::Manipulating | P::AwaitingConfirmation => {
                    (to(C::Uncracked, P::Uncracked), Some(Effect::AbandonManipulation))
                }
                _ => (to(crack, P::Uncracked), None),
            },

            Event::ManipulationStarted => match player {
                P::Known => (to(crack, P::Manipulating), None),
                _ => (self, None),
            },

            Event::ManipulationReplaced => match player {
                P::Manipulating | P::AwaitingConfirmation => (to(crack, P::Known), None),
                _ => (self, None),
            },

            Event::ConfirmationRequested => match player {
                P::Known | P::Manipulating => (to(crack, P::AwaitingConfirmation), None),
                _ => (self, None),
            },

            Event::TrackingRequested => match player {
                P::Uncracked => (to(C::Uncracked, P::Partial1), Some(Effect::ClearCandidates)),
                _ => (self, None),
            },

            Event::Reset => (to(C::Uncracked, player), Some(Effect::ClearCandidates)),
        }
    }
}

/// The driving generator once its exact state is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrivingRng {
    state: u64,
}

/// Primitive draws one perturbing action (an item throw) consumes.
pub const DRAWS_PER_ACTION: usize = 4;

impl DrivingRng {
    pub fn new(state: u64) -> Self {
        Self {
            state: state & crate::lcg::MASK,
        }
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    /// The seed the next confirmed outcome will produce.
    pub fn peek_seed(&self) -> Seed {
        high_bits(advance(self.state))
    }

    /// Consume one unbounded draw and return the resulting seed.
    pub fn next_seed(&mut self) -> Seed {
        self.state = advance(self.state);
        high_bits(self.state)
    }

    /// Account for one perturbing action.
    pub fn on_perturbing_action(&mut self) {
        for _ in 0..DRAWS_PER_ACTION {
            self.state = advance(self.state);
        }
    }
}
