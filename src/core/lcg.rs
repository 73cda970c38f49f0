// 48-bit linear congruential generator, bit-compatible with the authority's
// legacy random source (the `java.util.Random` parameterization).
//
// Everything here is a pure function of the 48-bit state. The struct is only a
// convenience for sequencing draws.

pub const MULTIPLIER: u64 = 0x5_DEEC_E66D;
pub const ADDEND: u64 = 0xB;
pub const MASK: u64 = (1 << 48) - 1;

/// An externally observable seed: the high 32 bits of a 48-bit state.
pub type Seed = i32;

/// One primitive step: `state * M + A mod 2^48`.
#[inline]
#[must_use]
pub const fn advance(state: u64) -> u64 {
    state.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK
}

/// The seed an unbounded 32-bit draw would report for this state.
#[inline]
#[must_use]
pub const fn high_bits(state: u64) -> Seed {
    (state >> 16) as u32 as i32
}

/// Scramble applied to a user supplied seed before first use.
///
/// The seed is widened with sign extension, so negative 32-bit seeds set the
/// upper 16 bits of the state.
#[inline]
#[must_use]
pub const fn scramble(seed: i64) -> u64 {
    (seed as u64 ^ MULTIPLIER) & MASK
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    /// Seed the generator the way the authority does for a user supplied seed.
    pub fn new(seed: i64) -> Self {
        Self {
            state: scramble(seed),
        }
    }

    /// Seed from a 32-bit value (sign extended, then scrambled).
    pub fn from_seed(seed: Seed) -> Self {
        Self::new(i64::from(seed))
    }

    /// Adopt a raw internal state without scrambling.
    pub fn from_state(state: u64) -> Self {
        Self {
            state: state & MASK,
        }
    }

    pub fn set_seed(&mut self, seed: Seed) {
        self.state = scramble(i64::from(seed));
    }

    #[inline]
    pub fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    fn next_bits(&mut self, bits: u32) -> i32 {
        debug_assert!((1..=32).contains(&bits));
        self.state = advance(self.state);
        (self.state >> (48 - bits)) as u32 as i32
    }

    /// Unbounded 32-bit draw. Consumes one step.
    #[inline]
    pub fn next_int(&mut self) -> i32 {
        self.next_bits(32)
    }

    /// Uniform draw in `[0, bound)`.
    ///
    /// Powers of two take the high bits of a single step. Other bounds reject
    /// the draws that would bias the modulo, so they may consume more than one
    /// step.
    pub fn next_int_bounded(&mut self, bound: i32) -> i32 {
        debug_assert!(bound > 0, "bound must be positive");
        let bound = bound.max(1);
        let mut r = self.next_bits(31);
        let m = bound - 1;
        if bound & m == 0 {
            return ((i64::from(bound) * i64::from(r)) >> 31) as i32;
        }
        let mut u = r;
        loop {
            r = u % bound;
            if u.wrapping_sub(r).wrapping_add(m) >= 0 {
                return r;
            }
            u = self.next_bits(31);
        }
    }

    /// Float in `[0, 1)` with 24 bits of precision. Consumes one step.
    #[inline]
    pub fn next_float(&mut self) -> f32 {
        self.next_bits(24) as f32 * 5.960_464_5e-8_f32
    }
}
