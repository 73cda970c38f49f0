// State recovery from two consecutive 32-bit outputs.
//
// Given seed_a = high32(s0) and seed_b = high32(advance(s0)), the 16 hidden
// low bits of each state form a short vector in a two-dimensional lattice.
// The coefficients below round the known high halves onto a reduced basis of
// that lattice (determinant 2^48) and were derived offline for the
// MULTIPLIER/ADDEND/MASK in `lcg`. Changing those constants invalidates them;
// the tests pin them against `advance`.

use crate::error::Contradiction;
use crate::lcg::{advance, high_bits, Seed, MASK};

const BASIS_A: (i64, i64) = (24_667_315, 18_218_081);
const BASIS_B: (i64, i64) = (-4_824_621, 7_847_617);
const RECOMBINE: (i64, i64) = (7_847_617, -18_218_081);

/// Reconstruct the 48-bit state whose high bits are `seed_a` and whose
/// successor's high bits are `seed_b`.
///
/// Returns the *first* state. Exactly one exists when the two seeds really are
/// consecutive outputs; otherwise verification fails and nothing is returned.
pub fn recover_state(seed_a: Seed, seed_b: Seed) -> Result<u64, Contradiction> {
    let min_a = i64::from(seed_a as u32);
    let max_a = min_a + 1;
    let max_b = i64::from(seed_b as u32) + 1;

    let a = (BASIS_A.0 * max_a + BASIS_A.1 * max_b) >> 32;
    let b = (BASIS_B.0 * min_a + BASIS_B.1 * max_b) >> 32;
    let state = (RECOMBINE.0 * a + RECOMBINE.1 * b) as u64 & MASK;

    if high_bits(state) == seed_a && high_bits(advance(state)) == seed_b {
        Ok(state)
    } else {
        Err(Contradiction::InconsistentSeeds {
            first: seed_a as u32,
            second: seed_b as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcg::Lcg48;

    fn pair(s0: u64) -> (Seed, Seed) {
        (high_bits(s0), high_bits(advance(s0)))
    }

    #[test]
    fn recovers_small_state() {
        let (a, b) = pair(7);
        assert_eq!(recover_state(a, b), Ok(7));
    }

    #[test]
    fn recovers_edge_states() {
        for s0 in [0, 1, 0xFFFF, 0x1_0000, MASK, MASK - 1, 1 << 47] {
            let (a, b) = pair(s0);
            assert_eq!(recover_state(a, b), Ok(s0), "state {s0:#x}");
        }
    }

    #[test]
    fn recovers_states_along_a_sequence() {
        let mut s = Lcg48::new(0x5eed).state();
        for _ in 0..10_000 {
            let (a, b) = pair(s);
            assert_eq!(recover_state(a, b), Ok(s));
            s = advance(s);
        }
    }

    #[test]
    fn recovers_spread_out_states() {
        // Stride through the state space.
        let mut s = 0u64;
        for _ in 0..10_000 {
            s = (s + 0x3141_5926_5358) & MASK;
            let (a, b) = pair(s);
            assert_eq!(recover_state(a, b), Ok(s));
        }
    }

    #[test]
    fn rejects_inconsistent_pair() {
        let (a, b) = pair(0x1234_5678_9ABC);
        let err = recover_state(a, b ^ 0x0100_0000).unwrap_err();
        assert_eq!(
            err,
            Contradiction::InconsistentSeeds {
                first: a as u32,
                second: (b ^ 0x0100_0000) as u32,
            }
        );
    }

    #[test]
    fn never_returns_a_wrong_state() {
        // Whatever the input, an Ok result must reproduce both seeds.
        let mut r = Lcg48::new(99);
        for _ in 0..5_000 {
            let (a, b) = (r.next_int(), r.next_int());
            if let Ok(s) = recover_state(a, b) {
                assert_eq!(pair(s), (a, b));
            }
        }
    }
}
