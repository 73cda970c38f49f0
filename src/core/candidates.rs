use hashbrown::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::lcg::Seed;

/// Bits of the seed the authority reveals when the table opens (bits 4..=15).
pub const REVEALED_MASK: u32 = 0x0000_FFF0;

/// Number of candidates a fresh population holds: 2^20.
pub const POPULATION: usize = 1 << 20;

/// Working set of enchantment seed candidates.
///
/// Every member is consistent with every observation filtered into it so far.
/// The set only ever shrinks after [`CandidateSet::populate`].
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    seeds: HashSet<Seed>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer all 2^20 combinations of the unknown bits (0..=3 and 16..=31)
    /// onto the revealed window of `masked`.
    pub fn populate(&mut self, masked: Seed) {
        let window = masked as u32 & REVEALED_MASK;
        self.seeds.clear();
        self.seeds.reserve(POPULATION);
        for high in 0..0x1_0000u32 {
            for low in 0..0x10u32 {
                self.seeds.insert(((high << 16) | window | low) as i32);
            }
        }
    }

    /// Replace the set with one known seed.
    pub fn pin(&mut self, seed: Seed) {
        self.seeds.clear();
        self.seeds.insert(seed);
    }

    pub fn clear(&mut self) {
        self.seeds.clear();
    }

    /// Remove every candidate that fails `keep`. Returns how many were removed.
    pub fn eliminate<F>(&mut self, keep: F) -> usize
    where
        F: Fn(Seed) -> bool + Sync,
    {
        let before = self.seeds.len();

        #[cfg(feature = "parallel")]
        {
            let doomed: Vec<Seed> = self
                .seeds
                .par_iter()
                .filter(|&&s| !keep(s))
                .copied()
                .collect();
            for s in &doomed {
                self.seeds.remove(s);
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.seeds.retain(|&s| keep(s));
        }

        before - self.seeds.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    #[must_use]
    pub fn contains(&self, seed: Seed) -> bool {
        self.seeds.contains(&seed)
    }

    /// The surviving seed once the set has converged.
    #[must_use]
    pub fn sole(&self) -> Option<Seed> {
        if self.seeds.len() == 1 {
            self.seeds.iter().next().copied()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Seed> + '_ {
        self.seeds.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_covers_every_unknown_bit() {
        let mut set = CandidateSet::new();
        set.populate(0x0000_1230);
        assert_eq!(set.len(), POPULATION);
        assert!(set.contains(0x0000_1230));
        assert!(set.contains(0x7FFF_123F));
        assert!(set.contains(0xFFFF_1235_u32 as i32));
        assert!(!set.contains(0x0000_1240));
        assert!(set.iter().all(|s| s as u32 & REVEALED_MASK == 0x1230));
    }

    #[test]
    fn populate_ignores_unrevealed_input_bits() {
        let mut a = CandidateSet::new();
        a.populate(0x1234_5678);
        assert!(a.contains(0x1234_5678));
        assert!(a.iter().all(|s| s as u32 & REVEALED_MASK == 0x5670));
    }

    #[test]
    fn eliminate_only_shrinks() {
        let mut set = CandidateSet::new();
        set.populate(0x0000_0ab0);
        let before = set.len();
        let removed = set.eliminate(|s| s & 1 == 0);
        assert_eq!(removed, before / 2);
        assert_eq!(set.len(), before - removed);

        let again = set.eliminate(|_| true);
        assert_eq!(again, 0);
        assert_eq!(set.len(), before / 2);

        set.eliminate(|_| false);
        assert!(set.is_empty());
        assert_eq!(set.sole(), None);
    }

    #[test]
    fn pin_converges() {
        let mut set = CandidateSet::new();
        set.pin(-5);
        assert_eq!(set.sole(), Some(-5));
        set.clear();
        assert!(set.is_empty());
    }
}
