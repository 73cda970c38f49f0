//! The simulated server: owns the player generator and the enchanting table.

use enchcrack::enchantment::{EnchantmentInstance, EnchantmentPool};
use enchcrack::filter::Observation;
use enchcrack::item::ItemClass;
use enchcrack::lcg::{Lcg48, Seed};
use enchcrack::oracle;
use enchcrack::planner::ManipulationPlan;
use enchcrack::scheduler::{Readiness, World};
use enchcrack::table::{enchant_power, shelf_offsets, Block, BlockPos, TableEra};
use hashbrown::HashMap;
use tracing::{debug, info};

use crate::SimError;

const TABLE: BlockPos = BlockPos::new(0, 64, 0);

#[derive(Debug, Clone)]
pub struct Authority {
    player: Lcg48,
    seed: Seed,
    blocks: HashMap<BlockPos, Block>,
    era: TableEra,
    /// An item is ready to throw every other tick.
    cooldown: bool,
    throws: u32,
    trigger_pending: bool,
    ready: Option<ManipulationPlan>,
}

impl Authority {
    pub fn new(player_seed: i64, era: TableEra) -> Self {
        let mut player = Lcg48::new(player_seed);
        let seed = player.next_int();
        Self {
            player,
            seed,
            blocks: HashMap::new(),
            era,
            cooldown: false,
            throws: 0,
            trigger_pending: false,
            ready: None,
        }
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn player_state(&self) -> u64 {
        self.player.state()
    }

    pub fn throws(&self) -> u32 {
        self.throws
    }

    /// Rebuild the shelf ring with exactly `count` unobstructed bookshelves.
    pub fn set_bookshelves(&mut self, count: u32) {
        self.blocks.clear();
        for (x, y, z) in shelf_offsets().take(count as usize) {
            self.blocks.insert(TABLE.offset(x, y, z), Block::Bookshelf);
        }
    }

    pub fn power(&self) -> u32 {
        enchant_power(&self.blocks, TABLE, self.era)
    }

    /// What a client sees when it puts `item` on the table: the revealed seed
    /// window and the three offers.
    pub fn open_table(&self, item: &ItemClass, pool: &EnchantmentPool) -> (Seed, Observation) {
        let masked = self.seed & 0xFFF0;
        (masked, Observation::simulate(self.seed, self.power(), item, pool))
    }

    /// Take the offer in `slot`. The player generator draws the next seed.
    ///
    /// A slot with cost 0 has no offer; taking it is refused and nothing is drawn.
    pub fn enchant(
        &mut self,
        item: &ItemClass,
        slot: usize,
        pool: &EnchantmentPool,
    ) -> Result<Vec<EnchantmentInstance>, SimError> {
        let cost = oracle::costs(self.seed, self.power(), item)[slot];
        if cost <= 0 {
            return Err(SimError::NoOffer(slot + 1));
        }
        let result = oracle::enchantments(self.seed, slot, cost, item, pool);
        self.seed = self.player.next_int();
        debug!(slot, cost, "enchanted");
        Ok(result)
    }

    /// Throw one item by hand: four float draws for its velocity.
    pub fn drop_item(&mut self) {
        for _ in 0..4 {
            self.player.next_float();
        }
        self.throws += 1;
    }

    /// An untracked draw on the player generator.
    pub fn perturb(&mut self) {
        self.player.next_int();
    }

    pub fn take_trigger(&mut self) -> bool {
        std::mem::take(&mut self.trigger_pending)
    }

    pub fn take_ready(&mut self) -> Option<ManipulationPlan> {
        self.ready.take()
    }
}

impl World for Authority {
    fn request_orientation_sync(&mut self) {
        debug!("looking straight down");
    }

    fn poll_precondition(&mut self) -> Readiness {
        self.cooldown = !self.cooldown;
        if self.cooldown {
            Readiness::Waiting
        } else {
            Readiness::Ready
        }
    }

    fn request_perturbing_action(&mut self) {
        self.drop_item();
    }

    fn request_outcome_trigger(&mut self) {
        info!("Enchant any item to continue");
        self.trigger_pending = true;
    }

    fn report_ready(&mut self, plan: &ManipulationPlan) {
        info!(
            bookshelves = plan.power,
            slot = plan.slot + 1,
            "Ready: set the bookshelves and take the slot"
        );
        self.ready = Some(plan.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_generator_matches_reference() {
        // new java.util.Random(0).nextInt()
        let auth = Authority::new(0, TableEra::Transmitter);
        assert_eq!(auth.seed(), -1_155_484_576);
    }

    #[test]
    fn bookshelf_ring_sets_power() {
        let mut auth = Authority::new(1, TableEra::Legacy);
        assert_eq!(auth.power(), 0);
        auth.set_bookshelves(15);
        assert_eq!(auth.power(), 15);
        auth.set_bookshelves(32);
        assert_eq!(auth.power(), 32);
    }

    #[test]
    fn enchanting_and_throwing_advance_the_player() {
        let pool = EnchantmentPool::vanilla();
        let book = ItemClass::book();
        let mut auth = Authority::new(5, TableEra::Transmitter);
        auth.set_bookshelves(15);

        let start = auth.player_state();
        let before = auth.seed();
        let (masked, obs) = auth.open_table(&book, &pool);
        assert_eq!(masked, before & 0xFFF0);
        assert!(obs.costs[2] > 0);

        auth.enchant(&book, 2, &pool).unwrap();
        assert_ne!(auth.seed(), before);
        assert_eq!(auth.player_state(), enchcrack::lcg::advance(start));

        auth.drop_item();
        assert_eq!(auth.throws(), 1);
    }

    #[test]
    fn empty_slots_cannot_be_taken() {
        let pool = EnchantmentPool::vanilla();
        let stick = ItemClass::new("stick", 0, Default::default());
        let mut auth = Authority::new(5, TableEra::Transmitter);
        auth.set_bookshelves(15);

        let (start, before) = (auth.player_state(), auth.seed());
        assert!(matches!(auth.enchant(&stick, 0, &pool), Err(SimError::NoOffer(1))));
        assert_eq!(auth.player_state(), start);
        assert_eq!(auth.seed(), before);
    }

    #[test]
    fn precondition_alternates() {
        let mut auth = Authority::new(5, TableEra::Transmitter);
        assert_eq!(auth.poll_precondition(), Readiness::Waiting);
        assert_eq!(auth.poll_precondition(), Readiness::Ready);
        assert_eq!(auth.poll_precondition(), Readiness::Waiting);
    }
}
