//! Reward candidate selection.
//!
//! [`RewardPolicy`] is the seam for choosing which symbols are offered after
//! a spin. [`UniformRewardPolicy`] draws uniformly, without repeats, from a
//! single rarity pool.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::catalog::SymbolCatalog;
use crate::symbol::{Rarity, SymbolDefinition};

/// Chooses the reward candidates offered after a spin.
pub trait RewardPolicy: Send + Sync {
    /// Returns up to `count` distinct candidates.
    fn choose(
        &self,
        catalog: &SymbolCatalog,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<SymbolDefinition>;
}

/// Uniform sample from one rarity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformRewardPolicy {
    rarity: Rarity,
}

impl UniformRewardPolicy {
    /// Draws from the given rarity.
    #[must_use]
    pub const fn new(rarity: Rarity) -> Self {
        Self { rarity }
    }

    /// The pool this policy draws from.
    #[must_use]
    pub const fn rarity(&self) -> Rarity {
        self.rarity
    }
}

impl Default for UniformRewardPolicy {
    fn default() -> Self {
        Self::new(Rarity::Common)
    }
}

impl RewardPolicy for UniformRewardPolicy {
    fn choose(
        &self,
        catalog: &SymbolCatalog,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<SymbolDefinition> {
        catalog
            .by_rarity(self.rarity)
            .choose_multiple(rng, count)
            .cloned()
            .collect()
    }
}
