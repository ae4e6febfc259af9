//! Engine configuration.
//!
//! Every field has a default: a 4-row by 5-column grid, three reward
//! choices drawn from the common pool, and an entropy-seeded RNG.
//! Configurations are plain serde values so they can be loaded from JSON
//! alongside a symbol catalog.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grid::GridTopology;
use crate::symbol::Rarity;

/// Default number of grid rows.
pub const DEFAULT_ROWS: usize = 4;
/// Default number of grid columns.
pub const DEFAULT_COLUMNS: usize = 5;
/// Default number of reward candidates offered after each spin.
pub const DEFAULT_REWARD_CHOICES: usize = 3;

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
        }
    }
}

/// Configuration for a [`SlotMachine`](crate::machine::SlotMachine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid dimensions
    pub grid: GridConfig,
    /// How many reward candidates to offer per spin
    pub reward_choices: usize,
    /// Rarity pool the reward candidates are drawn from
    pub reward_rarity: Rarity,
    /// RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            reward_choices: DEFAULT_REWARD_CHOICES,
            reward_rarity: Rarity::Common,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create a config with the given grid dimensions.
    #[must_use]
    pub fn with_grid(rows: usize, columns: usize) -> Self {
        Self {
            grid: GridConfig { rows, columns },
            ..Default::default()
        }
    }

    /// Set a deterministic seed.
    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration and build its grid topology.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGrid`] if either dimension is zero.
    pub fn validate(&self) -> EngineResult<GridTopology> {
        GridTopology::new(self.grid.rows, self.grid.columns)
    }
}
