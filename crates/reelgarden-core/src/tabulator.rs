//! Score tabulation in ascending batches.
//!
//! Cells are grouped by their current score; each distinct score forms one
//! batch and batches are ordered from the lowest score to the highest. The
//! tabulator never blocks: it returns the batches and the caller accrues
//! each contribution once its presentation step completes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collection::Viewport;
use crate::grid::GridPosition;

/// Cells sharing one score value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBatch {
    /// The shared score
    pub score: u64,
    /// Cells in the batch, ascending
    pub positions: Vec<GridPosition>,
}

impl ScoreBatch {
    /// Sum of the members' scores.
    #[must_use]
    pub fn contribution(&self) -> u64 {
        self.score.saturating_mul(self.positions.len() as u64)
    }
}

/// Batches for one resolved viewport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tabulation {
    batches: Vec<ScoreBatch>,
}

impl Tabulation {
    /// Batches in ascending score order.
    #[must_use]
    pub fn batches(&self) -> &[ScoreBatch] {
        &self.batches
    }

    /// Consumes the tabulation, yielding its batches.
    #[must_use]
    pub fn into_batches(self) -> Vec<ScoreBatch> {
        self.batches
    }

    /// Sum of all batch contributions.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.batches.iter().map(ScoreBatch::contribution).sum()
    }

    /// Returns true if there are no batches (empty viewport).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Groups the viewport's cells into ascending score batches.
///
/// Zero-score cells form a batch of their own that contributes nothing.
#[must_use]
pub fn tabulate(viewport: &Viewport) -> Tabulation {
    let mut groups: BTreeMap<u64, Vec<GridPosition>> = BTreeMap::new();
    for (pos, symbol) in viewport.iter() {
        groups.entry(symbol.score()).or_default().push(pos);
    }
    Tabulation {
        batches: groups
            .into_iter()
            .map(|(score, positions)| ScoreBatch { score, positions })
            .collect(),
    }
}
