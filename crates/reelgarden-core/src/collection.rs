//! Owned collection and viewport containers.
//!
//! The [`OwnedCollection`] is the player's persistent pool of symbols. A
//! [`Viewport`] is the fixed-size grid sample shown for one spin. Both hold
//! [`Symbol`] values; an owned entry and a viewport cell are "the same
//! instance" exactly when their [`InstanceId`]s match.

use serde::{Deserialize, Serialize};

use crate::catalog::SymbolCatalog;
use crate::grid::{GridPosition, GridTopology};
use crate::symbol::{InstanceAllocator, InstanceId, Symbol, SymbolKey};

/// Slots of the starting collection that hold a named symbol.
pub const INITIAL_SEED: [(usize, &str); 5] = [
    (5, "cat"),
    (7, "cherry"),
    (9, "coin"),
    (11, "flower"),
    (13, "spade"),
];

// =============================================================================
// Owned Collection
// =============================================================================

/// The player's persistent, unbounded pool of symbols.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedCollection {
    symbols: Vec<Symbol>,
}

impl OwnedCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing instances.
    #[must_use]
    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// The starting collection: one filler per grid cell, with the
    /// [`INITIAL_SEED`] symbols at their fixed slots.
    ///
    /// Seed slots beyond the grid, or naming keys absent from the catalog,
    /// stay filler.
    #[must_use]
    pub fn initial(
        catalog: &SymbolCatalog,
        grid: GridTopology,
        ids: &mut InstanceAllocator,
    ) -> Self {
        let mut symbols: Vec<Symbol> = (0..grid.len())
            .map(|_| ids.instantiate(catalog.filler()))
            .collect();
        for (slot, key) in INITIAL_SEED {
            if slot >= symbols.len() {
                continue;
            }
            if let Ok(def) = catalog.lookup(&SymbolKey::new(key)) {
                symbols[slot] = ids.instantiate(def);
            }
        }
        Self { symbols }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    /// All entries in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Index of the entry with the given instance id.
    #[must_use]
    pub fn position_of(&self, id: InstanceId) -> Option<usize> {
        self.symbols.iter().position(|s| s.id() == id)
    }

    /// Index of the first entry of kind `key`.
    #[must_use]
    pub fn first_of(&self, key: &SymbolKey) -> Option<usize> {
        self.symbols.iter().position(|s| s.is(key))
    }

    /// Number of entries of kind `key`.
    #[must_use]
    pub fn count_of(&self, key: &SymbolKey) -> usize {
        self.symbols.iter().filter(|s| s.is(key)).count()
    }

    pub(crate) fn push(&mut self, symbol: Symbol) -> usize {
        self.symbols.push(symbol);
        self.symbols.len() - 1
    }

    pub(crate) fn replace(&mut self, index: usize, symbol: Symbol) -> Option<Symbol> {
        self.symbols
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, symbol))
    }
}

// =============================================================================
// Viewport
// =============================================================================

/// The grid-sized sample of symbols shown for one spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    cells: Vec<Symbol>,
}

impl Viewport {
    /// Wraps exactly one symbol per grid cell.
    #[must_use]
    pub fn from_symbols(cells: Vec<Symbol>) -> Self {
        Self { cells }
    }

    /// The pre-spin viewport: the first grid-many owned entries, padded with
    /// fresh fillers if the collection is short.
    #[must_use]
    pub fn mirror(
        owned: &OwnedCollection,
        catalog: &SymbolCatalog,
        grid: GridTopology,
        ids: &mut InstanceAllocator,
    ) -> Self {
        let mut cells: Vec<Symbol> = owned.iter().take(grid.len()).cloned().collect();
        while cells.len() < grid.len() {
            cells.push(ids.instantiate(catalog.filler()));
        }
        Self { cells }
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the viewport has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Symbol at `pos`.
    #[must_use]
    pub fn get(&self, pos: GridPosition) -> Option<&Symbol> {
        self.cells.get(pos.index())
    }

    /// Mutable symbol at `pos`.
    pub fn get_mut(&mut self, pos: GridPosition) -> Option<&mut Symbol> {
        self.cells.get_mut(pos.index())
    }

    /// Cells in grid order.
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.cells
    }

    /// Iterates `(position, symbol)` pairs in grid order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPosition, &Symbol)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, s)| (GridPosition::new(i), s))
    }

    /// Position of the cell holding the given instance.
    #[must_use]
    pub fn position_of(&self, id: InstanceId) -> Option<GridPosition> {
        self.cells
            .iter()
            .position(|s| s.id() == id)
            .map(GridPosition::new)
    }

    /// Number of cells of kind `key`.
    #[must_use]
    pub fn count_of(&self, key: &SymbolKey) -> usize {
        self.cells.iter().filter(|s| s.is(key)).count()
    }

    /// Sum of all current scores.
    #[must_use]
    pub fn total_score(&self) -> u64 {
        self.cells.iter().map(Symbol::score).sum()
    }

    /// Replaces the cell at `pos`, returning the previous occupant.
    pub fn replace(&mut self, pos: GridPosition, symbol: Symbol) -> Option<Symbol> {
        self.cells
            .get_mut(pos.index())
            .map(|slot| std::mem::replace(slot, symbol))
    }
}
