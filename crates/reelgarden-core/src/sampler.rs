//! Collection sampler: draws a viewport from the owned collection.
//!
//! The owned collection is conceptually padded with fillers up to the grid
//! size, then exactly `grid.len()` distinct entries are drawn without
//! replacement. The draw order is random, not the collection's order.

use rand::seq::index;
use rand::Rng;
use tracing::trace;

use crate::catalog::SymbolCatalog;
use crate::collection::{OwnedCollection, Viewport};
use crate::grid::GridTopology;
use crate::symbol::InstanceAllocator;

/// Samples a fresh viewport.
///
/// Entries drawn from `owned` keep their instance ids; padding fillers get
/// fresh ids that do not appear in `owned`.
pub fn sample_viewport<R: Rng + ?Sized>(
    owned: &OwnedCollection,
    catalog: &SymbolCatalog,
    grid: GridTopology,
    ids: &mut InstanceAllocator,
    rng: &mut R,
) -> Viewport {
    let target = grid.len();
    let padding = target.saturating_sub(owned.len());
    let pool = owned.len() + padding;

    // `index::sample` returns the chosen indices fully shuffled.
    let cells = index::sample(rng, pool, target)
        .into_iter()
        .map(|i| match owned.get(i) {
            Some(symbol) => symbol.clone(),
            None => ids.instantiate(catalog.filler()),
        })
        .collect();

    trace!(owned = owned.len(), padding, target, "sampled viewport");
    Viewport::from_symbols(cells)
}
