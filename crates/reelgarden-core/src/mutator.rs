//! Collection mutator: grants symbols to the owned collection.
//!
//! A granted symbol overwrites a filler when one is available, and the
//! viewport is kept in step with the owned collection for any slot that is
//! currently visible. This is the only path that grows the collection.
//!
//! Replacement slot search order:
//!
//! 1. the first visible filler that is backed by an owned entry
//! 2. the first filler in the owned collection
//! 3. a new entry appended to the owned collection

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::SymbolCatalog;
use crate::collection::{OwnedCollection, Viewport};
use crate::grid::GridPosition;
use crate::resolver::Addition;
use crate::symbol::{InstanceAllocator, Symbol, SymbolDefinition};

/// How a granted symbol entered the owned collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementKind {
    /// An existing entry was overwritten
    Replaced,
    /// The collection grew by one
    Appended,
}

/// Where a granted symbol landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Replaced or appended
    pub kind: PlacementKind,
    /// Index in the owned collection
    pub owned_index: usize,
    /// Viewport cell that now shows the symbol, if any
    pub viewport_position: Option<GridPosition>,
}

/// Applies granted symbols to an owned collection and its viewport.
#[derive(Debug, Clone, Copy)]
pub struct CollectionMutator<'a> {
    catalog: &'a SymbolCatalog,
}

impl<'a> CollectionMutator<'a> {
    /// Creates a mutator that recognises fillers via `catalog`.
    #[must_use]
    pub fn new(catalog: &'a SymbolCatalog) -> Self {
        Self { catalog }
    }

    /// Clones `definition` into a new instance and places it.
    pub fn add_symbol(
        &self,
        owned: &mut OwnedCollection,
        viewport: &mut Viewport,
        definition: &SymbolDefinition,
        ids: &mut InstanceAllocator,
    ) -> Placement {
        let symbol = ids.instantiate(definition);
        let filler = &self.catalog.filler().key;

        let visible = viewport
            .as_slice()
            .iter()
            .filter(|s| s.is(filler))
            .find_map(|s| owned.position_of(s.id()));
        let slot = visible.or_else(|| owned.first_of(filler));

        let placement = match slot {
            Some(owned_index) => {
                let previous = owned.replace(owned_index, symbol.clone());
                let viewport_position = previous
                    .and_then(|old| viewport.position_of(old.id()))
                    .map(|pos| {
                        viewport.replace(pos, symbol.clone());
                        pos
                    });
                Placement {
                    kind: PlacementKind::Replaced,
                    owned_index,
                    viewport_position,
                }
            }
            None => {
                let owned_index = owned.push(symbol.clone());
                // Show the new symbol in place of a padding filler, if any.
                let padding = viewport
                    .iter()
                    .find(|(_, s)| s.is(filler) && owned.position_of(s.id()).is_none())
                    .map(|(pos, _)| pos);
                if let Some(pos) = padding {
                    viewport.replace(pos, symbol.clone());
                }
                Placement {
                    kind: PlacementKind::Appended,
                    owned_index,
                    viewport_position: padding,
                }
            }
        };

        debug!(
            key = %symbol.key(),
            kind = ?placement.kind,
            owned_index = placement.owned_index,
            visible = placement.viewport_position.is_some(),
            "granted symbol"
        );
        placement
    }

    /// Commits a symbol placed by an `add` effect.
    ///
    /// The viewport already shows the new symbol. If the instance it
    /// displaced is owned, that entry is overwritten; otherwise the new
    /// symbol is appended.
    pub fn commit_addition(&self, owned: &mut OwnedCollection, addition: &Addition) -> Placement {
        let symbol: Symbol = addition.symbol.clone();
        let (kind, owned_index) = match owned.position_of(addition.replaced) {
            Some(index) => {
                owned.replace(index, symbol);
                (PlacementKind::Replaced, index)
            }
            None => (PlacementKind::Appended, owned.push(symbol)),
        };
        debug!(
            key = %addition.symbol.key(),
            kind = ?kind,
            owned_index,
            "committed effect addition"
        );
        Placement {
            kind,
            owned_index,
            viewport_position: Some(addition.position),
        }
    }
}
