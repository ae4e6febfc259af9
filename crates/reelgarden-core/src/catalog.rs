//! Symbol catalog: the static registry of symbol definitions.
//!
//! The catalog preserves insertion order, which makes [`SymbolCatalog::by_rarity`]
//! and [`SymbolCatalog::iter`] stable across runs. It is immutable once built.
//!
//! # Example
//!
//! ```
//! use reelgarden_core::catalog::SymbolCatalog;
//! use reelgarden_core::symbol::{Rarity, SymbolKey};
//!
//! let catalog = SymbolCatalog::standard();
//! assert_eq!(catalog.lookup(&SymbolKey::new("cat")).unwrap().name, "Cat");
//! assert_eq!(catalog.by_rarity(Rarity::Special).len(), 1);
//! assert!(catalog.by_rarity(Rarity::Rare).is_empty());
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::symbol::{
    ActionKind, Effect, LocationRule, Magnitude, Rarity, SymbolDefinition, SymbolKey,
};

/// Key of the filler symbol in the standard catalog.
pub const FILLER_KEY: &str = "empty";

/// Serialized form of a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSource {
    /// Key of the filler definition
    pub filler: SymbolKey,
    /// Definitions in registration order
    pub symbols: Vec<SymbolDefinition>,
}

/// Immutable registry of symbol definitions.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    definitions: Vec<SymbolDefinition>,
    index: HashMap<SymbolKey, usize>,
    by_rarity: HashMap<Rarity, Vec<SymbolDefinition>>,
    filler: usize,
}

impl SymbolCatalog {
    /// Builds a catalog.
    ///
    /// # Errors
    ///
    /// - [`EngineError::DuplicateSymbolKind`] if two definitions share a key
    /// - [`EngineError::UnknownSymbolKind`] if `filler` is not among them
    pub fn new(definitions: Vec<SymbolDefinition>, filler: &SymbolKey) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(definitions.len());
        let mut by_rarity: HashMap<Rarity, Vec<SymbolDefinition>> = HashMap::new();
        for (i, def) in definitions.iter().enumerate() {
            if index.insert(def.key.clone(), i).is_some() {
                return Err(EngineError::DuplicateSymbolKind {
                    key: def.key.clone(),
                });
            }
            by_rarity.entry(def.rarity).or_default().push(def.clone());
        }
        let filler = *index
            .get(filler)
            .ok_or_else(|| EngineError::UnknownSymbolKind {
                key: filler.clone(),
            })?;
        Ok(Self {
            definitions,
            index,
            by_rarity,
            filler,
        })
    }

    /// Builds a catalog from its serialized form.
    ///
    /// # Errors
    ///
    /// Same as [`SymbolCatalog::new`].
    pub fn from_source(source: CatalogSource) -> EngineResult<Self> {
        Self::new(source.symbols, &source.filler)
    }

    /// Returns the serializable form of this catalog.
    #[must_use]
    pub fn to_source(&self) -> CatalogSource {
        CatalogSource {
            filler: self.filler().key.clone(),
            symbols: self.definitions.clone(),
        }
    }

    /// The built-in symbol library.
    #[must_use]
    pub fn standard() -> Self {
        let definitions = vec![
            SymbolDefinition::new(FILLER_KEY, "Empty", 0, Rarity::Special),
            SymbolDefinition::new("bee", "Bee", 1, Rarity::Common)
                .with_color("yellow.400")
                .with_effect(
                    Effect::new(LocationRule::Adjacent, ActionKind::MultiplyScore)
                        .targeting(["flower"])
                        .with_magnitude(Magnitude::whole(2)),
                ),
            SymbolDefinition::new("cat", "Cat", 1, Rarity::Common)
                .with_color("orange.400")
                .with_effect(
                    Effect::new(LocationRule::Adjacent, ActionKind::Destroy).targeting(["milk"]),
                ),
            SymbolDefinition::new("cherry", "Cherry", 1, Rarity::Common).with_color("red.500"),
            SymbolDefinition::new("coin", "Coin", 1, Rarity::Common)
                .with_color("yellow.500")
                .with_effect(
                    Effect::new(LocationRule::SameRow, ActionKind::IncreaseScore)
                        .targeting(["coin"]),
                ),
            SymbolDefinition::new("flower", "Flower", 1, Rarity::Common).with_color("purple.400"),
            SymbolDefinition::new("milk", "Milk", 1, Rarity::Common).with_color("gray.300"),
            SymbolDefinition::new("spade", "Spade", 1, Rarity::Common),
        ];
        // The standard library has unique keys and contains its filler.
        match Self::new(definitions, &SymbolKey::new(FILLER_KEY)) {
            Ok(catalog) => catalog,
            Err(err) => unreachable!("standard catalog is malformed: {err}"),
        }
    }

    /// Looks up a definition by key.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownSymbolKind`] if the key is not registered.
    pub fn lookup(&self, key: &SymbolKey) -> EngineResult<&SymbolDefinition> {
        self.index
            .get(key)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| EngineError::UnknownSymbolKind { key: key.clone() })
    }

    /// Definitions of the given rarity, in registration order.
    #[must_use]
    pub fn by_rarity(&self, rarity: Rarity) -> &[SymbolDefinition] {
        self.by_rarity
            .get(&rarity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The filler definition.
    #[must_use]
    pub fn filler(&self) -> &SymbolDefinition {
        &self.definitions[self.filler]
    }

    /// Returns true if `key` is the filler key.
    #[must_use]
    pub fn is_filler(&self, key: &SymbolKey) -> bool {
        &self.filler().key == key
    }

    /// Returns true if the key is registered.
    #[must_use]
    pub fn contains(&self, key: &SymbolKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the catalog has no definitions. Never true for a built catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolDefinition> {
        self.definitions.iter()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
