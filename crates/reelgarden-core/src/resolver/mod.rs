//! Effect resolution for a sampled viewport.
//!
//! The resolver walks the viewport once, source cell by source cell in
//! ascending grid order, and applies each symbol's effects in declaration
//! order. Every mutation is written straight into the viewport, so later
//! sources observe the results of earlier ones: a destroyed symbol is a
//! filler by the time its own turn comes and therefore does nothing.
//!
//! # Invariants
//!
//! - The viewport keeps its length; destroyed cells become fresh fillers
//! - Given the same viewport, catalog and RNG state, resolution is identical
//! - A failing effect is skipped and recorded; it never aborts the pass
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use reelgarden_core::catalog::SymbolCatalog;
//! use reelgarden_core::collection::Viewport;
//! use reelgarden_core::grid::{GridPosition, GridTopology};
//! use reelgarden_core::resolver::EffectResolver;
//! use reelgarden_core::symbol::{InstanceAllocator, SymbolKey};
//!
//! let catalog = SymbolCatalog::standard();
//! let grid = GridTopology::new(4, 5).unwrap();
//! let mut ids = InstanceAllocator::new();
//!
//! let mut cells: Vec<_> = (0..20).map(|_| ids.instantiate(catalog.filler())).collect();
//! cells[6] = ids.instantiate(catalog.lookup(&SymbolKey::new("bee")).unwrap());
//! cells[7] = ids.instantiate(catalog.lookup(&SymbolKey::new("flower")).unwrap());
//!
//! let resolver = EffectResolver::new(&catalog, grid);
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let resolution = resolver.resolve(Viewport::from_symbols(cells), &mut ids, &mut rng);
//!
//! assert_eq!(resolution.viewport.get(GridPosition::new(7)).unwrap().score(), 2);
//! assert_eq!(resolution.log.len(), 1);
//! ```

mod targets;

pub use targets::candidates;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::catalog::SymbolCatalog;
use crate::collection::Viewport;
use crate::error::{EngineError, EngineResult};
use crate::grid::{GridPosition, GridTopology};
use crate::symbol::{ActionKind, Effect, InstanceAllocator, InstanceId, Symbol, SymbolDefinition};

/// One applied effect, in resolution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRecord {
    /// Cell of the symbol whose effect fired
    pub source: GridPosition,
    /// Cells the action was applied to
    pub targets: Vec<GridPosition>,
    /// The action applied
    pub action: ActionKind,
}

/// A symbol placed by an `add` effect.
///
/// The machine commits additions to the owned collection after resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addition {
    /// Cell the new symbol now occupies
    pub position: GridPosition,
    /// Instance that occupied the cell before
    pub replaced: InstanceId,
    /// The new instance
    pub symbol: Symbol,
}

/// An effect application that was skipped because it could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectFailure {
    /// Cell of the symbol carrying the effect
    pub source: GridPosition,
    /// Index of the effect within its definition
    pub effect: usize,
    /// Why it was skipped
    pub error: EngineError,
}

/// Output of one resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The viewport after all effects
    pub viewport: Viewport,
    /// Applied effects in order
    pub log: Vec<EffectRecord>,
    /// Symbols placed by `add` effects, in order
    pub additions: Vec<Addition>,
    /// Skipped effect applications
    pub failures: Vec<EffectFailure>,
}

/// Applies symbol effects to a viewport.
#[derive(Debug, Clone, Copy)]
pub struct EffectResolver<'a> {
    catalog: &'a SymbolCatalog,
    grid: GridTopology,
}

impl<'a> EffectResolver<'a> {
    /// Creates a resolver over the given catalog and topology.
    #[must_use]
    pub fn new(catalog: &'a SymbolCatalog, grid: GridTopology) -> Self {
        Self { catalog, grid }
    }

    /// Resolves every effect in the viewport.
    ///
    /// `ids` supplies identities for fillers left by `destroy` and symbols
    /// placed by `add`; `rng` is drawn once per probability-gated effect
    /// application.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        mut viewport: Viewport,
        ids: &mut InstanceAllocator,
        rng: &mut R,
    ) -> Resolution {
        let mut log = Vec::new();
        let mut additions = Vec::new();
        let mut failures = Vec::new();

        for source in self.grid.positions() {
            let Some(symbol) = viewport.get(source) else {
                break;
            };
            if !symbol.definition().has_effects() {
                continue;
            }
            let source_id = symbol.id();
            let effects = symbol.effects().to_vec();

            for (n, effect) in effects.iter().enumerate() {
                // A previous effect of this symbol may have replaced it.
                if viewport.get(source).map(Symbol::id) != Some(source_id) {
                    break;
                }

                let added = match self.check(effect, &viewport, source) {
                    Ok(added) => added,
                    Err(error) => {
                        warn!(%source, effect = n, %error, "skipping effect");
                        failures.push(EffectFailure {
                            source,
                            effect: n,
                            error,
                        });
                        continue;
                    }
                };

                if let Some(p) = effect.probability {
                    let draw: f64 = rng.gen();
                    if draw >= firing_chance(p) {
                        trace!(%source, effect = n, draw, p, "effect did not fire");
                        continue;
                    }
                }

                let targets: Vec<GridPosition> = candidates(self.grid, effect.location, source)
                    .into_iter()
                    .filter(|&t| viewport.get(t).is_some_and(|s| effect.accepts(s.key())))
                    .collect();
                if targets.is_empty() {
                    continue;
                }

                for &target in &targets {
                    self.apply(effect, added, &mut viewport, target, ids, &mut additions);
                }
                trace!(%source, action = %effect.action, targets = targets.len(), "effect applied");
                log.push(EffectRecord {
                    source,
                    targets,
                    action: effect.action,
                });
            }
        }

        debug!(
            applied = log.len(),
            added = additions.len(),
            failed = failures.len(),
            "resolved viewport"
        );
        Resolution {
            viewport,
            log,
            additions,
            failures,
        }
    }

    /// Validates keys referenced by an effect. Returns the definition an
    /// `add` effect places.
    fn check(
        &self,
        effect: &Effect,
        viewport: &Viewport,
        source: GridPosition,
    ) -> EngineResult<Option<&'a SymbolDefinition>> {
        if let Some(keys) = &effect.targets {
            for key in keys {
                self.catalog.lookup(key)?;
            }
        }
        if effect.action != ActionKind::Add {
            return Ok(None);
        }
        let key = effect.symbol.as_ref().ok_or_else(|| EngineError::MissingActionSymbol {
            key: viewport
                .get(source)
                .map(|s| s.key().clone())
                .unwrap_or_else(|| self.catalog.filler().key.clone()),
        })?;
        self.catalog.lookup(key).map(Some)
    }

    fn apply(
        &self,
        effect: &Effect,
        added: Option<&SymbolDefinition>,
        viewport: &mut Viewport,
        target: GridPosition,
        ids: &mut InstanceAllocator,
        additions: &mut Vec<Addition>,
    ) {
        match effect.action {
            ActionKind::Destroy => {
                viewport.replace(target, ids.instantiate(self.catalog.filler()));
            }
            ActionKind::Add => {
                let Some(def) = added else { return };
                let symbol = ids.instantiate(def);
                if let Some(old) = viewport.replace(target, symbol.clone()) {
                    additions.push(Addition {
                        position: target,
                        replaced: old.id(),
                        symbol,
                    });
                }
            }
            ActionKind::MultiplyScore => {
                if let Some(s) = viewport.get_mut(target) {
                    s.set_score(effect.magnitude().scale(s.score()));
                }
            }
            ActionKind::IncreaseScore => {
                if let Some(s) = viewport.get_mut(target) {
                    s.set_score(effect.magnitude().offset(s.score()));
                }
            }
        }
    }
}

/// Probability clamped to `[0, 1]`; NaN never fires.
fn firing_chance(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
