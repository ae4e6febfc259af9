//! # Reelgarden Core
//!
//! Spin-resolution engine for a grid slot machine whose symbols act on one
//! another.
//!
//! A session owns a growing collection of symbols. Each spin samples a 4×5
//! viewport from that collection, lets every visible symbol apply its
//! effects to its neighbours, pays out the resulting scores and then offers
//! a reward symbol to add to the collection.
//!
//! ## Architecture
//!
//! - **Catalog**: immutable symbol definitions ([`catalog`], [`symbol`])
//! - **Collection**: the owned symbols and the visible viewport ([`collection`])
//! - **Pipeline**: sampling, effect resolution, tabulation
//!   ([`sampler`], [`resolver`], [`tabulator`])
//! - **Growth**: reward choice and collection mutation ([`reward`], [`mutator`])
//! - **Lifecycle**: the guarded spin state machine ([`machine`]) and the
//!   presentation handshake it drives ([`presentation`])
//!
//! All randomness flows through one seeded RNG, so a session replays exactly
//! from its seed.
//!
//! ## Usage
//!
//! ```
//! use reelgarden_core::{EngineConfig, InstantDriver, SlotMachine, SymbolCatalog};
//!
//! let config = EngineConfig::default().seeded(7);
//! let mut machine = SlotMachine::new(SymbolCatalog::standard(), &config)?;
//!
//! machine.spin()?;
//! let report = machine.viewport_mounted()?;
//! machine.drive(&mut InstantDriver)?;
//! assert_eq!(machine.score(), report.total);
//!
//! let prize = machine.reward_choices()[0].key.clone();
//! machine.select_prize(&prize)?;
//! assert!(machine.can_spin());
//! # Ok::<(), reelgarden_core::EngineError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod collection;
pub mod config;
pub mod error;
pub mod grid;
pub mod machine;
pub mod mutator;
pub mod presentation;
pub mod resolver;
pub mod reward;
pub mod sampler;
pub mod symbol;
pub mod tabulator;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogSource, SymbolCatalog, FILLER_KEY};
pub use collection::{OwnedCollection, Viewport};
pub use config::{EngineConfig, GridConfig};
pub use error::{EngineError, EngineResult};
pub use grid::{GridPosition, GridTopology};
pub use machine::{SlotMachine, SpinReport, SpinSession, SpinState};
pub use mutator::{CollectionMutator, Placement, PlacementKind};
pub use presentation::{
    InstantDriver, PendingRequest, PresentationDriver, PresentationRequest, PresentationTicket,
};
pub use resolver::{Addition, EffectFailure, EffectRecord, EffectResolver, Resolution};
pub use reward::{RewardPolicy, UniformRewardPolicy};
pub use sampler::sample_viewport;
pub use symbol::{
    ActionKind, Effect, InstanceAllocator, InstanceId, LocationRule, Magnitude, Rarity, Symbol,
    SymbolDefinition, SymbolKey,
};
pub use tabulator::{tabulate, ScoreBatch, Tabulation};
