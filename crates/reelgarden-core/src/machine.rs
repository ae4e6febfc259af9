//! Spin state machine: orchestrates one game session.
//!
//! The machine owns the session's collection, viewport, score and RNG and
//! moves through a fixed lifecycle:
//!
//! ```text
//! Idle --spin()--> Spinning --viewport_mounted()--> Resolving
//!   ^                                                   |
//!   |                               complete() x N, queue empty
//!   |                                                   v
//!   +--------select_prize() | skip_prize()-------- RewardSelection
//!
//! Idle --open_payment()--> PaymentPending --close_payment()--> Idle
//! ```
//!
//! When the reward policy offers nothing, the machine returns to `Idle`
//! as soon as the queue empties. No state is terminal.
//!
//! # Suspension points
//!
//! `spin()` stops in `Spinning` until the presentation layer reports that
//! the new viewport is mounted. Resolution then runs synchronously, but its
//! results are released one [`PendingRequest`] at a time: each must be
//! completed with its ticket before the next becomes current, and score
//! accrues only as accrual requests complete.
//!
//! # Guards
//!
//! Every transition checks the current state first. A rejected call returns
//! [`EngineError::InvalidGuardState`] and changes nothing.
//!
//! # Example
//!
//! ```
//! use reelgarden_core::machine::{SlotMachine, SpinState};
//!
//! let mut machine = SlotMachine::with_seed(42);
//! machine.spin().unwrap();
//! assert_eq!(machine.state(), SpinState::Spinning);
//! assert!(machine.spin().is_err());
//!
//! let report = machine.viewport_mounted().unwrap();
//! machine.drain_presentation().unwrap();
//! assert_eq!(machine.score(), report.total);
//!
//! let choice = machine.reward_choices()[0].key.clone();
//! machine.select_prize(&choice).unwrap();
//! assert_eq!(machine.state(), SpinState::Idle);
//! ```

use std::collections::VecDeque;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::SymbolCatalog;
use crate::collection::{OwnedCollection, Viewport};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::grid::GridTopology;
use crate::mutator::{CollectionMutator, Placement};
use crate::presentation::{
    PendingRequest, PresentationDriver, PresentationRequest, PresentationTicket,
};
use crate::resolver::{EffectFailure, EffectRecord, EffectResolver};
use crate::reward::{RewardPolicy, UniformRewardPolicy};
use crate::sampler::sample_viewport;
use crate::symbol::{InstanceAllocator, Symbol, SymbolDefinition, SymbolKey};
use crate::tabulator::{tabulate, ScoreBatch};

// =============================================================================
// States
// =============================================================================

/// Lifecycle state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinState {
    /// Waiting for input
    Idle,
    /// A viewport was sampled; waiting for it to be mounted
    Spinning,
    /// Presentation requests are being played
    Resolving,
    /// Reward candidates are on offer
    RewardSelection,
    /// The payment window is open
    PaymentPending,
}

impl SpinState {
    /// Human-readable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Spinning => "spinning",
            Self::Resolving => "resolving",
            Self::RewardSelection => "selecting a reward",
            Self::PaymentPending => "payment is pending",
        }
    }
}

impl fmt::Display for SpinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal state with the data each phase carries.
#[derive(Debug)]
enum Phase {
    Idle,
    Spinning,
    Resolving { queue: VecDeque<PendingRequest> },
    RewardSelection { choices: Vec<SymbolDefinition> },
    PaymentPending,
}

impl Phase {
    const fn state(&self) -> SpinState {
        match self {
            Self::Idle => SpinState::Idle,
            Self::Spinning => SpinState::Spinning,
            Self::Resolving { .. } => SpinState::Resolving,
            Self::RewardSelection { .. } => SpinState::RewardSelection,
            Self::PaymentPending => SpinState::PaymentPending,
        }
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Snapshot of the session as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinSession {
    /// Spin sequence number (0 before the first spin)
    pub sequence: u64,
    /// Current viewport
    pub viewport: Viewport,
    /// Cumulative score
    pub score: u64,
    /// Lifecycle state
    pub state: SpinState,
}

/// Everything one resolution produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinReport {
    /// Spin sequence number
    pub spin: u64,
    /// Applied effects in order
    pub log: Vec<EffectRecord>,
    /// Score batches in ascending order
    pub batches: Vec<ScoreBatch>,
    /// Skipped effect applications
    pub failures: Vec<EffectFailure>,
    /// Where `add` effects landed in the owned collection
    pub additions: Vec<Placement>,
    /// Score this spin will accrue once presented
    pub total: u64,
}

// =============================================================================
// Slot Machine
// =============================================================================

/// One game session: collection, viewport, score and lifecycle.
pub struct SlotMachine {
    catalog: SymbolCatalog,
    grid: GridTopology,
    reward_choices: usize,
    reward_policy: Box<dyn RewardPolicy>,
    owned: OwnedCollection,
    viewport: Viewport,
    ids: InstanceAllocator,
    rng: ChaCha8Rng,
    seed: u64,
    score: u64,
    spin_count: u64,
    phase: Phase,
}

impl fmt::Debug for SlotMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotMachine")
            .field("grid", &self.grid)
            .field("state", &self.state())
            .field("score", &self.score)
            .field("spin_count", &self.spin_count)
            .field("owned", &self.owned.len())
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl SlotMachine {
    /// Creates a session over `catalog`.
    ///
    /// The owned collection starts from the fixed seed layout and the
    /// viewport mirrors it until the first spin.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGrid`] if the configured grid is empty.
    pub fn new(catalog: SymbolCatalog, config: &EngineConfig) -> EngineResult<Self> {
        let grid = config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self::from_parts(
            catalog,
            grid,
            config.reward_choices,
            Box::new(UniformRewardPolicy::new(config.reward_rarity)),
            seed,
        ))
    }

    /// Creates a session with the standard catalog, default config and a
    /// fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let config = EngineConfig::default();
        Self::from_parts(
            SymbolCatalog::standard(),
            GridTopology::default(),
            config.reward_choices,
            Box::new(UniformRewardPolicy::new(config.reward_rarity)),
            seed,
        )
    }

    fn from_parts(
        catalog: SymbolCatalog,
        grid: GridTopology,
        reward_choices: usize,
        reward_policy: Box<dyn RewardPolicy>,
        seed: u64,
    ) -> Self {
        let mut ids = InstanceAllocator::new();
        let owned = OwnedCollection::initial(&catalog, grid, &mut ids);
        let viewport = Viewport::mirror(&owned, &catalog, grid, &mut ids);
        info!(seed, rows = grid.rows(), columns = grid.columns(), "new session");
        Self {
            catalog,
            grid,
            reward_choices,
            reward_policy,
            owned,
            viewport,
            ids,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            score: 0,
            spin_count: 0,
            phase: Phase::Idle,
        }
    }

    /// Replaces the reward selection strategy.
    #[must_use]
    pub fn with_reward_policy(mut self, policy: Box<dyn RewardPolicy>) -> Self {
        self.reward_policy = policy;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SpinState {
        self.phase.state()
    }

    /// True when a spin would be accepted.
    #[must_use]
    pub const fn can_spin(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Cumulative score for the session.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Number of spins started.
    #[must_use]
    pub const fn spin_count(&self) -> u64 {
        self.spin_count
    }

    /// The seed the session RNG was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The current viewport.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The owned collection.
    #[must_use]
    pub const fn owned(&self) -> &OwnedCollection {
        &self.owned
    }

    /// The symbol catalog.
    #[must_use]
    pub const fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// The grid topology.
    #[must_use]
    pub const fn grid(&self) -> GridTopology {
        self.grid
    }

    /// Snapshot of the session.
    #[must_use]
    pub fn session(&self) -> SpinSession {
        SpinSession {
            sequence: self.spin_count,
            viewport: self.viewport.clone(),
            score: self.score,
            state: self.state(),
        }
    }

    /// Reward candidates on offer; empty outside reward selection.
    #[must_use]
    pub fn reward_choices(&self) -> &[SymbolDefinition] {
        match &self.phase {
            Phase::RewardSelection { choices } => choices,
            _ => &[],
        }
    }

    /// The request the presentation layer should play next.
    #[must_use]
    pub fn pending_request(&self) -> Option<&PendingRequest> {
        match &self.phase {
            Phase::Resolving { queue } => queue.front(),
            _ => None,
        }
    }

    /// Number of requests still queued.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        match &self.phase {
            Phase::Resolving { queue } => queue.len(),
            _ => 0,
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Creates an instance of `key` with a session-unique id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownSymbolKind`] if the key is not in the catalog.
    pub fn instantiate(&mut self, key: &SymbolKey) -> EngineResult<Symbol> {
        let def = self.catalog.lookup(key)?;
        Ok(self.ids.instantiate(def))
    }

    /// Replaces the owned collection; the viewport is re-mirrored from it.
    ///
    /// Symbols should come from [`SlotMachine::instantiate`] so their ids
    /// stay unique within the session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] unless the machine is idle.
    pub fn set_collection(&mut self, owned: OwnedCollection) -> EngineResult<()> {
        self.guard("replace the collection", SpinState::Idle)?;
        self.viewport = Viewport::mirror(&owned, &self.catalog, self.grid, &mut self.ids);
        self.owned = owned;
        Ok(())
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Starts a spin: samples a new viewport and waits for it to mount.
    ///
    /// Returns the new spin's sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] if a spin is in progress,
    /// a reward is on offer or the payment window is open. Nothing changes.
    pub fn spin(&mut self) -> EngineResult<u64> {
        self.guard("spin", SpinState::Idle)?;
        self.spin_count += 1;
        self.viewport = sample_viewport(
            &self.owned,
            &self.catalog,
            self.grid,
            &mut self.ids,
            &mut self.rng,
        );
        self.phase = Phase::Spinning;
        debug!(spin = self.spin_count, "spin started");
        Ok(self.spin_count)
    }

    /// Signals that the sampled viewport is mounted; resolves the spin.
    ///
    /// Effects are applied, `add` outcomes are committed to the owned
    /// collection, and the presentation queue is filled.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] unless spinning.
    pub fn viewport_mounted(&mut self) -> EngineResult<SpinReport> {
        self.guard("resolve the viewport", SpinState::Spinning)?;

        let viewport = std::mem::replace(&mut self.viewport, Viewport::from_symbols(Vec::new()));
        let resolution = EffectResolver::new(&self.catalog, self.grid).resolve(
            viewport,
            &mut self.ids,
            &mut self.rng,
        );
        self.viewport = resolution.viewport;

        let mutator = CollectionMutator::new(&self.catalog);
        let additions: Vec<Placement> = resolution
            .additions
            .iter()
            .map(|addition| mutator.commit_addition(&mut self.owned, addition))
            .collect();

        let tabulation = tabulate(&self.viewport);
        let spin = self.spin_count;
        let requests = resolution
            .log
            .iter()
            .map(|record| PresentationRequest::EffectTransition {
                source: record.source,
                targets: record.targets.clone(),
                action: record.action,
            })
            .chain(
                tabulation
                    .batches()
                    .iter()
                    .map(|batch| PresentationRequest::ScoreAccrual {
                        positions: batch.positions.clone(),
                        score: batch.score,
                        amount: batch.contribution(),
                    }),
            );
        let queue: VecDeque<PendingRequest> = (0u32..)
            .zip(requests)
            .map(|(sequence, request)| PendingRequest {
                ticket: PresentationTicket { spin, sequence },
                request,
            })
            .collect();

        let report = SpinReport {
            spin,
            total: tabulation.total(),
            log: resolution.log,
            batches: tabulation.into_batches(),
            failures: resolution.failures,
            additions,
        };
        debug!(
            spin,
            effects = report.log.len(),
            batches = report.batches.len(),
            total = report.total,
            "spin resolved"
        );

        if queue.is_empty() {
            self.open_rewards();
        } else {
            self.phase = Phase::Resolving { queue };
        }
        Ok(report)
    }

    /// Signals that the request identified by `ticket` finished playing.
    ///
    /// Returns the score accrued by the request. When the last request
    /// completes, reward candidates are drawn and offered; if there are
    /// none the machine goes straight back to idle.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidGuardState`] unless resolving
    /// - [`EngineError::StaleCompletion`] if `ticket` is not the head request
    pub fn complete(&mut self, ticket: PresentationTicket) -> EngineResult<u64> {
        let state = self.state();
        let Phase::Resolving { queue } = &mut self.phase else {
            return Err(EngineError::InvalidGuardState {
                operation: "complete a presentation request",
                state: state.as_str(),
            });
        };
        let head = queue.front().map(|pending| pending.ticket);
        if head != Some(ticket) {
            return Err(EngineError::StaleCompletion {
                expected: head.map_or_else(|| "nothing".to_string(), |t| t.to_string()),
                got: ticket.to_string(),
            });
        }
        let accrued = queue
            .pop_front()
            .map_or(0, |pending| pending.request.accrual());
        let finished = queue.is_empty();

        self.score = self.score.saturating_add(accrued);
        if accrued > 0 {
            debug!(%ticket, accrued, score = self.score, "score accrued");
        }
        if finished {
            self.open_rewards();
        }
        Ok(accrued)
    }

    /// Completes every queued request in order.
    ///
    /// Callers that impose their own timeout on the presentation layer use
    /// this to flush a spin whose animations never reported back.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] unless resolving.
    pub fn drain_presentation(&mut self) -> EngineResult<u64> {
        self.guard("drain presentation", SpinState::Resolving)?;
        let mut total = 0;
        while let Some(ticket) = self.pending_request().map(|p| p.ticket) {
            total += self.complete(ticket)?;
        }
        Ok(total)
    }

    /// Plays every queued request through `driver`, completing each in turn.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] unless resolving.
    pub fn drive<D: PresentationDriver + ?Sized>(
        &mut self,
        driver: &mut D,
    ) -> EngineResult<u64> {
        self.guard("drive presentation", SpinState::Resolving)?;
        let mut total = 0;
        while let Some(pending) = self.pending_request().cloned() {
            driver.play(&pending);
            total += self.complete(pending.ticket)?;
        }
        Ok(total)
    }

    /// Grants the chosen reward and returns to idle.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidGuardState`] unless selecting a reward
    /// - [`EngineError::InvalidRewardChoice`] if `key` was not offered
    pub fn select_prize(&mut self, key: &SymbolKey) -> EngineResult<Placement> {
        self.guard("select a prize", SpinState::RewardSelection)?;
        let definition = self
            .reward_choices()
            .iter()
            .find(|d| &d.key == key)
            .cloned()
            .ok_or_else(|| EngineError::InvalidRewardChoice { key: key.clone() })?;

        let placement = CollectionMutator::new(&self.catalog).add_symbol(
            &mut self.owned,
            &mut self.viewport,
            &definition,
            &mut self.ids,
        );
        self.phase = Phase::Idle;
        debug!(%key, owned = self.owned.len(), "prize selected");
        Ok(placement)
    }

    /// Declines every offered reward and returns to idle.
    ///
    /// The owned collection is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] unless selecting a reward.
    pub fn skip_prize(&mut self) -> EngineResult<()> {
        self.guard("skip the prize", SpinState::RewardSelection)?;
        self.phase = Phase::Idle;
        debug!(spin = self.spin_count, "prize skipped");
        Ok(())
    }

    /// Opens the payment window.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] unless idle.
    pub fn open_payment(&mut self) -> EngineResult<()> {
        self.guard("open payment", SpinState::Idle)?;
        self.phase = Phase::PaymentPending;
        Ok(())
    }

    /// Closes the payment window.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGuardState`] unless payment is pending.
    pub fn close_payment(&mut self) -> EngineResult<()> {
        self.guard("close payment", SpinState::PaymentPending)?;
        self.phase = Phase::Idle;
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn guard(&self, operation: &'static str, required: SpinState) -> EngineResult<()> {
        let state = self.state();
        if state == required {
            Ok(())
        } else {
            debug!(operation, %state, "rejected by guard");
            Err(EngineError::InvalidGuardState {
                operation,
                state: state.as_str(),
            })
        }
    }

    fn open_rewards(&mut self) {
        let choices = self
            .reward_policy
            .choose(&self.catalog, self.reward_choices, &mut self.rng);
        if choices.is_empty() {
            debug!(spin = self.spin_count, "no rewards to offer");
            self.phase = Phase::Idle;
            return;
        }
        debug!(
            spin = self.spin_count,
            choices = ?choices.iter().map(|d| d.key.as_str()).collect::<Vec<_>>(),
            "rewards offered"
        );
        self.phase = Phase::RewardSelection { choices };
    }
}
