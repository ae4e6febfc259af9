//! Presentation requests and completion tickets.
//!
//! The engine never waits on animations. Instead, resolving a spin queues a
//! sequence of [`PresentationRequest`]s; the presentation layer plays the
//! request at the head of the queue and signals completion with its
//! [`PresentationTicket`]. Only then does the next request become current.
//!
//! # Ordering
//!
//! 1. One [`PresentationRequest::EffectTransition`] per applied effect, in
//!    resolution order
//! 2. One [`PresentationRequest::ScoreAccrual`] per score batch, ascending
//!
//! Score accrues to the session total when its accrual request completes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::GridPosition;
use crate::symbol::ActionKind;

/// Identifies one queued request: the spin it belongs to and its place in
/// that spin's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PresentationTicket {
    /// Spin sequence number
    pub spin: u64,
    /// Position within the spin's request sequence
    pub sequence: u32,
}

impl fmt::Display for PresentationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spin {} step {}", self.spin, self.sequence)
    }
}

/// Something the presentation layer should play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationRequest {
    /// An effect fired from `source` onto `targets`.
    EffectTransition {
        /// Cell of the acting symbol
        source: GridPosition,
        /// Cells acted upon
        targets: Vec<GridPosition>,
        /// What was done
        action: ActionKind,
    },
    /// A batch of cells sharing one score pays out.
    ScoreAccrual {
        /// Cells in the batch
        positions: Vec<GridPosition>,
        /// Score of each member
        score: u64,
        /// Total added to the session score on completion
        amount: u64,
    },
}

impl PresentationRequest {
    /// Every cell the request animates.
    #[must_use]
    pub fn positions(&self) -> Vec<GridPosition> {
        match self {
            Self::EffectTransition {
                source, targets, ..
            } => std::iter::once(*source).chain(targets.iter().copied()).collect(),
            Self::ScoreAccrual { positions, .. } => positions.clone(),
        }
    }

    /// Score added when this request completes.
    #[must_use]
    pub const fn accrual(&self) -> u64 {
        match self {
            Self::EffectTransition { .. } => 0,
            Self::ScoreAccrual { amount, .. } => *amount,
        }
    }
}

/// A queued request together with its ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Ticket to hand back on completion
    pub ticket: PresentationTicket,
    /// What to play
    pub request: PresentationRequest,
}

/// Plays presentation requests for callers that drive the machine
/// synchronously, such as headless simulations.
///
/// [`SlotMachine::drive`](crate::machine::SlotMachine::drive) calls
/// [`PresentationDriver::play`] for each request and treats return as the
/// completion signal.
pub trait PresentationDriver {
    /// Plays one request to completion.
    fn play(&mut self, pending: &PendingRequest);
}

/// Driver that completes every request immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantDriver;

impl PresentationDriver for InstantDriver {
    fn play(&mut self, _pending: &PendingRequest) {}
}
