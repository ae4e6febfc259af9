//! Test helpers for building sessions and driving them through spins.

use crate::collection::OwnedCollection;
use crate::machine::{SlotMachine, SpinReport};
use crate::presentation::{PendingRequest, PresentationDriver};
use crate::symbol::{Symbol, SymbolKey};

// =============================================================================
// Tracing
// =============================================================================

/// Routes engine logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Session Setup
// =============================================================================

/// Replaces the machine's collection with the given keys, in order.
pub fn set_collection(machine: &mut SlotMachine, keys: &[&str]) {
    let symbols: Vec<Symbol> = keys
        .iter()
        .map(|k| machine.instantiate(&SymbolKey::new(k)).unwrap())
        .collect();
    machine
        .set_collection(OwnedCollection::from_symbols(symbols))
        .unwrap();
}

/// Runs one full spin: sample, resolve, present, then take the first offer.
pub fn play_spin(machine: &mut SlotMachine) -> SpinReport {
    machine.spin().unwrap();
    let report = machine.viewport_mounted().unwrap();
    if machine.pending_request().is_some() {
        machine.drain_presentation().unwrap();
    }
    let prize = machine.reward_choices()[0].key.clone();
    machine.select_prize(&prize).unwrap();
    report
}

/// Keys of the current viewport, row-major.
pub fn viewport_keys(machine: &SlotMachine) -> Vec<String> {
    machine
        .viewport()
        .as_slice()
        .iter()
        .map(|s| s.key().as_str().to_string())
        .collect()
}

// =============================================================================
// Recording Driver
// =============================================================================

/// Presentation driver that remembers everything it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    /// Requests in play order
    pub played: Vec<PendingRequest>,
}

impl PresentationDriver for RecordingDriver {
    fn play(&mut self, pending: &PendingRequest) {
        self.played.push(pending.clone());
    }
}
