//! Integration tests for the full spin lifecycle.
//!
//! These drive a [`SlotMachine`] through sampling, resolution, presentation
//! and reward selection, checking:
//! - State guards and their no-op behaviour
//! - Effect outcomes on whole viewports
//! - Score accrual through the presentation handshake
//! - Collection growth through rewards

use crate::catalog::{CatalogSource, SymbolCatalog};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grid::GridPosition;
use crate::machine::{SlotMachine, SpinState};
use crate::mutator::PlacementKind;
use crate::presentation::{PresentationRequest, PresentationTicket};
use crate::symbol::{ActionKind, Rarity, SymbolDefinition, SymbolKey};

use super::helpers::{init_tracing, play_spin, set_collection, RecordingDriver};

fn key(k: &str) -> SymbolKey {
    SymbolKey::new(k)
}

// =============================================================================
// Sampling
// =============================================================================

#[test]
fn initial_collection_samples_a_full_grid() {
    init_tracing();
    let named = ["cat", "cherry", "coin", "flower", "spade"];
    for seed in 0..10 {
        let mut machine = SlotMachine::with_seed(seed);
        machine.spin().unwrap();
        let viewport = machine.viewport();
        assert_eq!(viewport.len(), 20);
        let named_count: usize = named.iter().map(|k| viewport.count_of(&key(k))).sum();
        assert_eq!(viewport.count_of(&key("empty")) + named_count, 20);
        // Twenty owned entries on a twenty-cell grid: every one is shown.
        assert_eq!(named_count, 5);
    }
}

#[test]
fn small_collection_is_padded_with_fillers() {
    let mut machine = SlotMachine::with_seed(3);
    set_collection(&mut machine, &["cat", "coin"]);
    machine.spin().unwrap();
    let viewport = machine.viewport();
    assert_eq!(viewport.len(), 20);
    assert_eq!(viewport.count_of(&key("cat")), 1);
    assert_eq!(viewport.count_of(&key("coin")), 1);
    assert_eq!(viewport.count_of(&key("empty")), 18);
}

// =============================================================================
// Resolution Through The Machine
// =============================================================================

#[test]
fn all_filler_viewport_pays_a_single_zero_batch() {
    let mut machine = SlotMachine::with_seed(11);
    set_collection(&mut machine, &["empty"; 20]);
    machine.spin().unwrap();
    let report = machine.viewport_mounted().unwrap();

    assert!(report.log.is_empty());
    assert_eq!(report.batches.len(), 1);
    assert_eq!(report.batches[0].score, 0);
    assert_eq!(report.batches[0].positions.len(), 20);
    assert_eq!(report.total, 0);

    machine.drain_presentation().unwrap();
    assert_eq!(machine.score(), 0);
    assert_eq!(machine.state(), SpinState::RewardSelection);
}

#[test]
fn flower_surrounded_by_bees_doubles_per_neighbour() {
    let mut keys = vec!["bee"; 19];
    keys.push("flower");
    let mut machine = SlotMachine::with_seed(21);
    set_collection(&mut machine, &keys);
    machine.spin().unwrap();
    let report = machine.viewport_mounted().unwrap();

    let (pos, flower) = machine
        .viewport()
        .iter()
        .find(|(_, s)| s.is(&key("flower")))
        .unwrap();
    let neighbours = machine.grid().adjacent(pos).len();
    assert_eq!(flower.score(), 1 << neighbours);
    assert_eq!(report.log.len(), neighbours);
    assert!(report
        .log
        .iter()
        .all(|r| r.action == ActionKind::MultiplyScore && r.targets == vec![pos]));
    assert_eq!(report.total, 19 + (1 << neighbours));
}

#[test]
fn coins_in_full_rows_boost_each_other() {
    let mut machine = SlotMachine::with_seed(8);
    set_collection(&mut machine, &["coin"; 20]);
    machine.spin().unwrap();
    let report = machine.viewport_mounted().unwrap();

    // Each coin gains one from each of the four others in its row.
    assert!(machine.viewport().iter().all(|(_, s)| s.score() == 5));
    assert_eq!(report.batches.len(), 1);
    assert_eq!(report.total, 100);
}

#[test]
fn destroyed_milk_stays_owned() {
    let mut keys = vec!["cat"; 19];
    keys.push("milk");
    let mut machine = SlotMachine::with_seed(4);
    set_collection(&mut machine, &keys);
    machine.spin().unwrap();
    let report = machine.viewport_mounted().unwrap();

    assert_eq!(machine.viewport().count_of(&key("milk")), 0);
    assert_eq!(machine.viewport().count_of(&key("empty")), 1);
    assert_eq!(machine.owned().count_of(&key("milk")), 1);
    assert_eq!(report.log[0].action, ActionKind::Destroy);
    assert_eq!(report.total, 19);
}

// =============================================================================
// Presentation Handshake
// =============================================================================

#[test]
fn driver_sees_effects_then_batches() {
    let mut keys = vec!["bee"; 19];
    keys.push("flower");
    let mut machine = SlotMachine::with_seed(30);
    set_collection(&mut machine, &keys);
    machine.spin().unwrap();
    let report = machine.viewport_mounted().unwrap();

    let mut driver = RecordingDriver::default();
    let accrued = machine.drive(&mut driver).unwrap();
    assert_eq!(accrued, report.total);
    assert_eq!(machine.score(), report.total);
    assert_eq!(driver.played.len(), report.log.len() + report.batches.len());

    let (effects, accruals) = driver.played.split_at(report.log.len());
    assert!(effects
        .iter()
        .all(|p| matches!(p.request, PresentationRequest::EffectTransition { .. })));
    let scores: Vec<u64> = accruals
        .iter()
        .map(|p| match &p.request {
            PresentationRequest::ScoreAccrual { score, .. } => *score,
            PresentationRequest::EffectTransition { .. } => panic!("effect after accrual"),
        })
        .collect();
    assert_eq!(scores, vec![1, 1 << report.log.len()]);
}

#[test]
fn stale_ticket_from_previous_spin_is_rejected() {
    let mut machine = SlotMachine::with_seed(12);
    machine.spin().unwrap();
    machine.viewport_mounted().unwrap();
    let first = machine.pending_request().unwrap().ticket;
    machine.drain_presentation().unwrap();
    let prize = machine.reward_choices()[0].key.clone();
    machine.select_prize(&prize).unwrap();

    machine.spin().unwrap();
    machine.viewport_mounted().unwrap();
    let err = machine.complete(first).unwrap_err();
    assert!(matches!(err, EngineError::StaleCompletion { .. }));
    assert_eq!(machine.pending_request().unwrap().ticket.spin, 2);
}

#[test]
fn score_accumulates_across_spins() {
    let mut machine = SlotMachine::with_seed(77);
    let mut expected = 0;
    for _ in 0..6 {
        expected += play_spin(&mut machine).total;
        assert_eq!(machine.score(), expected);
    }
    assert_eq!(machine.spin_count(), 6);
}

// =============================================================================
// Guards
// =============================================================================

#[test]
fn spin_while_not_idle_changes_nothing() {
    let mut machine = SlotMachine::with_seed(5);
    machine.spin().unwrap();

    let session = machine.session();
    let owned = machine.owned().clone();
    assert!(machine.spin().is_err());
    assert_eq!(machine.session(), session);
    assert_eq!(machine.owned(), &owned);

    machine.viewport_mounted().unwrap();
    let session = machine.session();
    let pending = machine.pending_request().cloned();
    assert!(machine.spin().is_err());
    assert_eq!(machine.session(), session);
    assert_eq!(machine.pending_request().cloned(), pending);
}

#[test]
fn payment_window_blocks_spinning() {
    let mut machine = SlotMachine::with_seed(6);
    machine.open_payment().unwrap();
    assert!(!machine.can_spin());
    assert!(matches!(
        machine.spin(),
        Err(EngineError::InvalidGuardState { operation: "spin", .. })
    ));
    assert!(machine.open_payment().is_err());
    machine.close_payment().unwrap();
    assert_eq!(machine.spin().unwrap(), 1);
}

#[test]
fn collection_cannot_change_mid_spin() {
    let mut machine = SlotMachine::with_seed(9);
    machine.spin().unwrap();
    let symbol = machine.instantiate(&key("cat")).unwrap();
    let replacement = crate::collection::OwnedCollection::from_symbols(vec![symbol]);
    assert!(machine.set_collection(replacement).is_err());
    assert_eq!(machine.owned().len(), 20);
}

// =============================================================================
// Growth
// =============================================================================

#[test]
fn rewards_fill_fillers_before_growing() {
    let mut machine = SlotMachine::with_seed(13);
    let fillers = machine.owned().count_of(&key("empty"));
    assert_eq!(fillers, 15);

    for _ in 0..fillers {
        play_spin(&mut machine);
        assert_eq!(machine.owned().len(), 20);
    }
    assert_eq!(machine.owned().count_of(&key("empty")), 0);

    machine.spin().unwrap();
    machine.viewport_mounted().unwrap();
    machine.drain_presentation().unwrap();
    let prize = machine.reward_choices()[0].key.clone();
    let placement = machine.select_prize(&prize).unwrap();
    assert_eq!(placement.kind, PlacementKind::Appended);
    assert_eq!(placement.owned_index, 20);
    assert_eq!(machine.owned().len(), 21);

    // With 21 owned symbols a spin shows 20 of them and no fillers.
    machine.spin().unwrap();
    assert_eq!(machine.viewport().count_of(&key("empty")), 0);
}

#[test]
fn prize_is_visible_when_it_replaces_a_shown_filler() {
    let mut machine = SlotMachine::with_seed(14);
    machine.spin().unwrap();
    machine.viewport_mounted().unwrap();
    machine.drain_presentation().unwrap();
    let prize = machine.reward_choices()[0].key.clone();
    let placement = machine.select_prize(&prize).unwrap();

    assert_eq!(placement.kind, PlacementKind::Replaced);
    let shown = placement.viewport_position.unwrap();
    assert_eq!(machine.viewport().get(shown).unwrap().key(), &prize);
    assert_eq!(
        machine.viewport().get(shown).unwrap().id(),
        machine.owned().get(placement.owned_index).unwrap().id()
    );
}

fn catalog_with_commons(commons: &[&str]) -> SymbolCatalog {
    let mut definitions = vec![SymbolDefinition::new("empty", "Empty", 0, Rarity::Special)];
    definitions.extend(
        commons
            .iter()
            .map(|k| SymbolDefinition::new(k, k, 1, Rarity::Common)),
    );
    definitions.push(SymbolDefinition::new("crown", "Crown", 9, Rarity::Rare));
    SymbolCatalog::new(definitions, &key("empty")).unwrap()
}

#[test]
fn short_pool_offers_what_it_has() {
    let config = EngineConfig::default().seeded(15);
    let mut machine = SlotMachine::new(catalog_with_commons(&["pearl"]), &config).unwrap();
    machine.spin().unwrap();
    machine.viewport_mounted().unwrap();
    machine.drain_presentation().unwrap();

    let offered: Vec<&str> = machine
        .reward_choices()
        .iter()
        .map(|d| d.key.as_str())
        .collect();
    assert_eq!(offered, vec!["pearl"]);

    let owned = machine.owned().clone();
    machine.skip_prize().unwrap();
    assert_eq!(machine.state(), SpinState::Idle);
    assert_eq!(machine.owned(), &owned);
}

#[test]
fn empty_pool_closes_the_offer() {
    init_tracing();
    let config = EngineConfig::default().seeded(16);
    let mut machine = SlotMachine::new(catalog_with_commons(&[]), &config).unwrap();

    for round in 1..=3 {
        assert_eq!(machine.spin().unwrap(), round);
        let report = machine.viewport_mounted().unwrap();
        machine.drive(&mut RecordingDriver::default()).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(machine.state(), SpinState::Idle);
        assert!(machine.reward_choices().is_empty());
        assert!(matches!(
            machine.skip_prize(),
            Err(EngineError::InvalidGuardState { .. })
        ));
    }
    assert_eq!(machine.owned().len(), 20);
}

// =============================================================================
// Data-Driven Catalogs
// =============================================================================

#[test]
fn catalog_loaded_from_json_drives_a_session() {
    let json = r#"{
        "filler": "void",
        "symbols": [
            { "key": "void", "name": "Void", "score": 0, "rarity": "special" },
            { "key": "gem", "name": "Gem", "score": 3, "rarity": "common" },
            {
                "key": "lamp", "name": "Lamp", "score": 1, "rarity": "common",
                "effects": [
                    { "location": "same_column", "action": "increase_score",
                      "targets": ["gem"], "magnitude": { "numerator": 2, "denominator": 1 } }
                ]
            }
        ]
    }"#;
    let source: CatalogSource = serde_json::from_str(json).unwrap();
    let catalog = SymbolCatalog::from_source(source).unwrap();
    let config = EngineConfig::with_grid(2, 2).seeded(1);
    let mut machine = SlotMachine::new(catalog, &config).unwrap();

    // The standard seed layout names no keys from this catalog.
    assert_eq!(machine.owned().len(), 4);
    assert_eq!(machine.owned().count_of(&key("void")), 4);

    set_collection(&mut machine, &["lamp", "void", "gem", "void"]);
    machine.spin().unwrap();
    let report = machine.viewport_mounted().unwrap();
    let gem = machine
        .viewport()
        .iter()
        .find(|(_, s)| s.is(&key("gem")))
        .map(|(_, s)| s.score())
        .unwrap();
    let lamp = machine.viewport().position_of(machine.owned().get(0).unwrap().id()).unwrap();
    let gem_pos = machine.viewport().position_of(machine.owned().get(2).unwrap().id()).unwrap();
    if machine.grid().column(lamp) == machine.grid().column(gem_pos) {
        assert_eq!(gem, 5);
    } else {
        assert_eq!(gem, 3);
    }
    assert_eq!(report.total, gem + 1);

    machine.drain_presentation().unwrap();
    let offered: Vec<&str> = machine.reward_choices().iter().map(|d| d.key.as_str()).collect();
    assert_eq!(offered.len(), 2);
    assert!(offered.contains(&"gem") && offered.contains(&"lamp"));
}

#[test]
fn positions_in_report_lie_on_the_grid() {
    let mut machine = SlotMachine::with_seed(50);
    for _ in 0..10 {
        let report = play_spin(&mut machine);
        let grid = machine.grid();
        for record in &report.log {
            assert!(grid.contains(record.source));
            assert!(record.targets.iter().all(|&t| grid.contains(t)));
        }
        let covered: usize = report.batches.iter().map(|b| b.positions.len()).sum();
        assert_eq!(covered, grid.len());
        assert!(report
            .batches
            .iter()
            .flat_map(|b| b.positions.iter())
            .all(|p: &GridPosition| grid.contains(*p)));
    }
}

#[test]
fn ticket_must_match_exactly() {
    let mut machine = SlotMachine::with_seed(60);
    machine.spin().unwrap();
    machine.viewport_mounted().unwrap();
    let head = machine.pending_request().unwrap().ticket;
    let forged = PresentationTicket {
        spin: head.spin + 1,
        sequence: head.sequence,
    };
    assert!(machine.complete(forged).is_err());
    assert_eq!(machine.complete(head).unwrap_or(u64::MAX), machine.score());
}
