use std::sync::Arc;

use memory_ascension::core::{AutoConvertToggle, ProgramError};
use memory_ascension::{Catalog, ConversionPair, Simulation, Tier};

const EPSILON: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "expected {expected}, got {actual}"
    );
}

fn simulation() -> Simulation {
    Simulation::new(Arc::new(Catalog::bundled().expect("bundled catalog")))
}

fn computing_simulation(processing_power: u32) -> Simulation {
    let mut sim = simulation();
    sim.state.meta.computing_unlocked = true;
    sim.state.meta.processing_power = processing_power;
    sim.state.meta.prestige_currency = 500.0;
    for tier in [Tier::Nibble, Tier::Byte, Tier::Kilobyte] {
        sim.state.resources.set(tier, 20_000.0);
    }
    sim
}

#[test]
fn thousand_bits_compile_a_single_cycle() {
    let mut sim = simulation();
    sim.state.resources.set(Tier::Bit, 1000.0);

    assert_eq!(sim.prestige_preview(), 1);

    sim.state.resources.set(Tier::Bit, 2499.0);
    assert_eq!(sim.prestige_preview(), 1);
}

#[test]
fn recompile_with_an_empty_ledger_changes_nothing() {
    let mut sim = simulation();
    let before = sim.clone();

    assert!(sim.recompile().is_err());
    assert_eq!(sim, before);
}

#[test]
fn single_auto_conversion_per_tick_without_max() {
    let mut sim = simulation();
    let pair = ConversionPair::new(Tier::Bit, Tier::Nibble).expect("pair");
    sim.state.automation.auto_convert.insert(
        pair,
        AutoConvertToggle {
            enabled: true,
            max: true,
        },
    );
    sim.state.resources.set(Tier::Bit, 100.0);

    sim.tick();

    assert_close(sim.state.resources.get(Tier::Nibble), 1.0);
    assert_close(sim.state.resources.get(Tier::Bit), 96.0);
}

#[test]
fn program_beyond_capacity_is_rejected_without_charge() {
    let mut sim = computing_simulation(2);

    sim.run_program("optimizeMemory").expect("first slot");
    sim.run_program("autoYieldDaemon").expect("second slot");
    let before = sim.state.clone();

    assert_eq!(
        sim.run_program("memoryDefragmenter"),
        Err(ProgramError::CapacityReached(2))
    );
    assert_eq!(sim.state, before);
    assert_eq!(sim.programs.len(), 2);
}

#[test]
fn cancelling_refunds_and_completion_does_not() {
    let mut sim = computing_simulation(1);

    sim.run_program("optimizeMemory").expect("run");
    assert_close(sim.state.resources.get(Tier::Nibble), 18_000.0);
    let refund = sim.stop_program("optimizeMemory").expect("cancel");
    assert_close(refund[&Tier::Nibble], 2000.0);
    assert_close(refund[&Tier::Byte], 500.0);
    assert_close(sim.state.resources.get(Tier::Nibble), 20_000.0);
    assert_close(sim.state.resources.get(Tier::Byte), 20_000.0);

    sim.run_program("optimizeMemory").expect("run again");
    for _ in 0..300 {
        sim.tick();
    }

    assert!(sim.programs.is_empty());
    assert_close(sim.state.resources.get(Tier::Nibble), 18_000.0);
    assert_close(sim.state.resources.get(Tier::Byte), 19_500.0);
    assert_close(sim.state.automation.global_conversion_speed, 900.0);
    assert_close(sim.state.meta.prestige_currency, 480.0);
}

#[test]
fn replayed_hooks_fire_once_per_tick() {
    let mut sim = simulation();
    sim.state.automation.revealed_tiers.insert(Tier::Nibble);
    sim.state.automation.revealed_tiers.insert(Tier::Byte);
    sim.state.resources.set(Tier::Byte, 600.0);
    sim.purchase_upgrade("byteBonus").expect("purchase");
    sim.tick();
    let once = sim.state.automation.global_multiplier;

    sim.replay_owned_upgrades();
    sim.replay_owned_upgrades();
    sim.tick();

    assert_eq!(sim.hooks.len(), 1);
    assert_close(once, 1.0 + 101_f64.log2() * 0.001);
    assert_close(sim.state.automation.global_multiplier, once);
}

#[test]
fn recompile_never_loses_meta_progress() {
    let mut sim = simulation();
    sim.state.meta.prestige_currency = 7.0;
    sim.state.meta.total_cycles = 12.0;
    sim.tick();
    let multiplier = sim.state.automation.global_multiplier;
    sim.state.resources.set(Tier::Bit, 3000.0);
    sim.state.resources.set(Tier::Byte, 40.0);

    let outcome = sim.recompile().expect("recompile");

    assert_eq!(outcome.earned, 2);
    assert_close(sim.state.meta.prestige_currency, 9.0);
    assert_close(sim.state.meta.total_cycles, 14.0);
    assert!(sim.state.automation.global_multiplier >= multiplier);
    assert!(sim.state.resources.iter().all(|(_, amount)| amount == 0.0));

    sim.tick();
    assert!(sim.state.automation.global_multiplier >= multiplier);
}
