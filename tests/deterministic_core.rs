use std::sync::Arc;

use memory_ascension::core::AutoConvertToggle;
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

#[test]
fn repeated_ticks_are_deterministic() {
    let mut a = simulation();
    a.state.resources.set(Tier::Bit, 200.0);
    a.purchase_upgrade("bitAutoClicker").expect("auto clicker");
    a.purchase_upgrade("bitOverclocker").expect("overclocker");
    a.state.automation.revealed_tiers.insert(Tier::Nibble);
    a.state.automation.auto_convert.insert(
        ConversionPair::new(Tier::Bit, Tier::Nibble).expect("pair"),
        AutoConvertToggle {
            enabled: true,
            max: false,
        },
    );

    let mut b = a.clone();
    for _ in 0..64 {
        a.tick();
        b.tick();
        assert_eq!(a, b);
    }
}

#[test]
fn purchased_effects_wait_for_the_next_tick() {
    let mut sim = simulation();
    sim.state.resources.set(Tier::Bit, 5.0);

    sim.purchase_upgrade("bitDoubler").expect("purchase");
    assert_close(sim.state.resources.get(Tier::Bit), 0.0);
    assert_close(sim.state.generation.manual_gain, 1.0);
    assert_eq!(sim.pending_effects(), 1);

    sim.tick();

    assert_close(sim.state.generation.manual_gain, 2.0);
    assert_eq!(sim.pending_effects(), 0);
}

#[test]
fn buying_twice_charges_once() {
    let mut sim = simulation();
    sim.state.resources.set(Tier::Bit, 50.0);

    sim.purchase_upgrade("bitDoubler").expect("first purchase");
    assert!(sim.purchase_upgrade("bitDoubler").is_err());
    sim.tick();

    assert_close(sim.state.resources.get(Tier::Bit), 45.0);
    assert_close(sim.state.generation.manual_gain, 2.0);
}

#[test]
fn one_second_of_ticks_matches_configured_rate() {
    let mut sim = simulation().with_tick_millis(250);
    sim.state.meta.passive_yield.insert(Tier::Bit, 3.0);

    for _ in 0..4 {
        sim.tick();
    }
    assert_close(sim.state.resources.get(Tier::Bit), 3.0);

    for _ in 0..3 {
        sim.tick();
    }
    assert_close(sim.state.resources.get(Tier::Bit), 3.0);
    assert_eq!(sim.tick_index, 7);
}
