//! Snapshots of a running town: capture, bytes, restore into a fresh app,
//! and the registry-driven resource round trip.

use crate::snapshot::TownSnapshot;
use crate::test_harness::TestTown;
use crate::with_registry;

#[test]
fn running_town_survives_a_snapshot() {
    let mut source = TestTown::with_starter_town(11);
    source.tick(3000);

    let snapshot = TownSnapshot::capture(source.world_mut());
    let bytes = snapshot.to_bytes();
    let decoded = TownSnapshot::from_bytes(&bytes).expect("fresh bytes decode");

    let mut target = TestTown::new();
    decoded.restore(target.world_mut());

    assert_eq!(target.structure_count(), source.structure_count());
    assert_eq!(target.clock().minutes, source.clock().minutes);
    target.assert_treasury(source.budget().treasury);
    assert_eq!(target.transit().stops.len(), 4);
    assert_eq!(target.transit().buses.len(), 2);
    assert_eq!(target.transit().total_passengers(), 0);

    let residents = target.counters().residents as usize;
    target.assert_citizen_count(residents);
    assert_eq!(target.tourist_count(), 0);

    let (source_report, target_report) = (source.report(), target.report());
    assert_eq!(target_report.uncollected, source_report.uncollected);
    assert_eq!(
        target_report.occupancy.total_rooms,
        source_report.occupancy.total_rooms
    );
    assert_eq!(target_report.stockpile, source_report.stockpile);

    // The restored town keeps running.
    target.tick(600);
    target.assert_ledger_consistent();
    target.assert_occupancy_consistent();
}

#[test]
fn registry_round_trip_restores_resources() {
    let mut source = TestTown::with_starter_town(5);
    source.tick(1200);
    let saved = with_registry(source.world_mut(), |registry, world| registry.save_all(world))
        .expect("the simulation plugin installs the registry");
    assert!(saved.contains_key("sim_clock"));
    assert!(saved.contains_key("town_budget"));

    let mut target = TestTown::new();
    with_registry(target.world_mut(), |registry, world| {
        registry.load_all(world, &saved)
    })
    .unwrap();

    assert_eq!(target.clock().minutes, source.clock().minutes);
    target.assert_treasury(source.budget().treasury);
    assert_eq!(target.counters().residents, source.counters().residents);
}
