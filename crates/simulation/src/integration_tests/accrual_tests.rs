//! Accrual through the full tick: monotonic growth up to the cap, zero-delta
//! idempotence, district bonus and apartment rent.

use bevy::prelude::*;

use crate::game_actions::TownAction;
use crate::structures::{
    BoostKind, Category, IncomeKind, Payload, ResourceKind, Structure, StructureKind,
};
use crate::test_harness::TestTown;

fn unit_rent(town: &TestTown, apartment: Entity, unit: usize) -> f64 {
    match &town.structure(apartment).payload {
        Payload::Apartment(a) => a.units[unit].accumulated_rent,
        _ => unreachable!(),
    }
}

#[test]
fn house_income_is_monotonic_and_capped() {
    let mut town = TestTown::new().with_clock(0, 9.0).without_arrivals();
    let house = town.place(StructureKind::House, 100.0);

    let mut last = 0.0;
    for _ in 0..12_000 {
        town.tick(1);
        let income = town.structure(house).accrual.income;
        assert!(income >= last, "income fell from {last} to {income}");
        assert!(income <= 60.0, "income {income} over the cap");
        last = income;
    }
    // 400 simulated minutes at 0.5 per minute is well past the 60 cap.
    assert_eq!(last, 60.0);
}

#[test]
fn zero_delta_ticks_change_no_accumulator() {
    let mut town = TestTown::new().with_clock(0, 9.0).without_arrivals();
    town.place(StructureKind::House, 100.0);
    town.place(StructureKind::PlainIncome(IncomeKind::Office), 300.0);
    town.place(StructureKind::ResourceProducer(ResourceKind::Farm), 500.0);
    let apartment = town.place(StructureKind::Apartment, 700.0);
    town.move_in(apartment, 0, 800, 8.0);
    town.tick(300);

    town.apply(TownAction::SetPaused { paused: true });
    let snapshot = |town: &mut TestTown| -> Vec<Structure> {
        let world = town.world_mut();
        let mut query = world.query::<&Structure>();
        let mut all: Vec<Structure> = query.iter(world).cloned().collect();
        all.sort_by(|a, b| a.position.total_cmp(&b.position));
        all
    };
    let before = snapshot(&mut town);
    town.tick(120);
    let after = snapshot(&mut town);
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.accrual, b.accrual, "{:?} moved while paused", a.kind);
    }
}

#[test]
fn apartment_rent_accrues_eighty_in_ten_minutes() {
    let mut town = TestTown::new().with_clock(0, 9.0).without_arrivals();
    let apartment = town.place(StructureKind::Apartment, 400.0);
    town.move_in(apartment, 0, 800, 8.0);

    town.jump_minutes(10.0);
    assert_eq!(unit_rent(&town, apartment, 0), 80.0);

    // Clamped at the per-unit maximum.
    town.jump_minutes(100.0);
    assert_eq!(unit_rent(&town, apartment, 0), 400.0);
}

#[test]
fn district_bonus_pays_twenty_percent_more() {
    let mut town = TestTown::new()
        .with_clock(0, 9.0)
        .without_arrivals()
        .with_district("Old Town", 0.0, 600.0, Category::Residential);
    let favoured = town.place(StructureKind::House, 100.0);
    let plain = town.place(StructureKind::House, 1500.0);
    assert_eq!(town.structure(favoured).district_bonus, 1.2);
    assert_eq!(town.structure(plain).district_bonus, 1.0);

    town.jump_minutes(10.0);
    let favoured = town.structure(favoured).accrual.income;
    let plain = town.structure(plain).accrual.income;
    assert_eq!(plain, 5.0);
    assert!((favoured - plain * 1.2).abs() < 1e-9, "{favoured} vs {plain}");
}

#[test]
fn park_boosts_nearby_income() {
    let mut town = TestTown::new().with_clock(0, 9.0).without_arrivals();
    let near = town.place(StructureKind::House, 100.0);
    let far = town.place(StructureKind::House, 1500.0);
    town.place(StructureKind::BoostEmitter(BoostKind::Park), 180.0);

    town.jump_minutes(10.0);
    assert!((town.structure(near).accrual.income - 5.5).abs() < 1e-9);
    assert_eq!(town.structure(far).accrual.income, 5.0);
}

#[test]
fn farm_fills_storage_without_bonus() {
    let mut town = TestTown::new()
        .with_clock(0, 9.0)
        .without_arrivals()
        .with_district("Fields", 0.0, 600.0, Category::Industry);
    let farm = town.place(StructureKind::ResourceProducer(ResourceKind::Farm), 100.0);

    town.jump_minutes(10.0);
    assert!((town.structure(farm).accrual.stored_resources - 4.0).abs() < 1e-9);
    town.jump_minutes(1000.0);
    assert_eq!(town.structure(farm).accrual.stored_resources, 100.0);
}
