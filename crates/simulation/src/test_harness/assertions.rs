//! Assertion helpers for `TestTown` integration tests.

use crate::structures::{Payload, Structure, StructureKind, TableStatus};

use super::TestTown;

impl TestTown {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    /// Assert the treasury is within `1e-6` of `expected`.
    pub fn assert_treasury(&self, expected: f64) {
        let treasury = self.budget().treasury;
        assert!(
            (treasury - expected).abs() < 1e-6,
            "Expected treasury {expected}, got {treasury}"
        );
    }

    pub fn assert_citizen_count(&mut self, expected: usize) {
        let count = self.citizen_count();
        assert_eq!(count, expected, "Expected {expected} citizens, got {count}");
    }

    /// Assert that every structure's payload matches its kind, every
    /// accumulator is finite and non-negative, and no accrual runs past its
    /// bonus-adjusted cap.
    pub fn assert_ledger_consistent(&mut self) {
        let world = self.world_mut();
        let mut query = world.query::<&Structure>();
        for s in query.iter(world) {
            assert!(s.is_consistent(), "{:?} has a mismatched payload", s.kind);
            assert_accumulators_valid(s);
        }
    }

    /// Assert that no table is both free and held, and no unit is both
    /// tenanted and listed.
    pub fn assert_occupancy_consistent(&mut self) {
        let world = self.world_mut();
        let mut query = world.query::<&Structure>();
        for s in query.iter(world) {
            match &s.payload {
                Payload::Restaurant(restaurant) => {
                    for (i, table) in restaurant.tables.iter().enumerate() {
                        if table.status == TableStatus::Available {
                            assert!(
                                table.occupant.is_none(),
                                "{} table {i} is available but held",
                                s.kind.label()
                            );
                        }
                    }
                }
                Payload::Apartment(apartment) => {
                    for (i, unit) in apartment.units.iter().enumerate() {
                        assert!(
                            !(unit.is_occupied() && unit.listing_pending),
                            "unit {i} is occupied and still listed"
                        );
                    }
                }
                _ => {}
            }
        }
    }
}

fn assert_accumulators_valid(s: &Structure) {
    let accrual = &s.accrual;
    assert!(
        accrual.income.is_finite() && accrual.income >= 0.0,
        "{} income is {}",
        s.kind.label(),
        accrual.income
    );
    assert!(
        accrual.stored_resources.is_finite() && accrual.stored_resources >= 0.0,
        "{} storage is {}",
        s.kind.label(),
        accrual.stored_resources
    );
    if let Some(rate) = s.kind.resource_rate() {
        assert!(accrual.stored_resources <= rate.max_storage + 1e-9);
    }
    // Houses and plain income structures only ever accrue, so the cap holds
    // for them with every possible boost stacked on.
    if matches!(s.kind, StructureKind::House | StructureKind::PlainIncome(_)) {
        if let Some(rate) = s.kind.income_rate() {
            let max_bonus = s.district_bonus * 2.0;
            assert!(accrual.income <= rate.ceiling * max_bonus + 1e-9);
        }
    }
}
