//! Economic accrual engine.
//!
//! Every tick, each structure with an income or resource rate advances its
//! accumulator by the simulated minutes since its last accrual, multiplied by
//! `district_bonus * (1 + proximity boosts)` and clamped at `ceiling * bonus`.
//! Apartments accrue per unit from each tenant's rent offer. Resource
//! producers fill their storage with no bonus applied.
//!
//! Elapsed time is clamped at zero, so repeated sweeps at the same clock
//! value and backward clock adjustments both leave accumulators untouched.

use bevy::prelude::*;

use crate::structures::{Boost, Category, Payload, Structure};
use crate::time_of_day::SimClock;

/// A boost emitter as seen by the sweep, collected before any mutation.
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    pub entity: Entity,
    pub position: f32,
    pub boost: Boost,
}

/// Simulated minutes since `last`, never negative or non-finite.
pub fn elapsed_minutes(now: f64, last: f64) -> f64 {
    let elapsed = now - last;
    if elapsed.is_finite() && elapsed > 0.0 {
        elapsed
    } else {
        0.0
    }
}

/// One accrual step. The result is never below `value`, and growth stops at
/// `ceiling * bonus`.
pub fn accrue(value: f64, elapsed: f64, rate: f64, ceiling: f64, bonus: f64) -> f64 {
    let cap = ceiling * bonus;
    if value >= cap {
        return value;
    }
    (value + elapsed * rate * bonus).min(cap)
}

/// Sum of every emitter's percent that reaches a `category` structure at
/// `position`. The structure never boosts itself.
pub fn proximity_boost(
    target: Entity,
    position: f32,
    category: Category,
    emitters: &[Emitter],
) -> f64 {
    emitters
        .iter()
        .filter(|e| e.entity != target)
        .filter(|e| e.boost.reaches(category))
        .filter(|e| (e.position - position).abs() <= e.boost.radius)
        .map(|e| e.boost.percent)
        .sum()
}

pub fn collect_emitters<'a>(
    structures: impl Iterator<Item = (Entity, &'a Structure)>,
) -> Vec<Emitter> {
    structures
        .filter_map(|(entity, s)| {
            s.kind.boost().map(|boost| Emitter {
                entity,
                position: s.position,
                boost,
            })
        })
        .collect()
}

/// System: advance every structure's accumulators to the current clock.
pub fn accrue_structures(clock: Res<SimClock>, mut structures: Query<(Entity, &mut Structure)>) {
    let now = clock.minutes;
    let emitters = collect_emitters(structures.iter());

    for (entity, mut structure) in &mut structures {
        if !structure.is_consistent() {
            warn!(
                "Accrual: {:?} has a payload that does not match {:?}, skipping",
                entity, structure.kind
            );
            continue;
        }
        let s = &mut *structure;
        let elapsed = elapsed_minutes(now, s.accrual.last_accrual);
        if elapsed == 0.0 {
            continue;
        }
        let bonus = s.district_bonus
            * (1.0 + proximity_boost(entity, s.position, s.kind.category(), &emitters));

        if let Some(rate) = s.kind.income_rate() {
            s.accrual.income = accrue(
                s.accrual.income,
                elapsed,
                rate.per_minute,
                rate.ceiling,
                bonus,
            );
        }
        if let Some(rate) = s.kind.resource_rate() {
            s.accrual.stored_resources = accrue(
                s.accrual.stored_resources,
                elapsed,
                rate.per_minute,
                rate.max_storage,
                1.0,
            );
        }
        if let Payload::Apartment(apartment) = &mut s.payload {
            let ceiling = apartment.max_income_per_unit;
            for unit in &mut apartment.units {
                let unit_elapsed = elapsed_minutes(now, unit.last_accrual);
                if let Some(tenant) = &unit.tenant {
                    unit.accumulated_rent = accrue(
                        unit.accumulated_rent,
                        unit_elapsed,
                        tenant.monthly_rent_offer,
                        ceiling,
                        bonus,
                    );
                }
                unit.last_accrual = unit.last_accrual.max(now);
            }
        }
        s.accrual.last_accrual = now;
    }
}

pub struct AccrualPlugin;

impl Plugin for AccrualPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            accrue_structures.in_set(crate::LedgerSet::Accrual),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{BoostKind, BoostTarget, ResourceKind, StructureKind};

    #[test]
    fn test_accrue_grows_linearly_until_cap() {
        assert_eq!(accrue(0.0, 10.0, 2.0, 100.0, 1.0), 20.0);
        assert_eq!(accrue(90.0, 10.0, 2.0, 100.0, 1.0), 100.0);
        assert_eq!(accrue(0.0, 10.0, 2.0, 100.0, 1.5), 30.0);
        assert_eq!(accrue(140.0, 10.0, 2.0, 100.0, 1.5), 150.0);
    }

    #[test]
    fn test_accrue_never_decreases() {
        // Above the cap (e.g. after customer payments) the value is held.
        assert_eq!(accrue(500.0, 10.0, 2.0, 100.0, 1.0), 500.0);
        assert_eq!(accrue(5.0, 0.0, 2.0, 100.0, 1.0), 5.0);
    }

    #[test]
    fn test_elapsed_clamps_anomalies() {
        assert_eq!(elapsed_minutes(10.0, 20.0), 0.0);
        assert_eq!(elapsed_minutes(f64::NAN, 0.0), 0.0);
        assert_eq!(elapsed_minutes(f64::INFINITY, 0.0), 0.0);
        assert_eq!(elapsed_minutes(30.0, 20.0), 10.0);
    }

    fn emitter(n: u32, position: f32, kind: BoostKind) -> Emitter {
        Emitter {
            entity: Entity::from_raw(n),
            position,
            boost: StructureKind::BoostEmitter(kind).boost().unwrap(),
        }
    }

    #[test]
    fn test_proximity_boost_sums_and_filters() {
        let target = Entity::from_raw(99);
        let emitters = [
            emitter(1, 100.0, BoostKind::Park),       // +0.10 within 150
            emitter(2, 120.0, BoostKind::Fountain),   // +0.05 within 80
            emitter(3, 110.0, BoostKind::Playground), // residential only
            emitter(4, 900.0, BoostKind::Park),       // out of range
        ];
        let residential = proximity_boost(target, 150.0, Category::Residential, &emitters);
        assert!((residential - 0.30).abs() < 1e-9);
        let commercial = proximity_boost(target, 150.0, Category::Commercial, &emitters);
        assert!((commercial - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_boost_target_variants() {
        let boost = Boost {
            radius: 10.0,
            percent: 0.2,
            applies_to: BoostTarget::Only(Category::Dining),
        };
        assert!(boost.reaches(Category::Dining));
        assert!(!boost.reaches(Category::Lodging));
    }

    fn run_accrual(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(accrue_structures);
        schedule.run(world);
    }

    #[test]
    fn test_system_accrues_house_income() {
        let mut world = World::new();
        world.insert_resource(SimClock {
            minutes: 10.0,
            ..Default::default()
        });
        let house = world
            .spawn(Structure::new(StructureKind::House, 0.0, 1.0, 0.0))
            .id();
        run_accrual(&mut world);
        let s = world.get::<Structure>(house).unwrap();
        assert!((s.accrual.income - 5.0).abs() < 1e-9);
        assert_eq!(s.accrual.last_accrual, 10.0);

        // Same clock value: nothing changes.
        run_accrual(&mut world);
        let s = world.get::<Structure>(house).unwrap();
        assert!((s.accrual.income - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_resource_producer_gets_no_bonus() {
        let mut world = World::new();
        world.insert_resource(SimClock {
            minutes: 10.0,
            ..Default::default()
        });
        let farm = world
            .spawn(Structure::new(
                StructureKind::ResourceProducer(ResourceKind::Farm),
                0.0,
                1.2,
                0.0,
            ))
            .id();
        world.spawn(Structure::new(
            StructureKind::BoostEmitter(BoostKind::Park),
            5.0,
            1.0,
            0.0,
        ));
        run_accrual(&mut world);
        let s = world.get::<Structure>(farm).unwrap();
        assert!((s.accrual.stored_resources - 4.0).abs() < 1e-9);
        assert_eq!(s.accrual.income, 0.0);
    }

    #[test]
    fn test_inconsistent_structure_is_skipped() {
        let mut world = World::new();
        world.insert_resource(SimClock {
            minutes: 10.0,
            ..Default::default()
        });
        let mut broken = Structure::new(StructureKind::House, 0.0, 1.0, 0.0);
        broken.payload = Payload::for_kind(StructureKind::Hotel, 0.0);
        let broken = world.spawn(broken).id();
        let fine = world
            .spawn(Structure::new(StructureKind::House, 50.0, 1.0, 0.0))
            .id();
        run_accrual(&mut world);
        assert_eq!(world.get::<Structure>(broken).unwrap().accrual.income, 0.0);
        assert!(world.get::<Structure>(fine).unwrap().accrual.income > 0.0);
    }
}
