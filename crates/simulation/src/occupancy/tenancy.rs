//! Apartment tenancy: listing vacant units, tenant arrivals from the
//! scheduled-event queue, and the daily credit-risk check.

use bevy::prelude::*;
use rand::Rng;

use crate::config::MINUTES_PER_DAY;
use crate::game_params::{GameParams, TenancyParams};
use crate::notifications::{TenantChange, TenantEvent};
use crate::scheduled_events::{ScheduledEvents, TownEvent};
use crate::sim_rng::SimRng;
use crate::structures::{Payload, Structure, Tenant};
use crate::time_of_day::SimClock;

const FIRST_NAMES: [&str; 16] = [
    "Ada", "Ben", "Cora", "Dev", "Elin", "Farid", "Gwen", "Hugo", "Iris", "Jon", "Kaia", "Leo",
    "Mina", "Noor", "Otis", "Pia",
];

const LAST_NAMES: [&str; 12] = [
    "Abbott", "Baker", "Castillo", "Dahl", "Evans", "Fischer", "Garcia", "Holm", "Ito", "Jensen",
    "Kowalski", "Laine",
];

const JOBS: [&str; 12] = [
    "Barista",
    "Nurse",
    "Carpenter",
    "Teacher",
    "Clerk",
    "Mechanic",
    "Librarian",
    "Courier",
    "Chef",
    "Electrician",
    "Accountant",
    "Gardener",
];

/// Chance a tenant skips out at one risk check, by credit band.
pub fn skip_probability(credit_score: u32) -> f64 {
    match credit_score {
        750.. => 0.001,
        650..=749 => 0.01,
        550..=649 => 0.05,
        _ => 0.15,
    }
}

/// One risk check: `true` when the tenant leaves.
pub fn skips_out(rng: &mut SimRng, credit_score: u32) -> bool {
    rng.roll() < skip_probability(credit_score)
}

pub fn generate_tenant(rng: &mut SimRng, base_rent: f64, params: &TenancyParams) -> Tenant {
    let first = FIRST_NAMES[rng.0.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.0.gen_range(0..LAST_NAMES.len())];
    let job = JOBS[rng.0.gen_range(0..JOBS.len())];
    let (lo, hi) = params.rent_offer_factor;
    Tenant {
        name: format!("{first} {last}"),
        job: job.to_string(),
        credit_score: rng.0.gen_range(300..=850),
        monthly_rent_offer: base_rent * rng.between(lo, hi),
        employment_months: rng.0.gen_range(6..=66),
    }
}

/// System: put every vacant, unlisted unit on the market. A tenant arrival
/// is scheduled after the listing delay.
pub fn list_vacant_units(
    clock: Res<SimClock>,
    params: Res<GameParams>,
    mut rng: ResMut<SimRng>,
    mut queue: ResMut<ScheduledEvents>,
    mut apartments: Query<(Entity, &mut Structure)>,
) {
    let now = clock.minutes;
    let (lo, hi) = params.tenancy.listing_delay_minutes;
    for (entity, mut structure) in &mut apartments {
        if !structure.is_consistent() {
            warn!(
                "Listing: {:?} has a payload that does not match {:?}, skipping",
                entity, structure.kind
            );
            continue;
        }
        let needs_listing = match &structure.payload {
            Payload::Apartment(a) => a
                .units
                .iter()
                .any(|u| !u.is_occupied() && !u.listing_pending),
            _ => false,
        };
        if !needs_listing {
            continue;
        }
        let Payload::Apartment(apartment) = &mut structure.payload else {
            continue;
        };
        for (index, unit) in apartment.units.iter_mut().enumerate() {
            if unit.is_occupied() || unit.listing_pending {
                continue;
            }
            unit.listing_pending = true;
            queue.schedule(
                now + rng.between(lo, hi),
                TownEvent::TenantArrival {
                    apartment: entity,
                    unit: index,
                },
            );
        }
    }
}

/// System: apply every scheduled event that has fallen due. Events pointing
/// at a demolished apartment or a unit that no longer exists are dropped.
pub fn process_scheduled_events(
    clock: Res<SimClock>,
    params: Res<GameParams>,
    mut rng: ResMut<SimRng>,
    mut queue: ResMut<ScheduledEvents>,
    mut apartments: Query<&mut Structure>,
    mut tenant_events: EventWriter<TenantEvent>,
) {
    let now = clock.minutes;
    for due in queue.drain_due(now) {
        match due.event {
            TownEvent::TenantArrival { apartment, unit } => {
                let Ok(mut structure) = apartments.get_mut(apartment) else {
                    debug!("Dropping tenant arrival for demolished {:?}", apartment);
                    continue;
                };
                if !structure.is_consistent() {
                    warn!(
                        "Dropping tenant arrival: {:?} has a payload that does not match {:?}",
                        apartment, structure.kind
                    );
                    continue;
                }
                let Payload::Apartment(payload) = &mut structure.payload else {
                    continue;
                };
                let Some(slot) = payload.units.get_mut(unit) else {
                    continue;
                };
                if slot.is_occupied() {
                    slot.listing_pending = false;
                    continue;
                }
                let tenant = generate_tenant(&mut rng, payload.base_rent, &params.tenancy);
                let name = tenant.name.clone();
                let credit_score = tenant.credit_score;
                if payload.move_in(unit, tenant, now) {
                    info!(
                        "{} ({}) moved into unit {} of {:?}",
                        name,
                        credit_score,
                        unit + 1,
                        apartment
                    );
                    tenant_events.send(TenantEvent {
                        apartment,
                        unit,
                        change: TenantChange::MovedIn { name, credit_score },
                    });
                }
            }
        }
    }
}

/// System: at most once per simulated day per unit, roll against the
/// tenant's credit band. A tenant who skips out forfeits uncollected rent.
pub fn run_risk_checks(
    clock: Res<SimClock>,
    mut rng: ResMut<SimRng>,
    mut apartments: Query<(Entity, &mut Structure)>,
    mut tenant_events: EventWriter<TenantEvent>,
) {
    let now = clock.minutes;
    for (entity, mut structure) in &mut apartments {
        if !structure.is_consistent() {
            warn!(
                "Risk check: {:?} has a payload that does not match {:?}, skipping",
                entity, structure.kind
            );
            continue;
        }
        let due = match &structure.payload {
            Payload::Apartment(a) => a
                .units
                .iter()
                .any(|u| u.is_occupied() && now - u.last_risk_check >= MINUTES_PER_DAY),
            _ => false,
        };
        if !due {
            continue;
        }
        let Payload::Apartment(apartment) = &mut structure.payload else {
            continue;
        };
        for index in 0..apartment.units.len() {
            let unit = &mut apartment.units[index];
            let Some(credit_score) = unit.tenant.as_ref().map(|t| t.credit_score) else {
                continue;
            };
            if now - unit.last_risk_check < MINUTES_PER_DAY {
                continue;
            }
            unit.last_risk_check = now;
            if !skips_out(&mut rng, credit_score) {
                continue;
            }
            if let Some(tenant) = apartment.vacate(index) {
                info!(
                    "{} skipped out on unit {} of {:?} (credit {})",
                    tenant.name,
                    index + 1,
                    entity,
                    credit_score
                );
                tenant_events.send(TenantEvent {
                    apartment: entity,
                    unit: index,
                    change: TenantChange::MovedOut {
                        name: tenant.name,
                        credit_score,
                    },
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::StructureKind;

    #[test]
    fn test_skip_probability_bands() {
        assert_eq!(skip_probability(850), 0.001);
        assert_eq!(skip_probability(750), 0.001);
        assert_eq!(skip_probability(749), 0.01);
        assert_eq!(skip_probability(650), 0.01);
        assert_eq!(skip_probability(600), 0.05);
        assert_eq!(skip_probability(550), 0.05);
        assert_eq!(skip_probability(549), 0.15);
        assert_eq!(skip_probability(300), 0.15);
    }

    #[test]
    fn test_observed_skip_rate_matches_band() {
        const TRIALS: u32 = 200_000;
        let mut rng = SimRng::from_seed_u64(0x5C0_E);
        for (credit_score, expected) in [(800, 0.001), (700, 0.01), (600, 0.05), (400, 0.15)] {
            let skips = (0..TRIALS)
                .filter(|_| skips_out(&mut rng, credit_score))
                .count();
            let observed = skips as f64 / TRIALS as f64;
            let tolerance = 5.0 * (expected * (1.0 - expected) / TRIALS as f64).sqrt();
            assert!(
                (observed - expected).abs() < tolerance,
                "credit {credit_score}: observed {observed:.5}, expected {expected} +/- {tolerance:.5}"
            );
        }
    }

    #[test]
    fn test_generated_tenant_ranges() {
        let mut rng = SimRng::from_seed_u64(2);
        let params = TenancyParams::default();
        for _ in 0..500 {
            let t = generate_tenant(&mut rng, 8.0, &params);
            assert!((300..=850).contains(&t.credit_score));
            assert!((6..=66).contains(&t.employment_months));
            assert!(t.monthly_rent_offer >= 8.0 * 0.7 && t.monthly_rent_offer < 8.0 * 1.3);
            assert!(!t.name.is_empty());
            assert!(!t.job.is_empty());
        }
    }

    fn tenancy_app() -> App {
        let mut app = App::new();
        app.insert_resource(SimClock::at_hour(0, 8.0))
            .init_resource::<GameParams>()
            .insert_resource(SimRng::from_seed_u64(6))
            .init_resource::<ScheduledEvents>()
            .add_event::<TenantEvent>()
            .add_systems(
                Update,
                (run_risk_checks, list_vacant_units, process_scheduled_events).chain(),
            );
        app
    }

    fn apartment(app: &App, entity: Entity) -> crate::structures::ApartmentPayload {
        match &app.world().get::<Structure>(entity).unwrap().payload {
            Payload::Apartment(a) => a.clone(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_new_apartment_is_listed_then_filled() {
        let mut app = tenancy_app();
        let now = app.world().resource::<SimClock>().minutes;
        let entity = app
            .world_mut()
            .spawn(Structure::new(StructureKind::Apartment, 0.0, 1.0, now))
            .id();
        app.update();
        let payload = apartment(&app, entity);
        assert!(payload.units.iter().all(|u| u.listing_pending && !u.is_occupied()));
        assert_eq!(app.world().resource::<ScheduledEvents>().len(), 4);

        // Listing delay is at most 16 minutes.
        app.world_mut().resource_mut::<SimClock>().minutes += 16.0;
        app.update();
        let payload = apartment(&app, entity);
        assert_eq!(payload.occupied_units(), 4);
        assert!(payload.units.iter().all(|u| !u.listing_pending));
        assert!(payload.units.iter().all(|u| u.last_accrual == now + 16.0));
        assert!(app.world().resource::<ScheduledEvents>().is_empty());

        let moved_in = app
            .world_mut()
            .resource_mut::<Events<TenantEvent>>()
            .drain()
            .filter(|e| matches!(e.change, TenantChange::MovedIn { .. }))
            .count();
        assert_eq!(moved_in, 4);
    }

    #[test]
    fn test_house_with_apartment_payload_is_skipped() {
        let mut app = tenancy_app();
        let mut structure = Structure::new(StructureKind::House, 0.0, 1.0, 0.0);
        structure.payload = Payload::for_kind(StructureKind::Apartment, 0.0);
        if let Payload::Apartment(a) = &mut structure.payload {
            a.move_in(
                0,
                Tenant {
                    name: "Pia Dahl".into(),
                    job: "Clerk".into(),
                    credit_score: 300,
                    monthly_rent_offer: 8.0,
                    employment_months: 6,
                },
                0.0,
            );
        }
        let entity = app.world_mut().spawn(structure).id();
        // An arrival queued before the mismatch is noticed is dropped too.
        app.world_mut().resource_mut::<ScheduledEvents>().schedule(
            480.0,
            TownEvent::TenantArrival {
                apartment: entity,
                unit: 1,
            },
        );

        for day in 1..60 {
            app.world_mut().resource_mut::<SimClock>().minutes = day as f64 * MINUTES_PER_DAY;
            app.update();
        }
        let payload = apartment(&app, entity);
        assert!(payload.units[0].is_occupied());
        assert_eq!(payload.units[0].last_risk_check, 0.0);
        assert_eq!(payload.occupied_units(), 1);
        assert!(payload.units.iter().all(|u| !u.listing_pending));
        assert!(app.world().resource::<ScheduledEvents>().is_empty());
    }

    #[test]
    fn test_arrival_for_demolished_apartment_is_dropped() {
        let mut app = tenancy_app();
        let entity = app
            .world_mut()
            .spawn(Structure::new(StructureKind::Apartment, 0.0, 1.0, 480.0))
            .id();
        app.update();
        app.world_mut().despawn(entity);
        app.world_mut().resource_mut::<SimClock>().minutes += 30.0;
        app.update();
        assert!(app.world().resource::<ScheduledEvents>().is_empty());
    }

    #[test]
    fn test_risk_check_runs_once_per_day() {
        let mut app = tenancy_app();
        let entity = app
            .world_mut()
            .spawn(Structure::new(StructureKind::Apartment, 0.0, 1.0, 480.0))
            .id();
        app.update();
        app.world_mut().resource_mut::<SimClock>().minutes += 20.0;
        app.update();
        let filled_at = apartment(&app, entity).units[0].last_risk_check;

        // Half a day later: no check yet.
        app.world_mut().resource_mut::<SimClock>().minutes += MINUTES_PER_DAY / 2.0;
        app.update();
        for unit in apartment(&app, entity).units {
            if unit.is_occupied() {
                assert_eq!(unit.last_risk_check, filled_at);
            }
        }

        // A full day after move-in: every surviving tenant has been checked.
        app.world_mut().resource_mut::<SimClock>().minutes += MINUTES_PER_DAY / 2.0;
        let now = app.world().resource::<SimClock>().minutes;
        app.update();
        for unit in apartment(&app, entity).units {
            if unit.is_occupied() {
                assert_eq!(unit.last_risk_check, now);
            }
        }
    }

    #[test]
    fn test_bad_credit_tenant_leaves_and_unit_is_relisted() {
        let mut app = tenancy_app();
        let mut structure = Structure::new(StructureKind::Apartment, 0.0, 1.0, 0.0);
        if let Payload::Apartment(a) = &mut structure.payload {
            for unit in &mut a.units {
                unit.listing_pending = true;
            }
            a.move_in(
                0,
                Tenant {
                    name: "Otis Holm".into(),
                    job: "Courier".into(),
                    credit_score: 300,
                    monthly_rent_offer: 8.0,
                    employment_months: 6,
                },
                0.0,
            );
            a.units[0].accumulated_rent = 50.0;
        }
        let entity = app.world_mut().spawn(structure).id();

        // Roll risk checks day after day until the 15% band bites.
        let mut left = false;
        for day in 1..200 {
            app.world_mut().resource_mut::<SimClock>().minutes = day as f64 * MINUTES_PER_DAY;
            app.update();
            if !apartment(&app, entity).units[0].is_occupied() {
                left = true;
                break;
            }
        }
        assert!(left);
        let payload = apartment(&app, entity);
        assert_eq!(payload.units[0].accumulated_rent, 0.0);
        assert!(payload.units[0].listing_pending);
        let moved_out = app
            .world_mut()
            .resource_mut::<Events<TenantEvent>>()
            .drain()
            .any(|e| matches!(e.change, TenantChange::MovedOut { credit_score: 300, .. }));
        assert!(moved_out);
    }
}
