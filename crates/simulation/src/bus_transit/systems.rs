//! ECS systems for the bus service.

use bevy::prelude::*;
use rand::Rng;

use crate::citizen::{Behavior, Citizen};
use crate::config::{BUS_DWELL_RADIUS, EXIT_OFFSET, WORLD_LENGTH};
use crate::economy::TownBudget;
use crate::game_params::GameParams;
use crate::notifications::{TouristChange, TouristEvent};
use crate::population::PopulationCounters;
use crate::sim_rng::SimRng;
use crate::structures::Structure;
use crate::time_of_day::SimClock;
use crate::tourism::{check_out, spawn_tourist, Tourist};

use super::types::*;

/// Move `position` by `step` along `direction`, bouncing off the town edges.
/// Returns the new position and direction.
pub fn travel(position: f32, direction: f32, step: f32) -> (f32, f32) {
    let mut next = position + step * direction;
    let mut direction = direction;
    if next <= 0.0 {
        next = (-next).min(WORLD_LENGTH);
        direction = 1.0;
    } else if next >= WORLD_LENGTH {
        next = (2.0 * WORLD_LENGTH - next).max(0.0);
        direction = -1.0;
    }
    (next, direction)
}

/// A random stop other than `from`, if the town has one.
fn pick_destination(stop_ids: &[BusStopId], from: BusStopId, rng: &mut SimRng) -> Option<BusStopId> {
    let others: Vec<BusStopId> = stop_ids.iter().copied().filter(|&id| id != from).collect();
    rng.pick_index(others.len()).map(|i| others[i])
}

/// System: advance every bus and resolve stop arrivals.
///
/// Arriving at a stop runs the exchange exactly once per visit, in order:
/// passengers get off, tourists may arrive, then queued citizens board.
#[allow(clippy::too_many_arguments)]
pub fn update_buses(
    clock: Res<SimClock>,
    params: Res<GameParams>,
    mut rng: ResMut<SimRng>,
    mut transit: ResMut<TransitState>,
    mut budget: ResMut<TownBudget>,
    mut counters: ResMut<PopulationCounters>,
    mut commands: Commands,
    mut citizens: Query<(&mut Citizen, Option<&mut Tourist>)>,
    mut structures: Query<(Entity, &mut Structure)>,
    mut tourist_events: EventWriter<TouristEvent>,
) {
    let dt = clock.last_delta_secs;
    if dt <= 0.0 {
        return;
    }
    let now = clock.minutes;
    let boosted = structures.iter().any(|(_, s)| s.kind.boosts_tourism());
    let stop_ids: Vec<BusStopId> = transit.stops.iter().map(|s| s.id).collect();
    let transit_params = &params.transit;

    let TransitState {
        stops,
        buses,
        total_riders,
        total_fares,
        ..
    } = &mut *transit;

    for bus in buses.iter_mut() {
        if bus.dwelling {
            bus.dwell_secs -= dt;
            if bus.dwell_secs <= 0.0 {
                bus.dwell_secs = 0.0;
                bus.dwelling = false;
            }
            continue;
        }

        let (position, direction) = travel(bus.position, bus.direction, bus.speed * dt);
        bus.position = position;
        bus.direction = direction;

        if let Some(served) = bus.served_stop {
            let still_near = stops
                .iter()
                .find(|s| s.id == served)
                .is_some_and(|s| (s.position - bus.position).abs() <= BUS_DWELL_RADIUS);
            if !still_near {
                bus.served_stop = None;
            }
        }

        let Some(stop) = stops.iter_mut().find(|s| {
            (s.position - bus.position).abs() <= BUS_DWELL_RADIUS && bus.served_stop != Some(s.id)
        }) else {
            continue;
        };
        bus.dwelling = true;
        bus.dwell_secs = transit_params.dwell_secs;
        bus.served_stop = Some(stop.id);

        // (a) Let passengers off.
        let mut staying = Vec::with_capacity(bus.passengers.len());
        for passenger in bus.passengers.drain(..) {
            let gets_off = passenger.destination == Some(stop.id)
                || rng.chance(transit_params.drop_off_chance);
            if !gets_off {
                staying.push(passenger);
                continue;
            }
            if passenger.leaving_town {
                commands.entity(passenger.citizen).despawn();
                counters.tourists_departed += 1;
                tourist_events.send(TouristEvent {
                    citizen: passenger.citizen,
                    change: TouristChange::Departed,
                });
                info!("Tourist {:?} left town from stop {}", passenger.citizen, stop.id);
                continue;
            }
            match citizens.get_mut(passenger.citizen) {
                Ok((mut citizen, _)) => {
                    let offset = rng.0.gen_range(-EXIT_OFFSET..=EXIT_OFFSET);
                    citizen.reset_to_walking(&mut rng);
                    citizen.position = (stop.position + offset).clamp(0.0, WORLD_LENGTH);
                }
                Err(_) => {
                    warn!("Bus dropped off {:?}, which no longer exists", passenger.citizen);
                }
            }
        }
        bus.passengers = staying;

        // (b) Tourists arrive.
        let (chance, max_count) = if boosted {
            (
                transit_params.boosted_tourist_spawn_chance,
                transit_params.boosted_max_tourists_per_dwell,
            )
        } else {
            (
                transit_params.tourist_spawn_chance,
                transit_params.max_tourists_per_dwell,
            )
        };
        if max_count > 0 && rng.chance(chance) {
            let count = rng.0.gen_range(1..=max_count);
            for _ in 0..count {
                let entity = spawn_tourist(
                    &mut commands,
                    &mut structures,
                    &mut rng,
                    &params,
                    now,
                    stop.position,
                );
                counters.tourists_arrived += 1;
                tourist_events.send(TouristEvent {
                    citizen: entity,
                    change: TouristChange::Arrived,
                });
            }
            debug!("{} tourists arrived at stop {}", count, stop.id);
        }

        // (c) Board from the queue, sampling at random.
        while !bus.is_full() {
            let Some(index) = rng.pick_index(stop.waiting.len()) else {
                break;
            };
            let Some(entity) = stop.waiting.remove(index) else {
                break;
            };
            let Ok((mut citizen, tourist)) = citizens.get_mut(entity) else {
                continue;
            };
            if !matches!(citizen.behavior, Behavior::Waiting { stop: id, .. } if id == stop.id) {
                continue;
            }
            citizen.behavior = Behavior::Riding;
            citizen.visible = false;
            citizen.position = stop.position;

            let mut leaving_town = false;
            if let Some(mut tourist) = tourist {
                if check_out(entity, &mut tourist, &mut structures) {
                    tourist_events.send(TouristEvent {
                        citizen: entity,
                        change: TouristChange::CheckedOut,
                    });
                }
                leaving_town = tourist.departing;
            }

            bus.passengers.push(Passenger {
                citizen: entity,
                destination: pick_destination(&stop_ids, stop.id, &mut rng),
                leaving_town,
            });
            *total_riders += 1;
            *total_fares += transit_params.fare;
            budget.treasury += transit_params.fare;
            budget.fares_collected += transit_params.fare;
        }
    }
}
