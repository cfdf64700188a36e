use bevy::prelude::*;

use crate::bus_transit::TransitState;
use crate::citizen::{Behavior, Citizen, VisitKind, WalkTarget};
use crate::game_params::GameParams;
use crate::notifications::{TouristChange, TouristEvent};
use crate::sim_rng::SimRng;
use crate::structures::{Payload, Structure};
use crate::time_of_day::SimClock;

use super::types::{Booking, Tourist};

/// Book the first clean vacant hotel room in town for `guest`.
pub fn book_room(
    guest: Entity,
    structures: &mut Query<(Entity, &mut Structure)>,
) -> Option<Booking> {
    for (hotel, mut structure) in structures.iter_mut() {
        if !structure.is_consistent() {
            continue;
        }
        if let Payload::Hotel(payload) = &mut structure.payload {
            if let Some(room) = payload.book(guest) {
                return Some(Booking { hotel, room });
            }
        }
    }
    None
}

/// Release the tourist's room. Safe to call any number of times; only the
/// first call has an effect. Returns `true` when this call checked out.
///
/// The room is only vacated while it still belongs to `citizen`, so a room
/// that has since changed hands is left alone.
pub fn check_out(
    citizen: Entity,
    tourist: &mut Tourist,
    structures: &mut Query<(Entity, &mut Structure)>,
) -> bool {
    if tourist.checked_out {
        return false;
    }
    tourist.checked_out = true;
    let Some(booking) = tourist.booking.take() else {
        return true;
    };
    match structures.get_mut(booking.hotel) {
        Ok((_, mut structure)) => {
            if let Payload::Hotel(hotel) = &mut structure.payload {
                let ours = hotel
                    .rooms
                    .get(booking.room)
                    .is_some_and(|r| r.guest == Some(citizen));
                if ours {
                    hotel.vacate_room(booking.room);
                }
            }
        }
        Err(_) => {
            debug!("Tourist {:?} checked out of a demolished hotel", citizen);
        }
    }
    true
}

/// Spawn a tourist walker at `position`, booking a room if one is free.
pub fn spawn_tourist(
    commands: &mut Commands,
    structures: &mut Query<(Entity, &mut Structure)>,
    rng: &mut SimRng,
    params: &GameParams,
    now: f64,
    position: f32,
) -> Entity {
    let entity = commands.spawn_empty().id();
    let (lo, hi) = params.transit.tourist_stay_minutes;
    let stay = rng.between(lo, hi);
    let mut tourist = Tourist::new(now, stay);
    tourist.booking = book_room(entity, structures);
    let citizen = Citizen::random(rng, &params.citizen, position);
    commands.entity(entity).insert((citizen, tourist));
    entity
}

/// Turn a citizen around toward the nearest stop.
fn head_for_stop(citizen: &mut Citizen, transit: &TransitState) {
    citizen.visible = true;
    citizen.behavior = match transit.nearest_stop(citizen.position) {
        Some(stop) => {
            citizen.face(stop.position);
            Behavior::Walking {
                target: Some(WalkTarget::Stop(stop.id)),
            }
        }
        None => Behavior::Walking { target: None },
    };
}

/// System: end the stay of every tourist whose time is up. The tourist
/// checks out, drops whatever it was doing and heads for a bus out of town.
pub fn expire_tourists(
    clock: Res<SimClock>,
    mut transit: ResMut<TransitState>,
    mut citizens: Query<(Entity, &mut Citizen, &mut Tourist)>,
    mut structures: Query<(Entity, &mut Structure)>,
    mut events: EventWriter<TouristEvent>,
) {
    let now = clock.minutes;
    for (entity, mut citizen, mut tourist) in &mut citizens {
        if tourist.departing || !tourist.is_expired(now) {
            continue;
        }
        tourist.departing = true;
        if check_out(entity, &mut tourist, &mut structures) {
            events.send(TouristEvent {
                citizen: entity,
                change: TouristChange::CheckedOut,
            });
        }

        match citizen.behavior {
            Behavior::Riding => {
                if let Some(passenger) = transit.passenger_mut(entity) {
                    passenger.leaving_town = true;
                }
            }
            Behavior::Visiting(visit) => {
                if let VisitKind::Dining { table } = visit.kind {
                    if let Ok((_, mut structure)) = structures.get_mut(visit.structure) {
                        if let Payload::Restaurant(restaurant) = &mut structure.payload {
                            restaurant.release_table(table);
                        }
                    }
                }
                head_for_stop(&mut citizen, &transit);
            }
            Behavior::Waiting { .. } => {
                transit.dequeue(entity);
                head_for_stop(&mut citizen, &transit);
            }
            Behavior::Walking { .. } => head_for_stop(&mut citizen, &transit),
        }
        debug!("Tourist {:?} stay ended at {}", entity, clock.formatted());
    }
}
