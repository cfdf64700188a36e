//! Hotel rooms: the nightly check-in pass and front-desk cleaning.

use bevy::prelude::*;

use crate::game_params::GameParams;
use crate::sim_rng::SimRng;
use crate::structures::{Payload, RoomStatus, Structure};
use crate::time_of_day::SimClock;
use crate::tourism::Tourist;

/// System: once per simulated day, inside the check-in window, charge every
/// occupied room a night and let walk-ins come and go.
///
/// A booked guest who no longer exists is treated as a walk-in from then on.
pub fn run_nightly_pass(
    clock: Res<SimClock>,
    params: Res<GameParams>,
    mut rng: ResMut<SimRng>,
    guests: Query<(), With<Tourist>>,
    mut hotels: Query<(Entity, &mut Structure)>,
) {
    let (start, end) = params.hotel.check_in_window;
    if !(start..end).contains(&clock.hour()) {
        return;
    }
    let day = clock.day();

    for (entity, mut structure) in &mut hotels {
        if !structure.is_consistent() {
            warn!(
                "Nightly pass: {:?} has a payload that does not match {:?}, skipping",
                entity, structure.kind
            );
            continue;
        }
        let due = matches!(&structure.payload, Payload::Hotel(h) if h.last_nightly_day != Some(day));
        if !due {
            continue;
        }
        let s = &mut *structure;
        let Payload::Hotel(hotel) = &mut s.payload else {
            continue;
        };
        hotel.last_nightly_day = Some(day);

        let mut earned = 0.0;
        let mut checkouts = Vec::new();
        for (index, room) in hotel.rooms.iter_mut().enumerate() {
            match room.status {
                RoomStatus::Occupied => {
                    if room.guest.is_some_and(|g| guests.get(g).is_err()) {
                        room.guest = None;
                    }
                    room.nights += 1;
                    earned += hotel.nightly_rate;
                    if room.guest.is_none()
                        && room.nights > 1
                        && rng.chance(params.hotel.walk_in_checkout_chance)
                    {
                        checkouts.push(index);
                    }
                }
                RoomStatus::Clean if room.guest.is_none() => {
                    if rng.chance(params.hotel.walk_in_chance) {
                        room.status = RoomStatus::Occupied;
                        room.nights = 0;
                    }
                }
                _ => {}
            }
        }
        for index in checkouts {
            hotel.vacate_room(index);
        }
        s.accrual.income += earned;
        debug!(
            "Hotel at {:.0}: {} rooms occupied, earned {:.2} on day {}",
            s.position,
            hotel.occupied_rooms(),
            earned,
            day
        );
    }
}

/// System: a staffed front desk cleans one dirty room per simulated day.
/// The day only counts once a room has actually been cleaned.
pub fn run_front_desk(clock: Res<SimClock>, mut hotels: Query<(Entity, &mut Structure)>) {
    let day = clock.day();
    for (entity, mut structure) in &mut hotels {
        if !structure.is_consistent() {
            warn!(
                "Front desk: {:?} has a payload that does not match {:?}, skipping",
                entity, structure.kind
            );
            continue;
        }
        let due = matches!(
            &structure.payload,
            Payload::Hotel(h) if h.has_front_desk
                && h.last_front_desk_day != Some(day)
                && h.dirty_rooms() > 0
        );
        if !due {
            continue;
        }
        let Payload::Hotel(hotel) = &mut structure.payload else {
            continue;
        };
        if let Some(room) = hotel
            .rooms
            .iter_mut()
            .find(|r| r.status == RoomStatus::Dirty)
        {
            room.status = RoomStatus::Clean;
            hotel.last_front_desk_day = Some(day);
        }
    }
}
