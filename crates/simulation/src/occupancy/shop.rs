//! Shop opening hours.

use bevy::prelude::*;

use crate::structures::{Payload, Structure};
use crate::time_of_day::SimClock;

/// Shops trade from 07:00 until 21:00.
pub const OPENING_HOURS: std::ops::Range<u32> = 7..21;

pub fn should_be_open(has_employee: bool, hour: u32) -> bool {
    has_employee && OPENING_HOURS.contains(&hour)
}

/// System: open or close every shop for the current hour. Only shops whose
/// state actually changes are written.
pub fn refresh_shop_hours(clock: Res<SimClock>, mut shops: Query<(Entity, &mut Structure)>) {
    let hour = clock.hour();
    for (entity, mut structure) in &mut shops {
        if !structure.is_consistent() {
            warn!(
                "Shop hours: {:?} has a payload that does not match {:?}, skipping",
                entity, structure.kind
            );
            continue;
        }
        let wanted = match &structure.payload {
            Payload::Shop(shop) if should_be_open(shop.has_employee, hour) != shop.is_open => {
                !shop.is_open
            }
            _ => continue,
        };
        if let Payload::Shop(shop) = &mut structure.payload {
            shop.is_open = wanted;
        }
    }
}
