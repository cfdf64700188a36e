//! Visiting tourists: arrival with a hotel booking, a bounded stay, and a
//! single idempotent checkout shared by stay expiry and bus boarding.

mod systems;
mod types;


pub use systems::{book_room, check_out, expire_tourists, spawn_tourist};
pub use types::{Booking, Tourist};

use bevy::prelude::*;

pub struct TourismPlugin;

impl Plugin for TourismPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            expire_tourists
                .before(crate::population::rebuild_destinations)
                .in_set(crate::TownSet::Population),
        );
    }
}
