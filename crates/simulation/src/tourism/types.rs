use bevy::prelude::*;

/// A hotel room held by a tourist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub hotel: Entity,
    pub room: usize,
}

/// Marks a citizen as a visitor with a bounded stay.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Tourist {
    /// Length of the stay in simulated minutes.
    pub stay_minutes: f64,
    /// Simulated minute the tourist stepped off the bus.
    pub arrived_at: f64,
    pub booking: Option<Booking>,
    pub checked_out: bool,
    /// Stay is over; the tourist is on the way out of town.
    pub departing: bool,
}

impl Tourist {
    pub fn new(arrived_at: f64, stay_minutes: f64) -> Self {
        Self {
            stay_minutes,
            arrived_at,
            booking: None,
            checked_out: false,
            departing: false,
        }
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.arrived_at >= self.stay_minutes
    }
}
