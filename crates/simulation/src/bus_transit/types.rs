//! Data types for the bus service.

use std::collections::VecDeque;

use bevy::prelude::*;

/// Unique identifier for a bus stop.
pub type BusStopId = u32;

/// A stop on the single road through town.
#[derive(Debug, Clone, PartialEq)]
pub struct BusStop {
    pub id: BusStopId,
    pub position: f32,
    /// Citizens queued for the next bus. Boarding samples from anywhere in
    /// the queue, so this is only roughly first-come first-served.
    pub waiting: VecDeque<Entity>,
}

/// One rider on a bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Passenger {
    pub citizen: Entity,
    /// Stop where the passenger certainly gets off. `None` only when the
    /// passenger boarded with no other stop in town.
    pub destination: Option<BusStopId>,
    /// Removed from town for good when let off.
    pub leaving_town: bool,
}

/// A bus shuttling back and forth between the town edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub position: f32,
    /// `-1.0` or `+1.0`.
    pub direction: f32,
    /// World units per simulated-equivalent second.
    pub speed: f32,
    pub capacity: usize,
    pub passengers: Vec<Passenger>,
    /// Simulated-equivalent seconds left at the current stop.
    pub dwell_secs: f32,
    pub dwelling: bool,
    /// Stop most recently served. Cleared once the bus leaves its dwell
    /// radius, which re-arms the arrival trigger for the next pass.
    pub served_stop: Option<BusStopId>,
}

impl Bus {
    pub fn is_full(&self) -> bool {
        self.passengers.len() >= self.capacity
    }
}

/// Top-level resource for the bus service.
#[derive(Resource, Debug, Clone, Default)]
pub struct TransitState {
    pub stops: Vec<BusStop>,
    pub buses: Vec<Bus>,
    pub next_stop_id: BusStopId,
    /// Lifetime boardings.
    pub total_riders: u64,
    /// Lifetime fare revenue.
    pub total_fares: f64,
}
