//! Methods on `TransitState`.

use bevy::prelude::*;

use crate::config::WORLD_LENGTH;

use super::types::*;

impl TransitState {
    /// Place a stop. Returns the new stop ID, or None if the position is off
    /// the road or a stop already stands there.
    pub fn add_stop(&mut self, position: f32) -> Option<BusStopId> {
        if !position.is_finite() || !(0.0..=WORLD_LENGTH).contains(&position) {
            return None;
        }
        if self.stops.iter().any(|s| s.position == position) {
            return None;
        }
        let id = self.next_stop_id;
        self.next_stop_id += 1;
        self.stops.push(BusStop {
            id,
            position,
            waiting: Default::default(),
        });
        Some(id)
    }

    /// Remove a stop. Citizens still queued there or walking to it notice on
    /// their next sweep and go back to walking.
    pub fn remove_stop(&mut self, stop_id: BusStopId) -> bool {
        let before = self.stops.len();
        self.stops.retain(|s| s.id != stop_id);
        if self.stops.len() == before {
            return false;
        }
        for bus in &mut self.buses {
            if bus.served_stop == Some(stop_id) {
                bus.served_stop = None;
            }
            for passenger in &mut bus.passengers {
                if passenger.destination == Some(stop_id) {
                    passenger.destination = None;
                }
            }
        }
        true
    }

    /// Add an empty bus at `position`. Returns its index.
    pub fn add_bus(&mut self, position: f32, direction: f32, speed: f32, capacity: usize) -> usize {
        self.buses.push(Bus {
            position: position.clamp(0.0, WORLD_LENGTH),
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            speed,
            capacity,
            passengers: Vec::new(),
            dwell_secs: 0.0,
            dwelling: false,
            served_stop: None,
        });
        self.buses.len() - 1
    }

    pub fn nearest_stop(&self, position: f32) -> Option<&BusStop> {
        self.stops.iter().min_by(|a, b| {
            (a.position - position)
                .abs()
                .total_cmp(&(b.position - position).abs())
        })
    }

    pub fn stop_by_id(&self, id: BusStopId) -> Option<&BusStop> {
        self.stops.iter().find(|s| s.id == id)
    }

    pub fn stop_by_id_mut(&mut self, id: BusStopId) -> Option<&mut BusStop> {
        self.stops.iter_mut().find(|s| s.id == id)
    }

    /// Take `citizen` out of whatever queue holds it.
    pub fn dequeue(&mut self, citizen: Entity) {
        for stop in &mut self.stops {
            stop.waiting.retain(|&e| e != citizen);
        }
    }

    pub fn passenger_mut(&mut self, citizen: Entity) -> Option<&mut Passenger> {
        self.buses
            .iter_mut()
            .flat_map(|b| b.passengers.iter_mut())
            .find(|p| p.citizen == citizen)
    }

    pub fn is_riding(&self, citizen: Entity) -> bool {
        self.buses
            .iter()
            .any(|b| b.passengers.iter().any(|p| p.citizen == citizen))
    }

    pub fn total_waiting(&self) -> usize {
        self.stops.iter().map(|s| s.waiting.len()).sum()
    }

    pub fn total_passengers(&self) -> usize {
        self.buses.iter().map(|b| b.passengers.len()).sum()
    }

    /// Forget every queued citizen and passenger. Used when the population
    /// is rebuilt from a snapshot.
    pub fn clear_riders(&mut self) {
        for stop in &mut self.stops {
            stop.waiting.clear();
        }
        for bus in &mut self.buses {
            bus.passengers.clear();
            bus.dwelling = false;
            bus.dwell_secs = 0.0;
        }
    }
}
