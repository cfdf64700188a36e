//! Deferred work keyed by simulated time.
//!
//! Anything that should happen "N minutes from now" is pushed here and polled
//! once per tick inside the ledger phase, so nothing fires outside the tick
//! loop and pausing the clock pauses the queue too.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TownEvent {
    /// A listed apartment unit receives a generated tenant.
    TenantArrival { apartment: Entity, unit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    pub due: f64,
    pub event: TownEvent,
}

/// Pending events ordered by due time (earliest first).
#[derive(Resource, Debug, Default)]
pub struct ScheduledEvents {
    pending: Vec<ScheduledEvent>,
}

impl ScheduledEvents {
    pub fn schedule(&mut self, due: f64, event: TownEvent) {
        let index = self.pending.partition_point(|e| e.due <= due);
        self.pending.insert(index, ScheduledEvent { due, event });
    }

    /// Remove and return every event due at or before `now`, in due order.
    pub fn drain_due(&mut self, now: f64) -> Vec<ScheduledEvent> {
        let split = self.pending.partition_point(|e| e.due <= now);
        self.pending.drain(..split).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.pending.iter()
    }
}
