//! One-way notification hooks.
//!
//! Simulation systems fire these events and never wait on a reader. The
//! [`NotificationLog`] keeps a short human-readable history for whatever
//! presentation layer sits on top; nothing in the kernel reads it back.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::citizen::Errand;
use crate::game_params::GameParams;
use crate::population::PopulationCounters;
use crate::structures::StructureKind;
use crate::time_of_day::SimClock;

// =============================================================================
// Events
// =============================================================================

/// A completed visit credited money to a structure.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PurchaseEvent {
    pub structure: Entity,
    pub citizen: Entity,
    pub errand: Errand,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TenantChange {
    MovedIn { name: String, credit_score: u32 },
    MovedOut { name: String, credit_score: u32 },
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct TenantEvent {
    pub apartment: Entity,
    pub unit: usize,
    pub change: TenantChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouristChange {
    Arrived,
    CheckedOut,
    Departed,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TouristEvent {
    pub citizen: Entity,
    pub change: TouristChange,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StructureRemoved {
    pub entity: Entity,
    pub kind: StructureKind,
}

/// The resident count reached a configured threshold for the first time.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneEvent {
    pub residents: u32,
}

// =============================================================================
// Milestones
// =============================================================================

/// Thresholds already announced, so each fires once per town.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct MilestoneTracker {
    pub reached: Vec<u32>,
}

impl crate::Saveable for MilestoneTracker {
    const SAVE_KEY: &'static str = "milestones";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.reached.is_empty() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

pub fn check_population_milestones(
    counters: Res<PopulationCounters>,
    params: Res<GameParams>,
    mut tracker: ResMut<MilestoneTracker>,
    mut milestones: EventWriter<MilestoneEvent>,
) {
    for &threshold in &params.population.milestones {
        if counters.residents >= threshold && !tracker.reached.contains(&threshold) {
            tracker.reached.push(threshold);
            info!("Population milestone: {} residents", threshold);
            milestones.send(MilestoneEvent {
                residents: threshold,
            });
        }
    }
}

// =============================================================================
// Log
// =============================================================================

const MAX_ENTRIES: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Simulated minute the notification was recorded.
    pub minute: f64,
    pub text: String,
}

/// Ring buffer of the most recent notifications.
#[derive(Resource, Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn push(&mut self, minute: f64, text: String) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(Notification { minute, text });
    }

    pub fn last_n(&self, n: usize) -> &[Notification] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns this tick's lifecycle events into log lines. Purchases are too
/// frequent to log and are left to direct readers.
pub fn record_notifications(
    clock: Res<SimClock>,
    mut log: ResMut<NotificationLog>,
    mut tenants: EventReader<TenantEvent>,
    mut tourists: EventReader<TouristEvent>,
    mut removed: EventReader<StructureRemoved>,
    mut milestones: EventReader<MilestoneEvent>,
) {
    let now = clock.minutes;
    for event in tenants.read() {
        let text = match &event.change {
            TenantChange::MovedIn { name, .. } => {
                format!("{name} moved into unit {}", event.unit + 1)
            }
            TenantChange::MovedOut { name, credit_score } => format!(
                "{name} skipped out on unit {} (credit {credit_score})",
                event.unit + 1
            ),
        };
        log.push(now, text);
    }
    for event in tourists.read() {
        if event.change == TouristChange::Departed {
            log.push(now, "A tourist left town".to_string());
        }
    }
    for event in removed.read() {
        log.push(now, format!("{} demolished", event.kind.label()));
    }
    for event in milestones.read() {
        log.push(now, format!("Town reached {} residents", event.residents));
    }
}

pub struct NotificationsPlugin;

impl Plugin for NotificationsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PurchaseEvent>()
            .add_event::<TenantEvent>()
            .add_event::<TouristEvent>()
            .add_event::<StructureRemoved>()
            .add_event::<MilestoneEvent>()
            .init_resource::<MilestoneTracker>()
            .init_resource::<NotificationLog>()
            .add_systems(
                FixedUpdate,
                (check_population_milestones, record_notifications)
                    .chain()
                    .in_set(crate::TownSet::Report),
            );

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<MilestoneTracker>();
    }
}
