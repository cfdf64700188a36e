//! Compact, serializable summary of the town at one instant.
//!
//! `TownReport` is what the headless runner prints at the end of a run and
//! what integration tests compare between runs. It reads the world and never
//! writes to it.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bus_transit::TransitState;
use crate::economy::TownBudget;
use crate::game_actions::{ActionResult, ActionResultLog};
use crate::notifications::NotificationLog;
use crate::population::PopulationCounters;
use crate::structures::{Payload, Structure};
use crate::time_of_day::SimClock;
use crate::TickCounter;

const RECENT_ENTRIES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TownReport {
    // -- Time ---------------------------------------------------------------
    pub tick: u64,
    pub day: u64,
    pub time: String,
    pub speed: f64,
    pub paused: bool,

    // -- Money --------------------------------------------------------------
    pub treasury: f64,
    pub fares_collected: f64,
    pub wages_paid: f64,
    /// Income and rent waiting on structures, not yet collected.
    pub uncollected: f64,
    pub stockpile: BTreeMap<String, f64>,

    // -- People -------------------------------------------------------------
    pub residents: u32,
    pub tourists: u32,
    pub tourists_arrived: u64,
    pub tourists_departed: u64,
    pub visits_completed: u64,
    pub bus_riders: u64,

    // -- Structures ---------------------------------------------------------
    pub structures: usize,
    pub occupancy: OccupancyReport,

    // -- Logs ---------------------------------------------------------------
    pub recent_actions: Vec<ActionEntry>,
    pub recent_notifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OccupancyReport {
    pub occupied_units: usize,
    pub total_units: usize,
    pub occupied_rooms: usize,
    pub total_rooms: usize,
    pub dirty_rooms: usize,
    pub occupied_tables: usize,
    pub total_tables: usize,
    pub open_shops: usize,
    pub total_shops: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionEntry {
    pub action: String,
    pub result: ActionResult,
}

pub fn build_report(world: &mut World) -> TownReport {
    let mut report = TownReport::default();

    if let Some(tick) = world.get_resource::<TickCounter>() {
        report.tick = tick.0;
    }
    if let Some(clock) = world.get_resource::<SimClock>() {
        report.day = clock.day();
        report.time = clock.formatted();
        report.speed = clock.speed.multiplier();
        report.paused = clock.paused;
    }
    if let Some(budget) = world.get_resource::<TownBudget>() {
        report.treasury = budget.treasury;
        report.fares_collected = budget.fares_collected;
        report.wages_paid = budget.wages_paid;
        report.stockpile = budget
            .stockpile
            .iter()
            .map(|(kind, units)| (format!("{kind:?}"), *units))
            .collect();
    }
    if let Some(counters) = world.get_resource::<PopulationCounters>() {
        report.residents = counters.residents;
        report.tourists = counters.tourists;
        report.tourists_arrived = counters.tourists_arrived;
        report.tourists_departed = counters.tourists_departed;
        report.visits_completed = counters.visits_completed;
    }
    if let Some(transit) = world.get_resource::<TransitState>() {
        report.bus_riders = transit.total_riders;
    }
    if let Some(log) = world.get_resource::<ActionResultLog>() {
        report.recent_actions = log
            .last_n(RECENT_ENTRIES)
            .iter()
            .map(|(action, result)| ActionEntry {
                action: action.label().to_string(),
                result: result.clone(),
            })
            .collect();
    }
    if let Some(log) = world.get_resource::<NotificationLog>() {
        report.recent_notifications = log
            .last_n(RECENT_ENTRIES)
            .iter()
            .map(|n| n.text.clone())
            .collect();
    }

    let mut query = world.query::<&Structure>();
    for structure in query.iter(world) {
        report.structures += 1;
        report.uncollected += structure.accrual.income;
        let occupancy = &mut report.occupancy;
        match &structure.payload {
            Payload::Apartment(apartment) => {
                report.uncollected += apartment.total_rent();
                occupancy.occupied_units += apartment.occupied_units();
                occupancy.total_units += apartment.units.len();
            }
            Payload::Hotel(hotel) => {
                occupancy.occupied_rooms += hotel.occupied_rooms();
                occupancy.dirty_rooms += hotel.dirty_rooms();
                occupancy.total_rooms += hotel.rooms.len();
            }
            Payload::Shop(shop) => {
                occupancy.total_shops += 1;
                if shop.is_open {
                    occupancy.open_shops += 1;
                }
            }
            Payload::Restaurant(restaurant) => {
                occupancy.total_tables += restaurant.tables.len();
                occupancy.occupied_tables += restaurant
                    .tables
                    .iter()
                    .filter(|t| t.occupant.is_some())
                    .count();
            }
            Payload::None => {}
        }
    }

    report
}
