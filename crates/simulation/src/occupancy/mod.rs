//! Occupancy engines for the structures that hold people or stock:
//! apartment tenancy, hotel rooms, shop hours and restaurant tables.
//!
//! All of them run in [`crate::LedgerSet::Occupancy`], after accrual has
//! brought every accumulator up to the current clock.

mod hotel;
mod restaurant;
mod shop;
mod tenancy;

pub use hotel::{run_front_desk, run_nightly_pass};
pub use restaurant::{tend_tables, TABLE_CLEANING_MINUTES};
pub use shop::{refresh_shop_hours, should_be_open, OPENING_HOURS};
pub use tenancy::{
    generate_tenant, list_vacant_units, process_scheduled_events, run_risk_checks,
    skip_probability, skips_out,
};

use bevy::prelude::*;

use crate::scheduled_events::ScheduledEvents;

pub struct OccupancyPlugin;

impl Plugin for OccupancyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScheduledEvents>().add_systems(
            FixedUpdate,
            (
                refresh_shop_hours,
                run_risk_checks,
                list_vacant_units,
                process_scheduled_events,
                run_nightly_pass,
                run_front_desk,
                tend_tables,
            )
                .chain()
                .in_set(crate::LedgerSet::Occupancy),
        );
    }
}
