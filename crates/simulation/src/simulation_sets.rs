//! Per-tick ordering of the town kernel via `SystemSet` phases.
//!
//! ```text
//! Actions  →  Clock  →  Ledger  →  Transit  →  Population  →  Report
//! ```
//!
//! * **Actions** – queued player actions, applied before the clock moves so
//!   a collected accumulator restarts from the time it was emptied.
//! * **Clock** – advances [`SimClock`](crate::time_of_day::SimClock). Every
//!   later phase sees the new time within the same tick.
//! * **Ledger** – economic accrual first, then the occupancy engines
//!   (tenancy, hotel rooms, shop hours, restaurant tables, payroll) and the
//!   scheduled-event queue. Everything a citizen might react to (table
//!   availability, shop opening) reflects this tick's state.
//! * **Transit** – bus movement and stop dwell exchange.
//! * **Population** – citizen state machines, tourist expiry, growth.
//! * **Report** – counters and notifications. Reads simulation state only.

use bevy::prelude::*;

/// Ordered phases for systems running in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TownSet {
    Actions,
    Clock,
    Ledger,
    Transit,
    Population,
    Report,
}

/// Fine-grained ordering inside [`TownSet::Ledger`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerSet {
    Accrual,
    Occupancy,
}

pub(crate) fn configure_town_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            TownSet::Actions,
            TownSet::Clock,
            TownSet::Ledger,
            TownSet::Transit,
            TownSet::Population,
            TownSet::Report,
        )
            .chain(),
    );
    app.configure_sets(
        FixedUpdate,
        (LedgerSet::Accrual, LedgerSet::Occupancy)
            .chain()
            .in_set(TownSet::Ledger),
    );
}
