//! Citizens: the walking, queueing, riding, visiting population.
//!
//! Each tick the destination cache is rebuilt from the ledger, tourists
//! whose stay is over turn for home, the state machine advances every
//! citizen, and the town grows toward its housing capacity.

mod behavior;
mod counters;
mod destinations;
mod growth;
mod settlement;

pub use behavior::advance_citizens;
pub use counters::{count_population, PopulationCounters};
pub use destinations::{errand_for, rebuild_destinations, Destination, DestinationCache};
pub use growth::{grow_population, housing_capacity};
pub use settlement::settle_visit;

use bevy::prelude::*;

pub struct PopulationPlugin;

impl Plugin for PopulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PopulationCounters>()
            .init_resource::<DestinationCache>()
            .add_systems(
                FixedUpdate,
                (rebuild_destinations, advance_citizens, grow_population)
                    .chain()
                    .in_set(crate::TownSet::Population),
            )
            .add_systems(
                FixedUpdate,
                count_population
                    .before(crate::notifications::check_population_milestones)
                    .in_set(crate::TownSet::Report),
            );

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<PopulationCounters>();
    }
}
