//! Builder methods for town-wide state: seed, clock, budget, tunables,
//! districts and the bus network.

use crate::bus_transit::TransitState;
use crate::districts::Districts;
use crate::economy::TownBudget;
use crate::game_params::GameParams;
use crate::sim_rng::SimRng;
use crate::structures::Category;
use crate::time_of_day::SimClock;

use super::TestTown;

impl TestTown {
    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Reseed the simulation RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.app.world_mut().insert_resource(SimRng::from_seed_u64(seed));
        self
    }

    /// Jump the clock to `hour` on `day`, unpaused at normal speed.
    pub fn with_clock(mut self, day: u64, hour: f64) -> Self {
        self.app
            .world_mut()
            .insert_resource(SimClock::at_hour(day, hour));
        self
    }

    pub fn with_treasury(mut self, treasury: f64) -> Self {
        self.app.world_mut().resource_mut::<TownBudget>().treasury = treasury;
        self
    }

    /// Adjust the tunables in place.
    pub fn with_params(mut self, tweak: impl FnOnce(&mut GameParams)) -> Self {
        tweak(&mut self.app.world_mut().resource_mut::<GameParams>());
        self
    }

    /// Turn off every arrival: tourist spawns, drop-offs and resident growth
    /// (housing capacity is zeroed).
    pub fn without_arrivals(self) -> Self {
        self.with_params(|p| {
            p.transit.tourist_spawn_chance = 0.0;
            p.transit.boosted_tourist_spawn_chance = 0.0;
            p.transit.drop_off_chance = 0.0;
            p.population.residents_per_house = 0;
            p.population.residents_per_unit = 0;
        })
    }

    /// Citizens never pick a stop or a structure on their own.
    pub fn without_errands(self) -> Self {
        self.with_params(|p| {
            p.citizen.stop_seek_chance = 0.0;
            p.citizen.visit_seek_chance = 0.0;
        })
    }

    // -----------------------------------------------------------------------
    // Districts and transit
    // -----------------------------------------------------------------------

    /// Designate a district. Panics if it overlaps an existing one.
    pub fn with_district(mut self, name: &str, start: f32, end: f32, favours: Category) -> Self {
        let added = self
            .app
            .world_mut()
            .resource_mut::<Districts>()
            .designate(name, start, end, favours);
        assert!(added, "district {name} overlaps an existing span");
        self
    }

    pub fn with_stop(mut self, position: f32) -> Self {
        let added = self
            .app
            .world_mut()
            .resource_mut::<TransitState>()
            .add_stop(position);
        assert!(added.is_some(), "stop at {position} was rejected");
        self
    }

    /// Add a bus using the configured speed and capacity.
    pub fn with_bus(mut self, position: f32, direction: f32) -> Self {
        let world = self.app.world_mut();
        let (speed, capacity) = {
            let params = world.resource::<GameParams>();
            (params.transit.bus_speed, params.transit.bus_capacity)
        };
        world
            .resource_mut::<TransitState>()
            .add_bus(position, direction, speed, capacity);
        self
    }
}
