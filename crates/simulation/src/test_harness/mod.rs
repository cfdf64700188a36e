//! # TestTown: headless integration test harness
//!
//! Provides a fluent builder that wraps `bevy::app::App` + `SimulationPlugin`
//! for running integration tests without a window or renderer.

mod assertions;
mod queries;
mod setup;
mod spawning;

use bevy::app::App;
use bevy::prelude::*;

use crate::sim_rng::SimRng;
use crate::town_init::SkipTownInit;
use crate::SimulationPlugin;

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
///
/// Use builder methods to set up the town, then call `tick()` to advance the
/// simulation and query/assert on the resulting ECS state.
pub struct TestTown {
    app: App,
}

impl TestTown {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new **empty** town: an empty road with every resource at its
    /// default and a fixed RNG seed. The starter layout is NOT placed.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);

        // Insert the marker BEFORE SimulationPlugin so init_town skips.
        app.insert_resource(SkipTownInit);
        app.add_plugins(SimulationPlugin);
        app.insert_resource(SimRng::from_seed_u64(0x7077_0001));

        // Run one update so Startup systems execute (init_town will no-op).
        app.update();

        Self { app }
    }

    /// Create a town with the full starter layout placed by `init_town`.
    pub fn with_starter_town(seed: u64) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        app.insert_resource(SimRng::from_seed_u64(seed));
        app.update();
        Self { app }
    }
}

impl Default for TestTown {
    fn default() -> Self {
        Self::new()
    }
}
