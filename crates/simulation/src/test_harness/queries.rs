//! Query and simulation-tick methods for `TestTown`.

use bevy::prelude::*;

use crate::bus_transit::TransitState;
use crate::citizen::Citizen;
use crate::economy::TownBudget;
use crate::game_actions::ActionResultLog;
use crate::notifications::NotificationLog;
use crate::population::PopulationCounters;
use crate::report::{build_report, TownReport};
use crate::structures::Structure;
use crate::time_of_day::SimClock;
use crate::tourism::Tourist;

use super::TestTown;

impl TestTown {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by directly executing the `FixedUpdate`
    /// schedule. This bypasses Bevy's time system entirely; the clock
    /// advances by the fixed timestep on every run.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Tick until the simulated clock has moved at least `minutes` forward.
    /// Gives up after a million ticks so a paused clock cannot hang a test.
    pub fn tick_minutes(&mut self, minutes: f64) {
        let target = self.clock().minutes + minutes;
        for _ in 0..1_000_000 {
            if self.clock().minutes >= target {
                return;
            }
            self.tick(1);
        }
        panic!("clock did not reach minute {target}");
    }

    /// Pause the clock, move it forward by exactly `minutes`, and run one
    /// tick so the ledger catches up. The clock stays paused.
    pub fn jump_minutes(&mut self, minutes: f64) {
        {
            let mut clock = self.app.world_mut().resource_mut::<SimClock>();
            clock.paused = true;
            clock.minutes += minutes;
        }
        self.tick(1);
    }

    // -----------------------------------------------------------------------
    // Queries (note: Bevy's World::query() requires &mut World)
    // -----------------------------------------------------------------------

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn clock(&self) -> &SimClock {
        self.app.world().resource::<SimClock>()
    }

    pub fn budget(&self) -> &TownBudget {
        self.app.world().resource::<TownBudget>()
    }

    pub fn transit(&self) -> &TransitState {
        self.app.world().resource::<TransitState>()
    }

    pub fn counters(&self) -> &PopulationCounters {
        self.app.world().resource::<PopulationCounters>()
    }

    pub fn action_log(&self) -> &ActionResultLog {
        self.app.world().resource::<ActionResultLog>()
    }

    pub fn notifications(&self) -> &NotificationLog {
        self.app.world().resource::<NotificationLog>()
    }

    /// The structure component of `entity`. Panics if it was demolished.
    pub fn structure(&self, entity: Entity) -> &Structure {
        self.app
            .world()
            .get::<Structure>(entity)
            .expect("structure exists")
    }

    pub fn citizen(&self, entity: Entity) -> Option<&Citizen> {
        self.app.world().get::<Citizen>(entity)
    }

    pub fn tourist(&self, entity: Entity) -> Option<&Tourist> {
        self.app.world().get::<Tourist>(entity)
    }

    pub fn structure_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world.query::<&Structure>().iter(world).count()
    }

    /// Count every citizen, residents and tourists alike.
    pub fn citizen_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world.query::<&Citizen>().iter(world).count()
    }

    pub fn tourist_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world
            .query_filtered::<(), (With<Citizen>, With<Tourist>)>()
            .iter(world)
            .count()
    }

    pub fn report(&mut self) -> TownReport {
        build_report(self.app.world_mut())
    }
}
