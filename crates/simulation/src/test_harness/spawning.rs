//! Structure and citizen spawning methods for `TestTown`.

use bevy::prelude::*;

use crate::citizen::Citizen;
use crate::game_actions::{apply_action, ActionResult, ActionSource, TownAction};
use crate::structures::{place_structure, Payload, Structure, StructureKind, Tenant};
use crate::time_of_day::SimClock;
use crate::tourism::Tourist;

use super::TestTown;

impl TestTown {
    // -----------------------------------------------------------------------
    // Structures
    // -----------------------------------------------------------------------

    /// Place a structure through the ledger, resolving its district bonus.
    pub fn with_structure(mut self, kind: StructureKind, position: f32) -> Self {
        self.place(kind, position);
        self
    }

    /// Place a structure and return its entity.
    pub fn place(&mut self, kind: StructureKind, position: f32) -> Entity {
        place_structure(self.app.world_mut(), kind, position)
    }

    /// Edit a structure's component in place.
    pub fn edit_structure(&mut self, entity: Entity, edit: impl FnOnce(&mut Structure)) {
        let mut structure = self
            .app
            .world_mut()
            .get_mut::<Structure>(entity)
            .expect("structure exists");
        edit(&mut structure);
    }

    /// Move a tenant into `unit` of an apartment, without going through a listing.
    pub fn move_in(&mut self, apartment: Entity, unit: usize, credit_score: u32, rent: f64) {
        let now = self.app.world().resource::<SimClock>().minutes;
        self.edit_structure(apartment, |s| {
            let Payload::Apartment(payload) = &mut s.payload else {
                panic!("{apartment:?} is not an apartment");
            };
            let tenant = Tenant {
                name: "Test Tenant".to_string(),
                job: "Tester".to_string(),
                credit_score,
                monthly_rent_offer: rent,
                employment_months: 12,
            };
            assert!(payload.move_in(unit, tenant, now), "unit {unit} is occupied");
        });
    }

    // -----------------------------------------------------------------------
    // Citizens
    // -----------------------------------------------------------------------

    /// Spawn a resident walking at `position`.
    pub fn spawn_resident(&mut self, position: f32) -> Entity {
        self.app
            .world_mut()
            .spawn(Citizen::new(position, 20.0, 1.0))
            .id()
    }

    /// Spawn a tourist at `position` whose stay lasts `stay_minutes` from now.
    /// The tourist holds no booking.
    pub fn spawn_tourist(&mut self, position: f32, stay_minutes: f64) -> Entity {
        let now = self.app.world().resource::<SimClock>().minutes;
        self.app
            .world_mut()
            .spawn((
                Citizen::new(position, 20.0, 1.0),
                Tourist::new(now, stay_minutes),
            ))
            .id()
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Apply an action immediately, bypassing the queue.
    pub fn apply(&mut self, action: TownAction) -> ActionResult {
        apply_action(self.app.world_mut(), &action)
    }

    /// Queue an action for the next tick's action phase.
    pub fn queue(&mut self, action: TownAction) {
        let tick = self.app.world().resource::<crate::TickCounter>().0;
        self.app
            .world_mut()
            .resource_mut::<crate::game_actions::ActionQueue>()
            .push(tick, ActionSource::Script, action);
    }
}
