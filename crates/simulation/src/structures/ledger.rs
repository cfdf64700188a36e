//! The `Structure` component and the construction/demolition boundary.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::districts::Districts;
use crate::notifications::StructureRemoved;
use crate::time_of_day::SimClock;

use super::kinds::StructureKind;
use super::payload::Payload;

/// Accumulators present on every structure regardless of kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Accrual {
    pub income: f64,
    pub stored_resources: f64,
    /// Simulated minute of the last accrual step.
    pub last_accrual: f64,
}

#[derive(Component, Debug, Clone)]
pub struct Structure {
    pub kind: StructureKind,
    pub position: f32,
    /// 1.0, or 1.2 when placed in a district favouring its category.
    pub district_bonus: f64,
    pub accrual: Accrual,
    pub payload: Payload,
}

impl Structure {
    pub fn new(kind: StructureKind, position: f32, district_bonus: f64, now: f64) -> Self {
        Self {
            kind,
            position,
            district_bonus,
            accrual: Accrual {
                last_accrual: now,
                ..Default::default()
            },
            payload: Payload::for_kind(kind, now),
        }
    }

    /// Build a structure at `position`, resolving its district bonus.
    pub fn placed(kind: StructureKind, position: f32, districts: &Districts, now: f64) -> Self {
        let bonus = districts.bonus_at(position, kind.category());
        Self::new(kind, position, bonus, now)
    }

    /// `false` when the payload does not belong to the kind. Sweeps skip such
    /// structures instead of guessing.
    pub fn is_consistent(&self) -> bool {
        self.payload.matches(self.kind)
    }

    pub fn distance_to(&self, position: f32) -> f32 {
        (self.position - position).abs()
    }
}

/// Place a structure into the world with its default lifecycle payload.
pub fn place_structure(world: &mut World, kind: StructureKind, position: f32) -> Entity {
    let now = world.resource::<SimClock>().minutes;
    let structure = {
        let districts = world.resource::<Districts>();
        Structure::placed(kind, position, districts, now)
    };
    let entity = world.spawn(structure).id();
    debug!("Placed {} at {:.1} ({:?})", kind.label(), position, entity);
    entity
}

/// Remove a structure. In-flight references to it are recovered by the
/// sweeps that hold them.
pub fn demolish_structure(world: &mut World, entity: Entity) -> bool {
    let Some(kind) = world.get::<Structure>(entity).map(|s| s.kind) else {
        return false;
    };
    world.despawn(entity);
    world.send_event(StructureRemoved { entity, kind });
    info!("Demolished {} ({:?})", kind.label(), entity);
    true
}
