//! Bus service along the town's single road.
//!
//! ## Data model
//! - `BusStop`: a stop at a position on the road, with a waiting queue
//! - `Bus`: shuttles end to end, dwelling at each stop it reaches
//! - `TransitState`: resource holding every stop and bus plus ridership
//!
//! ## Dwell exchange
//! On reaching a stop a bus waits a fixed time and, once per visit, lets
//! passengers off (certainly at their destination, otherwise by chance),
//! may bring in tourists, then boards from the queue up to capacity.
//! Each boarding pays a fare into the town treasury.

pub mod state;
pub mod systems;
pub mod types;

pub use systems::*;
pub use types::*;

use bevy::prelude::*;

// =============================================================================
// Plugin
// =============================================================================

pub struct BusTransitPlugin;

impl Plugin for BusTransitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransitState>().add_systems(
            FixedUpdate,
            update_buses.in_set(crate::TownSet::Transit),
        );
    }
}
