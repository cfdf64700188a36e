//! Data-driven town parameters.
//!
//! Tunables that shape behaviour but are not part of a structure's identity
//! live in a single [`GameParams`] resource so they can be adjusted at
//! runtime (and by tests) without recompilation. Systems read
//! `Res<GameParams>`; the resource is saveable so overrides survive a
//! snapshot.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Citizens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct CitizenParams {
    /// Walk speed range in world units per simulated-equivalent second.
    pub walk_speed: (f32, f32),
    /// Per-tick chance a walker with no target turns around.
    pub direction_flip_chance: f64,
    /// Per-tick chance a walker with no target heads for the nearest stop.
    pub stop_seek_chance: f64,
    /// Per-tick chance a walker with no target picks a structure to visit.
    pub visit_seek_chance: f64,
    /// Visit length for shops, entertainment and services, in seconds.
    pub visit_secs: (f32, f32),
    /// Meal length at a restaurant, in simulated minutes.
    pub meal_minutes: (f64, f64),
    /// Seconds a citizen waits at a stop before it may give up.
    pub patience_secs: f32,
    /// Per-tick chance an impatient citizen leaves the queue.
    pub give_up_chance: f64,
}

impl Default for CitizenParams {
    fn default() -> Self {
        Self {
            walk_speed: (18.0, 32.0),
            direction_flip_chance: 0.002,
            stop_seek_chance: 0.001,
            visit_seek_chance: 0.003,
            visit_secs: (5.0, 15.0),
            meal_minutes: (15.0, 35.0),
            patience_secs: 30.0,
            give_up_chance: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// Transit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct TransitParams {
    /// Bus speed in world units per simulated-equivalent second.
    pub bus_speed: f32,
    pub bus_capacity: usize,
    /// Dwell time at a stop in simulated-equivalent seconds.
    pub dwell_secs: f32,
    /// Chance a passenger not bound for this stop gets off anyway.
    pub drop_off_chance: f64,
    /// Fare credited to the treasury per boarding.
    pub fare: f64,
    /// Chance a dwell spawns tourists, and the most it spawns.
    pub tourist_spawn_chance: f64,
    pub max_tourists_per_dwell: u32,
    /// Same, while a tourism-boosting structure stands anywhere in town.
    pub boosted_tourist_spawn_chance: f64,
    pub boosted_max_tourists_per_dwell: u32,
    /// Tourist stay length in simulated minutes.
    pub tourist_stay_minutes: (f64, f64),
}

impl Default for TransitParams {
    fn default() -> Self {
        Self {
            bus_speed: 40.0,
            bus_capacity: 12,
            dwell_secs: 3.0,
            drop_off_chance: 0.3,
            fare: 2.0,
            tourist_spawn_chance: 0.2,
            max_tourists_per_dwell: 2,
            boosted_tourist_spawn_chance: 0.45,
            boosted_max_tourists_per_dwell: 4,
            tourist_stay_minutes: (6.0 * 60.0, 36.0 * 60.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tenancy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct TenancyParams {
    /// Delay between a unit emptying and a new tenant, in simulated minutes.
    pub listing_delay_minutes: (f64, f64),
    /// Rent offer as a fraction of the apartment's base rate.
    pub rent_offer_factor: (f64, f64),
}

impl Default for TenancyParams {
    fn default() -> Self {
        Self {
            listing_delay_minutes: (6.0, 16.0),
            rent_offer_factor: (0.7, 1.3),
        }
    }
}

// ---------------------------------------------------------------------------
// Hotels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct HotelParams {
    /// Nightly chance a walk-in guest (past the first night) checks out.
    pub walk_in_checkout_chance: f64,
    /// Nightly chance a clean vacant room gets a walk-in guest.
    pub walk_in_chance: f64,
    /// Hours (start inclusive, end exclusive) of the nightly check-in pass.
    pub check_in_window: (u32, u32),
    /// Cost of cleaning one room by hand.
    pub room_cleaning_cost: f64,
}

impl Default for HotelParams {
    fn default() -> Self {
        Self {
            walk_in_checkout_chance: 0.33,
            walk_in_chance: 0.5,
            check_in_window: (18, 22),
            room_cleaning_cost: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct PopulationParams {
    /// Simulated minutes between growth attempts.
    pub growth_interval_minutes: f64,
    pub residents_per_house: u32,
    pub residents_per_unit: u32,
    /// Resident counts that fire a milestone notification when first reached.
    pub milestones: Vec<u32>,
}

impl Default for PopulationParams {
    fn default() -> Self {
        Self {
            growth_interval_minutes: 60.0,
            residents_per_house: 4,
            residents_per_unit: 1,
            milestones: vec![10, 25, 50, 100, 250],
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level resource
// ---------------------------------------------------------------------------

#[derive(
    Resource, Debug, Clone, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct GameParams {
    pub citizen: CitizenParams,
    pub transit: TransitParams,
    pub tenancy: TenancyParams,
    pub hotel: HotelParams,
    pub population: PopulationParams,
}

impl crate::Saveable for GameParams {
    const SAVE_KEY: &'static str = "game_params";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

pub struct GameParamsPlugin;

impl Plugin for GameParamsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameParams>();

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<GameParams>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Saveable;

    #[test]
    fn test_defaults_are_sane_ranges() {
        let params = GameParams::default();
        assert!(params.citizen.walk_speed.0 < params.citizen.walk_speed.1);
        assert!(params.citizen.visit_secs.0 >= 5.0 && params.citizen.visit_secs.1 <= 15.0);
        assert_eq!(params.citizen.meal_minutes, (15.0, 35.0));
        assert!((params.transit.drop_off_chance - 0.3).abs() < f64::EPSILON);
        assert!((params.transit.dwell_secs - 3.0).abs() < f32::EPSILON);
        assert_eq!(params.hotel.check_in_window, (18, 22));
        assert!(
            params.transit.boosted_tourist_spawn_chance > params.transit.tourist_spawn_chance
        );
    }

    #[test]
    fn test_saveable_roundtrip() {
        let mut params = GameParams::default();
        params.transit.bus_capacity = 3;
        params.population.milestones = vec![1, 2];

        let bytes = params.save_to_bytes().expect("params always save");
        let restored = GameParams::load_from_bytes(&bytes);
        assert_eq!(restored.transit.bus_capacity, 3);
        assert_eq!(restored.population.milestones, vec![1, 2]);
    }
}
