//! Resident growth toward housing capacity.

use bevy::prelude::*;

use crate::citizen::Citizen;
use crate::config::{EXIT_OFFSET, WORLD_LENGTH};
use crate::game_params::{GameParams, PopulationParams};
use crate::sim_rng::SimRng;
use crate::structures::{Payload, Structure, StructureKind};
use crate::time_of_day::SimClock;
use crate::tourism::Tourist;

use super::counters::PopulationCounters;

/// Residents the town can house: a fixed number per house plus one per
/// tenanted apartment unit.
pub fn housing_capacity<'a>(
    structures: impl Iterator<Item = &'a Structure>,
    params: &PopulationParams,
) -> u32 {
    structures
        .map(|s| match (&s.kind, &s.payload) {
            (StructureKind::House, _) => params.residents_per_house,
            (StructureKind::Apartment, Payload::Apartment(apartment)) => {
                apartment.occupied_units() as u32 * params.residents_per_unit
            }
            _ => 0,
        })
        .sum()
}

/// System: once per growth interval, add one resident if there is room.
pub fn grow_population(
    clock: Res<SimClock>,
    params: Res<GameParams>,
    mut rng: ResMut<SimRng>,
    mut counters: ResMut<PopulationCounters>,
    mut commands: Commands,
    structures: Query<&Structure>,
    residents: Query<(), (With<Citizen>, Without<Tourist>)>,
) {
    let now = clock.minutes;
    if let Some(last) = counters.last_growth_minute {
        if now - last < params.population.growth_interval_minutes {
            return;
        }
    }
    counters.last_growth_minute = Some(now);

    let capacity = housing_capacity(structures.iter(), &params.population);
    let current = residents.iter().count() as u32;
    if current >= capacity {
        return;
    }

    let homes: Vec<f32> = structures
        .iter()
        .filter(|s| s.kind.is_residential())
        .map(|s| s.position)
        .collect();
    let Some(index) = rng.pick_index(homes.len()) else {
        return;
    };
    let position = (homes[index] + EXIT_OFFSET * rng.direction()).clamp(0.0, WORLD_LENGTH);
    let citizen = Citizen::random(&mut rng, &params.citizen, position);
    commands.spawn(citizen);
    debug!(
        "New resident at {:.1} ({} of {} housed)",
        position,
        current + 1,
        capacity
    );
}
