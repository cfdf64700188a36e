use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::citizen::Citizen;
use crate::tourism::Tourist;

/// Population totals. `residents` and `tourists` are recounted every tick;
/// the lifetime totals are bumped where the events happen.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PopulationCounters {
    pub residents: u32,
    pub tourists: u32,
    pub tourists_arrived: u64,
    pub tourists_departed: u64,
    pub visits_completed: u64,
    /// Simulated minute of the last growth attempt.
    pub last_growth_minute: Option<f64>,
}

impl PopulationCounters {
    pub fn total(&self) -> u32 {
        self.residents + self.tourists
    }
}

pub fn count_population(
    mut counters: ResMut<PopulationCounters>,
    residents: Query<(), (With<Citizen>, Without<Tourist>)>,
    tourists: Query<(), (With<Citizen>, With<Tourist>)>,
) {
    counters.residents = residents.iter().count() as u32;
    counters.tourists = tourists.iter().count() as u32;
}

impl crate::Saveable for PopulationCounters {
    const SAVE_KEY: &'static str = "population_counters";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}
