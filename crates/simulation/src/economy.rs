use std::collections::BTreeMap;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::structures::{Payload, ResourceKind, Structure};
use crate::time_of_day::SimClock;

/// Money and goods owned by the town rather than by any one structure.
/// Collected income, fares and resources flow in; restocking, cleaning and
/// wages flow out.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct TownBudget {
    pub treasury: f64,
    pub stockpile: BTreeMap<ResourceKind, f64>,
    pub fares_collected: f64,
    pub wages_paid: f64,
    pub last_payroll_day: Option<u64>,
}

impl Default for TownBudget {
    fn default() -> Self {
        Self {
            treasury: 5000.0,
            stockpile: BTreeMap::new(),
            fares_collected: 0.0,
            wages_paid: 0.0,
            last_payroll_day: None,
        }
    }
}

impl TownBudget {
    pub fn can_afford(&self, cost: f64) -> bool {
        self.treasury >= cost
    }

    pub fn stock_of(&self, kind: ResourceKind) -> f64 {
        self.stockpile.get(&kind).copied().unwrap_or(0.0)
    }
}

/// Daily wages owed by one structure's staff.
pub fn daily_wages(structure: &Structure) -> f64 {
    match &structure.payload {
        Payload::Shop(shop) if shop.has_employee => shop.daily_wage,
        Payload::Hotel(hotel) => hotel.daily_wages(),
        Payload::Restaurant(restaurant) => restaurant.daily_wages(),
        _ => 0.0,
    }
}

/// Pay every staffed role once per simulated day. The first tick only
/// records the day; wages fall due at each day boundary after that.
pub fn pay_daily_wages(
    clock: Res<SimClock>,
    mut budget: ResMut<TownBudget>,
    structures: Query<&Structure>,
) {
    let day = clock.day();
    match budget.last_payroll_day {
        Some(last) if last >= day => return,
        None => {
            budget.last_payroll_day = Some(day);
            return;
        }
        Some(_) => {}
    }
    budget.last_payroll_day = Some(day);

    let total: f64 = structures
        .iter()
        .filter(|s| {
            let consistent = s.is_consistent();
            if !consistent {
                warn!(
                    "Payroll: {:?} has a payload that does not match its kind, skipping",
                    s.kind
                );
            }
            consistent
        })
        .map(daily_wages)
        .sum();
    if total <= 0.0 {
        return;
    }
    budget.treasury -= total;
    budget.wages_paid += total;
    if budget.treasury < 0.0 {
        warn!(
            "Payroll of {:.2} left the treasury at {:.2}",
            total, budget.treasury
        );
    } else {
        debug!("Paid {:.2} in daily wages", total);
    }
}

impl crate::Saveable for TownBudget {
    const SAVE_KEY: &'static str = "town_budget";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TownBudget>().add_systems(
            FixedUpdate,
            pay_daily_wages.in_set(crate::LedgerSet::Occupancy),
        );

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<TownBudget>();
    }
}
