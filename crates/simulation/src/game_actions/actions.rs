use bevy::prelude::*;

use crate::structures::Shift;
use crate::time_of_day::GameSpeed;

/// A player-issued mutation of the town. Structure targets are entity
/// handles; an action naming a structure that no longer exists fails with
/// `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TownAction {
    /// Move a structure's accumulated income into the treasury.
    CollectIncome {
        structure: Entity,
    },
    /// Sum and zero every unit's rent.
    CollectRent {
        apartment: Entity,
    },
    /// Move a producer's stored resources into the town stockpile.
    CollectResources {
        structure: Entity,
    },
    RestockShop {
        shop: Entity,
    },
    HireShopEmployee {
        shop: Entity,
    },
    HireFrontDesk {
        hotel: Entity,
    },
    HireMaid {
        hotel: Entity,
    },
    HireWaiter {
        restaurant: Entity,
        shift: Shift,
    },
    /// Clean every dirty room at a per-room cost.
    CleanRooms {
        hotel: Entity,
    },
    SetSpeed {
        speed: GameSpeed,
    },
    SetPaused {
        paused: bool,
    },
}

impl TownAction {
    pub fn label(&self) -> &'static str {
        match self {
            TownAction::CollectIncome { .. } => "collect income",
            TownAction::CollectRent { .. } => "collect rent",
            TownAction::CollectResources { .. } => "collect resources",
            TownAction::RestockShop { .. } => "restock shop",
            TownAction::HireShopEmployee { .. } => "hire shop employee",
            TownAction::HireFrontDesk { .. } => "hire front desk",
            TownAction::HireMaid { .. } => "hire maid",
            TownAction::HireWaiter { .. } => "hire waiter",
            TownAction::CleanRooms { .. } => "clean rooms",
            TownAction::SetSpeed { .. } => "set speed",
            TownAction::SetPaused { .. } => "set paused",
        }
    }
}
