//! Applies [`TownAction`]s to the world.
//!
//! Every action is validated before anything is written, so a refused
//! action leaves the world exactly as it found it. The queued path drains
//! the [`ActionQueue`] once per tick and records each outcome in the
//! [`ActionResultLog`].

use bevy::prelude::*;

use crate::economy::TownBudget;
use crate::game_params::GameParams;
use crate::structures::{Payload, RoomStatus, Shift, Structure, StructureKind};
use crate::time_of_day::SimClock;

use super::result_log::ActionResultLog;
use super::{ActionError, ActionQueue, ActionResult, TownAction};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Drains all pending actions and executes them in submission order.
pub fn execute_queued_actions(world: &mut World) {
    let actions = world.resource_mut::<ActionQueue>().drain();
    for queued in actions {
        let result = apply_action(world, &queued.action);
        world
            .resource_mut::<ActionResultLog>()
            .push(queued.action, result);
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Apply one action synchronously.
pub fn apply_action(world: &mut World, action: &TownAction) -> ActionResult {
    let outcome = match *action {
        TownAction::CollectIncome { structure } => collect_income(world, structure),
        TownAction::CollectRent { apartment } => collect_rent(world, apartment),
        TownAction::CollectResources { structure } => collect_resources(world, structure),
        TownAction::RestockShop { shop } => restock_shop(world, shop),
        TownAction::HireShopEmployee { shop } => hire_shop_employee(world, shop),
        TownAction::HireFrontDesk { hotel } => hire_hotel_staff(world, hotel, HotelRole::FrontDesk),
        TownAction::HireMaid { hotel } => hire_hotel_staff(world, hotel, HotelRole::Maid),
        TownAction::HireWaiter { restaurant, shift } => hire_waiter(world, restaurant, shift),
        TownAction::CleanRooms { hotel } => clean_rooms(world, hotel),
        TownAction::SetSpeed { speed } => {
            world.resource_mut::<SimClock>().speed = speed;
            Ok(ActionResult::Success)
        }
        TownAction::SetPaused { paused } => {
            world.resource_mut::<SimClock>().paused = paused;
            Ok(ActionResult::Success)
        }
    };
    match &outcome {
        Ok(result) => debug!("Action {}: {:?}", action.label(), result),
        Err(error) => debug!("Action {} refused: {}", action.label(), error),
    }
    outcome.into()
}

// ---------------------------------------------------------------------------
// Execution functions
// ---------------------------------------------------------------------------

fn structure(world: &World, entity: Entity) -> Result<&Structure, ActionError> {
    world.get::<Structure>(entity).ok_or(ActionError::NotFound)
}

fn structure_mut(world: &mut World, entity: Entity) -> Result<Mut<'_, Structure>, ActionError> {
    world.get_mut::<Structure>(entity).ok_or(ActionError::NotFound)
}

fn collect_income(world: &mut World, entity: Entity) -> Result<ActionResult, ActionError> {
    let now = world.resource::<SimClock>().minutes;
    let mut structure = structure_mut(world, entity)?;
    let amount = structure.accrual.income;
    if amount <= 0.0 {
        return Err(ActionError::NothingToDo);
    }
    structure.accrual.income = 0.0;
    structure.accrual.last_accrual = now;
    world.resource_mut::<TownBudget>().treasury += amount;
    Ok(ActionResult::Collected(amount))
}

fn collect_rent(world: &mut World, entity: Entity) -> Result<ActionResult, ActionError> {
    let now = world.resource::<SimClock>().minutes;
    let mut structure = structure_mut(world, entity)?;
    let Payload::Apartment(apartment) = &mut structure.payload else {
        return Err(ActionError::NotSupported);
    };
    let total = apartment.total_rent();
    if total <= 0.0 {
        return Err(ActionError::NothingToDo);
    }
    for unit in &mut apartment.units {
        unit.accumulated_rent = 0.0;
        unit.last_accrual = now;
    }
    world.resource_mut::<TownBudget>().treasury += total;
    Ok(ActionResult::Collected(total))
}

fn collect_resources(world: &mut World, entity: Entity) -> Result<ActionResult, ActionError> {
    let now = world.resource::<SimClock>().minutes;
    let mut structure = structure_mut(world, entity)?;
    let StructureKind::ResourceProducer(kind) = structure.kind else {
        return Err(ActionError::NotSupported);
    };
    let units = structure.accrual.stored_resources;
    if units <= 0.0 {
        return Err(ActionError::NothingToDo);
    }
    structure.accrual.stored_resources = 0.0;
    structure.accrual.last_accrual = now;
    *world
        .resource_mut::<TownBudget>()
        .stockpile
        .entry(kind)
        .or_insert(0.0) += units;
    Ok(ActionResult::Collected(units))
}

fn restock_shop(world: &mut World, entity: Entity) -> Result<ActionResult, ActionError> {
    let (units, cost) = match &structure(world, entity)?.payload {
        Payload::Shop(shop) => {
            let units = shop.max_stock.saturating_sub(shop.stock);
            (units, units as f64 * shop.unit_restock_cost)
        }
        _ => return Err(ActionError::NotSupported),
    };
    if units == 0 {
        return Err(ActionError::NothingToDo);
    }
    charge(world, cost)?;
    if let Payload::Shop(shop) = &mut structure_mut(world, entity)?.payload {
        shop.stock = shop.max_stock;
    }
    Ok(ActionResult::Spent(cost))
}

/// Deduct `cost` from the treasury, or refuse without touching it.
fn charge(world: &mut World, cost: f64) -> Result<(), ActionError> {
    let mut budget = world.resource_mut::<TownBudget>();
    if !budget.can_afford(cost) {
        return Err(ActionError::InsufficientFunds);
    }
    budget.treasury -= cost;
    Ok(())
}

fn hire_shop_employee(world: &mut World, entity: Entity) -> Result<ActionResult, ActionError> {
    let mut structure = structure_mut(world, entity)?;
    let Payload::Shop(shop) = &mut structure.payload else {
        return Err(ActionError::NotSupported);
    };
    if shop.has_employee {
        return Err(ActionError::AlreadyStaffed);
    }
    shop.has_employee = true;
    Ok(ActionResult::Success)
}

#[derive(Debug, Clone, Copy)]
enum HotelRole {
    FrontDesk,
    Maid,
}

fn hire_hotel_staff(
    world: &mut World,
    entity: Entity,
    role: HotelRole,
) -> Result<ActionResult, ActionError> {
    let mut structure = structure_mut(world, entity)?;
    let Payload::Hotel(hotel) = &mut structure.payload else {
        return Err(ActionError::NotSupported);
    };
    let flag = match role {
        HotelRole::FrontDesk => &mut hotel.has_front_desk,
        HotelRole::Maid => &mut hotel.has_maid,
    };
    if *flag {
        return Err(ActionError::AlreadyStaffed);
    }
    *flag = true;
    Ok(ActionResult::Success)
}

fn hire_waiter(
    world: &mut World,
    entity: Entity,
    shift: Shift,
) -> Result<ActionResult, ActionError> {
    let mut structure = structure_mut(world, entity)?;
    let Payload::Restaurant(restaurant) = &mut structure.payload else {
        return Err(ActionError::NotSupported);
    };
    let flag = match shift {
        Shift::Day => &mut restaurant.has_day_waiter,
        Shift::Night => &mut restaurant.has_night_waiter,
    };
    if *flag {
        return Err(ActionError::AlreadyStaffed);
    }
    *flag = true;
    Ok(ActionResult::Success)
}

fn clean_rooms(world: &mut World, entity: Entity) -> Result<ActionResult, ActionError> {
    let dirty = match &structure(world, entity)?.payload {
        Payload::Hotel(hotel) => hotel.dirty_rooms(),
        _ => return Err(ActionError::NotSupported),
    };
    if dirty == 0 {
        return Err(ActionError::NothingToDo);
    }
    let cost = dirty as f64 * world.resource::<GameParams>().hotel.room_cleaning_cost;
    charge(world, cost)?;
    if let Payload::Hotel(hotel) = &mut structure_mut(world, entity)?.payload {
        for room in &mut hotel.rooms {
            if room.status == RoomStatus::Dirty {
                room.status = RoomStatus::Clean;
            }
        }
    }
    Ok(ActionResult::Spent(cost))
}
