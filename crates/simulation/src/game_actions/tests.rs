use bevy::prelude::*;

use super::*;
use crate::economy::TownBudget;
use crate::game_params::GameParams;
use crate::structures::{
    Payload, ResourceKind, RestaurantKind, RoomStatus, Shift, ShopKind, Structure, StructureKind,
    Tenant,
};
use crate::time_of_day::{GameSpeed, SimClock};

fn action_world() -> World {
    let mut world = World::new();
    world.insert_resource(SimClock::at_hour(0, 10.0));
    world.init_resource::<TownBudget>();
    world.init_resource::<GameParams>();
    world.init_resource::<ActionQueue>();
    world.init_resource::<ActionResultLog>();
    world
}

fn spawn(world: &mut World, kind: StructureKind) -> Entity {
    world.spawn(Structure::new(kind, 100.0, 1.0, 0.0)).id()
}

fn treasury(world: &World) -> f64 {
    world.resource::<TownBudget>().treasury
}

#[test]
fn test_collect_income_moves_money_to_treasury() {
    let mut world = action_world();
    let house = spawn(&mut world, StructureKind::House);
    world.get_mut::<Structure>(house).unwrap().accrual.income = 42.5;

    let result = apply_action(&mut world, &TownAction::CollectIncome { structure: house });
    assert_eq!(result, ActionResult::Collected(42.5));
    assert_eq!(treasury(&world), 5042.5);
    let s = world.get::<Structure>(house).unwrap();
    assert_eq!(s.accrual.income, 0.0);
    assert_eq!(s.accrual.last_accrual, 600.0);

    // Nothing left: refused, treasury unchanged.
    let again = apply_action(&mut world, &TownAction::CollectIncome { structure: house });
    assert_eq!(again, ActionResult::Error(ActionError::NothingToDo));
    assert_eq!(treasury(&world), 5042.5);
}

#[test]
fn test_missing_structure_is_not_found() {
    let mut world = action_world();
    let gone = spawn(&mut world, StructureKind::House);
    world.despawn(gone);
    for action in [
        TownAction::CollectIncome { structure: gone },
        TownAction::RestockShop { shop: gone },
        TownAction::CleanRooms { hotel: gone },
        TownAction::HireWaiter {
            restaurant: gone,
            shift: Shift::Day,
        },
    ] {
        assert_eq!(
            apply_action(&mut world, &action),
            ActionResult::Error(ActionError::NotFound)
        );
    }
}

#[test]
fn test_collect_rent_sums_units() {
    let mut world = action_world();
    let apartment = spawn(&mut world, StructureKind::Apartment);
    if let Payload::Apartment(a) = &mut world.get_mut::<Structure>(apartment).unwrap().payload {
        a.move_in(
            0,
            Tenant {
                name: "Iris Dahl".into(),
                job: "Nurse".into(),
                credit_score: 780,
                monthly_rent_offer: 8.0,
                employment_months: 30,
            },
            0.0,
        );
        a.units[0].accumulated_rent = 30.0;
        a.units[1].accumulated_rent = 12.0;
    }
    let result = apply_action(&mut world, &TownAction::CollectRent { apartment });
    assert_eq!(result, ActionResult::Collected(42.0));
    assert_eq!(treasury(&world), 5042.0);
    if let Payload::Apartment(a) = &world.get::<Structure>(apartment).unwrap().payload {
        assert_eq!(a.total_rent(), 0.0);
        assert!(a.units[0].is_occupied());
    }

    let house = spawn(&mut world, StructureKind::House);
    assert_eq!(
        apply_action(&mut world, &TownAction::CollectRent { apartment: house }),
        ActionResult::Error(ActionError::NotSupported)
    );
}

#[test]
fn test_collect_resources_fills_stockpile() {
    let mut world = action_world();
    let farm = spawn(&mut world, StructureKind::ResourceProducer(ResourceKind::Farm));
    world.get_mut::<Structure>(farm).unwrap().accrual.stored_resources = 25.0;
    let result = apply_action(&mut world, &TownAction::CollectResources { structure: farm });
    assert_eq!(result, ActionResult::Collected(25.0));
    assert_eq!(world.resource::<TownBudget>().stock_of(ResourceKind::Farm), 25.0);
    assert_eq!(treasury(&world), 5000.0);
}

#[test]
fn test_restock_charges_per_unit() {
    let mut world = action_world();
    let shop = spawn(&mut world, StructureKind::Shop(ShopKind::Grocery));
    if let Payload::Shop(s) = &mut world.get_mut::<Structure>(shop).unwrap().payload {
        s.stock = 40;
    }
    let result = apply_action(&mut world, &TownAction::RestockShop { shop });
    // 60 units at 4.0 each.
    assert_eq!(result, ActionResult::Spent(240.0));
    assert_eq!(treasury(&world), 4760.0);
    if let Payload::Shop(s) = &world.get::<Structure>(shop).unwrap().payload {
        assert_eq!(s.stock, 100);
    }
    assert_eq!(
        apply_action(&mut world, &TownAction::RestockShop { shop }),
        ActionResult::Error(ActionError::NothingToDo)
    );
}

#[test]
fn test_restock_refused_without_funds() {
    let mut world = action_world();
    world.resource_mut::<TownBudget>().treasury = 10.0;
    let shop = spawn(&mut world, StructureKind::Shop(ShopKind::Grocery));
    if let Payload::Shop(s) = &mut world.get_mut::<Structure>(shop).unwrap().payload {
        s.stock = 0;
    }
    assert_eq!(
        apply_action(&mut world, &TownAction::RestockShop { shop }),
        ActionResult::Error(ActionError::InsufficientFunds)
    );
    assert_eq!(treasury(&world), 10.0);
    if let Payload::Shop(s) = &world.get::<Structure>(shop).unwrap().payload {
        assert_eq!(s.stock, 0);
    }
}

#[test]
fn test_hiring_flips_flags_once() {
    let mut world = action_world();
    let shop = spawn(&mut world, StructureKind::Shop(ShopKind::Bakery));
    let hotel = spawn(&mut world, StructureKind::Hotel);
    let diner = spawn(&mut world, StructureKind::Restaurant(RestaurantKind::Diner));

    for action in [
        TownAction::HireShopEmployee { shop },
        TownAction::HireFrontDesk { hotel },
        TownAction::HireMaid { hotel },
        TownAction::HireWaiter {
            restaurant: diner,
            shift: Shift::Night,
        },
    ] {
        assert_eq!(apply_action(&mut world, &action), ActionResult::Success);
        assert_eq!(
            apply_action(&mut world, &action),
            ActionResult::Error(ActionError::AlreadyStaffed)
        );
    }
    // Hiring is free up front.
    assert_eq!(treasury(&world), 5000.0);

    match &world.get::<Structure>(diner).unwrap().payload {
        Payload::Restaurant(r) => {
            assert!(r.has_night_waiter);
            assert!(!r.has_day_waiter);
        }
        _ => unreachable!(),
    }
    assert_eq!(
        apply_action(&mut world, &TownAction::HireMaid { hotel: shop }),
        ActionResult::Error(ActionError::NotSupported)
    );
}

#[test]
fn test_clean_rooms_costs_per_dirty_room() {
    let mut world = action_world();
    let hotel = spawn(&mut world, StructureKind::Hotel);
    if let Payload::Hotel(h) = &mut world.get_mut::<Structure>(hotel).unwrap().payload {
        h.rooms[1].status = RoomStatus::Dirty;
        h.rooms[4].status = RoomStatus::Dirty;
    }
    let result = apply_action(&mut world, &TownAction::CleanRooms { hotel });
    assert_eq!(result, ActionResult::Spent(20.0));
    assert_eq!(treasury(&world), 4980.0);
    match &world.get::<Structure>(hotel).unwrap().payload {
        Payload::Hotel(h) => assert_eq!(h.dirty_rooms(), 0),
        _ => unreachable!(),
    }
}

#[test]
fn test_clock_actions() {
    let mut world = action_world();
    apply_action(
        &mut world,
        &TownAction::SetSpeed {
            speed: GameSpeed::Fastest,
        },
    );
    apply_action(&mut world, &TownAction::SetPaused { paused: true });
    let clock = world.resource::<SimClock>();
    assert_eq!(clock.speed, GameSpeed::Fastest);
    assert!(clock.paused);
}

#[test]
fn test_queued_actions_are_logged() {
    let mut world = action_world();
    let house = spawn(&mut world, StructureKind::House);
    {
        let mut queue = world.resource_mut::<ActionQueue>();
        queue.push(0, ActionSource::Player, TownAction::SetPaused { paused: true });
        queue.push(0, ActionSource::Player, TownAction::CollectIncome { structure: house });
    }
    let mut schedule = Schedule::default();
    schedule.add_systems(execute_queued_actions);
    schedule.run(&mut world);

    assert!(world.resource::<ActionQueue>().is_empty());
    let log = world.resource::<ActionResultLog>();
    assert_eq!(log.len(), 2);
    assert_eq!(log.last_n(2)[0].1, ActionResult::Success);
    assert_eq!(
        log.last().unwrap().1,
        ActionResult::Error(ActionError::NothingToDo)
    );
}

#[test]
fn test_action_result_serialization() {
    let res = ActionResult::Spent(12.5);
    let json = serde_json::to_string(&res).unwrap();
    let decoded: ActionResult = serde_json::from_str(&json).unwrap();
    assert_eq!(res, decoded);

    let res = ActionResult::Error(ActionError::InsufficientFunds);
    let json = serde_json::to_string(&res).unwrap();
    assert_eq!(serde_json::from_str::<ActionResult>(&json).unwrap(), res);
    assert_eq!(ActionError::InsufficientFunds.to_string(), "insufficient funds");
}
