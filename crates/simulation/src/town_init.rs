// =============================================================================
// Starter town: districts, one street of structures, bus stops, two buses
// and a handful of residents.
// =============================================================================

use bevy::prelude::*;

use crate::bus_transit::TransitState;
use crate::citizen::Citizen;
use crate::config::{EXIT_OFFSET, WORLD_LENGTH};
use crate::districts::Districts;
use crate::game_actions::{apply_action, TownAction};
use crate::game_params::GameParams;
use crate::sim_rng::SimRng;
use crate::structures::{
    place_structure, BoostKind, Category, EntertainmentKind, IncomeKind, ResourceKind,
    RestaurantKind, ServiceKind, Shift, ShopKind, StructureKind,
};

/// Marker resource that, when present, causes `init_town` to skip the
/// starter layout. Used by the test harness to start from an empty road.
#[derive(Resource)]
pub struct SkipTownInit;

const STARTER_DISTRICTS: [(&str, f32, f32, Category); 4] = [
    ("Old Town", 0.0, 600.0, Category::Residential),
    ("Market Street", 600.0, 1200.0, Category::Commercial),
    ("Riverside", 1200.0, 1800.0, Category::Dining),
    ("Fairground", 1800.0, 2400.0, Category::Entertainment),
];

const STARTER_STRUCTURES: [(StructureKind, f32); 22] = [
    (StructureKind::House, 80.0),
    (StructureKind::House, 200.0),
    (StructureKind::House, 320.0),
    (StructureKind::BoostEmitter(BoostKind::Playground), 380.0),
    (StructureKind::House, 440.0),
    (StructureKind::Service(ServiceKind::Library), 500.0),
    (StructureKind::Apartment, 560.0),
    (StructureKind::Shop(ShopKind::Grocery), 660.0),
    (StructureKind::PlainIncome(IncomeKind::TownHall), 740.0),
    (StructureKind::Shop(ShopKind::Bakery), 840.0),
    (StructureKind::Shop(ShopKind::Boutique), 940.0),
    (StructureKind::Restaurant(RestaurantKind::Cafe), 1020.0),
    (StructureKind::Hotel, 1100.0),
    (StructureKind::PlainIncome(IncomeKind::Office), 1160.0),
    (StructureKind::Restaurant(RestaurantKind::Diner), 1260.0),
    (StructureKind::BoostEmitter(BoostKind::Park), 1340.0),
    (StructureKind::Restaurant(RestaurantKind::Bistro), 1420.0),
    (StructureKind::Service(ServiceKind::Museum), 1600.0),
    (StructureKind::Entertainment(EntertainmentKind::Cinema), 1860.0),
    (StructureKind::Entertainment(EntertainmentKind::Arcade), 1960.0),
    (StructureKind::Entertainment(EntertainmentKind::ThemePark), 2200.0),
    (StructureKind::ResourceProducer(ResourceKind::Farm), 2340.0),
];

const STARTER_STOPS: [f32; 4] = [150.0, 800.0, 1500.0, 2100.0];

const STARTER_RESIDENTS: u32 = 6;

pub fn init_town(world: &mut World) {
    if world.contains_resource::<SkipTownInit>() {
        return;
    }

    {
        let mut districts = world.resource_mut::<Districts>();
        for (name, start, end, favours) in STARTER_DISTRICTS {
            districts.designate(name, start, end, favours);
        }
    }

    let mut homes = Vec::new();
    let mut staff = Vec::new();
    for (kind, position) in STARTER_STRUCTURES {
        let entity = place_structure(world, kind, position);
        match kind {
            StructureKind::House | StructureKind::Apartment => homes.push(position),
            StructureKind::Shop(ShopKind::Grocery | ShopKind::Bakery) => {
                staff.push(TownAction::HireShopEmployee { shop: entity });
            }
            StructureKind::Restaurant(RestaurantKind::Cafe | RestaurantKind::Diner) => {
                staff.push(TownAction::HireWaiter {
                    restaurant: entity,
                    shift: Shift::Day,
                });
            }
            StructureKind::Hotel => staff.push(TownAction::HireFrontDesk { hotel: entity }),
            _ => {}
        }
    }
    for action in &staff {
        apply_action(world, action);
    }

    let params = world.resource::<GameParams>().clone();
    {
        let mut transit = world.resource_mut::<TransitState>();
        for position in STARTER_STOPS {
            transit.add_stop(position);
        }
        let (speed, capacity) = (params.transit.bus_speed, params.transit.bus_capacity);
        transit.add_bus(0.0, 1.0, speed, capacity);
        transit.add_bus(WORLD_LENGTH, -1.0, speed, capacity);
    }

    world.resource_scope(|world, mut rng: Mut<SimRng>| {
        for i in 0..STARTER_RESIDENTS {
            let home = homes[i as usize % homes.len()];
            let position = (home + EXIT_OFFSET * rng.direction()).clamp(0.0, WORLD_LENGTH);
            world.spawn(Citizen::random(&mut rng, &params.citizen, position));
        }
    });

    info!(
        "Starter town: {} structures, {} stops, {} residents",
        STARTER_STRUCTURES.len(),
        STARTER_STOPS.len(),
        STARTER_RESIDENTS
    );
}
