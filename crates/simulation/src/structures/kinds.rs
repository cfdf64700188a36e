//! Closed catalogue of structure kinds and their static properties.
//!
//! Everything a sweep needs to know about a kind (its category, base rates,
//! prices, proximity boost) is a `match` here, so adding a kind is a compile
//! error everywhere it is not handled.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

// =============================================================================
// Categories
// =============================================================================

/// Broad grouping used by districts, proximity boosts and customer draws.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub enum Category {
    Residential,
    Commercial,
    Dining,
    Entertainment,
    Service,
    Lodging,
    Industry,
    Recreation,
    Civic,
}

// =============================================================================
// Sub-kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum ShopKind {
    Grocery,
    Bakery,
    Boutique,
    Bookstore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum RestaurantKind {
    Cafe,
    Diner,
    Bistro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum EntertainmentKind {
    Arcade,
    Cinema,
    BowlingAlley,
    ThemePark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum ServiceKind {
    Library,
    Museum,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub enum ResourceKind {
    Farm,
    Quarry,
    LumberMill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum BoostKind {
    Park,
    Fountain,
    Playground,
    Garden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum IncomeKind {
    Office,
    Workshop,
    TownHall,
}

// =============================================================================
// StructureKind
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum StructureKind {
    House,
    Apartment,
    Hotel,
    Shop(ShopKind),
    Restaurant(RestaurantKind),
    Entertainment(EntertainmentKind),
    Service(ServiceKind),
    ResourceProducer(ResourceKind),
    BoostEmitter(BoostKind),
    PlainIncome(IncomeKind),
}

/// Time-proportional income: `per_minute` up to `ceiling` (both before bonus).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeRate {
    pub per_minute: f64,
    pub ceiling: f64,
}

/// Time-proportional resource regeneration up to `max_storage`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceRate {
    pub per_minute: f64,
    pub max_storage: f64,
}

/// Which structures an emitter's boost reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostTarget {
    Any,
    Only(Category),
}

/// Additive proximity boost emitted by recreation structures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boost {
    pub radius: f32,
    /// Fraction added to the bonus sum, e.g. `0.10` for +10%.
    pub percent: f64,
    pub applies_to: BoostTarget,
}

impl Boost {
    pub fn reaches(&self, category: Category) -> bool {
        match self.applies_to {
            BoostTarget::Any => true,
            BoostTarget::Only(c) => c == category,
        }
    }
}

impl StructureKind {
    pub fn category(self) -> Category {
        match self {
            StructureKind::House | StructureKind::Apartment => Category::Residential,
            StructureKind::Hotel => Category::Lodging,
            StructureKind::Shop(_) => Category::Commercial,
            StructureKind::Restaurant(_) => Category::Dining,
            StructureKind::Entertainment(_) => Category::Entertainment,
            StructureKind::Service(_) => Category::Service,
            StructureKind::ResourceProducer(_) => Category::Industry,
            StructureKind::BoostEmitter(_) => Category::Recreation,
            StructureKind::PlainIncome(kind) => match kind {
                IncomeKind::Office => Category::Commercial,
                IncomeKind::Workshop => Category::Industry,
                IncomeKind::TownHall => Category::Civic,
            },
        }
    }

    /// Base income accrual. Structures paid by customers, guests or tenants
    /// have none; their money arrives through settlement.
    pub fn income_rate(self) -> Option<IncomeRate> {
        let (per_minute, ceiling) = match self {
            StructureKind::House => (0.5, 60.0),
            StructureKind::PlainIncome(IncomeKind::Office) => (2.0, 240.0),
            StructureKind::PlainIncome(IncomeKind::Workshop) => (1.2, 150.0),
            StructureKind::PlainIncome(IncomeKind::TownHall) => (1.0, 500.0),
            _ => return None,
        };
        Some(IncomeRate {
            per_minute,
            ceiling,
        })
    }

    pub fn resource_rate(self) -> Option<ResourceRate> {
        let (per_minute, max_storage) = match self {
            StructureKind::ResourceProducer(ResourceKind::Farm) => (0.4, 100.0),
            StructureKind::ResourceProducer(ResourceKind::Quarry) => (0.2, 80.0),
            StructureKind::ResourceProducer(ResourceKind::LumberMill) => (0.3, 120.0),
            _ => return None,
        };
        Some(ResourceRate {
            per_minute,
            max_storage,
        })
    }

    pub fn boost(self) -> Option<Boost> {
        let StructureKind::BoostEmitter(kind) = self else {
            return None;
        };
        Some(match kind {
            BoostKind::Park => Boost {
                radius: 150.0,
                percent: 0.10,
                applies_to: BoostTarget::Any,
            },
            BoostKind::Fountain => Boost {
                radius: 80.0,
                percent: 0.05,
                applies_to: BoostTarget::Any,
            },
            BoostKind::Playground => Boost {
                radius: 120.0,
                percent: 0.15,
                applies_to: BoostTarget::Only(Category::Residential),
            },
            BoostKind::Garden => Boost {
                radius: 100.0,
                percent: 0.08,
                applies_to: BoostTarget::Only(Category::Commercial),
            },
        })
    }

    /// Whether this structure raises tourist arrivals town-wide.
    pub fn boosts_tourism(self) -> bool {
        matches!(
            self,
            StructureKind::Entertainment(EntertainmentKind::ThemePark)
        )
    }

    /// Residents this structure houses (apartments are counted per tenant).
    pub fn is_residential(self) -> bool {
        self.category() == Category::Residential
    }

    pub fn label(self) -> &'static str {
        match self {
            StructureKind::House => "House",
            StructureKind::Apartment => "Apartment",
            StructureKind::Hotel => "Hotel",
            StructureKind::Shop(ShopKind::Grocery) => "Grocery",
            StructureKind::Shop(ShopKind::Bakery) => "Bakery",
            StructureKind::Shop(ShopKind::Boutique) => "Boutique",
            StructureKind::Shop(ShopKind::Bookstore) => "Bookstore",
            StructureKind::Restaurant(RestaurantKind::Cafe) => "Cafe",
            StructureKind::Restaurant(RestaurantKind::Diner) => "Diner",
            StructureKind::Restaurant(RestaurantKind::Bistro) => "Bistro",
            StructureKind::Entertainment(EntertainmentKind::Arcade) => "Arcade",
            StructureKind::Entertainment(EntertainmentKind::Cinema) => "Cinema",
            StructureKind::Entertainment(EntertainmentKind::BowlingAlley) => "Bowling Alley",
            StructureKind::Entertainment(EntertainmentKind::ThemePark) => "Theme Park",
            StructureKind::Service(ServiceKind::Library) => "Library",
            StructureKind::Service(ServiceKind::Museum) => "Museum",
            StructureKind::ResourceProducer(ResourceKind::Farm) => "Farm",
            StructureKind::ResourceProducer(ResourceKind::Quarry) => "Quarry",
            StructureKind::ResourceProducer(ResourceKind::LumberMill) => "Lumber Mill",
            StructureKind::BoostEmitter(BoostKind::Park) => "Park",
            StructureKind::BoostEmitter(BoostKind::Fountain) => "Fountain",
            StructureKind::BoostEmitter(BoostKind::Playground) => "Playground",
            StructureKind::BoostEmitter(BoostKind::Garden) => "Garden",
            StructureKind::PlainIncome(IncomeKind::Office) => "Office",
            StructureKind::PlainIncome(IncomeKind::Workshop) => "Workshop",
            StructureKind::PlainIncome(IncomeKind::TownHall) => "Town Hall",
        }
    }
}

// =============================================================================
// Per-kind economics
// =============================================================================

/// Income credited per unit sold on a completed shopping visit.
pub const PRICE_PER_UNIT_SOLD: f64 = 15.0;

pub struct ShopProfile {
    pub max_stock: u32,
    pub unit_restock_cost: f64,
    pub units_per_visit: u32,
    pub daily_wage: f64,
}

impl ShopKind {
    pub fn profile(self) -> ShopProfile {
        let (max_stock, unit_restock_cost, units_per_visit, daily_wage) = match self {
            ShopKind::Grocery => (100, 4.0, 5, 40.0),
            ShopKind::Bakery => (60, 3.0, 3, 35.0),
            ShopKind::Boutique => (40, 12.0, 2, 55.0),
            ShopKind::Bookstore => (50, 8.0, 2, 45.0),
        };
        ShopProfile {
            max_stock,
            unit_restock_cost,
            units_per_visit,
            daily_wage,
        }
    }
}

pub struct RestaurantProfile {
    pub tables: usize,
    pub meal_price: f64,
    pub day_waiter_wage: f64,
    pub night_waiter_wage: f64,
}

impl RestaurantKind {
    pub fn profile(self) -> RestaurantProfile {
        let (tables, meal_price, day_waiter_wage, night_waiter_wage) = match self {
            RestaurantKind::Cafe => (4, 12.0, 30.0, 40.0),
            RestaurantKind::Diner => (6, 18.0, 35.0, 45.0),
            RestaurantKind::Bistro => (5, 32.0, 45.0, 55.0),
        };
        RestaurantProfile {
            tables,
            meal_price,
            day_waiter_wage,
            night_waiter_wage,
        }
    }
}

/// Chance a cinema visit adds a concession purchase.
pub const CONCESSION_CHANCE: f64 = 0.4;
pub const CONCESSION_PRICE: f64 = 6.0;

impl EntertainmentKind {
    pub fn ticket_price(self) -> f64 {
        match self {
            EntertainmentKind::Arcade => 8.0,
            EntertainmentKind::Cinema => 12.0,
            EntertainmentKind::BowlingAlley => 10.0,
            EntertainmentKind::ThemePark => 35.0,
        }
    }

    pub fn has_concession(self) -> bool {
        matches!(self, EntertainmentKind::Cinema)
    }
}

pub const LIBRARY_LATE_FEE_CHANCE: f64 = 0.1;
pub const LIBRARY_LATE_FEE: (f64, f64) = (1.0, 5.0);
pub const MUSEUM_ADMISSION: f64 = 15.0;
pub const MUSEUM_GIFT_SHOP_CHANCE: f64 = 0.3;
pub const MUSEUM_GIFT_SHOP_PRICE: f64 = 10.0;
pub const MUSEUM_CAFE_CHANCE: f64 = 0.25;
pub const MUSEUM_CAFE_PRICE: f64 = 7.0;

pub struct ApartmentProfile {
    pub units: usize,
    /// Base monthly rent; offers are a random fraction of this.
    pub base_rent: f64,
    pub max_income_per_unit: f64,
}

pub const APARTMENT_PROFILE: ApartmentProfile = ApartmentProfile {
    units: 4,
    base_rent: 8.0,
    max_income_per_unit: 400.0,
};

pub struct HotelProfile {
    pub rooms: usize,
    pub nightly_rate: f64,
    pub front_desk_wage: f64,
    pub maid_wage: f64,
}

pub const HOTEL_PROFILE: HotelProfile = HotelProfile {
    rooms: 6,
    nightly_rate: 60.0,
    front_desk_wage: 50.0,
    maid_wage: 35.0,
};
