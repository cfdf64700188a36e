//! Type-specific sub-state carried by a structure.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::kinds::{
    RestaurantKind, ShopKind, StructureKind, APARTMENT_PROFILE, HOTEL_PROFILE,
};

// =============================================================================
// Apartment
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Tenant {
    pub name: String,
    pub job: String,
    /// 300..=850
    pub credit_score: u32,
    pub monthly_rent_offer: f64,
    pub employment_months: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Unit {
    pub tenant: Option<Tenant>,
    pub accumulated_rent: f64,
    pub last_accrual: f64,
    pub last_risk_check: f64,
    /// A tenant arrival is already scheduled for this unit.
    pub listing_pending: bool,
}

impl Unit {
    pub fn is_occupied(&self) -> bool {
        self.tenant.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ApartmentPayload {
    pub units: Vec<Unit>,
    pub base_rent: f64,
    pub max_income_per_unit: f64,
}

impl ApartmentPayload {
    pub fn new(now: f64) -> Self {
        Self {
            units: (0..APARTMENT_PROFILE.units)
                .map(|_| Unit {
                    last_accrual: now,
                    last_risk_check: now,
                    ..Default::default()
                })
                .collect(),
            base_rent: APARTMENT_PROFILE.base_rent,
            max_income_per_unit: APARTMENT_PROFILE.max_income_per_unit,
        }
    }

    pub fn occupied_units(&self) -> usize {
        self.units.iter().filter(|u| u.is_occupied()).count()
    }

    pub fn total_rent(&self) -> f64 {
        self.units.iter().map(|u| u.accumulated_rent).sum()
    }

    /// Place `tenant` in `unit`, restarting its accrual and risk clocks.
    pub fn move_in(&mut self, unit: usize, tenant: Tenant, now: f64) -> bool {
        let Some(slot) = self.units.get_mut(unit) else {
            return false;
        };
        if slot.is_occupied() {
            return false;
        }
        slot.tenant = Some(tenant);
        slot.accumulated_rent = 0.0;
        slot.last_accrual = now;
        slot.last_risk_check = now;
        slot.listing_pending = false;
        true
    }

    /// Clear the unit. Uncollected rent is forfeited.
    pub fn vacate(&mut self, unit: usize) -> Option<Tenant> {
        let slot = self.units.get_mut(unit)?;
        slot.accumulated_rent = 0.0;
        slot.tenant.take()
    }
}

// =============================================================================
// Hotel
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum RoomStatus {
    Clean,
    Occupied,
    Dirty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub status: RoomStatus,
    /// Tourist holding a booking. `None` on an occupied room is a walk-in.
    pub guest: Option<Entity>,
    pub nights: u32,
}

impl Room {
    pub fn clean() -> Self {
        Self {
            status: RoomStatus::Clean,
            guest: None,
            nights: 0,
        }
    }

    pub fn is_vacant_and_clean(&self) -> bool {
        self.status == RoomStatus::Clean && self.guest.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotelPayload {
    pub rooms: Vec<Room>,
    pub nightly_rate: f64,
    pub has_front_desk: bool,
    pub has_maid: bool,
    pub front_desk_wage: f64,
    pub maid_wage: f64,
    pub last_nightly_day: Option<u64>,
    pub last_front_desk_day: Option<u64>,
}

impl Default for HotelPayload {
    fn default() -> Self {
        Self {
            rooms: vec![Room::clean(); HOTEL_PROFILE.rooms],
            nightly_rate: HOTEL_PROFILE.nightly_rate,
            has_front_desk: false,
            has_maid: false,
            front_desk_wage: HOTEL_PROFILE.front_desk_wage,
            maid_wage: HOTEL_PROFILE.maid_wage,
            last_nightly_day: None,
            last_front_desk_day: None,
        }
    }
}

impl HotelPayload {
    /// Occupied → Dirty, or straight to Clean when a maid is staffed.
    pub fn vacate_room(&mut self, room: usize) {
        let has_maid = self.has_maid;
        let Some(room) = self.rooms.get_mut(room) else {
            return;
        };
        if room.status != RoomStatus::Occupied {
            return;
        }
        room.guest = None;
        room.nights = 0;
        room.status = if has_maid {
            RoomStatus::Clean
        } else {
            RoomStatus::Dirty
        };
    }

    /// Book the first clean vacant room for `guest`.
    pub fn book(&mut self, guest: Entity) -> Option<usize> {
        let index = self.rooms.iter().position(Room::is_vacant_and_clean)?;
        let room = &mut self.rooms[index];
        room.status = RoomStatus::Occupied;
        room.guest = Some(guest);
        room.nights = 0;
        Some(index)
    }

    pub fn dirty_rooms(&self) -> usize {
        self.rooms
            .iter()
            .filter(|r| r.status == RoomStatus::Dirty)
            .count()
    }

    pub fn occupied_rooms(&self) -> usize {
        self.rooms
            .iter()
            .filter(|r| r.status == RoomStatus::Occupied)
            .count()
    }

    pub fn daily_wages(&self) -> f64 {
        let mut wages = 0.0;
        if self.has_front_desk {
            wages += self.front_desk_wage;
        }
        if self.has_maid {
            wages += self.maid_wage;
        }
        wages
    }
}

// =============================================================================
// Shop
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ShopPayload {
    pub stock: u32,
    pub max_stock: u32,
    pub unit_restock_cost: f64,
    pub units_per_visit: u32,
    pub is_open: bool,
    pub has_employee: bool,
    pub daily_wage: f64,
}

impl ShopPayload {
    pub fn new(kind: ShopKind) -> Self {
        let profile = kind.profile();
        Self {
            stock: profile.max_stock,
            max_stock: profile.max_stock,
            unit_restock_cost: profile.unit_restock_cost,
            units_per_visit: profile.units_per_visit,
            is_open: false,
            has_employee: false,
            daily_wage: profile.daily_wage,
        }
    }
}

// =============================================================================
// Restaurant
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum TableStatus {
    Available,
    Occupied,
    Dirty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub status: TableStatus,
    pub occupant: Option<Entity>,
    /// Simulated minute the current meal ends.
    pub meal_ends: f64,
}

impl Table {
    pub fn available() -> Self {
        Self {
            status: TableStatus::Available,
            occupant: None,
            meal_ends: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantPayload {
    pub tables: Vec<Table>,
    pub meal_price: f64,
    pub has_day_waiter: bool,
    pub has_night_waiter: bool,
    pub day_waiter_wage: f64,
    pub night_waiter_wage: f64,
    /// Start of the current cleaning interval, while dirty tables wait.
    pub cleaning_since: Option<f64>,
}

/// Waiter shift. The day shift covers hours [6, 20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    Day,
    Night,
}

impl Shift {
    pub fn for_hour(hour: u32) -> Self {
        if (6..20).contains(&hour) {
            Shift::Day
        } else {
            Shift::Night
        }
    }
}

impl RestaurantPayload {
    pub fn new(kind: RestaurantKind) -> Self {
        let profile = kind.profile();
        Self {
            tables: vec![Table::available(); profile.tables],
            meal_price: profile.meal_price,
            has_day_waiter: false,
            has_night_waiter: false,
            day_waiter_wage: profile.day_waiter_wage,
            night_waiter_wage: profile.night_waiter_wage,
            cleaning_since: None,
        }
    }

    pub fn has_waiter(&self, shift: Shift) -> bool {
        match shift {
            Shift::Day => self.has_day_waiter,
            Shift::Night => self.has_night_waiter,
        }
    }

    pub fn waiter_on_duty(&self, hour: u32) -> bool {
        self.has_waiter(Shift::for_hour(hour))
    }

    pub fn has_available_table(&self) -> bool {
        self.tables
            .iter()
            .any(|t| t.status == TableStatus::Available)
    }

    /// Seat `diner` at the first available table until `meal_ends`.
    pub fn claim_table(&mut self, diner: Entity, meal_ends: f64) -> Option<usize> {
        let index = self
            .tables
            .iter()
            .position(|t| t.status == TableStatus::Available)?;
        let table = &mut self.tables[index];
        table.status = TableStatus::Occupied;
        table.occupant = Some(diner);
        table.meal_ends = meal_ends;
        Some(index)
    }

    /// Occupied → Dirty. Other states are left alone.
    pub fn release_table(&mut self, index: usize) {
        if let Some(table) = self.tables.get_mut(index) {
            if table.status == TableStatus::Occupied {
                table.status = TableStatus::Dirty;
                table.occupant = None;
            }
        }
    }

    pub fn daily_wages(&self) -> f64 {
        let mut wages = 0.0;
        if self.has_day_waiter {
            wages += self.day_waiter_wage;
        }
        if self.has_night_waiter {
            wages += self.night_waiter_wage;
        }
        wages
    }
}

// =============================================================================
// Payload
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Apartment(ApartmentPayload),
    Hotel(HotelPayload),
    Shop(ShopPayload),
    Restaurant(RestaurantPayload),
}

impl Payload {
    /// Fresh lifecycle state for a newly placed structure of `kind`.
    pub fn for_kind(kind: StructureKind, now: f64) -> Self {
        match kind {
            StructureKind::Apartment => Payload::Apartment(ApartmentPayload::new(now)),
            StructureKind::Hotel => Payload::Hotel(HotelPayload::default()),
            StructureKind::Shop(shop) => Payload::Shop(ShopPayload::new(shop)),
            StructureKind::Restaurant(restaurant) => {
                Payload::Restaurant(RestaurantPayload::new(restaurant))
            }
            _ => Payload::None,
        }
    }

    pub fn matches(&self, kind: StructureKind) -> bool {
        matches!(
            (kind, self),
            (StructureKind::Apartment, Payload::Apartment(_))
                | (StructureKind::Hotel, Payload::Hotel(_))
                | (StructureKind::Shop(_), Payload::Shop(_))
                | (StructureKind::Restaurant(_), Payload::Restaurant(_))
                | (StructureKind::House, Payload::None)
                | (StructureKind::Entertainment(_), Payload::None)
                | (StructureKind::Service(_), Payload::None)
                | (StructureKind::ResourceProducer(_), Payload::None)
                | (StructureKind::BoostEmitter(_), Payload::None)
                | (StructureKind::PlainIncome(_), Payload::None)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::kinds::ShopKind;

    fn entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    #[test]
    fn test_payload_for_kind_matches() {
        for kind in [
            StructureKind::House,
            StructureKind::Apartment,
            StructureKind::Hotel,
            StructureKind::Shop(ShopKind::Grocery),
            StructureKind::Restaurant(RestaurantKind::Cafe),
        ] {
            assert!(Payload::for_kind(kind, 0.0).matches(kind), "{kind:?}");
        }
        assert!(!Payload::None.matches(StructureKind::Hotel));
        assert!(!Payload::Hotel(HotelPayload::default()).matches(StructureKind::House));
    }

    #[test]
    fn test_new_structures_start_in_default_lifecycle_state() {
        let Payload::Apartment(apartment) = Payload::for_kind(StructureKind::Apartment, 5.0)
        else {
            panic!("expected apartment payload");
        };
        assert!(apartment.units.iter().all(|u| !u.is_occupied()));

        let hotel = HotelPayload::default();
        assert!(hotel.rooms.iter().all(|r| r.status == RoomStatus::Clean));

        let restaurant = RestaurantPayload::new(RestaurantKind::Diner);
        assert!(restaurant
            .tables
            .iter()
            .all(|t| t.status == TableStatus::Available));

        let shop = ShopPayload::new(ShopKind::Grocery);
        assert_eq!(shop.stock, shop.max_stock);
    }

    #[test]
    fn test_vacate_room_respects_maid() {
        let mut hotel = HotelPayload::default();
        let room = hotel.book(entity(1)).unwrap();
        hotel.vacate_room(room);
        assert_eq!(hotel.rooms[room].status, RoomStatus::Dirty);

        hotel.has_maid = true;
        let room = hotel.book(entity(2)).unwrap();
        hotel.vacate_room(room);
        assert_eq!(hotel.rooms[room].status, RoomStatus::Clean);
        assert!(hotel.rooms[room].guest.is_none());
    }

    #[test]
    fn test_booking_skips_dirty_rooms() {
        let mut hotel = HotelPayload::default();
        hotel.rooms[0].status = RoomStatus::Dirty;
        assert_eq!(hotel.book(entity(3)), Some(1));
        for room in &mut hotel.rooms {
            room.status = RoomStatus::Dirty;
        }
        assert_eq!(hotel.book(entity(4)), None);
    }

    #[test]
    fn test_claim_and_release_table() {
        let mut restaurant = RestaurantPayload::new(RestaurantKind::Cafe);
        let index = restaurant.claim_table(entity(5), 30.0).unwrap();
        assert_eq!(restaurant.tables[index].status, TableStatus::Occupied);
        restaurant.release_table(index);
        assert_eq!(restaurant.tables[index].status, TableStatus::Dirty);
        assert!(restaurant.tables[index].occupant.is_none());
        // Releasing again is a no-op.
        restaurant.release_table(index);
        assert_eq!(restaurant.tables[index].status, TableStatus::Dirty);
    }

    #[test]
    fn test_waiter_shifts() {
        let mut restaurant = RestaurantPayload::new(RestaurantKind::Bistro);
        restaurant.has_day_waiter = true;
        assert!(restaurant.waiter_on_duty(6));
        assert!(restaurant.waiter_on_duty(19));
        assert!(!restaurant.waiter_on_duty(20));
        assert!(!restaurant.waiter_on_duty(5));
    }

    #[test]
    fn test_move_in_and_vacate() {
        let mut apartment = ApartmentPayload::new(0.0);
        let tenant = Tenant {
            name: "Ada".into(),
            job: "Baker".into(),
            credit_score: 700,
            monthly_rent_offer: 8.0,
            employment_months: 12,
        };
        assert!(apartment.move_in(0, tenant.clone(), 10.0));
        assert!(!apartment.move_in(0, tenant, 11.0));
        apartment.units[0].accumulated_rent = 42.0;
        let gone = apartment.vacate(0).unwrap();
        assert_eq!(gone.name, "Ada");
        assert_eq!(apartment.units[0].accumulated_rent, 0.0);
        assert_eq!(apartment.occupied_units(), 0);
    }
}
