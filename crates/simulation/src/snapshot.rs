//! Best-effort town snapshots.
//!
//! A [`TownSnapshot`] externalizes the clock, the budget, population
//! counters, tunables, districts, transit layout and every structure's
//! accumulators and lifecycle payload. Entity handles do not survive a snapshot: rooms booked
//! by tourists come back as walk-in occupied, occupied tables come back
//! Dirty, citizens are respawned as plain walkers and vacant apartment units
//! are put back on the market.
//!
//! On-disk layout (little-endian):
//!
//! ```text
//! [0..4]   magic "TOWN"
//! [4..8]   format version (u32)
//! [8..12]  xxHash32 of the payload
//! [12..]   payload: lz4 (size-prepended) of the bitcode-encoded snapshot
//! ```

use std::fmt;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use xxhash_rust::xxh32::xxh32;

use crate::bus_transit::TransitState;
use crate::citizen::Citizen;
use crate::config::WORLD_LENGTH;
use crate::districts::Districts;
use crate::economy::TownBudget;
use crate::game_actions::ActionQueue;
use crate::game_params::GameParams;
use crate::notifications::MilestoneTracker;
use crate::population::PopulationCounters;
use crate::scheduled_events::ScheduledEvents;
use crate::sim_rng::SimRng;
use crate::structures::{
    Accrual, ApartmentPayload, HotelPayload, Payload, RestaurantPayload, Room, RoomStatus,
    ShopPayload, Structure, StructureKind, Table, TableStatus,
};
use crate::time_of_day::SimClock;

pub const MAGIC: [u8; 4] = *b"TOWN";
pub const FORMAT_VERSION: u32 = 1;
const HEADER_SIZE: usize = 12;
const XXHASH_SEED: u32 = 0;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Encode, Decode)]
pub struct TownSnapshot {
    pub clock: SimClock,
    pub budget: TownBudget,
    pub counters: PopulationCounters,
    pub params: GameParams,
    pub milestones: MilestoneTracker,
    pub districts: Districts,
    pub structures: Vec<StructureRecord>,
    pub stops: Vec<f32>,
    pub buses: Vec<BusRecord>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct StructureRecord {
    pub kind: StructureKind,
    pub position: f32,
    pub district_bonus: f64,
    pub accrual: Accrual,
    pub payload: PayloadRecord,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum PayloadRecord {
    None,
    Apartment(ApartmentPayload),
    Hotel(HotelRecord),
    Shop(ShopPayload),
    Restaurant(RestaurantRecord),
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct HotelRecord {
    /// `(status, nights)` per room.
    pub rooms: Vec<(RoomStatus, u32)>,
    pub nightly_rate: f64,
    pub has_front_desk: bool,
    pub has_maid: bool,
    pub front_desk_wage: f64,
    pub maid_wage: f64,
    pub last_nightly_day: Option<u64>,
    pub last_front_desk_day: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct RestaurantRecord {
    pub tables: Vec<TableStatus>,
    pub meal_price: f64,
    pub has_day_waiter: bool,
    pub has_night_waiter: bool,
    pub day_waiter_wage: f64,
    pub night_waiter_wage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
pub struct BusRecord {
    pub position: f32,
    pub direction: f32,
    pub speed: f32,
    pub capacity: u32,
}

// ---------------------------------------------------------------------------
// Payload conversion
// ---------------------------------------------------------------------------

impl PayloadRecord {
    fn capture(payload: &Payload) -> Self {
        match payload {
            Payload::None => PayloadRecord::None,
            Payload::Apartment(apartment) => PayloadRecord::Apartment(apartment.clone()),
            Payload::Hotel(hotel) => PayloadRecord::Hotel(HotelRecord {
                rooms: hotel.rooms.iter().map(|r| (r.status, r.nights)).collect(),
                nightly_rate: hotel.nightly_rate,
                has_front_desk: hotel.has_front_desk,
                has_maid: hotel.has_maid,
                front_desk_wage: hotel.front_desk_wage,
                maid_wage: hotel.maid_wage,
                last_nightly_day: hotel.last_nightly_day,
                last_front_desk_day: hotel.last_front_desk_day,
            }),
            Payload::Shop(shop) => PayloadRecord::Shop(shop.clone()),
            Payload::Restaurant(restaurant) => PayloadRecord::Restaurant(RestaurantRecord {
                tables: restaurant.tables.iter().map(|t| t.status).collect(),
                meal_price: restaurant.meal_price,
                has_day_waiter: restaurant.has_day_waiter,
                has_night_waiter: restaurant.has_night_waiter,
                day_waiter_wage: restaurant.day_waiter_wage,
                night_waiter_wage: restaurant.night_waiter_wage,
            }),
        }
    }

    fn restore(&self) -> Payload {
        match self {
            PayloadRecord::None => Payload::None,
            PayloadRecord::Apartment(apartment) => {
                let mut apartment = apartment.clone();
                for unit in &mut apartment.units {
                    unit.listing_pending = false;
                }
                Payload::Apartment(apartment)
            }
            PayloadRecord::Hotel(hotel) => Payload::Hotel(HotelPayload {
                rooms: hotel
                    .rooms
                    .iter()
                    .map(|&(status, nights)| Room {
                        status,
                        guest: None,
                        nights,
                    })
                    .collect(),
                nightly_rate: hotel.nightly_rate,
                has_front_desk: hotel.has_front_desk,
                has_maid: hotel.has_maid,
                front_desk_wage: hotel.front_desk_wage,
                maid_wage: hotel.maid_wage,
                last_nightly_day: hotel.last_nightly_day,
                last_front_desk_day: hotel.last_front_desk_day,
            }),
            PayloadRecord::Shop(shop) => Payload::Shop(shop.clone()),
            PayloadRecord::Restaurant(restaurant) => Payload::Restaurant(RestaurantPayload {
                tables: restaurant
                    .tables
                    .iter()
                    .map(|&status| Table {
                        status: match status {
                            TableStatus::Occupied => TableStatus::Dirty,
                            other => other,
                        },
                        ..Table::available()
                    })
                    .collect(),
                meal_price: restaurant.meal_price,
                has_day_waiter: restaurant.has_day_waiter,
                has_night_waiter: restaurant.has_night_waiter,
                day_waiter_wage: restaurant.day_waiter_wage,
                night_waiter_wage: restaurant.night_waiter_wage,
                cleaning_since: None,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Capture / restore
// ---------------------------------------------------------------------------

impl TownSnapshot {
    pub fn capture(world: &mut World) -> Self {
        let mut query = world.query::<&Structure>();
        let structures = query
            .iter(world)
            .map(|s| StructureRecord {
                kind: s.kind,
                position: s.position,
                district_bonus: s.district_bonus,
                accrual: s.accrual.clone(),
                payload: PayloadRecord::capture(&s.payload),
            })
            .collect();

        let transit = world.resource::<TransitState>();
        let stops = transit.stops.iter().map(|s| s.position).collect();
        let buses = transit
            .buses
            .iter()
            .map(|b| BusRecord {
                position: b.position,
                direction: b.direction,
                speed: b.speed,
                capacity: b.capacity as u32,
            })
            .collect();

        Self {
            clock: world.resource::<SimClock>().clone(),
            budget: world.resource::<TownBudget>().clone(),
            counters: world.resource::<PopulationCounters>().clone(),
            params: world.resource::<GameParams>().clone(),
            milestones: world.resource::<MilestoneTracker>().clone(),
            districts: world.resource::<Districts>().clone(),
            structures,
            stops,
            buses,
        }
    }

    /// Replace the running town with this snapshot. Every current structure
    /// and citizen is despawned; `counters.residents` fresh walkers are
    /// spawned next to residential structures.
    pub fn restore(&self, world: &mut World) {
        let mut doomed = world.query_filtered::<Entity, Or<(With<Structure>, With<Citizen>)>>();
        let doomed: Vec<Entity> = doomed.iter(world).collect();
        for entity in doomed {
            world.despawn(entity);
        }

        world.insert_resource(self.clock.clone());
        world.insert_resource(self.budget.clone());
        world.insert_resource(self.params.clone());
        world.insert_resource(self.milestones.clone());
        world.insert_resource(self.districts.clone());
        world.insert_resource(PopulationCounters {
            tourists: 0,
            ..self.counters.clone()
        });
        world.resource_mut::<ScheduledEvents>().clear();
        if let Some(mut queue) = world.get_resource_mut::<ActionQueue>() {
            queue.drain();
        }

        let mut transit = TransitState::default();
        for &position in &self.stops {
            transit.add_stop(position);
        }
        for bus in &self.buses {
            transit.add_bus(bus.position, bus.direction, bus.speed, bus.capacity as usize);
        }
        world.insert_resource(transit);

        let now = self.clock.minutes;
        let mut homes = Vec::new();
        for record in &self.structures {
            let mut structure =
                Structure::new(record.kind, record.position, record.district_bonus, now);
            structure.accrual = record.accrual.clone();
            structure.payload = record.payload.restore();
            if record.kind.is_residential() {
                homes.push(record.position);
            }
            world.spawn(structure);
        }

        let residents = self.counters.residents;
        let params = self.params.citizen.clone();
        world.resource_scope(|world, mut rng: Mut<SimRng>| {
            for _ in 0..residents {
                let position = match rng.pick_index(homes.len()) {
                    Some(i) => homes[i],
                    None => rng.between_f32(0.0, WORLD_LENGTH),
                };
                world.spawn(Citizen::random(&mut rng, &params, position));
            }
        });
        info!(
            "Restored town at {}: {} structures, {} residents",
            self.clock.formatted(),
            self.structures.len(),
            residents
        );
    }

    // -----------------------------------------------------------------------
    // Bytes
    // -----------------------------------------------------------------------

    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = lz4_flex::compress_prepend_size(&bitcode::encode(self));
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&xxh32(&payload, XXHASH_SEED).to_le_bytes());
        out.extend_from_slice(&payload);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < HEADER_SIZE {
            return Err(SnapshotError::TooShort(bytes.len()));
        }
        if bytes[..4] != MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version > FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }
        let expected = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let payload = &bytes[HEADER_SIZE..];
        let actual = xxh32(payload, XXHASH_SEED);
        if actual != expected {
            return Err(SnapshotError::ChecksumMismatch { expected, actual });
        }
        let encoded = lz4_flex::decompress_size_prepended(payload)
            .map_err(|e| SnapshotError::Decompress(e.to_string()))?;
        bitcode::decode(&encoded).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    TooShort(usize),
    BadMagic,
    UnsupportedVersion(u32),
    ChecksumMismatch { expected: u32, actual: u32 },
    Decompress(String),
    Decode(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::TooShort(len) => {
                write!(f, "snapshot is {len} bytes, shorter than its header")
            }
            SnapshotError::BadMagic => f.write_str("not a town snapshot"),
            SnapshotError::UnsupportedVersion(v) => {
                write!(f, "snapshot format {v} is newer than {FORMAT_VERSION}")
            }
            SnapshotError::ChecksumMismatch { expected, actual } => write!(
                f,
                "snapshot checksum mismatch (expected {expected:#010X}, got {actual:#010X})"
            ),
            SnapshotError::Decompress(e) => write!(f, "snapshot decompression failed: {e}"),
            SnapshotError::Decode(e) => write!(f, "snapshot decode failed: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{RestaurantKind, ShopKind};

    fn snapshot_world() -> World {
        let mut world = World::new();
        world.insert_resource(SimClock::at_hour(1, 9.0));
        world.init_resource::<TownBudget>();
        world.init_resource::<PopulationCounters>();
        world.init_resource::<GameParams>();
        world.init_resource::<MilestoneTracker>();
        world.init_resource::<Districts>();
        world.init_resource::<ScheduledEvents>();
        world.init_resource::<TransitState>();
        world.insert_resource(SimRng::from_seed_u64(3));
        world
    }

    #[test]
    fn test_bytes_round_trip_and_corruption() {
        let mut world = snapshot_world();
        world.spawn(Structure::new(
            StructureKind::Shop(ShopKind::Bookstore),
            50.0,
            1.2,
            0.0,
        ));
        let snapshot = TownSnapshot::capture(&mut world);
        let bytes = snapshot.to_bytes();
        assert_eq!(&bytes[..4], b"TOWN");

        let decoded = TownSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.structures, snapshot.structures);
        assert_eq!(decoded.clock.minutes, snapshot.clock.minutes);

        let mut corrupt = bytes.clone();
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0xFF;
        assert!(matches!(
            TownSnapshot::from_bytes(&corrupt),
            Err(SnapshotError::ChecksumMismatch { .. })
        ));
        assert!(matches!(
            TownSnapshot::from_bytes(b"TO"),
            Err(SnapshotError::TooShort(2))
        ));
        assert!(matches!(
            TownSnapshot::from_bytes(b"CITY\x01\0\0\0\0\0\0\0"),
            Err(SnapshotError::BadMagic)
        ));
    }

    #[test]
    fn test_booked_rooms_restore_as_walk_ins() {
        let mut world = snapshot_world();
        let guest = world.spawn_empty().id();
        let mut hotel = Structure::new(StructureKind::Hotel, 10.0, 1.0, 0.0);
        if let Payload::Hotel(h) = &mut hotel.payload {
            h.book(guest);
            h.rooms[0].nights = 2;
            h.rooms[1].status = RoomStatus::Dirty;
        }
        world.spawn(hotel);

        let snapshot = TownSnapshot::capture(&mut world);
        snapshot.restore(&mut world);

        let mut query = world.query::<&Structure>();
        let restored = query.single(&world);
        let Payload::Hotel(h) = &restored.payload else {
            panic!("expected hotel payload");
        };
        assert_eq!(h.rooms[0].status, RoomStatus::Occupied);
        assert_eq!(h.rooms[0].guest, None);
        assert_eq!(h.rooms[0].nights, 2);
        assert_eq!(h.rooms[1].status, RoomStatus::Dirty);
    }

    #[test]
    fn test_occupied_tables_restore_dirty() {
        let mut world = snapshot_world();
        let mut bistro = Structure::new(
            StructureKind::Restaurant(RestaurantKind::Bistro),
            10.0,
            1.0,
            0.0,
        );
        if let Payload::Restaurant(r) = &mut bistro.payload {
            r.claim_table(Entity::from_raw(77), 900.0);
        }
        world.spawn(bistro);

        let snapshot = TownSnapshot::capture(&mut world);
        snapshot.restore(&mut world);

        let mut query = world.query::<&Structure>();
        let Payload::Restaurant(r) = &query.single(&world).payload else {
            panic!("expected restaurant payload");
        };
        assert_eq!(r.tables[0].status, TableStatus::Dirty);
        assert_eq!(r.tables[0].occupant, None);
        assert_eq!(r.tables[1].status, TableStatus::Available);
    }

    #[test]
    fn test_restore_replaces_citizens_and_relists_units() {
        let mut world = snapshot_world();
        let mut apartment = Structure::new(StructureKind::Apartment, 200.0, 1.0, 0.0);
        if let Payload::Apartment(a) = &mut apartment.payload {
            a.units[2].listing_pending = true;
        }
        world.spawn(apartment);
        world.spawn(Structure::new(StructureKind::House, 400.0, 1.0, 0.0));
        world.resource_mut::<PopulationCounters>().residents = 3;
        world.resource_mut::<TransitState>().add_stop(120.0);
        let snapshot = TownSnapshot::capture(&mut world);

        // Diverge, then restore.
        for _ in 0..5 {
            world.spawn(Citizen::new(10.0, 20.0, 1.0));
        }
        world.spawn(Structure::new(StructureKind::Hotel, 900.0, 1.0, 0.0));
        world.resource_mut::<TownBudget>().treasury = 1.0;
        snapshot.restore(&mut world);

        let citizens = world.query::<&Citizen>().iter(&world).count();
        assert_eq!(citizens, 3);
        let structures = world.query::<&Structure>().iter(&world).count();
        assert_eq!(structures, 2);
        assert_eq!(world.resource::<TownBudget>().treasury, 5000.0);
        assert_eq!(world.resource::<TransitState>().stops.len(), 1);

        let mut query = world.query::<&Structure>();
        for s in query.iter(&world) {
            if let Payload::Apartment(a) = &s.payload {
                assert!(a.units.iter().all(|u| !u.listing_pending));
            }
        }
        for c in world.query::<&Citizen>().iter(&world) {
            assert!(c.position == 200.0 || c.position == 400.0);
        }
    }
}
