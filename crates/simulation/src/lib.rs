use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod accrual;
pub mod bus_transit;
pub mod citizen;
pub mod config;
pub mod districts;
pub mod economy;
pub mod game_actions;
pub mod game_params;
pub mod notifications;
pub mod occupancy;
pub mod population;
pub mod report;
pub mod scheduled_events;
pub mod sim_rng;
pub mod simulation_sets;
pub mod snapshot;
pub mod structures;
pub mod time_of_day;
pub mod tourism;
pub mod town_init;

pub use simulation_sets::{LedgerSet, TownSet};

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

// ---------------------------------------------------------------------------
// Saveable trait and registry
// ---------------------------------------------------------------------------

/// A resource that persists its own state as an opaque byte blob.
///
/// Each feature plugin registers its saveable resources with the
/// [`SaveableRegistry`]; the registry can then save, load or reset all of
/// them without knowing the concrete types.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Unique key for this resource in the extension map.
    /// Must be stable across versions (used for deserialization lookup).
    const SAVE_KEY: &'static str;

    /// Serialize this resource to bytes.
    /// Return `None` to skip saving (e.g. when the resource is at its default state).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Deserialize from bytes, returning the restored resource.
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode bytes via `bitcode::decode`, logging a warning and returning `Default` on failure.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;
pub type ResetFn = Box<dyn Fn(&mut World) + Send + Sync>;

/// Type-erased save/load/reset operations for a single registered resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
    pub reset_fn: ResetFn,
}

/// Registry of all saveable resources, populated during plugin setup.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register a resource type that implements `Saveable`.
    ///
    /// Panics in debug builds if a resource with the same `SAVE_KEY` is already
    /// registered.
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!(
                "SaveableRegistry: duplicate key '{}', ignoring second registration",
                key
            );
            debug_assert!(false, "SaveableRegistry: duplicate key '{}'", key);
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                let value = T::load_from_bytes(bytes);
                world.insert_resource(value);
            }),
            reset_fn: Box::new(|world: &mut World| {
                world.insert_resource(T::default());
            }),
        });
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Save all registered resources into an extension map.
    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        let mut extensions = BTreeMap::new();
        for entry in &self.entries {
            if let Some(bytes) = (entry.save_fn)(world) {
                extensions.insert(entry.key.clone(), bytes);
            }
        }
        extensions
    }

    /// Load registered resources from an extension map.
    /// Resources whose key is absent are left unchanged.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }

    /// Reset all registered resources to their defaults.
    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset_fn)(world);
        }
    }
}

/// Run `f` with the registry temporarily taken out of the world.
pub fn with_registry<R>(
    world: &mut World,
    f: impl FnOnce(&SaveableRegistry, &mut World) -> R,
) -> Option<R> {
    let registry = world.remove_resource::<SaveableRegistry>()?;
    let result = f(&registry, world);
    world.insert_resource(registry);
    Some(result)
}

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        simulation_sets::configure_town_sets(app);

        app.init_resource::<TickCounter>()
            .add_systems(Startup, town_init::init_town)
            .add_systems(FixedUpdate, tick_counter.in_set(TownSet::Clock));

        // Clock, randomness, tunables
        app.add_plugins((
            time_of_day::TimeOfDayPlugin,
            sim_rng::SimRngPlugin,
            game_params::GameParamsPlugin,
        ));

        // Ledger
        app.add_plugins((
            districts::DistrictsPlugin,
            accrual::AccrualPlugin,
            economy::EconomyPlugin,
            occupancy::OccupancyPlugin,
        ));

        // People and transit
        app.add_plugins((
            bus_transit::BusTransitPlugin,
            tourism::TourismPlugin,
            population::PopulationPlugin,
        ));

        // Player input and reporting
        app.add_plugins((
            game_actions::GameActionsPlugin,
            notifications::NotificationsPlugin,
        ));
    }
}

#[cfg(test)]
mod saveable_tests {
    use super::*;

    /// A trivial resource implementing `Saveable` for testing.
    #[derive(Resource, Default, Debug, PartialEq)]
    struct TestCounter {
        value: u32,
    }

    impl Saveable for TestCounter {
        const SAVE_KEY: &'static str = "test_counter";

        fn save_to_bytes(&self) -> Option<Vec<u8>> {
            if self.value == 0 {
                None
            } else {
                Some(self.value.to_le_bytes().to_vec())
            }
        }

        fn load_from_bytes(bytes: &[u8]) -> Self {
            let value = u32::from_le_bytes(bytes.try_into().unwrap_or([0; 4]));
            TestCounter { value }
        }
    }

    #[test]
    fn test_registry_register_and_save() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 42 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        let extensions = registry.save_all(&world);
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions["test_counter"], 42u32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_registry_save_skips_default() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 0 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        assert!(registry.save_all(&world).is_empty());
    }

    #[test]
    fn test_registry_load_all() {
        let mut world = World::new();
        world.insert_resource(TestCounter::default());

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        let mut extensions = BTreeMap::new();
        extensions.insert("test_counter".to_string(), 99u32.to_le_bytes().to_vec());
        registry.load_all(&mut world, &extensions);

        assert_eq!(world.resource::<TestCounter>().value, 99);
    }

    #[test]
    fn test_registry_reset_all() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 999 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();
        registry.reset_all(&mut world);

        assert_eq!(world.resource::<TestCounter>().value, 0);
    }

    #[test]
    fn test_registry_load_ignores_unknown_keys() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 5 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        let mut extensions = BTreeMap::new();
        extensions.insert("unknown_feature".to_string(), vec![0xFF, 0xFF]);
        registry.load_all(&mut world, &extensions);

        assert_eq!(world.resource::<TestCounter>().value, 5);
    }

    #[test]
    #[should_panic(expected = "duplicate key")]
    fn test_registry_duplicate_key_panics_in_debug() {
        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();
        registry.register::<TestCounter>();
    }

    #[test]
    fn test_with_registry_restores_resource() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 7 });
        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();
        world.insert_resource(registry);

        let saved = with_registry(&mut world, |r, w| r.save_all(w)).unwrap();
        assert_eq!(saved.len(), 1);
        assert!(world.contains_resource::<SaveableRegistry>());

        let mut empty = World::new();
        assert!(with_registry(&mut empty, |_, _| ()).is_none());
    }
}
