//! Candidate structures for each errand, rebuilt once per tick before the
//! citizen sweep.

use bevy::prelude::*;

use crate::citizen::{Errand, WalkTarget};
use crate::config::NEARBY_RADIUS;
use crate::sim_rng::SimRng;
use crate::structures::{Payload, Structure, StructureKind};
use crate::time_of_day::SimClock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub entity: Entity,
    pub position: f32,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct DestinationCache {
    pub shopping: Vec<Destination>,
    pub dining: Vec<Destination>,
    pub entertainment: Vec<Destination>,
    pub service: Vec<Destination>,
    /// Every structure; browsing narrows this to the walker's surroundings.
    pub all: Vec<Destination>,
}

impl DestinationCache {
    pub fn clear(&mut self) {
        self.shopping.clear();
        self.dining.clear();
        self.entertainment.clear();
        self.service.clear();
        self.all.clear();
    }

    pub fn candidates(&self, errand: Errand) -> &[Destination] {
        match errand {
            Errand::Shopping => &self.shopping,
            Errand::Dining => &self.dining,
            Errand::Entertainment => &self.entertainment,
            Errand::Service => &self.service,
            Errand::Browsing => &self.all,
        }
    }

    /// Weighted category draw, then a uniform pick inside the category. A
    /// category with no candidates is a missed draw: the walker gets no
    /// target this tick and the weights are not renormalized.
    pub fn draw(&self, position: f32, rng: &mut SimRng) -> Option<WalkTarget> {
        let errand = Errand::from_roll((rng.roll() * 100.0) as u32);
        let pool: Vec<Destination> = match errand {
            Errand::Browsing => self
                .all
                .iter()
                .filter(|d| (d.position - position).abs() <= NEARBY_RADIUS)
                .copied()
                .collect(),
            _ => self.candidates(errand).to_vec(),
        };
        let index = rng.pick_index(pool.len())?;
        Some(WalkTarget::Structure {
            entity: pool[index].entity,
            errand,
        })
    }
}

/// Which errand, if any, a structure can serve right now.
pub fn errand_for(structure: &Structure, hour: u32) -> Option<Errand> {
    match (structure.kind, &structure.payload) {
        (StructureKind::Shop(_), Payload::Shop(shop)) => {
            (shop.is_open && shop.stock >= shop.units_per_visit).then_some(Errand::Shopping)
        }
        (StructureKind::Restaurant(_), Payload::Restaurant(restaurant)) => {
            (restaurant.has_available_table() && restaurant.waiter_on_duty(hour))
                .then_some(Errand::Dining)
        }
        (StructureKind::Entertainment(_), _) => Some(Errand::Entertainment),
        (StructureKind::Service(_), _) => Some(Errand::Service),
        _ => None,
    }
}

pub fn rebuild_destinations(
    clock: Res<SimClock>,
    mut cache: ResMut<DestinationCache>,
    structures: Query<(Entity, &Structure)>,
) {
    let hour = clock.hour();
    cache.clear();
    for (entity, structure) in &structures {
        if !structure.is_consistent() {
            continue;
        }
        let destination = Destination {
            entity,
            position: structure.position,
        };
        cache.all.push(destination);
        match errand_for(structure, hour) {
            Some(Errand::Shopping) => cache.shopping.push(destination),
            Some(Errand::Dining) => cache.dining.push(destination),
            Some(Errand::Entertainment) => cache.entertainment.push(destination),
            Some(Errand::Service) => cache.service.push(destination),
            Some(Errand::Browsing) | None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{EntertainmentKind, RestaurantKind, ShopKind};

    #[test]
    fn test_closed_shop_is_not_a_candidate() {
        let mut shop = Structure::new(StructureKind::Shop(ShopKind::Bakery), 0.0, 1.0, 0.0);
        assert_eq!(errand_for(&shop, 10), None);
        if let Payload::Shop(s) = &mut shop.payload {
            s.is_open = true;
        }
        assert_eq!(errand_for(&shop, 10), Some(Errand::Shopping));
        if let Payload::Shop(s) = &mut shop.payload {
            s.stock = 0;
        }
        assert_eq!(errand_for(&shop, 10), None);
    }

    #[test]
    fn test_restaurant_needs_waiter_on_shift() {
        let mut cafe = Structure::new(
            StructureKind::Restaurant(RestaurantKind::Cafe),
            0.0,
            1.0,
            0.0,
        );
        if let Payload::Restaurant(r) = &mut cafe.payload {
            r.has_day_waiter = true;
        }
        assert_eq!(errand_for(&cafe, 12), Some(Errand::Dining));
        assert_eq!(errand_for(&cafe, 22), None);
    }

    #[test]
    fn test_missed_draw_when_category_empty() {
        let mut rng = SimRng::from_seed_u64(5);
        let cache = DestinationCache::default();
        for _ in 0..100 {
            assert!(cache.draw(0.0, &mut rng).is_none());
        }
    }

    #[test]
    fn test_draw_only_hits_populated_categories() {
        let mut rng = SimRng::from_seed_u64(5);
        let arcade = Destination {
            entity: Entity::from_raw(1),
            position: 50.0,
        };
        let cache = DestinationCache {
            entertainment: vec![arcade],
            all: vec![arcade],
            ..Default::default()
        };
        let mut hits = 0;
        for _ in 0..2000 {
            if let Some(WalkTarget::Structure { entity, errand }) = cache.draw(0.0, &mut rng) {
                assert_eq!(entity, arcade.entity);
                assert!(matches!(errand, Errand::Entertainment | Errand::Browsing));
                hits += 1;
            }
        }
        // 20% entertainment + 10% browsing within reach.
        assert!((450..750).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn test_rebuild_sorts_structures() {
        let mut app = App::new();
        app.insert_resource(SimClock::at_hour(0, 12.0))
            .init_resource::<DestinationCache>()
            .add_systems(Update, rebuild_destinations);
        app.world_mut().spawn(Structure::new(
            StructureKind::Entertainment(EntertainmentKind::Arcade),
            10.0,
            1.0,
            0.0,
        ));
        app.world_mut()
            .spawn(Structure::new(StructureKind::House, 20.0, 1.0, 0.0));
        app.update();
        let cache = app.world().resource::<DestinationCache>();
        assert_eq!(cache.entertainment.len(), 1);
        assert_eq!(cache.all.len(), 2);
        assert!(cache.shopping.is_empty());
    }
}
