//! Restaurant tables: abandoned seats and waiter cleaning.

use bevy::prelude::*;

use crate::citizen::{Behavior, Citizen, VisitKind};
use crate::structures::{Payload, Structure, TableStatus};
use crate::time_of_day::SimClock;

/// Simulated minutes a waiter needs per dirty table.
pub const TABLE_CLEANING_MINUTES: f64 = 5.0;

/// `true` while `diner` is still seated at `table` of `restaurant`.
fn still_seated(
    diners: &Query<&Citizen>,
    diner: Entity,
    restaurant: Entity,
    table: usize,
) -> bool {
    diners.get(diner).is_ok_and(|c| {
        matches!(
            c.behavior,
            Behavior::Visiting(v) if v.structure == restaurant && v.kind == VisitKind::Dining { table }
        )
    })
}

/// System: free tables whose diner has gone, then let the waiter on duty
/// clean one dirty table every [`TABLE_CLEANING_MINUTES`].
pub fn tend_tables(
    clock: Res<SimClock>,
    diners: Query<&Citizen>,
    mut restaurants: Query<(Entity, &mut Structure)>,
) {
    let now = clock.minutes;
    let hour = clock.hour();
    for (entity, mut structure) in &mut restaurants {
        if !structure.is_consistent() {
            warn!(
                "Tables: {:?} has a payload that does not match {:?}, skipping",
                entity, structure.kind
            );
            continue;
        }
        let Payload::Restaurant(restaurant) = &structure.payload else {
            continue;
        };
        let abandoned: Vec<usize> = restaurant
            .tables
            .iter()
            .enumerate()
            .filter(|(index, t)| {
                t.status == TableStatus::Occupied
                    && !t
                        .occupant
                        .is_some_and(|d| still_seated(&diners, d, entity, *index))
            })
            .map(|(index, _)| index)
            .collect();
        let has_dirty = !abandoned.is_empty()
            || restaurant
                .tables
                .iter()
                .any(|t| t.status == TableStatus::Dirty);
        if !has_dirty && restaurant.cleaning_since.is_none() {
            continue;
        }

        let Payload::Restaurant(restaurant) = &mut structure.payload else {
            continue;
        };
        for index in abandoned {
            debug!("Table {} at {:?} abandoned", index, entity);
            restaurant.release_table(index);
        }
        if !has_dirty || !restaurant.waiter_on_duty(hour) {
            restaurant.cleaning_since = None;
            continue;
        }
        match restaurant.cleaning_since {
            None => restaurant.cleaning_since = Some(now),
            Some(since) if now - since >= TABLE_CLEANING_MINUTES => {
                if let Some(table) = restaurant
                    .tables
                    .iter_mut()
                    .find(|t| t.status == TableStatus::Dirty)
                {
                    table.status = TableStatus::Available;
                }
                restaurant.cleaning_since = Some(now);
            }
            Some(_) => {}
        }
    }
}
