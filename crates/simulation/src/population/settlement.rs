//! What a finished visit pays the visited structure.

use bevy::prelude::*;

use crate::citizen::VisitKind;
use crate::sim_rng::SimRng;
use crate::structures::{
    Payload, ServiceKind, Structure, StructureKind, CONCESSION_CHANCE, CONCESSION_PRICE,
    LIBRARY_LATE_FEE, LIBRARY_LATE_FEE_CHANCE, MUSEUM_ADMISSION, MUSEUM_CAFE_CHANCE,
    MUSEUM_CAFE_PRICE, MUSEUM_GIFT_SHOP_CHANCE, MUSEUM_GIFT_SHOP_PRICE, PRICE_PER_UNIT_SOLD,
};

/// Credit `structure` for a completed visit by `citizen` and return the
/// amount credited. Exactly one branch applies, chosen by the visit kind.
///
/// Stock checks and the decrement happen in one call so the read and the
/// write cannot be separated.
pub fn settle_visit(
    structure: &mut Structure,
    citizen: Entity,
    kind: VisitKind,
    rng: &mut SimRng,
) -> f64 {
    let amount = match (kind, structure.kind, &mut structure.payload) {
        (VisitKind::Shopping, _, Payload::Shop(shop)) => {
            if shop.is_open && shop.stock >= shop.units_per_visit {
                shop.stock -= shop.units_per_visit;
                shop.units_per_visit as f64 * PRICE_PER_UNIT_SOLD
            } else {
                0.0
            }
        }
        (VisitKind::Dining { table }, _, Payload::Restaurant(restaurant)) => {
            let seated = restaurant
                .tables
                .get(table)
                .is_some_and(|t| t.occupant == Some(citizen));
            if seated {
                restaurant.release_table(table);
                restaurant.meal_price
            } else {
                0.0
            }
        }
        (VisitKind::Entertainment, StructureKind::Entertainment(venue), _) => {
            let mut amount = venue.ticket_price();
            if venue.has_concession() && rng.chance(CONCESSION_CHANCE) {
                amount += CONCESSION_PRICE;
            }
            amount
        }
        (VisitKind::Service, StructureKind::Service(ServiceKind::Library), _) => {
            if rng.chance(LIBRARY_LATE_FEE_CHANCE) {
                rng.between(LIBRARY_LATE_FEE.0, LIBRARY_LATE_FEE.1)
            } else {
                0.0
            }
        }
        (VisitKind::Service, StructureKind::Service(ServiceKind::Museum), _) => {
            let mut amount = MUSEUM_ADMISSION;
            if rng.chance(MUSEUM_GIFT_SHOP_CHANCE) {
                amount += MUSEUM_GIFT_SHOP_PRICE;
            }
            if rng.chance(MUSEUM_CAFE_CHANCE) {
                amount += MUSEUM_CAFE_PRICE;
            }
            amount
        }
        (VisitKind::Browsing, _, _) => 0.0,
        (kind, structure_kind, _) => {
            warn!(
                "Visit {:?} does not apply to {}, nothing settled",
                kind,
                structure_kind.label()
            );
            0.0
        }
    };
    structure.accrual.income += amount;
    amount
}
