//! The per-citizen state machine: Walking, Waiting, Riding, Visiting.
//!
//! Every held reference (target stop, target structure, visited structure,
//! the bus a rider sits on) is re-validated before use. A stale reference
//! sends the citizen back to aimless walking with a fresh heading.

use bevy::prelude::*;

use crate::bus_transit::{travel, BusStopId, TransitState};
use crate::citizen::{Behavior, Citizen, Errand, Visit, VisitEnd, VisitKind, WalkTarget};
use crate::config::{EXIT_OFFSET, STOP_REACH_RADIUS, STRUCTURE_REACH_RADIUS, WORLD_LENGTH};
use crate::game_params::GameParams;
use crate::notifications::PurchaseEvent;
use crate::sim_rng::SimRng;
use crate::structures::{Payload, Structure};
use crate::time_of_day::SimClock;
use crate::tourism::Tourist;

use super::counters::PopulationCounters;
use super::destinations::DestinationCache;
use super::settlement::settle_visit;

/// Read-mostly context shared by every citizen in one sweep.
struct Sweep<'a> {
    now: f64,
    dt: f32,
    params: &'a GameParams,
    destinations: &'a DestinationCache,
    rng: &'a mut SimRng,
    transit: &'a mut TransitState,
}

enum VisitProgress {
    Ongoing,
    Abandoned,
    Finished(f64),
}

#[allow(clippy::too_many_arguments)]
pub fn advance_citizens(
    clock: Res<SimClock>,
    params: Res<GameParams>,
    destinations: Res<DestinationCache>,
    mut rng: ResMut<SimRng>,
    mut transit: ResMut<TransitState>,
    mut counters: ResMut<PopulationCounters>,
    mut citizens: Query<(Entity, &mut Citizen, Option<&Tourist>)>,
    mut structures: Query<&mut Structure>,
    mut purchases: EventWriter<PurchaseEvent>,
) {
    let dt = clock.last_delta_secs;
    if dt <= 0.0 {
        return;
    }
    let mut sweep = Sweep {
        now: clock.minutes,
        dt,
        params: &*params,
        destinations: &*destinations,
        rng: &mut *rng,
        transit: &mut *transit,
    };

    for (entity, mut citizen, tourist) in &mut citizens {
        let departing = tourist.is_some_and(|t| t.departing);
        let behavior = citizen.behavior;
        match behavior {
            Behavior::Riding => {
                if !sweep.transit.is_riding(entity) {
                    warn!("{:?} was riding no bus, back to walking", entity);
                    citizen.reset_to_walking(sweep.rng);
                }
            }
            Behavior::Waiting { stop, waited_secs } => {
                wait(entity, &mut citizen, stop, waited_secs, departing, &mut sweep);
            }
            Behavior::Visiting(visit) => {
                if let VisitProgress::Finished(amount) =
                    visit_tick(entity, &mut citizen, visit, &mut structures, &mut sweep)
                {
                    counters.visits_completed += 1;
                    if amount > 0.0 {
                        purchases.send(PurchaseEvent {
                            structure: visit.structure,
                            citizen: entity,
                            errand: visit.kind.errand(),
                            amount,
                        });
                    }
                }
            }
            Behavior::Walking { target } => {
                walk(entity, &mut citizen, target, departing, &mut structures, &mut sweep);
            }
        }
    }
}

fn wait(
    entity: Entity,
    citizen: &mut Citizen,
    stop: BusStopId,
    waited_secs: f32,
    departing: bool,
    sweep: &mut Sweep,
) {
    if sweep.transit.stop_by_id(stop).is_none() {
        debug!("{:?} was waiting at removed stop {}", entity, stop);
        citizen.reset_to_walking(sweep.rng);
        return;
    }
    let waited_secs = waited_secs + sweep.dt;
    let params = &sweep.params.citizen;
    let impatient = waited_secs >= params.patience_secs && !departing;
    if impatient && sweep.rng.chance(params.give_up_chance) {
        sweep.transit.dequeue(entity);
        citizen.reset_to_walking(sweep.rng);
        return;
    }
    citizen.behavior = Behavior::Waiting { stop, waited_secs };
}

fn visit_tick(
    entity: Entity,
    citizen: &mut Citizen,
    visit: Visit,
    structures: &mut Query<&mut Structure>,
    sweep: &mut Sweep,
) -> VisitProgress {
    let Ok(mut structure) = structures.get_mut(visit.structure) else {
        warn!("{:?} was visiting a demolished structure", entity);
        citizen.reset_to_walking(sweep.rng);
        return VisitProgress::Abandoned;
    };
    let done = match visit.ends {
        VisitEnd::AfterSeconds(secs) => {
            let left = secs - sweep.dt;
            if left > 0.0 {
                citizen.behavior = Behavior::Visiting(Visit {
                    ends: VisitEnd::AfterSeconds(left),
                    ..visit
                });
            }
            left <= 0.0
        }
        VisitEnd::AtMinute(minute) => sweep.now >= minute,
    };
    if !done {
        return VisitProgress::Ongoing;
    }

    let amount = settle_visit(&mut structure, entity, visit.kind, sweep.rng);
    citizen.visible = true;
    citizen.position =
        (structure.position + EXIT_OFFSET * citizen.direction).clamp(0.0, WORLD_LENGTH);
    citizen.behavior = Behavior::Walking { target: None };
    VisitProgress::Finished(amount)
}

fn walk(
    entity: Entity,
    citizen: &mut Citizen,
    target: Option<WalkTarget>,
    departing: bool,
    structures: &mut Query<&mut Structure>,
    sweep: &mut Sweep,
) {
    // Re-validate, resolving the target's position.
    let mut target = target;
    let mut target_position = None;
    match target {
        Some(WalkTarget::Stop(id)) => match sweep.transit.stop_by_id(id) {
            Some(stop) => target_position = Some(stop.position),
            None => {
                debug!("{:?} lost its target stop {}", entity, id);
                citizen.reset_to_walking(sweep.rng);
                return;
            }
        },
        Some(WalkTarget::Structure { entity: s, .. }) => match structures.get(s) {
            Ok(structure) => target_position = Some(structure.position),
            Err(_) => {
                debug!("{:?} lost its target structure {:?}", entity, s);
                citizen.reset_to_walking(sweep.rng);
                return;
            }
        },
        None => {}
    }

    if departing && !matches!(target, Some(WalkTarget::Stop(_))) {
        if let Some(stop) = sweep.transit.nearest_stop(citizen.position) {
            target = Some(WalkTarget::Stop(stop.id));
            target_position = Some(stop.position);
        }
    }

    if let Some(position) = target_position {
        citizen.face(position);
    }
    let (position, direction) =
        travel(citizen.position, citizen.direction, citizen.walk_speed * sweep.dt);
    citizen.position = position;
    citizen.direction = direction;

    match target {
        Some(WalkTarget::Stop(id)) => {
            if let Some(stop) = sweep.transit.stop_by_id_mut(id) {
                if (stop.position - citizen.position).abs() <= STOP_REACH_RADIUS {
                    citizen.position = stop.position;
                    if !stop.waiting.contains(&entity) {
                        stop.waiting.push_back(entity);
                    }
                    citizen.behavior = Behavior::Waiting {
                        stop: id,
                        waited_secs: 0.0,
                    };
                    return;
                }
            }
        }
        Some(WalkTarget::Structure { entity: s, errand }) => {
            if let Ok(mut structure) = structures.get_mut(s) {
                if structure.distance_to(citizen.position) <= STRUCTURE_REACH_RADIUS {
                    begin_visit(entity, citizen, s, &mut structure, errand, sweep);
                    return;
                }
            }
        }
        None => {
            if !departing {
                target = wander(citizen, sweep);
            }
        }
    }
    citizen.behavior = Behavior::Walking { target };
}

/// Aimless walking: occasional turnarounds and, now and then, a new goal.
fn wander(citizen: &mut Citizen, sweep: &mut Sweep) -> Option<WalkTarget> {
    let params = &sweep.params.citizen;
    if sweep.rng.chance(params.direction_flip_chance) {
        citizen.direction = -citizen.direction;
    }
    if sweep.rng.chance(params.stop_seek_chance) {
        if let Some(stop) = sweep.transit.nearest_stop(citizen.position) {
            citizen.face(stop.position);
            return Some(WalkTarget::Stop(stop.id));
        }
    }
    if sweep.rng.chance(params.visit_seek_chance) {
        return sweep.destinations.draw(citizen.position, sweep.rng);
    }
    None
}

/// Step inside `structure`. A diner needs a free table or gives up.
fn begin_visit(
    entity: Entity,
    citizen: &mut Citizen,
    target: Entity,
    structure: &mut Structure,
    errand: Errand,
    sweep: &mut Sweep,
) {
    let params = &sweep.params.citizen;
    let visit = match errand {
        Errand::Dining => {
            let Payload::Restaurant(restaurant) = &mut structure.payload else {
                citizen.behavior = Behavior::Walking { target: None };
                return;
            };
            let meal = sweep.rng.between(params.meal_minutes.0, params.meal_minutes.1);
            let ends = sweep.now + meal;
            match restaurant.claim_table(entity, ends) {
                Some(table) => Visit {
                    structure: target,
                    kind: VisitKind::Dining { table },
                    ends: VisitEnd::AtMinute(ends),
                },
                None => {
                    citizen.behavior = Behavior::Walking { target: None };
                    return;
                }
            }
        }
        other => {
            let kind = match other {
                Errand::Shopping => VisitKind::Shopping,
                Errand::Entertainment => VisitKind::Entertainment,
                Errand::Service => VisitKind::Service,
                _ => VisitKind::Browsing,
            };
            let secs = sweep.rng.between_f32(params.visit_secs.0, params.visit_secs.1);
            Visit {
                structure: target,
                kind,
                ends: VisitEnd::AfterSeconds(secs),
            }
        }
    };
    citizen.position = structure.position;
    citizen.visible = false;
    citizen.behavior = Behavior::Visiting(visit);
}
