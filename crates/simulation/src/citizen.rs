use bevy::prelude::*;

use crate::bus_transit::BusStopId;
use crate::game_params::CitizenParams;
use crate::sim_rng::SimRng;

// ---------------------------------------------------------------------------
// Errands and visits
// ---------------------------------------------------------------------------

/// Why a citizen is heading for a structure. Drawn from weighted categories
/// when a walker picks a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Errand {
    Shopping,
    Dining,
    Entertainment,
    Service,
    /// Wandering into any nearby structure. Settles nothing.
    Browsing,
}

impl Errand {
    /// Draw weights, in percent. They sum to 100.
    pub const WEIGHTS: [(Errand, u32); 5] = [
        (Errand::Shopping, 25),
        (Errand::Dining, 25),
        (Errand::Entertainment, 20),
        (Errand::Service, 20),
        (Errand::Browsing, 10),
    ];

    /// Map a roll in `[0, 100)` onto an errand.
    pub fn from_roll(roll: u32) -> Errand {
        let mut acc = 0;
        for (errand, weight) in Self::WEIGHTS {
            acc += weight;
            if roll < acc {
                return errand;
            }
        }
        Errand::Browsing
    }
}

/// What a visiting citizen is doing inside a structure. One variant at a
/// time, so at most one settlement can ever apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    Shopping,
    Dining { table: usize },
    Entertainment,
    Service,
    Browsing,
}

impl VisitKind {
    pub fn errand(self) -> Errand {
        match self {
            VisitKind::Shopping => Errand::Shopping,
            VisitKind::Dining { .. } => Errand::Dining,
            VisitKind::Entertainment => Errand::Entertainment,
            VisitKind::Service => Errand::Service,
            VisitKind::Browsing => Errand::Browsing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisitEnd {
    /// Simulated-equivalent seconds left.
    AfterSeconds(f32),
    /// Simulated minute the visit ends (meals).
    AtMinute(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visit {
    pub structure: Entity,
    pub kind: VisitKind,
    pub ends: VisitEnd,
}

// ---------------------------------------------------------------------------
// Behaviour state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkTarget {
    Stop(BusStopId),
    Structure { entity: Entity, errand: Errand },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Walking { target: Option<WalkTarget> },
    Waiting { stop: BusStopId, waited_secs: f32 },
    /// Owned by the transit service until a bus lets the citizen off.
    Riding,
    Visiting(Visit),
}

impl Behavior {
    pub fn is_walking(&self) -> bool {
        matches!(self, Behavior::Walking { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Behavior::Walking { .. } => "walking",
            Behavior::Waiting { .. } => "waiting",
            Behavior::Riding => "riding",
            Behavior::Visiting(_) => "visiting",
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior::Walking { target: None }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Citizen {
    pub position: f32,
    pub walk_speed: f32,
    /// `-1.0` or `+1.0`.
    pub direction: f32,
    /// Hidden while visiting or riding.
    pub visible: bool,
    pub behavior: Behavior,
}

impl Citizen {
    pub fn new(position: f32, walk_speed: f32, direction: f32) -> Self {
        Self {
            position,
            walk_speed,
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            visible: true,
            behavior: Behavior::default(),
        }
    }

    /// A walker at `position` with speed and heading drawn from `params`.
    pub fn random(rng: &mut SimRng, params: &CitizenParams, position: f32) -> Self {
        let (lo, hi) = params.walk_speed;
        let speed = rng.between_f32(lo, hi);
        let direction = rng.direction();
        Self::new(position, speed, direction)
    }

    /// Back to aimless walking with a fresh heading. Used whenever a held
    /// reference turns out to be stale.
    pub fn reset_to_walking(&mut self, rng: &mut SimRng) {
        self.behavior = Behavior::Walking { target: None };
        self.visible = true;
        self.direction = rng.direction();
    }

    /// Turn to face `position`. A citizen already there keeps its heading.
    pub fn face(&mut self, position: f32) {
        if position > self.position {
            self.direction = 1.0;
        } else if position < self.position {
            self.direction = -1.0;
        }
    }

    pub fn is_riding(&self) -> bool {
        self.behavior == Behavior::Riding
    }
}
