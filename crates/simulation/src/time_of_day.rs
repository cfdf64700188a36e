//! Simulated clock.
//!
//! Converts real (fixed-timestep) seconds into simulated minutes. The rate is
//! `speed * time_multiplier`, where the multiplier is 4 at night
//! (hour < 6 or hour >= 20) and 2 during the day. Every other system reads
//! time from [`SimClock`]; nothing downstream touches wall-clock time, so
//! pausing and the speed setting apply everywhere for free.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{MINUTES_PER_DAY, MINUTES_PER_HOUR};

const NIGHT_MULTIPLIER: f64 = 4.0;
const DAY_MULTIPLIER: f64 = 2.0;

/// User-selectable speed setting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum GameSpeed {
    #[default]
    Normal,
    Fast,
    Fastest,
}

impl GameSpeed {
    pub fn multiplier(self) -> f64 {
        match self {
            GameSpeed::Normal => 1.0,
            GameSpeed::Fast => 2.0,
            GameSpeed::Fastest => 3.0,
        }
    }

    pub fn from_multiplier(value: u32) -> Option<Self> {
        match value {
            1 => Some(GameSpeed::Normal),
            2 => Some(GameSpeed::Fast),
            3 => Some(GameSpeed::Fastest),
            _ => None,
        }
    }
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct SimClock {
    /// Simulated minutes since the town was founded.
    pub minutes: f64,
    pub speed: GameSpeed,
    pub paused: bool,
    /// Simulated minutes added by the most recent `advance`.
    pub last_delta_minutes: f64,
    /// Real seconds scaled by speed for the most recent `advance`
    /// ("simulated-equivalent seconds"). Zero while paused.
    pub last_delta_secs: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            minutes: 8.0 * MINUTES_PER_HOUR, // start at 8 AM on day 0
            speed: GameSpeed::Normal,
            paused: false,
            last_delta_minutes: 0.0,
            last_delta_secs: 0.0,
        }
    }
}

impl SimClock {
    pub fn at_hour(day: u64, hour: f64) -> Self {
        Self {
            minutes: day as f64 * MINUTES_PER_DAY + hour * MINUTES_PER_HOUR,
            ..Default::default()
        }
    }

    /// Advance by `real_secs` of wall-clock time. Anomalous input (negative,
    /// NaN, infinite) advances nothing.
    pub fn advance(&mut self, real_secs: f64) {
        if self.paused || !real_secs.is_finite() || real_secs <= 0.0 {
            self.last_delta_minutes = 0.0;
            self.last_delta_secs = 0.0;
            return;
        }
        let scaled = real_secs * self.speed.multiplier();
        let delta = scaled * self.time_multiplier();
        self.minutes += delta;
        self.last_delta_minutes = delta;
        self.last_delta_secs = scaled as f32;
    }

    pub fn hour(&self) -> u32 {
        ((self.minutes / MINUTES_PER_HOUR).floor() as u64 % 24) as u32
    }

    pub fn day(&self) -> u64 {
        (self.minutes / MINUTES_PER_DAY).floor() as u64
    }

    pub fn minute_of_day(&self) -> f64 {
        self.minutes.rem_euclid(MINUTES_PER_DAY)
    }

    pub fn is_night(&self) -> bool {
        let h = self.hour();
        !(6..20).contains(&h)
    }

    /// Day/night rate modifier; a pure function of the time of day.
    pub fn time_multiplier(&self) -> f64 {
        if self.is_night() {
            NIGHT_MULTIPLIER
        } else {
            DAY_MULTIPLIER
        }
    }

    pub fn formatted(&self) -> String {
        let m = self.minute_of_day();
        let h = (m / MINUTES_PER_HOUR) as u32;
        let min = (m % MINUTES_PER_HOUR) as u32;
        format!("Day {} {:02}:{:02}", self.day() + 1, h, min)
    }
}

/// Advances the clock by one fixed timestep.
pub fn tick_sim_clock(time: Res<Time<Fixed>>, mut clock: ResMut<SimClock>) {
    clock.advance(time.timestep().as_secs_f64());
}

impl crate::Saveable for SimClock {
    const SAVE_KEY: &'static str = "sim_clock";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

pub struct TimeOfDayPlugin;

impl Plugin for TimeOfDayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>()
            .insert_resource(Time::<Fixed>::from_hz(crate::config::TICKS_PER_SECOND))
            .add_systems(
                FixedUpdate,
                tick_sim_clock.in_set(crate::TownSet::Clock),
            );

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<SimClock>();
    }
}
