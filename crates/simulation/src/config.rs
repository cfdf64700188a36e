/// Length of the one-dimensional town in world units. Positions live in
/// `[0, WORLD_LENGTH]`.
pub const WORLD_LENGTH: f32 = 2400.0;

/// Fixed simulation rate. Every system in `FixedUpdate` runs once per tick.
pub const TICKS_PER_SECOND: f64 = 60.0;

pub const MINUTES_PER_HOUR: f64 = 60.0;
pub const MINUTES_PER_DAY: f64 = 24.0 * MINUTES_PER_HOUR;

/// Distance at which a walking citizen counts as having reached a stop.
pub const STOP_REACH_RADIUS: f32 = 6.0;

/// Distance at which a walking citizen counts as having reached a structure.
pub const STRUCTURE_REACH_RADIUS: f32 = 10.0;

/// Distance at which a bus starts dwelling at a stop.
pub const BUS_DWELL_RADIUS: f32 = 4.0;

/// How far from a structure/stop a citizen reappears after a visit or ride.
pub const EXIT_OFFSET: f32 = 12.0;

/// "Arbitrary nearby" visits only consider structures within this distance.
pub const NEARBY_RADIUS: f32 = 300.0;
