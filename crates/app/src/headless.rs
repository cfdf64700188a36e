//! Headless run: a blocking loop over `FixedUpdate` with no window and no
//! renderer.
//!
//! ```text
//! pocket-town [--ticks N] [--speed 1|2|3] [--seed N] [--json]
//! ```
//!
//! With `--json` the final [`TownReport`] is written to stdout as one JSON
//! object; otherwise a summary is logged. Logging goes through Bevy's
//! `LogPlugin`, so `RUST_LOG` filters it.

use std::io::Write;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use simulation::game_actions::{apply_action, TownAction};
use simulation::report::{build_report, TownReport};
use simulation::sim_rng::SimRng;
use simulation::time_of_day::GameSpeed;

/// One simulated day at normal speed: 420 real seconds of daytime plus 150
/// of night, at 60 ticks per second.
const DEFAULT_TICKS: u64 = 34_200;
const DEFAULT_SEED: u64 = 0x7077_0001;
const PROGRESS_EVERY: u64 = 6_000;

/// Command line arguments for a headless run
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "pocket-town")]
#[command(about = "Run a headless town simulation and report on it")]
pub struct RunOptions {
    /// Number of fixed ticks to simulate
    #[arg(long, default_value_t = DEFAULT_TICKS)]
    pub ticks: u64,

    /// Clock speed: 1 (normal), 2 (fast) or 3 (fastest)
    #[arg(long, default_value = "1", value_parser = parse_speed)]
    pub speed: GameSpeed,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            speed: GameSpeed::Normal,
            seed: DEFAULT_SEED,
            json: false,
        }
    }
}

fn parse_speed(value: &str) -> Result<GameSpeed, String> {
    match value {
        "1" => Ok(GameSpeed::Normal),
        "2" => Ok(GameSpeed::Fast),
        "3" => Ok(GameSpeed::Fastest),
        other => Err(format!("speed must be 1, 2 or 3, got '{other}'")),
    }
}

fn build_app(options: &RunOptions) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(LogPlugin::default());
    app.add_plugins(simulation::SimulationPlugin);
    // Seed before Startup so the starter town is drawn from it.
    app.insert_resource(SimRng::from_seed_u64(options.seed));

    // Initial update so Startup systems execute and the town is laid out.
    app.update();

    apply_action(
        app.world_mut(),
        &TownAction::SetSpeed {
            speed: options.speed,
        },
    );
    app
}

/// Run the town for `options.ticks` fixed ticks and return the final report.
pub fn run(options: &RunOptions) -> TownReport {
    let mut app = build_app(options);
    info!(
        "pocket-town: {} ticks at {:?}, seed {:#x}",
        options.ticks, options.speed, options.seed
    );

    for tick in 1..=options.ticks {
        app.world_mut().run_schedule(FixedUpdate);
        if tick % PROGRESS_EVERY == 0 {
            let report = build_report(app.world_mut());
            info!(
                "[{}] day {} {} | treasury {:.2} | residents {} tourists {}",
                tick, report.day, report.time, report.treasury, report.residents, report.tourists
            );
        }
    }

    let report = build_report(app.world_mut());
    if options.json {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        match serde_json::to_string(&report) {
            Ok(json) => {
                if let Err(e) = writeln!(stdout, "{json}") {
                    error!("Failed to write report: {e}");
                }
            }
            Err(e) => error!("Failed to serialize report: {e}"),
        }
    } else {
        log_summary(&report);
    }
    report
}

fn log_summary(report: &TownReport) {
    info!(
        "Day {} {} after {} ticks",
        report.day, report.time, report.tick
    );
    info!(
        "Treasury {:.2} (fares {:.2}, wages {:.2}), {:.2} waiting to be collected",
        report.treasury, report.fares_collected, report.wages_paid, report.uncollected
    );
    info!(
        "{} residents, {} tourists in town ({} arrived, {} departed), {} visits",
        report.residents,
        report.tourists,
        report.tourists_arrived,
        report.tourists_departed,
        report.visits_completed
    );
    let occupancy = &report.occupancy;
    info!(
        "Units {}/{}, rooms {}/{} ({} dirty), tables {}/{}, shops open {}/{}",
        occupancy.occupied_units,
        occupancy.total_units,
        occupancy.occupied_rooms,
        occupancy.total_rooms,
        occupancy.dirty_rooms,
        occupancy.occupied_tables,
        occupancy.total_tables,
        occupancy.open_shops,
        occupancy.total_shops
    );
    for text in &report.recent_notifications {
        info!("  {text}");
    }
}
