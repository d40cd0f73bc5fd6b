//! Headless `duoloop simulate` mode.

use clap::ArgMatches;
use duoloop_lib::playback::simulation::{Simulation, SimulationConfig};
use duoloop_lib::{LoopError, SchedulerEvent};
use log::{error, info};
use serde::Serialize;

use super::settings::{
    clip_duration_ms, frame_interval, loop_settings, ms_value, parse_value, probability,
};

/// Final line printed after the event stream.
#[derive(Debug, Serialize)]
struct SimulationSummary {
    summary: bool,
    elapsed_ms: f64,
    frames: u64,
    dropped_frames: u64,
    cycles: u64,
}

/// Handle `duoloop simulate`. Returns an exit code if the subcommand ran.
pub fn maybe_run_simulate(args: &ArgMatches) -> Result<Option<i32>, LoopError> {
    let Some(args) = args.subcommand_matches("simulate") else {
        return Ok(None);
    };

    let settings = loop_settings(args)?;
    let cycles: usize = parse_value(args, "cycles")?;
    let config = SimulationConfig {
        clip_duration_ms: clip_duration_ms(args)?,
        frame_interval: frame_interval(args)?,
        jitter_ms: ms_value(args, "jitter-ms")?,
        drop_probability: probability(args, "drop-probability")?,
        metadata_delay_ms: ms_value(args, "metadata-delay-ms")?,
        seed: parse_value(args, "seed")?,
    };
    let source = args
        .get_one::<String>("INPUT")
        .map(String::as_str)
        .unwrap_or("simulated");

    info!(
        "simulating {} cycles of a {}ms clip",
        cycles, config.clip_duration_ms
    );

    // Each cycle needs at most one clip length; the rest is headroom for
    // metadata delay and the final retirement.
    let limit_ms = config.metadata_delay_ms
        + config.clip_duration_ms * (cycles as f64 + 1.0)
        + settings.settle_delay_ms
        + settings.crossfade_duration_ms
        + 1000.0;

    let mut sim = Simulation::new(source, settings, config);
    let mut started = 0;
    while started < cycles || sim.scheduler().swap_in_flight() {
        if sim.elapsed_ms() > limit_ms {
            error!(
                "simulation stopped after {:.0}ms with {} of {} hand-offs",
                sim.elapsed_ms(),
                started,
                cycles
            );
            return Ok(Some(1));
        }

        for timed in sim.step() {
            if matches!(timed.event, SchedulerEvent::HandoffStarted { .. }) {
                started += 1;
            }
            println!("{}", serde_json::to_string(&timed)?);
        }
    }

    let summary = SimulationSummary {
        summary: true,
        elapsed_ms: sim.elapsed_ms(),
        frames: sim.frames(),
        dropped_frames: sim.dropped_frames(),
        cycles: sim.scheduler().cycles(),
    };
    println!("{}", serde_json::to_string(&summary)?);

    Ok(Some(0))
}
