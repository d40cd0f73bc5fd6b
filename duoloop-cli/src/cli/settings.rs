//! Turn parsed arguments into library settings.

use std::str::FromStr;
use std::time::Duration;

use clap::ArgMatches;
use duoloop_lib::playback::scheduler::settings::parse_ms;
use duoloop_lib::{LoopError, LoopSettings, ObjectFit};

/// Settings from `--config` (or defaults) with explicit flags applied on top.
pub fn loop_settings(args: &ArgMatches) -> Result<LoopSettings, LoopError> {
    let mut settings = match args.get_one::<String>("config") {
        Some(path) => LoopSettings::from_path(path)?,
        None => LoopSettings::default(),
    };

    if let Some(value) = args.get_one::<String>("cutover-ms") {
        settings.set_cutover_offset_ms(parse_ms("cutover-ms", value)?);
    }
    if let Some(value) = args.get_one::<String>("crossfade-ms") {
        settings.set_crossfade_duration_ms(parse_ms("crossfade-ms", value)?);
    }
    if let Some(value) = args.get_one::<String>("settle-ms") {
        settings.set_settle_delay_ms(parse_ms("settle-ms", value)?);
    }
    if let Some(value) = args.get_one::<String>("object-fit") {
        settings.object_fit = ObjectFit::from_str(value).map_err(LoopError::InvalidSettings)?;
    }

    Ok(settings)
}

/// Shortest frame interval `--fps` can select.
const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Frame interval derived from `--fps`, never shorter than one millisecond.
pub fn frame_interval(args: &ArgMatches) -> Result<Duration, LoopError> {
    let fps: f64 = parse_value(args, "fps")?;
    if !fps.is_finite() || fps <= 0.0 {
        return Err(LoopError::InvalidSettings(format!(
            "fps must be positive, got {}",
            fps
        )));
    }
    Ok(Duration::from_nanos((1e9 / fps).round() as u64).max(MIN_FRAME_INTERVAL))
}

/// A defaulted millisecond argument, rejecting non-finite text.
pub fn ms_value(args: &ArgMatches, name: &str) -> Result<f64, LoopError> {
    parse_ms(name, required(args, name)?)
}

/// A probability argument in `0.0..=1.0`.
pub fn probability(args: &ArgMatches, name: &str) -> Result<f64, LoopError> {
    let value: f64 = parse_value(args, name)?;
    if !value.is_finite() {
        return Err(LoopError::InvalidSettings(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    Ok(value.clamp(0.0, 1.0))
}

/// Clip length for simulated instances, from `--duration-ms`.
pub fn clip_duration_ms(args: &ArgMatches) -> Result<f64, LoopError> {
    let value = required(args, "duration-ms")?;
    let ms = parse_ms("duration-ms", value)?;
    if ms <= 0.0 {
        return Err(LoopError::InvalidSettings(
            "duration-ms must be positive".to_string(),
        ));
    }
    Ok(ms)
}

/// Parse a defaulted argument into `T`.
pub fn parse_value<T: FromStr>(args: &ArgMatches, name: &str) -> Result<T, LoopError> {
    let value = required(args, name)?;
    value.trim().parse::<T>().map_err(|_| {
        LoopError::InvalidSettings(format!("invalid value `{}` for --{}", value, name))
    })
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String, LoopError> {
    args.get_one::<String>(name)
        .ok_or_else(|| LoopError::InvalidSettings(format!("missing --{}", name)))
}
