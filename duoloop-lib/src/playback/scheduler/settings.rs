//! Loop timing configuration.
//!
//! Values are milliseconds. Negative or non-finite inputs are clamped to zero
//! on every entry point so the timing math never sees them.

use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CROSSFADE_DURATION_MS, DEFAULT_CUTOVER_OFFSET_MS, DEFAULT_SETTLE_DELAY_MS,
    MAX_THRESHOLD_FRACTION,
};
use crate::error::LoopError;
use crate::playback::instance::ObjectFit;
use crate::tools::timer::ms_to_duration;

/// Serialized configuration for one looped source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    /// Lead time before the natural end at which the hand-off begins.
    pub cutover_offset_ms: f64,
    /// Blend window. `0` swaps instantly.
    pub crossfade_duration_ms: f64,
    /// Pause between the visual swap and retiring the outgoing instance.
    pub settle_delay_ms: f64,
    /// Forwarded to both instances; no effect on scheduling.
    pub object_fit: ObjectFit,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            cutover_offset_ms: DEFAULT_CUTOVER_OFFSET_MS,
            crossfade_duration_ms: DEFAULT_CROSSFADE_DURATION_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            object_fit: ObjectFit::default(),
        }
    }
}

impl LoopSettings {
    /// Create settings with the given cutover and blend window.
    pub fn new(cutover_offset_ms: f64, crossfade_duration_ms: f64) -> Self {
        Self {
            cutover_offset_ms: clamp_ms(cutover_offset_ms),
            crossfade_duration_ms: clamp_ms(crossfade_duration_ms),
            ..Self::default()
        }
    }

    pub fn with_settle_delay_ms(mut self, ms: f64) -> Self {
        self.settle_delay_ms = clamp_ms(ms);
        self
    }

    pub fn with_object_fit(mut self, fit: ObjectFit) -> Self {
        self.object_fit = fit;
        self
    }

    pub fn set_cutover_offset_ms(&mut self, ms: f64) {
        self.cutover_offset_ms = clamp_ms(ms);
    }

    pub fn set_crossfade_duration_ms(&mut self, ms: f64) {
        self.crossfade_duration_ms = clamp_ms(ms);
    }

    pub fn set_settle_delay_ms(&mut self, ms: f64) {
        self.settle_delay_ms = clamp_ms(ms);
    }

    /// Return a copy with every timing value clamped into range.
    ///
    /// Logs a warning for each value that had to be changed.
    pub fn sanitized(self) -> Self {
        let fields = [
            ("cutover_offset_ms", self.cutover_offset_ms),
            ("crossfade_duration_ms", self.crossfade_duration_ms),
            ("settle_delay_ms", self.settle_delay_ms),
        ];
        for (name, value) in fields {
            if clamp_ms(value) != value {
                warn!("{} = {} is out of range, clamping to 0", name, value);
            }
        }

        Self {
            cutover_offset_ms: clamp_ms(self.cutover_offset_ms),
            crossfade_duration_ms: clamp_ms(self.crossfade_duration_ms),
            settle_delay_ms: clamp_ms(self.settle_delay_ms),
            object_fit: self.object_fit,
        }
    }

    /// Whether hand-offs blend instead of swapping instantly.
    pub fn is_blended(&self) -> bool {
        self.crossfade_duration_ms > 0.0
    }

    /// Remaining time (ms) at which a hand-off triggers.
    ///
    /// A blend starts half a window early so its midpoint lands on the
    /// cutover instant.
    pub fn trigger_threshold_ms(&self) -> f64 {
        if self.is_blended() {
            self.cutover_offset_ms + self.crossfade_duration_ms / 2.0
        } else {
            self.cutover_offset_ms
        }
    }

    /// Trigger threshold for a clip of `duration_ms`.
    ///
    /// A threshold inside the clip is used as is. One that reaches the whole
    /// clip would fire on the first frame of every cycle, so it falls back to
    /// [`MAX_THRESHOLD_FRACTION`] of the clip. The second value is `true` when
    /// the fallback applied.
    pub fn effective_threshold_ms(&self, duration_ms: f64) -> (f64, bool) {
        let threshold = self.trigger_threshold_ms();
        let duration_ms = duration_ms.max(0.0);
        if threshold >= duration_ms {
            (duration_ms * MAX_THRESHOLD_FRACTION, true)
        } else {
            (threshold, false)
        }
    }

    pub fn crossfade_duration(&self) -> Duration {
        ms_to_duration(self.crossfade_duration_ms)
    }

    /// Parse settings from a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, LoopError> {
        let settings: LoopSettings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoopError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, LoopError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a millisecond value supplied as text (CLI flags, env).
pub fn parse_ms(name: &str, value: &str) -> Result<f64, LoopError> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|_| LoopError::InvalidSettings(format!("{} must be a number, got `{}`", name, value)))?;
    if !parsed.is_finite() {
        return Err(LoopError::InvalidSettings(format!(
            "{} must be finite, got `{}`",
            name, value
        )));
    }
    Ok(clamp_ms(parsed))
}

fn clamp_ms(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
