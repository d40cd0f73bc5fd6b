//! Shared constants for loop scheduling defaults.

/// Default lead time (ms) before the natural end at which a hand-off begins.
pub const DEFAULT_CUTOVER_OFFSET_MS: f64 = 1000.0;

/// Default blend window (ms). `0` selects an instant swap.
pub const DEFAULT_CROSSFADE_DURATION_MS: f64 = 0.0;

/// Default pause (ms) between a visual swap and retiring the outgoing instance.
///
/// Long enough for the compositor to present the swapped frame before the
/// retired instance is paused and rewound.
pub const DEFAULT_SETTLE_DELAY_MS: f64 = 100.0;

/// Default frame pump rate (Hz).
pub const DEFAULT_FRAME_RATE_HZ: f64 = 60.0;

/// Fraction of the clip used as the trigger threshold when the configured
/// cutover and blend window are as long as the clip itself.
pub const MAX_THRESHOLD_FRACTION: f64 = 0.5;
