//! Clock-driven stand-in for a real media player.
//!
//! Used by the simulation harness, the CLI, and tests. The play head advances
//! with the supplied [`Clock`] while playing, stops at the end of the clip, and
//! can hide its duration until a simulated metadata load completes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::playback::instance::{ObjectFit, PlaybackInstance};
use crate::tools::clock::Clock;
use crate::tools::timer::Timer;

/// Simulated playback instance.
#[derive(Clone)]
pub struct SimulatedInstance {
    source: String,
    clock: Arc<dyn Clock>,
    timer: Timer,
    duration: Duration,
    metadata_ready_at: Instant,
    visual_weight: f32,
    object_fit: ObjectFit,
}

impl std::fmt::Debug for SimulatedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedInstance")
            .field("source", &self.source)
            .field("timer", &self.timer)
            .field("duration", &self.duration)
            .field("visual_weight", &self.visual_weight)
            .field("object_fit", &self.object_fit)
            .finish()
    }
}

impl SimulatedInstance {
    /// Create an instance whose metadata is available immediately.
    pub fn new(source: &str, duration: Duration, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            source: source.to_string(),
            clock,
            timer: Timer::new(),
            duration,
            metadata_ready_at: now,
            visual_weight: 0.0,
            object_fit: ObjectFit::default(),
        }
    }

    /// Delay the metadata load by `delay` from now.
    ///
    /// Until then `duration()` is `None` and the play head stays at zero even
    /// if `play` was called.
    pub fn with_metadata_delay(mut self, delay: Duration) -> Self {
        self.metadata_ready_at = self.clock.now() + delay;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn object_fit(&self) -> ObjectFit {
        self.object_fit
    }

    fn metadata_loaded(&self, now: Instant) -> bool {
        now >= self.metadata_ready_at
    }

    fn ended(&self, now: Instant) -> bool {
        self.timer.get_time(now) >= self.duration
    }
}

impl PlaybackInstance for SimulatedInstance {
    fn position(&self) -> Duration {
        let now = self.clock.now();
        if !self.metadata_loaded(now) {
            return Duration::ZERO;
        }
        self.timer.get_time(now).min(self.duration)
    }

    fn duration(&self) -> Option<Duration> {
        if self.metadata_loaded(self.clock.now()) {
            Some(self.duration)
        } else {
            None
        }
    }

    fn is_playing(&self) -> bool {
        let now = self.clock.now();
        self.timer.is_running() && self.metadata_loaded(now) && !self.ended(now)
    }

    fn play(&mut self) {
        let now = self.clock.now();
        if self.metadata_loaded(now) && self.ended(now) {
            // Media elements restart from zero when played after ending.
            self.timer.reset();
        }
        // Playback requested before metadata begins once it arrives.
        let start = now.max(self.metadata_ready_at);
        self.timer.un_pause(start);
    }

    fn pause(&mut self) {
        let now = self.clock.now();
        let ended_at = self.duration;
        self.timer.pause(now.max(self.metadata_ready_at));
        if self.timer.time > ended_at {
            self.timer.time = ended_at;
        }
    }

    fn set_position(&mut self, position: Duration) {
        let now = self.clock.now();
        let start = now.max(self.metadata_ready_at);
        self.timer.set_time(start, position.min(self.duration));
    }

    fn visual_weight(&self) -> f32 {
        self.visual_weight
    }

    fn set_visual_weight(&mut self, weight: f32) {
        self.visual_weight = if weight.is_finite() {
            weight.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn set_object_fit(&mut self, fit: ObjectFit) {
        self.object_fit = fit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::clock::ManualClock;

    fn instance(clock: &ManualClock, duration_ms: u64) -> SimulatedInstance {
        SimulatedInstance::new(
            "clip.mp4",
            Duration::from_millis(duration_ms),
            Arc::new(clock.clone()),
        )
    }

    #[test]
    fn position_advances_only_while_playing() {
        let clock = ManualClock::new();
        let mut inst = instance(&clock, 5000);
        clock.advance(Duration::from_millis(200));
        assert_eq!(inst.position(), Duration::ZERO);
        assert!(!inst.is_playing());

        inst.play();
        clock.advance(Duration::from_millis(300));
        assert_eq!(inst.position(), Duration::from_millis(300));
        assert!(inst.is_playing());

        inst.pause();
        clock.advance(Duration::from_millis(300));
        assert_eq!(inst.position(), Duration::from_millis(300));
        assert!(!inst.is_playing());
    }

    #[test]
    fn stops_at_end_of_clip() {
        let clock = ManualClock::new();
        let mut inst = instance(&clock, 1000);
        inst.play();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(inst.position(), Duration::from_millis(1000));
        assert!(!inst.is_playing());
    }

    #[test]
    fn play_after_end_restarts_from_zero() {
        let clock = ManualClock::new();
        let mut inst = instance(&clock, 1000);
        inst.play();
        clock.advance(Duration::from_millis(1200));
        inst.play();
        clock.advance(Duration::from_millis(100));
        assert_eq!(inst.position(), Duration::from_millis(100));
        assert!(inst.is_playing());
    }

    #[test]
    fn metadata_delay_hides_duration_and_holds_play_head() {
        let clock = ManualClock::new();
        let mut inst = instance(&clock, 4000).with_metadata_delay(Duration::from_millis(250));
        inst.play();
        clock.advance(Duration::from_millis(100));
        assert_eq!(inst.duration(), None);
        assert_eq!(inst.position(), Duration::ZERO);
        assert!(!inst.is_playing());

        clock.advance(Duration::from_millis(250));
        assert_eq!(inst.duration(), Some(Duration::from_millis(4000)));
        assert_eq!(inst.position(), Duration::from_millis(100));
        assert!(inst.is_playing());
    }

    #[test]
    fn rewind_while_playing_keeps_playing() {
        let clock = ManualClock::new();
        let mut inst = instance(&clock, 3000);
        inst.play();
        clock.advance(Duration::from_millis(900));
        inst.set_position(Duration::ZERO);
        clock.advance(Duration::from_millis(40));
        assert_eq!(inst.position(), Duration::from_millis(40));
    }

    #[test]
    fn visual_weight_is_clamped() {
        let clock = ManualClock::new();
        let mut inst = instance(&clock, 3000);
        inst.set_visual_weight(1.7);
        assert_eq!(inst.visual_weight(), 1.0);
        inst.set_visual_weight(f32::NAN);
        assert_eq!(inst.visual_weight(), 0.0);
    }
}
