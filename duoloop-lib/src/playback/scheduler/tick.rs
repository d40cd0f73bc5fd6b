//! Per-frame monitoring step.
//!
//! Each frame first advances a running blend, then samples the active
//! instance and decides whether a hand-off is due.

use std::time::Instant;

use log::warn;

use crate::playback::instance::PlaybackInstance;
use crate::tools::timer::duration_to_ms;

use super::{LoopScheduler, SchedulerEvent};

impl<I: PlaybackInstance> LoopScheduler<I> {
    /// Run one frame of the loop.
    ///
    /// Call once per display refresh with the frame timestamp. Variable,
    /// delayed, or skipped frames are fine; the decision only depends on the
    /// instance's own play head and on `now` for blend progress.
    ///
    /// # Returns
    ///
    /// Events produced by this frame, in order. A
    /// [`SchedulerEvent::RetirementScheduled`] asks the host to call
    /// [`LoopScheduler::retire`] after the ticket's delay.
    pub fn frame(&mut self, now: Instant) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        if !self.attached {
            return events;
        }

        self.step_blend(now, &mut events);
        self.tick(now, &mut events);
        self.refresh_state_snapshot();

        events
    }

    /// Monitoring tick: publish timing and trigger a hand-off at the threshold.
    fn tick(&mut self, now: Instant, events: &mut Vec<SchedulerEvent>) {
        let active = self.instance(self.active);

        // Unready media defers the decision to a later frame.
        let duration = match active.duration() {
            Some(duration) if !duration.is_zero() => duration,
            _ => return,
        };
        if !active.is_playing() {
            return;
        }

        let duration_ms = duration_to_ms(duration);
        let position_ms = duration_to_ms(active.position());
        let remaining_ms = duration_ms - position_ms;

        let (threshold_ms, clamped) = self.settings.effective_threshold_ms(duration_ms);
        if clamped && !self.threshold_clamp_logged {
            warn!(
                "trigger threshold {}ms does not fit the {}ms clip, using {}ms",
                self.settings.trigger_threshold_ms(),
                duration_ms,
                threshold_ms
            );
            self.threshold_clamp_logged = true;
        }

        self.snapshot.total_duration_ms = duration_ms;
        self.snapshot.position_ms = position_ms;
        self.snapshot.remaining_ms = remaining_ms;
        self.snapshot.threshold_ms = threshold_ms;

        if remaining_ms <= threshold_ms && !self.swap_in_flight {
            self.begin_handoff(now, remaining_ms, threshold_ms, events);
        }
    }
}
