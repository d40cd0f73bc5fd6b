//! Hand-off and retirement.
//!
//! Instant hand-offs swap visual weight within a single frame. Blended
//! hand-offs reveal the incoming instance underneath at full weight and fade
//! only the outgoing layer, so the combined weight never dips. Either way the
//! outgoing instance is retired after the settle delay.

use std::time::{Duration, Instant};

use log::debug;

use crate::playback::instance::{InstanceId, PlaybackInstance};

use super::{Blend, HandoffKind, LoopScheduler, RetireTicket, SchedulerEvent};

impl<I: PlaybackInstance> LoopScheduler<I> {
    /// Start a hand-off from the active instance to the standby.
    pub(super) fn begin_handoff(
        &mut self,
        now: Instant,
        remaining_ms: f64,
        threshold_ms: f64,
        events: &mut Vec<SchedulerEvent>,
    ) {
        if self.swap_in_flight {
            return;
        }
        self.swap_in_flight = true;

        let outgoing = self.active;
        let incoming = outgoing.other();
        let kind = if self.settings.is_blended() {
            HandoffKind::Blended
        } else {
            HandoffKind::Instant
        };

        debug!(
            "starting {:?} hand-off {} -> {} at {:.0}ms remaining (cutover: {}ms, fade: {}ms)",
            kind,
            outgoing,
            incoming,
            remaining_ms,
            self.settings.cutover_offset_ms,
            self.settings.crossfade_duration_ms
        );
        events.push(SchedulerEvent::HandoffStarted {
            from: outgoing,
            to: incoming,
            kind,
            remaining_ms,
            threshold_ms,
        });

        // The standby is already rewound; it only needs to start.
        self.instance_mut(incoming).play();

        match kind {
            HandoffKind::Instant => {
                self.instance_mut(outgoing).set_visual_weight(0.0);
                self.instance_mut(incoming).set_visual_weight(1.0);
                self.complete_swap(outgoing, events);
            }
            HandoffKind::Blended => {
                self.instance_mut(incoming).set_visual_weight(1.0);
                self.blend = Some(Blend {
                    outgoing,
                    started_at: now,
                    duration: self.settings.crossfade_duration(),
                    progress: 0.0,
                });
            }
        }
    }

    /// Advance a running blend to `now`.
    ///
    /// Only the outgoing weight moves, following `1 - progress`. When the
    /// blend reaches the end of its window the swap completes.
    pub(super) fn step_blend(&mut self, now: Instant, events: &mut Vec<SchedulerEvent>) {
        let Some(mut blend) = self.blend else {
            return;
        };

        let elapsed = now.saturating_duration_since(blend.started_at);
        blend.progress = blend_progress(elapsed, blend.duration);
        self.instance_mut(blend.outgoing)
            .set_visual_weight(1.0 - blend.progress);

        if blend.progress < 1.0 {
            self.blend = Some(blend);
            return;
        }

        self.blend = None;
        events.push(SchedulerEvent::BlendCompleted {
            from: blend.outgoing,
            to: blend.outgoing.other(),
        });
        self.complete_swap(blend.outgoing, events);
    }

    /// Flip the active identity and schedule retirement of `outgoing`.
    fn complete_swap(&mut self, outgoing: InstanceId, events: &mut Vec<SchedulerEvent>) {
        self.active = outgoing.other();
        self.cycles += 1;

        let ticket = RetireTicket {
            generation: self.generation,
            instance: outgoing,
            cycle: self.cycles,
            delay_ms: self.settings.settle_delay_ms,
        };
        self.pending_retirement = Some(ticket);
        events.push(SchedulerEvent::RetirementScheduled(ticket));
    }

    /// Pause, rewind and hide a retired instance, then clear the hand-off
    /// guard.
    ///
    /// Tickets from another generation, already honoured tickets, and any
    /// ticket delivered after [`detach`](Self::detach) are ignored.
    ///
    /// # Returns
    ///
    /// A [`SchedulerEvent::Retired`] when the ticket was applied.
    pub fn retire(&mut self, ticket: RetireTicket) -> Option<SchedulerEvent> {
        if !self.attached {
            debug!(
                "ignoring retirement of {} after detach (generation {})",
                ticket.instance, ticket.generation
            );
            return None;
        }
        if ticket.generation != self.generation || self.pending_retirement != Some(ticket) {
            debug!(
                "ignoring stale retirement of {} (generation {}, cycle {})",
                ticket.instance, ticket.generation, ticket.cycle
            );
            return None;
        }

        let retired = self.instance_mut(ticket.instance);
        retired.pause();
        retired.set_position(Duration::ZERO);
        retired.set_visual_weight(0.0);

        self.pending_retirement = None;
        self.swap_in_flight = false;
        self.refresh_state_snapshot();

        debug!("retired {} after cycle {}", ticket.instance, ticket.cycle);
        Some(SchedulerEvent::Retired {
            instance: ticket.instance,
            cycle: ticket.cycle,
        })
    }
}

/// Fraction of the blend window covered by `elapsed`, in `0.0..=1.0`.
fn blend_progress(elapsed: Duration, window: Duration) -> f32 {
    if window.is_zero() {
        return 1.0;
    }
    (elapsed.as_nanos() as f64 / window.as_nanos() as f64).min(1.0) as f32
}
