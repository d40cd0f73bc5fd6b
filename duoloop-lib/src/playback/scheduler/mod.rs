//! Dual-buffer loop scheduler.
//!
//! Owns two instances of the same source and hands playback from the active
//! one to the standby one shortly before the active one ends, either with an
//! instant swap or by fading the outgoing layer over the incoming one. The
//! scheduler is a pure state machine: the host calls [`LoopScheduler::frame`]
//! once per display frame and [`LoopScheduler::retire`] when a settle timer
//! fires. It never sleeps, spawns, or reads the clock itself.
//!
//! - [`tick`] holds the per-frame monitoring step.
//! - [`handoff`] performs instant and blended swaps and retirement.
//! - [`settings`] defines the timing configuration.
//! - [`snapshot`] defines the published state and scheduler events.

mod handoff;
pub mod settings;
pub mod snapshot;
mod tick;

use std::time::{Duration, Instant};

use log::info;

use crate::playback::instance::{InstanceId, ObjectFit, PlaybackInstance};

pub use settings::LoopSettings;
pub use snapshot::{HandoffKind, LoopPhase, LoopSnapshot, RetireTicket, SchedulerEvent};

/// In-progress fade of the outgoing instance.
#[derive(Debug, Clone, Copy)]
struct Blend {
    outgoing: InstanceId,
    started_at: Instant,
    duration: Duration,
    progress: f32,
}

/// State machine alternating two playback instances into a seamless loop.
pub struct LoopScheduler<I: PlaybackInstance> {
    instances: [I; 2],
    active: InstanceId,
    swap_in_flight: bool,
    settings: LoopSettings,
    blend: Option<Blend>,
    pending_retirement: Option<RetireTicket>,
    generation: u64,
    cycles: u64,
    attached: bool,
    threshold_clamp_logged: bool,
    snapshot: LoopSnapshot,
}

impl<I: PlaybackInstance> LoopScheduler<I> {
    /// Take ownership of both instances and start looping.
    ///
    /// `a` becomes the active instance and starts playing; `b` is rewound,
    /// paused and hidden as the standby. `generation` identifies this
    /// scheduler to deferred callbacks.
    ///
    /// # Arguments
    ///
    /// * `a` - Instance that plays first.
    /// * `b` - Standby instance bound to the same source.
    /// * `settings` - Timing configuration. Out-of-range values are clamped.
    /// * `generation` - Identifier stamped on every retirement ticket.
    pub fn attach(a: I, b: I, settings: LoopSettings, generation: u64) -> Self {
        let settings = settings.sanitized();
        let mut instances = [a, b];

        for instance in instances.iter_mut() {
            instance.set_object_fit(settings.object_fit);
        }

        let standby = &mut instances[InstanceId::B.index()];
        standby.pause();
        standby.set_position(Duration::ZERO);
        standby.set_visual_weight(0.0);

        let active = &mut instances[InstanceId::A.index()];
        active.set_visual_weight(1.0);
        active.play();

        info!(
            "loop scheduler attached (generation {}, cutover {}ms, crossfade {}ms)",
            generation, settings.cutover_offset_ms, settings.crossfade_duration_ms
        );

        let mut this = Self {
            instances,
            active: InstanceId::A,
            swap_in_flight: false,
            settings,
            blend: None,
            pending_retirement: None,
            generation,
            cycles: 0,
            attached: true,
            threshold_clamp_logged: false,
            snapshot: LoopSnapshot::initial(&settings, generation),
        };
        this.refresh_state_snapshot();
        this
    }

    /// Stop scheduling.
    ///
    /// Drops any in-flight blend and forgets the pending retirement so a
    /// settle timer that fires later is a no-op. Instances are left as they
    /// are.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.blend = None;
        self.pending_retirement = None;
        info!("loop scheduler detached (generation {})", self.generation);
    }

    /// Forward a new fit mode to both instances. Scheduling is unaffected.
    pub fn set_object_fit(&mut self, fit: ObjectFit) {
        self.settings.object_fit = fit;
        for instance in self.instances.iter_mut() {
            instance.set_object_fit(fit);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Instance currently driving the visible loop.
    pub fn active_id(&self) -> InstanceId {
        self.active
    }

    pub fn standby_id(&self) -> InstanceId {
        self.active.other()
    }

    /// Whether a hand-off has started and its retirement has not completed.
    pub fn swap_in_flight(&self) -> bool {
        self.swap_in_flight
    }

    pub fn phase(&self) -> LoopPhase {
        if self.swap_in_flight {
            LoopPhase::HandingOff
        } else {
            LoopPhase::Steady
        }
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Completed swaps since attach.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn instance(&self, id: InstanceId) -> &I {
        &self.instances[id.index()]
    }

    pub fn pending_retirement(&self) -> Option<RetireTicket> {
        self.pending_retirement
    }

    /// Progress of the running blend in `0.0..=1.0`, if one is running.
    pub fn blend_progress(&self) -> Option<f32> {
        self.blend.map(|blend| blend.progress)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> LoopSnapshot {
        self.snapshot
    }

    fn instance_mut(&mut self, id: InstanceId) -> &mut I {
        &mut self.instances[id.index()]
    }

    /// Copy state-machine fields into the snapshot. Timing fields are only
    /// updated by ready ticks.
    fn refresh_state_snapshot(&mut self) {
        self.snapshot.active_instance_id = self.active;
        self.snapshot.phase = self.phase();
        self.snapshot.swap_in_flight = self.swap_in_flight;
        self.snapshot.blend_progress = self.blend_progress();
        self.snapshot.weights = [
            self.instances[0].visual_weight(),
            self.instances[1].visual_weight(),
        ];
        self.snapshot.cycles = self.cycles;
        self.snapshot.attached = self.attached;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{LoopScheduler, LoopSettings};
    use crate::playback::simulated::SimulatedInstance;
    use crate::tools::clock::ManualClock;

    pub(crate) fn scheduler(
        duration_ms: u64,
        settings: LoopSettings,
    ) -> (ManualClock, LoopScheduler<SimulatedInstance>) {
        let clock = ManualClock::new();
        let duration = Duration::from_millis(duration_ms);
        let a = SimulatedInstance::new("clip.mp4", duration, Arc::new(clock.clone()));
        let b = SimulatedInstance::new("clip.mp4", duration, Arc::new(clock.clone()));
        (clock, LoopScheduler::attach(a, b, settings, 1))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::fixtures::scheduler;
    use super::*;

    #[test]
    fn attach_primes_standby_and_plays_active() {
        let (_clock, sched) = scheduler(5000, LoopSettings::default());
        assert_eq!(sched.active_id(), InstanceId::A);
        assert_eq!(sched.phase(), LoopPhase::Steady);

        let a = sched.instance(InstanceId::A);
        let b = sched.instance(InstanceId::B);
        assert!(a.is_playing());
        assert_eq!(a.visual_weight(), 1.0);
        assert!(!b.is_playing());
        assert_eq!(b.position(), Duration::ZERO);
        assert_eq!(b.visual_weight(), 0.0);
    }

    #[test]
    fn attach_forwards_object_fit() {
        let settings = LoopSettings::default().with_object_fit(ObjectFit::Contain);
        let (_clock, sched) = scheduler(5000, settings);
        assert_eq!(sched.instance(InstanceId::A).object_fit(), ObjectFit::Contain);
        assert_eq!(sched.instance(InstanceId::B).object_fit(), ObjectFit::Contain);
    }

    #[test]
    fn object_fit_change_leaves_timing_alone() {
        let (clock, mut sched) = scheduler(5000, LoopSettings::default());
        clock.advance(Duration::from_millis(250));
        sched.set_object_fit(ObjectFit::Fill);
        assert_eq!(sched.instance(InstanceId::B).object_fit(), ObjectFit::Fill);
        assert_eq!(
            sched.instance(InstanceId::A).position(),
            Duration::from_millis(250)
        );
        assert_eq!(sched.active_id(), InstanceId::A);
    }

    #[test]
    fn detach_is_idempotent() {
        let (_clock, mut sched) = scheduler(5000, LoopSettings::default());
        sched.detach();
        sched.detach();
        assert!(!sched.is_attached());
    }
}
