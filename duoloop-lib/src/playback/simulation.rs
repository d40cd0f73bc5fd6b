//! Deterministic frame-pump simulation.
//!
//! Drives a [`LoopScheduler`] over two [`SimulatedInstance`]s on a
//! [`ManualClock`]. Frames arrive at a fixed interval with optional seeded
//! jitter and dropped frames; settle timers live in their own queue and fire
//! at their due time independently of the frame cadence, the way a host
//! timer would.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::constants::DEFAULT_FRAME_RATE_HZ;
use crate::playback::instance::InstanceId;
use crate::playback::scheduler::{LoopScheduler, LoopSettings, RetireTicket, SchedulerEvent};
use crate::playback::simulated::SimulatedInstance;
use crate::tools::clock::{Clock, ManualClock};
use crate::tools::timer::{duration_to_ms, ms_to_duration};

/// Shortest frame interval a simulated host produces.
const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Parameters for a simulated run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub clip_duration_ms: f64,
    pub frame_interval: Duration,
    /// Maximum absolute deviation (ms) applied to each frame interval.
    /// Non-finite values disable jitter.
    pub jitter_ms: f64,
    /// Probability in `0.0..=1.0` that a frame is dropped.
    pub drop_probability: f64,
    /// Delay before either instance reports its duration.
    pub metadata_delay_ms: f64,
    pub seed: u64,
}

impl SimulationConfig {
    /// Copy with every field pulled into a range the harness can run.
    ///
    /// The frame interval is at least one millisecond so simulated time always
    /// moves forward.
    pub fn sanitized(self) -> Self {
        let finite_or_zero = |value: f64| if value.is_finite() { value.max(0.0) } else { 0.0 };
        let drop_probability = if self.drop_probability.is_finite() {
            self.drop_probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            clip_duration_ms: finite_or_zero(self.clip_duration_ms),
            frame_interval: self.frame_interval.max(MIN_FRAME_INTERVAL),
            jitter_ms: finite_or_zero(self.jitter_ms),
            drop_probability,
            metadata_delay_ms: finite_or_zero(self.metadata_delay_ms),
            seed: self.seed,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clip_duration_ms: 10_000.0,
            frame_interval: Duration::from_secs_f64(1.0 / DEFAULT_FRAME_RATE_HZ),
            jitter_ms: 0.0,
            drop_probability: 0.0,
            metadata_delay_ms: 0.0,
            seed: 0,
        }
    }
}

/// A scheduler event stamped with simulated time since start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedEvent {
    pub at_ms: f64,
    #[serde(flatten)]
    pub event: SchedulerEvent,
}

/// Simulated host running one loop scheduler.
pub struct Simulation {
    clock: ManualClock,
    started_at: Instant,
    next_frame_at: Instant,
    scheduler: LoopScheduler<SimulatedInstance>,
    timers: Vec<(Instant, RetireTicket)>,
    rng: StdRng,
    config: SimulationConfig,
    log: Vec<TimedEvent>,
    frames: u64,
    dropped_frames: u64,
}

impl Simulation {
    /// Build both instances for `source` and attach a scheduler.
    pub fn new(source: &str, settings: LoopSettings, config: SimulationConfig) -> Self {
        let config = config.sanitized();
        let clock = ManualClock::new();
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let duration = ms_to_duration(config.clip_duration_ms);
        let metadata_delay = ms_to_duration(config.metadata_delay_ms);

        let a = SimulatedInstance::new(source, duration, shared.clone())
            .with_metadata_delay(metadata_delay);
        let b = SimulatedInstance::new(source, duration, shared).with_metadata_delay(metadata_delay);

        let started_at = clock.now();
        Self {
            scheduler: LoopScheduler::attach(a, b, settings, 1),
            clock,
            started_at,
            next_frame_at: started_at,
            timers: Vec::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            log: Vec::new(),
            frames: 0,
            dropped_frames: 0,
        }
    }

    pub fn scheduler(&self) -> &LoopScheduler<SimulatedInstance> {
        &self.scheduler
    }

    /// Every event recorded so far.
    pub fn events(&self) -> &[TimedEvent] {
        &self.log
    }

    pub fn elapsed_ms(&self) -> f64 {
        duration_to_ms(self.clock.now().saturating_duration_since(self.started_at))
    }

    /// Frames delivered to the scheduler.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Settle timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Hand-offs started so far.
    pub fn handoffs(&self) -> Vec<TimedEvent> {
        self.log
            .iter()
            .copied()
            .filter(|timed| matches!(timed.event, SchedulerEvent::HandoffStarted { .. }))
            .collect()
    }

    /// Active instance after each completed swap, starting with the first.
    pub fn active_sequence(&self) -> Vec<InstanceId> {
        let mut sequence = vec![InstanceId::A];
        for timed in &self.log {
            if let SchedulerEvent::RetirementScheduled(ticket) = timed.event {
                sequence.push(ticket.instance.other());
            }
        }
        sequence
    }

    /// Detach the scheduler, leaving queued settle timers in place.
    pub fn detach(&mut self) {
        self.scheduler.detach();
    }

    /// Advance to the next frame, firing any settle timers due before it.
    ///
    /// # Returns
    ///
    /// Events recorded during this step.
    pub fn step(&mut self) -> Vec<TimedEvent> {
        let first_new = self.log.len();
        let frame_at = self.next_frame_at + self.next_interval();
        self.next_frame_at = frame_at;

        self.fire_timers_until(frame_at);
        self.clock.advance_to(frame_at);

        if self.config.drop_probability > 0.0 && self.rng.gen_bool(self.config.drop_probability)
        {
            self.dropped_frames += 1;
            return self.log[first_new..].to_vec();
        }

        self.frames += 1;
        let events = self.scheduler.frame(frame_at);
        for event in events {
            if let SchedulerEvent::RetirementScheduled(ticket) = event {
                let due = frame_at + ms_to_duration(ticket.delay_ms);
                self.timers.push((due, ticket));
            }
            self.record(event);
        }

        self.log[first_new..].to_vec()
    }

    /// Run frames until `span` of simulated time has passed.
    pub fn run_for(&mut self, span: Duration) {
        let until = self.clock.now() + span;
        while self.clock.now() < until {
            self.step();
        }
    }

    /// Run until `count` hand-offs have started or `limit` has passed.
    ///
    /// # Returns
    ///
    /// `true` if the requested number of hand-offs was reached.
    pub fn run_until_handoffs(&mut self, count: usize, limit: Duration) -> bool {
        let until = self.clock.now() + limit;
        while self.handoffs().len() < count {
            if self.clock.now() >= until {
                return false;
            }
            self.step();
        }
        true
    }

    fn next_interval(&mut self) -> Duration {
        let base_ms = duration_to_ms(self.config.frame_interval);
        if self.config.jitter_ms <= 0.0 {
            return self.config.frame_interval;
        }
        let jitter = self
            .rng
            .gen_range(-self.config.jitter_ms..=self.config.jitter_ms);
        ms_to_duration(base_ms + jitter).max(MIN_FRAME_INTERVAL)
    }

    /// Fire timers due at or before `until`, earliest first.
    fn fire_timers_until(&mut self, until: Instant) {
        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, (due, _))| *due <= until)
                .min_by_key(|(_, (due, _))| *due)
                .map(|(idx, _)| idx);
            let Some(idx) = next else {
                break;
            };

            let (due, ticket) = self.timers.remove(idx);
            self.clock.advance_to(due);
            match self.scheduler.retire(ticket) {
                Some(event) => self.record(event),
                None => debug!("settle timer for {} fired without effect", ticket.instance),
            }
        }
    }

    fn record(&mut self, event: SchedulerEvent) {
        let at_ms = self.elapsed_ms();
        self.log.push(TimedEvent { at_ms, event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::instance::PlaybackInstance;
    use crate::playback::scheduler::HandoffKind;

    fn config(clip_ms: f64, frame_ms: u64) -> SimulationConfig {
        SimulationConfig {
            clip_duration_ms: clip_ms,
            frame_interval: Duration::from_millis(frame_ms),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn ten_second_clip_alternates_a_b_a() {
        let settings = LoopSettings::new(1000.0, 0.0);
        let mut sim = Simulation::new("clip.mp4", settings, config(10_000.0, 16));
        assert!(sim.run_until_handoffs(2, Duration::from_secs(25)));
        sim.run_for(Duration::from_millis(200));

        let handoffs = sim.handoffs();
        for timed in &handoffs {
            let SchedulerEvent::HandoffStarted { remaining_ms, .. } = timed.event else {
                unreachable!();
            };
            assert!(remaining_ms <= 1000.0 && remaining_ms > 1000.0 - 16.0);
        }
        assert!((handoffs[0].at_ms - 9000.0).abs() <= 16.0);
        assert!((handoffs[1].at_ms - 18_000.0).abs() <= 32.0);

        assert_eq!(
            sim.active_sequence(),
            vec![InstanceId::A, InstanceId::B, InstanceId::A]
        );
        let retired = sim
            .events()
            .iter()
            .filter(|timed| matches!(timed.event, SchedulerEvent::Retired { .. }))
            .count();
        assert_eq!(retired, 2);
    }

    #[test]
    fn detach_with_pending_timer_is_quiet() {
        let settings = LoopSettings::new(500.0, 0.0).with_settle_delay_ms(100.0);
        let mut sim = Simulation::new("clip.mp4", settings, config(2000.0, 10));
        assert!(sim.run_until_handoffs(1, Duration::from_secs(5)));
        assert_eq!(sim.pending_timers(), 1);

        sim.detach();
        let logged = sim.events().len();
        sim.run_for(Duration::from_millis(200));

        assert_eq!(sim.pending_timers(), 0);
        assert_eq!(sim.events().len(), logged);
        let outgoing = sim.scheduler().instance(InstanceId::A);
        assert_eq!(outgoing.visual_weight(), 0.0);
        assert!(outgoing.is_playing());
        assert!(outgoing.position() > Duration::ZERO);
    }

    #[test]
    fn timers_fire_independently_of_frames() {
        let settings = LoopSettings::new(1000.0, 0.0).with_settle_delay_ms(25.0);
        let mut sim = Simulation::new("clip.mp4", settings, config(2000.0, 10));
        assert!(sim.run_until_handoffs(1, Duration::from_secs(5)));
        assert_eq!(sim.pending_timers(), 1);

        sim.run_for(Duration::from_millis(30));
        let retired = sim
            .events()
            .iter()
            .find(|timed| matches!(timed.event, SchedulerEvent::Retired { .. }))
            .expect("retired");
        assert_eq!(retired.at_ms, 1025.0);
        assert_eq!(sim.pending_timers(), 0);
    }

    #[test]
    fn jitter_is_reproducible_from_seed() {
        let settings = LoopSettings::new(500.0, 0.0);
        let cfg = SimulationConfig {
            jitter_ms: 6.0,
            drop_probability: 0.1,
            seed: 7,
            ..config(3000.0, 16)
        };
        let mut first = Simulation::new("clip.mp4", settings, cfg);
        let mut second = Simulation::new("clip.mp4", settings, cfg);
        first.run_for(Duration::from_secs(7));
        second.run_for(Duration::from_secs(7));
        assert_eq!(first.events(), second.events());
        assert!(first.dropped_frames() > 0);
    }

    #[test]
    fn standby_is_primed_between_handoffs() {
        let settings = LoopSettings::new(800.0, 0.0);
        let mut sim = Simulation::new("clip.mp4", settings, config(3000.0, 16));
        for _ in 0..1000 {
            sim.step();
            let sched = sim.scheduler();
            if !sched.swap_in_flight() {
                let standby = sched.instance(sched.standby_id());
                assert!(!standby.is_playing());
                assert_eq!(standby.position(), Duration::ZERO);
                assert_eq!(standby.visual_weight(), 0.0);
            }
        }
        assert!(sim.handoffs().len() >= 4);
    }

    #[test]
    fn blended_handoffs_retire_and_alternate() {
        let settings = LoopSettings::new(800.0, 400.0).with_settle_delay_ms(100.0);
        let mut sim = Simulation::new("clip.mp4", settings, config(3000.0, 10));

        for _ in 0..500 {
            let events = sim.step();
            let sched = sim.scheduler();
            let weights = sched.snapshot().weights;
            assert!(weights[0] + weights[1] >= 1.0);

            for timed in &events {
                if let SchedulerEvent::Retired { instance, .. } = timed.event {
                    let retired = sched.instance(instance);
                    assert!(!retired.is_playing());
                    assert_eq!(retired.position(), Duration::ZERO);
                    assert_eq!(retired.visual_weight(), 0.0);
                    assert!(!sched.swap_in_flight());
                }
            }
            if !sched.swap_in_flight() {
                let standby = sched.instance(sched.standby_id());
                assert!(!standby.is_playing());
                assert_eq!(standby.position(), Duration::ZERO);
                assert_eq!(standby.visual_weight(), 0.0);
            }
        }

        let handoffs = sim.handoffs();
        assert_eq!(handoffs.len(), 2);
        let routes: Vec<_> = handoffs
            .iter()
            .map(|timed| match timed.event {
                SchedulerEvent::HandoffStarted { from, to, kind, .. } => (from, to, kind),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(
            routes,
            vec![
                (InstanceId::A, InstanceId::B, HandoffKind::Blended),
                (InstanceId::B, InstanceId::A, HandoffKind::Blended),
            ]
        );
        assert_eq!(handoffs[0].at_ms, 2000.0);
        assert_eq!(handoffs[1].at_ms, 4000.0);

        let retired: Vec<_> = sim
            .events()
            .iter()
            .filter_map(|timed| match timed.event {
                SchedulerEvent::Retired { instance, .. } => Some((timed.at_ms, instance)),
                _ => None,
            })
            .collect();
        assert_eq!(retired, vec![(2500.0, InstanceId::A), (4500.0, InstanceId::B)]);
        assert_eq!(
            sim.active_sequence(),
            vec![InstanceId::A, InstanceId::B, InstanceId::A]
        );
    }

    #[test]
    fn zero_frame_interval_still_advances_time() {
        let cfg = SimulationConfig {
            frame_interval: Duration::ZERO,
            ..config(2000.0, 0)
        };
        let mut sim = Simulation::new("clip.mp4", LoopSettings::new(500.0, 0.0), cfg);
        for _ in 0..10 {
            sim.step();
        }
        assert_eq!(sim.elapsed_ms(), 10.0);
        assert!(sim.run_until_handoffs(1, Duration::from_secs(5)));
    }

    #[test]
    fn non_finite_inputs_are_neutralised() {
        let cfg = SimulationConfig {
            jitter_ms: f64::INFINITY,
            drop_probability: f64::NAN,
            metadata_delay_ms: -5.0,
            ..config(2000.0, 10)
        }
        .sanitized();
        assert_eq!(cfg.jitter_ms, 0.0);
        assert_eq!(cfg.drop_probability, 0.0);
        assert_eq!(cfg.metadata_delay_ms, 0.0);

        let mut sim = Simulation::new("clip.mp4", LoopSettings::new(500.0, 0.0), cfg);
        sim.run_for(Duration::from_millis(100));
        assert_eq!(sim.frames(), 10);
    }
}
