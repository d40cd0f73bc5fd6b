//! Published scheduler state and the events a frame can produce.

use serde::Serialize;

use crate::playback::instance::InstanceId;

use super::settings::LoopSettings;

/// Coarse state-machine phase for the active instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Steady,
    HandingOff,
}

/// How a hand-off moves visual weight between instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffKind {
    Instant,
    Blended,
}

/// Deferred request to pause, rewind and hide a retired instance.
///
/// The host fires it after `delay_ms` on a timer of its choosing and hands it
/// back to [`LoopScheduler::retire`](super::LoopScheduler::retire).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetireTicket {
    pub generation: u64,
    pub instance: InstanceId,
    pub cycle: u64,
    pub delay_ms: f64,
}

/// Something that happened during a frame or a retirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    HandoffStarted {
        from: InstanceId,
        to: InstanceId,
        kind: HandoffKind,
        remaining_ms: f64,
        threshold_ms: f64,
    },
    BlendCompleted {
        from: InstanceId,
        to: InstanceId,
    },
    RetirementScheduled(RetireTicket),
    Retired {
        instance: InstanceId,
        cycle: u64,
    },
}

/// Read-only view of the loop for display and debugging.
///
/// Timing fields reflect the last tick on which the active instance was
/// ready; state fields reflect the end of the last frame or retirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoopSnapshot {
    pub total_duration_ms: f64,
    pub active_instance_id: InstanceId,
    pub position_ms: f64,
    pub remaining_ms: f64,
    pub threshold_ms: f64,
    pub cutover_offset_ms: f64,
    pub crossfade_duration_ms: f64,
    pub phase: LoopPhase,
    pub swap_in_flight: bool,
    pub blend_progress: Option<f32>,
    /// Visual weight of A and B, in that order.
    pub weights: [f32; 2],
    pub cycles: u64,
    pub generation: u64,
    pub attached: bool,
}

impl LoopSnapshot {
    pub(super) fn initial(settings: &LoopSettings, generation: u64) -> Self {
        Self {
            total_duration_ms: 0.0,
            active_instance_id: InstanceId::A,
            position_ms: 0.0,
            remaining_ms: 0.0,
            threshold_ms: settings.trigger_threshold_ms(),
            cutover_offset_ms: settings.cutover_offset_ms,
            crossfade_duration_ms: settings.crossfade_duration_ms,
            phase: LoopPhase::Steady,
            swap_in_flight: false,
            blend_progress: None,
            weights: [1.0, 0.0],
            cycles: 0,
            generation,
            attached: true,
        }
    }

    /// Empty snapshot for hosts that have not attached a scheduler yet.
    pub fn detached(settings: &LoopSettings) -> Self {
        Self {
            attached: false,
            ..Self::initial(settings, 0)
        }
    }

    /// Visual weight of one instance.
    pub fn weight(&self, id: InstanceId) -> f32 {
        self.weights[id.index()]
    }

    /// Whether the play head has passed the raw cutover point.
    pub fn past_cutover(&self) -> bool {
        self.total_duration_ms > 0.0 && self.remaining_ms <= self.cutover_offset_ms
    }
}
