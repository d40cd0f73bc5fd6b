use std::time::Duration;

use log::info;

use crate::playback::instance::{ObjectFit, PlaybackInstance};
use crate::playback::scheduler::LoopSettings;

use super::Looper;

impl<I: PlaybackInstance + Send + 'static> Looper<I> {
    /// Configure the cutover offset (ms). Rebuilds the scheduler.
    pub fn set_cutover_offset_ms(&mut self, ms: f64) {
        self.settings.set_cutover_offset_ms(ms);
        self.initialize_thread();
    }

    /// Configure the blend window (ms). `0` swaps instantly. Rebuilds the
    /// scheduler.
    pub fn set_crossfade_duration_ms(&mut self, ms: f64) {
        self.settings.set_crossfade_duration_ms(ms);
        self.initialize_thread();
    }

    /// Configure the settle delay before retirement (ms). Rebuilds the
    /// scheduler.
    pub fn set_settle_delay_ms(&mut self, ms: f64) {
        self.settings.set_settle_delay_ms(ms);
        self.initialize_thread();
    }

    /// Replace every setting at once. Rebuilds the scheduler.
    pub fn set_settings(&mut self, settings: LoopSettings) {
        self.settings = settings.sanitized();
        self.initialize_thread();
    }

    /// Point both instances at a new source. Rebuilds the scheduler.
    pub fn set_source(&mut self, source: &str) {
        info!("loop source changed to {}", source);
        self.source = source.to_string();
        self.initialize_thread();
    }

    /// Change how often the frame pump runs. Rebuilds the scheduler.
    pub fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self.initialize_thread();
    }

    /// Forward a fit mode to both instances without touching timing.
    pub fn set_object_fit(&mut self, fit: ObjectFit) {
        self.settings.object_fit = fit;
        if let Some(scheduler) = &self.scheduler {
            scheduler.lock().unwrap().set_object_fit(fit);
        }
    }
}
