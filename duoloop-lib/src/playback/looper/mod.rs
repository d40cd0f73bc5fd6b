//! Real-time host for the loop scheduler.
//!
//! `Looper` owns a [`LoopScheduler`] behind a mutex and drives it from a
//! frame-pump thread at a fixed interval. Retirements run on short-lived
//! settle-timer threads that only hold a weak reference to the scheduler, so
//! tearing the looper down invalidates them.

mod controls;
mod runtime;
mod settings;

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::constants::DEFAULT_FRAME_RATE_HZ;
use crate::diagnostics::reporter::Reporter;
use crate::playback::instance::PlaybackInstance;
use crate::playback::scheduler::{LoopScheduler, LoopSettings, LoopSnapshot};

/// Builds one playback instance for a source.
pub type InstanceFactory<I> = Arc<dyn Fn(&str) -> I + Send + Sync>;

/// Seamless looping controller for a single source.
///
/// Every change to the source or to a timing value tears the running
/// scheduler down and attaches a fresh one with a new generation. Object fit
/// changes are forwarded without a rebuild.
pub struct Looper<I: PlaybackInstance + Send + 'static> {
    source: String,
    settings: LoopSettings,
    factory: InstanceFactory<I>,
    scheduler: Option<Arc<Mutex<LoopScheduler<I>>>>,
    snapshot: Arc<Mutex<LoopSnapshot>>,
    abort: Arc<AtomicBool>,
    pump_thread_exists: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    pump_handle: Option<JoinHandle<()>>,
    frame_interval: Duration,
    reporter: Option<Reporter>,
}

impl<I: PlaybackInstance + Send + 'static> Looper<I> {
    /// Create both instances for `source` and start looping.
    ///
    /// # Arguments
    ///
    /// * `source` - Media location handed to `factory` for each instance.
    /// * `settings` - Timing configuration.
    /// * `factory` - Builds one instance per call.
    pub fn new(source: &str, settings: LoopSettings, factory: InstanceFactory<I>) -> Self {
        Self::with_frame_interval(
            source,
            settings,
            factory,
            Duration::from_secs_f64(1.0 / DEFAULT_FRAME_RATE_HZ),
        )
    }

    /// Like [`Looper::new`] with an explicit frame-pump interval.
    pub fn with_frame_interval(
        source: &str,
        settings: LoopSettings,
        factory: InstanceFactory<I>,
        frame_interval: Duration,
    ) -> Self {
        let settings = settings.sanitized();
        let mut this = Self {
            source: source.to_string(),
            settings,
            factory,
            scheduler: None,
            snapshot: Arc::new(Mutex::new(LoopSnapshot::detached(&settings))),
            abort: Arc::new(AtomicBool::new(false)),
            pump_thread_exists: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            pump_handle: None,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            reporter: None,
        };

        this.initialize_thread();

        this
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn settings(&self) -> LoopSettings {
        self.settings
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

impl<I: PlaybackInstance + Send + 'static> Drop for Looper<I> {
    fn drop(&mut self) {
        self.detach();
        if let Some(reporter) = self.reporter.take() {
            reporter.stop();
        }
    }
}
