//! Shared runtime context captured at thread spawn time.

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::playback::instance::PlaybackInstance;
use crate::playback::scheduler::{LoopScheduler, LoopSnapshot};

/// State handed from `Looper::initialize_thread` to the frame pump.
pub(in crate::playback::looper::runtime) struct PumpContext<I: PlaybackInstance> {
    pub(in crate::playback::looper::runtime) scheduler: Arc<Mutex<LoopScheduler<I>>>,
    pub(in crate::playback::looper::runtime) snapshot: Arc<Mutex<LoopSnapshot>>,
    pub(in crate::playback::looper::runtime) abort: Arc<AtomicBool>,
    pub(in crate::playback::looper::runtime) pump_thread_exists: Arc<AtomicBool>,
    pub(in crate::playback::looper::runtime) generation_atomic: Arc<AtomicU64>,
    pub(in crate::playback::looper::runtime) frame_interval: Duration,
}
