//! Frame-pump bootstrap for `Looper`.
//!
//! Tears down any running scheduler, builds both instances from the factory,
//! attaches a new scheduler under the next generation, and spawns the pump.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::playback::instance::PlaybackInstance;
use crate::playback::scheduler::LoopScheduler;

use super::super::Looper;
use super::worker::{run_frame_pump, PumpContext};

impl<I: PlaybackInstance + Send + 'static> Looper<I> {
    /// Attach a fresh scheduler and spawn its frame pump.
    pub(in crate::playback::looper) fn initialize_thread(&mut self) {
        self.detach();

        self.abort = Arc::new(AtomicBool::new(false));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let a = (self.factory)(&self.source);
        let b = (self.factory)(&self.source);
        let scheduler = Arc::new(Mutex::new(LoopScheduler::attach(
            a,
            b,
            self.settings,
            generation,
        )));
        *self.snapshot.lock().unwrap() = scheduler.lock().unwrap().snapshot();

        self.pump_thread_exists.store(true, Ordering::SeqCst);

        let context = PumpContext {
            scheduler: scheduler.clone(),
            snapshot: self.snapshot.clone(),
            abort: self.abort.clone(),
            pump_thread_exists: self.pump_thread_exists.clone(),
            generation_atomic: self.generation.clone(),
            frame_interval: self.frame_interval,
        };

        let handle = thread::spawn(move || run_frame_pump(context, generation));
        self.pump_handle = Some(handle);
        self.scheduler = Some(scheduler);
    }
}
