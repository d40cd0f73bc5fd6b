//! Periodic loop state reporter for UI updates.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};

use crate::playback::scheduler::LoopSnapshot;

/// Background reporter that polls a published [`LoopSnapshot`] at fixed
/// intervals and forwards it when it changed.
#[derive(Clone)]
pub struct Reporter {
    snapshot: Arc<Mutex<LoopSnapshot>>,
    report: Arc<Mutex<dyn Fn(LoopSnapshot) + Send>>,
    interval: Duration,
    finish: Arc<AtomicBool>,
    thread_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Reporter {
    /// Create a new reporter for the given snapshot and callback.
    pub fn new(
        snapshot: Arc<Mutex<LoopSnapshot>>,
        report: Arc<Mutex<dyn Fn(LoopSnapshot) + Send>>,
        interval: Duration,
    ) -> Self {
        Self {
            snapshot,
            report,
            interval,
            finish: Arc::new(AtomicBool::new(false)),
            thread_handle: Arc::new(Mutex::new(None)),
        }
    }

    fn run(&self) {
        let mut last_report: Option<LoopSnapshot> = None;

        loop {
            let report = *self.snapshot.lock().unwrap();

            if last_report != Some(report) {
                (*self.report.lock().unwrap())(report);
                last_report = Some(report);
            }

            if self.finish.load(Ordering::Relaxed) {
                break;
            }

            std::thread::sleep(self.interval);
        }
    }

    /// Start the background reporting thread.
    pub fn start(&self) {
        self.stop();
        self.finish.store(false, Ordering::Relaxed);
        let this = self.clone();
        let handle = std::thread::spawn(move || this.run());
        *self.thread_handle.lock().unwrap() = Some(handle);
    }

    /// Stop the background reporting thread.
    pub fn stop(&self) {
        self.finish.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            if handle.thread().id() == std::thread::current().id() {
                log::warn!("reporter stop called from reporter thread; skipping join");
            } else if handle.join().is_err() {
                log::warn!("reporter thread panicked during join");
            }
        }
    }
}
