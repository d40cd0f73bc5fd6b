//! Lifecycle and inspection operations for `Looper`.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::warn;

use crate::diagnostics::reporter::Reporter;
use crate::playback::instance::PlaybackInstance;
use crate::playback::scheduler::{LoopScheduler, LoopSnapshot};

use super::Looper;

impl<I: PlaybackInstance + Send + 'static> Looper<I> {
    /// Stop the frame pump and detach the scheduler.
    ///
    /// Pending settle timers become no-ops. Safe to call repeatedly; the
    /// looper stays detached until a setter rebuilds it.
    pub fn detach(&mut self) {
        self.abort.store(true, Ordering::SeqCst);

        if let Some(handle) = self.pump_handle.take() {
            if handle.join().is_err() {
                warn!("frame pump panicked during join");
            }
        }

        if let Some(scheduler) = self.scheduler.take() {
            scheduler.lock().unwrap().detach();
        }

        self.snapshot.lock().unwrap().attached = false;
    }

    /// Whether a scheduler is attached and its frame pump is alive.
    pub fn is_attached(&self) -> bool {
        self.scheduler.is_some() && !self.pump_finished()
    }

    /// Generation of the most recently attached scheduler.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Latest state published by the frame pump or a settle timer.
    pub fn snapshot(&self) -> LoopSnapshot {
        *self.snapshot.lock().unwrap()
    }

    /// Run `f` against the attached scheduler.
    ///
    /// # Returns
    ///
    /// `None` when detached.
    pub fn with_scheduler<R>(&self, f: impl FnOnce(&LoopScheduler<I>) -> R) -> Option<R> {
        let scheduler = self.scheduler.as_ref()?;
        let guard = scheduler.lock().unwrap();
        Some(f(&guard))
    }

    /// Block until at least `count` swaps have completed.
    ///
    /// # Arguments
    ///
    /// * `count` - Completed swaps to wait for.
    /// * `timeout` - Maximum wait before returning `false`.
    ///
    /// # Returns
    ///
    /// `true` once the count is reached, `false` on timeout or when the pump
    /// is gone.
    pub fn wait_for_cycles(&self, count: u64, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.snapshot().cycles >= count {
                return true;
            }
            if self.pump_finished() {
                warn!("frame pump ended before {} cycles completed", count);
                return false;
            }
            if start.elapsed() >= timeout {
                warn!("timed out waiting for {} cycles", count);
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Enable periodic reporting of loop state.
    ///
    /// Any previous reporter is stopped first. The callback only runs when
    /// the snapshot changed since the last report.
    ///
    /// # Arguments
    ///
    /// * `reporting` - Callback invoked with each changed snapshot.
    /// * `reporting_interval` - Time between polls.
    pub fn set_reporting(
        &mut self,
        reporting: Arc<Mutex<dyn Fn(LoopSnapshot) + Send>>,
        reporting_interval: Duration,
    ) {
        if let Some(reporter) = self.reporter.take() {
            reporter.stop();
        }

        let reporter = Reporter::new(self.snapshot.clone(), reporting, reporting_interval);
        reporter.start();

        self.reporter = Some(reporter);
    }

    /// Return `true` when no frame pump thread is alive.
    pub(super) fn pump_finished(&self) -> bool {
        !self.pump_thread_exists.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::playback::looper::{InstanceFactory, Looper};
    use crate::playback::scheduler::{LoopSettings, LoopSnapshot};
    use crate::playback::simulated::SimulatedInstance;
    use crate::tools::clock::{Clock, SystemClock};

    #[test]
    fn reporting_sees_generation_changes() {
        let factory: InstanceFactory<SimulatedInstance> = Arc::new(|source: &str| {
            let clock: Arc<dyn Clock> = Arc::new(SystemClock);
            SimulatedInstance::new(source, Duration::from_millis(2000), clock)
        });
        let mut looper = Looper::with_frame_interval(
            "clip.mp4",
            LoopSettings::default(),
            factory,
            Duration::from_millis(5),
        );

        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        looper.set_reporting(
            Arc::new(Mutex::new(move |snapshot: LoopSnapshot| {
                sink.lock().unwrap().push(snapshot.generation);
            })),
            Duration::from_millis(5),
        );

        std::thread::sleep(Duration::from_millis(50));
        looper.set_crossfade_duration_ms(200.0);
        std::thread::sleep(Duration::from_millis(50));
        drop(looper);

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&1));
        assert!(seen.contains(&2));
    }
}
