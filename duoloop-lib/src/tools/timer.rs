use std::time::{Duration, Instant};

/// Accumulating stopwatch measured against caller-supplied instants.
///
/// Taking `now` explicitly lets the same timer run on the system clock or a
/// manually advanced one.
#[derive(Debug, Clone)]
pub struct Timer {
    pub time: Duration,
    start_time: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            time: Duration::ZERO,
            start_time: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.start_time = Some(now);
    }

    pub fn un_pause(&mut self, now: Instant) {
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(start) = self.start_time {
            self.time += now.saturating_duration_since(start);
            self.start_time = None;
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn get_time(&self, now: Instant) -> Duration {
        if let Some(start) = self.start_time {
            self.time + now.saturating_duration_since(start)
        } else {
            self.time
        }
    }

    /// Overwrite the accumulated time, keeping the running state.
    pub fn set_time(&mut self, now: Instant, time: Duration) {
        if self.start_time.is_some() {
            self.start_time = Some(now);
        }
        self.time = time;
    }

    pub fn reset(&mut self) {
        self.start_time = None;
        self.time = Duration::ZERO;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds in `duration`, computed from whole nanoseconds so integral
/// millisecond values stay exact.
pub fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// Inverse of [`duration_to_ms`]. Negative and non-finite values map to zero.
pub fn ms_to_duration(ms: f64) -> Duration {
    if !ms.is_finite() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((ms * 1_000_000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_conversions_are_exact_for_whole_values() {
        assert_eq!(duration_to_ms(Duration::from_millis(3800)), 3800.0);
        assert_eq!(ms_to_duration(300.0), Duration::from_millis(300));
        assert_eq!(ms_to_duration(-4.0), Duration::ZERO);
        assert_eq!(ms_to_duration(0.5), Duration::from_micros(500));
    }

    #[test]
    fn accumulates_only_while_running() {
        let base = Instant::now();
        let mut timer = Timer::new();
        timer.start(base);
        timer.pause(base + Duration::from_millis(300));
        assert_eq!(
            timer.get_time(base + Duration::from_millis(900)),
            Duration::from_millis(300)
        );

        timer.un_pause(base + Duration::from_millis(1000));
        assert_eq!(
            timer.get_time(base + Duration::from_millis(1250)),
            Duration::from_millis(550)
        );
    }

    #[test]
    fn set_time_rebases_running_timer() {
        let base = Instant::now();
        let mut timer = Timer::new();
        timer.start(base);
        timer.set_time(base + Duration::from_millis(400), Duration::ZERO);
        assert_eq!(
            timer.get_time(base + Duration::from_millis(500)),
            Duration::from_millis(100)
        );
        assert!(timer.is_running());
    }
}
