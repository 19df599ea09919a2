//! Tick timing utilities

use std::time::{Duration, Instant};

/// Simple stopwatch for measuring elapsed time
#[derive(Debug)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start_time = Some(Instant::now());
        stopwatch
    }

    /// Stop the stopwatch and return the total elapsed time
    pub fn stop(&mut self) -> Duration {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
        self.elapsed
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed + self.start_time.map_or(Duration::ZERO, |start| start.elapsed())
    }
}

/// Running statistics over measured tick durations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    ticks: u64,
    total: Duration,
    last: Duration,
    longest: Duration,
    simulated_secs: f64,
}

impl TickStats {
    /// Record one tick that took `wall` and advanced the simulation by `dt` seconds.
    pub fn record(&mut self, wall: Duration, dt: f32) {
        self.ticks += 1;
        self.total += wall;
        self.last = wall;
        self.longest = self.longest.max(wall);
        self.simulated_secs += f64::from(dt);
    }

    /// Number of ticks recorded
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Wall time of the most recent tick
    pub const fn last(&self) -> Duration {
        self.last
    }

    /// Longest tick seen so far
    pub const fn longest(&self) -> Duration {
        self.longest
    }

    /// Total simulated time in seconds
    pub const fn simulated_secs(&self) -> f64 {
        self.simulated_secs
    }

    /// Mean wall time per tick
    pub fn average(&self) -> Duration {
        match u32::try_from(self.ticks) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total / n,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.ticks as f64),
        }
    }
}
