//! Tick throughput tracking.
//!
//! Counts completed ticks and keeps a periodically refreshed ticks-per-second
//! figure for logs and the window title. The simulation itself has no notion
//! of wall-clock time; every tick advances agents by a fixed step.
//!
//! ```
//! use physarum::time::TickTimer;
//!
//! let mut timer = TickTimer::new();
//! timer.record();
//! assert_eq!(timer.ticks(), 1);
//! ```

use std::time::{Duration, Instant};

/// Counts ticks and measures how fast they complete.
#[derive(Debug)]
pub struct TickTimer {
    /// When the timer was created.
    start: Instant,
    /// When the last tick was recorded.
    last_tick: Instant,
    /// Duration of the last tick.
    last_duration: Duration,
    /// Total ticks recorded.
    ticks: u64,
    /// Ticks per second over the last completed window.
    tps: f32,
    /// Tick count at the start of the current window.
    window_ticks: u64,
    /// Start of the current window.
    window_start: Instant,
    /// How often the rate is refreshed.
    window: Duration,
}

impl TickTimer {
    /// Create a timer starting now, refreshing the rate every 500 ms.
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(500))
    }

    /// Create a timer with a custom refresh window.
    pub fn with_window(window: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            last_duration: Duration::ZERO,
            ticks: 0,
            tps: 0.0,
            window_ticks: 0,
            window_start: now,
            window,
        }
    }

    /// Record one completed tick.
    ///
    /// Returns `true` when the rate was refreshed by this call.
    pub fn record(&mut self) -> bool {
        let now = Instant::now();
        self.last_duration = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.ticks += 1;

        let elapsed = now.duration_since(self.window_start);
        if elapsed >= self.window {
            let ticks = self.ticks - self.window_ticks;
            self.tps = ticks as f32 / elapsed.as_secs_f32();
            self.window_ticks = self.ticks;
            self.window_start = now;
            return true;
        }
        false
    }

    /// Total ticks recorded.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks per second over the last refresh window.
    ///
    /// Before the first window completes this falls back to the average
    /// since creation.
    pub fn ticks_per_second(&self) -> f32 {
        if self.tps > 0.0 {
            return self.tps;
        }
        let secs = self.start.elapsed().as_secs_f32();
        if secs > 0.0 {
            self.ticks as f32 / secs
        } else {
            0.0
        }
    }

    /// Wall time spent on the most recent tick.
    #[inline]
    pub fn last_tick_duration(&self) -> Duration {
        self.last_duration
    }

    /// Wall time since the timer was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}
