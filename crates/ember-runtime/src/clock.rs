//! Simulation clock with fixed-timestep accumulator and FPS window

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest FPS averaging window, in seconds
pub const MAX_FPS_INTERVAL: f64 = 10.0;

/// Source of monotonic timestamps, measured from an arbitrary origin
pub trait TimeSource: Send {
    fn now(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct MonotonicTimeSource {
    origin: Instant,
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Time source that only moves when told to
///
/// Clones share the same timeline, so a test can keep one handle and give
/// the other to a [`Clock`].
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<Mutex<Duration>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `seconds` (negative values are ignored)
    pub fn advance(&self, seconds: f64) {
        *self.now.lock() += Duration::from_secs_f64(seconds.max(0.0));
    }

    /// Jump to an absolute timestamp, possibly backwards
    pub fn set(&self, seconds: f64) {
        *self.now.lock() = Duration::from_secs_f64(seconds.max(0.0));
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Tracks frame timing and converts variable frame deltas into whole fixed
/// simulation steps.
///
/// After every [`tick`](Clock::tick), `0 <= accumulator < fixed_step_seconds`.
pub struct Clock {
    source: Box<dyn TimeSource>,

    epoch: Duration,
    last_sample: Duration,
    current_sample: Duration,

    elapsed_seconds: f64,
    delta_seconds: f64,
    fixed_step_seconds: f64,
    accumulator: f64,
    steps_this_frame: u32,

    max_steps_per_frame: Option<u32>,
    dropped_steps: u64,

    fps_interval: f64,
    fps_window_elapsed: f64,
    fps_window_frames: u32,
    frames_per_second: f64,
    fps_published: bool,
    frame_count: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Create a wall-clock driven clock with a 60Hz fixed step
    pub fn new() -> Self {
        Self::with_time_source(Box::new(MonotonicTimeSource::new()), 1.0 / 60.0)
    }

    /// Create a wall-clock driven clock stepping at `hz`
    pub fn with_fixed_rate(hz: f64) -> Self {
        Self::with_time_source(Box::new(MonotonicTimeSource::new()), 1.0 / hz)
    }

    /// Create a clock reading from an explicit time source
    pub fn with_time_source(source: Box<dyn TimeSource>, fixed_step_seconds: f64) -> Self {
        let now = source.now();
        Self {
            source,
            epoch: now,
            last_sample: now,
            current_sample: now,
            elapsed_seconds: 0.0,
            delta_seconds: 0.0,
            fixed_step_seconds,
            accumulator: 0.0,
            steps_this_frame: 0,
            max_steps_per_frame: None,
            dropped_steps: 0,
            fps_interval: 1.0,
            fps_window_elapsed: 0.0,
            fps_window_frames: 0,
            frames_per_second: 0.0,
            fps_published: false,
            frame_count: 0,
        }
    }

    /// Set the FPS averaging window, clamped to `[0, 10]` seconds
    pub fn with_fps_interval(mut self, seconds: f64) -> Self {
        self.fps_interval = seconds.clamp(0.0, MAX_FPS_INTERVAL);
        self
    }

    /// Cap the number of fixed steps a single frame may owe
    pub fn with_max_steps_per_frame(mut self, max: Option<u32>) -> Self {
        self.max_steps_per_frame = max;
        self
    }

    /// Reset the epoch to now and clear all accumulated state
    pub fn start(&mut self) {
        let now = self.source.now();
        self.epoch = now;
        self.last_sample = now;
        self.current_sample = now;
        self.elapsed_seconds = 0.0;
        self.delta_seconds = 0.0;
        self.accumulator = 0.0;
        self.steps_this_frame = 0;
        self.dropped_steps = 0;
        self.fps_window_elapsed = 0.0;
        self.fps_window_frames = 0;
        self.frames_per_second = 0.0;
        self.fps_published = false;
        self.frame_count = 0;
    }

    /// Advance the clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = self.source.now();
        self.current_sample = now;

        // Time sources that step backwards yield a zero delta
        self.delta_seconds = now.saturating_sub(self.last_sample).as_secs_f64();
        self.elapsed_seconds = now.saturating_sub(self.epoch).as_secs_f64();
        self.last_sample = now;
        self.frame_count += 1;

        self.fps_window_frames += 1;
        self.fps_window_elapsed += self.delta_seconds;
        self.fps_published = false;
        if self.fps_window_elapsed > self.fps_interval {
            self.frames_per_second = self.fps_window_frames as f64 / self.fps_window_elapsed;
            self.fps_window_frames = 0;
            self.fps_window_elapsed = 0.0;
            self.fps_published = true;
        }

        self.accumulator += self.delta_seconds;
        self.steps_this_frame = 0;
        while self.accumulator >= self.fixed_step_seconds {
            self.accumulator -= self.fixed_step_seconds;
            self.steps_this_frame += 1;
        }

        if let Some(max) = self.max_steps_per_frame {
            if self.steps_this_frame > max {
                let dropped = self.steps_this_frame - max;
                self.dropped_steps += u64::from(dropped);
                self.steps_this_frame = max;
                log::warn!(
                    "frame owed {} fixed steps, dropping {} (cap {})",
                    max + dropped,
                    dropped,
                    max
                );
            }
        }
    }

    /// Seconds since the clock was started
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Seconds between the last two ticks
    pub fn delta_seconds(&self) -> f64 {
        self.delta_seconds
    }

    pub fn fixed_step_seconds(&self) -> f64 {
        self.fixed_step_seconds
    }

    /// Whole fixed steps owed by the current frame
    pub fn steps_this_frame(&self) -> u32 {
        self.steps_this_frame
    }

    /// Simulated time carried over to the next frame
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Fraction of a fixed step carried over, for render interpolation
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_step_seconds
    }

    /// Frames per second measured over the last completed window
    pub fn fps(&self) -> f64 {
        self.frames_per_second
    }

    /// True on the tick that closed an FPS window
    pub fn fps_updated(&self) -> bool {
        self.fps_published
    }

    pub fn fps_interval(&self) -> f64 {
        self.fps_interval
    }

    /// Ticks since the clock was started
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn max_steps_per_frame(&self) -> Option<u32> {
        self.max_steps_per_frame
    }

    /// Total fixed steps discarded by the per-frame cap
    pub fn dropped_steps(&self) -> u64 {
        self.dropped_steps
    }

    /// Timestamp of the most recent sample, relative to the time source origin
    pub fn current_sample(&self) -> Duration {
        self.current_sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f64 = 1.0 / 60.0;

    fn manual_clock(step: f64) -> (Clock, ManualTimeSource) {
        let time = ManualTimeSource::new();
        let clock = Clock::with_time_source(Box::new(time.clone()), step);
        (clock, time)
    }

    #[test]
    fn test_clock_defaults() {
        let clock = Clock::new();
        assert!((clock.fixed_step_seconds() - STEP).abs() < 1e-10);
        assert_eq!(clock.elapsed_seconds(), 0.0);
        assert_eq!(clock.delta_seconds(), 0.0);
        assert_eq!(clock.fps_interval(), 1.0);
        assert_eq!(clock.max_steps_per_frame(), None);
    }

    #[test]
    fn test_custom_rate() {
        let clock = Clock::with_fixed_rate(30.0);
        assert!((clock.fixed_step_seconds() - 1.0 / 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_worked_example() {
        let (mut clock, time) = manual_clock(STEP);
        clock.start();

        let mut steps = Vec::new();
        for delta in [0.0, 0.02, 0.05] {
            time.advance(delta);
            clock.tick();
            steps.push(clock.steps_this_frame());
        }

        assert_eq!(steps, vec![0, 1, 3]);
        assert!((clock.accumulator() - (0.07 - 4.0 * STEP)).abs() < 1e-9);
        assert!((clock.elapsed_seconds() - 0.07).abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_invariant_and_step_conservation() {
        let (mut clock, time) = manual_clock(STEP);
        clock.start();

        let deltas = [0.001, 0.016, 0.017, 0.1, 0.0, 0.033, 0.25, 0.004, 0.0167];
        let mut total_steps = 0u64;
        for delta in deltas {
            time.advance(delta);
            clock.tick();
            total_steps += u64::from(clock.steps_this_frame());

            assert!(clock.accumulator() >= 0.0);
            assert!(clock.accumulator() < clock.fixed_step_seconds());
        }

        let total: f64 = deltas.iter().sum();
        let simulated = total_steps as f64 * STEP + clock.accumulator();
        assert!((simulated - total).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_time_yields_zero_delta() {
        let (mut clock, time) = manual_clock(STEP);
        time.set(5.0);
        clock.start();

        time.set(4.0);
        clock.tick();

        assert_eq!(clock.delta_seconds(), 0.0);
        assert_eq!(clock.steps_this_frame(), 0);
    }

    #[test]
    fn test_fps_window() {
        let (mut clock, time) = manual_clock(STEP);
        clock.start();

        let mut published = 0;
        for _ in 0..150 {
            time.advance(STEP);
            clock.tick();
            if clock.fps_updated() {
                published += 1;
            }
        }

        assert_eq!(published, 2);
        assert!((clock.fps() - 60.0).abs() <= 1.0);
    }

    #[test]
    fn test_fps_interval_is_clamped() {
        assert_eq!(Clock::new().with_fps_interval(30.0).fps_interval(), 10.0);
        assert_eq!(Clock::new().with_fps_interval(-1.0).fps_interval(), 0.0);
    }

    #[test]
    fn test_step_cap_drops_excess() {
        let (clock, time) = manual_clock(STEP);
        let mut clock = clock.with_max_steps_per_frame(Some(5));
        clock.start();

        time.advance(0.5 + STEP * 0.5);
        clock.tick();

        assert_eq!(clock.steps_this_frame(), 5);
        assert_eq!(clock.dropped_steps(), 25);
        assert!(clock.accumulator() < clock.fixed_step_seconds());
        assert!((clock.interpolation_alpha() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_cap_by_default() {
        let (mut clock, time) = manual_clock(STEP);
        clock.start();

        time.advance(1.0);
        clock.tick();

        assert!((59..=60).contains(&clock.steps_this_frame()));
        assert_eq!(clock.dropped_steps(), 0);
    }

    #[test]
    fn test_start_resets() {
        let (mut clock, time) = manual_clock(STEP);
        time.advance(0.1);
        clock.tick();
        assert!(clock.frame_count() > 0);

        clock.start();
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.accumulator(), 0.0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
    }
}
