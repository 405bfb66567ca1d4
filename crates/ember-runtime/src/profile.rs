//! Per-frame timing breakdown by subsystem category

use std::fmt;
use std::time::{Duration, Instant};

/// Buckets that subsystem time is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileCategory {
    Physics,
    /// Render and UI
    Graphics,
    Audio,
    /// Everything not measured by another bucket
    Misc,
}

impl ProfileCategory {
    pub const ALL: [ProfileCategory; 4] = [
        ProfileCategory::Physics,
        ProfileCategory::Graphics,
        ProfileCategory::Audio,
        ProfileCategory::Misc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProfileCategory::Physics => "physics",
            ProfileCategory::Graphics => "graphics",
            ProfileCategory::Audio => "audio",
            ProfileCategory::Misc => "misc",
        }
    }
}

/// Timing of one completed frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameBreakdown {
    pub frame: Duration,
    pub physics: Duration,
    pub graphics: Duration,
    pub audio: Duration,
    pub misc: Duration,
}

impl FrameBreakdown {
    pub fn time_in(&self, category: ProfileCategory) -> Duration {
        match category {
            ProfileCategory::Physics => self.physics,
            ProfileCategory::Graphics => self.graphics,
            ProfileCategory::Audio => self.audio,
            ProfileCategory::Misc => self.misc,
        }
    }

    /// Share of the frame spent in a category, 0-100
    pub fn percent(&self, category: ProfileCategory) -> f64 {
        let frame = self.frame.as_secs_f64();
        if frame <= 0.0 {
            return 0.0;
        }
        self.time_in(category).as_secs_f64() / frame * 100.0
    }
}

impl fmt::Display for FrameBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {:.2}ms", self.frame.as_secs_f64() * 1000.0)?;
        for category in ProfileCategory::ALL {
            write!(f, " | {} {:.1}%", category.name(), self.percent(category))?;
        }
        Ok(())
    }
}

/// Accumulates subsystem timings over a frame
#[derive(Debug, Default)]
pub struct FrameProfiler {
    frame_start: Option<Instant>,
    physics: Duration,
    graphics: Duration,
    audio: Duration,
    last: FrameBreakdown,
}

impl FrameProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring a new frame
    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
        self.physics = Duration::ZERO;
        self.graphics = Duration::ZERO;
        self.audio = Duration::ZERO;
    }

    /// Attribute time to a category of the current frame
    pub fn record(&mut self, category: ProfileCategory, elapsed: Duration) {
        match category {
            ProfileCategory::Physics => self.physics += elapsed,
            ProfileCategory::Graphics => self.graphics += elapsed,
            ProfileCategory::Audio => self.audio += elapsed,
            ProfileCategory::Misc => {}
        }
    }

    /// Close the current frame using wall time since `begin_frame`
    pub fn end_frame(&mut self) -> FrameBreakdown {
        let frame = self
            .frame_start
            .take()
            .map(|start| start.elapsed())
            .unwrap_or_default();
        self.close_frame(frame)
    }

    /// Close the current frame with an explicit frame duration
    pub fn close_frame(&mut self, frame: Duration) -> FrameBreakdown {
        let measured = self.physics + self.graphics + self.audio;
        let frame = frame.max(measured);

        self.last = FrameBreakdown {
            frame,
            physics: self.physics,
            graphics: self.graphics,
            audio: self.audio,
            misc: frame - measured,
        };
        self.last
    }

    /// Breakdown of the last closed frame
    pub fn last_frame(&self) -> FrameBreakdown {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misc_is_the_remainder() {
        let mut profiler = FrameProfiler::new();
        profiler.begin_frame();
        profiler.record(ProfileCategory::Physics, Duration::from_millis(4));
        profiler.record(ProfileCategory::Graphics, Duration::from_millis(6));
        profiler.record(ProfileCategory::Graphics, Duration::from_millis(2));
        profiler.record(ProfileCategory::Audio, Duration::from_millis(1));

        let frame = profiler.close_frame(Duration::from_millis(16));

        assert_eq!(frame.graphics, Duration::from_millis(8));
        assert_eq!(frame.misc, Duration::from_millis(3));
        assert!((frame.percent(ProfileCategory::Physics) - 25.0).abs() < 1e-9);
        assert!((frame.percent(ProfileCategory::Graphics) - 50.0).abs() < 1e-9);

        let total: f64 = ProfileCategory::ALL.iter().map(|c| frame.percent(*c)).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn begin_frame_resets_buckets() {
        let mut profiler = FrameProfiler::new();
        profiler.begin_frame();
        profiler.record(ProfileCategory::Audio, Duration::from_millis(5));
        profiler.end_frame();

        profiler.begin_frame();
        let frame = profiler.close_frame(Duration::from_millis(10));
        assert_eq!(frame.audio, Duration::ZERO);
        assert_eq!(profiler.last_frame(), frame);
    }

    #[test]
    fn empty_frame_reports_zero_percent() {
        let frame = FrameBreakdown::default();
        assert_eq!(frame.percent(ProfileCategory::Misc), 0.0);
        assert!(frame.to_string().starts_with("frame 0.00ms"));
    }
}
