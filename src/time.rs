//! Frame timing.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! // once per redraw:
//! let dt = clock.tick();
//! if let Some(fps) = clock.take_fps_update() {
//!     window.set_title(&format!("Pyre - {fps:.0} FPS"));
//! }
//! ```

use std::time::{Duration, Instant};

/// Largest delta handed to the scene; longer stalls (window drags, debugger
/// breaks) are reported as this.
pub const MAX_DELTA: f32 = 0.25;

/// Per-frame timing: elapsed time, delta, frame count and a periodically
/// refreshed FPS estimate.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    fps_dirty: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fps_dirty: false,
        }
    }

    /// Advance one frame and return the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let raw_delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = raw_delta.min(MAX_DELTA);
        self.last_frame = now;
        self.elapsed_secs = now.saturating_duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            self.fps_dirty = true;
        }

        self.delta_secs
    }

    /// Total elapsed time in seconds at the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta of the last tick in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// The FPS estimate if it was refreshed since the last call.
    pub fn take_fps_update(&mut self) -> Option<f32> {
        if std::mem::take(&mut self.fps_dirty) {
            Some(self.fps)
        } else {
            None
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_tick_measures_delta() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
        assert_eq!(clock.frame(), 1);
        assert!((clock.elapsed() - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;
        let dt = clock.tick_at(start + Duration::from_secs(3));
        assert_eq!(dt, MAX_DELTA);
        // Elapsed still reflects wall time.
        assert!((clock.elapsed() - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_fps_update_reported_once() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;
        for i in 1..=30 {
            clock.tick_at(start + Duration::from_millis(i * 20));
        }
        // 25 frames reached the 500ms window, giving ~50 FPS.
        let fps = clock.take_fps_update().expect("fps refreshed");
        assert!((fps - 50.0).abs() < 1.0, "fps = {fps}");
        assert_eq!(clock.take_fps_update(), None);
    }
}
