// Copyright 2025 skene contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rolling frame-time sampling and interval-gated snapshot derivation.

use skene_core::telemetry::{FrameStats, PerformanceSnapshot};

/// A fixed-capacity circular buffer of frame durations.
///
/// Pushing onto a full window overwrites the oldest sample, so the window
/// always holds the most recent `capacity` frames.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Vec<f32>,
    head: usize,
    len: usize,
}

impl SampleWindow {
    /// Creates an empty window holding up to `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "sample window capacity must be non-zero");
        Self {
            samples: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Pushes a sample, evicting the oldest if the window is full.
    pub fn push(&mut self, value: f32) {
        self.samples[self.head] = value;
        self.head = (self.head + 1) % self.samples.len();
        if self.len < self.samples.len() {
            self.len += 1;
        }
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` once `capacity` samples have been recorded.
    pub fn is_full(&self) -> bool {
        self.len == self.samples.len()
    }

    /// Maximum number of samples the window holds.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Arithmetic mean over the current samples, or 0.0 if empty.
    pub fn mean(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        self.samples[..self.len].iter().sum::<f32>() / self.len as f32
    }

    /// Population standard deviation over the current samples, or 0.0 with
    /// fewer than two samples.
    pub fn std_dev(&self) -> f32 {
        if self.len < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let sum_sq: f32 = self.samples[..self.len]
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum();
        (sum_sq / self.len as f32).sqrt()
    }
}

/// Consumes per-frame durations and renderer statistics, deriving a
/// [`PerformanceSnapshot`] once per sampling interval.
///
/// `record_frame` is O(1); the snapshot is only computed when the
/// accumulated elapsed time crosses the interval, never per frame.
pub struct FrameSampler {
    window: SampleWindow,
    interval_s: f64,
    accumulated_s: f64,
    latest_stats: FrameStats,
}

impl FrameSampler {
    /// Creates a sampler with the given window size (frames) and snapshot
    /// interval (seconds of accumulated frame time).
    pub fn new(window_size: usize, interval_s: f64) -> Self {
        Self {
            window: SampleWindow::with_capacity(window_size),
            interval_s,
            accumulated_s: 0.0,
            latest_stats: FrameStats::default(),
        }
    }

    /// Records one rendered frame. Called exactly once per frame from the
    /// render-loop callback.
    ///
    /// Non-finite or non-positive durations are sampling anomalies: dropped
    /// here, never surfaced.
    pub fn record_frame(&mut self, duration_ms: f32, stats: FrameStats) {
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            log::debug!("FrameSampler: dropping anomalous frame duration {duration_ms}");
            return;
        }
        self.window.push(duration_ms);
        self.accumulated_s += f64::from(duration_ms) / 1000.0;
        self.latest_stats = stats;
    }

    /// Returns a fresh snapshot if a full sampling interval has elapsed and
    /// the window has enough data, `None` otherwise.
    ///
    /// Mean and deviation are computed over the full window, not just the
    /// last interval, so short bursts are smoothed. While the window is
    /// still filling the snapshot is skipped to avoid deciding on noise.
    pub fn poll_snapshot(&mut self) -> Option<PerformanceSnapshot> {
        if self.accumulated_s < self.interval_s {
            return None;
        }
        self.accumulated_s = 0.0;

        if !self.window.is_full() {
            log::trace!(
                "FrameSampler: window at {}/{} samples, skipping snapshot",
                self.window.len(),
                self.window.capacity()
            );
            return None;
        }

        let mean = self.window.mean();
        Some(PerformanceSnapshot {
            fps: if mean > 0.0 { 1000.0 / mean } else { 0.0 },
            mean_frame_time_ms: mean,
            frame_time_std_dev_ms: self.window.std_dev(),
            draw_calls: self.latest_stats.draw_calls,
            triangles: self.latest_stats.triangles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_overwrites_oldest() {
        let mut window = SampleWindow::with_capacity(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            window.push(v);
        }
        assert!(window.is_full());
        // 1.0 evicted: mean over {2, 3, 4}.
        assert_relative_eq!(window.mean(), 3.0);
    }

    #[test]
    fn test_window_std_dev() {
        let mut window = SampleWindow::with_capacity(4);
        for v in [5.0, 15.0, 5.0, 15.0] {
            window.push(v);
        }
        // Population variance 25.0.
        assert_relative_eq!(window.std_dev(), 5.0);
    }

    #[test]
    fn test_window_empty_statistics() {
        let window = SampleWindow::with_capacity(4);
        assert_eq!(window.mean(), 0.0);
        assert_eq!(window.std_dev(), 0.0);
    }

    #[test]
    fn test_snapshot_skipped_until_window_full() {
        let mut sampler = FrameSampler::new(60, 0.1);
        // Plenty of elapsed time, but only 30 samples.
        for _ in 0..30 {
            sampler.record_frame(16.0, FrameStats::default());
        }
        assert!(sampler.poll_snapshot().is_none());

        for _ in 0..30 {
            sampler.record_frame(16.0, FrameStats::default());
        }
        let snapshot = sampler.poll_snapshot().expect("window full and interval elapsed");
        assert_relative_eq!(snapshot.mean_frame_time_ms, 16.0);
        assert_relative_eq!(snapshot.fps, 62.5);
    }

    #[test]
    fn test_snapshot_gated_by_interval() {
        let mut sampler = FrameSampler::new(4, 1.0);
        for _ in 0..4 {
            sampler.record_frame(16.0, FrameStats::default());
        }
        // Window full but only ~64ms accumulated.
        assert!(sampler.poll_snapshot().is_none());

        for _ in 0..60 {
            sampler.record_frame(16.0, FrameStats::default());
        }
        assert!(sampler.poll_snapshot().is_some());
        // Interval accumulator reset: the very next poll yields nothing.
        assert!(sampler.poll_snapshot().is_none());
    }

    #[test]
    fn test_anomalous_durations_dropped() {
        let mut sampler = FrameSampler::new(4, 0.001);
        sampler.record_frame(f32::NAN, FrameStats::default());
        sampler.record_frame(f32::INFINITY, FrameStats::default());
        sampler.record_frame(-5.0, FrameStats::default());
        sampler.record_frame(0.0, FrameStats::default());
        assert!(sampler.poll_snapshot().is_none());

        for _ in 0..4 {
            sampler.record_frame(10.0, FrameStats::default());
        }
        let snapshot = sampler.poll_snapshot().unwrap();
        assert_relative_eq!(snapshot.mean_frame_time_ms, 10.0);
    }

    #[test]
    fn test_snapshot_carries_latest_renderer_stats() {
        let mut sampler = FrameSampler::new(2, 0.001);
        sampler.record_frame(
            16.0,
            FrameStats {
                draw_calls: 100,
                triangles: 50_000,
            },
        );
        sampler.record_frame(
            16.0,
            FrameStats {
                draw_calls: 120,
                triangles: 60_000,
            },
        );
        let snapshot = sampler.poll_snapshot().unwrap();
        assert_eq!(snapshot.draw_calls, 120);
        assert_eq!(snapshot.triangles, 60_000);
    }
}
