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

//! The memory-pressure classifier.
//!
//! Runs on its own elapsed-time cadence — gated by accumulated time, not a
//! frame count, so the cadence is stable regardless of frame rate. Each pass
//! aggregates registry totals plus the decoded-cache size, buckets the total
//! into a pressure tier, and publishes a fresh [`MemoryStats`].

use skene_core::memory::{MemoryStats, PressureThresholds, PressureTier};
use skene_data::registry::ResourceRegistry;

/// Periodically classifies total tracked memory into a pressure tier.
pub struct PressureClassifier {
    thresholds: PressureThresholds,
    interval_s: f64,
    accumulated_s: f64,
    last_eviction_s: Option<f64>,
    stats: MemoryStats,
}

impl PressureClassifier {
    /// Creates a classifier with the given tier boundaries and pass cadence.
    pub fn new(thresholds: PressureThresholds, interval_s: f64) -> Self {
        Self {
            thresholds,
            interval_s,
            accumulated_s: 0.0,
            last_eviction_s: None,
            stats: MemoryStats::default(),
        }
    }

    /// Accumulates elapsed time; returns `true` when a classification pass
    /// is due, resetting the accumulator.
    pub fn tick(&mut self, dt_s: f64) -> bool {
        self.accumulated_s += dt_s;
        if self.accumulated_s < self.interval_s {
            return false;
        }
        self.accumulated_s = 0.0;
        true
    }

    /// Runs one classification pass, replacing the published stats.
    pub fn classify(
        &mut self,
        registry: &ResourceRegistry,
        cache_bytes: u64,
        now_s: f64,
    ) -> &MemoryStats {
        let totals = registry.totals();
        let total_bytes = totals.total_bytes + cache_bytes;
        let tier = self.thresholds.classify(total_bytes);

        self.stats = MemoryStats {
            by_kind: totals.by_kind,
            registry_bytes: totals.total_bytes,
            cache_bytes,
            total_bytes,
            live_resources: totals.live,
            disposed_resources: registry.disposed_count(),
            disposed_bytes: registry.disposed_bytes(),
            tier,
            last_eviction_s: self.last_eviction_s,
        };

        log::debug!(
            "PressureClassifier: {} bytes tracked ({} registry + {} cache) at t={now_s:.2}s -> {tier:?}",
            total_bytes,
            totals.total_bytes,
            cache_bytes
        );
        &self.stats
    }

    /// Records that an eviction pass ran at `now_s`.
    pub fn note_eviction(&mut self, now_s: f64) {
        self.last_eviction_s = Some(now_s);
        self.stats.last_eviction_s = self.last_eviction_s;
    }

    /// The tier from the most recent pass (`Low` before the first one).
    pub fn current_tier(&self) -> PressureTier {
        self.stats.tier
    }

    /// The most recently published statistics.
    pub fn stats(&self) -> &MemoryStats {
        &self.stats
    }

    /// The tier boundaries this classifier applies.
    pub fn thresholds(&self) -> &PressureThresholds {
        &self.thresholds
    }
}
