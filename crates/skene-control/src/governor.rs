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

//! The scene governor: one explicitly constructed object, owned by the
//! scene-layer root and ticked once per rendered frame.
//!
//! Each tick records the frame, then runs whichever periodic passes are due
//! on the accumulated clock: snapshot -> quality evaluation, and
//! classification -> eviction. Ordering within a tick guarantees a sampling
//! interval boundary never observes a partially recorded frame.

use crate::eviction::{EvictionConfig, EvictionPolicy};
use crate::ladder::{LadderConfig, QualityLadder};
use crate::pressure::PressureClassifier;
use crate::sampler::FrameSampler;
use crossbeam_channel::{Receiver, Sender};
use skene_core::memory::{MemoryStats, PressureThresholds, PressureTier};
use skene_core::quality::{initial_level, CapabilityProbe, QualityLevel, QualitySettings};
use skene_core::resource::{ReleaseFn, ResourceDesc, ResourceId};
use skene_core::telemetry::FrameStats;
use skene_data::cache::DecodedCache;
use skene_data::registry::ResourceRegistry;

/// Top-level configuration for the governor.
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Rolling window size for frame sampling, in frames.
    pub window_size: usize,
    /// Elapsed time between performance snapshots, in seconds.
    pub snapshot_interval_s: f64,
    /// Elapsed time between memory classification passes, in seconds.
    pub classify_interval_s: f64,
    /// Quality ladder thresholds.
    pub ladder: LadderConfig,
    /// Pressure tier boundaries.
    pub thresholds: PressureThresholds,
    /// Eviction tunables.
    pub eviction: EvictionConfig,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            snapshot_interval_s: 1.0,
            classify_interval_s: 0.5,
            ladder: LadderConfig::default(),
            thresholds: PressureThresholds::default(),
            eviction: EvictionConfig::default(),
        }
    }
}

/// The runtime governor for a scene session.
///
/// `R` is the decoded GPU-ready resource type held by the cache. All state
/// is rebuilt fresh each session; nothing is persisted.
pub struct SceneGovernor<R> {
    clock_s: f64,
    sampler: FrameSampler,
    ladder: QualityLadder,
    classifier: PressureClassifier,
    policy: EvictionPolicy,
    registry: ResourceRegistry,
    cache: DecodedCache<R>,
    settings: QualitySettings,
    subscribers: Vec<Sender<QualitySettings>>,
}

impl<R> SceneGovernor<R> {
    /// Builds a governor, picking the initial quality level from the
    /// capability probe.
    pub fn new(config: GovernorConfig, probe: CapabilityProbe) -> Self {
        let initial = initial_level(&probe);
        log::info!(
            "SceneGovernor: session start, probe {:?} -> initial level {initial}",
            probe
        );
        Self {
            clock_s: 0.0,
            sampler: FrameSampler::new(config.window_size, config.snapshot_interval_s),
            ladder: QualityLadder::new(config.ladder, initial),
            classifier: PressureClassifier::new(config.thresholds, config.classify_interval_s),
            policy: EvictionPolicy::new(config.eviction),
            registry: ResourceRegistry::new(),
            cache: DecodedCache::new(),
            settings: QualitySettings::preset(initial),
            subscribers: Vec::new(),
        }
    }

    /// Ticks the governor for one rendered frame.
    ///
    /// Called exactly once per frame from the render-loop callback, after
    /// the frame's duration is known. Synchronous and non-blocking; any
    /// decode work lives outside and reports back through
    /// [`cache_mut`](Self::cache_mut).
    pub fn frame(&mut self, duration_ms: f32, stats: FrameStats) {
        let dt_s = if duration_ms.is_finite() && duration_ms > 0.0 {
            f64::from(duration_ms) / 1000.0
        } else {
            0.0
        };
        self.clock_s += dt_s;

        // The frame is recorded before any periodic pass checks elapsed
        // time, so an interval boundary never sees a half-recorded frame.
        self.sampler.record_frame(duration_ms, stats);

        if let Some(snapshot) = self.sampler.poll_snapshot() {
            let tier = self.classifier.current_tier();
            if let Some(level) = self.ladder.evaluate(&snapshot, tier) {
                self.publish(level);
            }
        }

        if self.classifier.tick(dt_s) {
            let cache_bytes = self.cache.size_bytes();
            let tier = self
                .classifier
                .classify(&self.registry, cache_bytes, self.clock_s)
                .tier;

            if tier == PressureTier::Critical {
                if let Some(level) = self.ladder.force_minimum() {
                    self.publish(level);
                }
            }
            if tier >= PressureTier::Medium {
                self.policy.run(
                    &mut self.registry,
                    &mut self.cache,
                    self.classifier.thresholds(),
                    tier,
                    self.clock_s,
                );
                self.classifier.note_eviction(self.clock_s);
            }
        }
    }

    fn publish(&mut self, level: QualityLevel) {
        self.settings = QualitySettings::preset(level);
        // Disconnected subscribers are dropped; delivery is best-effort and
        // bundles are idempotent to re-apply.
        let settings = self.settings.clone();
        self.subscribers.retain(|tx| tx.send(settings.clone()).is_ok());
    }

    /// Subscribes to committed settings bundles.
    ///
    /// The current bundle is delivered immediately so a late subscriber
    /// starts consistent; re-applying it is safe.
    pub fn subscribe(&mut self) -> Receiver<QualitySettings> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let _ = tx.send(self.settings.clone());
        self.subscribers.push(tx);
        rx
    }

    /// Registers a GPU resource, stamped with the governor clock.
    pub fn register(&mut self, id: ResourceId, desc: ResourceDesc, release: ReleaseFn) {
        self.registry.register(id, desc, release, self.clock_s);
    }

    /// Marks a resource as used this frame.
    pub fn touch(&mut self, id: ResourceId) {
        self.registry.touch(id, self.clock_s);
    }

    /// Releases and forgets a resource; a no-op if it was already evicted.
    pub fn unregister(&mut self, id: ResourceId) {
        self.registry.unregister(id);
    }

    /// The currently active quality level.
    pub fn current_level(&self) -> QualityLevel {
        self.ladder.level()
    }

    /// The currently active settings bundle, readable on demand.
    pub fn current_settings(&self) -> &QualitySettings {
        &self.settings
    }

    /// The most recently published memory statistics (for overlay display).
    pub fn memory_stats(&self) -> &MemoryStats {
        self.classifier.stats()
    }

    /// Read access to the resource registry.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Read access to the decoded-resource cache.
    pub fn cache(&self) -> &DecodedCache<R> {
        &self.cache
    }

    /// Mutable access to the decoded-resource cache, for starting loads and
    /// completing decodes.
    pub fn cache_mut(&mut self) -> &mut DecodedCache<R> {
        &mut self.cache
    }

    /// The governor clock: accumulated frame time since session start, in
    /// seconds.
    pub fn clock_s(&self) -> f64 {
        self.clock_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skene_core::quality::GpuTier;
    use skene_core::resource::ResourceKind;

    fn governor() -> SceneGovernor<u32> {
        SceneGovernor::new(
            GovernorConfig::default(),
            CapabilityProbe {
                tier: GpuTier::Premium,
                high_throughput_backend: true,
            },
        )
    }

    fn run_frames(governor: &mut SceneGovernor<u32>, count: usize, duration_ms: f32) {
        for _ in 0..count {
            governor.frame(duration_ms, FrameStats::default());
        }
    }

    #[test]
    fn test_initial_settings_match_probe() {
        let governor = governor();
        assert_eq!(governor.current_level(), QualityLevel::High);
        assert_eq!(
            *governor.current_settings(),
            QualitySettings::preset(QualityLevel::High)
        );
    }

    #[test]
    fn test_sustained_slow_frames_degrade_quality() {
        let mut governor = governor();
        // 25ms frames: ~40 fps, severe shortfall once the window fills and
        // an interval elapses.
        run_frames(&mut governor, 120, 25.0);
        assert!(governor.current_level() < QualityLevel::High);
    }

    #[test]
    fn test_fast_frames_eventually_upgrade() {
        let mut governor = governor();
        // 6ms frames, ~166 fps: one snapshot per simulated second, so 12
        // seconds comfortably covers the ten qualifying snapshots.
        run_frames(&mut governor, 2000, 6.0);
        assert_eq!(governor.current_level(), QualityLevel::Ultra);
    }

    #[test]
    fn test_subscriber_sees_initial_and_committed_bundles() {
        let mut governor = governor();
        let rx = governor.subscribe();
        assert_eq!(
            rx.recv().unwrap(),
            QualitySettings::preset(QualityLevel::High)
        );

        run_frames(&mut governor, 120, 30.0);
        let published = rx.try_iter().last().expect("a transition was published");
        assert_eq!(
            published,
            QualitySettings::preset(governor.current_level())
        );
    }

    #[test]
    fn test_clock_accumulates_frame_time() {
        let mut governor = governor();
        run_frames(&mut governor, 100, 10.0);
        assert!((governor.clock_s() - 1.0).abs() < 1e-9);
        // Anomalous frames advance neither clock nor window.
        governor.frame(f32::NAN, FrameStats::default());
        assert!((governor.clock_s() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_critical_pressure_forces_minimum_and_evicts() {
        let mut governor = governor();
        const MIB: u64 = 1024 * 1024;
        for i in 0..30 {
            governor.register(
                ResourceId::new(i),
                ResourceDesc::new(ResourceKind::Texture, 10 * MIB).with_priority(2),
                Box::new(|| Ok(())),
            );
        }
        // 300MB registered: the next classification pass is critical, and a
        // second pass republishes stats that include the eviction.
        run_frames(&mut governor, 80, 16.0);

        assert_eq!(governor.current_level(), QualityLevel::Minimum);
        assert!(governor.registry().len() < 30);
        let stats = governor.memory_stats();
        assert!(stats.disposed_resources > 0);
        assert!(stats.last_eviction_s.is_some());
    }

    #[test]
    fn test_unregister_after_eviction_is_benign() {
        let mut governor = governor();
        const MIB: u64 = 1024 * 1024;
        for i in 0..30 {
            governor.register(
                ResourceId::new(i),
                ResourceDesc::new(ResourceKind::Texture, 10 * MIB).with_priority(2),
                Box::new(|| Ok(())),
            );
        }
        run_frames(&mut governor, 40, 16.0);
        let disposed = governor.registry().disposed_count();

        // The scene layer tears everything down, unaware of evictions.
        for i in 0..30 {
            governor.unregister(ResourceId::new(i));
        }
        assert_eq!(governor.registry().len(), 0);
        assert_eq!(governor.registry().disposed_count(), 30);
        assert!(disposed < 30);
    }
}
