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

//! End-to-end scenarios driving the governor the way a scene layer would:
//! register resources, tick frames, observe published bundles and evictions.

use skene_control::{GovernorConfig, SceneGovernor};
use skene_core::memory::PressureTier;
use skene_core::quality::{CapabilityProbe, GpuTier, QualityLevel};
use skene_core::resource::{ResourceDesc, ResourceId, ResourceKind};
use skene_core::telemetry::FrameStats;
use skene_data::cache::CacheLoad;

const MIB: u64 = 1024 * 1024;

fn premium_governor() -> SceneGovernor<Vec<u8>> {
    SceneGovernor::new(
        GovernorConfig::default(),
        CapabilityProbe {
            tier: GpuTier::Premium,
            high_throughput_backend: true,
        },
    )
}

fn run_frames(governor: &mut SceneGovernor<Vec<u8>>, count: usize, duration_ms: f32) {
    for _ in 0..count {
        governor.frame(duration_ms, FrameStats::default());
    }
}

/// 50 priority-5 textures at 2MB plus 10 priority-9 textures at 5MB total
/// exactly 150MB: medium pressure, a ~15% eviction pass that never touches
/// the priority-9 set.
#[test]
fn test_texture_pressure_scenario() {
    let mut governor = premium_governor();

    for i in 0..50u64 {
        governor.register(
            ResourceId::new(i),
            ResourceDesc::new(ResourceKind::Texture, 2 * MIB).with_priority(5),
            Box::new(|| Ok(())),
        );
    }
    for i in 50..60u64 {
        governor.register(
            ResourceId::new(i),
            ResourceDesc::new(ResourceKind::Texture, 5 * MIB).with_priority(9),
            Box::new(|| Ok(())),
        );
    }

    // Enough 16ms frames for one classification pass.
    run_frames(&mut governor, 40, 16.0);

    let stats = governor.memory_stats();
    assert_eq!(stats.tier, PressureTier::Medium);
    assert!(stats.last_eviction_s.is_some());

    // ceil(60 * 0.15) = 9 released, all from the priority-5 set.
    assert_eq!(governor.registry().disposed_count(), 9);
    assert_eq!(governor.registry().len(), 51);
    for i in 50..60u64 {
        assert!(governor.registry().contains(ResourceId::new(i)));
    }

    // Quality is untouched: medium pressure has no override, and 16ms
    // frames neither degrade nor upgrade a 60fps target.
    assert_eq!(governor.current_level(), QualityLevel::High);
}

/// Marginal performance — short bursts of headroom broken by ordinary
/// frames — must never commit an upgrade.
#[test]
fn test_marginal_performance_never_upgrades() {
    let mut governor = premium_governor();
    let rx = governor.subscribe();
    let _ = rx.recv().unwrap(); // initial bundle

    for _ in 0..8 {
        // Nine seconds of generous headroom (at most nine qualifying
        // snapshots)...
        run_frames(&mut governor, 1500, 6.0);
        // ...interrupted by two seconds at the target, long enough for a
        // full-window snapshot that resets the stability counter.
        run_frames(&mut governor, 130, 16.0);
    }

    assert_eq!(governor.current_level(), QualityLevel::High);
    assert!(rx.try_iter().next().is_none(), "no bundle may be published");
}

/// A session that collapses under load drops hard, then earns its way back
/// one level at a time.
#[test]
fn test_collapse_and_recovery() {
    let mut governor = premium_governor();

    // 40ms frames: 25 fps, severe. Two snapshots drop High -> Low -> Minimum.
    run_frames(&mut governor, 120, 40.0);
    assert_eq!(governor.current_level(), QualityLevel::Minimum);

    // Sustained 6ms frames: one upgrade per ten qualifying snapshots.
    run_frames(&mut governor, 2000, 6.0);
    assert_eq!(governor.current_level(), QualityLevel::Low);
    run_frames(&mut governor, 2000, 6.0);
    assert_eq!(governor.current_level(), QualityLevel::Medium);
}

/// Decode requests flow through the governor-owned cache: coalesced while
/// in flight, resident for both callers after completion, and counted by
/// the classifier.
#[test]
fn test_decoded_cache_through_governor() {
    let mut governor = premium_governor();

    let mut token = None;
    assert!(matches!(
        governor
            .cache_mut()
            .load("tex://terrain/albedo", |t| token = Some(t)),
        CacheLoad::Pending
    ));
    assert!(matches!(
        governor
            .cache_mut()
            .load("tex://terrain/albedo", |_| panic!("decode must coalesce")),
        CacheLoad::Pending
    ));

    let handle = governor
        .cache_mut()
        .complete(token.unwrap(), Ok((vec![0u8; 16], 160 * MIB)))
        .unwrap();
    assert_eq!(handle.len(), 16);

    // The cache alone pushes the next classification to medium pressure.
    run_frames(&mut governor, 40, 16.0);
    let stats = governor.memory_stats();
    assert_eq!(stats.cache_bytes, 160 * MIB);
    assert_eq!(stats.tier, PressureTier::Medium);
}
