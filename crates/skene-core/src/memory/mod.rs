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

//! Memory-pressure classification and the aggregate statistics published for
//! optional overlay display.

use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Discrete classification of current memory usage against fixed thresholds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PressureTier {
    /// Comfortably within budget; eviction never runs.
    #[default]
    Low,
    /// Budget is getting tight; light eviction.
    Medium,
    /// Over budget; aggressive eviction plus a quality drop.
    High,
    /// Far over budget; maximum eviction and quality forced to minimum.
    Critical,
}

/// Byte boundaries between pressure tiers.
///
/// The exact values are tuning, not contract; only `medium < high < critical`
/// is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressureThresholds {
    /// Totals at or above this are at least [`PressureTier::Medium`].
    pub medium_bytes: u64,
    /// Totals at or above this are at least [`PressureTier::High`].
    pub high_bytes: u64,
    /// Totals at or above this are [`PressureTier::Critical`].
    pub critical_bytes: u64,
}

impl PressureThresholds {
    /// Buckets a byte total into a pressure tier.
    pub fn classify(&self, total_bytes: u64) -> PressureTier {
        if total_bytes >= self.critical_bytes {
            PressureTier::Critical
        } else if total_bytes >= self.high_bytes {
            PressureTier::High
        } else if total_bytes >= self.medium_bytes {
            PressureTier::Medium
        } else {
            PressureTier::Low
        }
    }
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            medium_bytes: 150 * MIB,
            high_bytes: 200 * MIB,
            critical_bytes: 250 * MIB,
        }
    }
}

/// Per-kind byte totals for tracked resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTotals {
    /// Bytes held by geometry resources.
    pub geometry: u64,
    /// Bytes held by texture resources.
    pub texture: u64,
    /// Bytes held by material resources.
    pub material: u64,
    /// Bytes held by uncategorized resources.
    pub other: u64,
}

impl KindTotals {
    /// Adds `bytes` to the bucket for `kind`.
    pub fn add(&mut self, kind: ResourceKind, bytes: u64) {
        match kind {
            ResourceKind::Geometry => self.geometry += bytes,
            ResourceKind::Texture => self.texture += bytes,
            ResourceKind::Material => self.material += bytes,
            ResourceKind::Other => self.other += bytes,
        }
    }

    /// Sum over all kinds.
    pub fn total(&self) -> u64 {
        self.geometry + self.texture + self.material + self.other
    }
}

/// Aggregate memory statistics, recomputed on each classifier pass.
///
/// Purely observational: the scene layer may show these on a debug overlay,
/// but nothing depends on them for correctness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Registry bytes broken down by resource kind.
    pub by_kind: KindTotals,
    /// Total registry bytes.
    pub registry_bytes: u64,
    /// Total decoded-resource cache bytes.
    pub cache_bytes: u64,
    /// Registry plus cache bytes; the classified quantity.
    pub total_bytes: u64,
    /// Live tracked resources.
    pub live_resources: usize,
    /// Cumulative resources released since session start. Monotonic.
    pub disposed_resources: u64,
    /// Cumulative bytes released since session start. Monotonic.
    pub disposed_bytes: u64,
    /// The pressure tier the totals classify into.
    pub tier: PressureTier,
    /// Governor-clock timestamp (seconds) of the last eviction pass, if any.
    pub last_eviction_s: Option<f64>,
}
