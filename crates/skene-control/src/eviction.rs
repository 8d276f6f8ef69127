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

//! The priority-aware eviction policy.
//!
//! Given a pressure tier, the policy releases a tier-scaled share of the
//! disposable registry entries, lowest priority and stalest first, while a
//! "recently touched, high priority" exemption protects resources the scene
//! is actively relying on. The decoded cache is a second-tier pool: its LRU
//! entries are drained only when pressure stays critical after the registry
//! pass.

use skene_core::memory::{PressureThresholds, PressureTier};
use skene_data::cache::DecodedCache;
use skene_data::registry::ResourceRegistry;

/// Tunables for the eviction policy.
#[derive(Debug, Clone, Copy)]
pub struct EvictionConfig {
    /// Share of disposable entries released at `Medium` pressure.
    pub medium_fraction: f32,
    /// Share released at `High` pressure.
    pub high_fraction: f32,
    /// Share released at `Critical` pressure — front-loading recovery rather
    /// than converging gradually.
    pub critical_fraction: f32,
    /// Entries with priority strictly above this are exempt while recently
    /// touched.
    pub exempt_priority_above: u8,
    /// How recently (seconds) an exempt-priority entry must have been
    /// touched to stay protected.
    pub exempt_recency_s: f64,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            medium_fraction: 0.15,
            high_fraction: 0.30,
            critical_fraction: 0.60,
            exempt_priority_above: 7,
            exempt_recency_s: 30.0,
        }
    }
}

/// What one eviction pass accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionOutcome {
    /// Registry entries released.
    pub released: usize,
    /// Bytes released from the registry.
    pub released_bytes: u64,
    /// Release callbacks that reported failure (entries dropped anyway).
    pub release_failures: usize,
    /// Cache entries drained in the critical second pass.
    pub cache_evicted: usize,
    /// Bytes drained from the cache.
    pub cache_evicted_bytes: u64,
}

/// Selects and releases registry entries under memory pressure.
pub struct EvictionPolicy {
    config: EvictionConfig,
}

impl EvictionPolicy {
    /// Creates a policy with the given tunables.
    pub fn new(config: EvictionConfig) -> Self {
        Self { config }
    }

    /// The disposal-target share for a tier; `None` below `Medium`.
    fn disposal_fraction(&self, tier: PressureTier) -> Option<f32> {
        match tier {
            PressureTier::Low => None,
            PressureTier::Medium => Some(self.config.medium_fraction),
            PressureTier::High => Some(self.config.high_fraction),
            PressureTier::Critical => Some(self.config.critical_fraction),
        }
    }

    /// Runs one eviction pass.
    ///
    /// Low pressure never evicts. Otherwise disposable entries are sorted
    /// ascending by `(priority, last_used)` and released until the
    /// tier-scaled target count is met, skipping exempt entries. A failing
    /// release callback never aborts the batch. If registry plus cache
    /// totals still classify as critical afterwards, the cache's LRU entries
    /// are drained until the total drops below the critical threshold or the
    /// cache is empty.
    pub fn run<R>(
        &self,
        registry: &mut ResourceRegistry,
        cache: &mut DecodedCache<R>,
        thresholds: &PressureThresholds,
        tier: PressureTier,
        now_s: f64,
    ) -> EvictionOutcome {
        let mut outcome = EvictionOutcome::default();
        let Some(fraction) = self.disposal_fraction(tier) else {
            return outcome;
        };

        let mut candidates = registry.disposable_candidates();
        candidates.sort_by(|a, b| {
            a.priority.cmp(&b.priority).then(
                a.last_used_s
                    .partial_cmp(&b.last_used_s)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
        });

        let target = (candidates.len() as f32 * fraction).ceil() as usize;
        for candidate in &candidates {
            if outcome.released >= target {
                break;
            }
            let exempt = candidate.priority > self.config.exempt_priority_above
                && now_s - candidate.last_used_s < self.config.exempt_recency_s;
            if exempt {
                log::trace!(
                    "EvictionPolicy: {} exempt (priority={}, idle {:.1}s)",
                    candidate.id,
                    candidate.priority,
                    now_s - candidate.last_used_s
                );
                continue;
            }
            if let Some(released) = registry.release(candidate.id) {
                outcome.released += 1;
                outcome.released_bytes += released.size_bytes;
                if released.failed {
                    outcome.release_failures += 1;
                }
            }
        }

        // The cache is a lower-priority pool, drained only if the registry
        // pass was not enough to leave the critical band.
        let remaining = registry.totals().total_bytes + cache.size_bytes();
        if thresholds.classify(remaining) == PressureTier::Critical {
            let overshoot = remaining - thresholds.critical_bytes + 1;
            let (evicted, freed) = cache.evict_lru(overshoot);
            outcome.cache_evicted = evicted;
            outcome.cache_evicted_bytes = freed;
        }

        log::info!(
            "EvictionPolicy: {:?} pass released {} entries ({} bytes, {} failures), \
             {} cache entries ({} bytes)",
            tier,
            outcome.released,
            outcome.released_bytes,
            outcome.release_failures,
            outcome.cache_evicted,
            outcome.cache_evicted_bytes
        );
        outcome
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::new(EvictionConfig::default())
    }
}
