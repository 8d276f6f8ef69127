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

//! The registry of live GPU-resident resources.
//!
//! The registry is the single funnel for resource disposal: every release
//! path — explicit unregistration by the scene layer or forced eviction under
//! pressure — goes through one function with consistent failure handling.
//! Resource lifetimes in the scene layer are managed independently, so races
//! between creation/destruction and governor bookkeeping are expected and
//! treated as benign.

use skene_core::memory::KindTotals;
use skene_core::resource::{ReleaseFn, ResourceDesc, ResourceId, ResourceKind, MAX_PRIORITY};
use std::collections::HashMap;

struct TrackedEntry {
    kind: ResourceKind,
    size_bytes: u64,
    priority: u8,
    last_used_s: f64,
    disposable: bool,
    // Taken exactly once; `None` can only be observed transiently inside
    // `release_entry`, never by a stored entry.
    release: Option<ReleaseFn>,
}

/// Per-kind byte totals plus live count, produced by the registry's single
/// O(n) scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryTotals {
    /// Bytes broken down by resource kind.
    pub by_kind: KindTotals,
    /// Sum over all kinds.
    pub total_bytes: u64,
    /// Number of live entries.
    pub live: usize,
}

/// A disposable entry snapshot handed to the eviction policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisposableCandidate {
    /// Resource identity.
    pub id: ResourceId,
    /// Keep-priority.
    pub priority: u8,
    /// Last-use timestamp on the governor clock, in seconds.
    pub last_used_s: f64,
    /// Estimated size in bytes.
    pub size_bytes: u64,
}

/// The result of releasing a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasedEntry {
    /// Estimated size of the released resource.
    pub size_bytes: u64,
    /// `true` if the release callback reported a failure. The entry is
    /// removed either way.
    pub failed: bool,
}

/// Mapping from resource identity to metadata and release callback.
///
/// The registry is the single writer of tracked entries; the scene layer
/// interacts exclusively through [`register`](Self::register),
/// [`touch`](Self::touch) and [`unregister`](Self::unregister).
#[derive(Default)]
pub struct ResourceRegistry {
    entries: HashMap<ResourceId, TrackedEntry>,
    disposed_count: u64,
    disposed_bytes: u64,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource, or updates its metadata if the id is already
    /// present.
    ///
    /// Idempotent: re-registering never duplicates an entry or double-counts
    /// size. On an update the previous release callback is replaced without
    /// being invoked — the scene layer re-registers precisely when it has
    /// recreated the GPU object, so the stale callback must not fire.
    pub fn register(
        &mut self,
        id: ResourceId,
        desc: ResourceDesc,
        release: ReleaseFn,
        now_s: f64,
    ) {
        let priority = desc.priority.min(MAX_PRIORITY);
        match self.entries.get_mut(&id) {
            Some(entry) => {
                log::debug!(
                    "ResourceRegistry: re-register {id} ({:?}, {} bytes) — updating metadata",
                    desc.kind,
                    desc.size_bytes
                );
                entry.kind = desc.kind;
                entry.size_bytes = desc.size_bytes;
                entry.priority = priority;
                entry.disposable = desc.disposable;
                entry.last_used_s = now_s;
                entry.release = Some(release);
            }
            None => {
                log::trace!(
                    "ResourceRegistry: register {id} ({:?}, {} bytes, priority={priority})",
                    desc.kind,
                    desc.size_bytes
                );
                self.entries.insert(
                    id,
                    TrackedEntry {
                        kind: desc.kind,
                        size_bytes: desc.size_bytes,
                        priority,
                        last_used_s: now_s,
                        disposable: desc.disposable,
                        release: Some(release),
                    },
                );
            }
        }
    }

    /// Marks a resource as used now. O(1); an unknown id is a no-op.
    pub fn touch(&mut self, id: ResourceId, now_s: f64) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.last_used_s = now_s;
        }
    }

    /// Releases and removes a resource on behalf of the scene layer.
    ///
    /// The release callback runs exactly once; a second call with the same id
    /// — or a call after the entry was evicted — is a benign no-op, because
    /// lifetimes race with governor bookkeeping by design. Returns `true` if
    /// an entry was actually released.
    pub fn unregister(&mut self, id: ResourceId) -> bool {
        match self.release_entry(id) {
            Some(_) => true,
            None => {
                log::trace!("ResourceRegistry: unregister of unknown {id} ignored");
                false
            }
        }
    }

    /// Forcibly releases a resource during an eviction pass.
    ///
    /// Identical contract to [`unregister`](Self::unregister) but reports the
    /// released size and whether the callback failed, so the eviction policy
    /// can account for the batch.
    pub fn release(&mut self, id: ResourceId) -> Option<ReleasedEntry> {
        self.release_entry(id)
    }

    fn release_entry(&mut self, id: ResourceId) -> Option<ReleasedEntry> {
        let mut entry = self.entries.remove(&id)?;
        let mut failed = false;
        if let Some(release) = entry.release.take() {
            if let Err(err) = release() {
                // Better to leak backend bookkeeping than to retain a
                // resource the scene layer believes was released.
                log::warn!("ResourceRegistry: release of {id} failed: {err}; entry dropped");
                failed = true;
            }
        }
        self.disposed_count += 1;
        self.disposed_bytes += entry.size_bytes;
        Some(ReleasedEntry {
            size_bytes: entry.size_bytes,
            failed,
        })
    }

    /// Returns `true` if the id is currently tracked.
    pub fn contains(&self, id: ResourceId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no resources are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cumulative count of resources released since session start.
    pub fn disposed_count(&self) -> u64 {
        self.disposed_count
    }

    /// Cumulative bytes released since session start.
    pub fn disposed_bytes(&self) -> u64 {
        self.disposed_bytes
    }

    /// Scans all entries and produces per-kind byte totals.
    ///
    /// This is the registry's only O(n) operation; it is invoked from the
    /// classifier's periodic pass, never per-frame.
    pub fn totals(&self) -> RegistryTotals {
        let mut by_kind = KindTotals::default();
        for entry in self.entries.values() {
            by_kind.add(entry.kind, entry.size_bytes);
        }
        RegistryTotals {
            by_kind,
            total_bytes: by_kind.total(),
            live: self.entries.len(),
        }
    }

    /// Snapshots every disposable entry for the eviction policy.
    pub fn disposable_candidates(&self) -> Vec<DisposableCandidate> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.disposable)
            .map(|(id, entry)| DisposableCandidate {
                id: *id,
                priority: entry.priority,
                last_used_s: entry.last_used_s,
                size_bytes: entry.size_bytes,
            })
            .collect()
    }
}
