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

//! The decoded-resource cache: a key-value store from source identifier
//! (asset URL) to a decoded, GPU-ready resource.
//!
//! Concurrent load requests for the same key are coalesced into a single
//! decode, and completions are generation-stamped so a result arriving after
//! its key was invalidated is discarded instead of inserted. Values are
//! handed out as shared `Rc` handles, so any given source is resident at
//! most once — the same load-once contract as a shared asset store.

use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

/// An error surfaced by [`DecodedCache::complete`].
///
/// Decode failure is the one error category the governor propagates to its
/// collaborator; the caller may retry (failures are never cached) or fall
/// back to a lower-fidelity source.
#[derive(Debug, Clone)]
pub enum DecodeError {
    /// The decode itself failed.
    Failed(String),
    /// The key was invalidated (or re-decoded) while this decode was in
    /// flight; the result was discarded on arrival.
    Superseded,
}

impl DecodeError {
    /// Convenience constructor for a failed decode.
    pub fn failed(msg: impl Into<String>) -> Self {
        DecodeError::Failed(msg.into())
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Failed(msg) => write!(f, "decode failed: {msg}"),
            DecodeError::Superseded => write!(f, "decode superseded by invalidation"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Proof that a decode was started for a key, carrying the generation stamp
/// checked at completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeToken {
    key: String,
    generation: u64,
}

impl DecodeToken {
    /// The source key this decode belongs to.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// The outcome of a [`DecodedCache::load`] call.
#[derive(Debug)]
pub enum CacheLoad<R> {
    /// The resource is resident; a shared handle to it.
    Ready(Rc<R>),
    /// A decode is in flight (started by this call or an earlier one); the
    /// value will appear in the cache once completed.
    Pending,
}

struct Slot<R> {
    value: Rc<R>,
    size_bytes: u64,
    last_access: u64,
}

/// Deduplicating store of decoded GPU-ready resources.
///
/// Distinct from the priority-ordered registry, the cache is an LRU-ordered
/// second-tier pool: the eviction policy drains its least-recently-used
/// entries when pressure stays critical after a registry pass.
pub struct DecodedCache<R> {
    entries: HashMap<String, Slot<R>>,
    in_flight: HashMap<String, u64>,
    next_generation: u64,
    access_clock: u64,
    total_bytes: u64,
}

impl<R> Default for DecodedCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> DecodedCache<R> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            next_generation: 0,
            access_clock: 0,
            total_bytes: 0,
        }
    }

    /// Returns a shared handle to the cached resource, bumping its recency.
    pub fn get(&mut self, key: &str) -> Option<Rc<R>> {
        self.access_clock += 1;
        let clock = self.access_clock;
        self.entries.get_mut(key).map(|slot| {
            slot.last_access = clock;
            Rc::clone(&slot.value)
        })
    }

    /// Requests the resource for `key`, coalescing concurrent loads.
    ///
    /// If the value is resident, returns [`CacheLoad::Ready`] without calling
    /// `start_decode`. If a decode for the key is already in flight, returns
    /// [`CacheLoad::Pending`], again without calling `start_decode` — the
    /// earlier request's decode serves both callers. Otherwise the key is
    /// marked in flight, `start_decode` is invoked exactly once with the
    /// token to hand back to [`complete`](Self::complete), and
    /// [`CacheLoad::Pending`] is returned.
    pub fn load(&mut self, key: &str, start_decode: impl FnOnce(DecodeToken)) -> CacheLoad<R> {
        if let Some(value) = self.get(key) {
            return CacheLoad::Ready(value);
        }
        if self.in_flight.contains_key(key) {
            log::trace!("DecodedCache: coalescing load of '{key}' into in-flight decode");
            return CacheLoad::Pending;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.in_flight.insert(key.to_owned(), generation);
        start_decode(DecodeToken {
            key: key.to_owned(),
            generation,
        });
        CacheLoad::Pending
    }

    /// Completes an in-flight decode.
    ///
    /// On success the value and its estimated size are inserted and a shared
    /// handle is returned. A stale token — the key was invalidated or cleared
    /// since the decode started — discards the result and reports
    /// [`DecodeError::Superseded`]. A failed decode clears the in-flight
    /// marker without caching anything, so the key can be retried.
    pub fn complete(
        &mut self,
        token: DecodeToken,
        outcome: Result<(R, u64), DecodeError>,
    ) -> Result<Rc<R>, DecodeError> {
        match self.in_flight.get(&token.key) {
            Some(generation) if *generation == token.generation => {}
            _ => {
                log::debug!(
                    "DecodedCache: discarding stale decode result for '{}'",
                    token.key
                );
                return Err(DecodeError::Superseded);
            }
        }
        self.in_flight.remove(&token.key);

        match outcome {
            Ok((value, size_bytes)) => {
                let value = Rc::new(value);
                self.access_clock += 1;
                self.total_bytes += size_bytes;
                self.entries.insert(
                    token.key,
                    Slot {
                        value: Rc::clone(&value),
                        size_bytes,
                        last_access: self.access_clock,
                    },
                );
                Ok(value)
            }
            Err(err) => {
                log::debug!("DecodedCache: decode of '{}' failed: {err}", token.key);
                Err(err)
            }
        }
    }

    /// Drops the entry for `key` and orphans any in-flight decode for it.
    /// Returns `true` if a resident entry was removed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.in_flight.remove(key);
        match self.entries.remove(key) {
            Some(slot) => {
                self.total_bytes -= slot.size_bytes;
                true
            }
            None => false,
        }
    }

    /// Drops every entry and orphans all in-flight decodes.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
        self.total_bytes = 0;
    }

    /// Evicts least-recently-used entries until at least `bytes_to_free`
    /// bytes have been reclaimed or the cache is empty. Returns the number of
    /// entries evicted and the bytes actually freed.
    pub fn evict_lru(&mut self, bytes_to_free: u64) -> (usize, u64) {
        let mut evicted = 0;
        let mut freed = 0;
        while freed < bytes_to_free {
            let Some(key) = self
                .entries
                .iter()
                .min_by_key(|(_, slot)| slot.last_access)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            let slot = self.entries.remove(&key).expect("key came from entries");
            self.total_bytes -= slot.size_bytes;
            freed += slot.size_bytes;
            evicted += 1;
            log::debug!("DecodedCache: evicted '{key}' ({} bytes, LRU)", slot.size_bytes);
        }
        (evicted, freed)
    }

    /// Estimated total bytes of resident entries.
    pub fn size_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
