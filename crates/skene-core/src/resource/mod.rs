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

//! Identity and metadata for GPU-resident resources tracked by the registry.
//!
//! The registry holds a non-owning view: the scene layer keeps true ownership
//! of the GPU object and hands the registry a release callback, invoked at
//! most once over the resource's lifetime.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The highest meaningful resource priority. Values above this are clamped
/// at registration.
pub const MAX_PRIORITY: u8 = 10;

/// Opaque, stable identifier for a tracked GPU resource.
///
/// The scene layer supplies the value; the governor only requires it to be
/// stable for the lifetime of the underlying GPU object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Wraps a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The broad category of a tracked resource, matched exhaustively by the
/// classifier and the eviction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Vertex/index buffers and derived geometry.
    Geometry,
    /// Sampled textures.
    Texture,
    /// Material parameter blocks and pipelines.
    Material,
    /// Anything else worth accounting for.
    Other,
}

/// Registration-time metadata for a tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDesc {
    /// Category of the resource.
    pub kind: ResourceKind,
    /// Estimated GPU memory footprint in bytes. Estimates are expected;
    /// byte-accurate accounting is a non-goal.
    pub size_bytes: u64,
    /// Keep-priority in `0..=10`, higher meaning more important to keep.
    pub priority: u8,
    /// Whether the eviction policy may reclaim this resource under pressure.
    pub disposable: bool,
}

impl ResourceDesc {
    /// Creates a descriptor with default priority 5, disposable.
    pub fn new(kind: ResourceKind, size_bytes: u64) -> Self {
        Self {
            kind,
            size_bytes,
            priority: 5,
            disposable: true,
        }
    }

    /// Sets the keep-priority, clamped to [`MAX_PRIORITY`].
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(MAX_PRIORITY);
        self
    }

    /// Marks the resource as non-disposable (never evicted).
    pub fn pinned(mut self) -> Self {
        self.disposable = false;
        self
    }
}

/// An error reported by a resource release callback.
///
/// Release failures never abort an eviction batch; they are logged and the
/// registry entry is dropped regardless.
#[derive(Debug, Clone)]
pub enum ReleaseError {
    /// The rendering backend rejected or failed the release.
    Backend(String),
}

impl Display for ReleaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseError::Backend(msg) => write!(f, "backend release failed: {msg}"),
        }
    }
}

impl std::error::Error for ReleaseError {}

/// The release callback attached at registration, invoked exactly once when
/// the resource is unregistered or evicted.
pub type ReleaseFn = Box<dyn FnOnce() -> Result<(), ReleaseError>>;
