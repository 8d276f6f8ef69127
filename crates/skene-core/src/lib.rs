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

//! # Skene Core
//!
//! Foundational crate containing the value types and contracts shared by the
//! scene runtime governor: quality levels and their preset bundles,
//! performance snapshot types, memory-pressure classification, and the
//! metadata describing tracked GPU resources.

#![warn(missing_docs)]

pub mod memory;
pub mod quality;
pub mod resource;
pub mod telemetry;

pub use memory::{KindTotals, MemoryStats, PressureThresholds, PressureTier};
pub use quality::{CapabilityProbe, GpuTier, QualityLevel, QualitySettings};
pub use resource::{ReleaseError, ReleaseFn, ResourceDesc, ResourceId, ResourceKind};
pub use telemetry::{FrameStats, PerformanceSnapshot};
