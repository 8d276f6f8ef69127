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

//! # Skene Control
//!
//! The runtime governor that keeps an interactive 3D scene inside its
//! frame-time and memory budgets: a rolling frame sampler, a hysteretic
//! quality-level state machine, a memory-pressure classifier, and a
//! priority-aware eviction policy, orchestrated by a single per-frame tick.
//!
//! Everything here runs single-threaded on the render-loop callback; there
//! is no locking discipline because control is never yielded mid-operation.

#![warn(missing_docs)]

pub mod eviction;
pub mod governor;
pub mod ladder;
pub mod pressure;
pub mod sampler;

pub use eviction::{EvictionConfig, EvictionOutcome, EvictionPolicy};
pub use governor::{GovernorConfig, SceneGovernor};
pub use ladder::{LadderConfig, QualityLadder};
pub use pressure::PressureClassifier;
pub use sampler::{FrameSampler, SampleWindow};
