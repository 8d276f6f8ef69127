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

//! The discrete quality model: ordered levels, the capability probe that
//! picks a starting level, and the immutable settings bundle per level.

mod level;
mod settings;

pub use level::{initial_level, CapabilityProbe, GpuTier, QualityLevel};
pub use settings::QualitySettings;
