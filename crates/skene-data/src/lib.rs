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

//! # Skene Data
//!
//! Data-plane structures for the scene governor: the registry of live
//! GPU-resident resources and the deduplicating decoded-resource cache.

#![warn(missing_docs)]

pub mod cache;
pub mod registry;

pub use cache::{CacheLoad, DecodeError, DecodeToken, DecodedCache};
pub use registry::{DisposableCandidate, RegistryTotals, ReleasedEntry, ResourceRegistry};
