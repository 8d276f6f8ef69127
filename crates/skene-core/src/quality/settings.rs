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

//! The per-level rendering settings bundle and its static preset table.

use super::QualityLevel;
use serde::{Deserialize, Serialize};

/// The immutable settings bundle the scene layer applies for a quality level.
///
/// Bundles are published on every committed level transition and must be safe
/// to re-apply idempotently. Invariant across the preset table: no field of a
/// higher level is ever strictly cheaper than the same field of a lower level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Render-target resolution multiplier (1.0 = native).
    pub resolution_scale: f32,
    /// Largest texture dimension the loader may upload, in texels.
    pub texture_size_ceiling: u32,
    /// Shadow map side length, in texels.
    pub shadow_map_resolution: u32,
    /// Anisotropic filtering sample count.
    pub anisotropy: u32,
    /// Bloom post-process toggle.
    pub bloom: bool,
    /// Screen-space ambient occlusion toggle.
    pub ambient_occlusion: bool,
    /// Depth-of-field post-process toggle.
    pub depth_of_field: bool,
    /// Temporal anti-aliasing toggle.
    pub temporal_aa: bool,
    /// Ray-traced samples per pixel (0 disables ray-traced effects).
    pub rt_sample_count: u32,
    /// Fraction of authored geometry detail to retain (LOD bias), in `0.0..=1.0`.
    pub geometry_detail: f32,
    /// Draw-call budget the scene layer should stay under.
    pub max_draw_calls: u32,
}

impl QualitySettings {
    /// Returns the preset bundle for `level`.
    pub const fn preset(level: QualityLevel) -> Self {
        match level {
            QualityLevel::Minimum => Self {
                resolution_scale: 0.5,
                texture_size_ceiling: 512,
                shadow_map_resolution: 512,
                anisotropy: 1,
                bloom: false,
                ambient_occlusion: false,
                depth_of_field: false,
                temporal_aa: false,
                rt_sample_count: 0,
                geometry_detail: 0.3,
                max_draw_calls: 500,
            },
            QualityLevel::Low => Self {
                resolution_scale: 0.75,
                texture_size_ceiling: 1024,
                shadow_map_resolution: 1024,
                anisotropy: 2,
                bloom: true,
                ambient_occlusion: false,
                depth_of_field: false,
                temporal_aa: false,
                rt_sample_count: 0,
                geometry_detail: 0.5,
                max_draw_calls: 1000,
            },
            QualityLevel::Medium => Self {
                resolution_scale: 1.0,
                texture_size_ceiling: 2048,
                shadow_map_resolution: 2048,
                anisotropy: 4,
                bloom: true,
                ambient_occlusion: true,
                depth_of_field: false,
                temporal_aa: false,
                rt_sample_count: 0,
                geometry_detail: 0.7,
                max_draw_calls: 2000,
            },
            QualityLevel::High => Self {
                resolution_scale: 1.0,
                texture_size_ceiling: 4096,
                shadow_map_resolution: 4096,
                anisotropy: 8,
                bloom: true,
                ambient_occlusion: true,
                depth_of_field: false,
                temporal_aa: true,
                rt_sample_count: 1,
                geometry_detail: 0.85,
                max_draw_calls: 4000,
            },
            QualityLevel::Ultra => Self {
                resolution_scale: 1.0,
                texture_size_ceiling: 8192,
                shadow_map_resolution: 8192,
                anisotropy: 16,
                bloom: true,
                ambient_occlusion: true,
                depth_of_field: true,
                temporal_aa: true,
                rt_sample_count: 4,
                geometry_detail: 1.0,
                max_draw_calls: 8000,
            },
        }
    }

    /// Returns `true` if no field of `self` is strictly cheaper than the
    /// corresponding field of `lower`, and every effect enabled in `lower` is
    /// also enabled in `self`.
    pub fn cost_dominates(&self, lower: &Self) -> bool {
        self.resolution_scale >= lower.resolution_scale
            && self.texture_size_ceiling >= lower.texture_size_ceiling
            && self.shadow_map_resolution >= lower.shadow_map_resolution
            && self.anisotropy >= lower.anisotropy
            && (self.bloom || !lower.bloom)
            && (self.ambient_occlusion || !lower.ambient_occlusion)
            && (self.depth_of_field || !lower.depth_of_field)
            && (self.temporal_aa || !lower.temporal_aa)
            && self.rt_sample_count >= lower.rt_sample_count
            && self.geometry_detail >= lower.geometry_detail
            && self.max_draw_calls >= lower.max_draw_calls
    }
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self::preset(QualityLevel::Medium)
    }
}
