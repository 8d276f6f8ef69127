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

//! Performance observation types exchanged with the scene layer.

use serde::{Deserialize, Serialize};

/// Renderer statistics reported alongside each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Draw calls encoded for the frame.
    pub draw_calls: u32,
    /// Triangles submitted for the frame.
    pub triangles: u32,
}

/// A derived view of recent performance, recomputed once per sampling
/// interval and replaced wholesale — never partially updated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Frames per second implied by the mean frame time.
    pub fps: f32,
    /// Mean frame duration over the full rolling window, in milliseconds.
    pub mean_frame_time_ms: f32,
    /// Population standard deviation of frame durations, in milliseconds.
    /// High values indicate stutter.
    pub frame_time_std_dev_ms: f32,
    /// Draw calls from the most recent frame.
    pub draw_calls: u32,
    /// Triangles from the most recent frame.
    pub triangles: u32,
}
