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

//! Ordered quality levels and the startup capability probe.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A discrete, totally ordered rendering quality level.
///
/// The ordering is load-bearing: the governor moves "one level up/down" and
/// "two levels down" directly on this enum, clamping at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLevel {
    /// Survival mode: everything expensive is off.
    Minimum,
    /// Reduced fidelity for weak or struggling hardware.
    Low,
    /// The baseline experience.
    Medium,
    /// Full fidelity for capable hardware.
    High,
    /// Maximum fidelity. Never chosen at startup; reachable only by a
    /// sustained, earned upgrade.
    Ultra,
}

impl QualityLevel {
    /// All levels in ascending order.
    pub const ALL: [QualityLevel; 5] = [
        QualityLevel::Minimum,
        QualityLevel::Low,
        QualityLevel::Medium,
        QualityLevel::High,
        QualityLevel::Ultra,
    ];

    /// Returns the position of this level in the ascending order (0-based).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the level `steps` below this one, saturating at [`Minimum`](Self::Minimum).
    pub fn step_down(self, steps: usize) -> Self {
        Self::ALL[self.index().saturating_sub(steps)]
    }

    /// Returns the level `steps` above this one, saturating at [`Ultra`](Self::Ultra).
    pub fn step_up(self, steps: usize) -> Self {
        Self::ALL[(self.index() + steps).min(Self::ALL.len() - 1)]
    }
}

impl Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QualityLevel::Minimum => "minimum",
            QualityLevel::Low => "low",
            QualityLevel::Medium => "medium",
            QualityLevel::High => "high",
            QualityLevel::Ultra => "ultra",
        };
        write!(f, "{name}")
    }
}

/// Coarse GPU capability tier reported by the platform probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GpuTier {
    /// Software rasterizer or heavily constrained integrated part.
    Minimal,
    /// Low-end integrated graphics.
    Basic,
    /// Mid-range discrete or strong integrated graphics.
    Capable,
    /// High-end discrete graphics.
    Premium,
}

impl GpuTier {
    /// Maps the raw 0–3 probe value onto a tier. Out-of-range values are
    /// treated as [`Premium`](Self::Premium).
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => GpuTier::Minimal,
            1 => GpuTier::Basic,
            2 => GpuTier::Capable,
            _ => GpuTier::Premium,
        }
    }
}

/// The one-shot capability probe result supplied by the scene layer at
/// session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProbe {
    /// Coarse GPU tier.
    pub tier: GpuTier,
    /// Whether a higher-throughput rendering backend is available.
    pub high_throughput_backend: bool,
}

/// Picks the starting quality level for a probe result.
///
/// Low-capability probes start at `Minimum`/`Low`; the best probes start at
/// `High`, and only with the high-throughput backend present. `Ultra` is
/// never an initial guess.
pub fn initial_level(probe: &CapabilityProbe) -> QualityLevel {
    match probe.tier {
        GpuTier::Minimal => QualityLevel::Minimum,
        GpuTier::Basic => QualityLevel::Low,
        GpuTier::Capable => QualityLevel::Medium,
        GpuTier::Premium => {
            if probe.high_throughput_backend {
                QualityLevel::High
            } else {
                QualityLevel::Medium
            }
        }
    }
}
