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

//! The quality-level state machine.
//!
//! Transition rules are evaluated once per performance snapshot, in strict
//! precedence order: memory overrides first, then severe degradation, then
//! moderate degradation, then upgrade eligibility. Upgrades are hysteretic —
//! a stability counter must see a run of consecutive qualifying snapshots
//! before one commits — which prevents hunting between adjacent levels when
//! performance sits on the boundary.

use skene_core::memory::PressureTier;
use skene_core::quality::QualityLevel;
use skene_core::telemetry::PerformanceSnapshot;

/// Tunable thresholds for the quality ladder.
///
/// The exact constants are empirical tuning; only the shape of the control
/// loop (hysteresis, tiered response) is contract.
#[derive(Debug, Clone, Copy)]
pub struct LadderConfig {
    /// The frame-rate target the ladder defends.
    pub target_fps: f32,
    /// Frame-time budget in milliseconds.
    pub max_frame_time_ms: f32,
    /// Frame-time deviation above which performance counts as unstable,
    /// blocking upgrades.
    pub max_std_dev_ms: f32,
    /// FPS shortfall below target that counts as severe (two-level drop).
    pub severe_fps_shortfall: f32,
    /// FPS shortfall below target that counts as moderate (one-level drop).
    pub moderate_fps_shortfall: f32,
    /// FPS headroom above target required for upgrade eligibility.
    pub upgrade_fps_headroom: f32,
    /// Consecutive qualifying snapshots required before an upgrade commits.
    pub stability_period: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            max_frame_time_ms: 1000.0 / 60.0,
            max_std_dev_ms: 4.0,
            severe_fps_shortfall: 15.0,
            moderate_fps_shortfall: 5.0,
            upgrade_fps_headroom: 15.0,
            stability_period: 10,
        }
    }
}

/// The quality-level state machine. Holds the current level for the lifetime
/// of the session; there are no terminal states.
pub struct QualityLadder {
    config: LadderConfig,
    level: QualityLevel,
    stability: u32,
}

impl QualityLadder {
    /// Creates a ladder starting at `initial` (from the capability probe).
    pub fn new(config: LadderConfig, initial: QualityLevel) -> Self {
        log::info!("QualityLadder: starting at {initial}");
        Self {
            config,
            level: initial,
            stability: 0,
        }
    }

    /// The current quality level.
    pub fn level(&self) -> QualityLevel {
        self.level
    }

    /// Current stability-counter value (qualifying snapshots seen in a row).
    pub fn stability(&self) -> u32 {
        self.stability
    }

    /// Forces the level to `Minimum` without waiting for a snapshot.
    ///
    /// Invoked by the governor the moment the classifier reports critical
    /// pressure. Returns the new level if this was a transition.
    pub fn force_minimum(&mut self) -> Option<QualityLevel> {
        self.commit(QualityLevel::Minimum, "critical memory pressure")
    }

    /// Evaluates the transition rules for one snapshot.
    ///
    /// Returns the new level on a committed transition, `None` otherwise.
    pub fn evaluate(
        &mut self,
        snapshot: &PerformanceSnapshot,
        tier: PressureTier,
    ) -> Option<QualityLevel> {
        // Memory overrides short-circuit the performance branches: dropping
        // further for fps in the same snapshot would double-penalize.
        match tier {
            PressureTier::Critical => {
                return self.commit(QualityLevel::Minimum, "critical memory pressure");
            }
            PressureTier::High => {
                return self.commit(self.level.step_down(1), "high memory pressure");
            }
            PressureTier::Medium | PressureTier::Low => {}
        }

        let cfg = &self.config;
        let severe = snapshot.fps < cfg.target_fps - cfg.severe_fps_shortfall
            || snapshot.mean_frame_time_ms > 1.5 * cfg.max_frame_time_ms;
        if severe {
            return self.commit(self.level.step_down(2), "severe degradation");
        }

        let moderate = snapshot.fps < cfg.target_fps - cfg.moderate_fps_shortfall
            || snapshot.mean_frame_time_ms > cfg.max_frame_time_ms;
        if moderate {
            return self.commit(self.level.step_down(1), "moderate degradation");
        }

        let qualifies = snapshot.fps > cfg.target_fps + cfg.upgrade_fps_headroom
            && snapshot.mean_frame_time_ms < cfg.max_frame_time_ms / 2.0
            && snapshot.frame_time_std_dev_ms < cfg.max_std_dev_ms;
        if qualifies {
            if self.level == QualityLevel::Ultra {
                return None;
            }
            self.stability += 1;
            if self.stability >= cfg.stability_period {
                return self.commit(self.level.step_up(1), "sustained headroom");
            }
            log::trace!(
                "QualityLadder: upgrade pending ({}/{} stable snapshots)",
                self.stability,
                cfg.stability_period
            );
            return None;
        }

        // A non-qualifying snapshot breaks the run.
        self.stability = 0;
        None
    }

    fn commit(&mut self, new_level: QualityLevel, reason: &str) -> Option<QualityLevel> {
        // Every snapshot that reaches here ends the upgrade run, including a
        // degradation or override clamped at the current level.
        self.stability = 0;
        if new_level == self.level {
            return None;
        }
        log::info!("QualityLadder: {} -> {} ({reason})", self.level, new_level);
        self.level = new_level;
        Some(new_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fps: f32) -> PerformanceSnapshot {
        PerformanceSnapshot {
            fps,
            mean_frame_time_ms: 1000.0 / fps,
            frame_time_std_dev_ms: 1.0,
            draw_calls: 0,
            triangles: 0,
        }
    }

    fn ladder_at(level: QualityLevel) -> QualityLadder {
        QualityLadder::new(LadderConfig::default(), level)
    }

    // ── Degradation ──────────────────────────────────────────────────

    #[test]
    fn test_severe_drop_is_two_levels() {
        let mut ladder = ladder_at(QualityLevel::High);
        assert_eq!(
            ladder.evaluate(&snapshot(40.0), PressureTier::Low),
            Some(QualityLevel::Low)
        );
    }

    #[test]
    fn test_severe_drop_clamps_at_minimum() {
        let mut ladder = ladder_at(QualityLevel::Minimum);
        assert_eq!(ladder.evaluate(&snapshot(20.0), PressureTier::Low), None);
        assert_eq!(ladder.level(), QualityLevel::Minimum);
    }

    #[test]
    fn test_moderate_drop_is_one_level() {
        let mut ladder = ladder_at(QualityLevel::Medium);
        // 52 fps: below target - 5, above target - 15.
        assert_eq!(
            ladder.evaluate(&snapshot(52.0), PressureTier::Low),
            Some(QualityLevel::Low)
        );
    }

    #[test]
    fn test_frame_time_alone_triggers_drop() {
        let mut ladder = ladder_at(QualityLevel::High);
        // fps nominally fine but mean frame time blown past 1.5x budget.
        let snap = PerformanceSnapshot {
            fps: 60.0,
            mean_frame_time_ms: 30.0,
            frame_time_std_dev_ms: 1.0,
            draw_calls: 0,
            triangles: 0,
        };
        assert_eq!(
            ladder.evaluate(&snap, PressureTier::Low),
            Some(QualityLevel::Low)
        );
    }

    #[test]
    fn test_steady_state_no_transition() {
        let mut ladder = ladder_at(QualityLevel::Medium);
        for _ in 0..100 {
            assert_eq!(ladder.evaluate(&snapshot(60.0), PressureTier::Low), None);
        }
        assert_eq!(ladder.level(), QualityLevel::Medium);
    }

    // ── Hysteresis ───────────────────────────────────────────────────

    #[test]
    fn test_upgrade_commits_on_tenth_qualifying_snapshot() {
        let mut ladder = ladder_at(QualityLevel::Medium);
        for _ in 0..9 {
            assert_eq!(ladder.evaluate(&snapshot(150.0), PressureTier::Low), None);
        }
        assert_eq!(
            ladder.evaluate(&snapshot(150.0), PressureTier::Low),
            Some(QualityLevel::High)
        );
        // Counter reset: the next run starts from zero again.
        assert_eq!(ladder.stability(), 0);
    }

    #[test]
    fn test_oscillation_at_boundary_never_upgrades() {
        let mut ladder = ladder_at(QualityLevel::Medium);
        // Runs of fewer than 10 qualifying snapshots, each broken by a
        // marginal one.
        for _ in 0..20 {
            for _ in 0..9 {
                assert_eq!(ladder.evaluate(&snapshot(150.0), PressureTier::Low), None);
            }
            assert_eq!(ladder.evaluate(&snapshot(60.0), PressureTier::Low), None);
        }
        assert_eq!(ladder.level(), QualityLevel::Medium);
    }

    #[test]
    fn test_clamped_degradation_still_breaks_upgrade_run() {
        let mut ladder = ladder_at(QualityLevel::Minimum);
        for _ in 0..9 {
            assert_eq!(ladder.evaluate(&snapshot(150.0), PressureTier::Low), None);
        }
        // Severe but already at the floor: no transition, yet the run ends.
        assert_eq!(ladder.evaluate(&snapshot(20.0), PressureTier::Low), None);
        assert_eq!(ladder.stability(), 0);
        // The next qualifying snapshot starts a fresh run, not an upgrade.
        assert_eq!(ladder.evaluate(&snapshot(150.0), PressureTier::Low), None);
        assert_eq!(ladder.level(), QualityLevel::Minimum);
    }

    #[test]
    fn test_clamped_pressure_override_still_breaks_upgrade_run() {
        let mut ladder = ladder_at(QualityLevel::Minimum);
        for _ in 0..9 {
            assert_eq!(ladder.evaluate(&snapshot(150.0), PressureTier::Low), None);
        }
        assert_eq!(ladder.evaluate(&snapshot(150.0), PressureTier::High), None);
        assert_eq!(ladder.stability(), 0);
    }

    #[test]
    fn test_unstable_frame_times_block_upgrade() {
        let mut ladder = ladder_at(QualityLevel::Medium);
        let jittery = PerformanceSnapshot {
            fps: 90.0,
            mean_frame_time_ms: 7.0,
            frame_time_std_dev_ms: 8.0,
            draw_calls: 0,
            triangles: 0,
        };
        for _ in 0..30 {
            assert_eq!(ladder.evaluate(&jittery, PressureTier::Low), None);
        }
        assert_eq!(ladder.level(), QualityLevel::Medium);
    }

    #[test]
    fn test_ultra_reachable_only_by_upgrade() {
        let mut ladder = ladder_at(QualityLevel::High);
        for _ in 0..10 {
            ladder.evaluate(&snapshot(150.0), PressureTier::Low);
        }
        assert_eq!(ladder.level(), QualityLevel::Ultra);
        // Qualifying snapshots at Ultra are a no-op.
        for _ in 0..20 {
            assert_eq!(ladder.evaluate(&snapshot(160.0), PressureTier::Low), None);
        }
    }

    // ── Memory overrides ─────────────────────────────────────────────

    #[test]
    fn test_critical_pressure_beats_upgrade() {
        let mut ladder = ladder_at(QualityLevel::Medium);
        for _ in 0..9 {
            ladder.evaluate(&snapshot(150.0), PressureTier::Low);
        }
        // Tenth snapshot would commit an upgrade, but pressure wins.
        assert_eq!(
            ladder.evaluate(&snapshot(150.0), PressureTier::Critical),
            Some(QualityLevel::Minimum)
        );
    }

    #[test]
    fn test_high_pressure_drops_one_level() {
        let mut ladder = ladder_at(QualityLevel::High);
        assert_eq!(
            ladder.evaluate(&snapshot(60.0), PressureTier::High),
            Some(QualityLevel::Medium)
        );

        let mut floor = ladder_at(QualityLevel::Minimum);
        assert_eq!(floor.evaluate(&snapshot(60.0), PressureTier::High), None);
    }

    #[test]
    fn test_force_minimum_is_idempotent() {
        let mut ladder = ladder_at(QualityLevel::High);
        assert_eq!(ladder.force_minimum(), Some(QualityLevel::Minimum));
        assert_eq!(ladder.force_minimum(), None);
    }
}
