//! Engine configuration with documented constants
//!
//! All tunables are collected here with explanations of their purpose and
//! how they interact. The config is built by the host and passed by
//! reference; nothing in this crate reads ambient/global state.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// Configuration for the arbitration engine and its classifiers.
///
/// Defaults reproduce the tuned behavior of the shipped mod; changing them
/// changes pacing, not correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Master switch. When false, every trigger attempt is rejected with
    /// `RejectReason::ModDisabled` before any other check runs.
    pub enabled: bool,

    /// Seconds of global cooldown armed whenever any dilation starts.
    ///
    /// Counted on the unscaled clock, so it runs at real-time speed even
    /// while the simulation is slowed.
    pub global_cooldown: f32,

    /// When true, the damage amount accompanying a kill deepens the slow
    /// motion: up to 30% of the remaining time-scale headroom at 100+
    /// damage, floored at 0.05. Off by default so the configured time
    /// scale is applied verbatim.
    pub dynamic_intensity: bool,

    /// Player health ratio below which Last Stand fires.
    ///
    /// Edge-triggered: the crossing from above to at-or-below emits one
    /// candidate, and the detector re-arms only after health recovers
    /// above the threshold again.
    pub last_stand_threshold: f32,

    /// Minimum peak concurrent enemy count for a wave to qualify for the
    /// Last Enemy trigger. Solitary encounters never celebrate.
    pub last_enemy_min_group: u32,

    /// Seconds after a player throw/release during which an impact kill on
    /// the thrown creature is attributed to the player.
    pub thrown_window: f32,

    /// Seconds after a player elemental hit during which a kill of that
    /// creature is attributed to the player. Long because burn/poison
    /// kills land well after the causing hit.
    pub elemental_horizon: f32,

    /// Seconds a sliced part instance stays credited. A second hit/kill
    /// event pair referencing the same slice inside this window produces
    /// no additional dismemberment candidate.
    pub slice_rearm_delay: f32,

    /// Impact speed (m/s) treated as full intensity when deriving impact
    /// intensity from velocity. Speeds at or above this map to 1.0.
    pub full_intensity_speed: f32,

    /// Impact speed (m/s) below which velocity is considered unusable
    /// (status/DOT damage) and intensity falls back to the damage amount.
    pub min_usable_speed: f32,

    /// Damage amount treated as full intensity in the velocity fallback.
    pub full_intensity_damage: f32,

    /// Killcam tuning.
    pub killcam: KillcamConfig,
}

/// Killcam tuning, mirroring the per-trigger third-person options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillcamConfig {
    /// Master killcam switch.
    pub enabled: bool,

    /// Which trigger kinds may open a killcam session.
    pub on_decapitation: bool,
    pub on_critical: bool,
    pub on_last_enemy: bool,

    /// Chance that an eligible trigger actually opens a session.
    pub chance: f32,

    /// Camera placement relative to the target (meters).
    pub distance: f32,
    pub height: f32,
    pub side_offset: f32,

    /// Orbit speed in degrees per unscaled second. Zero holds a static
    /// look-at instead of orbiting.
    pub orbit_speed: f32,

    /// Rate-based transition speeds (progress per unscaled second). The
    /// out-transition is faster so the player regains first person
    /// quickly.
    pub transition_in_speed: f32,
    pub transition_out_speed: f32,

    /// Session length floor in seconds; shorter dilations still get a
    /// watchable killcam.
    pub min_duration: f32,

    /// Seconds after a session ends before the next may start.
    pub cooldown: f32,

    /// Maximum random yaw offset (degrees) applied to the initial camera
    /// placement so back-to-back killcams do not look identical.
    pub random_yaw_max: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global_cooldown: 1.0,
            dynamic_intensity: false,
            last_stand_threshold: 0.25,
            last_enemy_min_group: 3,
            thrown_window: 1.5,
            elemental_horizon: 15.0,
            slice_rearm_delay: 0.5,
            full_intensity_speed: 10.0,
            min_usable_speed: 0.5,
            full_intensity_damage: 100.0,
            killcam: KillcamConfig::default(),
        }
    }
}

impl Default for KillcamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on_decapitation: true,
            on_critical: true,
            on_last_enemy: true,
            chance: 1.0,
            distance: 2.5,
            height: 1.5,
            side_offset: 0.5,
            orbit_speed: 25.0,
            transition_in_speed: 5.0,
            transition_out_speed: 8.0,
            min_duration: 0.5,
            cooldown: 1.0,
            random_yaw_max: 20.0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.global_cooldown < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "global_cooldown ({}) must be >= 0",
                self.global_cooldown
            )));
        }

        if !(0.0..=1.0).contains(&self.last_stand_threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "last_stand_threshold ({}) must be in [0, 1]",
                self.last_stand_threshold
            )));
        }

        if self.thrown_window <= 0.0 || self.elemental_horizon <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "attribution windows must be positive".into(),
            ));
        }

        if self.min_usable_speed >= self.full_intensity_speed {
            return Err(EngineError::InvalidConfig(format!(
                "min_usable_speed ({}) must be < full_intensity_speed ({})",
                self.min_usable_speed, self.full_intensity_speed
            )));
        }

        if !(0.0..=1.0).contains(&self.killcam.chance) {
            return Err(EngineError::InvalidConfig(format!(
                "killcam chance ({}) must be in [0, 1]",
                self.killcam.chance
            )));
        }

        if self.killcam.distance <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "killcam distance must be positive".into(),
            ));
        }

        Ok(())
    }
}
