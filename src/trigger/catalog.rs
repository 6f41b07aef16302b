//! Trigger catalog: the closed set of causes competing for slow motion
//!
//! Each kind carries an immutable integer priority (higher wins) and belongs
//! to exactly one family. Priorities are deliberately spaced so new kinds can
//! slot between existing ones without renumbering.

use serde::{Deserialize, Serialize};

/// Trigger causes for slow motion, ordered by cinematic importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    BasicKill,
    Dismemberment,
    Critical,
    Parry,
    Decapitation,
    LastEnemy,
    LastStand,
}

/// Trigger families, used for telemetry grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerFamily {
    Kill,
    Parry,
    Survival,
}

impl TriggerKind {
    /// All kinds, lowest priority first.
    pub const ALL: [TriggerKind; 7] = [
        TriggerKind::BasicKill,
        TriggerKind::Dismemberment,
        TriggerKind::Critical,
        TriggerKind::Parry,
        TriggerKind::Decapitation,
        TriggerKind::LastEnemy,
        TriggerKind::LastStand,
    ];

    /// Arbitration priority. Strictly higher priority pre-empts; ties lose
    /// to whatever is already active.
    pub fn priority(&self) -> i32 {
        match self {
            TriggerKind::BasicKill => 10,
            TriggerKind::Dismemberment => 20,
            TriggerKind::Critical => 30,
            TriggerKind::Parry => 40,
            TriggerKind::Decapitation => 50,
            TriggerKind::LastEnemy => 60,
            TriggerKind::LastStand => 100,
        }
    }

    pub fn family(&self) -> TriggerFamily {
        match self {
            TriggerKind::Parry => TriggerFamily::Parry,
            TriggerKind::LastStand => TriggerFamily::Survival,
            _ => TriggerFamily::Kill,
        }
    }

    /// Stable lowercase key for telemetry maps.
    pub fn key(&self) -> &'static str {
        match self {
            TriggerKind::BasicKill => "basic_kill",
            TriggerKind::Dismemberment => "dismemberment",
            TriggerKind::Critical => "critical",
            TriggerKind::Parry => "parry",
            TriggerKind::Decapitation => "decapitation",
            TriggerKind::LastEnemy => "last_enemy",
            TriggerKind::LastStand => "last_stand",
        }
    }

    /// Short display name for logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            TriggerKind::BasicKill => "KILL",
            TriggerKind::Dismemberment => "DISMEMBER",
            TriggerKind::Critical => "CRITICAL",
            TriggerKind::Parry => "PARRY",
            TriggerKind::Decapitation => "DECAPITATION",
            TriggerKind::LastEnemy => "LAST ENEMY",
            TriggerKind::LastStand => "LAST STAND",
        }
    }
}

/// Resolved parameter bundle for one arbitration decision.
///
/// Resolved once per attempt from the host's `ConfigProvider`; immutable for
/// the lifetime of the decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerParams {
    pub enabled: bool,
    /// Probability in [0, 1] that an otherwise-accepted attempt fires.
    pub chance: f32,
    /// Simulation time scale applied while active, clamped to [0.01, 1.0]
    /// at application time.
    pub time_scale: f32,
    /// Real-time seconds the dilation lasts.
    pub duration: f32,
    /// Per-kind cooldown armed when this trigger starts.
    pub cooldown: f32,
    /// Whether this trigger may hand off to the third-person killcam.
    pub killcam: bool,
}

impl TriggerParams {
    /// A disabled bundle; rejected at the `TriggerDisabled` check.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            chance: 0.0,
            time_scale: 0.5,
            duration: 1.0,
            cooldown: 0.0,
            killcam: false,
        }
    }
}

/// Resolves the parameter bundle for a trigger kind on demand.
///
/// Implementations reflect live user settings; the engine assumes no caching
/// and re-resolves on every attempt.
pub trait ConfigProvider {
    fn params(&self, kind: TriggerKind) -> TriggerParams;
}

/// Built-in tuning presets, from subtle accents to full drama.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    Subtle,
    Balanced,
    Cinematic,
}

/// `ConfigProvider` backed by the hardcoded preset tables.
///
/// Each trigger has unique values tailored to its cinematic importance:
/// basic kills stay subtle, decapitations get the full treatment.
#[derive(Debug, Clone)]
pub struct PresetConfig {
    pub preset: Preset,
}

impl PresetConfig {
    pub fn new(preset: Preset) -> Self {
        Self { preset }
    }
}

impl ConfigProvider for PresetConfig {
    fn params(&self, kind: TriggerKind) -> TriggerParams {
        let (chance, time_scale, duration, cooldown, killcam) = match (kind, self.preset) {
            // Basic kills are common - keep subtle
            (TriggerKind::BasicKill, Preset::Subtle) => (0.15, 0.5, 0.5, 10.0, false),
            (TriggerKind::BasicKill, Preset::Balanced) => (0.25, 0.35, 1.0, 5.0, false),
            (TriggerKind::BasicKill, Preset::Cinematic) => (0.4, 0.25, 1.5, 3.0, false),

            // Head/throat shots are impactful - more dramatic
            (TriggerKind::Critical, Preset::Subtle) => (0.5, 0.4, 1.0, 8.0, false),
            (TriggerKind::Critical, Preset::Balanced) => (0.75, 0.25, 1.5, 5.0, false),
            (TriggerKind::Critical, Preset::Cinematic) => (1.0, 0.15, 2.5, 3.0, true),

            // Limb severing - moderately dramatic
            (TriggerKind::Dismemberment, Preset::Subtle) => (0.4, 0.45, 1.0, 8.0, false),
            (TriggerKind::Dismemberment, Preset::Balanced) => (0.6, 0.3, 1.5, 5.0, false),
            (TriggerKind::Dismemberment, Preset::Cinematic) => (0.85, 0.2, 2.5, 3.0, false),

            // Decapitation is rare and epic - maximum impact
            (TriggerKind::Decapitation, Preset::Subtle) => (0.7, 0.35, 1.5, 5.0, false),
            (TriggerKind::Decapitation, Preset::Balanced) => (0.9, 0.2, 2.0, 4.0, true),
            (TriggerKind::Decapitation, Preset::Cinematic) => (1.0, 0.1, 3.5, 2.0, true),

            // Parries need quick response - shorter duration
            (TriggerKind::Parry, Preset::Subtle) => (0.3, 0.45, 0.8, 10.0, false),
            (TriggerKind::Parry, Preset::Balanced) => (0.5, 0.3, 1.2, 7.0, false),
            (TriggerKind::Parry, Preset::Cinematic) => (0.75, 0.2, 1.8, 5.0, false),

            // Final kill of a wave - celebratory, no cooldown
            (TriggerKind::LastEnemy, Preset::Subtle) => (0.8, 0.35, 2.0, 0.0, false),
            (TriggerKind::LastEnemy, Preset::Balanced) => (1.0, 0.2, 3.0, 0.0, true),
            (TriggerKind::LastEnemy, Preset::Cinematic) => (1.0, 0.1, 5.0, 0.0, true),

            // Near-death experience - always fires, long rearm
            (TriggerKind::LastStand, Preset::Subtle) => (1.0, 0.25, 3.0, 60.0, false),
            (TriggerKind::LastStand, Preset::Balanced) => (1.0, 0.15, 5.0, 45.0, false),
            (TriggerKind::LastStand, Preset::Cinematic) => (1.0, 0.1, 8.0, 30.0, false),
        };

        TriggerParams {
            enabled: true,
            chance,
            time_scale,
            duration,
            cooldown,
            killcam,
        }
    }
}
