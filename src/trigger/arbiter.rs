//! Central arbitration state machine for slow motion
//!
//! Owns the single authoritative time-scale value, the active-dilation state,
//! and every cooldown clock. All timers count unscaled (real) seconds so they
//! progress at normal speed while the simulation itself is slowed.

use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::core::config::EngineConfig;
use crate::trigger::catalog::{TriggerKind, TriggerParams};
use crate::trigger::verdict::{RejectReason, Verdict};

/// Hard bounds on the applied time scale. The floor guards against a
/// mis-tuned config freezing the simulation outright.
const TIME_SCALE_MIN: f32 = 0.01;
const TIME_SCALE_MAX: f32 = 1.0;

/// Floor used by dynamic intensity, slightly deeper than a config would go.
const DYNAMIC_SCALE_FLOOR: f32 = 0.05;

/// Damage amount that yields the full dynamic-intensity bonus.
const DYNAMIC_FULL_DAMAGE: f32 = 100.0;

/// Fraction of the remaining time-scale headroom dynamic intensity may take.
const DYNAMIC_BONUS_FRACTION: f32 = 0.3;

/// State-change notifications drained by the host each frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DilationEvent {
    Started {
        kind: TriggerKind,
        time_scale: f32,
        duration: f32,
    },
    Ended {
        kind: TriggerKind,
        cancelled: bool,
    },
}

/// The trigger arbiter: decides which competing trigger wins and owns the
/// dilation lifecycle.
///
/// Single-threaded and frame-driven; the host calls [`tick`](Self::tick)
/// once per frame with unscaled delta time.
pub struct TriggerArbiter {
    enabled: bool,
    global_cooldown: f32,
    dynamic_intensity: bool,
    rng: ChaCha8Rng,

    is_active: bool,
    active_kind: Option<TriggerKind>,
    remaining_duration: f32,
    global_cooldown_remaining: f32,
    trigger_cooldowns: HashMap<TriggerKind, f32>,

    /// Time scale in effect before the current dilation started. Restored
    /// exactly on end; never assumed to be 1.0 so nested baselines survive.
    base_time_scale: f32,
    current_time_scale: f32,

    events: Vec<DilationEvent>,
}

impl TriggerArbiter {
    pub fn new(config: &EngineConfig, seed: u64) -> Self {
        Self {
            enabled: config.enabled,
            global_cooldown: config.global_cooldown.max(0.0),
            dynamic_intensity: config.dynamic_intensity,
            rng: ChaCha8Rng::seed_from_u64(seed),
            is_active: false,
            active_kind: None,
            remaining_duration: 0.0,
            global_cooldown_remaining: 0.0,
            trigger_cooldowns: HashMap::new(),
            base_time_scale: 1.0,
            current_time_scale: 1.0,
            events: Vec::new(),
        }
    }

    /// Reset all cooldown timers and deactivate. Idempotent.
    pub fn initialize(&mut self) {
        self.is_active = false;
        self.active_kind = None;
        self.remaining_duration = 0.0;
        self.global_cooldown_remaining = 0.0;
        self.trigger_cooldowns.clear();
        self.current_time_scale = self.base_time_scale;
        tracing::debug!("arbiter initialized");
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn active_kind(&self) -> Option<TriggerKind> {
        self.active_kind
    }

    /// The authoritative simulation time scale. No other component writes it.
    pub fn time_scale(&self) -> f32 {
        self.current_time_scale
    }

    /// Flip the master switch (live settings change).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Advance all clocks by `dt` unscaled seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        self.global_cooldown_remaining = (self.global_cooldown_remaining - dt).max(0.0);
        self.trigger_cooldowns.retain(|_, remaining| {
            *remaining -= dt;
            *remaining > 0.0
        });

        if self.is_active {
            self.remaining_duration -= dt;
            if self.remaining_duration <= 0.0 {
                self.end_dilation(false);
            }
        }
    }

    /// Attempt to start (or pre-empt into) a dilation.
    ///
    /// Checks run in a fixed order and the first failure wins; see
    /// [`RejectReason`] for the ordering contract.
    pub fn try_trigger(&mut self, kind: TriggerKind, params: &TriggerParams) -> Verdict {
        self.try_trigger_with_damage(kind, params, 0.0)
    }

    /// Like [`try_trigger`](Self::try_trigger), with a damage amount that
    /// feeds dynamic intensity when enabled.
    pub fn try_trigger_with_damage(
        &mut self,
        kind: TriggerKind,
        params: &TriggerParams,
        damage: f32,
    ) -> Verdict {
        if !self.enabled {
            return Verdict::Rejected(RejectReason::ModDisabled);
        }

        if !params.enabled {
            return Verdict::Rejected(RejectReason::TriggerDisabled);
        }

        if self.global_cooldown_remaining > 0.0 {
            return Verdict::Rejected(RejectReason::GlobalCooldown);
        }

        if self
            .trigger_cooldowns
            .get(&kind)
            .is_some_and(|remaining| *remaining > 0.0)
        {
            return Verdict::Rejected(RejectReason::TriggerCooldown);
        }

        // Strict comparison: equal priority loses to the active trigger.
        if self.is_active {
            let active_priority = self.active_kind.map_or(i32::MIN, |k| k.priority());
            if active_priority >= kind.priority() {
                return Verdict::Rejected(RejectReason::AlreadyActive);
            }
        }

        // Certain triggers draw no roll, so they never shift the seeded
        // stream for later probabilistic attempts.
        if params.chance < 1.0 {
            let roll: f32 = self.rng.gen();
            if roll > params.chance {
                tracing::debug!(
                    kind = kind.display_name(),
                    roll,
                    chance = params.chance,
                    "chance roll failed"
                );
                return Verdict::Rejected(RejectReason::ChanceFailed);
            }
        }

        self.start_dilation(kind, params, damage);
        Verdict::Accepted
    }

    /// Forced teardown used on player death or engine shutdown. Safe no-op
    /// when nothing is active.
    pub fn cancel(&mut self) {
        self.end_dilation(true);
    }

    /// Take all pending state-change events.
    pub fn drain_events(&mut self) -> Vec<DilationEvent> {
        std::mem::take(&mut self.events)
    }

    fn start_dilation(&mut self, kind: TriggerKind, params: &TriggerParams, damage: f32) {
        // Tear down a pre-empted trigger cleanly so the global baseline is
        // restored before the new scale applies; two multipliers must never
        // compound.
        if self.is_active {
            self.end_dilation(true);
        }

        self.base_time_scale = self.current_time_scale;

        let mut scale = params.time_scale;
        if self.dynamic_intensity && damage > 0.0 {
            // More damage = slower time. Up to 30% of the remaining headroom.
            let multiplier = (damage / DYNAMIC_FULL_DAMAGE).clamp(0.0, 1.0);
            let bonus = (1.0 - scale) * multiplier * DYNAMIC_BONUS_FRACTION;
            scale = (scale - bonus).max(DYNAMIC_SCALE_FLOOR);
        }
        let scale = scale.clamp(TIME_SCALE_MIN, TIME_SCALE_MAX);

        self.is_active = true;
        self.active_kind = Some(kind);
        self.remaining_duration = params.duration.max(0.0);
        self.current_time_scale = scale;
        self.global_cooldown_remaining = self.global_cooldown;
        if params.cooldown > 0.0 {
            self.trigger_cooldowns.insert(kind, params.cooldown);
        }

        tracing::info!(
            kind = kind.display_name(),
            time_scale = scale,
            duration = self.remaining_duration,
            "dilation started"
        );
        self.events.push(DilationEvent::Started {
            kind,
            time_scale: scale,
            duration: self.remaining_duration,
        });
    }

    fn end_dilation(&mut self, cancelled: bool) {
        if !self.is_active {
            return;
        }

        let kind = self.active_kind.take().unwrap_or(TriggerKind::BasicKill);
        self.is_active = false;
        self.remaining_duration = 0.0;
        self.current_time_scale = self.base_time_scale;

        tracing::info!(kind = kind.display_name(), cancelled, "dilation ended");
        self.events.push(DilationEvent::Ended { kind, cancelled });
    }
}
