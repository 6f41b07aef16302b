//! Kill/hit classification into trigger candidates
//!
//! Consumes raw host events plus attribution state and produces an ordered
//! list of candidate triggers for the arbiter to try, highest priority
//! first. Classification policy encodes game-design intent; the ordering and
//! attribution rules here are deliberate, not incidental.

use crate::classify::attribution::AttributionTracker;
use crate::classify::events::{HitEvent, KillEvent};
use crate::classify::expiring::ExpiringMap;
use crate::core::config::EngineConfig;
use crate::core::types::{CreatureId, PartId};
use crate::trigger::catalog::{ConfigProvider, TriggerKind, TriggerParams};

/// One candidate trigger for a single combat event.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: TriggerKind,
    pub params: TriggerParams,
    /// Damage associated with the event, for dynamic intensity.
    pub damage: f32,
    /// Derived impact intensity in [0, 1], for downstream cosmetic effects.
    pub intensity: f32,
    /// Killcam target, when the event names a creature worth watching.
    pub target: Option<CreatureId>,
}

/// Classifies combat events into prioritized trigger candidates.
pub struct CombatEventClassifier {
    attribution: AttributionTracker,
    /// Slice-credit cache: a part instance is credited once per rearm delay,
    /// so the hit/kill event pair for one slice yields one candidate.
    sliced_parts: ExpiringMap<PartId, ()>,

    last_stand_threshold: f32,
    last_enemy_min_group: u32,
    min_usable_speed: f32,
    full_intensity_speed: f32,
    full_intensity_damage: f32,

    /// Largest concurrent enemy count seen this wave.
    wave_peak: u32,
    prev_health_ratio: f32,
    last_stand_fired: bool,
}

impl CombatEventClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            attribution: AttributionTracker::new(config.thrown_window, config.elemental_horizon),
            sliced_parts: ExpiringMap::new(config.slice_rearm_delay),
            last_stand_threshold: config.last_stand_threshold,
            last_enemy_min_group: config.last_enemy_min_group,
            min_usable_speed: config.min_usable_speed,
            full_intensity_speed: config.full_intensity_speed,
            full_intensity_damage: config.full_intensity_damage,
            wave_peak: 0,
            prev_health_ratio: 1.0,
            last_stand_fired: false,
        }
    }

    /// Report the current alive-enemy count (on spawns or periodically).
    /// Keeps the wave peak honest between kill events.
    pub fn note_enemy_count(&mut self, alive: u32) {
        self.wave_peak = self.wave_peak.max(alive);
    }

    /// The player released a grabbed/telekinesis-held creature; arms the
    /// thrown-impact attribution window.
    pub fn record_thrown_release(&mut self, creature: CreatureId, now: f32) {
        self.attribution.record_thrown_release(creature, now);
    }

    /// Amortized housekeeping; call once per frame.
    pub fn sweep(&mut self, now: f32) {
        self.attribution.sweep(now);
        self.sliced_parts.maybe_sweep(now);
    }

    /// Reset per-encounter state (level load, player respawn).
    pub fn reset(&mut self) {
        self.attribution.reset();
        self.sliced_parts.clear();
        self.wave_peak = 0;
        self.prev_health_ratio = 1.0;
        self.last_stand_fired = false;
    }

    /// Classify a non-lethal hit. Player hits drive Last Stand; enemy hits
    /// feed attribution and may yield parry or dismemberment candidates.
    pub fn classify_hit(
        &mut self,
        event: &HitEvent,
        now: f32,
        provider: &dyn ConfigProvider,
    ) -> Vec<Candidate> {
        if event.is_player {
            return self.update_last_stand(event.health_ratio, provider);
        }

        if event.caused_by_player && event.kind.is_elemental() {
            self.attribution
                .record_elemental_hit(event.creature, event.kind, event.amount, now);
        }

        let mut candidates = Vec::new();

        // Zero damage but player contact: the enemy was blocked or parried.
        if event.caused_by_player && event.amount == 0.0 {
            let intensity = self.derive_intensity(None, event.impact_velocity.length(), 0.0);
            candidates.push(self.candidate(TriggerKind::Parry, provider, 0.0, intensity, None));
            return candidates;
        }

        // Non-lethal slice: the part came off even though the creature lived.
        if event.caused_by_player && event.was_sliced && self.credit_slice(event.part_instance, now)
        {
            let intensity = self.derive_intensity(
                None,
                event.impact_velocity.length(),
                event.amount,
            );
            let kind = if event.part.is_critical_region() {
                TriggerKind::Decapitation
            } else {
                TriggerKind::Dismemberment
            };
            candidates.push(self.candidate(
                kind,
                provider,
                event.amount,
                intensity,
                Some(event.creature),
            ));
        }

        candidates
    }

    /// Classify a kill into candidates, descending priority. The caller
    /// tries each against the arbiter until one is accepted.
    pub fn classify_kill(
        &mut self,
        event: &KillEvent,
        now: f32,
        provider: &dyn ConfigProvider,
    ) -> Vec<Candidate> {
        self.sweep(now);

        let mut candidates = Vec::new();

        // Wave bookkeeping first: the dying enemy was alive a moment ago.
        self.wave_peak = self.wave_peak.max(event.remaining_enemies + 1);
        if event.remaining_enemies == 0 {
            if self.wave_peak >= self.last_enemy_min_group {
                candidates.push(self.candidate(
                    TriggerKind::LastEnemy,
                    provider,
                    0.0,
                    1.0,
                    Some(event.creature),
                ));
            }
            self.wave_peak = 0;
        }

        let mut damage = event.collision.as_ref().map_or(0.0, |c| c.damage);
        let mut intensity = event.collision.as_ref().map_or(0.0, |c| {
            self.derive_intensity(c.intensity, c.impact_velocity.length(), c.damage)
        });

        let caused_by_player = event.collision.as_ref().is_some_and(|c| c.caused_by_player);
        if !caused_by_player {
            if self.attribution.claim_thrown(event.creature, now) {
                tracing::debug!(creature = ?event.creature, "thrown impact kill attributed");
            } else if let Some(window) = self.attribution.claim_elemental(event.creature, now) {
                // The kill itself carries no usable collision data; the
                // window supplies the damage estimate.
                damage = window.accumulated;
                intensity = self.derive_intensity(None, 0.0, window.accumulated);
                tracing::debug!(
                    creature = ?event.creature,
                    kind = ?window.kind,
                    "elemental kill attributed"
                );
            } else {
                // Non-player kills never trigger dilation; only a closing
                // wave still celebrates.
                return candidates;
            }
        }

        if let Some(collision) = &event.collision {
            if collision.part.is_critical_region() {
                if collision.was_sliced && self.credit_slice(collision.part_instance, now) {
                    candidates.push(self.candidate(
                        TriggerKind::Decapitation,
                        provider,
                        damage,
                        intensity,
                        Some(event.creature),
                    ));
                }
                candidates.push(self.candidate(
                    TriggerKind::Critical,
                    provider,
                    damage,
                    intensity,
                    Some(event.creature),
                ));
            } else if collision.was_sliced && self.credit_slice(collision.part_instance, now) {
                candidates.push(self.candidate(
                    TriggerKind::Dismemberment,
                    provider,
                    damage,
                    intensity,
                    Some(event.creature),
                ));
            }
        }

        // Universal fallback: every player-caused kill yields at least this.
        candidates.push(self.candidate(
            TriggerKind::BasicKill,
            provider,
            damage,
            intensity,
            Some(event.creature),
        ));

        candidates.sort_by(|a, b| b.kind.priority().cmp(&a.kind.priority()));
        candidates
    }

    /// Edge-triggered Last Stand: fires once on the downward crossing of
    /// the health threshold, re-arming only after recovery above it.
    fn update_last_stand(&mut self, ratio: f32, provider: &dyn ConfigProvider) -> Vec<Candidate> {
        let threshold = self.last_stand_threshold;
        let mut candidates = Vec::new();

        if self.prev_health_ratio > threshold
            && ratio <= threshold
            && ratio > 0.0
            && !self.last_stand_fired
        {
            self.last_stand_fired = true;
            candidates.push(self.candidate(TriggerKind::LastStand, provider, 0.0, 1.0, None));
        }

        if ratio > threshold {
            self.last_stand_fired = false;
        }
        self.prev_health_ratio = ratio;
        candidates
    }

    /// Credit a slice once per part instance per rearm window. A part with
    /// no instance identity cannot be de-duplicated and is always credited.
    fn credit_slice(&mut self, part: Option<PartId>, now: f32) -> bool {
        match part {
            None => true,
            Some(id) => {
                if self.sliced_parts.contains_fresh(&id, now) {
                    false
                } else {
                    self.sliced_parts.insert(id, (), now);
                    true
                }
            }
        }
    }

    /// Impact intensity in [0, 1]: prefer a precomputed value; else impact
    /// speed over the empirical combat range; near-zero speed (status/DOT)
    /// falls back to the damage amount.
    fn derive_intensity(&self, precomputed: Option<f32>, speed: f32, damage: f32) -> f32 {
        if let Some(value) = precomputed {
            return value.clamp(0.0, 1.0);
        }
        if speed >= self.min_usable_speed {
            (speed / self.full_intensity_speed).clamp(0.0, 1.0)
        } else {
            (damage / self.full_intensity_damage).clamp(0.0, 1.0)
        }
    }

    fn candidate(
        &self,
        kind: TriggerKind,
        provider: &dyn ConfigProvider,
        damage: f32,
        intensity: f32,
        target: Option<CreatureId>,
    ) -> Candidate {
        Candidate {
            kind,
            params: provider.params(kind),
            damage,
            intensity,
            target,
        }
    }
}
