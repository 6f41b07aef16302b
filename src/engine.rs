//! Engine composition root
//!
//! One explicitly constructed object owns the arbiter, classifier, killcam,
//! and telemetry, and is driven by the host: combat callbacks in, a single
//! `tick` per frame, drained events out. The host owns the instance; there
//! are no ambient statics anywhere in the crate.

use crate::camera::CameraHost;
use crate::classify::{Candidate, CombatEventClassifier, HitEvent, KillEvent};
use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::types::CreatureId;
use crate::killcam::{KillcamEvent, KillcamState, KillcamStateMachine};
use crate::telemetry::TelemetryAggregator;
use crate::trigger::arbiter::{DilationEvent, TriggerArbiter};
use crate::trigger::catalog::ConfigProvider;

/// State-change notifications for cosmetic systems (screen effects,
/// haptics). Drained by the host; telemetry has already seen them.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Dilation(DilationEvent),
    Killcam(KillcamEvent),
}

pub struct CinematicEngine {
    arbiter: TriggerArbiter,
    classifier: CombatEventClassifier,
    killcam: KillcamStateMachine,
    telemetry: TelemetryAggregator,
    provider: Box<dyn ConfigProvider>,
    /// Unscaled seconds since construction.
    now: f32,
    events: Vec<EngineEvent>,
}

impl CinematicEngine {
    /// Build the engine from a validated config. The killcam RNG is
    /// decorrelated from the arbiter's so chance rolls in one never shift
    /// the other.
    pub fn new(
        config: EngineConfig,
        provider: Box<dyn ConfigProvider>,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let mut arbiter = TriggerArbiter::new(&config, seed);
        arbiter.initialize();
        Ok(Self {
            arbiter,
            classifier: CombatEventClassifier::new(&config),
            killcam: KillcamStateMachine::new(config.killcam.clone(), seed.wrapping_add(1)),
            telemetry: TelemetryAggregator::new(),
            provider,
            now: 0.0,
            events: Vec::new(),
        })
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    /// The authoritative simulation time scale the host should apply.
    pub fn time_scale(&self) -> f32 {
        self.arbiter.time_scale()
    }

    pub fn is_dilated(&self) -> bool {
        self.arbiter.is_active()
    }

    pub fn killcam_state(&self) -> KillcamState {
        self.killcam.state()
    }

    pub fn telemetry(&self) -> &TelemetryAggregator {
        &self.telemetry
    }

    /// Master switch. Disabling cancels an active dilation and aborts any
    /// open killcam session on the spot.
    pub fn set_enabled(&mut self, enabled: bool, host: &mut dyn CameraHost) {
        self.arbiter.set_enabled(enabled);
        if !enabled {
            self.arbiter.cancel();
            self.killcam.force_abort(host);
            self.pump_events(host);
        }
    }

    /// Advance all components by `dt` unscaled seconds. Call once per frame.
    pub fn tick(&mut self, dt: f32, host: &mut dyn CameraHost) {
        let dt = dt.max(0.0);
        self.now += dt;
        self.arbiter.tick(dt);
        self.killcam.tick(dt, host);
        self.classifier.sweep(self.now);
        self.pump_events(host);
        self.telemetry.tick(self.now);
    }

    /// Host callback: a creature (or the player) took a hit.
    pub fn on_creature_hit(&mut self, event: &HitEvent, host: &mut dyn CameraHost) {
        let candidates = self.classifier.classify_hit(event, self.now, &*self.provider);
        self.try_candidates(candidates, host);
    }

    /// Host callback: a creature died. Candidates are tried against the
    /// arbiter in descending priority; the first acceptance wins and may
    /// hand off to the killcam.
    pub fn on_creature_kill(&mut self, event: &KillEvent, host: &mut dyn CameraHost) {
        let candidates = self.classifier.classify_kill(event, self.now, &*self.provider);
        self.telemetry.record_kill_evaluated(!candidates.is_empty());
        self.try_candidates(candidates, host);
    }

    /// Host callback: the player died. Everything cinematic stops at once;
    /// per-encounter classifier state resets.
    pub fn on_player_death(&mut self, host: &mut dyn CameraHost) {
        self.arbiter.cancel();
        self.killcam.force_abort(host);
        self.classifier.reset();
        self.pump_events(host);
    }

    /// Host callback: the player released a grabbed or thrown creature.
    pub fn on_thrown_release(&mut self, creature: CreatureId) {
        self.classifier.record_thrown_release(creature, self.now);
    }

    /// Host callback: current alive-enemy count (spawns, wave changes).
    pub fn on_enemy_count(&mut self, alive: u32) {
        self.classifier.note_enemy_count(alive);
    }

    /// Drain pending state-change events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn try_candidates(&mut self, candidates: Vec<Candidate>, host: &mut dyn CameraHost) {
        for candidate in candidates {
            let verdict = self.arbiter.try_trigger_with_damage(
                candidate.kind,
                &candidate.params,
                candidate.damage,
            );
            self.telemetry.record_attempt(candidate.kind, &verdict);
            if !verdict.is_accepted() {
                continue;
            }
            if candidate.params.killcam {
                if let Some(target) = candidate.target {
                    if let Err(denial) = self.killcam.try_start(
                        host,
                        target,
                        false,
                        candidate.kind,
                        candidate.params.duration,
                        self.now,
                    ) {
                        self.telemetry.record_killcam_denial(denial);
                    }
                }
            }
            break;
        }
        self.pump_events(host);
    }

    fn pump_events(&mut self, host: &mut dyn CameraHost) {
        for event in self.arbiter.drain_events() {
            // A dilation ending takes its killcam session with it: the
            // camera starts its way back instead of orbiting on its own
            // timer.
            if matches!(event, DilationEvent::Ended { .. }) {
                self.killcam.end_session(host);
            }
            self.telemetry.record_dilation_event(&event);
            self.events.push(EngineEvent::Dilation(event));
        }
        for event in self.killcam.drain_events() {
            self.telemetry.record_killcam_event(&event);
            self.events.push(EngineEvent::Killcam(event));
        }
    }
}
