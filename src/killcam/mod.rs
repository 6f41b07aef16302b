//! Third-person killcam state machine
//!
//! A session walks `Idle → TransitioningIn → Active → TransitioningOut →
//! Idle`. All timers run on unscaled time so camera motion stays smooth
//! while gameplay is dilated. The camera's pre-session local pose is
//! captured before anything else is touched and is the only restore source;
//! every exit path, including faults, writes it back and destroys the
//! transient rig.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::camera::{look_rotation, CameraHost, Pose};
use crate::core::config::KillcamConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::CreatureId;
use crate::trigger::catalog::TriggerKind;

/// Height above the target's root the camera aims at.
const AIM_HEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillcamState {
    Idle,
    TransitioningIn,
    Active,
    TransitioningOut,
}

/// Why a session did not start. Expected outcomes, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDenial {
    Disabled,
    Busy,
    PlayerTarget,
    IneligibleKind,
    OnCooldown,
    ChanceFailed,
    NoCamera,
    NoTarget,
}

impl StartDenial {
    /// Stable lowercase key for telemetry maps.
    pub fn key(&self) -> &'static str {
        match self {
            StartDenial::Disabled => "disabled",
            StartDenial::Busy => "busy",
            StartDenial::PlayerTarget => "player_target",
            StartDenial::IneligibleKind => "ineligible_kind",
            StartDenial::OnCooldown => "on_cooldown",
            StartDenial::ChanceFailed => "chance_failed",
            StartDenial::NoCamera => "no_camera",
            StartDenial::NoTarget => "no_target",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KillcamEvent {
    SessionStarted {
        target: CreatureId,
        kind: TriggerKind,
    },
    SessionEnded {
        kind: TriggerKind,
        aborted: bool,
    },
    Fault(EngineError),
}

struct Session {
    target: CreatureId,
    kind: TriggerKind,
    /// Camera local pose captured before any reparenting. Restore source.
    original_local: Pose,
    /// Camera world pose at session start; in-transition origin and
    /// out-transition destination.
    entry_world: Pose,
    remaining: f32,
    progress: f32,
    /// Orbit bearing around the target, degrees.
    orbit_angle: f32,
    orbit_dir: f32,
    /// World pose when the out-transition began.
    out_from: Option<Pose>,
    last_target_pos: Vec3,
}

pub struct KillcamStateMachine {
    config: KillcamConfig,
    rng: ChaCha8Rng,
    state: KillcamState,
    session: Option<Session>,
    /// Unscaled time before which no new session may start.
    next_allowed: f32,
    events: Vec<KillcamEvent>,
}

impl KillcamStateMachine {
    pub fn new(config: KillcamConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: KillcamState::Idle,
            session: None,
            next_allowed: 0.0,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> KillcamState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == KillcamState::Idle
    }

    pub fn set_config(&mut self, config: KillcamConfig) {
        self.config = config;
    }

    /// Drain accumulated session events, oldest first.
    pub fn drain_events(&mut self) -> Vec<KillcamEvent> {
        std::mem::take(&mut self.events)
    }

    fn kind_eligible(&self, kind: TriggerKind) -> bool {
        match kind {
            TriggerKind::Decapitation => self.config.on_decapitation,
            TriggerKind::Critical => self.config.on_critical,
            TriggerKind::LastEnemy => self.config.on_last_enemy,
            _ => false,
        }
    }

    /// Attempt to open a session on `target`. Denials are ordinary outcomes;
    /// any fault during setup is converted into an abort and reported as a
    /// camera denial.
    pub fn try_start(
        &mut self,
        host: &mut dyn CameraHost,
        target: CreatureId,
        target_is_player: bool,
        kind: TriggerKind,
        duration: f32,
        now: f32,
    ) -> std::result::Result<(), StartDenial> {
        if !self.config.enabled {
            return Err(StartDenial::Disabled);
        }
        if self.state != KillcamState::Idle {
            return Err(StartDenial::Busy);
        }
        if target_is_player {
            return Err(StartDenial::PlayerTarget);
        }
        if !self.kind_eligible(kind) {
            return Err(StartDenial::IneligibleKind);
        }
        if now < self.next_allowed {
            return Err(StartDenial::OnCooldown);
        }
        if self.config.chance < 1.0 && self.rng.gen::<f32>() > self.config.chance {
            return Err(StartDenial::ChanceFailed);
        }
        if !host.camera_available() {
            return Err(StartDenial::NoCamera);
        }
        let target_pos = match host.target_position(target) {
            Some(pos) => pos,
            None => return Err(StartDenial::NoTarget),
        };

        match self.begin(host, target, kind, duration, now, target_pos) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "killcam setup fault");
                self.events.push(KillcamEvent::Fault(err));
                self.force_abort(host);
                Err(StartDenial::NoCamera)
            }
        }
    }

    fn begin(
        &mut self,
        host: &mut dyn CameraHost,
        target: CreatureId,
        kind: TriggerKind,
        duration: f32,
        now: f32,
        target_pos: Vec3,
    ) -> Result<()> {
        let original_local = host.camera_local_pose()?;
        let entry_world = host.camera_world_pose()?;
        host.create_rig(Pose::new(target_pos, Quat::IDENTITY))?;
        host.parent_camera_to_rig(true)?;

        // Start the orbit on the camera's own side of the target, with a
        // small random yaw so repeat killcams read differently.
        let bearing = entry_world.position - target_pos;
        let base_angle = bearing.x.atan2(bearing.z).to_degrees();
        let yaw = self
            .rng
            .gen_range(-self.config.random_yaw_max..=self.config.random_yaw_max);
        let orbit_dir = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };

        let remaining = duration.max(self.config.min_duration);
        self.next_allowed = now + remaining + self.config.cooldown;
        self.session = Some(Session {
            target,
            kind,
            original_local,
            entry_world,
            remaining,
            progress: 0.0,
            orbit_angle: base_angle + yaw,
            orbit_dir,
            out_from: None,
            last_target_pos: target_pos,
        });
        self.state = KillcamState::TransitioningIn;
        self.events.push(KillcamEvent::SessionStarted { target, kind });
        tracing::debug!(?target, ?kind, duration = remaining, "killcam session started");
        Ok(())
    }

    /// Advance the session by `dt` unscaled seconds. Any fault aborts the
    /// session; the camera ends restored either way.
    pub fn tick(&mut self, dt: f32, host: &mut dyn CameraHost) {
        if self.state == KillcamState::Idle {
            return;
        }
        if let Err(err) = self.advance(dt, host) {
            tracing::warn!(error = %err, "killcam fault, aborting session");
            self.events.push(KillcamEvent::Fault(err));
            self.force_abort(host);
        }
    }

    fn advance(&mut self, dt: f32, host: &mut dyn CameraHost) -> Result<()> {
        let config = self.config.clone();
        let state = self.state;
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                self.state = KillcamState::Idle;
                return Ok(());
            }
        };

        let mut finished = false;
        match state {
            KillcamState::Idle => {}
            KillcamState::TransitioningIn => {
                let target_pos = host
                    .target_position(session.target)
                    .ok_or(EngineError::TargetLost(session.target))?;
                session.last_target_pos = target_pos;
                session.progress = (session.progress + dt * config.transition_in_speed).min(1.0);

                let dest = orbit_pose(&config, session.orbit_angle, target_pos);
                let pose = session.entry_world.lerp(&dest, smooth_step(session.progress));
                host.set_rig_pose(Pose::new(target_pos, Quat::IDENTITY))?;
                host.set_camera_world_pose(pose)?;

                if session.progress >= 1.0 {
                    self.state = KillcamState::Active;
                }
            }
            KillcamState::Active => {
                let target_pos = host
                    .target_position(session.target)
                    .ok_or(EngineError::TargetLost(session.target))?;
                session.last_target_pos = target_pos;
                session.remaining -= dt;
                if config.orbit_speed > 0.0 {
                    session.orbit_angle += config.orbit_speed * session.orbit_dir * dt;
                }
                let pose = orbit_pose(&config, session.orbit_angle, target_pos);
                host.set_rig_pose(Pose::new(target_pos, Quat::IDENTITY))?;
                host.set_camera_world_pose(pose)?;

                if session.remaining <= 0.0 {
                    session.progress = 0.0;
                    session.out_from = Some(pose);
                    self.state = KillcamState::TransitioningOut;
                }
            }
            KillcamState::TransitioningOut => {
                session.progress = (session.progress + dt * config.transition_out_speed).min(1.0);
                let from = session.out_from.unwrap_or(session.entry_world);
                let pose = from.lerp(&session.entry_world, smooth_step(session.progress));
                host.set_camera_world_pose(pose)?;

                if session.progress >= 1.0 {
                    finished = true;
                }
            }
        }

        if finished {
            self.finish(host)?;
        }
        Ok(())
    }

    /// Orderly completion: restore parent and local pose, tear down the rig,
    /// release the session.
    fn finish(&mut self, host: &mut dyn CameraHost) -> Result<()> {
        host.parent_camera_to_rig(false)?;
        if let Some(session) = &self.session {
            host.set_camera_local_pose(session.original_local)?;
        }
        host.destroy_rig();
        if let Some(session) = self.session.take() {
            self.events.push(KillcamEvent::SessionEnded {
                kind: session.kind,
                aborted: false,
            });
            tracing::debug!(target = ?session.target, "killcam session ended");
        }
        self.state = KillcamState::Idle;
        Ok(())
    }

    /// Begin an orderly exit: an open session starts its transition-out
    /// from wherever the camera currently is, instead of waiting for its
    /// own timer. Called when the dilation that opened the session ends.
    /// No-op when idle or already on the way out.
    pub fn end_session(&mut self, host: &mut dyn CameraHost) {
        if !matches!(
            self.state,
            KillcamState::TransitioningIn | KillcamState::Active
        ) {
            return;
        }
        match self.session.as_mut() {
            Some(session) => {
                session.progress = 0.0;
                session.out_from = host.camera_world_pose().ok();
                self.state = KillcamState::TransitioningOut;
                tracing::debug!(target = ?session.target, "killcam session ending early");
            }
            None => self.state = KillcamState::Idle,
        }
    }

    /// Immediate teardown from any state; a no-op when idle. Best-effort
    /// restore that never fails: even a faulted host gets the rig destroyed
    /// and the captured pose written back where possible.
    pub fn force_abort(&mut self, host: &mut dyn CameraHost) {
        if let Some(session) = self.session.take() {
            let _ = host.parent_camera_to_rig(false);
            let _ = host.set_camera_local_pose(session.original_local);
            self.events.push(KillcamEvent::SessionEnded {
                kind: session.kind,
                aborted: true,
            });
            tracing::debug!(target = ?session.target, "killcam session aborted");
        }
        host.destroy_rig();
        self.state = KillcamState::Idle;
    }
}

fn smooth_step(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Camera pose on the orbit circle at `angle_deg` around `target_pos`.
fn orbit_pose(config: &KillcamConfig, angle_deg: f32, target_pos: Vec3) -> Pose {
    let angle = angle_deg.to_radians();
    let dir = Vec3::new(angle.sin(), 0.0, angle.cos());
    let right = Vec3::new(dir.z, 0.0, -dir.x);
    let position = target_pos
        + dir * config.distance
        + Vec3::Y * config.height
        + right * config.side_offset;
    let aim = target_pos + Vec3::Y * AIM_HEIGHT;
    Pose::new(position, look_rotation(aim - position, Vec3::Y))
}
