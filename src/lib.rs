//! Bullettime - Cinematic Slow-Motion Trigger Arbitration

pub mod camera;
pub mod classify;
pub mod core;
pub mod engine;
pub mod killcam;
pub mod telemetry;
pub mod trigger;

pub use camera::{CameraHost, Pose, StubCameraHost};
pub use classify::{CombatEventClassifier, HitEvent, KillCollision, KillEvent};
pub use crate::core::{EngineConfig, EngineError, KillcamConfig, Result};
pub use engine::{CinematicEngine, EngineEvent};
pub use killcam::{KillcamState, KillcamStateMachine};
pub use telemetry::TelemetryAggregator;
pub use trigger::{
    ConfigProvider, DilationEvent, Preset, PresetConfig, RejectReason, TriggerArbiter,
    TriggerKind, TriggerParams, Verdict,
};
