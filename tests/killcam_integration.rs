//! Killcam integration tests
//!
//! The contract under test: whatever happens during a session, the camera
//! ends exactly where it started, off the rig, with the rig destroyed.

use bullettime::core::types::{CreatureId, DamageKind, HitPart, PartId};
use bullettime::killcam::{KillcamEvent, KillcamStateMachine};
use bullettime::{
    CameraHost, CinematicEngine, EngineConfig, EngineEvent, KillCollision, KillEvent,
    KillcamConfig, KillcamState, Pose, Preset, PresetConfig, StubCameraHost, TriggerKind,
};
use glam::{Quat, Vec3};
use proptest::prelude::*;

fn host() -> StubCameraHost {
    let mut host = StubCameraHost::new()
        .with_parent_pose(Pose::new(Vec3::new(3.0, 0.5, -2.0), Quat::from_rotation_y(0.8)))
        .with_camera_local(Pose::new(
            Vec3::new(0.1, 1.7, -0.3),
            Quat::from_rotation_x(-0.15),
        ));
    host.set_target(CreatureId(1), Vec3::new(12.0, 0.0, 9.0));
    host
}

/// A full engine-driven session: decapitation kill opens the killcam, the
/// session plays out, and the camera comes back bit-for-bit.
#[test]
fn test_engine_session_lifecycle_restores_camera() {
    let mut engine = CinematicEngine::new(
        EngineConfig::default(),
        Box::new(PresetConfig::new(Preset::Cinematic)),
        21,
    )
    .unwrap();
    let mut host = host();
    let original = host.camera_local_pose().unwrap();

    engine.on_creature_kill(
        &KillEvent {
            creature: CreatureId(1),
            remaining_enemies: 2,
            collision: Some(KillCollision {
                caused_by_player: true,
                kind: DamageKind::Slash,
                damage: 80.0,
                part: HitPart::Head,
                part_instance: Some(PartId(5)),
                was_sliced: true,
                impact_velocity: Vec3::new(9.0, 1.0, 0.0),
                intensity: None,
            }),
        },
        &mut host,
    );
    assert_eq!(engine.killcam_state(), KillcamState::TransitioningIn);

    // During the session the camera is on the rig and moving.
    for _ in 0..10 {
        engine.tick(0.05, &mut host);
    }
    assert!(host.is_on_rig());
    assert_ne!(host.camera_local_pose().unwrap(), original);

    // Run the session out (3.5s dilation plus transitions).
    for _ in 0..100 {
        engine.tick(0.05, &mut host);
    }
    assert_eq!(engine.killcam_state(), KillcamState::Idle);
    assert!(!host.has_rig());
    assert_eq!(host.camera_local_pose().unwrap(), original);

    let totals = engine.telemetry().session_totals();
    assert_eq!(totals.killcams_started, 1);
    assert_eq!(totals.killcams_completed, 1);
    assert_eq!(totals.killcams_aborted, 0);
}

/// Player death mid-session aborts the killcam and still restores.
#[test]
fn test_player_death_aborts_session_and_restores() {
    let mut engine = CinematicEngine::new(
        EngineConfig::default(),
        Box::new(PresetConfig::new(Preset::Cinematic)),
        22,
    )
    .unwrap();
    let mut host = host();
    let original = host.camera_local_pose().unwrap();

    engine.on_creature_kill(
        &KillEvent {
            creature: CreatureId(1),
            remaining_enemies: 2,
            collision: Some(KillCollision {
                caused_by_player: true,
                kind: DamageKind::Slash,
                damage: 80.0,
                part: HitPart::Head,
                part_instance: Some(PartId(5)),
                was_sliced: true,
                impact_velocity: Vec3::new(9.0, 1.0, 0.0),
                intensity: None,
            }),
        },
        &mut host,
    );
    for _ in 0..5 {
        engine.tick(0.05, &mut host);
    }
    engine.on_player_death(&mut host);

    assert_eq!(engine.killcam_state(), KillcamState::Idle);
    assert!(!engine.is_dilated());
    assert!(!host.has_rig());
    assert_eq!(host.camera_local_pose().unwrap(), original);
    assert!(engine.drain_events().iter().any(|e| matches!(
        e,
        EngineEvent::Killcam(KillcamEvent::SessionEnded { aborted: true, .. })
    )));
}

proptest! {
    /// Camera restoration: start a session, tick any number of times with
    /// any step size, then force-abort. The final local pose equals the
    /// captured one exactly, in every state the abort can land in.
    #[test]
    fn prop_force_abort_always_restores(
        seed in 0u64..500,
        ticks in 0usize..80,
        dt in 0.001f32..0.3,
    ) {
        let mut km = KillcamStateMachine::new(KillcamConfig::default(), seed);
        let mut host = host();
        let original = host.camera_local_pose().unwrap();

        km.try_start(&mut host, CreatureId(1), false, TriggerKind::Decapitation, 2.0, 0.0)
            .unwrap();
        for _ in 0..ticks {
            km.tick(dt, &mut host);
        }
        km.force_abort(&mut host);

        prop_assert_eq!(km.state(), KillcamState::Idle);
        prop_assert!(!host.has_rig());
        prop_assert!(!host.is_on_rig());
        prop_assert_eq!(host.camera_local_pose().unwrap(), original);
    }

    /// Target despawn at any point faults the session, and the fault path
    /// restores just as exactly as the orderly one.
    #[test]
    fn prop_despawn_fault_restores(
        despawn_after in 0usize..60,
        dt in 0.01f32..0.2,
    ) {
        let mut km = KillcamStateMachine::new(KillcamConfig::default(), 3);
        let mut host = host();
        let original = host.camera_local_pose().unwrap();

        km.try_start(&mut host, CreatureId(1), false, TriggerKind::Critical, 1.5, 0.0)
            .unwrap();
        for _ in 0..despawn_after {
            km.tick(dt, &mut host);
        }
        host.remove_target(CreatureId(1));
        for _ in 0..80 {
            km.tick(dt, &mut host);
        }

        prop_assert_eq!(km.state(), KillcamState::Idle);
        prop_assert!(!host.has_rig());
        prop_assert_eq!(host.camera_local_pose().unwrap(), original);
    }
}
