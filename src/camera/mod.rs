//! Camera host boundary
//!
//! The engine never touches the host's scene graph directly. Everything the
//! killcam needs from the camera goes through [`CameraHost`]: pose reads and
//! writes, a transient rig to parent the camera under, and target position
//! queries. An in-memory [`StubCameraHost`] ships here for tests and
//! headless runs.

use std::collections::HashMap;

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::CreatureId;

/// A rigid transform: position plus rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Compose: treat `local` as a child of `self` and return its world pose.
    pub fn mul(&self, local: &Pose) -> Pose {
        Pose {
            position: self.rotation * local.position + self.position,
            rotation: self.rotation * local.rotation,
        }
    }

    pub fn inverse(&self) -> Pose {
        let inv_rot = self.rotation.inverse();
        Pose {
            position: inv_rot * -self.position,
            rotation: inv_rot,
        }
    }

    /// Interpolate toward `other`: linear on position, spherical on rotation.
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }

    pub fn approx_eq(&self, other: &Pose, epsilon: f32) -> bool {
        (self.position - other.position).length() <= epsilon
            && self.rotation.angle_between(other.rotation) <= epsilon
    }
}

/// Rotation whose local +Z axis points along `forward`, roll chosen from
/// `up`. Degenerate inputs (zero forward, forward parallel to up) fall back
/// to identity-friendly axes rather than producing NaNs.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = match forward.try_normalize() {
        Some(f) => f,
        None => return Quat::IDENTITY,
    };
    let up = if up.length_squared() < 1e-8 { Vec3::Y } else { up };
    let right = match up.cross(forward).try_normalize() {
        Some(r) => r,
        // Forward is (anti)parallel to up; pick any perpendicular.
        None => match Vec3::Z.cross(forward).try_normalize() {
            Some(r) => r,
            None => Vec3::X,
        },
    };
    let true_up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, forward))
}

/// Everything the killcam needs from the host's camera and scene graph.
///
/// Pose getters and setters are fallible: the host may lose the camera at
/// any time (cutscene stole it, player died into a menu), and the killcam
/// must treat that as a fault, not a panic.
pub trait CameraHost {
    /// Whether a controllable camera currently exists.
    fn camera_available(&self) -> bool;

    fn camera_world_pose(&self) -> Result<Pose>;
    fn set_camera_world_pose(&mut self, pose: Pose) -> Result<()>;

    /// Camera pose relative to its current parent. This is the restore
    /// currency: sessions capture it before touching anything and write it
    /// back verbatim on every exit path.
    fn camera_local_pose(&self) -> Result<Pose>;
    fn set_camera_local_pose(&mut self, pose: Pose) -> Result<()>;

    /// Create the transient killcam rig at `pose`. Replaces any existing rig.
    fn create_rig(&mut self, pose: Pose) -> Result<()>;
    fn set_rig_pose(&mut self, pose: Pose) -> Result<()>;
    /// Destroy the rig if it exists. Infallible: teardown must always work.
    fn destroy_rig(&mut self);

    /// Re-parent the camera under the rig (`to_rig`) or back under its
    /// original parent, keeping its world pose unchanged.
    fn parent_camera_to_rig(&mut self, to_rig: bool) -> Result<()>;

    /// World position of a creature, `None` once it despawned.
    fn target_position(&self, target: CreatureId) -> Option<Vec3>;
}

/// In-memory [`CameraHost`] for tests and headless runs. Models a camera
/// under a fixed original parent, an optional rig, and a flat target table.
pub struct StubCameraHost {
    available: bool,
    parent_pose: Pose,
    rig_pose: Option<Pose>,
    camera_local: Pose,
    on_rig: bool,
    targets: HashMap<CreatureId, Vec3>,
}

impl StubCameraHost {
    pub fn new() -> Self {
        Self {
            available: true,
            parent_pose: Pose::IDENTITY,
            rig_pose: None,
            camera_local: Pose::IDENTITY,
            on_rig: false,
            targets: HashMap::new(),
        }
    }

    /// Place the camera's original parent somewhere non-trivial, so restore
    /// bugs that only show up under a rotated parent get caught.
    pub fn with_parent_pose(mut self, pose: Pose) -> Self {
        self.parent_pose = pose;
        self
    }

    pub fn with_camera_local(mut self, pose: Pose) -> Self {
        self.camera_local = pose;
        self
    }

    pub fn set_target(&mut self, target: CreatureId, position: Vec3) {
        self.targets.insert(target, position);
    }

    pub fn remove_target(&mut self, target: CreatureId) {
        self.targets.remove(&target);
    }

    /// Simulate the host stealing or returning the camera mid-session.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn has_rig(&self) -> bool {
        self.rig_pose.is_some()
    }

    pub fn is_on_rig(&self) -> bool {
        self.on_rig
    }

    fn current_parent(&self) -> Result<Pose> {
        if self.on_rig {
            self.rig_pose.ok_or(EngineError::CameraLost)
        } else {
            Ok(self.parent_pose)
        }
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(EngineError::CameraUnavailable)
        }
    }
}

impl Default for StubCameraHost {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraHost for StubCameraHost {
    fn camera_available(&self) -> bool {
        self.available
    }

    fn camera_world_pose(&self) -> Result<Pose> {
        self.ensure_available()?;
        Ok(self.current_parent()?.mul(&self.camera_local))
    }

    fn set_camera_world_pose(&mut self, pose: Pose) -> Result<()> {
        self.ensure_available()?;
        self.camera_local = self.current_parent()?.inverse().mul(&pose);
        Ok(())
    }

    fn camera_local_pose(&self) -> Result<Pose> {
        self.ensure_available()?;
        Ok(self.camera_local)
    }

    fn set_camera_local_pose(&mut self, pose: Pose) -> Result<()> {
        self.ensure_available()?;
        self.camera_local = pose;
        Ok(())
    }

    fn create_rig(&mut self, pose: Pose) -> Result<()> {
        self.ensure_available()?;
        self.rig_pose = Some(pose);
        Ok(())
    }

    fn set_rig_pose(&mut self, pose: Pose) -> Result<()> {
        match self.rig_pose.as_mut() {
            Some(rig) => {
                *rig = pose;
                Ok(())
            }
            None => Err(EngineError::CameraLost),
        }
    }

    fn destroy_rig(&mut self) {
        self.rig_pose = None;
        self.on_rig = false;
    }

    fn parent_camera_to_rig(&mut self, to_rig: bool) -> Result<()> {
        let world = self.camera_world_pose()?;
        self.on_rig = to_rig;
        self.set_camera_world_pose(world)
    }

    fn target_position(&self, target: CreatureId) -> Option<Vec3> {
        self.targets.get(&target).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_compose_inverse_roundtrip() {
        let parent = Pose::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.7),
        );
        let local = Pose::new(Vec3::new(0.5, 0.0, -1.0), Quat::from_rotation_x(0.3));

        let world = parent.mul(&local);
        let back = parent.inverse().mul(&world);
        assert!(back.approx_eq(&local, 1e-5));
    }

    #[test]
    fn test_look_rotation_points_forward_at_target() {
        let eye = Vec3::new(0.0, 1.0, 0.0);
        let target = Vec3::new(3.0, 1.0, 4.0);
        let rot = look_rotation(target - eye, Vec3::Y);

        let forward = rot * Vec3::Z;
        let expected = (target - eye).normalize();
        assert!((forward - expected).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_degenerate_inputs() {
        assert_eq!(look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
        // Straight up: must still produce a finite rotation.
        let rot = look_rotation(Vec3::Y, Vec3::Y);
        assert!((rot * Vec3::Z - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_stub_reparent_keeps_world_pose() {
        let mut host = StubCameraHost::new()
            .with_parent_pose(Pose::new(Vec3::new(5.0, 0.0, 0.0), Quat::from_rotation_y(1.0)))
            .with_camera_local(Pose::new(Vec3::new(0.0, 1.7, 0.0), Quat::IDENTITY));

        let before = host.camera_world_pose().unwrap();
        host.create_rig(Pose::new(Vec3::new(-2.0, 3.0, 1.0), Quat::from_rotation_z(0.4)))
            .unwrap();
        host.parent_camera_to_rig(true).unwrap();
        let after = host.camera_world_pose().unwrap();

        assert!(before.approx_eq(&after, 1e-4));
        assert!(host.is_on_rig());
    }

    #[test]
    fn test_stub_faults_when_camera_unavailable() {
        let mut host = StubCameraHost::new();
        host.set_available(false);
        assert!(matches!(
            host.camera_world_pose(),
            Err(EngineError::CameraUnavailable)
        ));
        assert!(matches!(
            host.set_camera_local_pose(Pose::IDENTITY),
            Err(EngineError::CameraUnavailable)
        ));
    }

    #[test]
    fn test_stub_rig_pose_requires_rig() {
        let mut host = StubCameraHost::new();
        assert!(matches!(
            host.set_rig_pose(Pose::IDENTITY),
            Err(EngineError::CameraLost)
        ));
    }
}
