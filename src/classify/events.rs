//! Raw combat event payloads delivered by the host engine
//!
//! These mirror the host's hit/kill callbacks. The classifier consumes them
//! and produces trigger candidates; nothing here carries behavior.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{CreatureId, DamageKind, HitPart, PartId};

/// A creature took a hit (lethal or not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitEvent {
    /// The creature that was hit.
    pub creature: CreatureId,
    /// Whether the victim is the player.
    pub is_player: bool,
    /// Whether the player's own action caused the hit.
    pub caused_by_player: bool,
    pub kind: DamageKind,
    pub amount: f32,
    pub part: HitPart,
    /// Instance identity of the struck part, when the host knows it.
    pub part_instance: Option<PartId>,
    /// True when this hit severed the struck part.
    pub was_sliced: bool,
    pub impact_velocity: Vec3,
    /// Victim health ratio after the hit, in [0, 1]. Drives Last Stand
    /// detection for player hits; ignored for enemies.
    pub health_ratio: f32,
}

/// Collision detail attached to a kill, when the host has any.
///
/// Status/DOT kills arrive with `collision: None`; attribution windows fill
/// the gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillCollision {
    pub caused_by_player: bool,
    pub kind: DamageKind,
    pub damage: f32,
    pub part: HitPart,
    pub part_instance: Option<PartId>,
    pub was_sliced: bool,
    pub impact_velocity: Vec3,
    /// Precomputed impact intensity in [0, 1], if the host supplies one.
    pub intensity: Option<f32>,
}

/// A creature died.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillEvent {
    pub creature: CreatureId,
    /// Enemies still alive after this death. Zero closes the wave.
    pub remaining_enemies: u32,
    pub collision: Option<KillCollision>,
}
