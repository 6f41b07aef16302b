//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Stable identity of a creature instance, assigned by the host engine.
///
/// The engine never creates these; it only keys attribution windows and
/// killcam targets by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub u64);

/// Stable identity of a body-part instance (one per slice-able part).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(pub u64);

/// Coarse body region of a hit, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitPart {
    Head,
    Neck,
    Torso,
    Limb,
    Other,
}

impl HitPart {
    /// Head and neck hits count as critical regions.
    pub fn is_critical_region(&self) -> bool {
        matches!(self, HitPart::Head | HitPart::Neck)
    }
}

/// Broad damage categories delivered with hit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    Slash,
    Pierce,
    Blunt,
    Fire,
    Lightning,
    Poison,
    Unknown,
}

impl DamageKind {
    /// Elemental/status kinds deal damage over time and qualify for
    /// time-bounded kill attribution.
    pub fn is_elemental(&self) -> bool {
        matches!(
            self,
            DamageKind::Fire | DamageKind::Lightning | DamageKind::Poison
        )
    }
}
