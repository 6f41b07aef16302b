//! Kill attribution windows
//!
//! A kill event often carries no causal link to the player: a thrown body
//! hits a wall a second after release, a burn kills ten seconds after the
//! fireball. These windows let a later kill be credited to the earlier
//! player action. At most one live window per creature per category; a
//! repeat qualifying hit refreshes the stamp and accumulates the amount
//! instead of duplicating.

use crate::classify::expiring::ExpiringMap;
use crate::core::types::{CreatureId, DamageKind};

/// A live elemental/status damage window for one creature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementalWindow {
    pub kind: DamageKind,
    /// Total status damage accumulated while the window stayed live. Feeds
    /// the fallback intensity estimate when the kill itself carries no
    /// usable collision data.
    pub accumulated: f32,
}

/// Tracks thrown-release and elemental windows keyed by creature identity.
pub struct AttributionTracker {
    thrown: ExpiringMap<CreatureId, ()>,
    elemental: ExpiringMap<CreatureId, ElementalWindow>,
}

impl AttributionTracker {
    pub fn new(thrown_window: f32, elemental_horizon: f32) -> Self {
        Self {
            thrown: ExpiringMap::new(thrown_window),
            elemental: ExpiringMap::new(elemental_horizon),
        }
    }

    /// The player released a grabbed or telekinesis-held creature/object
    /// aimed at `creature`. A kill on it within the thrown window counts as
    /// a player kill.
    pub fn record_thrown_release(&mut self, creature: CreatureId, now: f32) {
        self.thrown.insert(creature, (), now);
        tracing::debug!(?creature, "thrown release recorded");
    }

    /// The player landed an elemental/status hit. Refreshes the creature's
    /// window and accumulates the amount.
    pub fn record_elemental_hit(
        &mut self,
        creature: CreatureId,
        kind: DamageKind,
        amount: f32,
        now: f32,
    ) {
        let window = self.elemental.refresh_or_insert_with(creature, now, || ElementalWindow {
            kind,
            accumulated: 0.0,
        });
        window.kind = kind;
        window.accumulated += amount.max(0.0);
    }

    /// Claim the thrown window for a kill. Consumes it; at most one kill is
    /// ever attributed per release.
    pub fn claim_thrown(&mut self, creature: CreatureId, now: f32) -> bool {
        self.thrown.take_fresh(&creature, now).is_some()
    }

    /// Claim the elemental window for a kill, yielding the fallback damage
    /// kind and accumulated amount. Consumes the window.
    pub fn claim_elemental(&mut self, creature: CreatureId, now: f32) -> Option<ElementalWindow> {
        self.elemental.take_fresh(&creature, now)
    }

    /// Amortized purge of stale windows.
    pub fn sweep(&mut self, now: f32) {
        self.thrown.maybe_sweep(now);
        self.elemental.maybe_sweep(now);
    }

    pub fn reset(&mut self) {
        self.thrown.clear();
        self.elemental.clear();
    }
}
