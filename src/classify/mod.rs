//! Combat event classification
//!
//! Turns raw host hit/kill events into prioritized trigger candidates,
//! backed by attribution windows for kills the host cannot credit itself.

pub mod attribution;
pub mod classifier;
pub mod events;
pub mod expiring;

pub use attribution::{AttributionTracker, ElementalWindow};
pub use classifier::{Candidate, CombatEventClassifier};
pub use events::{HitEvent, KillCollision, KillEvent};
pub use expiring::ExpiringMap;
