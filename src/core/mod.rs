//! Shared types, errors, and engine configuration

pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, KillcamConfig};
pub use error::{EngineError, Result};
pub use types::{CreatureId, DamageKind, HitPart, PartId};
