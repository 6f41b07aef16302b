//! Trigger attempt outcomes as plain values
//!
//! Every arbitration outcome is a value; rejections are expected and
//! frequent, never exceptions.

use serde::{Deserialize, Serialize};

/// Result of one trigger attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Why a trigger attempt was rejected.
///
/// Checks run in a fixed order and the first failing check wins, so the
/// reason always names the earliest blocker. Diagnostics depend on this
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// The whole system is disabled.
    ModDisabled,
    /// This trigger kind is disabled in settings.
    TriggerDisabled,
    /// Global cooldown is still counting down.
    GlobalCooldown,
    /// This kind's own cooldown is still counting down.
    TriggerCooldown,
    /// Slow motion is already active with equal or higher priority.
    AlreadyActive,
    /// The chance roll failed.
    ChanceFailed,
}

impl RejectReason {
    /// Stable lowercase key for telemetry maps.
    pub fn key(&self) -> &'static str {
        match self {
            RejectReason::ModDisabled => "mod_disabled",
            RejectReason::TriggerDisabled => "trigger_disabled",
            RejectReason::GlobalCooldown => "global_cooldown",
            RejectReason::TriggerCooldown => "trigger_cooldown",
            RejectReason::AlreadyActive => "already_active",
            RejectReason::ChanceFailed => "chance_failed",
        }
    }
}
