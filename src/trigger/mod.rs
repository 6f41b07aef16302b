//! Trigger catalog and arbitration
//!
//! The catalog enumerates the causes that compete to start a dilation; the
//! arbiter decides which one wins and owns the time-scale lifecycle.

pub mod arbiter;
pub mod catalog;
pub mod verdict;

pub use arbiter::{DilationEvent, TriggerArbiter};
pub use catalog::{ConfigProvider, Preset, PresetConfig, TriggerFamily, TriggerKind, TriggerParams};
pub use verdict::{RejectReason, Verdict};
