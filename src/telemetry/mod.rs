//! Telemetry aggregation
//!
//! Pure observer: counts what the other components decide and periodically
//! emits a summary. Nothing here ever feeds back into arbitration,
//! classification, or the killcam.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::killcam::{KillcamEvent, StartDenial};
use crate::trigger::arbiter::DilationEvent;
use crate::trigger::catalog::TriggerKind;
use crate::trigger::verdict::Verdict;

/// Seconds between emitted summaries.
pub const SUMMARY_INTERVAL: f32 = 30.0;

/// One bucket of counters. Interval buckets reset at each summary; the
/// session bucket accumulates for the whole run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Counters {
    pub trigger_attempts: u64,
    pub trigger_accepts: u64,
    /// Accepted attempts by trigger kind key.
    pub accepts_by_kind: BTreeMap<&'static str, u64>,
    /// Rejections by reason key.
    pub rejections_by_reason: BTreeMap<&'static str, u64>,
    pub dilations_started: u64,
    pub dilations_completed: u64,
    pub dilations_cancelled: u64,
    pub kills_evaluated: u64,
    pub kills_attributed: u64,
    pub killcams_started: u64,
    pub killcams_completed: u64,
    pub killcams_aborted: u64,
    /// Killcam start denials by reason key.
    pub killcam_denials: BTreeMap<&'static str, u64>,
    pub faults: u64,
}

impl Counters {
    fn record_verdict(&mut self, kind: TriggerKind, verdict: &Verdict) {
        self.trigger_attempts += 1;
        match verdict {
            Verdict::Accepted => {
                self.trigger_accepts += 1;
                *self.accepts_by_kind.entry(kind.key()).or_default() += 1;
            }
            Verdict::Rejected(reason) => {
                *self.rejections_by_reason.entry(reason.key()).or_default() += 1;
            }
        }
    }

    fn record_dilation(&mut self, event: &DilationEvent) {
        match event {
            DilationEvent::Started { .. } => self.dilations_started += 1,
            DilationEvent::Ended { cancelled, .. } => {
                if *cancelled {
                    self.dilations_cancelled += 1;
                } else {
                    self.dilations_completed += 1;
                }
            }
        }
    }

    fn record_killcam(&mut self, event: &KillcamEvent) {
        match event {
            KillcamEvent::SessionStarted { .. } => self.killcams_started += 1,
            KillcamEvent::SessionEnded { aborted, .. } => {
                if *aborted {
                    self.killcams_aborted += 1;
                } else {
                    self.killcams_completed += 1;
                }
            }
            KillcamEvent::Fault(_) => self.faults += 1,
        }
    }
}

/// Rolling-interval plus whole-session counters, emitted through `tracing`.
pub struct TelemetryAggregator {
    run_id: Uuid,
    summary_interval: f32,
    last_summary: f32,
    interval: Counters,
    session: Counters,
}

impl TelemetryAggregator {
    pub fn new() -> Self {
        Self::with_interval(SUMMARY_INTERVAL)
    }

    pub fn with_interval(summary_interval: f32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            summary_interval: summary_interval.max(1.0),
            last_summary: 0.0,
            interval: Counters::default(),
            session: Counters::default(),
        }
    }

    /// Stable identifier for this run, stamped on every summary.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Whole-session totals so far.
    pub fn session_totals(&self) -> &Counters {
        &self.session
    }

    pub fn record_attempt(&mut self, kind: TriggerKind, verdict: &Verdict) {
        self.interval.record_verdict(kind, verdict);
        self.session.record_verdict(kind, verdict);
    }

    pub fn record_dilation_event(&mut self, event: &DilationEvent) {
        self.interval.record_dilation(event);
        self.session.record_dilation(event);
    }

    pub fn record_kill_evaluated(&mut self, attributed: bool) {
        for bucket in [&mut self.interval, &mut self.session] {
            bucket.kills_evaluated += 1;
            if attributed {
                bucket.kills_attributed += 1;
            }
        }
    }

    pub fn record_killcam_event(&mut self, event: &KillcamEvent) {
        self.interval.record_killcam(event);
        self.session.record_killcam(event);
    }

    pub fn record_killcam_denial(&mut self, denial: StartDenial) {
        for bucket in [&mut self.interval, &mut self.session] {
            *bucket.killcam_denials.entry(denial.key()).or_default() += 1;
        }
    }

    /// Emit a summary when the interval has elapsed; resets the interval
    /// bucket. Runs on unscaled time like everything else.
    pub fn tick(&mut self, now: f32) {
        if now - self.last_summary < self.summary_interval {
            return;
        }
        self.emit_summary(now);
        self.last_summary = now;
        self.interval = Counters::default();
    }

    fn emit_summary(&self, now: f32) {
        // Serialization of plain counters cannot fail; fall back to an
        // empty payload rather than propagating.
        let payload = serde_json::to_string(&self.interval).unwrap_or_default();
        tracing::info!(
            run_id = %self.run_id,
            at = now,
            attempts = self.interval.trigger_attempts,
            accepts = self.interval.trigger_accepts,
            killcams = self.interval.killcams_started,
            %payload,
            "telemetry summary"
        );
    }
}

impl Default for TelemetryAggregator {
    fn default() -> Self {
        Self::new()
    }
}
