//! Trigger arbitration integration tests
//!
//! Exercises the arbiter's pre-emption, cooldown, and duration contracts
//! end-to-end, including the seeded chance-roll scenario.

use bullettime::trigger::arbiter::DilationEvent;
use bullettime::{EngineConfig, RejectReason, TriggerArbiter, TriggerKind, TriggerParams, Verdict};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Surface arbitration logs when RUST_LOG is set.
fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn params(chance: f32, time_scale: f32, duration: f32, cooldown: f32) -> TriggerParams {
    TriggerParams {
        enabled: true,
        chance,
        time_scale,
        duration,
        cooldown,
        killcam: false,
    }
}

/// Config with the global cooldown disarmed so per-trigger behavior can be
/// observed in isolation.
fn config() -> EngineConfig {
    EngineConfig {
        global_cooldown: 0.0,
        ..EngineConfig::default()
    }
}

fn arbiter(seed: u64) -> TriggerArbiter {
    let mut arbiter = TriggerArbiter::new(&config(), seed);
    arbiter.initialize();
    arbiter
}

/// Every strictly-higher-priority trigger pre-empts every lower one, and
/// the loser's dilation ends with `cancelled = true`.
#[test]
fn test_higher_priority_preempts_all_lower_pairs() {
    init_logs();
    for low in TriggerKind::ALL {
        for high in TriggerKind::ALL {
            if high.priority() <= low.priority() {
                continue;
            }
            let mut arb = arbiter(1);
            assert!(arb.try_trigger(low, &params(1.0, 0.3, 5.0, 0.0)).is_accepted());
            arb.drain_events();

            let verdict = arb.try_trigger(high, &params(1.0, 0.2, 5.0, 0.0));
            assert_eq!(verdict, Verdict::Accepted, "{high:?} should pre-empt {low:?}");
            assert_eq!(arb.active_kind(), Some(high));

            let events = arb.drain_events();
            assert!(
                events.contains(&DilationEvent::Ended {
                    kind: low,
                    cancelled: true
                }),
                "{low:?} should end cancelled when {high:?} pre-empts"
            );
        }
    }
}

/// A trigger can never pre-empt itself, whatever its cooldown state.
#[test]
fn test_no_self_preemption() {
    for kind in TriggerKind::ALL {
        let mut arb = arbiter(2);
        let p = params(1.0, 0.3, 10.0, 0.0);
        assert!(arb.try_trigger(kind, &p).is_accepted());
        assert_eq!(
            arb.try_trigger(kind, &p),
            Verdict::Rejected(RejectReason::AlreadyActive)
        );
    }
}

/// Anything at or below the active trigger's priority loses: only
/// strictly higher wins.
#[test]
fn test_lower_priority_never_preempts() {
    let mut arb = arbiter(3);
    assert!(arb
        .try_trigger(TriggerKind::Critical, &params(1.0, 0.3, 10.0, 0.0))
        .is_accepted());
    // Lower priority while active.
    assert_eq!(
        arb.try_trigger(TriggerKind::BasicKill, &params(1.0, 0.3, 1.0, 0.0)),
        Verdict::Rejected(RejectReason::AlreadyActive)
    );
}

/// After a trigger fires, re-attempts reject with `TriggerCooldown` until
/// cumulative unscaled tick time reaches the cooldown.
#[test]
fn test_trigger_cooldown_counts_unscaled_time() {
    let mut arb = arbiter(4);
    let p = params(1.0, 0.3, 0.1, 2.0);
    assert!(arb.try_trigger(TriggerKind::BasicKill, &p).is_accepted());

    let mut elapsed = 0.0_f32;
    while elapsed < 1.9 {
        arb.tick(0.1);
        elapsed += 0.1;
        assert_eq!(
            arb.try_trigger(TriggerKind::BasicKill, &p),
            Verdict::Rejected(RejectReason::TriggerCooldown),
            "still cooling at {elapsed}"
        );
    }
    arb.tick(0.2);
    assert!(arb.try_trigger(TriggerKind::BasicKill, &p).is_accepted());
}

/// The global cooldown gates every kind, not just the one that fired.
#[test]
fn test_global_cooldown_gates_all_kinds() {
    let mut arb = TriggerArbiter::new(&EngineConfig::default(), 5);
    arb.initialize();
    let p = params(1.0, 0.3, 0.1, 0.0);
    assert!(arb.try_trigger(TriggerKind::BasicKill, &p).is_accepted());
    arb.tick(0.2); // dilation over, global cooldown (1.0s) still armed

    assert_eq!(
        arb.try_trigger(TriggerKind::LastStand, &p),
        Verdict::Rejected(RejectReason::GlobalCooldown)
    );
    arb.tick(0.9);
    assert!(arb.try_trigger(TriggerKind::LastStand, &p).is_accepted());
}

/// Duration expiry: two half-duration ticks end the dilation exactly once,
/// uncancelled, and restore the baseline time scale.
#[test]
fn test_duration_expiry_ends_once_and_restores() {
    let mut arb = arbiter(6);
    assert!(arb
        .try_trigger(TriggerKind::Critical, &params(1.0, 0.25, 1.0, 0.0))
        .is_accepted());
    arb.drain_events();
    assert!((arb.time_scale() - 0.25).abs() < 1e-6);

    arb.tick(0.5);
    assert!(arb.is_active());
    arb.tick(0.5);
    assert!(!arb.is_active());
    assert_eq!(arb.time_scale(), 1.0);

    let ended: Vec<_> = arb
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, DilationEvent::Ended { .. }))
        .collect();
    assert_eq!(
        ended,
        vec![DilationEvent::Ended {
            kind: TriggerKind::Critical,
            cancelled: false
        }]
    );

    // Further ticks emit nothing.
    arb.tick(1.0);
    assert!(arb.drain_events().is_empty());
}

/// Seeded chance scenario: chance 0.5, no cooldown, duration 1.0, scale
/// 0.2. A passing roll accepts; an immediate retry rejects `AlreadyActive`
/// without consuming a roll; after expiry the next passing roll accepts
/// again.
#[test]
fn test_seeded_chance_scenario() {
    // Mirror the arbiter's RNG to find a seed whose first two rolls both
    // pass the 50% gate.
    let seed = (0..1000u64)
        .find(|&s| {
            let mut rng = ChaCha8Rng::seed_from_u64(s);
            rng.gen::<f32>() <= 0.5 && rng.gen::<f32>() <= 0.5
        })
        .unwrap();

    let mut arb = arbiter(seed);
    let p = params(0.5, 0.2, 1.0, 0.0);

    assert_eq!(arb.try_trigger(TriggerKind::Critical, &p), Verdict::Accepted);
    assert!((arb.time_scale() - 0.2).abs() < 1e-6);
    assert_eq!(
        arb.try_trigger(TriggerKind::Critical, &p),
        Verdict::Rejected(RejectReason::AlreadyActive)
    );

    arb.tick(1.1);
    assert!(!arb.is_active());
    assert_eq!(arb.time_scale(), 1.0);
    assert_eq!(arb.try_trigger(TriggerKind::Critical, &p), Verdict::Accepted);
}

/// A failed chance roll rejects without arming any cooldown.
#[test]
fn test_failed_roll_arms_nothing() {
    let seed = (0..1000u64)
        .find(|&s| {
            let mut rng = ChaCha8Rng::seed_from_u64(s);
            rng.gen::<f32>() > 0.1 && rng.gen::<f32>() <= 0.9
        })
        .unwrap();
    let mut arb = arbiter(seed);

    assert_eq!(
        arb.try_trigger(TriggerKind::BasicKill, &params(0.1, 0.3, 1.0, 5.0)),
        Verdict::Rejected(RejectReason::ChanceFailed)
    );
    assert!(!arb.is_active());
    // Second attempt with a generous chance is not cooldown-gated.
    assert_eq!(
        arb.try_trigger(TriggerKind::BasicKill, &params(0.9, 0.3, 1.0, 5.0)),
        Verdict::Accepted
    );
}

proptest! {
    /// Cooldown monotonicity: re-attempts reject with `TriggerCooldown`
    /// until cumulative tick time reaches the cooldown, then accept.
    #[test]
    fn prop_cooldown_monotonic(cooldown in 0.5f32..8.0, step in 0.01f32..0.3) {
        let mut arb = arbiter(9);
        let p = params(1.0, 0.3, 0.05, cooldown);
        prop_assert!(arb.try_trigger(TriggerKind::BasicKill, &p).is_accepted());

        let mut elapsed = 0.0_f32;
        loop {
            arb.tick(step);
            elapsed += step;
            let verdict = arb.try_trigger(TriggerKind::BasicKill, &p);
            if verdict.is_accepted() {
                prop_assert!(elapsed >= cooldown - 1e-3);
                break;
            }
            if elapsed < cooldown - 1e-3 {
                prop_assert_eq!(
                    verdict,
                    Verdict::Rejected(RejectReason::TriggerCooldown)
                );
            }
            prop_assert!(elapsed < cooldown + 1.0, "never re-accepted");
        }
    }

    /// The time scale always returns to exactly the baseline after any
    /// accepted dilation runs out, whatever its parameters.
    #[test]
    fn prop_time_scale_always_restored(
        time_scale in 0.01f32..1.0,
        duration in 0.1f32..3.0,
    ) {
        let mut arb = arbiter(10);
        let p = params(1.0, time_scale, duration, 0.0);
        prop_assert!(arb.try_trigger(TriggerKind::Decapitation, &p).is_accepted());
        arb.tick(duration + 0.01);
        prop_assert!(!arb.is_active());
        prop_assert_eq!(arb.time_scale(), 1.0);
    }
}
