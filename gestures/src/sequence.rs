//! Sequential gesture gating: a timed two-phase state machine.
//!
//! A sequence starts when the primary condition holds (and none of the
//! disabling conditions do).  After `intention_checking_delay_s` the primary
//! condition is checked again to confirm the user meant it; then the
//! secondary condition is validated either once after a delay or by polling
//! until a timeout.  All waits are countdowns inside `SequenceState`, so
//! `interrupt()` swapping the state back to `Idle` cancels them outright.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{SeqMode, SequenceConfig};
use crate::error::{GestureError, Result};
use crate::matcher::Callback;
use crate::sexp;

// ── Conditions ─────────────────────────────────────────────

/// A boolean source the host can evaluate on demand.
pub trait Condition: Send {
    fn value(&self) -> bool;
}

impl<F> Condition for F
where
    F: Fn() -> bool + Send,
{
    fn value(&self) -> bool {
        self()
    }
}

impl Condition for AtomicBool {
    fn value(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

impl<T: Condition + Sync + ?Sized> Condition for Arc<T> {
    fn value(&self) -> bool {
        (**self).value()
    }
}

// ── States and events ──────────────────────────────────────

/// Where a sequence currently is.  Remaining times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequenceState {
    /// Waiting for the primary condition.
    Idle,
    /// Primary condition seen; re-checked when the delay runs out.
    IntentionChecking { remaining_s: f64 },
    /// Secondary condition is checked once when the delay runs out.
    ValidatingAfterDelay { remaining_s: f64 },
    /// Secondary condition is polled every `until_poll_s` while the
    /// countdown stays positive.
    ValidatingUntilTimeout { countdown_s: f64, until_poll_s: f64 },
}

impl SequenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::IntentionChecking { .. } => "intention-checking",
            Self::ValidatingAfterDelay { .. } => "validating-after-delay",
            Self::ValidatingUntilTimeout { .. } => "validating-until-timeout",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Transitions reported by `tick()` and `interrupt()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    /// Primary condition detected, intention check scheduled.
    Started,
    IntentionValidated,
    IntentionFailed,
    Success,
    Failure,
    /// The running sequence was cancelled by the host.
    Interrupted,
}

impl SequenceEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::IntentionValidated => "intention-validated",
            Self::IntentionFailed => "intention-failed",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Listener lists, invoked in registration order.
#[derive(Default)]
struct SequenceHandlers {
    on_intention_validated: Vec<Callback>,
    on_intention_failed: Vec<Callback>,
    on_success: Vec<Callback>,
    on_failure: Vec<Callback>,
}

// ── Builder ────────────────────────────────────────────────

/// Collects the host-supplied conditions for a validator.
pub struct SequenceValidatorBuilder {
    config: SequenceConfig,
    primary: Option<Box<dyn Condition>>,
    disabling: Vec<Box<dyn Condition>>,
    secondary: Option<Box<dyn Condition>>,
}

impl SequenceValidatorBuilder {
    pub fn primary(mut self, condition: impl Condition + 'static) -> Self {
        self.primary = Some(Box::new(condition));
        self
    }

    /// The sequence only starts while this condition is false.
    pub fn disabled_by(mut self, condition: impl Condition + 'static) -> Self {
        self.disabling.push(Box::new(condition));
        self
    }

    pub fn secondary(mut self, condition: impl Condition + 'static) -> Self {
        self.secondary = Some(Box::new(condition));
        self
    }

    pub fn build(self) -> Result<SequenceValidator> {
        self.config.validate()?;
        let primary = self
            .primary
            .ok_or_else(|| GestureError::invalid_config("sequence has no primary condition"))?;
        let secondary = self
            .secondary
            .ok_or_else(|| GestureError::invalid_config("sequence has no secondary condition"))?;
        Ok(SequenceValidator {
            config: self.config,
            primary,
            disabling: self.disabling,
            secondary,
            state: SequenceState::Idle,
            handlers: SequenceHandlers::default(),
        })
    }
}

// ── Validator ──────────────────────────────────────────────

/// Single-flight gate for a compound gesture.
pub struct SequenceValidator {
    config: SequenceConfig,
    primary: Box<dyn Condition>,
    disabling: Vec<Box<dyn Condition>>,
    secondary: Box<dyn Condition>,
    state: SequenceState,
    handlers: SequenceHandlers,
}

impl SequenceValidator {
    pub fn builder(config: SequenceConfig) -> SequenceValidatorBuilder {
        SequenceValidatorBuilder {
            config,
            primary: None,
            disabling: Vec::new(),
            secondary: None,
        }
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Replace the timing policy.  Phases already waiting keep their
    /// remaining time; the new values apply from the next phase on.
    pub fn set_config(&mut self, config: SequenceConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Whether a sequence instance is in flight.
    pub fn started(&self) -> bool {
        !self.state.is_idle()
    }

    // ── Listeners ─────────────────────────────────────────

    pub fn on_intention_validated<F: FnMut() + Send + 'static>(&mut self, callback: F) {
        self.handlers.on_intention_validated.push(Box::new(callback));
    }

    pub fn on_intention_failed<F: FnMut() + Send + 'static>(&mut self, callback: F) {
        self.handlers.on_intention_failed.push(Box::new(callback));
    }

    pub fn on_success<F: FnMut() + Send + 'static>(&mut self, callback: F) {
        self.handlers.on_success.push(Box::new(callback));
    }

    pub fn on_failure<F: FnMut() + Send + 'static>(&mut self, callback: F) {
        self.handlers.on_failure.push(Box::new(callback));
    }

    // ── Ticking ───────────────────────────────────────────

    /// Advance by `dt_s` seconds and return the transitions that happened.
    ///
    /// A running sequence only advances its timers; a new one can start at
    /// the earliest on the tick after the previous one finished.
    pub fn tick(&mut self, dt_s: f64) -> Vec<SequenceEvent> {
        let mut events = Vec::new();
        if self.started() {
            self.advance(dt_s, &mut events);
        } else if self.should_start() {
            self.state = SequenceState::IntentionChecking {
                remaining_s: self.config.intention_checking_delay_s,
            };
            debug!(
                "Sequence started, checking intention in {:.3}s",
                self.config.intention_checking_delay_s
            );
            events.push(SequenceEvent::Started);
        }
        self.dispatch(&events);
        events
    }

    /// Cancel the running sequence.  A no-op when idle.
    pub fn interrupt(&mut self) -> Vec<SequenceEvent> {
        if !self.started() {
            return Vec::new();
        }
        info!("Sequence interrupted during {}", self.state.as_str());
        self.state = SequenceState::Idle;
        let mut events = vec![SequenceEvent::Interrupted];
        if self.config.sequence_interruption_is_failure {
            events.push(SequenceEvent::Failure);
        }
        self.dispatch(&events);
        events
    }

    fn should_start(&self) -> bool {
        self.primary.value() && self.disabling.iter().all(|c| !c.value())
    }

    fn advance(&mut self, dt_s: f64, events: &mut Vec<SequenceEvent>) {
        match self.state {
            SequenceState::Idle => {}
            SequenceState::IntentionChecking { remaining_s } => {
                let remaining_s = remaining_s - dt_s;
                if remaining_s > 0.0 {
                    self.state = SequenceState::IntentionChecking { remaining_s };
                    return;
                }
                if self.primary.value() {
                    debug!("Intention validated, mode {}", self.config.mode.as_str());
                    events.push(SequenceEvent::IntentionValidated);
                    self.enter_validation(events);
                } else {
                    info!("Intention failed: primary condition released");
                    events.push(SequenceEvent::IntentionFailed);
                    self.state = SequenceState::Idle;
                }
            }
            SequenceState::ValidatingAfterDelay { remaining_s } => {
                let remaining_s = remaining_s - dt_s;
                if remaining_s > 0.0 {
                    self.state = SequenceState::ValidatingAfterDelay { remaining_s };
                    return;
                }
                self.finish(events);
            }
            SequenceState::ValidatingUntilTimeout {
                countdown_s,
                until_poll_s,
            } => {
                let until_poll_s = until_poll_s - dt_s;
                if until_poll_s > 0.0 {
                    self.state = SequenceState::ValidatingUntilTimeout {
                        countdown_s,
                        until_poll_s,
                    };
                    return;
                }
                self.poll_until_timeout(countdown_s - self.config.validation_checking_freq_s, events);
            }
        }
    }

    fn enter_validation(&mut self, events: &mut Vec<SequenceEvent>) {
        match self.config.mode {
            SeqMode::CheckAfterDelay => {
                self.state = SequenceState::ValidatingAfterDelay {
                    remaining_s: self.config.validation_checking_delay_s,
                };
            }
            SeqMode::WaitUntilTimeout => {
                self.poll_until_timeout(self.config.validation_timeout_s, events);
            }
        }
    }

    /// Keep waiting while budget remains and the secondary condition is
    /// false; otherwise resolve now.
    fn poll_until_timeout(&mut self, countdown_s: f64, events: &mut Vec<SequenceEvent>) {
        if countdown_s > 0.0 && !self.secondary.value() {
            self.state = SequenceState::ValidatingUntilTimeout {
                countdown_s,
                until_poll_s: self.config.validation_checking_freq_s,
            };
        } else {
            self.finish(events);
        }
    }

    fn finish(&mut self, events: &mut Vec<SequenceEvent>) {
        let event = if self.secondary.value() == self.config.expected_value {
            SequenceEvent::Success
        } else {
            SequenceEvent::Failure
        };
        info!("Sequence finished: {}", event.as_str());
        events.push(event);
        self.state = SequenceState::Idle;
    }

    fn dispatch(&mut self, events: &[SequenceEvent]) {
        for event in events {
            let listeners = match event {
                SequenceEvent::IntentionValidated => &mut self.handlers.on_intention_validated,
                SequenceEvent::IntentionFailed => &mut self.handlers.on_intention_failed,
                SequenceEvent::Success => &mut self.handlers.on_success,
                SequenceEvent::Failure => &mut self.handlers.on_failure,
                SequenceEvent::Started | SequenceEvent::Interrupted => continue,
            };
            for callback in listeners.iter_mut() {
                callback();
            }
        }
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let remaining = match self.state {
            SequenceState::Idle => 0.0,
            SequenceState::IntentionChecking { remaining_s }
            | SequenceState::ValidatingAfterDelay { remaining_s } => remaining_s,
            SequenceState::ValidatingUntilTimeout { countdown_s, .. } => countdown_s,
        };
        format!(
            "(:state :{} :started {} :remaining-s {:.3} :mode :{})",
            self.state.as_str(),
            sexp::bool_str(self.started()),
            remaining,
            self.config.mode.as_str(),
        )
    }
}

/// The validator reads as true while a sequence is in flight, so it can
/// itself gate another validator.
impl Condition for SequenceValidator {
    fn value(&self) -> bool {
        self.started()
    }
}

impl fmt::Debug for SequenceValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceValidator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("disabling", &self.disabling.len())
            .finish()
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct Rig {
        primary: Arc<AtomicBool>,
        secondary: Arc<AtomicBool>,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                primary: Arc::new(AtomicBool::new(false)),
                secondary: Arc::new(AtomicBool::new(false)),
                log: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn build(&self, config: SequenceConfig) -> SequenceValidator {
            let mut v = SequenceValidator::builder(config)
                .primary(Arc::clone(&self.primary))
                .secondary(Arc::clone(&self.secondary))
                .build()
                .unwrap();
            self.attach(&mut v);
            v
        }

        fn attach(&self, v: &mut SequenceValidator) {
            let log = Arc::clone(&self.log);
            v.on_intention_validated(move || log.lock().unwrap().push("intention-validated"));
            let log = Arc::clone(&self.log);
            v.on_intention_failed(move || log.lock().unwrap().push("intention-failed"));
            let log = Arc::clone(&self.log);
            v.on_success(move || log.lock().unwrap().push("success"));
            let log = Arc::clone(&self.log);
            v.on_failure(move || log.lock().unwrap().push("failure"));
        }

        fn set_primary(&self, value: bool) {
            self.primary.store(value, Ordering::SeqCst);
        }

        fn set_secondary(&self, value: bool) {
            self.secondary.store(value, Ordering::SeqCst);
        }

        fn log(&self) -> Vec<&'static str> {
            self.log.lock().unwrap().clone()
        }
    }

    fn after_delay(intention: f64, validation: f64) -> SequenceConfig {
        SequenceConfig {
            intention_checking_delay_s: intention,
            validation_checking_delay_s: validation,
            mode: SeqMode::CheckAfterDelay,
            ..SequenceConfig::default()
        }
    }

    fn until_timeout(intention: f64, timeout: f64, freq: f64) -> SequenceConfig {
        SequenceConfig {
            intention_checking_delay_s: intention,
            validation_timeout_s: timeout,
            validation_checking_freq_s: freq,
            mode: SeqMode::WaitUntilTimeout,
            ..SequenceConfig::default()
        }
    }

    #[test]
    fn test_builder_requires_conditions() {
        let err = SequenceValidator::builder(SequenceConfig::default())
            .secondary(|| true)
            .build()
            .unwrap_err();
        assert!(matches!(err, GestureError::InvalidConfiguration(_)));

        let err = SequenceValidator::builder(SequenceConfig::default())
            .primary(|| true)
            .build()
            .unwrap_err();
        assert!(matches!(err, GestureError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let config = SequenceConfig {
            validation_checking_freq_s: 0.0,
            ..SequenceConfig::default()
        };
        let result = SequenceValidator::builder(config)
            .primary(|| true)
            .secondary(|| true)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_idle_until_primary() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.25, 0.25));
        assert!(v.tick(0.125).is_empty());
        assert_eq!(v.state(), SequenceState::Idle);
        assert!(!v.started());
    }

    #[test]
    fn test_start_schedules_intention_check() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.25, 0.25));
        rig.set_primary(true);
        assert_eq!(v.tick(0.125), vec![SequenceEvent::Started]);
        assert_eq!(v.state(), SequenceState::IntentionChecking { remaining_s: 0.25 });
        assert!(v.started());
        assert!(v.value());
    }

    #[test]
    fn test_disabling_condition_blocks_start() {
        let rig = Rig::new();
        let blocker = Arc::new(AtomicBool::new(true));
        let mut v = SequenceValidator::builder(after_delay(0.25, 0.25))
            .primary(Arc::clone(&rig.primary))
            .disabled_by(|| false)
            .disabled_by(Arc::clone(&blocker))
            .secondary(Arc::clone(&rig.secondary))
            .build()
            .unwrap();
        rig.set_primary(true);
        assert!(v.tick(0.125).is_empty());

        blocker.store(false, Ordering::SeqCst);
        assert_eq!(v.tick(0.125), vec![SequenceEvent::Started]);
    }

    #[test]
    fn test_intention_failed_when_primary_released() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.25, 0.25));
        rig.set_primary(true);
        v.tick(0.125);
        rig.set_primary(false);
        assert!(v.tick(0.125).is_empty());
        assert_eq!(v.tick(0.125), vec![SequenceEvent::IntentionFailed]);
        assert_eq!(rig.log(), vec!["intention-failed"]);
        assert_eq!(v.state(), SequenceState::Idle);
        assert!(!v.started());
    }

    #[test]
    fn test_reentry_ignored_while_started() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.5, 0.5));
        rig.set_primary(true);
        let mut started = 0;
        for _ in 0..4 {
            started += v
                .tick(0.125)
                .iter()
                .filter(|e| **e == SequenceEvent::Started)
                .count();
        }
        assert_eq!(started, 1);
    }

    #[test]
    fn test_after_delay_success() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.25, 0.25));
        rig.set_primary(true);
        v.tick(0.125); // started
        v.tick(0.125);
        assert_eq!(v.tick(0.125), vec![SequenceEvent::IntentionValidated]);
        assert_eq!(v.state(), SequenceState::ValidatingAfterDelay { remaining_s: 0.25 });

        rig.set_secondary(true);
        assert!(v.tick(0.125).is_empty());
        assert_eq!(v.tick(0.125), vec![SequenceEvent::Success]);
        assert_eq!(rig.log(), vec!["intention-validated", "success"]);
        assert!(!v.started());
    }

    #[test]
    fn test_after_delay_failure_on_unexpected_value() {
        let rig = Rig::new();
        let config = SequenceConfig {
            expected_value: false,
            ..after_delay(0.0, 0.0)
        };
        let mut v = rig.build(config);
        rig.set_primary(true);
        rig.set_secondary(true);
        v.tick(0.1);
        assert_eq!(v.tick(0.1), vec![SequenceEvent::IntentionValidated]);
        assert_eq!(v.tick(0.1), vec![SequenceEvent::Failure]);
        assert_eq!(rig.log(), vec!["intention-validated", "failure"]);
    }

    #[test]
    fn test_after_delay_checks_secondary_only_at_the_end() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.0, 0.5));
        rig.set_primary(true);
        v.tick(0.1);
        v.tick(0.1); // intention validated
        rig.set_secondary(true);
        v.tick(0.25);
        rig.set_secondary(false);
        assert_eq!(v.tick(0.25), vec![SequenceEvent::Failure]);
    }

    #[test]
    fn test_until_timeout_success_stops_polling() {
        let rig = Rig::new();
        let polls = Arc::new(AtomicUsize::new(0));
        let secondary = Arc::clone(&rig.secondary);
        let poll_count = Arc::clone(&polls);
        let mut v = SequenceValidator::builder(until_timeout(0.0, 1.0, 0.125))
            .primary(Arc::clone(&rig.primary))
            .secondary(move || {
                poll_count.fetch_add(1, Ordering::SeqCst);
                secondary.load(Ordering::SeqCst)
            })
            .build()
            .unwrap();
        rig.attach(&mut v);

        rig.set_primary(true);
        v.tick(0.125); // started
        assert_eq!(v.tick(0.125), vec![SequenceEvent::IntentionValidated]);
        assert!(v.tick(0.125).is_empty());

        rig.set_secondary(true);
        assert_eq!(v.tick(0.125), vec![SequenceEvent::Success]);
        assert_eq!(rig.log(), vec!["intention-validated", "success"]);

        rig.set_primary(false);
        let polls_after = polls.load(Ordering::SeqCst);
        for _ in 0..10 {
            assert!(v.tick(0.125).is_empty());
        }
        assert_eq!(polls.load(Ordering::SeqCst), polls_after);
    }

    #[test]
    fn test_until_timeout_failure_when_budget_exhausted() {
        let rig = Rig::new();
        let mut v = rig.build(until_timeout(0.0, 0.25, 0.125));
        rig.set_primary(true);
        v.tick(0.125);
        assert_eq!(v.tick(0.125), vec![SequenceEvent::IntentionValidated]);
        assert_eq!(
            v.state(),
            SequenceState::ValidatingUntilTimeout {
                countdown_s: 0.25,
                until_poll_s: 0.125
            }
        );
        assert!(v.tick(0.125).is_empty());
        assert_eq!(v.tick(0.125), vec![SequenceEvent::Failure]);
        assert_eq!(rig.log(), vec!["intention-validated", "failure"]);
        assert!(!v.started());
    }

    #[test]
    fn test_until_timeout_resolves_immediately_when_already_true() {
        let rig = Rig::new();
        let mut v = rig.build(until_timeout(0.0, 1.0, 0.05));
        rig.set_primary(true);
        rig.set_secondary(true);
        v.tick(0.1);
        assert_eq!(
            v.tick(0.1),
            vec![SequenceEvent::IntentionValidated, SequenceEvent::Success]
        );
        assert!(!v.started());
    }

    #[test]
    fn test_restart_waits_for_next_tick() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.0, 0.0));
        rig.set_primary(true);
        rig.set_secondary(true);
        assert_eq!(v.tick(0.1), vec![SequenceEvent::Started]);
        assert_eq!(v.tick(0.1), vec![SequenceEvent::IntentionValidated]);
        assert_eq!(v.tick(0.1), vec![SequenceEvent::Success]);
        assert_eq!(v.tick(0.1), vec![SequenceEvent::Started]);
    }

    #[test]
    fn test_interrupt_during_intention_is_failure() {
        let rig = Rig::new();
        let config = SequenceConfig {
            sequence_interruption_is_failure: true,
            ..after_delay(0.25, 0.25)
        };
        let mut v = rig.build(config);
        rig.set_primary(true);
        v.tick(0.125);
        assert_eq!(
            v.interrupt(),
            vec![SequenceEvent::Interrupted, SequenceEvent::Failure]
        );
        assert_eq!(rig.log(), vec!["failure"]);
        assert_eq!(v.state(), SequenceState::Idle);
        assert!(!v.started());

        // The pending intention check never fires.
        rig.set_primary(false);
        for _ in 0..4 {
            assert!(v.tick(0.125).is_empty());
        }
        assert_eq!(rig.log(), vec!["failure"]);
    }

    #[test]
    fn test_interrupt_without_failure_flag() {
        let rig = Rig::new();
        let mut v = rig.build(until_timeout(0.0, 1.0, 0.125));
        rig.set_primary(true);
        v.tick(0.125);
        v.tick(0.125);
        assert!(matches!(v.state(), SequenceState::ValidatingUntilTimeout { .. }));
        assert_eq!(v.interrupt(), vec![SequenceEvent::Interrupted]);
        assert_eq!(rig.log(), vec!["intention-validated"]);
    }

    #[test]
    fn test_interrupt_idle_is_noop() {
        let rig = Rig::new();
        let config = SequenceConfig {
            sequence_interruption_is_failure: true,
            ..SequenceConfig::default()
        };
        let mut v = rig.build(config);
        assert!(v.interrupt().is_empty());
        assert!(v.interrupt().is_empty());
        assert!(rig.log().is_empty());
    }

    #[test]
    fn test_validator_as_condition() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(1.0, 0.0));
        assert!(!Condition::value(&v));
        rig.set_primary(true);
        v.tick(0.1);
        assert!(Condition::value(&v));
    }

    #[test]
    fn test_set_config_validates() {
        let rig = Rig::new();
        let mut v = rig.build(SequenceConfig::default());
        let bad = SequenceConfig {
            validation_timeout_s: -1.0,
            ..SequenceConfig::default()
        };
        assert!(v.set_config(bad).is_err());
        v.set_config(until_timeout(0.5, 2.0, 0.1)).unwrap();
        assert_eq!(v.config().mode, SeqMode::WaitUntilTimeout);
    }

    #[test]
    fn test_status_sexp() {
        let rig = Rig::new();
        let mut v = rig.build(after_delay(0.5, 0.0));
        assert_eq!(
            v.status_sexp(),
            "(:state :idle :started nil :remaining-s 0.000 :mode :check-after-delay)"
        );
        rig.set_primary(true);
        v.tick(0.1);
        v.tick(0.25);
        let sexp = v.status_sexp();
        assert!(sexp.contains(":state :intention-checking"));
        assert!(sexp.contains(":started t"));
        assert!(sexp.contains(":remaining-s 0.250"));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(SequenceEvent::IntentionValidated.as_str(), "intention-validated");
        assert_eq!(SequenceEvent::Interrupted.as_str(), "interrupted");
        assert_eq!(
            SequenceState::ValidatingUntilTimeout {
                countdown_s: 1.0,
                until_poll_s: 0.1
            }
            .as_str(),
            "validating-until-timeout"
        );
    }
}
