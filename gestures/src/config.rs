//! Matcher and sequence configuration, tunable from s-expression plists.

use tracing::warn;

use crate::error::{GestureError, Result};
use crate::sexp::{self, Plist};

// ── Matcher config ─────────────────────────────────────────

/// Configuration for template matching.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Maximum distance (meters) any single fingertip may be from the template.
    pub threshold: f32,
    /// Seconds a candidate must stay best before it is reported.
    pub required_delay_s: f64,
    /// Number of tracked points every template and sample carries.
    pub tracked_points: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            required_delay_s: 0.0,
            tracked_points: 5,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tracked_points == 0 {
            return Err(GestureError::invalid_config(
                "tracked-points must be at least 1",
            ));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(GestureError::invalid_config(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        non_negative("required-delay", self.required_delay_s)
    }

    /// Parse `(:threshold 0.05 :required-delay 0.2 :tracked-points 5)`.
    ///
    /// Missing keys keep their defaults; unknown keys are ignored.
    pub fn from_sexp(raw: &str) -> Result<Self> {
        let value = sexp::parse(raw)?;
        let plist = Plist::new(&value);
        let mut config = Self::default();
        if let Some(v) = plist.float("threshold")? {
            config.threshold = v as f32;
        }
        if let Some(v) = plist.float("required-delay")? {
            config.required_delay_s = v;
        }
        if let Some(v) = plist.count("tracked-points")? {
            config.tracked_points = v;
        }
        config.validate().map_err(|e| {
            warn!("Rejected matcher config {}: {}", raw, e);
            e
        })?;
        Ok(config)
    }

    pub fn to_sexp(&self) -> String {
        format!(
            "(:threshold {:.3} :required-delay {:.3} :tracked-points {})",
            self.threshold, self.required_delay_s, self.tracked_points,
        )
    }
}

// ── Sequence config ────────────────────────────────────────

/// How the secondary condition is validated once intention is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeqMode {
    /// Wait a fixed delay, then check once.
    #[default]
    CheckAfterDelay,
    /// Poll until the condition holds or the timeout runs out.
    WaitUntilTimeout,
}

impl SeqMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckAfterDelay => "check-after-delay",
            Self::WaitUntilTimeout => "wait-until-timeout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "check-after-delay" => Some(Self::CheckAfterDelay),
            "wait-until-timeout" => Some(Self::WaitUntilTimeout),
            _ => None,
        }
    }
}

/// Timing and outcome policy for a sequential gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceConfig {
    /// Seconds the primary condition must persist to confirm intention.
    pub intention_checking_delay_s: f64,
    /// Seconds to wait before the single check in `CheckAfterDelay` mode.
    pub validation_checking_delay_s: f64,
    /// Polling budget in `WaitUntilTimeout` mode.
    pub validation_timeout_s: f64,
    /// Seconds between polls in `WaitUntilTimeout` mode.
    pub validation_checking_freq_s: f64,
    /// Value the secondary condition must have for success.
    pub expected_value: bool,
    pub mode: SeqMode,
    /// Whether `interrupt()` on a running sequence reports a failure.
    pub sequence_interruption_is_failure: bool,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            intention_checking_delay_s: 0.0,
            validation_checking_delay_s: 0.0,
            validation_timeout_s: 1.0,
            validation_checking_freq_s: 0.05,
            expected_value: true,
            mode: SeqMode::CheckAfterDelay,
            sequence_interruption_is_failure: false,
        }
    }
}

impl SequenceConfig {
    pub fn validate(&self) -> Result<()> {
        non_negative("intention-delay", self.intention_checking_delay_s)?;
        non_negative("validation-delay", self.validation_checking_delay_s)?;
        non_negative("validation-timeout", self.validation_timeout_s)?;
        // A zero step would never drain the countdown.
        if !self.validation_checking_freq_s.is_finite() || self.validation_checking_freq_s <= 0.0 {
            return Err(GestureError::invalid_config(format!(
                "validation-freq must be positive, got {}",
                self.validation_checking_freq_s
            )));
        }
        Ok(())
    }

    /// Parse a plist such as
    /// `(:intention-delay 0.3 :mode :wait-until-timeout :expected-value t)`.
    pub fn from_sexp(raw: &str) -> Result<Self> {
        let value = sexp::parse(raw)?;
        let plist = Plist::new(&value);
        let mut config = Self::default();
        if let Some(v) = plist.float("intention-delay")? {
            config.intention_checking_delay_s = v;
        }
        if let Some(v) = plist.float("validation-delay")? {
            config.validation_checking_delay_s = v;
        }
        if let Some(v) = plist.float("validation-timeout")? {
            config.validation_timeout_s = v;
        }
        if let Some(v) = plist.float("validation-freq")? {
            config.validation_checking_freq_s = v;
        }
        if let Some(v) = plist.flag("expected-value") {
            config.expected_value = v;
        }
        if let Some(v) = plist.flag("interruption-is-failure") {
            config.sequence_interruption_is_failure = v;
        }
        if let Some(mode) = plist.text("mode") {
            config.mode = SeqMode::parse(&mode)
                .ok_or_else(|| GestureError::parse(format!("unknown :mode {mode}")))?;
        }
        config.validate().map_err(|e| {
            warn!("Rejected sequence config {}: {}", raw, e);
            e
        })?;
        Ok(config)
    }

    pub fn to_sexp(&self) -> String {
        format!(
            "(:intention-delay {:.3} :validation-delay {:.3} :validation-timeout {:.3} :validation-freq {:.3} :expected-value {} :mode :{} :interruption-is-failure {})",
            self.intention_checking_delay_s,
            self.validation_checking_delay_s,
            self.validation_timeout_s,
            self.validation_checking_freq_s,
            sexp::bool_str(self.expected_value),
            self.mode.as_str(),
            sexp::bool_str(self.sequence_interruption_is_failure),
        )
    }
}

fn non_negative(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GestureError::invalid_config(format!(
            "{key} must be a non-negative number of seconds, got {value}"
        )))
    }
}
