//! EWWM gestures - template-based hand pose matching and sequential
//! gesture gating for the EXWM-VR compositor.
//!
//! Two independent pieces:
//! - `matcher`: classifies a hand-local fingertip pose against stored
//!   templates with per-finger thresholds, hold-time hysteresis and
//!   edge-triggered listeners.
//! - `sequence`: a tick-driven intention/validation state machine for
//!   multi-phase gestures, gated on host-supplied boolean conditions.

pub mod config;
pub mod error;
pub mod matcher;
pub mod pose;
pub mod sequence;
pub mod sexp;

pub use config::{MatcherConfig, SeqMode, SequenceConfig};
pub use error::{GestureError, Result};
pub use matcher::{Callback, GestureMatch, GestureMatcher, GestureTemplate, TemplateId};
pub use pose::{Fingertip, HandFrame, Point3, PoseSample};
pub use sequence::{
    Condition, SequenceEvent, SequenceState, SequenceValidator, SequenceValidatorBuilder,
};
