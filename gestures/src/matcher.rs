//! Template-based static gesture recognition.
//!
//! Matches a hand-local fingertip pose against a library of stored
//! templates: every fingertip must lie within `threshold` of the template's
//! point, and among the survivors the smallest sum of distances wins.
//! A winner must stay best for `required_delay_s` before it is reported,
//! and listeners only hear about changes (edge-triggered), not every tick.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, trace, warn};

use crate::config::MatcherConfig;
use crate::error::{GestureError, Result};
use crate::pose::{point_distance, Point3};
use crate::sexp;

/// Monotonically increasing template ID generator.
static NEXT_TEMPLATE_ID: AtomicU64 = AtomicU64::new(1);

fn next_template_id() -> TemplateId {
    TemplateId(NEXT_TEMPLATE_ID.fetch_add(1, Ordering::Relaxed))
}

// ── Templates ──────────────────────────────────────────────

/// Identity of a stored template. Two templates may share a name but never an ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(u64);

impl TemplateId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listener invoked when a template becomes the recognized gesture.
pub type RecognizedCallback = Box<dyn FnMut(&GestureMatch) + Send>;

/// Listener with no payload (matcher and validator global events).
pub type Callback = Box<dyn FnMut() + Send>;

/// A stored reference pose plus its listeners and hysteresis counter.
pub struct GestureTemplate {
    id: TemplateId,
    name: String,
    /// One point per tracked finger, in the hand's local frame.
    reference_positions: Vec<Point3>,
    on_recognized: Vec<RecognizedCallback>,
    /// Seconds this template has been the best candidate without interruption.
    held_duration_s: f64,
}

impl GestureTemplate {
    fn new(name: String, reference_positions: Vec<Point3>) -> Self {
        Self {
            id: next_template_id(),
            name,
            reference_positions,
            on_recognized: Vec::new(),
            held_duration_s: 0.0,
        }
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference_positions(&self) -> &[Point3] {
        &self.reference_positions
    }

    pub fn held_duration_s(&self) -> f64 {
        self.held_duration_s
    }

    pub fn listener_count(&self) -> usize {
        self.on_recognized.len()
    }

    /// Sum of per-finger distances to `pose`, or `None` if any finger is
    /// farther than `threshold`. NaN distances count as too far.
    fn distance_to(&self, pose: &[Point3], threshold: f32) -> Option<f32> {
        let mut sum = 0.0;
        for (reference, live) in self.reference_positions.iter().zip(pose) {
            let d = point_distance(live, reference);
            if !(d <= threshold) {
                return None;
            }
            sum += d;
        }
        Some(sum)
    }
}

impl fmt::Debug for GestureTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureTemplate")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("reference_positions", &self.reference_positions)
            .field("listeners", &self.on_recognized.len())
            .field("held_duration_s", &self.held_duration_s)
            .finish()
    }
}

/// The template chosen for a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureMatch {
    pub id: TemplateId,
    pub name: String,
    /// Sum of per-finger distances to the template (meters).
    pub distance: f32,
}

// ── Matcher ────────────────────────────────────────────────

/// Template library plus matching and hysteresis policy.
pub struct GestureMatcher {
    config: MatcherConfig,
    templates: Vec<GestureTemplate>,
    /// Result of the previous tick, used for edge detection.
    previous: Option<GestureMatch>,
    on_nothing_detected: Vec<Callback>,
}

impl Default for GestureMatcher {
    fn default() -> Self {
        Self {
            config: MatcherConfig::default(),
            templates: Vec::new(),
            previous: None,
            on_nothing_detected: Vec::new(),
        }
    }
}

impl GestureMatcher {
    /// Create an empty matcher. Fails if the config is unusable.
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn set_threshold(&mut self, threshold: f32) -> Result<()> {
        let config = MatcherConfig {
            threshold,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_required_delay(&mut self, required_delay_s: f64) -> Result<()> {
        let config = MatcherConfig {
            required_delay_s,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ── Library ───────────────────────────────────────────

    /// Snapshot `pose` as a new template at the end of the library.
    ///
    /// Names are not deduplicated; the pose must carry exactly
    /// `tracked_points` points.
    pub fn add_template(&mut self, name: &str, pose: &[Point3]) -> Result<TemplateId> {
        if pose.len() != self.config.tracked_points {
            warn!(
                "Refusing template '{}': {} points, matcher tracks {}",
                name,
                pose.len(),
                self.config.tracked_points
            );
            return Err(GestureError::TrackedPointCountMismatch {
                template: name.to_string(),
                expected: self.config.tracked_points,
                actual: pose.len(),
            });
        }
        let template = GestureTemplate::new(name.to_string(), pose.to_vec());
        let id = template.id;
        self.templates.push(template);
        info!("Template added: '{}' (id {}, {} in library)", name, id, self.templates.len());
        Ok(id)
    }

    /// Add a template with its first recognition listener already attached.
    pub fn add_template_with_callback<F>(
        &mut self,
        name: &str,
        pose: &[Point3],
        callback: F,
    ) -> Result<TemplateId>
    where
        F: FnMut(&GestureMatch) + Send + 'static,
    {
        let id = self.add_template(name, pose)?;
        self.on_recognized(id, callback);
        Ok(id)
    }

    /// Remove a template. Returns true if it existed.
    ///
    /// If it was the current result, the previous result is dropped without
    /// firing `on_nothing_detected`.
    pub fn remove_template(&mut self, id: TemplateId) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        let removed = self.templates.len() < before;
        if removed {
            if self.previous.as_ref().is_some_and(|m| m.id == id) {
                self.previous = None;
            }
            info!("Template removed: id {}", id);
        }
        removed
    }

    pub fn template(&self, id: TemplateId) -> Option<&GestureTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn templates(&self) -> impl Iterator<Item = &GestureTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    // ── Listeners ─────────────────────────────────────────

    /// Register a recognition listener on a template. Returns false if the
    /// template does not exist.
    pub fn on_recognized<F>(&mut self, id: TemplateId, callback: F) -> bool
    where
        F: FnMut(&GestureMatch) + Send + 'static,
    {
        match self.templates.iter_mut().find(|t| t.id == id) {
            Some(template) => {
                template.on_recognized.push(Box::new(callback));
                true
            }
            None => false,
        }
    }

    /// Register a listener for the recognized → nothing transition.
    pub fn on_nothing_detected<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_nothing_detected.push(Box::new(callback));
    }

    // ── Recognition ───────────────────────────────────────

    /// Classify one pose sample and dispatch edge notifications.
    ///
    /// Side effect: updates each template's hold counter. On a point count
    /// mismatch nothing is mutated and the error is returned.
    pub fn recognize(&mut self, pose: &[Point3], dt_s: f64) -> Result<Option<GestureMatch>> {
        if let Some(bad) = self
            .templates
            .iter()
            .find(|t| t.reference_positions.len() != pose.len())
        {
            warn!(
                "Template '{}' has {} points, pose has {}",
                bad.name,
                bad.reference_positions.len(),
                pose.len()
            );
            return Err(GestureError::TrackedPointCountMismatch {
                template: bad.name.clone(),
                expected: bad.reference_positions.len(),
                actual: pose.len(),
            });
        }

        let best = self.best_candidate(pose);

        // Only the winner keeps its hold time.
        for (i, template) in self.templates.iter_mut().enumerate() {
            if best.map(|(b, _)| b) != Some(i) {
                template.held_duration_s = 0.0;
            }
        }

        let current = match best {
            Some((i, distance)) => {
                let template = &mut self.templates[i];
                template.held_duration_s += dt_s;
                if template.held_duration_s >= self.config.required_delay_s {
                    Some(GestureMatch {
                        id: template.id,
                        name: template.name.clone(),
                        distance,
                    })
                } else {
                    trace!(
                        "Holding '{}': {:.3}s of {:.3}s",
                        template.name,
                        template.held_duration_s,
                        self.config.required_delay_s
                    );
                    None
                }
            }
            None => None,
        };

        self.dispatch_edge(current.as_ref());
        self.previous = current.clone();
        Ok(current)
    }

    /// Index and distance sum of the closest template within threshold.
    /// Earlier templates win ties.
    fn best_candidate(&self, pose: &[Point3]) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, template) in self.templates.iter().enumerate() {
            let Some(sum) = template.distance_to(pose, self.config.threshold) else {
                continue;
            };
            match best {
                Some((_, min)) if sum >= min => {}
                _ => best = Some((i, sum)),
            }
        }
        best
    }

    fn dispatch_edge(&mut self, current: Option<&GestureMatch>) {
        let previous_id = self.previous.as_ref().map(|m| m.id);
        match current {
            Some(found) if previous_id != Some(found.id) => {
                debug!("Gesture recognized: '{}' (id {})", found.name, found.id);
                if let Some(template) = self.templates.iter_mut().find(|t| t.id == found.id) {
                    for callback in template.on_recognized.iter_mut() {
                        callback(found);
                    }
                }
            }
            None if previous_id.is_some() => {
                debug!("Gesture released, nothing detected");
                for callback in self.on_nothing_detected.iter_mut() {
                    callback();
                }
            }
            _ => {}
        }
    }

    // ── State ─────────────────────────────────────────────

    /// The result reported by the last tick.
    pub fn current(&self) -> Option<&GestureMatch> {
        self.previous.as_ref()
    }

    /// Name of the currently recognized gesture, or "" when none.
    pub fn current_name(&self) -> &str {
        self.previous.as_ref().map(|m| m.name.as_str()).unwrap_or("")
    }

    /// Whether a specific template is the currently recognized gesture.
    pub fn is_active(&self, id: TemplateId) -> bool {
        self.previous.as_ref().is_some_and(|m| m.id == id)
    }

    /// Clear hold counters and the current result.
    ///
    /// Fires `on_nothing_detected` if a gesture was recognized.
    pub fn reset(&mut self) {
        for template in &mut self.templates {
            template.held_duration_s = 0.0;
        }
        if self.previous.take().is_some() {
            for callback in self.on_nothing_detected.iter_mut() {
                callback();
            }
        }
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let (current, hold) = match &self.previous {
            Some(m) => (
                format!("\"{}\"", sexp::escape_string(&m.name)),
                self.template(m.id).map(|t| t.held_duration_s).unwrap_or(0.0),
            ),
            None => ("nil".to_string(), 0.0),
        };
        format!(
            "(:templates {} :current {} :hold-s {:.3})",
            self.templates.len(),
            current,
            hold,
        )
    }

    /// Generate s-expression for the matcher config.
    pub fn config_sexp(&self) -> String {
        self.config.to_sexp()
    }

    /// Generate s-expression listing the library.
    pub fn templates_sexp(&self) -> String {
        if self.templates.is_empty() {
            return "nil".to_string();
        }
        let entries: Vec<String> = self
            .templates
            .iter()
            .map(|t| {
                format!(
                    "(:id {} :name \"{}\" :points {})",
                    t.id,
                    sexp::escape_string(&t.name),
                    t.reference_positions.len()
                )
            })
            .collect();
        format!("({})", entries.join(" "))
    }
}

impl fmt::Debug for GestureMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureMatcher")
            .field("config", &self.config)
            .field("templates", &self.templates)
            .field("previous", &self.previous)
            .finish()
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn make_pose(offset: f32) -> Vec<Point3> {
    (0..5)
        .map(|i| [i as f32 * 0.02 + offset, 0.08, 0.0])
        .collect()
}

#[cfg(test)]
fn counter() -> (
    std::sync::Arc<std::sync::atomic::AtomicUsize>,
    impl FnMut(&GestureMatch) + Send + 'static,
) {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    (count, move |_: &GestureMatch| {
        handle.fetch_add(1, Ordering::SeqCst);
    })
}

// ── Tests ──────────────────────────────────────────────────
