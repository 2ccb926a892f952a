// src/form.rs
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::workout::{Coords, Workout, WorkoutInput, WorkoutType};

pub const DEFAULT_RESTORE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Inputs have to be positive numbers! {field} '{input}' is not a number.")]
    NotANumber { field: &'static str, input: String },
    #[error("Inputs have to be positive numbers! {field} must be finite.")]
    NotFinite { field: &'static str },
    #[error("Inputs have to be positive numbers! {field} is {value}.")]
    Negative { field: &'static str, value: f64 },
}

/// Parses one numeric field. Empty input is not a number.
pub fn parse_number(field: &'static str, input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            input: trimmed.to_string(),
        })
}

/// Every value must be finite, then every value must be non-negative.
/// The same rule applies to both workout types.
pub fn validate(values: &[(&'static str, f64)]) -> Result<(), ValidationError> {
    if let Some(&(field, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ValidationError::NotFinite { field });
    }
    if let Some(&(field, value)) = values.iter().find(|(_, v)| *v < 0.0) {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

/// Validates a full set of form values and packages them as `WorkoutInput`.
pub fn validate_input(
    workout_type: WorkoutType,
    distance_km: f64,
    duration_min: f64,
    type_specific: f64,
) -> Result<WorkoutInput, ValidationError> {
    validate(&[
        ("Distance", distance_km),
        ("Duration", duration_min),
        (FormField::for_type(workout_type).label(), type_specific),
    ])?;
    Ok(WorkoutInput {
        workout_type,
        distance_km,
        duration_min,
        type_specific,
    })
}

/// Deadline that can be rescheduled; scheduling again replaces the pending one.
#[derive(Debug, Default, Clone, Copy)]
pub struct RestartableTimer {
    deadline: Option<Instant>,
}

impl RestartableTimer {
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FormField {
    /// The type-specific field shown for `workout_type`.
    #[must_use]
    pub const fn for_type(workout_type: WorkoutType) -> Self {
        match workout_type {
            WorkoutType::Running => Self::Cadence,
            WorkoutType::Cycling => Self::Elevation,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Distance => "Distance",
            Self::Duration => "Duration",
            Self::Cadence => "Cadence",
            Self::Elevation => "Elev Gain",
        }
    }

    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Type => "",
            Self::Distance => "km",
            Self::Duration => "min",
            Self::Cadence => "step/min",
            Self::Elevation => "meters",
        }
    }
}

/// Layout display mode of the form, separate from its hidden state so the
/// hide transition is not cut short by an instant layout change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormLayout {
    Grid,
    Collapsed,
}

#[derive(Debug, Clone)]
pub struct WorkoutForm {
    hidden: bool,
    layout: FormLayout,
    workout_type: WorkoutType,
    type_locked: bool,
    distance: String,
    duration: String,
    cadence: String,
    elevation: String,
    focused: FormField,
    pending: Option<Coords>,
    restore_timer: RestartableTimer,
    restore_delay: Duration,
}

impl Default for WorkoutForm {
    fn default() -> Self {
        Self::new(DEFAULT_RESTORE_DELAY)
    }
}

impl WorkoutForm {
    #[must_use]
    pub fn new(restore_delay: Duration) -> Self {
        Self {
            hidden: true,
            layout: FormLayout::Grid,
            workout_type: WorkoutType::default(),
            type_locked: false,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
            focused: FormField::Distance,
            pending: None,
            restore_timer: RestartableTimer::default(),
            restore_delay,
        }
    }

    /// Reveals the form for a new workout at `at` and focuses distance.
    pub fn show(&mut self, at: Coords) {
        self.restore_timer.cancel();
        self.layout = FormLayout::Grid;
        self.hidden = false;
        self.type_locked = false;
        self.pending = Some(at);
        self.focused = FormField::Distance;
    }

    /// Moves the pending creation target without touching the inputs.
    pub fn retarget(&mut self, at: Coords) {
        self.pending = Some(at);
    }

    /// Reveals the form prefilled with `workout`; the type selector is locked.
    pub fn show_for_edit(&mut self, workout: &Workout) {
        self.restore_timer.cancel();
        self.layout = FormLayout::Grid;
        self.hidden = false;
        self.pending = None;
        self.workout_type = workout.workout_type();
        self.type_locked = true;
        self.distance = workout.distance_km().to_string();
        self.duration = workout.duration_min().to_string();
        self.cadence.clear();
        self.elevation.clear();
        if let Some(input) = self.input_mut(FormField::for_type(workout.workout_type())) {
            *input = workout.type_specific().to_string();
        }
        self.focused = FormField::Distance;
    }

    /// Clears the inputs and hides the form now; the layout comes back once
    /// the restore delay has elapsed (see `tick`).
    pub fn hide(&mut self, now: Instant) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
        self.hidden = true;
        self.layout = FormLayout::Collapsed;
        self.pending = None;
        self.type_locked = false;
        self.restore_timer.schedule(now, self.restore_delay);
    }

    /// Restores the layout when the hide delay has elapsed. Returns true if it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.restore_timer.fire(now) {
            self.layout = FormLayout::Grid;
            true
        } else {
            false
        }
    }

    /// Switches between running and cycling so exactly one of cadence and
    /// elevation is visible. Ignored while editing.
    pub fn toggle_fields_for_type(&mut self) {
        if self.type_locked {
            return;
        }
        self.workout_type = self.workout_type.toggled();
        if matches!(self.focused, FormField::Cadence | FormField::Elevation) {
            self.focused = self.type_field();
        }
    }

    pub fn set_type(&mut self, workout_type: WorkoutType) {
        if self.workout_type != workout_type {
            self.toggle_fields_for_type();
        }
    }

    #[must_use]
    pub const fn type_field(&self) -> FormField {
        FormField::for_type(self.workout_type)
    }

    #[must_use]
    pub fn is_field_visible(&self, field: FormField) -> bool {
        match field {
            FormField::Cadence | FormField::Elevation => field == self.type_field(),
            FormField::Type | FormField::Distance | FormField::Duration => true,
        }
    }

    /// Visible fields in display order.
    #[must_use]
    pub fn visible_fields(&self) -> [FormField; 4] {
        [
            FormField::Type,
            FormField::Distance,
            FormField::Duration,
            self.type_field(),
        ]
    }

    pub fn focus(&mut self, field: FormField) {
        if self.is_field_visible(field) {
            self.focused = field;
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.visible_fields();
        let i = fields.iter().position(|f| *f == self.focused).unwrap_or(0);
        self.focused = fields[(i + 1) % fields.len()];
    }

    pub fn focus_previous(&mut self) {
        let fields = self.visible_fields();
        let i = fields.iter().position(|f| *f == self.focused).unwrap_or(0);
        self.focused = fields[(i + fields.len() - 1) % fields.len()];
    }

    fn input_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Type => None,
            FormField::Distance => Some(&mut self.distance),
            FormField::Duration => Some(&mut self.duration),
            FormField::Cadence => Some(&mut self.cadence),
            FormField::Elevation => Some(&mut self.elevation),
        }
    }

    /// Types a character into the focused text field.
    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Some(input) = self.input_mut(self.focused) {
            input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.input_mut(self.focused) {
            input.pop();
        }
    }

    /// Replaces a text field's value. The type selector is not a text field.
    pub fn set_value(&mut self, field: FormField, value: &str) {
        if let Some(input) = self.input_mut(field) {
            *input = value.to_string();
        }
    }

    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Type => "",
            FormField::Distance => &self.distance,
            FormField::Duration => &self.duration,
            FormField::Cadence => &self.cadence,
            FormField::Elevation => &self.elevation,
        }
    }

    /// Parses and validates the visible fields.
    /// # Errors
    /// Returns `ValidationError` for the first field that is not a finite,
    /// non-negative number.
    pub fn read(&self) -> Result<WorkoutInput, ValidationError> {
        let type_field = self.type_field();
        let distance = parse_number(FormField::Distance.label(), &self.distance)?;
        let duration = parse_number(FormField::Duration.label(), &self.duration)?;
        let type_specific = parse_number(type_field.label(), self.value(type_field))?;
        validate_input(self.workout_type, distance, duration, type_specific)
    }

    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[must_use]
    pub const fn layout(&self) -> FormLayout {
        self.layout
    }

    /// True when the form should be drawn.
    #[must_use]
    pub fn is_displayed(&self) -> bool {
        !self.hidden && self.layout == FormLayout::Grid
    }

    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        self.workout_type
    }

    #[must_use]
    pub const fn is_type_locked(&self) -> bool {
        self.type_locked
    }

    #[must_use]
    pub const fn focused(&self) -> FormField {
        self.focused
    }

    #[must_use]
    pub const fn pending(&self) -> Option<Coords> {
        self.pending
    }

    #[must_use]
    pub const fn restore_pending(&self) -> bool {
        self.restore_timer.is_pending()
    }
}
