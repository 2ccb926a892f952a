// src/render.rs
use crate::map::Popup;
use crate::workout::{Workout, WorkoutId, WorkoutType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

/// Affordances attached to every list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Edit,
    Delete,
}

impl EntryAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutEntry {
    pub id: WorkoutId,
    pub workout_type: WorkoutType,
    pub title: String,
    pub details: Vec<Detail>,
    pub actions: [EntryAction; 2],
}

/// Builds the list entry for a workout: distance, duration, then the
/// derived metric and the type-specific field.
#[must_use]
pub fn render_entry(workout: &Workout) -> WorkoutEntry {
    let workout_type = workout.workout_type();
    let mut details = vec![
        Detail::new(
            workout_type.icon(),
            workout.distance_km().to_string(),
            "km",
        ),
        Detail::new("⏱", workout.duration_min().to_string(), "min"),
    ];
    let metric = format_metric(workout.derived_metric());
    match workout_type {
        WorkoutType::Running => {
            details.push(Detail::new("⚡️", metric, "min/km"));
            details.push(Detail::new(
                "🦶🏼",
                workout.type_specific().to_string(),
                "spm",
            ));
        }
        WorkoutType::Cycling => {
            details.push(Detail::new("⚡️", metric, "km/h"));
            details.push(Detail::new("⛰", workout.type_specific().to_string(), "m"));
        }
    }

    WorkoutEntry {
        id: workout.id().clone(),
        workout_type,
        title: workout.description().to_string(),
        details,
        actions: [EntryAction::Edit, EntryAction::Delete],
    }
}

/// One decimal, or `-` when the metric is undefined.
#[must_use]
pub fn format_metric(metric: Option<f64>) -> String {
    metric.map_or_else(|| "-".to_string(), |m| format!("{m:.1}"))
}

/// Marker popup text: type icon followed by the description.
#[must_use]
pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", workout.workout_type().icon(), workout.description())
}

#[must_use]
pub fn popup_for(workout: &Workout) -> Popup {
    Popup::for_workout(workout.workout_type(), popup_content(workout))
}

impl WorkoutEntry {
    /// HTML list item for the entry.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut lines = vec![
            format!(
                r#"<li class="workout workout--{}" data-id="{}">"#,
                self.workout_type,
                escape(self.id.as_str())
            ),
            format!(r#"  <h2 class="workout__title">{}</h2>"#, escape(&self.title)),
        ];
        for detail in &self.details {
            lines.push(r#"  <div class="workout__details">"#.to_string());
            lines.push(format!(r#"    <span class="workout__icon">{}</span>"#, detail.icon));
            lines.push(format!(
                r#"    <span class="workout__value">{}</span>"#,
                escape(&detail.value)
            ));
            lines.push(format!(r#"    <span class="workout__unit">{}</span>"#, detail.unit));
            lines.push("  </div>".to_string());
        }
        for action in self.actions {
            lines.push(format!(
                r#"  <button class="workout__btn workout__btn--{0}">{0}</button>"#,
                action.label()
            ));
        }
        lines.push("</li>".to_string());
        lines.join("\n")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
