// src/workout.rs
use anyhow::bail;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(value: Coords) -> Self {
        [value.lat, value.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkoutType {
    #[default]
    Running,
    Cycling,
}

impl WorkoutType {
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// Capitalized name used in descriptions ("Running on April 3").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Cycling,
            Self::Cycling => Self::Running,
        }
    }
}

// Convert string from storage/CLI to WorkoutType
impl TryFrom<&str> for WorkoutType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "running" | "run" => Ok(Self::Running),
            "cycling" | "cycle" | "bike" => Ok(Self::Cycling),
            _ => bail!("Invalid workout type: {}", value),
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Cycling => write!(f, "cycling"),
        }
    }
}

/// Identifier derived from the creation timestamp.
///
/// Two workouts created within the same millisecond share an id. Lookups by id
/// always act on the first match in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Last ten digits of the millisecond Unix timestamp.
    #[must_use]
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        let millis = timestamp.timestamp_millis().to_string();
        let start = millis.len().saturating_sub(10);
        Self(millis[start..].to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type-specific data plus the derived metric for that type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutKind {
    Running {
        cadence_spm: f64,
        pace_min_per_km: Option<f64>,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: Option<f64>,
    },
}

impl WorkoutKind {
    fn new(workout_type: WorkoutType, type_specific: f64) -> Self {
        match workout_type {
            WorkoutType::Running => Self::Running {
                cadence_spm: type_specific,
                pace_min_per_km: None,
            },
            WorkoutType::Cycling => Self::Cycling {
                elevation_gain_m: type_specific,
                speed_km_per_h: None,
            },
        }
    }

    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        match self {
            Self::Running { .. } => WorkoutType::Running,
            Self::Cycling { .. } => WorkoutType::Cycling,
        }
    }

    /// Cadence for running, elevation gain for cycling.
    #[must_use]
    pub const fn type_specific(&self) -> f64 {
        match self {
            Self::Running { cadence_spm, .. } => *cadence_spm,
            Self::Cycling {
                elevation_gain_m, ..
            } => *elevation_gain_m,
        }
    }
}

/// Validated values coming out of the workout form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub workout_type: WorkoutType,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Cadence (spm) for running, elevation gain (m) for cycling.
    pub type_specific: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    kind: WorkoutKind,
    description: String,
    click_count: u32,
}

impl Workout {
    /// Creates a workout whose id is derived from `created_at`.
    #[must_use]
    pub fn new(coords: Coords, input: WorkoutInput, created_at: DateTime<Utc>) -> Self {
        Self::with_id(
            WorkoutId::from_timestamp(created_at),
            coords,
            input,
            created_at,
        )
    }

    #[must_use]
    pub fn running(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let input = WorkoutInput {
            workout_type: WorkoutType::Running,
            distance_km,
            duration_min,
            type_specific: cadence_spm,
        };
        Self::new(coords, input, created_at)
    }

    #[must_use]
    pub fn cycling(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let input = WorkoutInput {
            workout_type: WorkoutType::Cycling,
            distance_km,
            duration_min,
            type_specific: elevation_gain_m,
        };
        Self::new(coords, input, created_at)
    }

    /// Rebuilds a workout with a known id (used when loading persisted records).
    /// Derived fields are always recomputed.
    #[must_use]
    pub fn with_id(
        id: WorkoutId,
        coords: Coords,
        input: WorkoutInput,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut workout = Self {
            id,
            created_at,
            coords,
            distance_km: input.distance_km,
            duration_min: input.duration_min,
            kind: WorkoutKind::new(input.workout_type, input.type_specific),
            description: String::new(),
            click_count: 0,
        };
        workout.recompute();
        workout.describe();
        workout
    }

    /// Recalculates pace (running) or speed (cycling) from the current
    /// distance and duration. A zero divisor leaves the metric unset.
    pub fn recompute(&mut self) {
        let distance = self.distance_km;
        let duration = self.duration_min;
        match &mut self.kind {
            WorkoutKind::Running {
                pace_min_per_km, ..
            } => {
                // min/km
                *pace_min_per_km = ratio(duration, distance);
            }
            WorkoutKind::Cycling { speed_km_per_h, .. } => {
                // km/h
                *speed_km_per_h = ratio(distance, duration / 60.0);
            }
        }
    }

    pub fn describe(&mut self) {
        let local = self.created_at.with_timezone(&Local);
        self.description = format!(
            "{} on {}",
            self.workout_type().label(),
            local.format("%B %-d")
        );
    }

    /// Replaces the mutable measurements and refreshes the derived fields.
    /// The workout type cannot change through an edit.
    pub fn apply_edit(&mut self, distance_km: f64, duration_min: f64, type_specific: f64) {
        self.distance_km = distance_km;
        self.duration_min = duration_min;
        match &mut self.kind {
            WorkoutKind::Running { cadence_spm, .. } => *cadence_spm = type_specific,
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => *elevation_gain_m = type_specific,
        }
        self.recompute();
        self.describe();
    }

    pub fn record_click(&mut self) {
        self.click_count = self.click_count.saturating_add(1);
    }

    #[must_use]
    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn coords(&self) -> Coords {
        self.coords
    }

    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    #[must_use]
    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    #[must_use]
    pub const fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    #[must_use]
    pub const fn type_specific(&self) -> f64 {
        self.kind.type_specific()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn click_count(&self) -> u32 {
        self.click_count
    }

    #[must_use]
    pub const fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running {
                pace_min_per_km, ..
            } => pace_min_per_km,
            WorkoutKind::Cycling { .. } => None,
        }
    }

    #[must_use]
    pub const fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed_km_per_h, .. } => speed_km_per_h,
            WorkoutKind::Running { .. } => None,
        }
    }

    #[must_use]
    pub const fn cadence(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { cadence_spm, .. } => Some(cadence_spm),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    #[must_use]
    pub const fn elevation_gain(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => Some(elevation_gain_m),
            WorkoutKind::Running { .. } => None,
        }
    }

    /// Pace for running, speed for cycling.
    #[must_use]
    pub const fn derived_metric(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running {
                pace_min_per_km, ..
            } => pace_min_per_km,
            WorkoutKind::Cycling { speed_km_per_h, .. } => speed_km_per_h,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}
