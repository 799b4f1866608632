use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate pair. Stored as a `[lat, lng]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lat, p.lng]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}, {:.3}", self.lat, self.lng)
    }
}

impl FromStr for GeoPoint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((lat_raw, lng_raw)) = s.split_once(',') else {
            bail!("expected LAT,LNG, got {s:?}");
        };

        let lat: f64 = lat_raw
            .trim()
            .parse()
            .with_context(|| format!("bad latitude: {lat_raw:?}"))?;
        let lng: f64 = lng_raw
            .trim()
            .parse()
            .with_context(|| format!("bad longitude: {lng_raw:?}"))?;

        if !lat.is_finite() || !lng.is_finite() {
            bail!("coordinates must be finite: {s:?}");
        }

        Ok(Self { lat, lng })
    }
}

/// The two workout categories the form recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkoutType {
    #[default]
    Running,
    Cycling,
}

impl WorkoutType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    /// Color of the route line drawn when a capture completes.
    #[must_use]
    pub const fn route_color(self) -> &'static str {
        match self {
            Self::Running => "green",
            Self::Cycling => "orange",
        }
    }
}

impl FromStr for WorkoutType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("running") {
            Ok(Self::Running)
        } else if s.eq_ignore_ascii_case("cycling") {
            Ok(Self::Cycling)
        } else {
            bail!("unknown workout type {s:?} (expected running or cycling)");
        }
    }
}

/// Variant-specific fields. The derived metric is fixed when the workout is
/// constructed and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    Running {
        /// steps/min
        cadence: f64,
        /// min/km
        pace: f64,
    },
    Cycling {
        /// meters; may be zero or negative
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// km/h
        speed: f64,
    },
}

impl WorkoutKind {
    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        match self {
            Self::Running { .. } => WorkoutType::Running,
            Self::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// A recorded workout. Everything except the click counter is fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub recorded_at: DateTime<Utc>,
    pub coords: GeoPoint,
    /// km
    pub distance: f64,
    /// min
    pub duration: f64,
    pub description: String,
    #[serde(flatten)]
    pub kind: WorkoutKind,
    /// Times this workout was selected in the list. Not persisted.
    #[serde(skip)]
    clicks: u32,
}

impl Workout {
    #[must_use]
    pub fn running(
        recorded_at: DateTime<Utc>,
        coords: GeoPoint,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Self {
        let pace = duration / distance;
        Self::with_kind(
            recorded_at,
            coords,
            distance,
            duration,
            WorkoutKind::Running { cadence, pace },
        )
    }

    #[must_use]
    pub fn cycling(
        recorded_at: DateTime<Utc>,
        coords: GeoPoint,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        let speed = distance / (duration / 60.0);
        Self::with_kind(
            recorded_at,
            coords,
            distance,
            duration,
            WorkoutKind::Cycling {
                elevation_gain,
                speed,
            },
        )
    }

    fn with_kind(
        recorded_at: DateTime<Utc>,
        coords: GeoPoint,
        distance: f64,
        duration: f64,
        kind: WorkoutKind,
    ) -> Self {
        debug_assert!(distance > 0.0 && duration > 0.0);

        let description = format!(
            "{} on {}",
            kind.workout_type().label(),
            recorded_at.format("%B %-d")
        );

        Self {
            id: next_workout_id(recorded_at),
            recorded_at,
            coords,
            distance,
            duration,
            description,
            kind,
            clicks: 0,
        }
    }

    #[must_use]
    pub const fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    pub fn click(&mut self) {
        self.clicks += 1;
    }

    #[must_use]
    pub const fn clicks(&self) -> u32 {
        self.clicks
    }
}

/// Last ten digits of the creation timestamp in milliseconds. The source is
/// monotonic: two workouts landing on the same millisecond still get
/// distinct ids, and lookup/deletion key on the id alone.
fn next_workout_id(recorded_at: DateTime<Utc>) -> String {
    static LAST: AtomicI64 = AtomicI64::new(0);

    let millis = recorded_at.timestamp_millis();
    let prev = LAST
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(last.max(millis - 1) + 1)
        })
        .unwrap_or(0);
    let issued = prev.max(millis - 1) + 1;

    format!("{:010}", issued.rem_euclid(10_000_000_000))
}
