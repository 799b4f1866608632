use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::{GeoPoint, Workout, WorkoutType};

/// Rejected form submission. Surfaced as a blocking notice; nothing is
/// constructed or stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NonPositiveInputs,
    RouteIncomplete,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveInputs => write!(f, "Inputs have to be positive numbers!"),
            Self::RouteIncomplete => write!(f, "Set both route points on the map first."),
        }
    }
}

impl std::error::Error for ValidationError {}

/// The workout-detail form. `distance` and `route` are prefilled when the
/// route capture completes; the rest is user input. Which extra field
/// applies follows the selected type.
#[derive(Debug, Clone, Default)]
pub struct WorkoutForm {
    pub workout_type: WorkoutType,
    /// km
    pub distance: Option<f64>,
    /// min
    pub duration: Option<f64>,
    /// steps/min, running only
    pub cadence: Option<f64>,
    /// meters, cycling only
    pub elevation_gain: Option<f64>,
    pub route: Option<String>,
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn all_positive(values: &[f64]) -> bool {
    values.iter().all(|v| *v > 0.0)
}

impl WorkoutForm {
    /// Validate the recognized fields and construct the workout. A missing
    /// field fails validation the same way non-finite input does; elevation
    /// gain only has to be finite, not positive.
    pub fn build_workout(
        &self,
        recorded_at: DateTime<Utc>,
        coords: GeoPoint,
    ) -> Result<Workout, ValidationError> {
        let distance = self.distance.unwrap_or(f64::NAN);
        let duration = self.duration.unwrap_or(f64::NAN);

        match self.workout_type {
            WorkoutType::Running => {
                let cadence = self.cadence.unwrap_or(f64::NAN);
                if !all_finite(&[distance, duration, cadence])
                    || !all_positive(&[distance, duration, cadence])
                {
                    return Err(ValidationError::NonPositiveInputs);
                }
                Ok(Workout::running(
                    recorded_at,
                    coords,
                    distance,
                    duration,
                    cadence,
                ))
            }
            WorkoutType::Cycling => {
                let elevation_gain = self.elevation_gain.unwrap_or(f64::NAN);
                if !all_finite(&[distance, duration, elevation_gain])
                    || !all_positive(&[distance, duration])
                {
                    return Err(ValidationError::NonPositiveInputs);
                }
                Ok(Workout::cycling(
                    recorded_at,
                    coords,
                    distance,
                    duration,
                    elevation_gain,
                ))
            }
        }
    }

    /// Reset after a submission or a discard: the numeric fields and the
    /// route go, the selected type stays.
    pub fn reset_inputs(&mut self) {
        *self = Self {
            workout_type: self.workout_type,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkoutKind;

    fn coords() -> GeoPoint {
        GeoPoint::new(52.52, 13.405)
    }

    fn running_form() -> WorkoutForm {
        WorkoutForm {
            workout_type: WorkoutType::Running,
            distance: Some(5.0),
            duration: Some(25.0),
            cadence: Some(180.0),
            ..WorkoutForm::default()
        }
    }

    #[test]
    fn valid_running_form_builds_a_workout() {
        let w = running_form().build_workout(Utc::now(), coords()).unwrap();
        assert!(matches!(w.kind, WorkoutKind::Running { pace, .. } if pace == 5.0));
        assert_eq!(w.coords, coords());
    }

    #[test]
    fn negative_distance_is_rejected() {
        let mut form = running_form();
        form.distance = Some(-1.0);
        assert_eq!(
            form.build_workout(Utc::now(), coords()),
            Err(ValidationError::NonPositiveInputs)
        );
    }

    #[test]
    fn missing_cadence_is_rejected() {
        let mut form = running_form();
        form.cadence = None;
        assert_eq!(
            form.build_workout(Utc::now(), coords()),
            Err(ValidationError::NonPositiveInputs)
        );
    }

    #[test]
    fn non_finite_duration_is_rejected() {
        let mut form = running_form();
        form.duration = Some(f64::INFINITY);
        assert_eq!(
            form.build_workout(Utc::now(), coords()),
            Err(ValidationError::NonPositiveInputs)
        );
    }

    #[test]
    fn cycling_accepts_non_positive_elevation() {
        let form = WorkoutForm {
            workout_type: WorkoutType::Cycling,
            distance: Some(20.0),
            duration: Some(60.0),
            elevation_gain: Some(-50.0),
            ..WorkoutForm::default()
        };
        let w = form.build_workout(Utc::now(), coords()).unwrap();
        assert!(matches!(w.kind, WorkoutKind::Cycling { speed, .. } if speed == 20.0));
    }

    #[test]
    fn cycling_still_requires_finite_elevation() {
        let form = WorkoutForm {
            workout_type: WorkoutType::Cycling,
            distance: Some(20.0),
            duration: Some(60.0),
            elevation_gain: None,
            ..WorkoutForm::default()
        };
        assert_eq!(
            form.build_workout(Utc::now(), coords()),
            Err(ValidationError::NonPositiveInputs)
        );
    }

    #[test]
    fn reset_keeps_the_selected_type() {
        let mut form = WorkoutForm {
            workout_type: WorkoutType::Cycling,
            distance: Some(20.0),
            duration: Some(60.0),
            elevation_gain: Some(120.0),
            route: Some("From (52.520, 13.405) to (52.531, 13.384)".to_string()),
            ..WorkoutForm::default()
        };

        form.reset_inputs();
        assert_eq!(form.workout_type, WorkoutType::Cycling);
        assert!(form.distance.is_none());
        assert!(form.duration.is_none());
        assert!(form.elevation_gain.is_none());
        assert!(form.route.is_none());
    }
}
