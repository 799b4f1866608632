use std::fmt;

use crate::dlog;
use crate::map::{MapPort, OverlayId};
use crate::types::{GeoPoint, WorkoutType};
use crate::utils::round2;

pub const START_MARKER_LABEL: &str = "Start Point";
pub const END_MARKER_LABEL: &str = "End Point";

/// Progress of the two-click route capture for the pending workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    StartSet,
    Complete,
}

/// What a map click did to the pending capture.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    StartSet,
    /// Both points captured: the route line is drawn and the form can be
    /// prefilled and revealed.
    Complete { distance_km: f64, route: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    PointsAlreadySet,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointsAlreadySet => write!(f, "Both points are already set."),
        }
    }
}

impl std::error::Error for CaptureError {}

/// At most one of these exists per form session: it holds the clicked
/// points and the handles of the overlays it placed.
#[derive(Debug, Default)]
pub struct RouteCapture {
    start: Option<GeoPoint>,
    end: Option<GeoPoint>,
    start_marker: Option<OverlayId>,
    end_marker: Option<OverlayId>,
    line: Option<OverlayId>,
}

impl RouteCapture {
    #[must_use]
    pub const fn state(&self) -> CaptureState {
        match (self.start, self.end) {
            (None, _) => CaptureState::Idle,
            (Some(_), None) => CaptureState::StartSet,
            (Some(_), Some(_)) => CaptureState::Complete,
        }
    }

    #[must_use]
    pub fn points(&self) -> Option<(GeoPoint, GeoPoint)> {
        self.start.zip(self.end)
    }

    /// Feed one map click into the capture. The first click marks the start,
    /// the second marks the end, draws the type-colored line, and reports
    /// the geodesic distance; any further click is rejected untouched.
    pub fn click<M: MapPort>(
        &mut self,
        map: &mut M,
        point: GeoPoint,
        workout_type: WorkoutType,
    ) -> Result<ClickOutcome, CaptureError> {
        match (self.start, self.end) {
            (Some(_), Some(_)) => Err(CaptureError::PointsAlreadySet),
            (None, _) => {
                dlog!("capture_start at=({point})");
                self.start = Some(point);
                self.start_marker = Some(map.place_marker(point, START_MARKER_LABEL));
                Ok(ClickOutcome::StartSet)
            }
            (Some(start), None) => {
                dlog!("capture_end at=({point})");
                self.end = Some(point);
                self.end_marker = Some(map.place_marker(point, END_MARKER_LABEL));
                self.redraw_line(map, workout_type);

                let distance_km = round2(map.distance_between(start, point) / 1000.0);
                let route = format!("From ({start}) to ({point})");
                Ok(ClickOutcome::Complete { distance_km, route })
            }
        }
    }

    // At most one active line per pending capture.
    fn redraw_line<M: MapPort>(&mut self, map: &mut M, workout_type: WorkoutType) {
        if let Some(line) = self.line.take() {
            map.remove_overlay(line);
        }
        if let Some((start, end)) = self.points() {
            self.line = Some(map.draw_line(start, end, workout_type.route_color()));
        }
    }

    /// Clear the captured points after a successful submission. The line
    /// handle is kept so the next capture cycle removes a line that is
    /// still on the map before drawing its own.
    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
        self.start_marker = None;
        self.end_marker = None;
    }

    /// Abandon the pending capture: back to idle, with the capture's own
    /// markers and line taken off the map.
    pub fn discard<M: MapPort>(&mut self, map: &mut M) {
        let handles = [
            self.start_marker.take(),
            self.end_marker.take(),
            self.line.take(),
        ];
        for id in handles.into_iter().flatten() {
            map.remove_overlay(id);
        }
        self.start = None;
        self.end = None;
        dlog!("capture_discarded");
    }

    /// A full redraw swept every overlay, this capture's included; the
    /// stale handles must not be removed again later.
    pub fn forget_overlays(&mut self) {
        self.start_marker = None;
        self.end_marker = None;
        self.line = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ConsoleMap, Overlay};

    fn start_point() -> GeoPoint {
        GeoPoint::new(52.520, 13.405)
    }

    fn end_point() -> GeoPoint {
        GeoPoint::new(52.531, 13.384)
    }

    fn line_overlays(map: &ConsoleMap) -> Vec<&Overlay> {
        map.placed()
            .filter(|o| matches!(o, Overlay::Line { .. }))
            .collect()
    }

    #[test]
    fn two_clicks_complete_the_capture() {
        let mut map = ConsoleMap::new();
        let mut capture = RouteCapture::default();
        assert_eq!(capture.state(), CaptureState::Idle);

        let first = capture
            .click(&mut map, start_point(), WorkoutType::Running)
            .unwrap();
        assert_eq!(first, ClickOutcome::StartSet);
        assert_eq!(capture.state(), CaptureState::StartSet);

        let second = capture
            .click(&mut map, end_point(), WorkoutType::Running)
            .unwrap();
        let ClickOutcome::Complete { distance_km, route } = second else {
            panic!("expected a completed capture");
        };
        assert_eq!(capture.state(), CaptureState::Complete);

        let expected = round2(map.distance_between(start_point(), end_point()) / 1000.0);
        assert_eq!(distance_km, expected);
        assert_eq!(route, "From (52.520, 13.405) to (52.531, 13.384)");

        // Two labeled markers and one line on the map.
        assert_eq!(map.overlays().len(), 3);
        let labels: Vec<&str> = map
            .placed()
            .filter_map(|o| match o {
                Overlay::Marker { label, .. } => Some(label.as_str()),
                Overlay::Line { .. } => None,
            })
            .collect();
        assert!(labels.contains(&START_MARKER_LABEL));
        assert!(labels.contains(&END_MARKER_LABEL));
    }

    #[test]
    fn third_click_changes_nothing() {
        let mut map = ConsoleMap::new();
        let mut capture = RouteCapture::default();
        capture
            .click(&mut map, start_point(), WorkoutType::Running)
            .unwrap();
        capture
            .click(&mut map, end_point(), WorkoutType::Running)
            .unwrap();

        let err = capture
            .click(&mut map, GeoPoint::new(48.0, 11.0), WorkoutType::Running)
            .unwrap_err();
        assert_eq!(err, CaptureError::PointsAlreadySet);
        assert_eq!(err.to_string(), "Both points are already set.");

        assert_eq!(capture.points(), Some((start_point(), end_point())));
        assert_eq!(map.overlays().len(), 3);
    }

    #[test]
    fn line_color_follows_the_selected_type() {
        let mut map = ConsoleMap::new();
        let mut capture = RouteCapture::default();
        capture
            .click(&mut map, start_point(), WorkoutType::Cycling)
            .unwrap();
        capture
            .click(&mut map, end_point(), WorkoutType::Cycling)
            .unwrap();

        let lines = line_overlays(&map);
        assert_eq!(lines.len(), 1);
        assert!(matches!(lines[0], Overlay::Line { color, .. } if color == "orange"));
    }

    #[test]
    fn next_cycle_removes_the_previous_line_before_drawing() {
        let mut map = ConsoleMap::new();
        let mut capture = RouteCapture::default();
        capture
            .click(&mut map, start_point(), WorkoutType::Running)
            .unwrap();
        capture
            .click(&mut map, end_point(), WorkoutType::Running)
            .unwrap();

        capture.reset();
        assert_eq!(capture.state(), CaptureState::Idle);

        let a = GeoPoint::new(48.137, 11.575);
        let b = GeoPoint::new(48.265, 11.668);
        capture.click(&mut map, a, WorkoutType::Cycling).unwrap();
        capture.click(&mut map, b, WorkoutType::Cycling).unwrap();

        let lines = line_overlays(&map);
        assert_eq!(lines.len(), 1);
        assert!(
            matches!(lines[0], Overlay::Line { from, to, color } if *from == a && *to == b && color == "orange")
        );
    }

    #[test]
    fn discard_removes_the_capture_overlays() {
        let mut map = ConsoleMap::new();
        let mut capture = RouteCapture::default();
        capture
            .click(&mut map, start_point(), WorkoutType::Running)
            .unwrap();
        capture
            .click(&mut map, end_point(), WorkoutType::Running)
            .unwrap();

        capture.discard(&mut map);
        assert_eq!(capture.state(), CaptureState::Idle);
        assert!(map.overlays().is_empty());

        // The capture is usable again after a discard.
        let outcome = capture
            .click(&mut map, start_point(), WorkoutType::Running)
            .unwrap();
        assert_eq!(outcome, ClickOutcome::StartSet);
    }
}
