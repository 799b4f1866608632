use anyhow::{Context, Result, bail};
use chrono::Utc;

use crate::capture::{CaptureError, CaptureState, ClickOutcome, RouteCapture};
use crate::database::{self, BlobStore};
use crate::form::{ValidationError, WorkoutForm};
use crate::map::MapPort;
use crate::store::WorkoutStore;
use crate::types::{GeoPoint, Workout, WorkoutType};
use crate::view::ListView;

/// Zoom used when the map is first centered and when panning to a workout.
pub const MAP_ZOOM_LEVEL: f64 = 13.0;

/// Result of a form submission. Rejection is an expected outcome of the
/// session, not a failure of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added { id: String, description: String },
    Rejected(ValidationError),
}

/// One session: the store, the pending capture, the form, and the external
/// collaborators the session drives. Every store mutation goes through
/// here, and each one rewrites the whole blob and redraws everything.
pub struct App<M, B, V> {
    map: M,
    blob: B,
    view: V,
    store: WorkoutStore,
    capture: RouteCapture,
    form: WorkoutForm,
}

impl<M: MapPort, B: BlobStore, V: ListView> App<M, B, V> {
    /// Center the map on the acquired position and load the persisted
    /// workouts. The first `refresh` renders them.
    pub fn new(mut map: M, blob: B, view: V, position: GeoPoint) -> Self {
        map.pan_to(position, MAP_ZOOM_LEVEL);

        let mut store = WorkoutStore::default();
        store.replace_all(database::load(&blob));
        tracing::info!(workouts = store.len(), "session loaded");

        Self {
            map,
            blob,
            view,
            store,
            capture: RouteCapture::default(),
            form: WorkoutForm::default(),
        }
    }

    #[must_use]
    pub fn workouts(&self) -> &[Workout] {
        self.store.workouts()
    }

    #[must_use]
    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    #[must_use]
    pub const fn form(&self) -> &WorkoutForm {
        &self.form
    }

    #[must_use]
    pub const fn map(&self) -> &M {
        &self.map
    }

    #[must_use]
    pub const fn blob(&self) -> &B {
        &self.blob
    }

    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// A map click feeds the route capture; completing the capture
    /// prefills the distance and route fields of the form.
    pub fn map_click(&mut self, point: GeoPoint) -> Result<ClickOutcome, CaptureError> {
        let outcome = self
            .capture
            .click(&mut self.map, point, self.form.workout_type)?;

        if let ClickOutcome::Complete {
            distance_km,
            ref route,
        } = outcome
        {
            self.form.distance = Some(distance_km);
            self.form.route = Some(route.clone());
        }

        Ok(outcome)
    }

    pub fn set_workout_type(&mut self, workout_type: WorkoutType) {
        self.form.workout_type = workout_type;
    }

    pub fn set_distance(&mut self, km: f64) {
        self.form.distance = Some(km);
    }

    pub fn set_duration(&mut self, minutes: f64) {
        self.form.duration = Some(minutes);
    }

    pub fn set_cadence(&mut self, steps_per_min: f64) {
        self.form.cadence = Some(steps_per_min);
    }

    pub fn set_elevation_gain(&mut self, meters: f64) {
        self.form.elevation_gain = Some(meters);
    }

    /// Submit the workout form. Validation runs before anything mutates, so
    /// a rejected submission leaves store, blob, and map untouched.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        let Some((start, _)) = self.capture.points() else {
            return Ok(SubmitOutcome::Rejected(ValidationError::RouteIncomplete));
        };

        let workout = match self.form.build_workout(Utc::now(), start) {
            Ok(workout) => workout,
            Err(e) => return Ok(SubmitOutcome::Rejected(e)),
        };

        let id = workout.id.clone();
        let description = workout.description.clone();
        tracing::info!(id = %id, description = %description, "workout recorded");

        self.store.add(workout);
        self.persist()?;
        self.capture.reset();
        self.form.reset_inputs();
        self.refresh();

        Ok(SubmitOutcome::Added { id, description })
    }

    /// Abandon the pending capture and its prefilled fields.
    pub fn discard(&mut self) {
        self.capture.discard(&mut self.map);
        self.form.reset_inputs();
    }

    /// Delete one workout by id. Unknown ids are a no-op; the rewrite and
    /// the redraw happen either way.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let removed = self.store.remove(id);
        self.persist()?;
        self.refresh();
        Ok(removed)
    }

    /// Empty the store. Asking the user for confirmation is the caller's
    /// job.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear();
        self.persist()?;
        self.refresh();
        Ok(())
    }

    /// Clicking a workout in the list: bump its counter and pan the map to
    /// it. Nothing is persisted.
    pub fn select(&mut self, id: &str) -> Option<GeoPoint> {
        let workout = self.store.find_mut(id)?;
        workout.click();
        let coords = workout.coords;
        self.map.pan_to(coords, MAP_ZOOM_LEVEL);
        Some(coords)
    }

    /// Re-print the list without touching any state.
    pub fn show_list(&mut self) {
        self.view.refresh(self.store.workouts());
    }

    /// Full redraw: sweep every overlay, re-place one marker per workout,
    /// re-render the list. Stale capture handles are forgotten rather than
    /// chased.
    pub fn refresh(&mut self) {
        for id in self.map.overlays() {
            self.map.remove_overlay(id);
        }
        self.capture.forget_overlays();

        for w in self.store.workouts() {
            self.map.place_marker(w.coords, &w.description);
        }

        self.view.refresh(self.store.workouts());
    }

    fn persist(&mut self) -> Result<()> {
        database::save(&mut self.blob, self.store.workouts()).context("Persisting workouts")
    }
}

/// One line of the interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Click(GeoPoint),
    Type(WorkoutType),
    Distance(f64),
    Duration(f64),
    Cadence(f64),
    Elevation(f64),
    Submit,
    Discard,
    Select(String),
    Delete(String),
    Clear,
    List,
    Help,
    Quit,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            bail!("empty command");
        };
        let rest: Vec<&str> = parts.collect();

        let parsed = match (cmd.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("click", [lat, lng]) => Self::Click(GeoPoint::new(
                parse_number("latitude", lat)?,
                parse_number("longitude", lng)?,
            )),
            ("type", [t]) => Self::Type(t.parse()?),
            ("distance", [v]) => Self::Distance(parse_number("distance", v)?),
            ("duration", [v]) => Self::Duration(parse_number("duration", v)?),
            ("cadence", [v]) => Self::Cadence(parse_number("cadence", v)?),
            ("elevation", [v]) => Self::Elevation(parse_number("elevation", v)?),
            ("submit", []) => Self::Submit,
            ("discard", []) => Self::Discard,
            ("select", [id]) => Self::Select((*id).to_string()),
            ("delete", [id]) => Self::Delete((*id).to_string()),
            ("clear", []) => Self::Clear,
            ("list", []) => Self::List,
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => bail!("unrecognized command: {line:?} (try `help`)"),
        };

        Ok(parsed)
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    raw.parse()
        .with_context(|| format!("{field} is not a number: {raw:?}"))
}
