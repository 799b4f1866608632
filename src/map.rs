use std::collections::HashMap;

use crate::dlog;
use crate::types::GeoPoint;

/// Handle to a marker or line placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(u64);

/// What the application asks of the interactive map widget. The widget
/// itself stays external; click events flow the other way, through the
/// driver loop.
pub trait MapPort {
    fn place_marker(&mut self, point: GeoPoint, label: &str) -> OverlayId;
    fn draw_line(&mut self, from: GeoPoint, to: GeoPoint, color: &str) -> OverlayId;
    /// Removing an unknown handle is a no-op.
    fn remove_overlay(&mut self, id: OverlayId);
    /// Geodesic distance in meters.
    fn distance_between(&self, from: GeoPoint, to: GeoPoint) -> f64;
    fn pan_to(&mut self, point: GeoPoint, zoom: f64);
    fn overlays(&self) -> Vec<OverlayId>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Marker {
        point: GeoPoint,
        label: String,
    },
    Line {
        from: GeoPoint,
        to: GeoPoint,
        color: String,
    },
}

/// Map backend for the console session: overlays live in a registry, the
/// geodesic distance is the haversine great-circle distance, and actions
/// are logged instead of rendered.
#[derive(Debug, Default)]
pub struct ConsoleMap {
    overlays: HashMap<u64, Overlay>,
    next_id: u64,
    center: Option<(GeoPoint, f64)>,
}

impl ConsoleMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id.0)
    }

    pub fn placed(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.values()
    }

    #[must_use]
    pub const fn center(&self) -> Option<(GeoPoint, f64)> {
        self.center
    }

    fn issue_id(&mut self) -> OverlayId {
        self.next_id += 1;
        OverlayId(self.next_id)
    }
}

impl MapPort for ConsoleMap {
    fn place_marker(&mut self, point: GeoPoint, label: &str) -> OverlayId {
        let id = self.issue_id();
        dlog!("map_marker id={} label={label:?} at=({point})", id.0);
        self.overlays.insert(
            id.0,
            Overlay::Marker {
                point,
                label: label.to_string(),
            },
        );
        id
    }

    fn draw_line(&mut self, from: GeoPoint, to: GeoPoint, color: &str) -> OverlayId {
        let id = self.issue_id();
        dlog!("map_line id={} color={color} from=({from}) to=({to})", id.0);
        self.overlays.insert(
            id.0,
            Overlay::Line {
                from,
                to,
                color: color.to_string(),
            },
        );
        id
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        if self.overlays.remove(&id.0).is_none() {
            dlog!("map_remove_missing id={}", id.0);
        }
    }

    fn distance_between(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        haversine_m(from, to)
    }

    fn pan_to(&mut self, point: GeoPoint, zoom: f64) {
        tracing::info!(lat = point.lat, lng = point.lng, zoom, "map centered");
        self.center = Some((point, zoom));
    }

    fn overlays(&self) -> Vec<OverlayId> {
        self.overlays.keys().copied().map(OverlayId).collect()
    }
}

/// Great-circle distance in meters.
#[must_use]
pub fn haversine_m(from: GeoPoint, to: GeoPoint) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lng / 2.).powi(2);
    let c = 2. * f64::asin(f64::sqrt(a));

    EARTH_RADIUS_M * c
}
