//! Routing service seam.
//!
//! The planner talks to routing and geocoding backends only through
//! [`RoutingService`]. [`crate::openroute::OpenRouteClient`] is the HTTP
//! implementation; tests provide their own.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::RouteError;

/// Travel profile, used as the directions path segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    #[default]
    FootWalking,
    FootHiking,
    CyclingRegular,
    DrivingCar,
    Wheelchair,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::FootWalking => "foot-walking",
            Profile::FootHiking => "foot-hiking",
            Profile::CyclingRegular => "cycling-regular",
            Profile::DrivingCar => "driving-car",
            Profile::Wheelchair => "wheelchair",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geocoding hit: where the address resolved to and its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Directions response body: `{routes: [{geometry, summary}]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    pub geometry: RouteGeometry,
    #[serde(default)]
    pub summary: RouteSummary,
}

/// Route length in meters and travel time in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RouteSummary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

/// Geometry as returned by the service: an encoded polyline string, a
/// GeoJSON-style object with `[lng, lat, ele?]` positions, or anything else.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RouteGeometry {
    Encoded(String),
    GeoJson { coordinates: Vec<Vec<f64>> },
    Other(serde_json::Value),
}

/// Provides geocoding and directions for the route planner.
pub trait RoutingService {
    /// Resolve a free-form address; `Ok(None)` when nothing matched.
    fn geocode(&self, address: &str) -> Result<Option<GeocodedPlace>, RouteError>;

    /// Request directions through `waypoints` in order.
    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: Profile,
    ) -> Result<DirectionsResponse, RouteError>;
}

impl<T: RoutingService + ?Sized> RoutingService for &T {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedPlace>, RouteError> {
        (**self).geocode(address)
    }

    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: Profile,
    ) -> Result<DirectionsResponse, RouteError> {
        (**self).directions(waypoints, profile)
    }
}
