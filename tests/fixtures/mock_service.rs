//! In-memory routing service with scripted responses and a call log.

use std::cell::RefCell;
use std::collections::HashMap;

use course_geometry::error::RouteError;
use course_geometry::traits::{
    DirectionsResponse, DirectionsRoute, GeocodedPlace, Profile, RouteGeometry, RouteSummary,
    RoutingService,
};
use course_geometry::Coordinate;

use super::locations::Location;

/// A recorded call to the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Geocode(String),
    Directions(Vec<Coordinate>, Profile),
}

/// Scripted routing backend.
///
/// Known addresses geocode to their location; directions return the
/// configured response or, by default, a straight GeoJSON line through the
/// waypoints.
#[derive(Default)]
pub struct MockRoutingService {
    places: HashMap<String, GeocodedPlace>,
    directions: Option<Box<dyn Fn() -> Result<DirectionsResponse, RouteError>>>,
    calls: RefCell<Vec<Call>>,
}

impl MockRoutingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_places(mut self, locations: &[Location]) -> Self {
        for location in locations {
            self.places.insert(
                location.name.to_string(),
                GeocodedPlace {
                    coordinate: location.coordinate(),
                    label: format!("{}, Korea", location.name),
                },
            );
        }
        self
    }

    pub fn with_directions(
        mut self,
        respond: impl Fn() -> Result<DirectionsResponse, RouteError> + 'static,
    ) -> Self {
        self.directions = Some(Box::new(respond));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl RoutingService for MockRoutingService {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedPlace>, RouteError> {
        self.calls.borrow_mut().push(Call::Geocode(address.to_string()));
        Ok(self.places.get(address).cloned())
    }

    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: Profile,
    ) -> Result<DirectionsResponse, RouteError> {
        self.calls
            .borrow_mut()
            .push(Call::Directions(waypoints.to_vec(), profile));

        match &self.directions {
            Some(respond) => respond(),
            None => Ok(straight_line(waypoints, 1234.0, 600.0)),
        }
    }
}

/// A single-route response drawing a GeoJSON line through `waypoints`.
pub fn straight_line(waypoints: &[Coordinate], distance_m: f64, duration_s: f64) -> DirectionsResponse {
    DirectionsResponse {
        routes: vec![DirectionsRoute {
            geometry: RouteGeometry::GeoJson {
                coordinates: waypoints
                    .iter()
                    .map(|point| vec![point.lng, point.lat, 20.0])
                    .collect(),
            },
            summary: RouteSummary {
                distance: distance_m,
                duration: duration_s,
            },
        }],
    }
}
