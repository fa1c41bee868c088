//! Route planner: waypoints or addresses in, unified route result out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::RouteError;
use crate::polyline;
use crate::traits::{DirectionsResponse, GeocodedPlace, Profile, RouteGeometry, RoutingService};

/// A planned route: geometry plus length and travel time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub coordinates: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_seconds: f64,
}

/// A route planned from addresses, with the geocoded places in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRoute {
    pub route: RouteResult,
    pub places: Vec<GeocodedPlace>,
}

/// Shared flag that aborts planning between network calls.
///
/// Clones observe the same flag. A request already in flight runs to
/// completion, but its result is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RouteError> {
        if self.is_cancelled() {
            Err(RouteError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoutePlanner<S> {
    service: S,
}

impl<S: RoutingService> RoutePlanner<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Plan a route through `waypoints` in order.
    pub fn plan_from_coordinates(
        &self,
        waypoints: &[Coordinate],
        profile: Profile,
        cancel: &CancellationToken,
    ) -> Result<RouteResult, RouteError> {
        if waypoints.len() < 2 {
            return Err(RouteError::InvalidInput(format!(
                "at least 2 waypoints are required, got {}",
                waypoints.len()
            )));
        }

        cancel.check()?;
        let response = self.service.directions(waypoints, profile)?;
        cancel.check()?;

        let result = route_from_response(response)?;
        tracing::debug!(
            points = result.coordinates.len(),
            distance_km = result.distance_km,
            duration_seconds = result.duration_seconds,
            "planned route"
        );
        Ok(result)
    }

    /// Geocode each address in order, then plan through the results.
    ///
    /// Geocoding is sequential so the first unresolvable address in input
    /// order is the one reported.
    pub fn plan_from_addresses<A: AsRef<str>>(
        &self,
        addresses: &[A],
        profile: Profile,
        cancel: &CancellationToken,
    ) -> Result<AddressRoute, RouteError> {
        if addresses.len() < 2 {
            return Err(RouteError::InvalidInput(format!(
                "at least 2 addresses are required, got {}",
                addresses.len()
            )));
        }

        let mut places = Vec::with_capacity(addresses.len());
        for address in addresses {
            let address = address.as_ref();
            cancel.check()?;
            let place = self
                .service
                .geocode(address)?
                .ok_or_else(|| RouteError::AddressNotFound {
                    address: address.to_string(),
                })?;
            tracing::trace!(address, label = %place.label, "geocoded address");
            places.push(place);
        }

        let waypoints: Vec<Coordinate> = places.iter().map(|place| place.coordinate).collect();
        let route = self.plan_from_coordinates(&waypoints, profile, cancel)?;

        Ok(AddressRoute { route, places })
    }
}

/// Turn the first route of a directions response into a [`RouteResult`].
pub fn route_from_response(response: DirectionsResponse) -> Result<RouteResult, RouteError> {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RouteError::NoRouteFound)?;

    Ok(RouteResult {
        coordinates: decode_geometry(route.geometry)?,
        distance_km: route.summary.distance / 1000.0,
        duration_seconds: route.summary.duration,
    })
}

/// Decode either geometry shape into coordinates.
///
/// Encoded strings carry elevation (3D); GeoJSON positions are
/// `[lng, lat]` with an optional third elevation value.
pub fn decode_geometry(geometry: RouteGeometry) -> Result<Vec<Coordinate>, RouteError> {
    match geometry {
        RouteGeometry::Encoded(encoded) => Ok(polyline::decode(&encoded, true)),
        RouteGeometry::GeoJson { coordinates } => coordinates
            .into_iter()
            .map(|position| match position[..] {
                [lng, lat] => Ok(Coordinate::new(lat, lng)),
                [lng, lat, elevation, ..] => Ok(Coordinate::with_elevation(lat, lng, elevation)),
                _ => Err(RouteError::UnknownGeometryFormat),
            })
            .collect(),
        RouteGeometry::Other(value) => {
            tracing::warn!(geometry = %value, "unrecognized route geometry");
            Err(RouteError::UnknownGeometryFormat)
        }
    }
}
