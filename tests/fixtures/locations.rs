//! Real locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use course_geometry::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

// ============================================================================
// Busan running spots
// ============================================================================

pub const BUSAN: &[Location] = &[
    Location::new("Haeundae Beach", 35.1587, 129.1604),
    Location::new("Dongbaekseom", 35.1535, 129.1520),
    Location::new("Gwangalli Beach", 35.1532, 129.1186),
    Location::new("Oncheoncheon Citizens Park", 35.2005, 129.0878),
    Location::new("Pusan National University", 35.2332, 129.0797),
];

// ============================================================================
// Heidelberg (covered by the openrouteservice bundled demo extract)
// ============================================================================

pub const HEIDELBERG: &[Location] = &[
    Location::new("Bismarckplatz", 49.4093, 8.6928),
    Location::new("Universitaetsplatz", 49.4106, 8.7065),
    Location::new("Karlstor", 49.4134, 8.7193),
];

pub fn coordinates(locations: &[Location]) -> Vec<Coordinate> {
    locations.iter().map(Location::coordinate).collect()
}
