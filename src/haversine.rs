//! Great-circle distance and course statistics.
//!
//! Straight-line (haversine) distances between consecutive points, a
//! pace-based duration estimate and elevation extremes. Everything here is a
//! pure function over coordinate slices.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Assumed running speed for duration estimates.
pub const DEFAULT_RUNNING_SPEED_KMH: f64 = 9.0;

/// Point count above which segment distances are summed on the rayon pool.
const PARALLEL_THRESHOLD: usize = 4096;

/// Calculate haversine distance between two points in meters.
///
/// Symmetric, and zero when both points are equal. Elevation is ignored.
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Sum of consecutive segment distances in meters; 0 for fewer than 2 points.
pub fn total_distance(points: &[Coordinate]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    if points.len() >= PARALLEL_THRESHOLD {
        points
            .par_windows(2)
            .map(|pair| haversine_distance(&pair[0], &pair[1]))
            .sum()
    } else {
        points
            .windows(2)
            .map(|pair| haversine_distance(&pair[0], &pair[1]))
            .sum()
    }
}

/// Estimated duration in whole minutes: `round(km / speed * 60)`.
///
/// Returns `None` unless `speed_kmh` is finite and positive.
pub fn estimated_duration_minutes(distance_km: f64, speed_kmh: f64) -> Option<i64> {
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return None;
    }
    Some((distance_km / speed_kmh * 60.0).round() as i64)
}

/// Altitude extremes of a course, floor-truncated to whole meters.
///
/// `{0, 0}` means no elevation data was present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationStats {
    pub max_altitude: i32,
    pub min_altitude: i32,
}

/// Elevation max/min over all points with a defined, non-NaN elevation.
pub fn elevation_stats(points: &[Coordinate]) -> ElevationStats {
    let mut elevations = points
        .iter()
        .filter_map(|point| point.elevation)
        .filter(|ele| !ele.is_nan());

    let Some(first) = elevations.next() else {
        return ElevationStats::default();
    };

    let (min, max) = elevations.fold((first, first), |(min, max), ele| (min.min(ele), max.max(ele)));

    ElevationStats {
        max_altitude: max.floor() as i32,
        min_altitude: min.floor() as i32,
    }
}

/// Distance, pace estimate and elevation extremes of a course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub distance_km: f64,
    /// `None` when the speed used was not a positive number.
    pub estimated_minutes: Option<i64>,
    pub elevation: ElevationStats,
}

impl CourseSummary {
    pub fn from_points(points: &[Coordinate], speed_kmh: f64) -> Self {
        let distance_km = total_distance(points) / 1000.0;
        Self {
            distance_km,
            estimated_minutes: estimated_duration_minutes(distance_km, speed_kmh),
            elevation: elevation_stats(points),
        }
    }
}
