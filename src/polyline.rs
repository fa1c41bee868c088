//! Polyline representation and codec for route geometries.
//!
//! Routing services return geometries in the compact polyline format
//! (chars offset by 63, 5-bit groups with a 0x20 continuation bit,
//! zig-zag signed deltas). Latitude and longitude use a precision of 1e5,
//! elevation (3D variant) a precision of 1e2.
//!
//! Decoding is best-effort: callers must supply strings produced by a
//! compliant encoder. Malformed input never panics; a value truncated
//! mid-group ends decoding and the partial point is dropped.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

const COORDINATE_FACTOR: f64 = 1e5;
const ELEVATION_FACTOR: f64 = 1e2;

/// The decoded path of a planned route, in traversal order.
///
/// Built from a routing response and handed to the statistics and GPX
/// export code; the compact string form only exists at the service boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string. See [`decode`].
    pub fn decode(encoded: &str, is_3d: bool) -> Self {
        Self::new(decode(encoded, is_3d))
    }

    /// Encodes the points back into the compact string form. See [`encode`].
    pub fn encode(&self, is_3d: bool) -> String {
        encode(&self.points, is_3d)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }
}

/// Decode an encoded polyline into coordinates, in encoding order.
///
/// With `is_3d`, an elevation delta follows each lat/lng pair. It is only
/// read when characters remain, so a final point without elevation is
/// returned with `elevation: None` instead of failing.
pub fn decode(encoded: &str, is_3d: bool) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut elevation: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        let Some(delta_lat) = next_value(bytes, &mut index) else {
            break;
        };
        let Some(delta_lng) = next_value(bytes, &mut index) else {
            break;
        };
        lat = lat.wrapping_add(delta_lat);
        lng = lng.wrapping_add(delta_lng);

        let mut point = Coordinate::new(
            lat as f64 / COORDINATE_FACTOR,
            lng as f64 / COORDINATE_FACTOR,
        );

        if is_3d && index < bytes.len() {
            if let Some(delta_ele) = next_value(bytes, &mut index) {
                elevation = elevation.wrapping_add(delta_ele);
                point.elevation = Some(elevation as f64 / ELEVATION_FACTOR);
            }
        }

        points.push(point);
    }

    points
}

/// Encode coordinates into a polyline string.
///
/// With `is_3d`, each point carries an elevation delta; points without a
/// finite elevation are encoded as 0 m. Points with a non-finite latitude or
/// longitude are skipped. Deltas wrap instead of overflowing, so coordinates
/// far outside the valid range produce a well-formed but meaningless string.
pub fn encode(points: &[Coordinate], is_3d: bool) -> String {
    let mut out = String::with_capacity(points.len() * if is_3d { 9 } else { 6 });
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;
    let mut prev_ele: i64 = 0;

    for point in points {
        if !point.lat.is_finite() || !point.lng.is_finite() {
            tracing::warn!(lat = point.lat, lng = point.lng, "skipping non-finite point in polyline");
            continue;
        }
        let lat = (point.lat * COORDINATE_FACTOR).round() as i64;
        let lng = (point.lng * COORDINATE_FACTOR).round() as i64;
        push_value(&mut out, lat.wrapping_sub(prev_lat));
        push_value(&mut out, lng.wrapping_sub(prev_lng));
        prev_lat = lat;
        prev_lng = lng;

        if is_3d {
            let ele = point.elevation.filter(|ele| ele.is_finite()).unwrap_or(0.0);
            let ele = (ele * ELEVATION_FACTOR).round() as i64;
            push_value(&mut out, ele.wrapping_sub(prev_ele));
            prev_ele = ele;
        }
    }

    out
}

/// Read one zig-zag encoded value, advancing `index`.
///
/// Returns `None` if the input ends before a group without the
/// continuation bit.
fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;
        let chunk = i64::from(byte) - 63;
        if shift < 64 {
            result |= (chunk & 0x1f) << shift;
        }
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn push_value(out: &mut String, value: i64) {
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    while zigzag >= 0x20 {
        out.push(char::from((0x20 | (zigzag & 0x1f)) as u8 + 63));
        zigzag >>= 5;
    }
    out.push(char::from(zigzag as u8 + 63));
}
