//! GPX reading and writing.
//!
//! Parsing is lenient: it picks one point category (track points, else
//! route points, else waypoints), defaults missing values and skips points
//! sitting exactly at (0, 0). Only malformed XML is reported as an error.
//! Generation always produces a GPX 1.1 document with a single track segment.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::GpxError;
use crate::haversine::CourseSummary;

type Result<T> = std::result::Result<T, GpxError>;

/// Name used when a document carries no `<name>` element.
pub const DEFAULT_ROUTE_NAME: &str = "Unnamed Route";

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const GPX_SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";

/// A parsed GPX file reduced to its name and one ordered point list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpxDocument {
    pub name: String,
    pub points: Vec<Coordinate>,
}

impl GpxDocument {
    /// Distance, duration estimate and elevation extremes of the points.
    pub fn summary(&self, speed_kmh: f64) -> CourseSummary {
        CourseSummary::from_points(&self.points, speed_kmh)
    }
}

/// A point handed to [`generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpxPoint {
    pub lat: f64,
    pub lng: f64,
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

impl From<Coordinate> for GpxPoint {
    fn from(coord: Coordinate) -> Self {
        Self {
            lat: coord.lat,
            lng: coord.lng,
            elevation: coord.elevation,
            time: None,
        }
    }
}

impl From<&Coordinate> for GpxPoint {
    fn from(coord: &Coordinate) -> Self {
        Self::from(*coord)
    }
}

#[derive(Debug, Clone)]
pub struct GpxOptions {
    pub track_name: String,
    /// Omitted from the output when empty.
    pub description: String,
    pub creator: String,
}

impl Default for GpxOptions {
    fn default() -> Self {
        Self {
            track_name: "Running Course".to_string(),
            description: String::new(),
            creator: "Running Handai".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointKind {
    Track,
    Route,
    Waypoint,
}

impl PointKind {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"trkpt" => Some(PointKind::Track),
            b"rtept" => Some(PointKind::Route),
            b"wpt" => Some(PointKind::Waypoint),
            _ => None,
        }
    }
}

/// Values read from a point element's attributes.
#[derive(Debug, Default)]
struct PointAttributes {
    lat: f64,
    lng: f64,
    elevation: Option<f64>,
}

/// Parse GPX XML text.
///
/// The name is the text of the first top-level `<name>` element in document
/// order, or [`DEFAULT_ROUTE_NAME`]. Points come from `trkpt` if any exist,
/// else `rtept`, else `wpt`; categories are never merged.
pub fn parse(xml: &str) -> Result<GpxDocument> {
    let mut reader = Reader::from_str(xml);
    let mut name: Option<String> = None;
    let mut track = Vec::new();
    let mut route = Vec::new();
    let mut waypoints = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name();
                if local.as_ref() == b"name" {
                    let text = read_text_owned(&mut reader, &e)?;
                    if name.is_none() {
                        name = Some(text.trim().to_string());
                    }
                } else if let Some(kind) = PointKind::from_tag(local.as_ref()) {
                    let point = parse_point(&e, &mut reader)?;
                    push_point(kind, point, &mut track, &mut route, &mut waypoints);
                }
            }
            Event::Empty(e) => {
                if let Some(kind) = PointKind::from_tag(e.local_name().as_ref()) {
                    let point = point_from_attributes(read_attributes(&e), None);
                    push_point(kind, point, &mut track, &mut route, &mut waypoints);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let points = if !track.is_empty() {
        track
    } else if !route.is_empty() {
        route
    } else {
        waypoints
    };

    tracing::debug!(points = points.len(), "parsed GPX document");

    Ok(GpxDocument {
        name: name.unwrap_or_else(|| DEFAULT_ROUTE_NAME.to_string()),
        points,
    })
}

fn push_point(
    kind: PointKind,
    point: Coordinate,
    track: &mut Vec<Coordinate>,
    route: &mut Vec<Coordinate>,
    waypoints: &mut Vec<Coordinate>,
) {
    // (0, 0) stands for "no position"; a real fix there is dropped too.
    if point.lat == 0.0 && point.lng == 0.0 {
        tracing::trace!(?kind, "skipping point at (0, 0)");
        return;
    }
    match kind {
        PointKind::Track => track.push(point),
        PointKind::Route => route.push(point),
        PointKind::Waypoint => waypoints.push(point),
    }
}

fn read_attributes(start: &BytesStart<'_>) -> PointAttributes {
    let mut attrs = PointAttributes::default();
    for attr in start.attributes().flatten() {
        let value = std::str::from_utf8(&attr.value).unwrap_or_default().trim();
        match attr.key.local_name().as_ref() {
            b"lat" => attrs.lat = value.parse().unwrap_or(0.0),
            b"lon" | b"lng" => attrs.lng = value.parse().unwrap_or(0.0),
            b"elevation" | b"ele" => {
                if attrs.elevation.is_none() {
                    attrs.elevation = value.parse().ok();
                }
            }
            _ => {}
        }
    }
    attrs
}

fn point_from_attributes(attrs: PointAttributes, child_elevation: Option<f64>) -> Coordinate {
    Coordinate {
        lat: attrs.lat,
        lng: attrs.lng,
        elevation: child_elevation.or(attrs.elevation),
    }
}

/// Parse a point element and its children, consuming up to its end tag.
fn parse_point<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Coordinate> {
    let attrs = read_attributes(start);
    let mut child_elevation = None;
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"ele" {
                    let text = read_text_owned(reader, &e)?;
                    child_elevation = text.trim().parse::<f64>().ok();
                } else {
                    reader.read_to_end(e.name())?;
                }
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(point_from_attributes(attrs, child_elevation))
}

/// Text content of an element with entity and character references resolved.
fn read_text_owned(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default()),
            Event::CData(e) => text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default()),
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match e.as_ref() {
                        b"amp" => text.push('&'),
                        b"lt" => text.push('<'),
                        b"gt" => text.push('>'),
                        b"quot" => text.push('"'),
                        b"apos" => text.push('\''),
                        other => tracing::trace!(
                            entity = %String::from_utf8_lossy(other),
                            "dropping unknown entity"
                        ),
                    }
                }
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Generate GPX 1.1 text, stamping missing times relative to the current time.
pub fn generate(points: &[GpxPoint], options: &GpxOptions) -> Result<String> {
    generate_at(points, options, Utc::now())
}

/// Generate GPX 1.1 text with `now` as the base for missing point times.
///
/// Every `trkpt` gets an `ele` (0 when unknown) and a `time`; point `i`
/// without a time is stamped `now + i` seconds, so timestamps stay
/// strictly increasing.
pub fn generate_at(points: &[GpxPoint], options: &GpxOptions, now: DateTime<Utc>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("gpx");
    root.push_attribute(("version", "1.1"));
    root.push_attribute(("creator", options.creator.as_str()));
    root.push_attribute(("xmlns", GPX_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", GPX_SCHEMA_LOCATION));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_text_element(&mut writer, "name", &options.track_name)?;
    if !options.description.is_empty() {
        write_text_element(&mut writer, "desc", &options.description)?;
    }
    write_text_element(&mut writer, "time", &format_time(now))?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    writer.write_event(Event::Start(BytesStart::new("trk")))?;
    write_text_element(&mut writer, "name", &options.track_name)?;
    if !options.description.is_empty() {
        write_text_element(&mut writer, "desc", &options.description)?;
    }
    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;

    for (index, point) in points.iter().enumerate() {
        let lat = point.lat.to_string();
        let lon = point.lng.to_string();
        let mut trkpt = BytesStart::new("trkpt");
        trkpt.push_attribute(("lat", lat.as_str()));
        trkpt.push_attribute(("lon", lon.as_str()));
        writer.write_event(Event::Start(trkpt))?;

        write_text_element(&mut writer, "ele", &point.elevation.unwrap_or(0.0).to_string())?;
        let time = point
            .time
            .unwrap_or_else(|| now + TimeDelta::seconds(index as i64));
        write_text_element(&mut writer, "time", &format_time(time))?;

        writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
    writer.write_event(Event::End(BytesEnd::new("trk")))?;
    writer.write_event(Event::End(BytesEnd::new("gpx")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
