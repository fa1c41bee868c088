//! Full pipeline: GPX in, statistics, editing, planning and GPX out.

mod fixtures;

use course_geometry::gpx::{self, GpxOptions, GpxPoint};
use course_geometry::haversine::{
    elevation_stats, haversine_distance, total_distance, CourseSummary, ElevationStats,
    DEFAULT_RUNNING_SPEED_KMH,
};
use course_geometry::history::{CourseEditor, MarkerEdit};
use course_geometry::planner::{CancellationToken, RoutePlanner};
use course_geometry::traits::Profile;
use course_geometry::Coordinate;

use fixtures::{MockRoutingService, BUSAN};

const THREE_POINT_TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="fixture" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Suyeong River Run</name></metadata>
  <trk>
    <trkseg>
      <trkpt lat="35.10" lon="129.00"><ele>10</ele></trkpt>
      <trkpt lat="35.11" lon="129.01"><ele>15</ele></trkpt>
      <trkpt lat="35.12" lon="129.02"><ele>5</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

#[test]
fn three_point_track_statistics() {
    let doc = gpx::parse(THREE_POINT_TRACK).unwrap();

    assert_eq!(doc.name, "Suyeong River Run");
    assert_eq!(doc.points.len(), 3);
    assert_eq!(
        elevation_stats(&doc.points),
        ElevationStats {
            max_altitude: 15,
            min_altitude: 5
        }
    );

    let expected = haversine_distance(&doc.points[0], &doc.points[1])
        + haversine_distance(&doc.points[1], &doc.points[2]);
    let total = total_distance(&doc.points);
    assert!((total - expected).abs() <= expected * 0.05);
    // Two segments of roughly 1.44 km each.
    assert!(total > 2_700.0 && total < 3_000.0, "got {}", total);
}

#[test]
fn generated_gpx_reproduces_points() {
    let doc = gpx::parse(THREE_POINT_TRACK).unwrap();
    let points: Vec<GpxPoint> = doc.points.iter().map(GpxPoint::from).collect();

    let xml = gpx::generate(
        &points,
        &GpxOptions {
            track_name: doc.name.clone(),
            ..GpxOptions::default()
        },
    )
    .unwrap();
    let reparsed = gpx::parse(&xml).unwrap();

    assert_eq!(reparsed.name, doc.name);
    assert_eq!(reparsed.points, doc.points);
}

#[test]
fn points_without_elevation_export_as_zero() {
    let points = vec![
        GpxPoint::from(Coordinate::new(35.1, 129.0)),
        GpxPoint::from(Coordinate::new(35.2, 129.1)),
    ];
    let xml = gpx::generate(&points, &GpxOptions::default()).unwrap();
    let reparsed = gpx::parse(&xml).unwrap();

    assert!(reparsed.points.iter().all(|point| point.elevation == Some(0.0)));
    assert_eq!(
        elevation_stats(&reparsed.points),
        ElevationStats::default()
    );
}

#[test]
fn edit_plan_and_export_a_course() {
    let mut editor = CourseEditor::new();
    for location in &BUSAN[..3] {
        editor.apply(MarkerEdit::Add(location.coordinate()));
    }
    editor.apply(MarkerEdit::Swap);
    editor.undo();
    assert_eq!(editor.markers()[0], BUSAN[0].coordinate());

    let planner = RoutePlanner::new(MockRoutingService::new());
    let route = planner
        .plan_from_coordinates(editor.waypoints(), Profile::FootWalking, &CancellationToken::new())
        .unwrap();
    editor.set_route_generated(true);
    assert!(!editor.undo());

    let summary = CourseSummary::from_points(&route.coordinates, DEFAULT_RUNNING_SPEED_KMH);
    assert_eq!(summary.elevation.max_altitude, 20);
    assert!(summary.estimated_minutes.unwrap() > 0);

    let points: Vec<GpxPoint> = route.coordinates.iter().map(GpxPoint::from).collect();
    let xml = gpx::generate(&points, &GpxOptions::default()).unwrap();
    let exported = gpx::parse(&xml).unwrap();
    assert_eq!(exported.points, route.coordinates);

    editor.clear();
    assert!(editor.waypoints().is_empty());
}

#[test]
fn uploaded_gpx_becomes_the_course() {
    let doc = gpx::parse(THREE_POINT_TRACK).unwrap();
    let mut editor = CourseEditor::new();
    editor.apply(MarkerEdit::Add(BUSAN[0].coordinate()));

    editor.apply(MarkerEdit::BulkReplace(doc.points.clone()));

    assert!(editor.markers().is_empty());
    assert_eq!(editor.waypoints(), doc.points.as_slice());
    let summary = doc.summary(DEFAULT_RUNNING_SPEED_KMH);
    assert_eq!(summary.elevation.min_altitude, 5);
}
