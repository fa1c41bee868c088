//! course-geometry
//!
//! Route geometry and edit history for running-course creation: polyline
//! and GPX codecs, great-circle statistics, a route planner over an
//! openrouteservice-compatible API, and an undo/redo marker editor.

pub mod coordinate;
pub mod error;
pub mod traits;
pub mod polyline;
pub mod gpx;
pub mod haversine;
pub mod openroute;
pub mod planner;
pub mod history;

pub use coordinate::Coordinate;
pub use error::{GpxError, RouteError};
