//! Test fixtures for course-geometry.
//!
//! Provides realistic test data including:
//! - Busan running spots and Heidelberg streets (the openrouteservice demo graph)
//! - A scripted in-memory routing service

pub mod locations;
pub mod mock_service;

pub use locations::*;
pub use mock_service::*;
