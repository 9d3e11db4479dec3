//! countrygeo OpenCage - Geocoding adapter
//!
//! This crate implements the `Geocoder` port against the OpenCage
//! forward-geocoding API.

pub mod client;
pub mod response;

// Re-export main types
pub use client::OpenCageGeocoder;
pub use response::{into_result_set, OpenCageResponse};
