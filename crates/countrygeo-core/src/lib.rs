//! countrygeo Core - Domain models, configuration, and the geocoder port
//!
//! This crate contains the country geodata model shared by the reconciler,
//! the table store and the CLI, along with the port that geocoding adapters
//! implement.

pub mod config;
pub mod error;
pub mod extent;
pub mod models;
pub mod ports;

pub use error::{CountryGeoError, Result};
