//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod geocoder;
pub mod scripted;

pub use geocoder::Geocoder;
pub use scripted::{GeocodeCall, ScriptedGeocoder};
