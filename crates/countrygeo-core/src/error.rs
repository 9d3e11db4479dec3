//! Error types for countrygeo

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CountryGeoError {
    // Country errors
    #[error("Invalid country code '{code}': expected two ASCII letters")]
    InvalidCountryCode { code: String },

    #[error("Unknown country code: {code}")]
    UnknownCountry { code: String },

    // Table errors
    #[error("Geodata table not found at {path}")]
    TableNotFound { path: PathBuf },

    #[error("Table block '{anchor}' not found in {path}")]
    TableAnchorMissing { anchor: String, path: PathBuf },

    // Geocoder errors
    #[error("Geocoder unavailable: {reason}. Try: {remediation}")]
    GeocoderUnavailable {
        reason: String,
        remediation: String,
    },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CountryGeoError {
    fn from(e: serde_json::Error) -> Self {
        CountryGeoError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CountryGeoError>;
