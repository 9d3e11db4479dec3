use crate::error::{CountryGeoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default OpenCage forward-geocoding endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.opencagedata.com/geocode/v1/json";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// How the geodata table is laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    /// The whole file is the JSON table
    #[default]
    Json,
    /// The table is a block assigned to a variable inside a larger source file
    Embedded,
}

/// Layered configuration for countrygeo
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub api_key: ConfigValue<Option<String>>,
    pub endpoint: ConfigValue<String>,
    pub language: ConfigValue<String>,
    pub max_results: ConfigValue<u32>,
    pub request_interval_ms: ConfigValue<u64>,
    pub timeout_secs: ConfigValue<u64>,
    pub table_path: ConfigValue<PathBuf>,
    pub table_format: ConfigValue<TableFormat>,
    pub table_anchor: ConfigValue<String>,
    pub null_literal: ConfigValue<String>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            api_key: ConfigValue::new(None, ConfigSource::Default),
            endpoint: ConfigValue::new(DEFAULT_ENDPOINT.to_string(), ConfigSource::Default),
            language: ConfigValue::new("en".to_string(), ConfigSource::Default),
            max_results: ConfigValue::new(10, ConfigSource::Default),
            request_interval_ms: ConfigValue::new(1000, ConfigSource::Default),
            timeout_secs: ConfigValue::new(10, ConfigSource::Default),
            table_path: ConfigValue::new(PathBuf::from("countries_geo.json"), ConfigSource::Default),
            table_format: ConfigValue::new(TableFormat::Json, ConfigSource::Default),
            table_anchor: ConfigValue::new("COUNTRIES_GEO".to_string(), ConfigSource::Default),
            null_literal: ConfigValue::new("null".to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| CountryGeoError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| CountryGeoError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(api_key) = file_config.api_key {
            self.api_key.update(Some(api_key), ConfigSource::File);
        }

        if let Some(endpoint) = file_config.endpoint {
            self.endpoint.update(endpoint, ConfigSource::File);
        }

        if let Some(language) = file_config.language {
            self.language.update(language, ConfigSource::File);
        }

        if let Some(max_results) = file_config.max_results {
            self.max_results.update(validate_max_results(max_results)?, ConfigSource::File);
        }

        if let Some(interval) = file_config.request_interval_ms {
            self.request_interval_ms.update(interval, ConfigSource::File);
        }

        if let Some(timeout) = file_config.timeout_secs {
            self.timeout_secs.update(timeout, ConfigSource::File);
        }

        if let Some(table) = file_config.table {
            if let Some(path) = table.path {
                self.table_path.update(path, ConfigSource::File);
            }
            if let Some(format) = table.format {
                self.table_format.update(format, ConfigSource::File);
            }
            if let Some(anchor) = table.anchor {
                self.table_anchor.update(anchor, ConfigSource::File);
            }
            if let Some(null_literal) = table.null_literal {
                self.null_literal.update(null_literal, ConfigSource::File);
            }
        }

        Ok(self)
    }

    /// Load configuration from a TOML file only when it exists
    pub fn load_from_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            self.load_from_file(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.as_ref().display());
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // COUNTRYGEO_API_KEY, falling back to the provider's conventional name
        if let Ok(key) = env::var("COUNTRYGEO_API_KEY").or_else(|_| env::var("OPENCAGE_API_KEY")) {
            if !key.trim().is_empty() {
                self.api_key.update(Some(key), ConfigSource::Environment);
            }
        }

        // COUNTRYGEO_ENDPOINT
        if let Ok(endpoint) = env::var("COUNTRYGEO_ENDPOINT") {
            self.endpoint.update(endpoint, ConfigSource::Environment);
        }

        // COUNTRYGEO_LANGUAGE
        if let Ok(language) = env::var("COUNTRYGEO_LANGUAGE") {
            self.language.update(language, ConfigSource::Environment);
        }

        // COUNTRYGEO_MAX_RESULTS
        if let Ok(raw) = env::var("COUNTRYGEO_MAX_RESULTS") {
            match raw.parse::<u32>().ok().filter(|n| validate_max_results(*n).is_ok()) {
                Some(n) => self.max_results.update(n, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid COUNTRYGEO_MAX_RESULTS value '{}': expected integer between 1 and 100",
                    raw
                ),
            }
        }

        // COUNTRYGEO_REQUEST_INTERVAL_MS
        if let Ok(raw) = env::var("COUNTRYGEO_REQUEST_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => self.request_interval_ms.update(ms, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid COUNTRYGEO_REQUEST_INTERVAL_MS value '{}': expected milliseconds",
                    raw
                ),
            }
        }

        // COUNTRYGEO_TIMEOUT_SECS
        if let Ok(raw) = env::var("COUNTRYGEO_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => self.timeout_secs.update(secs, ConfigSource::Environment),
                Err(_) => {
                    tracing::warn!("Invalid COUNTRYGEO_TIMEOUT_SECS value '{}': expected seconds", raw)
                }
            }
        }

        // COUNTRYGEO_TABLE
        if let Ok(path) = env::var("COUNTRYGEO_TABLE") {
            self.table_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // COUNTRYGEO_TABLE_FORMAT
        if let Ok(raw) = env::var("COUNTRYGEO_TABLE_FORMAT") {
            match parse_table_format(&raw) {
                Ok(format) => self.table_format.update(format, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid COUNTRYGEO_TABLE_FORMAT value '{}': expected json or embedded",
                    raw
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(api_key) = overrides.api_key {
            self.api_key.update(Some(api_key), ConfigSource::Cli);
        }

        if let Some(endpoint) = overrides.endpoint {
            self.endpoint.update(endpoint, ConfigSource::Cli);
        }

        if let Some(language) = overrides.language {
            self.language.update(language, ConfigSource::Cli);
        }

        if let Some(table_path) = overrides.table_path {
            self.table_path.update(table_path, ConfigSource::Cli);
        }

        if let Some(table_format) = overrides.table_format {
            self.table_format.update(table_format, ConfigSource::Cli);
        }
    }

    /// The API key, or an error naming the missing setting
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .value
            .as_deref()
            .ok_or_else(|| CountryGeoError::ConfigMissing { key: "api_key".to_string() })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        let masked_key = match &self.api_key.value {
            Some(key) => mask_secret(key),
            None => "(not set)".to_string(),
        };
        map.insert("api_key".to_string(), (masked_key, self.api_key.source));

        map.insert("endpoint".to_string(), (self.endpoint.value.clone(), self.endpoint.source));
        map.insert("language".to_string(), (self.language.value.clone(), self.language.source));
        map.insert(
            "max_results".to_string(),
            (self.max_results.value.to_string(), self.max_results.source),
        );
        map.insert(
            "request_interval_ms".to_string(),
            (self.request_interval_ms.value.to_string(), self.request_interval_ms.source),
        );
        map.insert(
            "timeout_secs".to_string(),
            (self.timeout_secs.value.to_string(), self.timeout_secs.source),
        );
        map.insert(
            "table.path".to_string(),
            (self.table_path.value.display().to_string(), self.table_path.source),
        );
        map.insert(
            "table.format".to_string(),
            (format!("{:?}", self.table_format.value), self.table_format.source),
        );
        map.insert(
            "table.anchor".to_string(),
            (self.table_anchor.value.clone(), self.table_anchor.source),
        );
        map.insert(
            "table.null_literal".to_string(),
            (self.null_literal.value.clone(), self.null_literal.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    api_key: Option<String>,
    endpoint: Option<String>,
    language: Option<String>,
    max_results: Option<u32>,
    request_interval_ms: Option<u64>,
    timeout_secs: Option<u64>,
    table: Option<TableSection>,
}

/// `[table]` section of the config file
#[derive(Debug, Deserialize, Serialize)]
struct TableSection {
    path: Option<PathBuf>,
    format: Option<TableFormat>,
    anchor: Option<String>,
    null_literal: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub language: Option<String>,
    pub table_path: Option<PathBuf>,
    pub table_format: Option<TableFormat>,
}

/// Parse table format from string
pub fn parse_table_format(s: &str) -> Result<TableFormat> {
    match s.to_lowercase().as_str() {
        "json" => Ok(TableFormat::Json),
        "embedded" | "python" => Ok(TableFormat::Embedded),
        _ => Err(CountryGeoError::ConfigInvalid {
            key: "table.format".to_string(),
            reason: format!("Invalid table format: {}. Use json or embedded", s),
        }),
    }
}

fn validate_max_results(n: u32) -> Result<u32> {
    if (1..=100).contains(&n) {
        Ok(n)
    } else {
        Err(CountryGeoError::ConfigInvalid {
            key: "max_results".to_string(),
            reason: format!("{} is out of range, use 1 to 100", n),
        })
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.endpoint.value, DEFAULT_ENDPOINT);
        assert_eq!(config.endpoint.source, ConfigSource::Default);
        assert_eq!(config.max_results.value, 10);
        assert_eq!(config.table_format.value, TableFormat::Json);
        assert!(config.api_key.value.is_none());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_key = "abcd1234"
language = "eo"
max_results = 15

[table]
path = "maps/data.py"
format = "embedded"
null_literal = "None"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.api_key.value.as_deref(), Some("abcd1234"));
        assert_eq!(config.api_key.source, ConfigSource::File);
        assert_eq!(config.language.value, "eo");
        assert_eq!(config.max_results.value, 15);
        assert_eq!(config.table_path.value, PathBuf::from("maps/data.py"));
        assert_eq!(config.table_format.value, TableFormat::Embedded);
        assert_eq!(config.null_literal.value, "None");
        // Untouched values stay at their defaults
        assert_eq!(config.table_anchor.value, "COUNTRIES_GEO");
        assert_eq!(config.table_anchor.source, ConfigSource::Default);
    }

    #[test]
    fn test_file_rejects_out_of_range_max_results() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_results = 0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(CountryGeoError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            api_key: Some("from-cli".to_string()),
            table_path: Some(PathBuf::from("/tmp/geo.json")),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.api_key.value.as_deref(), Some("from-cli"));
        assert_eq!(config.api_key.source, ConfigSource::Cli);
        assert_eq!(config.table_path.source, ConfigSource::Cli);
        assert_eq!(config.language.source, ConfigSource::Default);
    }

    #[test]
    fn test_require_api_key() {
        let config = LayeredConfig::with_defaults();
        assert!(matches!(
            config.require_api_key(),
            Err(CountryGeoError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn test_parse_table_format() {
        assert_eq!(parse_table_format("json").unwrap(), TableFormat::Json);
        assert_eq!(parse_table_format("EMBEDDED").unwrap(), TableFormat::Embedded);
        assert!(parse_table_format("yaml").is_err());
    }

    #[test]
    fn test_inspection_map_masks_key() {
        let mut config = LayeredConfig::with_defaults();
        config.api_key.update(Some("a27f7e361bdf".to_string()), ConfigSource::Cli);
        let map = config.to_inspection_map();

        let (key, source) = &map["api_key"];
        assert_eq!(key, "a27f…");
        assert_eq!(*source, ConfigSource::Cli);
        assert!(map.contains_key("table.path"));
        assert!(map.contains_key("endpoint"));
    }
}
