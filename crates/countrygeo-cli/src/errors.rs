use console::style;
use countrygeo_core::error::CountryGeoError;
use countrygeo_reconcile::ReconcileError;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }

    /// Machine-readable form for `--json`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "error",
            "message": self.message,
            "context": self.context,
            "suggestions": self.suggestions,
        })
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing OpenCage API key
pub fn missing_api_key() -> CliError {
    CliError::new("OpenCage API key not configured")
        .with_context("Updating geodata queries the OpenCage geocoding API, which needs a key.")
        .with_suggestion("Set it in the environment: export OPENCAGE_API_KEY=\"...\"")
        .with_suggestion("Or add to countrygeo.toml:\n  api_key = \"...\"")
        .with_suggestion("Or pass it once: countrygeo update --api-key ...")
        .with_help("Run: countrygeo doctor")
}

/// Create error for a missing table file
pub fn table_not_found(path: &Path) -> CliError {
    CliError::new("Geodata table not found")
        .with_context(format!(
            "An embedded table must live inside an existing file.\n\nPath: {}",
            path.display()
        ))
        .with_suggestion("Check the path given with --table or table.path")
        .with_suggestion("Or use a standalone JSON table: --table-format json")
        .with_help("Run: countrygeo config")
}

/// Create error for a host file without the table block
pub fn anchor_missing(anchor: &str, path: &Path) -> CliError {
    CliError::new(format!("Table block '{}' not found", anchor))
        .with_context(format!(
            "Expected a line starting with `{} = {{` and a closing `}}` on its own line.\n\nFile: {}",
            anchor,
            path.display()
        ))
        .with_suggestion("Add an empty block to the file:\n  COUNTRIES_GEO = {\n  }")
        .with_suggestion("Or set table.anchor in countrygeo.toml to the right variable name")
        .with_help("Run: countrygeo config")
}

/// Create error for an unknown country code
pub fn unknown_country(code: &str) -> CliError {
    CliError::new(format!("Unknown country code: {}", code))
        .with_context("Country codes are ISO 3166-1 alpha-2 codes, e.g. FR or NL.")
        .with_suggestion("List the stored countries: countrygeo show")
        .with_suggestion("Use ALL to update every country")
        .with_help("Run: countrygeo update --help")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check countrygeo.toml for syntax errors")
        .with_suggestion("Or check the COUNTRYGEO_* environment variables")
        .with_help("Run: countrygeo config")
}

/// Create error for a broken override table
pub fn misconfiguration(error: &ReconcileError) -> CliError {
    CliError::new("Override configuration is incomplete")
        .with_context(format!("{}\n\nNo country was queried and the table was not written.", error))
        .with_suggestion("Fix the override entry so that it sets every bounding box component")
        .with_help("Run: countrygeo doctor")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(cli) = error.downcast_ref::<CliError>() {
        return CliError {
            message: cli.message.clone(),
            context: cli.context.clone(),
            suggestions: cli.suggestions.clone(),
            help_command: cli.help_command.clone(),
        };
    }

    if let Some(core) = error.downcast_ref::<CountryGeoError>() {
        return match core {
            CountryGeoError::ConfigMissing { key } if key == "api_key" => missing_api_key(),
            CountryGeoError::ConfigInvalid { key, reason } => invalid_config(key, reason),
            CountryGeoError::TableNotFound { path } => table_not_found(path),
            CountryGeoError::TableAnchorMissing { anchor, path } => anchor_missing(anchor, path),
            CountryGeoError::UnknownCountry { code } | CountryGeoError::InvalidCountryCode { code } => {
                unknown_country(code)
            }
            other => CliError::new(other.to_string()),
        };
    }

    if let Some(reconcile) = error.downcast_ref::<ReconcileError>() {
        return match reconcile {
            ReconcileError::Misconfiguration { .. } => misconfiguration(reconcile),
            other => CliError::new(other.to_string()),
        };
    }

    let message = format!("{:#}", error);
    if message.contains("permission denied") || message.contains("Permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}
