use countrygeo_core::config::{LayeredConfig, TableFormat};
use countrygeo_core::error::{CountryGeoError, Result};
use countrygeo_core::models::GeoTable;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How the table is laid out inside its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLayout {
    /// The whole file is the JSON table
    Json,
    /// `{anchor} = {...}` block inside a larger file, with a language-specific null literal
    Embedded {
        anchor: String,
        null_literal: String,
    },
}

impl TableLayout {
    pub fn from_config(config: &LayeredConfig) -> Self {
        match config.table_format.value {
            TableFormat::Json => TableLayout::Json,
            TableFormat::Embedded => TableLayout::Embedded {
                anchor: config.table_anchor.value.clone(),
                null_literal: config.null_literal.value.clone(),
            },
        }
    }
}

/// A loaded table file, remembering the text around the table block
#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
    layout: TableLayout,
    prefix: String,
    suffix: String,
}

impl TableFile {
    /// Read the table from disk
    ///
    /// A missing standalone JSON file yields an empty table. An embedded table
    /// needs its host file and anchor to exist.
    pub fn load(path: impl Into<PathBuf>, layout: TableLayout) -> Result<(Self, GeoTable)> {
        let path = path.into();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if layout != TableLayout::Json {
                    return Err(CountryGeoError::TableNotFound { path });
                }
                tracing::info!(path = %path.display(), "No table file yet, starting empty");
                let file = Self { path, layout, prefix: String::new(), suffix: String::new() };
                return Ok((file, GeoTable::new()));
            }
            Err(e) => return Err(e.into()),
        };

        let (prefix, block, suffix) = match &layout {
            TableLayout::Json => (String::new(), contents, String::new()),
            TableLayout::Embedded { anchor, null_literal } => {
                let (prefix, block, suffix) = split_embedded(&contents, anchor)
                    .ok_or_else(|| CountryGeoError::TableAnchorMissing {
                        anchor: anchor.clone(),
                        path: path.clone(),
                    })?;
                (prefix, swap_literal(&block, null_literal, "null")?, suffix)
            }
        };

        let table = if block.trim().is_empty() {
            GeoTable::new()
        } else {
            serde_json::from_str(&block).map_err(|e| {
                CountryGeoError::Serialization(format!("{}: {}", path.display(), e))
            })?
        };
        tracing::debug!(path = %path.display(), countries = table.len(), "Loaded geodata table");

        Ok((Self { path, layout, prefix, suffix }, table))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Full file contents for the given table
    pub fn render(&self, table: &GeoTable) -> Result<String> {
        let json = to_json_4(table)?;
        let block = match &self.layout {
            TableLayout::Json => format!("{}\n", json),
            // Keep the block delimited by lines so the next load finds it
            TableLayout::Embedded { .. } if table.is_empty() => "{\n}".to_string(),
            TableLayout::Embedded { null_literal, .. } => swap_literal(&json, "null", null_literal)?,
        };
        Ok(format!("{}{}{}", self.prefix, block, self.suffix))
    }

    /// Write the table, replacing the file atomically
    pub fn save(&self, table: &GeoTable) -> Result<()> {
        let contents = self.render(table)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CountryGeoError::Io(e.error))?;

        tracing::info!(path = %self.path.display(), countries = table.len(), "Saved geodata table");
        Ok(())
    }
}

/// Split `contents` into the text up to and including `{anchor} = `, the
/// `{ ... }` block closed by the first `}` at the start of a line, and the rest.
fn split_embedded(contents: &str, anchor: &str) -> Option<(String, String, String)> {
    let pattern = format!(r"(?s)^(.*\n{} = )(\{{\n.*?\n\}})(.*)$", regex::escape(anchor));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(contents)?;
    Some((caps[1].to_string(), caps[2].to_string(), caps[3].to_string()))
}

fn swap_literal(text: &str, from: &str, to: &str) -> Result<String> {
    if from == to {
        return Ok(text.to_string());
    }
    let re = Regex::new(&format!(r"\b{}\b", regex::escape(from))).map_err(|e| {
        CountryGeoError::ConfigInvalid { key: "null_literal".to_string(), reason: e.to_string() }
    })?;
    Ok(re.replace_all(text, to).into_owned())
}

/// Pretty JSON with 4-space indentation
fn to_json_4(table: &GeoTable) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    table.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| CountryGeoError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use countrygeo_core::models::{BoundingBox, CountryCode, CountryGeoRecord, LonLat};

    const HOST: &str = "import os\n\nCOUNTRIES_GEO = {\n    \"AD\": {\n        \"bbox\": {\n            \"northeast\": [\n                1.7,\n                42.6\n            ],\n            \"southwest\": [\n                None,\n                None\n            ]\n        },\n        \"center\": [\n            1.6,\n            42.5\n        ]\n    }\n}\n\nOTHER = {\n}\n";

    #[test]
    fn test_split_embedded() {
        let (prefix, block, suffix) = split_embedded(HOST, "COUNTRIES_GEO").unwrap();
        assert_eq!(prefix, "import os\n\nCOUNTRIES_GEO = ");
        assert!(block.starts_with("{\n    \"AD\""));
        assert!(block.ends_with("\n}"));
        assert_eq!(suffix, "\n\nOTHER = {\n}\n");
    }

    #[test]
    fn test_split_requires_anchor_on_own_line() {
        assert!(split_embedded("X_COUNTRIES_GEO = {\n}\n", "COUNTRIES_GEO").is_none());
        assert!(split_embedded(HOST, "MISSING").is_none());
    }

    #[test]
    fn test_swap_literal_whole_words_only() {
        let text = "[None, Nonesuch, \"None\"]";
        assert_eq!(swap_literal(text, "None", "null").unwrap(), "[null, Nonesuch, \"null\"]");
    }

    #[test]
    fn test_json_uses_four_spaces() {
        let mut table = GeoTable::new();
        table.insert(
            CountryCode::from_static("AD"),
            CountryGeoRecord::new(
                BoundingBox::new(LonLat::new(1.5, 42.5), LonLat::UNKNOWN),
                LonLat::new(1.5, 42.5),
            ),
        );
        let json = to_json_4(&table).unwrap();
        assert!(json.starts_with("{\n    \"AD\": {\n        \"bbox\""));
        assert!(json.contains("                null,\n"));
    }
}
