//! Configuration structures for the conversion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the nfe pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfeConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Input discovery configuration.
    pub scan: ScanConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// How the prefix token is removed from `@Id` to build the access key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrip {
    /// Remove the token only when the identifier starts with it.
    #[default]
    Prefix,
    /// Remove every occurrence of the token.
    All,
}

/// Invoice field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Token prepended to the access key in `@Id`.
    pub key_prefix: String,

    /// Removal mode for `key_prefix`.
    pub key_strip: KeyStrip,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            key_prefix: "NFe".to_string(),
            key_strip: KeyStrip::Prefix,
        }
    }
}

impl ExtractionConfig {
    /// Derive the access key from a raw identifier.
    pub fn derive_key(&self, note_id: &str) -> String {
        if note_id.is_empty() || self.key_prefix.is_empty() {
            return note_id.to_string();
        }
        match self.key_strip {
            KeyStrip::Prefix => note_id
                .strip_prefix(self.key_prefix.as_str())
                .unwrap_or(note_id)
                .to_string(),
            KeyStrip::All => note_id.replace(self.key_prefix.as_str(), ""),
        }
    }
}

/// Input discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory scanned when no explicit files are given.
    pub input_dir: PathBuf,

    /// File extension to pick up (matched case-insensitively).
    pub extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("NFs"),
            extension: "xml".to_string(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination used when none is given on the command line.
    pub path: PathBuf,

    /// Worksheet name for spreadsheet output.
    pub sheet_name: String,

    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Invoices.xlsx"),
            sheet_name: "Invoices".to_string(),
            pretty_json: true,
        }
    }
}

impl NfeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_prefix_mode() {
        let config = ExtractionConfig::default();

        assert_eq!(config.derive_key("NFe35200112345"), "35200112345");
        assert_eq!(config.derive_key("NFe12NFe34"), "12NFe34");
        assert_eq!(config.derive_key("35200112345"), "35200112345");
        assert_eq!(config.derive_key(""), "");
    }

    #[test]
    fn test_derive_key_all_mode() {
        let config = ExtractionConfig {
            key_strip: KeyStrip::All,
            ..Default::default()
        };

        assert_eq!(config.derive_key("NFe35200112345"), "35200112345");
        assert_eq!(config.derive_key("NFe12NFe34"), "1234");
        assert_eq!(config.derive_key(""), "");
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extraction": {"key_strip": "all"}}"#).unwrap();

        let config = NfeConfig::from_file(&path).unwrap();
        assert_eq!(config.extraction.key_strip, KeyStrip::All);
        assert_eq!(config.extraction.key_prefix, "NFe");
        assert_eq!(config.scan.extension, "xml");
        assert_eq!(config.output.sheet_name, "Invoices");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = NfeConfig::default();
        config.output.sheet_name = "Notas".to_string();
        config.save(&path).unwrap();

        let loaded = NfeConfig::from_file(&path).unwrap();
        assert_eq!(loaded.output.sheet_name, "Notas");
    }
}
