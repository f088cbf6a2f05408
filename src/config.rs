//! Settings persistence for the edit actions.
//!
//! We try to find an infobox.toml in the working directory and load settings from there,
//! falling back to defaults. The settings are a flat record, so saving writes it back by hand.

use facet::Facet;
use std::fs;
use std::io;
use std::path::Path;

/// File the settings are loaded from and saved to.
pub const CONFIG_FILE: &str = "infobox.toml";

#[derive(Facet, Clone, Debug, PartialEq)]
/// User preferences loaded from infobox.toml or falling back to defaults.
pub struct Config {
    #[facet(default = true)]
    /// Store new values as YAML strings instead of parsing them as YAML.
    pub escape_strings: bool,
    #[facet(default = vec!["Type".to_string(), "Stat".to_string()])]
    /// Header cells of the table skeleton inserted for new table groups.
    pub table_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escape_strings: true,
            table_columns: vec!["Type".to_string(), "Stat".to_string()],
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from infobox.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, using defaults if it is missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
            return config;
        }
        tracing::warn!(path = %path.display(), "ignoring invalid settings file");
        Self::default()
    }

    #[must_use]
    /// TOML text for these settings.
    pub fn to_toml(&self) -> String {
        let columns: Vec<String> = self
            .table_columns
            .iter()
            .map(|column| serde_json::Value::String(column.clone()).to_string())
            .collect();
        format!(
            "escape_strings = {}\ntable_columns = [{}]\n",
            self.escape_strings,
            columns.join(", ")
        )
    }

    /// Write these settings to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_toml())
    }

    #[must_use]
    /// Table skeleton lines (header row and delimiter row) for a new table group.
    pub fn table_skeleton(&self) -> [String; 2] {
        let header = self.table_columns.join(" | ");
        let delimiter = vec!["---"; self.table_columns.len()].join(" | ");
        [format!("> | {header} |"), format!("> | {delimiter} |")]
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
