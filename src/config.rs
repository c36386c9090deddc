//! Configuration file support
//!
//! Run settings come from built-in defaults, an optional `.netviz.toml`,
//! and command-line flags, in increasing order of precedence. The visual
//! and physics settings of the rendered page are fixed and not read from
//! the file.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .netviz.toml
//!
//! [input]
//! # Connections export to read
//! path = "Connections.csv"
//!
//! # Lines of notes before the column header row
//! skip_rows = 2
//!
//! [output]
//! # Where the HTML page is written
//! path = "linkedin_network.html"
//!
//! # Open the page in the default browser once written
//! open_browser = false
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names searched for, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = [".netviz.toml", "netviz.toml"];

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file")]
    ParseError(#[from] toml::de::Error),
}

/// Input section
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Connections export to read
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// Lines to skip before the column header row
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("Connections.csv")
}

fn default_skip_rows() -> usize {
    2
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            skip_rows: default_skip_rows(),
        }
    }
}

/// Output section
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// HTML file to write
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Open the written page in the default browser
    #[serde(default)]
    pub open_browser: bool,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("linkedin_network.html")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            open_browser: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NetvizConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Load configuration by searching from `start_path` upwards.
///
/// Returns the defaults when no config file is found.
pub fn load_config(start_path: &Path) -> Result<NetvizConfig, ConfigError> {
    match find_config_file(start_path) {
        Some(path) => load_config_file(&path),
        None => Ok(NetvizConfig::default()),
    }
}

/// Load configuration from an explicit file
pub fn load_config_file(path: &Path) -> Result<NetvizConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: NetvizConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Find the config file by searching up the directory tree
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetvizConfig::default();
        assert_eq!(config.input.path, PathBuf::from("Connections.csv"));
        assert_eq!(config.input.skip_rows, 2);
        assert_eq!(config.output.path, PathBuf::from("linkedin_network.html"));
        assert!(!config.output.open_browser);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [input]
            path = "exports/contacts.csv"
            skip_rows = 3

            [output]
            open_browser = true
        "#;

        let config: NetvizConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.input.path, PathBuf::from("exports/contacts.csv"));
        assert_eq!(config.input.skip_rows, 3);
        // Unset keys keep their defaults
        assert_eq!(config.output.path, PathBuf::from("linkedin_network.html"));
        assert!(config.output.open_browser);
    }

    #[test]
    fn test_parse_error() {
        let err = toml::from_str::<NetvizConfig>("[input]\nskip_rows = \"two\"").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(".netviz.toml"), "[input]\nskip_rows = 0\n").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(".netviz.toml"));

        let config = load_config(&nested).unwrap();
        assert_eq!(config.input.skip_rows, 0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config_file(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
