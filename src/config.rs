//! Configuration file loading and parsing.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::parsers::{
    self,
    source_scanner::{MarkerSpec, default_markers},
};

pub const CONFIG_FILE_NAME: &str = ".potxrc.json";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Skip `vendor` and `3rdparty` directories while scanning.
    #[serde(default = "default_exclude_vendor_dirs")]
    pub exclude_vendor_dirs: bool,
    /// Path the extracted template is written to.
    #[serde(default = "default_output")]
    pub output: String,
    /// Parsers to run, in order.
    #[serde(default = "default_parsers")]
    pub parsers: Vec<String>,
    /// Marker calls recognized by the source-code parser.
    #[serde(default = "default_markers")]
    pub markers: Vec<MarkerSpec>,
}

fn default_exclude_vendor_dirs() -> bool {
    true
}

fn default_output() -> String {
    "messages.pot".to_string()
}

fn default_parsers() -> Vec<String> {
    parsers::all_parsers()
        .iter()
        .filter(|p| p.supports_directory())
        .map(|p| p.name().to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_vendor_dirs: default_exclude_vendor_dirs(),
            output: default_output(),
            parsers: default_parsers(),
            markers: default_markers(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if a parser name is unknown or a marker name is
    /// not a plain identifier.
    pub fn validate(&self) -> Result<()> {
        let known: Vec<&str> = parsers::all_parsers().iter().map(|p| p.name()).collect();
        for name in &self.parsers {
            if !known.contains(&name.as_str()) {
                anyhow::bail!(
                    "Unknown parser \"{}\" in 'parsers' (available: {})",
                    name,
                    known.join(", ")
                );
            }
        }
        for marker in &self.markers {
            let mut chars = marker.name.chars();
            let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                anyhow::bail!("Invalid marker name in 'markers': \"{}\"", marker.name);
            }
        }
        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::tempdir;

    use crate::config::*;
    use crate::parsers::source_scanner::MarkerShape;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.exclude_vendor_dirs);
        assert_eq!(config.output, "messages.pot");
        assert_eq!(config.parsers, vec!["php", "block-templates"]);
        assert_eq!(config.markers.len(), 3);
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "excludeVendorDirs": false,
              "output": "templates/messages.pot",
              "parsers": ["php"]
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(!config.exclude_vendor_dirs);
        assert_eq!(config.output, "templates/messages.pot");
        assert_eq!(config.parsers, vec!["php"]);
        assert_eq!(config.markers, default_markers());
    }

    #[test]
    fn test_parse_custom_markers() {
        let json = r#"{ "markers": [{ "name": "trans", "shape": "singular" }] }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.markers,
            vec![MarkerSpec::new("trans", MarkerShape::Singular)]
        );
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("blocks").join("foo");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert!(found.is_some());
        assert_eq!(found.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let found = find_config_file(dir.path());
        assert!(found.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&config_path, r#"{ "output": "all.pot" }"#).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.output, "all.pot");
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.output, "messages.pot");
    }

    #[test]
    fn test_validate_unknown_parser() {
        let config = Config {
            parsers: vec!["php".to_string(), "jsp".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("jsp"));
    }

    #[test]
    fn test_validate_invalid_marker_name() {
        let config = Config {
            markers: vec![MarkerSpec::new("2t", MarkerShape::Singular)],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            markers: vec![MarkerSpec::new("", MarkerShape::Singular)],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_unknown_parser_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "parsers": ["nope"] }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }
}
