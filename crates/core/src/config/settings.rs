use crate::{
    emit::DEFAULT_RUNTIME_PATH,
    error::{Error, Result},
    output::package_segments,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`Config::find_config_file`]
pub const CONFIG_FILE_NAME: &str = "proxygen.json";

/// Names of the discovery attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct MarkerConfig {
    /// Attribute placed on dispatch functions: `#[proxy_for(Trait)]`
    pub dispatch_function: String,
    /// Attribute placed on traits: `#[with_proxy(Handler)]`
    pub handler_interface: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            dispatch_function: "proxy_for".to_string(),
            handler_interface: "with_proxy".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Path generated code uses to reach `proxygen-runtime`
    pub runtime_path: String,
    /// Dotted or `::`-separated directory of the output file below the
    /// output root; empty for the root itself
    pub package: String,
    /// Output file name without the `.rs` extension
    pub file_name: String,
    pub markers: MarkerConfig,
    /// Directories scanned when none are given explicitly
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            package: String::new(),
            file_name: "generated_proxies".to_string(),
            markers: MarkerConfig::default(),
            source_dirs: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Walk up from `start_path` looking for `proxygen.json`
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            current = current.parent()?;
        }
    }

    /// Reject values that would produce uncompilable output
    pub fn validate(&self) -> Result<()> {
        if !is_path(&self.runtime_path) {
            return Err(Error::ConfigError(format!(
                "runtime_path `{}` is not a Rust path",
                self.runtime_path
            )));
        }
        if !is_identifier(&self.file_name) {
            return Err(Error::ConfigError(format!(
                "file_name `{}` must be a plain identifier",
                self.file_name
            )));
        }
        for marker in [&self.markers.dispatch_function, &self.markers.handler_interface] {
            if !is_identifier(marker) {
                return Err(Error::ConfigError(format!(
                    "marker `{marker}` must be a plain identifier"
                )));
            }
        }
        if self.markers.dispatch_function == self.markers.handler_interface {
            return Err(Error::ConfigError(
                "dispatch_function and handler_interface markers must differ".to_string(),
            ));
        }
        if !self.package.is_empty() && self.package_segments().iter().any(|s| !is_identifier(s)) {
            return Err(Error::ConfigError(format!(
                "package `{}` must be a dotted list of identifiers",
                self.package
            )));
        }
        Ok(())
    }

    /// `package` split on `.` or `::`
    pub fn package_segments(&self) -> Vec<&str> {
        package_segments(&self.package)
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn is_path(text: &str) -> bool {
    let text = text.strip_prefix("::").unwrap_or(text);
    !text.is_empty() && text.split("::").all(is_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.runtime_path, "proxygen_runtime");
        assert_eq!(config.file_name, "generated_proxies");
        assert_eq!(config.markers.dispatch_function, "proxy_for");
        assert_eq!(config.markers.handler_interface, "with_proxy");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let json = r#"{ "package": "gen.proxies", "markers": { "dispatch_function": "forward_to" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.package_segments(), vec!["gen", "proxies"]);
        assert_eq!(config.markers.dispatch_function, "forward_to");
        assert_eq!(config.markers.handler_interface, "with_proxy");
        assert_eq!(config.runtime_path, "proxygen_runtime");
    }

    #[test]
    fn test_save_load_and_find() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config {
            runtime_path: "::my_runtime".to_string(),
            ..Config::default()
        };
        let path = temp.path().join(CONFIG_FILE_NAME);
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::find_config_file(&nested), Some(path.clone()));
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            Config {
                runtime_path: "not a path".to_string(),
                ..Config::default()
            },
            Config {
                file_name: "out.rs".to_string(),
                ..Config::default()
            },
            Config {
                markers: MarkerConfig {
                    dispatch_function: "same".to_string(),
                    handler_interface: "same".to_string(),
                },
                ..Config::default()
            },
            Config {
                package: "gen.1st".to_string(),
                ..Config::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::ConfigError(_))),
                "{config:?}"
            );
        }
    }
}
