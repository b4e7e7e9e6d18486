use crate::error::{Result, RfsubError};
use crate::walker::DEFAULT_MAX_DEPTH;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".rfsub.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub walk: WalkConfig,
    pub filter: FilterConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub max_depth: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub filetypes: Vec<String>,
    pub globs: Vec<String>,
    pub skip_binary: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: ColorChoice,
}

#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorChoice::Auto => write!(f, "auto"),
            ColorChoice::Always => write!(f, "always"),
            ColorChoice::Never => write!(f, "never"),
        }
    }
}

impl Config {
    /// Loads `explicit` if given, otherwise the first config file found in the
    /// usual locations, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_path(),
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RfsubError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| RfsubError::Config(format!("{} ({})", e, path.display())))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("rfsub/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(CONFIG_FILE_NAME);
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(CONFIG_FILE_NAME);
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.walk.max_depth, 128);
        assert!(config.filter.filetypes.is_empty());
        assert!(!config.filter.skip_binary);
        assert_eq!(config.display.color, ColorChoice::Auto);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("[filter]\nfiletypes = [\".rs\", \".toml\"]\n").unwrap();
        assert_eq!(config.filter.filetypes, vec![".rs", ".toml"]);
        assert_eq!(config.walk.max_depth, 128);
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            r#"
            [walk]
            max_depth = 16

            [filter]
            globs = ["**/src/**"]
            skip_binary = true

            [display]
            color = "never"
            "#,
        )
        .unwrap();
        assert_eq!(config.walk.max_depth, 16);
        assert_eq!(config.filter.globs, vec!["**/src/**"]);
        assert!(config.filter.skip_binary);
        assert_eq!(config.display.color, ColorChoice::Never);
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[walk]\nmax_depth = 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.walk.max_depth, 3);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let err = Config::load(Some(&temp_dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, RfsubError::Config(_)));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(Config::parse("[walk]\nmax_depth = \"deep\"\n").is_err());
    }
}
