//! Configuration types for punk-records
//!
//! A [`Config`] is built once at startup (defaults, then an optional TOML file,
//! then command-line overrides) and passed by reference to every component.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Language the extraction tool fetches data for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English site (default)
    #[default]
    #[serde(alias = "en")]
    English,
    /// Japanese site
    #[serde(alias = "jp")]
    Japanese,
}

impl Language {
    /// Value passed to the tool's `--language` flag
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Japanese => "japanese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "japanese" | "jp" => Ok(Language::Japanese),
            other => Err(Error::Config {
                message: format!("unknown language '{other}' (expected english or japanese)"),
                key: Some("language".to_string()),
            }),
        }
    }
}

/// Extraction tool settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Path to the vegapull executable (default: "target/release/vegapull")
    #[serde(default = "default_vegapull_path")]
    pub vegapull_path: PathBuf,

    /// Arguments placed before the tool's own arguments
    ///
    /// Useful when the tool runs through a wrapper, e.g. a program of `cargo`
    /// with `["run", "--release", "--"]`.
    #[serde(default)]
    pub launcher_args: Vec<String>,

    /// Look the tool up in PATH when the configured path does not exist (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Number of `-v` flags passed to the images subcommand (default: 2)
    #[serde(default = "default_image_verbosity")]
    pub image_verbosity: u8,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            vegapull_path: default_vegapull_path(),
            launcher_args: Vec::new(),
            search_path: true,
            image_verbosity: default_image_verbosity(),
        }
    }
}

/// How image archives are created and expanded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveBackend {
    /// In-process zip library (default)
    #[default]
    Native,
    /// External `zip` / `unzip` binaries
    Cli,
}

impl FromStr for ArchiveBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(ArchiveBackend::Native),
            "cli" => Ok(ArchiveBackend::Cli),
            other => Err(Error::Config {
                message: format!("unknown archive backend '{other}' (expected native or cli)"),
                key: Some("archive.backend".to_string()),
            }),
        }
    }
}

/// Archive settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Which implementation handles archives
    #[serde(default)]
    pub backend: ArchiveBackend,

    /// Path to the zip executable (auto-detected if None, cli backend only)
    #[serde(default)]
    pub zip_path: Option<PathBuf>,

    /// Path to the unzip executable (auto-detected if None, cli backend only)
    #[serde(default)]
    pub unzip_path: Option<PathBuf>,
}

/// Main configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Language fetched by every tool invocation
    #[serde(default)]
    pub language: Language,

    /// Data root (default: "data/<language>")
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Maximum concurrent tasks per stage (None = one worker per task)
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Extraction tool settings
    #[serde(default)]
    pub tool: ToolConfig,

    /// Archive settings
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::fs("read config file", path, e))?;
        toml::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid config file {}: {}", path.display(), e),
            key: None,
        })
    }

    /// The directory holding every artifact of a run
    pub fn data_root(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| Path::new("data").join(self.language.as_str()))
    }

    /// Directory holding per-pack image directories and archives
    pub fn images_dir(&self) -> PathBuf {
        self.data_root().join(crate::stager::IMAGES_DIR)
    }

    /// Check settings that cannot be expressed in the type system
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == Some(0) {
            return Err(Error::Config {
                message: "max_concurrency must be at least 1".to_string(),
                key: Some("max_concurrency".to_string()),
            });
        }
        if self.tool.vegapull_path.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "vegapull_path must not be empty".to_string(),
                key: Some("tool.vegapull_path".to_string()),
            });
        }
        Ok(())
    }
}

fn default_vegapull_path() -> PathBuf {
    PathBuf::from("target/release/vegapull")
}

fn default_true() -> bool {
    true
}

fn default_image_verbosity() -> u8 {
    2
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_layout() {
        let config = Config::default();
        assert_eq!(config.language, Language::English);
        assert_eq!(config.data_root(), PathBuf::from("data/english"));
        assert_eq!(config.images_dir(), PathBuf::from("data/english/images"));
        assert_eq!(
            config.tool.vegapull_path,
            PathBuf::from("target/release/vegapull")
        );
        assert_eq!(config.tool.image_verbosity, 2);
        assert_eq!(config.archive.backend, ArchiveBackend::Native);
        assert!(config.max_concurrency.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config: Config = toml::from_str(
            r#"
            language = "jp"
            max_concurrency = 4

            [tool]
            vegapull_path = "/usr/local/bin/vegapull"
            launcher_args = ["--quiet"]

            [archive]
            backend = "cli"
            "#,
        )
        .unwrap();

        assert_eq!(config.language, Language::Japanese);
        assert_eq!(config.data_root(), PathBuf::from("data/japanese"));
        assert_eq!(config.max_concurrency, Some(4));
        assert_eq!(config.tool.launcher_args, vec!["--quiet".to_string()]);
        assert!(config.tool.search_path, "unset fields keep their defaults");
        assert_eq!(config.archive.backend, ArchiveBackend::Cli);
    }

    #[test]
    fn explicit_data_dir_wins_over_language_default() {
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/records")),
            ..Default::default()
        };
        assert_eq!(config.data_root(), PathBuf::from("/srv/records"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = Config {
            max_concurrency: Some(0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "max_concurrency"));
    }

    #[test]
    fn language_and_backend_parse_from_cli_strings() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!("japanese".parse::<Language>().unwrap(), Language::Japanese);
        assert!("french".parse::<Language>().is_err());
        assert_eq!("cli".parse::<ArchiveBackend>().unwrap(), ArchiveBackend::Cli);
        assert!("tar".parse::<ArchiveBackend>().is_err());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }
}
