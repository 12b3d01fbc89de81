//! The vegapull extraction tool, consumed through its command-line contract

use crate::config::{Config, Language};
use crate::error::{Error, Result};
use crate::process::ProcessRunner;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Invokes the extraction tool's `packs`, `cards` and `images` subcommands
///
/// Every invocation uses the same binary and language.
#[derive(Clone, Debug)]
pub struct ExtractionTool {
    program: PathBuf,
    launcher_args: Vec<String>,
    language: Language,
    image_verbosity: u8,
    runner: ProcessRunner,
}

impl ExtractionTool {
    /// Create a tool wrapper with an explicit binary path
    pub fn new(program: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            program: program.into(),
            launcher_args: Vec::new(),
            language,
            image_verbosity: 2,
            runner: ProcessRunner::new(),
        }
    }

    /// Build the tool from configuration
    ///
    /// When the configured binary does not exist and `search_path` is enabled,
    /// the binary's file name is looked up in PATH instead.
    pub fn from_config(config: &Config) -> Result<Self> {
        let program = resolve_program(&config.tool.vegapull_path, config.tool.search_path)?;
        Ok(Self {
            program,
            launcher_args: config.tool.launcher_args.clone(),
            language: config.language,
            image_verbosity: config.tool.image_verbosity,
            runner: ProcessRunner::new(),
        })
    }

    /// Place `args` before the tool's own arguments
    pub fn with_launcher_args(mut self, args: Vec<String>) -> Self {
        self.launcher_args = args;
        self
    }

    /// The resolved binary
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The language passed to every invocation
    pub fn language(&self) -> Language {
        self.language
    }

    /// Write the full pack listing to `output`
    pub async fn packs(&self, output: &Path) -> Result<()> {
        self.runner
            .run(&self.program, self.packs_args(), Some(output))
            .await
    }

    /// Write the records of one pack to `output`
    pub async fn cards(&self, pack_id: &str, output: &Path) -> Result<()> {
        self.runner
            .run(&self.program, self.cards_args(pack_id), Some(output))
            .await
    }

    /// Download the images of one pack into `output_dir`
    ///
    /// The tool manages the directory itself; standard output is inherited.
    pub async fn images(&self, pack_id: &str, output_dir: &Path) -> Result<()> {
        self.runner
            .run(&self.program, self.images_args(pack_id, output_dir), None)
            .await
    }

    fn base_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.launcher_args.iter().map(OsString::from).collect();
        args.push("--language".into());
        args.push(self.language.as_str().into());
        args
    }

    pub(crate) fn packs_args(&self) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push("packs".into());
        args
    }

    pub(crate) fn cards_args(&self, pack_id: &str) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push("cards".into());
        args.push(pack_id.into());
        args
    }

    pub(crate) fn images_args(&self, pack_id: &str, output_dir: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push("images".into());
        let mut dir_flag = OsString::from("--output-dir=");
        dir_flag.push(output_dir.as_os_str());
        args.push(dir_flag);
        args.push(pack_id.into());
        if self.image_verbosity > 0 {
            args.push(format!("-{}", "v".repeat(usize::from(self.image_verbosity))).into());
        }
        args
    }
}

fn resolve_program(configured: &Path, search_path: bool) -> Result<PathBuf> {
    if configured.exists() || !search_path {
        return Ok(configured.to_path_buf());
    }

    let name = configured
        .file_name()
        .ok_or_else(|| Error::ToolNotFound(configured.display().to_string()))?;
    match which::which(name) {
        Ok(found) => {
            debug!(?configured, ?found, "using extraction tool found in PATH");
            Ok(found)
        }
        Err(_) => Err(Error::ToolNotFound(format!(
            "{} (not found at the configured path or in PATH)",
            configured.display()
        ))),
    }
}
