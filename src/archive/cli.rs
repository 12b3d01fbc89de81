//! Archive handler using the external `zip` and `unzip` binaries

use super::traits::ArchiveHandler;
use crate::error::{Error, Result};
use crate::process::{Invocation, ProcessRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Archive handler that shells out to `zip -r` and `unzip -o`
///
/// # Examples
///
/// ```no_run
/// use punk_records::archive::{ArchiveHandler, CliArchiveHandler};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handler = CliArchiveHandler::from_path()
///     .expect("zip and unzip not found in PATH");
/// handler
///     .expand(Path::new("images/569101.zip"), Path::new("images/569101"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct CliArchiveHandler {
    zip_path: PathBuf,
    unzip_path: PathBuf,
    runner: ProcessRunner,
}

impl CliArchiveHandler {
    /// Create a handler with explicit binary paths
    pub fn new(zip_path: PathBuf, unzip_path: PathBuf) -> Self {
        Self {
            zip_path,
            unzip_path,
            runner: ProcessRunner::new(),
        }
    }

    /// Find both `zip` and `unzip` in PATH
    ///
    /// Returns `None` if either binary is missing.
    pub fn from_path() -> Option<Self> {
        let zip = which::which("zip").ok()?;
        let unzip = which::which("unzip").ok()?;
        Some(Self::new(zip, unzip))
    }

    /// Use the given paths, falling back to a PATH lookup for any that are unset
    pub fn resolve(zip_path: Option<&Path>, unzip_path: Option<&Path>) -> Result<Self> {
        let zip = locate(zip_path, "zip")?;
        let unzip = locate(unzip_path, "unzip")?;
        Ok(Self::new(zip, unzip))
    }
}

fn locate(configured: Option<&Path>, binary: &str) -> Result<PathBuf> {
    match configured {
        Some(path) => Ok(path.to_path_buf()),
        None => which::which(binary)
            .map_err(|e| Error::ToolNotFound(format!("{binary} not found in PATH: {e}"))),
    }
}

#[async_trait]
impl ArchiveHandler for CliArchiveHandler {
    async fn compress(&self, source_dir: &Path, archive: &Path) -> Result<()> {
        // zip runs inside the source directory, so the archive path must not be relative
        let archive_abs =
            std::path::absolute(archive).map_err(|e| Error::fs("resolve path", archive, e))?;

        // zip updates an existing archive in place instead of replacing it
        match tokio::fs::remove_file(&archive_abs).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::fs("remove stale archive", &archive_abs, e)),
        }

        let invocation = Invocation::new(&self.zip_path)
            .args(["-r", "-q"])
            .arg(&archive_abs)
            .arg(".")
            .current_dir(source_dir);
        self.runner.execute(&invocation).await?;

        info!(?source_dir, ?archive, "zip compression successful");
        Ok(())
    }

    async fn expand(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let invocation = Invocation::new(&self.unzip_path)
            .args(["-o", "-q"])
            .arg(archive)
            .arg("-d")
            .arg(dest_dir);
        self.runner.execute(&invocation).await?;

        info!(?archive, ?dest_dir, "unzip extraction successful");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cli-zip"
    }
}
