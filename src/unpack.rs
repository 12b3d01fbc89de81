//! Expansion of previously produced image archives
//!
//! Scans the images directory (non-recursively) for `*.zip` files, expands
//! each into a sibling directory named after the archive, and deletes the
//! archive once its expansion succeeded.

use crate::archive::{ArchiveHandler, handler_from_config};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::stager::ARCHIVE_EXTENSION;
use crate::task_group::{Stage, TaskGroup};
use crate::types::WorkUnit;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Expands every archive in an images directory back into directories
pub struct Unpacker {
    images_dir: PathBuf,
    archiver: Arc<dyn ArchiveHandler>,
    concurrency: Option<usize>,
}

impl Unpacker {
    /// Create an unpacker over `images_dir`
    pub fn new(
        images_dir: impl Into<PathBuf>,
        archiver: Arc<dyn ArchiveHandler>,
        concurrency: Option<usize>,
    ) -> Self {
        Self {
            images_dir: images_dir.into(),
            archiver,
            concurrency,
        }
    }

    /// Create an unpacker over the configured data root's images directory
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.images_dir(),
            handler_from_config(&config.archive)?,
            config.max_concurrency,
        ))
    }

    /// The directory being scanned
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// List one work unit per archive file, ignoring directories and other files
    ///
    /// Each unit targets the archive; its id is the archive name without the
    /// extension, which is also the expansion directory's name. Units are
    /// sorted by file name.
    ///
    /// # Errors
    ///
    /// [`Error::MissingDirectory`] if the images directory does not exist.
    pub async fn scan(&self) -> Result<Vec<WorkUnit>> {
        let dir = &self.images_dir;
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => Error::MissingDirectory {
                    path: dir.clone(),
                    source,
                },
                _ => Error::fs("read directory", dir, source),
            })?;

        let suffix = format!(".{ARCHIVE_EXTENSION}");
        let mut units = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::fs("read directory", dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Error::fs("inspect", entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stem) = name.strip_suffix(&suffix) else {
                continue;
            };
            if stem.is_empty() {
                continue;
            }

            units.push(WorkUnit {
                id: stem.to_string(),
                title: name.clone(),
                target: entry.path(),
            });
        }

        units.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(units)
    }

    /// Expand every archive, then delete it; returns how many were expanded
    ///
    /// All archives are attempted; any failure is reported once every task
    /// has finished.
    pub async fn run(&self) -> Result<usize> {
        info!(dir = ?self.images_dir, "unpacking image archives");
        let units = self.scan().await?;
        let count = units.len();

        let archiver = Arc::clone(&self.archiver);
        let images_dir = self.images_dir.clone();
        TaskGroup::new(Stage::Unpack)
            .with_concurrency_limit(self.concurrency)
            .run(units, move |progress, unit| {
                let archiver = Arc::clone(&archiver);
                let dest = images_dir.join(&unit.id);
                async move {
                    let archive = unit.target();
                    info!(?archive, ?dest, "{progress} unpacking");

                    archiver
                        .expand(archive, &dest)
                        .await
                        .map_err(|e| e.context("failed to unpack"))?;
                    info!("{progress} unpacked {} successfully", unit.title);

                    tokio::fs::remove_file(archive)
                        .await
                        .map_err(|e| Error::fs("remove archive", archive, e))?;
                    Ok::<(), Error>(())
                }
            })
            .await?;

        Ok(count)
    }
}
