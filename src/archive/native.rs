//! In-process ZIP handling with the `zip` crate

use super::traits::ArchiveHandler;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive handler backed by the `zip` crate
///
/// Needs no external binaries. Work runs on the blocking thread pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeZipHandler;

#[async_trait]
impl ArchiveHandler for NativeZipHandler {
    async fn compress(&self, source_dir: &Path, archive: &Path) -> Result<()> {
        let source_owned = source_dir.to_path_buf();
        let archive_owned = archive.to_path_buf();

        let files = spawn_blocking(move || compress_dir(&source_owned, &archive_owned))
            .await
            .map_err(|e| archive_error(archive, format!("compression task panicked: {e}")))??;

        info!(?source_dir, ?archive, files, "ZIP compression successful");
        Ok(())
    }

    async fn expand(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let archive_owned = archive.to_path_buf();
        let dest_owned = dest_dir.to_path_buf();

        let files = spawn_blocking(move || expand_archive(&archive_owned, &dest_owned))
            .await
            .map_err(|e| archive_error(archive, format!("extraction task panicked: {e}")))??;

        info!(?archive, ?dest_dir, files, "ZIP extraction successful");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "native-zip"
    }
}

fn archive_error(archive: &Path, reason: String) -> Error {
    Error::Archive {
        archive: archive.to_path_buf(),
        reason,
    }
}

/// Name of a ZIP entry: forward-slash separated, relative to the archive root
fn entry_name(relative: &Path, archive: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                archive_error(
                    archive,
                    format!("non UTF-8 file name: {}", relative.display()),
                )
            })?),
            _ => {
                return Err(archive_error(
                    archive,
                    format!("unexpected path component in {}", relative.display()),
                ));
            }
        }
    }
    Ok(parts.join("/"))
}

fn compress_dir(source_dir: &Path, archive: &Path) -> Result<usize> {
    debug!(?source_dir, ?archive, "creating ZIP archive");

    match std::fs::metadata(source_dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(archive_error(
                archive,
                format!("{} is not a directory", source_dir.display()),
            ));
        }
        Err(e) => {
            return Err(archive_error(
                archive,
                format!("cannot read {}: {e}", source_dir.display()),
            ));
        }
    }

    let file = File::create(archive).map_err(|e| Error::fs("create archive", archive, e))?;
    let result = write_entries(ZipWriter::new(file), source_dir, archive);
    if result.is_err() {
        // The writer finalizes on drop, so a failed run would leave a valid archive.
        if let Err(e) = std::fs::remove_file(archive) {
            warn!(?archive, error = %e, "failed to remove partial archive");
        }
    }
    result
}

fn write_entries(mut writer: ZipWriter<File>, source_dir: &Path, archive: &Path) -> Result<usize> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut files = 0;

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            archive_error(
                archive,
                format!("failed to walk {}: {}", source_dir.display(), e),
            )
        })?;
        let relative = entry.path().strip_prefix(source_dir).map_err(|e| {
            archive_error(archive, format!("entry outside source directory: {e}"))
        })?;
        let name = entry_name(relative, archive)?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| archive_error(archive, format!("failed to add directory: {e}")))?;
        } else if file_type.is_file() {
            writer
                .start_file(name, options)
                .map_err(|e| archive_error(archive, format!("failed to add file: {e}")))?;
            let mut input =
                File::open(entry.path()).map_err(|e| Error::fs("open", entry.path(), e))?;
            std::io::copy(&mut input, &mut writer)
                .map_err(|e| archive_error(archive, format!("failed to write entry: {e}")))?;
            files += 1;
        } else {
            warn!(path = ?entry.path(), "skipping entry that is neither file nor directory");
        }
    }

    writer
        .finish()
        .map_err(|e| archive_error(archive, format!("failed to finish ZIP archive: {e}")))?;
    Ok(files)
}

fn expand_archive(archive: &Path, dest_dir: &Path) -> Result<usize> {
    debug!(?archive, ?dest_dir, "expanding ZIP archive");

    let file = File::open(archive).map_err(|e| Error::fs("open archive", archive, e))?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| archive_error(archive, format!("failed to read ZIP archive: {e}")))?;

    std::fs::create_dir_all(dest_dir).map_err(|e| Error::fs("create directory", dest_dir, e))?;

    let mut files = 0;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| archive_error(archive, format!("failed to read ZIP entry: {e}")))?;

        let path: PathBuf = match entry.enclosed_name() {
            Some(relative) => dest_dir.join(relative),
            None => {
                warn!(name = entry.name(), "skipping entry with unsafe path");
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&path).map_err(|e| Error::fs("create directory", &path, e))?;
            continue;
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::fs("create directory", parent, e))?;
        }
        let mut output = File::create(&path).map_err(|e| Error::fs("create", &path, e))?;
        std::io::copy(&mut entry, &mut output)
            .map_err(|e| archive_error(archive, format!("failed to extract {}: {e}", path.display())))?;
        files += 1;
    }

    Ok(files)
}
