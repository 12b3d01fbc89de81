//! The narrow interface every archive implementation provides

use async_trait::async_trait;
use std::path::Path;

/// Creates and expands image archives
///
/// Implementations may use an in-process library or external binaries, but
/// must agree on semantics:
/// - `compress` stores entries relative to `source_dir` and replaces any
///   existing archive at `archive`
/// - `expand` creates `dest_dir` if needed, overwrites files already there,
///   and fails on a corrupt or unreadable archive
///
/// # Examples
///
/// ```no_run
/// use punk_records::archive::{ArchiveHandler, NativeZipHandler};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handler = NativeZipHandler;
/// handler
///     .compress(Path::new("images/569101"), Path::new("images/569101.zip"))
///     .await?;
/// handler
///     .expand(Path::new("images/569101.zip"), Path::new("images/569101"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ArchiveHandler: Send + Sync {
    /// Compress the whole of `source_dir` into the file `archive`
    async fn compress(&self, source_dir: &Path, archive: &Path) -> crate::Result<()>;

    /// Expand `archive` into `dest_dir`
    async fn expand(&self, archive: &Path, dest_dir: &Path) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
