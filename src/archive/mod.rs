//! Image archive creation and expansion
//!
//! The pipeline and the unpacker only see the [`ArchiveHandler`] trait. Two
//! implementations are provided:
//!
//! - [`NativeZipHandler`]: the `zip` crate, no external binaries (default)
//! - [`CliArchiveHandler`]: the `zip` / `unzip` command-line utilities
//!
//! Both store entries relative to the compressed directory, so expanding
//! `images/<id>.zip` into `images/<id>/` reproduces the original tree.

mod cli;
mod native;
mod traits;


pub use cli::CliArchiveHandler;
pub use native::NativeZipHandler;
pub use traits::ArchiveHandler;

use crate::config::{ArchiveBackend, ArchiveConfig};
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Build the archive handler selected by configuration
///
/// # Errors
///
/// Returns [`crate::Error::ToolNotFound`] when the cli backend is selected and
/// `zip` or `unzip` cannot be located.
pub fn handler_from_config(config: &ArchiveConfig) -> Result<Arc<dyn ArchiveHandler>> {
    let handler: Arc<dyn ArchiveHandler> = match config.backend {
        ArchiveBackend::Native => Arc::new(NativeZipHandler),
        ArchiveBackend::Cli => Arc::new(CliArchiveHandler::resolve(
            config.zip_path.as_deref(),
            config.unzip_path.as_deref(),
        )?),
    };
    debug!(handler = handler.name(), "selected archive handler");
    Ok(handler)
}
