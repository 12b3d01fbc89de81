//! # punk-records
//!
//! Keeps a local snapshot of the One Piece TCG dataset up to date by driving
//! the `vegapull` extraction tool once per pack.
//!
//! ## Overview
//!
//! A refresh ([`Pipeline`]) wipes the data root after confirmation, fetches the
//! pack catalog, then runs two fan-out stages over the packs: one fetching each
//! pack's card records, one fetching its images and compacting them into a ZIP
//! archive. A separate [`Unpacker`] later expands those archives back into
//! directories.
//!
//! Each fan-out stage is a [`TaskGroup`]: one task per pack, no task cancelled
//! because a sibling failed, and every failure reported once all tasks have
//! returned.
//!
//! ## Quick Start
//!
//! ```no_run
//! use punk_records::{Config, LineConfirmation, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let pipeline = Pipeline::from_config(&config)?;
//!
//!     let summary = pipeline.run(&mut LineConfirmation::stdin()).await?;
//!     println!("refreshed {} packs", summary.packs);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Image archive creation and expansion
pub mod archive;
/// Pack catalog retrieval
pub mod catalog;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Refresh pipeline
pub mod pipeline;
/// External process execution
pub mod process;
/// Staging area lifecycle and operator confirmation
pub mod stager;
/// Concurrent fan-out runner
pub mod task_group;
/// Extraction tool invocations
pub mod tool;
/// Core data types
pub mod types;
/// Archive expansion
pub mod unpack;

// Re-export commonly used types
pub use archive::{ArchiveHandler, CliArchiveHandler, NativeZipHandler};
pub use catalog::Catalog;
pub use config::{ArchiveBackend, Config, Language};
pub use error::{Error, ProcessError, Result, StageError, TaskFailure};
pub use pipeline::{Pipeline, RunSummary};
pub use process::{Invocation, ProcessRunner};
pub use stager::{Confirmation, LineConfirmation, Stager, StagingArea};
pub use task_group::{Progress, Stage, TaskGroup};
pub use tool::ExtractionTool;
pub use types::{PackRecord, TitleParts, WorkUnit};
pub use unpack::Unpacker;
