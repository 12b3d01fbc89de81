//! Error types for punk-records
//!
//! This module groups every failure the refresh can hit:
//! - Operator input errors (declined or unreadable confirmation)
//! - Filesystem errors with the offending path attached
//! - Subprocess errors from the extraction tool or archive utilities
//! - Stage failures aggregated from concurrent work units

use crate::task_group::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for punk-records operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for punk-records
///
/// Every variant carries enough context (path, program, pack identifier) for
/// an operator to diagnose the failure and re-run by hand.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrency")
        key: Option<String>,
    },

    /// The confirmation prompt could not be read
    #[error("input error: {0}")]
    Input(String),

    /// The operator declined the destructive confirmation prompt
    #[error("aborted by user")]
    Aborted,

    /// A filesystem operation failed on a known path
    #[error("failed to {action} {path}: {source}")]
    FileSystem {
        /// What was being attempted (e.g., "remove directory")
        action: &'static str,
        /// The path the operation targeted
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error without path context
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An external process failed to start or exited unsuccessfully
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The catalog payload could not be parsed
    #[error("error parsing {path}: {source}")]
    Parse {
        /// The file that held the malformed payload
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A pack record cannot be used to address on-disk artifacts
    #[error("invalid pack identifier {id:?}: {reason}")]
    InvalidPack {
        /// The offending identifier
        id: String,
        /// Why it was rejected
        reason: String,
    },

    /// Archive creation or expansion failed
    #[error("archive error for {archive}: {reason}")]
    Archive {
        /// The archive being written or read
        archive: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A directory that must already exist is missing
    #[error("directory {path} does not exist: {source}")]
    MissingDirectory {
        /// The expected directory
        path: PathBuf,
        /// The error returned when probing it
        #[source]
        source: std::io::Error,
    },

    /// A required external binary could not be located
    #[error("external tool not found: {0}")]
    ToolNotFound(String),

    /// One or more work units of a fan-out stage failed
    #[error(transparent)]
    Stage(#[from] StageError),

    /// A worker task panicked or was aborted before reporting
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// An error wrapped with a description of the step that produced it
    #[error("{context}: {source}")]
    Context {
        /// Description of the failed step
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with a description of the step that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a [`Error::FileSystem`] from an I/O error and the path it concerns
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from configuration validation
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. } | Error::ToolNotFound(_))
    }
}

/// External process errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The process could not be started
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// The program that failed to start
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited with a non-zero status
    #[error("{program} exited unsuccessfully ({status})")]
    ExitStatus {
        /// The program that failed
        program: String,
        /// Its exit status
        status: std::process::ExitStatus,
    },

    /// The file receiving standard output could not be created
    #[error("failed to create output file {path}: {source}")]
    OutputFile {
        /// The output file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// The failure of a single work unit, tied to the unit that produced it
#[derive(Debug, Error)]
#[error("'{title}' ({id}): {source}")]
pub struct TaskFailure {
    /// Identifier of the work unit (pack id or archive stem)
    pub id: String,
    /// Human-readable title of the work unit
    pub title: String,
    /// What went wrong
    #[source]
    pub source: Error,
}

/// Aggregated outcome of a fan-out stage in which at least one task failed
///
/// Failures are stored in the order they were drained from the collector,
/// which is unrelated to the order the tasks were started in.
#[derive(Debug)]
pub struct StageError {
    /// The stage that failed
    pub stage: Stage,
    /// Number of tasks the stage ran
    pub total: usize,
    /// Every failure reported by the stage (never empty)
    pub failures: Vec<TaskFailure>,
}

impl StageError {
    /// The first failure drained from the collector
    pub fn first(&self) -> Option<&TaskFailure> {
        self.failures.first()
    }

    /// Identifiers of every failed work unit
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.id.as_str()).collect()
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} stage failed for {}/{} task(s)",
            self.stage,
            self.failures.len(),
            self.total
        )?;
        if let Some(first) = self.first() {
            write!(f, ": {first}")?;
        }
        if self.failures.len() > 1 {
            write!(f, " (and {} more)", self.failures.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.first().map(|f| f as &(dyn std::error::Error + 'static))
    }
}
