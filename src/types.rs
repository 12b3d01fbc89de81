//! Core types: pack records and the work units built from them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One pack as listed by the extraction tool's `packs` subcommand
///
/// Only `id` is interpreted; the titles are carried through for logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackRecord {
    /// Stable identifier used to address every per-pack artifact
    pub id: String,
    /// Title as it appears on the source site
    pub raw_title: String,
    /// Decomposed title
    pub title_parts: TitleParts,
}

/// A pack title split into its prefix, title and label
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleParts {
    /// Leading part before the first `-…-` group, if any
    #[serde(default)]
    pub prefix: Option<String>,
    /// The title proper
    pub title: String,
    /// Bracketed label, if any
    #[serde(default)]
    pub label: Option<String>,
}

impl fmt::Display for PackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.raw_title, self.id)
    }
}

/// A single task's worth of work within a stage
///
/// Created per stage, handed to exactly one concurrent task, then dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkUnit {
    /// Identifier of the unit (pack id, or archive stem when unpacking)
    pub id: String,
    /// Human-readable title used in logs and failures
    pub title: String,
    /// Artifact path this unit produces or consumes
    pub target: PathBuf,
}

impl WorkUnit {
    /// Create a work unit for a pack targeting the given artifact path
    pub fn for_pack(pack: &PackRecord, target: impl Into<PathBuf>) -> Self {
        Self {
            id: pack.id.clone(),
            title: pack.raw_title.clone(),
            target: target.into(),
        }
    }

    /// The artifact path as a borrowed path
    pub fn target(&self) -> &Path {
        &self.target
    }
}
