//! Pack catalog retrieval

use crate::error::{Error, Result};
use crate::stager::StagingArea;
use crate::tool::ExtractionTool;
use crate::types::PackRecord;
use std::collections::HashSet;
use std::path::{Component, Path};
use tracing::info;

/// Fetches the list of packs for the configured language
pub struct Catalog<'a> {
    tool: &'a ExtractionTool,
    staging: &'a StagingArea,
}

impl<'a> Catalog<'a> {
    /// Create a catalog reading through `tool` into `staging`
    pub fn new(tool: &'a ExtractionTool, staging: &'a StagingArea) -> Self {
        Self { tool, staging }
    }

    /// Run the tool's `packs` subcommand and parse the listing it wrote
    ///
    /// The listing stays on disk as `packs.json`. Records keep the tool's
    /// emission order.
    pub async fn fetch(&self) -> Result<Vec<PackRecord>> {
        let path = self.staging.packs_file();
        self.tool
            .packs(&path)
            .await
            .map_err(|e| e.context("failed to pull packs using vegapull"))?;

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::fs("read", &path, e))?;
        let packs = parse_packs(&data, &path)?;

        info!(count = packs.len(), ?path, "fetched pack catalog");
        Ok(packs)
    }
}

/// Parse a pack listing and check every identifier is a unique, usable file name
///
/// `path` is only used in error messages.
pub fn parse_packs(data: &[u8], path: &Path) -> Result<Vec<PackRecord>> {
    let packs: Vec<PackRecord> = serde_json::from_slice(data).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::with_capacity(packs.len());
    for pack in &packs {
        validate_pack_id(&pack.id)?;
        if !seen.insert(pack.id.as_str()) {
            return Err(Error::InvalidPack {
                id: pack.id.clone(),
                reason: "identifier is listed more than once".to_string(),
            });
        }
    }
    Ok(packs)
}

fn validate_pack_id(id: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidPack {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    if id.is_empty() {
        return Err(invalid("identifier is empty"));
    }
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !id.contains(['/', '\\']) => Ok(()),
        _ => Err(invalid("identifier must be a single path component")),
    }
}
