//! Record fetch stage: one `cards` invocation per pack

use super::StageContext;
use crate::error::{Error, Result};
use crate::task_group::{Stage, TaskGroup};
use crate::types::{PackRecord, WorkUnit};
use std::sync::Arc;
use tracing::info;

/// Write `cards_<id>.json` for every pack
///
/// Every pack is attempted even if some fail; files of successful packs stay
/// on disk and the stage reports failure if any pack failed.
pub(crate) async fn fetch_records(ctx: Arc<StageContext>, packs: &[PackRecord]) -> Result<()> {
    let units = packs
        .iter()
        .map(|pack| WorkUnit::for_pack(pack, ctx.staging.record_file(&pack.id)))
        .collect();

    TaskGroup::new(Stage::Records)
        .with_concurrency_limit(ctx.concurrency)
        .run(units, move |progress, unit| {
            let ctx = Arc::clone(&ctx);
            async move {
                info!(pack_id = %unit.id, "{progress} pulling cards for pack '{}'", unit.title);
                ctx.tool
                    .cards(&unit.id, unit.target())
                    .await
                    .map_err(|e| e.context("failed to pull cards"))?;
                info!(
                    pack_id = %unit.id,
                    path = ?unit.target(),
                    "{progress} pulled cards for pack '{}'",
                    unit.title
                );
                Ok::<(), Error>(())
            }
        })
        .await?;
    Ok(())
}
