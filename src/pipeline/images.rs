//! Image stage: fetch each pack's images, archive them, remove the directory

use super::StageContext;
use crate::error::{Error, Result};
use crate::task_group::{Progress, Stage, TaskGroup};
use crate::types::{PackRecord, WorkUnit};
use std::sync::Arc;
use tracing::info;

/// Leave exactly one `images/<id>.zip` per pack
///
/// A failure at any step aborts that pack only and leaves whatever was on
/// disk at that point (the image directory, or directory and archive both).
pub(crate) async fn fetch_images(ctx: Arc<StageContext>, packs: &[PackRecord]) -> Result<()> {
    let units = packs
        .iter()
        .map(|pack| WorkUnit::for_pack(pack, ctx.staging.image_dir(&pack.id)))
        .collect();

    TaskGroup::new(Stage::Images)
        .with_concurrency_limit(ctx.concurrency)
        .run(units, move |progress, unit| {
            let ctx = Arc::clone(&ctx);
            async move { process_pack(&ctx, progress, unit).await }
        })
        .await?;
    Ok(())
}

async fn process_pack(ctx: &StageContext, progress: Progress, unit: WorkUnit) -> Result<()> {
    let image_dir = unit.target();
    let archive = ctx.staging.image_archive(&unit.id);

    info!(pack_id = %unit.id, "{progress} pulling images for '{}'", unit.title);
    ctx.tool
        .images(&unit.id, image_dir)
        .await
        .map_err(|e| e.context("failed to pull images"))?;
    info!(pack_id = %unit.id, "{progress} pulled images for '{}'", unit.title);

    ctx.archiver
        .compress(image_dir, &archive)
        .await
        .map_err(|e| e.context("failed to zip images"))?;
    info!(pack_id = %unit.id, ?archive, "{progress} zipped images for '{}'", unit.title);

    tokio::fs::remove_dir_all(image_dir)
        .await
        .map_err(|e| Error::fs("remove directory after zipping", image_dir, e))?;
    Ok(())
}
