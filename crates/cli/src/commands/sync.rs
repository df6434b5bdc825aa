//! The `catsync sync` command.

use catalog_sync::SyncError;
use catalog_sync::config::SyncConfig;
use catalog_sync::pipeline::Pipeline;

/// Run one full sync from the configured sheet into the configured store.
///
/// # Errors
///
/// Returns an error when configuration is incomplete, the spreadsheet
/// cannot be read, or the Shopify client cannot be built. Item-level
/// platform failures are logged inside the run and do not surface here.
pub async fn run() -> Result<(), SyncError> {
    let config = SyncConfig::from_env()?;
    let pipeline = Pipeline::new(&config)?;

    let summary = pipeline.run().await?;

    if let Some(stage) = summary.halted {
        tracing::warn!("sync halted early at {stage:?}; see {} for details", config.log_path);
    } else {
        tracing::info!(
            definitions = summary.definitions_created,
            files = summary.files_uploaded,
            products = summary.products_created,
            failed = summary.products_failed,
            metafields = summary.metafields_set,
            "sync finished"
        );
    }

    Ok(())
}
