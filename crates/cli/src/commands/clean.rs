//! The `catsync clean` commands.
//!
//! Each target lists one resource kind and deletes everything found.
//! Per-item failures are reported and never stop the remaining items; the
//! exit code only reflects a failure to list in the first place.

use catalog_sync::SyncError;
use catalog_sync::cleanup::{self, DeletionOutcome};
use catalog_sync::config::SyncConfig;
use catalog_sync::shopify::ShopifyClient;

/// Delete all files from the store.
///
/// # Errors
///
/// Returns an error when configuration is incomplete or the file listing
/// fails; per-batch deletion failures are reported, not propagated.
pub async fn files() -> Result<(), SyncError> {
    let client = client()?;
    let outcomes = cleanup::clean_files(&client).await?;
    report("files", &outcomes);
    Ok(())
}

/// Delete all products from the store.
///
/// # Errors
///
/// Returns an error when configuration is incomplete or the product
/// listing fails; per-item deletion failures are reported, not propagated.
pub async fn products() -> Result<(), SyncError> {
    let client = client()?;
    let outcomes = cleanup::clean_products(&client).await?;
    report("products", &outcomes);
    Ok(())
}

/// Delete all product metafield definitions, cascading their metafields.
///
/// # Errors
///
/// Returns an error when configuration is incomplete or the definition
/// listing fails; per-item deletion failures are reported, not propagated.
pub async fn definitions() -> Result<(), SyncError> {
    let client = client()?;
    let outcomes = cleanup::clean_definitions(&client).await?;
    report("metafield definitions", &outcomes);
    Ok(())
}

fn client() -> Result<ShopifyClient, SyncError> {
    let config = SyncConfig::from_env()?;
    Ok(ShopifyClient::new(&config.shopify)?)
}

fn report(kind: &str, outcomes: &[DeletionOutcome]) {
    let deleted = outcomes.iter().filter(|o| o.deleted).count();
    let failed = outcomes.len() - deleted;
    tracing::info!("{kind}: {deleted} deleted, {failed} failed");
    for outcome in outcomes.iter().filter(|o| !o.deleted) {
        tracing::warn!(
            "not deleted: {} ({})",
            outcome.id,
            outcome.error.as_deref().unwrap_or("no error reported")
        );
    }
}
