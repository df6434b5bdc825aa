//! List-then-delete cleanup routines.
//!
//! Three independent routines remove the objects a sync creates: files
//! (batched deletion), products, and metafield definitions (one call per
//! item; definition deletion cascades associated metafields). A failure on
//! one item or batch is recorded and never stops the remainder. Cleanup
//! reports through `tracing` only; the sync run log is not touched.

use std::future::Future;

use crate::shopify::{
    FileDeletePayload, ShopifyClient, ShopifyError, UserError, join_user_errors,
};

/// Files deleted per `fileDelete` call.
pub const DELETE_BATCH_SIZE: usize = 50;

/// Outcome of deleting one object (or one file batch member).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub id: String,
    pub deleted: bool,
    pub error: Option<String>,
}

impl DeletionOutcome {
    fn deleted(id: &str) -> Self {
        Self {
            id: id.to_string(),
            deleted: true,
            error: None,
        }
    }

    fn failed(id: &str, error: String) -> Self {
        Self {
            id: id.to_string(),
            deleted: false,
            error: Some(error),
        }
    }
}

/// What one delete call reported, before it is folded into outcomes.
struct DeleteReport {
    confirmed: bool,
    user_errors: Vec<UserError>,
}

/// Delete every file in the store, in batches of [`DELETE_BATCH_SIZE`].
///
/// # Errors
///
/// Only the initial paginated listing is fatal; per-batch failures are
/// recorded in the outcomes and later batches still run.
pub async fn clean_files(client: &ShopifyClient) -> Result<Vec<DeletionOutcome>, ShopifyError> {
    let file_ids = client.list_file_ids().await?;
    if file_ids.is_empty() {
        tracing::info!("no files to delete");
        return Ok(Vec::new());
    }
    tracing::info!(count = file_ids.len(), "deleting files");

    let outcomes = delete_file_batches(&file_ids, |batch| async move {
        client.delete_files(&batch).await
    })
    .await;

    tracing::info!("all file batches processed");
    Ok(outcomes)
}

/// Delete every product in the store, one mutation per product.
///
/// # Errors
///
/// Only the initial listing is fatal; per-item failures are recorded in
/// the outcomes and the loop continues.
pub async fn clean_products(client: &ShopifyClient) -> Result<Vec<DeletionOutcome>, ShopifyError> {
    let (products, _page) = client.list_products_page(None).await?;
    tracing::info!(count = products.len(), "deleting products");

    let ids: Vec<String> = products.into_iter().map(|p| p.id).collect();
    Ok(delete_each(ids, "product", |id| async move {
        let payload = client.delete_product(&id).await?;
        Ok(DeleteReport {
            confirmed: payload.deleted_product_id.is_some(),
            user_errors: payload.user_errors,
        })
    })
    .await)
}

/// Delete every product metafield definition, cascading the metafields
/// each one governs.
///
/// # Errors
///
/// Only the initial listing is fatal; per-item failures are recorded in
/// the outcomes and the loop continues.
pub async fn clean_definitions(
    client: &ShopifyClient,
) -> Result<Vec<DeletionOutcome>, ShopifyError> {
    let definitions = client.list_metafield_definitions().await?;
    tracing::info!(count = definitions.len(), "deleting metafield definitions");

    let ids: Vec<String> = definitions.into_iter().map(|d| d.id).collect();
    Ok(delete_each(ids, "definition", |id| async move {
        let payload = client.delete_metafield_definition(&id).await?;
        Ok(DeleteReport {
            confirmed: payload.deleted_definition_id.is_some(),
            user_errors: payload.user_errors,
        })
    })
    .await)
}

/// Chunk `ids` into fixed batches and run `delete` on each, folding the
/// platform's confirmed-id list into per-file outcomes.
///
/// A failing batch, transport or user error alike, marks only its own ids
/// failed; every later batch still runs.
async fn delete_file_batches<F, Fut>(ids: &[String], mut delete: F) -> Vec<DeletionOutcome>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<FileDeletePayload, ShopifyError>>,
{
    let mut outcomes = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(DELETE_BATCH_SIZE) {
        match delete(chunk.to_vec()).await {
            Ok(payload) if payload.user_errors.is_empty() => {
                tracing::info!(deleted = payload.deleted_file_ids.len(), "deleted file batch");
                for id in chunk {
                    if payload.deleted_file_ids.iter().any(|d| d == id) {
                        outcomes.push(DeletionOutcome::deleted(id));
                    } else {
                        outcomes.push(DeletionOutcome::failed(id, "not deleted".to_string()));
                    }
                }
            }
            Ok(payload) => {
                let message = join_user_errors(&payload.user_errors);
                tracing::error!("error deleting file batch: {message}");
                for id in chunk {
                    outcomes.push(DeletionOutcome::failed(id, message.clone()));
                }
            }
            Err(e) => {
                tracing::error!("error deleting file batch: {e}");
                for id in chunk {
                    outcomes.push(DeletionOutcome::failed(id, e.to_string()));
                }
            }
        }
    }
    outcomes
}

/// Run `delete` once per id, recording one outcome per id.
///
/// A failure on one id, transport or user error alike, never stops the
/// ids after it.
async fn delete_each<F, Fut>(ids: Vec<String>, kind: &str, mut delete: F) -> Vec<DeletionOutcome>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<DeleteReport, ShopifyError>>,
{
    let mut outcomes = Vec::with_capacity(ids.len());
    for id in ids {
        match delete(id.clone()).await {
            Ok(report) if report.user_errors.is_empty() => {
                tracing::info!("deleted {kind} {id}");
                outcomes.push(DeletionOutcome {
                    id,
                    deleted: report.confirmed,
                    error: None,
                });
            }
            Ok(report) => {
                let message = join_user_errors(&report.user_errors);
                tracing::error!("error deleting {kind} {id}: {message}");
                outcomes.push(DeletionOutcome::failed(&id, message));
            }
            Err(e) => {
                tracing::error!("error deleting {kind} {id}: {e}");
                outcomes.push(DeletionOutcome::failed(&id, e.to_string()));
            }
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_ids(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("gid://shopify/GenericFile/{i}"))
            .collect()
    }

    fn full_batch_payload(batch: Vec<String>) -> FileDeletePayload {
        FileDeletePayload {
            deleted_file_ids: batch,
            user_errors: vec![],
        }
    }

    #[test]
    fn file_ids_chunk_into_fixed_batches() {
        let ids = file_ids(120);

        let sizes: Vec<usize> = ids.chunks(DELETE_BATCH_SIZE).map(<[String]>::len).collect();
        assert_eq!(sizes, [50, 50, 20]);

        // Chunking covers every id exactly once, in order.
        let flattened: Vec<&String> = ids.chunks(DELETE_BATCH_SIZE).flatten().collect();
        assert_eq!(flattened.len(), 120);
        assert_eq!(flattened[0], &ids[0]);
        assert_eq!(flattened[119], &ids[119]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_batch() {
        let ids = file_ids(100);
        let sizes: Vec<usize> = ids.chunks(DELETE_BATCH_SIZE).map(<[String]>::len).collect();
        assert_eq!(sizes, [50, 50]);
    }

    #[tokio::test]
    async fn failing_batch_does_not_stop_later_batches() {
        let ids = file_ids(120);
        let mut calls = 0;

        let outcomes = delete_file_batches(&ids, |batch| {
            calls += 1;
            let call = calls;
            async move {
                if call == 2 {
                    Err(ShopifyError::Api {
                        status: 500,
                        body: "boom".to_string(),
                    })
                } else {
                    Ok(full_batch_payload(batch))
                }
            }
        })
        .await;

        assert_eq!(calls, 3);
        assert_eq!(outcomes.len(), 120);
        assert!(outcomes[..50].iter().all(|o| o.deleted));
        assert!(outcomes[50..100].iter().all(|o| !o.deleted));
        assert!(outcomes[50].error.as_deref().is_some_and(|e| e.contains("boom")));
        // The third batch still ran and succeeded.
        assert!(outcomes[100..].iter().all(|o| o.deleted));
    }

    #[tokio::test]
    async fn user_errors_fail_only_their_own_batch() {
        let ids = file_ids(120);
        let mut calls = 0;

        let outcomes = delete_file_batches(&ids, |batch| {
            calls += 1;
            let call = calls;
            async move {
                if call == 2 {
                    Ok(FileDeletePayload {
                        deleted_file_ids: vec![],
                        user_errors: vec![UserError {
                            field: Some(vec!["fileIds".to_string()]),
                            message: "File is referenced".to_string(),
                        }],
                    })
                } else {
                    Ok(full_batch_payload(batch))
                }
            }
        })
        .await;

        assert_eq!(outcomes.len(), 120);
        assert!(outcomes[..50].iter().all(|o| o.deleted));
        assert_eq!(
            outcomes[50].error.as_deref(),
            Some("fileIds: File is referenced")
        );
        assert!(outcomes[100..].iter().all(|o| o.deleted));
    }

    #[tokio::test]
    async fn partially_confirmed_batch_marks_only_missing_ids() {
        let ids = file_ids(3);

        let outcomes = delete_file_batches(&ids, |mut batch| async move {
            batch.remove(1);
            Ok(full_batch_payload(batch))
        })
        .await;

        assert!(outcomes[0].deleted);
        assert!(!outcomes[1].deleted);
        assert_eq!(outcomes[1].error.as_deref(), Some("not deleted"));
        assert!(outcomes[2].deleted);
    }

    #[tokio::test]
    async fn failing_item_does_not_stop_later_items() {
        let ids: Vec<String> = (1..=3).map(|i| format!("gid://shopify/Product/{i}")).collect();

        let outcomes = delete_each(ids, "product", |id| async move {
            if id.ends_with("/2") {
                Err(ShopifyError::Unauthorized("expired".to_string()))
            } else {
                Ok(DeleteReport {
                    confirmed: true,
                    user_errors: vec![],
                })
            }
        })
        .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].deleted);
        assert!(!outcomes[1].deleted);
        assert!(outcomes[1].error.as_deref().is_some_and(|e| e.contains("expired")));
        assert!(outcomes[2].deleted);
    }

    #[tokio::test]
    async fn item_user_errors_carry_the_joined_message() {
        let ids = vec!["gid://shopify/Product/1".to_string()];

        let outcomes = delete_each(ids, "product", |_| async {
            Ok(DeleteReport {
                confirmed: false,
                user_errors: vec![UserError {
                    field: None,
                    message: "Product not found".to_string(),
                }],
            })
        })
        .await;

        assert_eq!(outcomes[0].error.as_deref(), Some("Product not found"));
        assert!(!outcomes[0].deleted);
    }

    #[test]
    fn outcome_constructors() {
        let ok = DeletionOutcome::deleted("gid://shopify/Product/1");
        assert!(ok.deleted);
        assert!(ok.error.is_none());

        let failed = DeletionOutcome::failed("gid://shopify/Product/2", "boom".to_string());
        assert!(!failed.deleted);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
