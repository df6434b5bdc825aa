//! The reconciliation pipeline.
//!
//! Strictly ordered, strictly sequential: metafield definitions first,
//! then the image upload batch, then product creation with metafield
//! attachment. Each stage gates on the prior stage producing at least one
//! item; an empty result halts the run with a logged warning, not an
//! error. Item-level failures are logged and skipped; nothing is retried.

use catalog_sync_core::{
    ImageRecord, MetafieldDefinitionRecord, MetakeyMap, ProductRecord, UploadedFile,
    matching::matching_files,
    metafield::{FILE_REFERENCE, LIST_FILE_REFERENCE, is_list_alias},
};

use crate::SyncError;
use crate::config::SyncConfig;
use crate::log::RunLog;
use crate::sheets::SheetsClient;
use crate::shopify::{FileCreateInput, ShopifyClient, join_user_errors};

/// The stage at which a run halted for lack of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The metafield definitions tab was empty.
    Definitions,
    /// The images tab was empty.
    Images,
    /// The upload batch produced no files.
    Uploads,
    /// The products tab was empty.
    Products,
}

/// Counters for one sync run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub definitions_created: usize,
    pub files_uploaded: usize,
    pub products_created: usize,
    pub products_failed: usize,
    pub metafields_set: usize,
    /// Set when the run stopped early because a stage had no input.
    pub halted: Option<Stage>,
}

/// One metafield write decided by the attachment planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttachmentPlan {
    pub namespace: String,
    pub key: String,
    pub value_type: &'static str,
    pub value: String,
}

/// Result of planning a product's attachments.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct AttachmentPlanning {
    /// Metafield writes to issue, in metakey order.
    pub sets: Vec<AttachmentPlan>,
    /// Metakeys with no matching definition record.
    pub missing_keys: Vec<String>,
}

/// The end-to-end sync run.
pub struct Pipeline {
    sheets: SheetsClient,
    shopify: ShopifyClient,
    log: RunLog,
}

impl Pipeline {
    /// Build the pipeline from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify client cannot be constructed from
    /// the configured credentials.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        Ok(Self {
            sheets: SheetsClient::new(config.google.clone()),
            shopify: ShopifyClient::new(&config.shopify)?,
            log: RunLog::new(config.log_path.clone()),
        })
    }

    /// Execute one full sync run.
    ///
    /// # Errors
    ///
    /// Only sheet load failures are fatal; every platform-side failure is
    /// logged to the run log and the run continues.
    pub async fn run(&self) -> Result<RunSummary, SyncError> {
        let mut summary = RunSummary::default();

        self.log.clear();
        self.log.append("Starting catalog sync...");

        // Stage 1: metafield definitions.
        let definitions = self.sheets.read_metafield_definitions().await?;
        let Some(definitions) = gate_stage(
            &self.log,
            definitions,
            "[WARNING] No metafield definitions found in the sheet.",
        ) else {
            summary.halted = Some(Stage::Definitions);
            return Ok(summary);
        };
        for definition in &definitions {
            if self.create_and_pin_definition(definition).await {
                summary.definitions_created += 1;
            }
        }

        // Stage 2: image upload.
        let images = self.sheets.read_images().await?;
        let Some(images) = gate_stage(
            &self.log,
            images,
            "[WARNING] No images found in the sheet.",
        ) else {
            summary.halted = Some(Stage::Images);
            return Ok(summary);
        };
        let files = self.upload_images(&images).await;
        summary.files_uploaded = files.len();
        let Some(files) = gate_stage(
            &self.log,
            files,
            "[WARNING] No files uploaded to the store.",
        ) else {
            summary.halted = Some(Stage::Uploads);
            return Ok(summary);
        };

        // Stage 3: products and their metakey mapping.
        let products = self.sheets.read_products().await?;
        let Some(products) = gate_stage(
            &self.log,
            products,
            "[WARNING] No products found in the sheet.",
        ) else {
            summary.halted = Some(Stage::Products);
            return Ok(summary);
        };
        let metakeys = self.sheets.read_metakey_map().await?;

        // Stage 4: create each product and attach its file metafields.
        for product in &products {
            if self
                .sync_product(product, &definitions, &files, &metakeys, &mut summary)
                .await
            {
                summary.products_created += 1;
            } else {
                summary.products_failed += 1;
            }
        }

        self.log.append(&format!(
            "Sync finished: {} definitions, {} files, {} products created ({} failed), {} metafields set",
            summary.definitions_created,
            summary.files_uploaded,
            summary.products_created,
            summary.products_failed,
            summary.metafields_set,
        ));

        Ok(summary)
    }

    /// Create one definition and try to pin it. Pin failure does not
    /// remove the definition from the usable set.
    async fn create_and_pin_definition(&self, record: &MetafieldDefinitionRecord) -> bool {
        let name = record.name.as_deref().unwrap_or("");

        let payload = match self.shopify.create_metafield_definition(record).await {
            Ok(payload) => payload,
            Err(e) => {
                self.log.append(&format!(
                    "[Error] Error creating metafield definition: {e} - {name}"
                ));
                return false;
            }
        };

        if !payload.user_errors.is_empty() {
            self.log.append(&format!(
                "[Error] Error creating metafield definition: {} - {name}",
                join_user_errors(&payload.user_errors)
            ));
            return false;
        }

        let Some(created) = payload.created_definition else {
            self.log.append(&format!(
                "[Error] Error creating metafield definition: no definition returned - {name}"
            ));
            return false;
        };

        self.log.append(&format!(
            "Metafield definition created: {name} ({})",
            created.id
        ));

        match self.shopify.pin_metafield_definition(&created.id).await {
            Ok(pin) if pin.user_errors.is_empty() => {
                self.log.append(&format!(
                    "Metafield definition pinned: {name} ({})",
                    created.id
                ));
            }
            Ok(pin) => {
                self.log.append(&format!(
                    "[Error] Error pinning metafield definition: {} - {name}",
                    join_user_errors(&pin.user_errors)
                ));
            }
            Err(e) => {
                self.log.append(&format!(
                    "[Error] Error pinning metafield definition: {e} - {name}"
                ));
            }
        }

        true
    }

    /// Upload all valid images in one batch call.
    ///
    /// Rows without a source URL are skipped with a logged warning. A
    /// transport failure on the batch degrades to an empty list with a
    /// logged error rather than aborting the run.
    async fn upload_images(&self, images: &[ImageRecord]) -> Vec<UploadedFile> {
        let mut inputs = Vec::new();
        for (index, record) in images.iter().enumerate() {
            match &record.image {
                Some(url) => inputs.push(FileCreateInput {
                    original_source: url.clone(),
                    alt: record.alt.clone().unwrap_or_default(),
                }),
                None => {
                    self.log.append(&format!(
                        "[WARNING] Image row {index} is missing an image URL"
                    ));
                }
            }
        }

        if inputs.is_empty() {
            return Vec::new();
        }

        let sources: Vec<&str> = inputs.iter().map(|f| f.original_source.as_str()).collect();
        let payload = match self.shopify.upload_files(&inputs).await {
            Ok(payload) => payload,
            Err(e) => {
                self.log.append(&format!(
                    "[Error] Error uploading files: {e} - {}",
                    sources.join(", ")
                ));
                return Vec::new();
            }
        };

        if !payload.user_errors.is_empty() {
            self.log.append(&format!(
                "[Error] Error uploading files: {} - {}",
                join_user_errors(&payload.user_errors),
                sources.join(", ")
            ));
        }

        if !payload.files.is_empty() {
            let ids: Vec<&str> = payload.files.iter().map(|f| f.id.as_str()).collect();
            self.log
                .append(&format!("Files uploaded successfully: {}", ids.join(", ")));
        }

        payload.files
    }

    /// Create one product and set its file metafields. Returns whether
    /// the product counts as fully successful.
    async fn sync_product(
        &self,
        record: &ProductRecord,
        definitions: &[MetafieldDefinitionRecord],
        files: &[UploadedFile],
        metakeys: &MetakeyMap,
        summary: &mut RunSummary,
    ) -> bool {
        let title = record.title.as_deref().unwrap_or("");

        let created = match self.shopify.create_product(record).await {
            Ok(created) => created,
            Err(e) => {
                self.log
                    .append(&format!("[Error] Failed to create product: {title} - {e}"));
                return false;
            }
        };
        self.log.append(&format!(
            "Product created: {title} ({})",
            created.admin_graphql_api_id
        ));

        let keys = metakeys.keys_for(title);
        if keys.is_empty() {
            self.log.append(&format!(
                "[WARNING] No metafields to set for product: ({title})"
            ));
            return true;
        }

        let matches = matching_files(files, title);
        if matches.is_empty() {
            self.log
                .append(&format!("[WARNING] No files found for product: ({title})"));
            return false;
        }

        let planning = plan_attachments(keys, definitions, &matches);
        for key in &planning.missing_keys {
            self.log.append(&format!(
                "[WARNING] Metafield definition not found for key: {key} (product: {title})"
            ));
        }

        let owner_id = created.admin_graphql_api_id.as_str();
        for plan in &planning.sets {
            match self
                .shopify
                .set_metafield(owner_id, &plan.namespace, &plan.key, plan.value_type, &plan.value)
                .await
            {
                Ok(payload) if payload.user_errors.is_empty() => {
                    self.log.append(&format!(
                        "Metafield set for product {owner_id}: {}.{} with value {}",
                        plan.namespace, plan.key, plan.value
                    ));
                    summary.metafields_set += 1;
                }
                Ok(payload) => {
                    self.log.append(&format!(
                        "[Error] Error setting metafield for product {owner_id}: {} - {}.{} with value {}",
                        join_user_errors(&payload.user_errors),
                        plan.namespace,
                        plan.key,
                        plan.value
                    ));
                }
                Err(e) => {
                    self.log.append(&format!(
                        "[Error] Error setting metafield for product {owner_id}: {e} - {}.{} with value {}",
                        plan.namespace, plan.key, plan.value
                    ));
                }
            }
        }

        true
    }
}

/// Gate one stage on a non-empty item list; log the warning and return
/// `None` when the stage has nothing to work with.
fn gate_stage<T>(log: &RunLog, items: Vec<T>, warning: &str) -> Option<Vec<T>> {
    if items.is_empty() {
        log.append(warning);
        return None;
    }
    Some(items)
}

/// Decide the metafield writes for one product.
///
/// For each metakey the first definition record with that key wins; a
/// `"Files"` definition takes the JSON array of every matching file id, any
/// other type takes the first matching id as a bare value.
pub(crate) fn plan_attachments(
    metakeys: &[String],
    definitions: &[MetafieldDefinitionRecord],
    matches: &[&UploadedFile],
) -> AttachmentPlanning {
    let mut planning = AttachmentPlanning::default();

    for metakey in metakeys {
        let Some(definition) = definitions
            .iter()
            .find(|d| d.key.as_deref() == Some(metakey))
        else {
            planning.missing_keys.push(metakey.clone());
            continue;
        };

        let field_type = definition.field_type.as_deref().unwrap_or("");
        let namespace = definition.namespace.clone().unwrap_or_default();

        let plan = if is_list_alias(field_type) {
            let ids: Vec<&str> = matches.iter().map(|f| f.id.as_str()).collect();
            AttachmentPlan {
                namespace,
                key: metakey.clone(),
                value_type: LIST_FILE_REFERENCE,
                value: serde_json::to_string(&ids).unwrap_or_default(),
            }
        } else {
            let Some(first) = matches.first() else {
                continue;
            };
            AttachmentPlan {
                namespace,
                key: metakey.clone(),
                value_type: FILE_REFERENCE,
                value: first.id.clone(),
            }
        };
        planning.sets.push(plan);
    }

    planning
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(key: &str, field_type: &str) -> MetafieldDefinitionRecord {
        MetafieldDefinitionRecord {
            name: Some(key.to_string()),
            key: Some(key.to_string()),
            description: None,
            namespace: Some("custom".to_string()),
            field_type: Some(field_type.to_string()),
        }
    }

    fn file(id: &str, alt: &str) -> UploadedFile {
        UploadedFile {
            id: id.to_string(),
            file_status: Some("UPLOADED".to_string()),
            alt: Some(alt.to_string()),
        }
    }

    fn temp_log(name: &str) -> RunLog {
        let path =
            std::env::temp_dir().join(format!("catsync-pipeline-{}-{name}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        RunLog::new(path)
    }

    #[test]
    fn scalar_attachment_uses_first_match_only() {
        let definitions = vec![definition("hero_image", "File")];
        let f1 = file("gid://shopify/MediaImage/1", "Blue Mug front");
        let f2 = file("gid://shopify/MediaImage/2", "Blue Mug back");
        let matches = vec![&f1, &f2];

        let planning = plan_attachments(&["hero_image".to_string()], &definitions, &matches);

        assert_eq!(planning.sets.len(), 1);
        assert_eq!(planning.sets[0].value_type, "file_reference");
        assert_eq!(planning.sets[0].value, "gid://shopify/MediaImage/1");
    }

    #[test]
    fn list_attachment_uses_all_matches_in_order() {
        let definitions = vec![definition("gallery", "Files")];
        let f1 = file("gid://shopify/MediaImage/1", "Blue Mug front");
        let f2 = file("gid://shopify/MediaImage/2", "Blue Mug back");
        let matches = vec![&f1, &f2];

        let planning = plan_attachments(&["gallery".to_string()], &definitions, &matches);

        assert_eq!(planning.sets.len(), 1);
        assert_eq!(planning.sets[0].value_type, "list.file_reference");
        assert_eq!(
            planning.sets[0].value,
            "[\"gid://shopify/MediaImage/1\",\"gid://shopify/MediaImage/2\"]"
        );
    }

    #[test]
    fn unknown_metakeys_are_reported_not_planned() {
        let definitions = vec![definition("hero_image", "File")];
        let f1 = file("gid://shopify/MediaImage/1", "Blue Mug");
        let matches = vec![&f1];

        let planning = plan_attachments(
            &["hero_image".to_string(), "nonexistent".to_string()],
            &definitions,
            &matches,
        );

        assert_eq!(planning.sets.len(), 1);
        assert_eq!(planning.missing_keys, ["nonexistent"]);
    }

    #[test]
    fn first_definition_with_a_key_wins() {
        let definitions = vec![
            definition("hero_image", "File"),
            definition("hero_image", "Files"),
        ];
        let f1 = file("gid://shopify/MediaImage/1", "Blue Mug");
        let matches = vec![&f1];

        let planning = plan_attachments(&["hero_image".to_string()], &definitions, &matches);

        assert_eq!(planning.sets[0].value_type, "file_reference");
    }

    #[test]
    fn end_to_end_attachment_plan_for_single_product() {
        // One definition (key hero_image, type File), one uploaded file
        // whose alt matches the product title, one metakey mapping.
        let definitions = vec![definition("hero_image", "File")];
        let files = vec![file("gid://shopify/MediaImage/42", "Blue Mug")];
        let metakeys = MetakeyMap::from_rows([(
            Some("Blue Mug".to_string()),
            Some("hero_image".to_string()),
        )]);

        let keys = metakeys.keys_for("Blue Mug");
        let matches = matching_files(&files, "Blue Mug");
        let planning = plan_attachments(keys, &definitions, &matches);

        assert!(planning.missing_keys.is_empty());
        assert_eq!(
            planning.sets,
            vec![AttachmentPlan {
                namespace: "custom".to_string(),
                key: "hero_image".to_string(),
                value_type: "file_reference",
                value: "gid://shopify/MediaImage/42".to_string(),
            }]
        );
    }

    #[test]
    fn empty_stage_halts_with_a_logged_warning() {
        let log = temp_log("gate-empty");

        let gated: Option<Vec<MetafieldDefinitionRecord>> =
            gate_stage(&log, Vec::new(), "[WARNING] No metafield definitions found in the sheet.");

        assert!(gated.is_none());
        let contents = std::fs::read_to_string(log.path()).expect("log exists");
        assert!(contents.contains("[WARNING] No metafield definitions found in the sheet."));

        let _ = std::fs::remove_file(log.path());
    }

    #[test]
    fn non_empty_stage_passes_through_untouched() {
        let log = temp_log("gate-full");

        let gated = gate_stage(&log, vec![definition("hero_image", "File")], "[WARNING] unused");

        assert_eq!(gated.map(|v| v.len()), Some(1));
        assert!(!log.path().exists());
    }
}
