//! Row records for the four source spreadsheet tabs.

use serde::{Deserialize, Serialize};

/// One row of the products tab (tab 0).
///
/// Consumed exactly once to create a Shopify product; `product_code` maps
/// to the variant SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// SKU for the single created variant.
    pub product_code: Option<String>,
    /// Product title; also the matching key against file alt text.
    pub title: Option<String>,
    /// Product description (rendered as body HTML).
    pub description: Option<String>,
    /// Variant price, kept as the raw cell string.
    pub price: Option<String>,
}

/// One row of the metafield definitions tab (tab 1).
///
/// `field_type` holds the raw sheet value (`"File"`, `"Files"`, or a plain
/// Shopify metafield type); aliasing to platform reference types happens in
/// [`crate::metafield::resolve_metafield_type`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafieldDefinitionRecord {
    pub name: Option<String>,
    pub key: Option<String>,
    pub description: Option<String>,
    pub namespace: Option<String>,
    pub field_type: Option<String>,
}

/// One row of the images tab (tab 2).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Source URL of the image. Rows without one are skipped at upload.
    pub image: Option<String>,
    /// Alt text; matched against product titles after upload.
    pub alt: Option<String>,
}

/// A file created on the platform by a `fileCreate` batch.
///
/// Held in memory for the duration of a run so uploaded files can be
/// matched against product titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Platform file id (`gid://shopify/...`).
    pub id: String,
    /// Processing status reported at creation time.
    #[serde(default, rename = "fileStatus")]
    pub file_status: Option<String>,
    /// Alt text carried over from the source [`ImageRecord`].
    #[serde(default)]
    pub alt: Option<String>,
}
