//! Google Sheets reader.
//!
//! Fetches the four fixed source tabs over the Sheets v4 REST API and
//! projects their rows into typed records. Any network or auth failure
//! while loading a tab is fatal to the run; a missing column in a loaded
//! tab is not.
//!
//! # Tabs
//!
//! | index | content                     |
//! |-------|-----------------------------|
//! | 0     | products                    |
//! | 1     | metafield definitions       |
//! | 2     | images                      |
//! | 3     | product / metakey pairs     |

mod auth;
mod table;

pub use table::SheetTable;

use serde::Deserialize;
use thiserror::Error;

use catalog_sync_core::{
    ImageRecord, MetafieldDefinitionRecord, MetakeyMap, ProductRecord,
};

use crate::config::GoogleSheetsConfig;

/// Sheets v4 API base URL.
const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Tab index of the products sheet.
pub const PRODUCTS_TAB: usize = 0;
/// Tab index of the metafield definitions sheet.
pub const METAFIELDS_TAB: usize = 1;
/// Tab index of the images sheet.
pub const IMAGES_TAB: usize = 2;
/// Tab index of the product/metakey mapping sheet.
pub const METAKEYS_TAB: usize = 3;

/// Errors that can occur while reading the source spreadsheet.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service-account authentication failed.
    #[error("Sheets auth error: {0}")]
    Auth(String),

    /// The API answered with a non-success status.
    #[error("Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The document has no worksheet at the requested index.
    #[error("No worksheet at index {0}")]
    MissingTab(usize),
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Client for the source spreadsheet.
pub struct SheetsClient {
    client: reqwest::Client,
    config: GoogleSheetsConfig,
}

impl SheetsClient {
    /// Create a reader for the configured spreadsheet.
    #[must_use]
    pub fn new(config: GoogleSheetsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Load one worksheet tab by positional index.
    ///
    /// # Errors
    ///
    /// Fatal on any transport, auth, or API failure, and when the document
    /// has fewer tabs than `index + 1`.
    pub async fn read_tab(&self, index: usize) -> Result<SheetTable, SheetsError> {
        let token = auth::fetch_access_token(&self.client, &self.config).await?;

        let title = self.tab_title(&token, index).await?;
        let values = self.tab_values(&token, &title).await?;

        Ok(SheetTable::from_values(values))
    }

    /// Products tab (index 0) as typed records.
    ///
    /// # Errors
    ///
    /// Fatal on any failure to load the tab.
    pub async fn read_products(&self) -> Result<Vec<ProductRecord>, SheetsError> {
        let table = self.read_tab(PRODUCTS_TAB).await?;
        Ok(products_from_table(&table))
    }

    /// Metafield definitions tab (index 1) as typed records.
    ///
    /// # Errors
    ///
    /// Fatal on any failure to load the tab.
    pub async fn read_metafield_definitions(
        &self,
    ) -> Result<Vec<MetafieldDefinitionRecord>, SheetsError> {
        let table = self.read_tab(METAFIELDS_TAB).await?;
        Ok(definitions_from_table(&table))
    }

    /// Images tab (index 2) as typed records.
    ///
    /// # Errors
    ///
    /// Fatal on any failure to load the tab.
    pub async fn read_images(&self) -> Result<Vec<ImageRecord>, SheetsError> {
        let table = self.read_tab(IMAGES_TAB).await?;
        Ok(images_from_table(&table))
    }

    /// Product/metakey pairs tab (index 3), fanned out into the title map.
    ///
    /// # Errors
    ///
    /// Fatal on any failure to load the tab.
    pub async fn read_metakey_map(&self) -> Result<MetakeyMap, SheetsError> {
        let table = self.read_tab(METAKEYS_TAB).await?;
        Ok(metakey_map_from_table(&table))
    }

    async fn tab_title(&self, token: &str, index: usize) -> Result<String, SheetsError> {
        let url = format!(
            "{BASE_URL}/{}?fields=sheets.properties.title",
            self.config.sheet_id
        );
        let meta: SpreadsheetMeta = self.get_json(token, &url).await?;

        meta.sheets
            .into_iter()
            .nth(index)
            .map(|sheet| sheet.properties.title)
            .ok_or(SheetsError::MissingTab(index))
    }

    async fn tab_values(&self, token: &str, title: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        // Worksheet titles routinely contain spaces.
        let url = format!(
            "{BASE_URL}/{}/values/{}",
            self.config.sheet_id,
            urlencoding::encode(title)
        );
        let range: ValueRange = self.get_json(token, &url).await?;
        Ok(range.values)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> Result<T, SheetsError> {
        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

fn products_from_table(table: &SheetTable) -> Vec<ProductRecord> {
    let product_code = table.column("productCode");
    let title = table.column("title");
    let description = table.column("description");
    let price = table.column("price");

    table
        .rows()
        .iter()
        .map(|row| ProductRecord {
            product_code: SheetTable::value(row, product_code),
            title: SheetTable::value(row, title),
            description: SheetTable::value(row, description),
            price: SheetTable::value(row, price),
        })
        .collect()
}

fn definitions_from_table(table: &SheetTable) -> Vec<MetafieldDefinitionRecord> {
    let name = table.column("name");
    let key = table.column("key");
    let description = table.column("description");
    let namespace = table.column("namespace");
    let field_type = table.column("type");

    table
        .rows()
        .iter()
        .map(|row| MetafieldDefinitionRecord {
            name: SheetTable::value(row, name),
            key: SheetTable::value(row, key),
            description: SheetTable::value(row, description),
            namespace: SheetTable::value(row, namespace),
            field_type: SheetTable::value(row, field_type),
        })
        .collect()
}

fn images_from_table(table: &SheetTable) -> Vec<ImageRecord> {
    let image = table.column("image");
    let alt = table.column("alt");

    table
        .rows()
        .iter()
        .map(|row| ImageRecord {
            image: SheetTable::value(row, image),
            alt: SheetTable::value(row, alt),
        })
        .collect()
}

fn metakey_map_from_table(table: &SheetTable) -> MetakeyMap {
    let title = table.column("productTitle");
    let metakey = table.column("metakey");

    MetakeyMap::from_rows(table.rows().iter().map(|row| {
        (
            SheetTable::value(row, title),
            SheetTable::value(row, metakey),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_project_through_headers() {
        let table = SheetTable::from_values(vec![
            vec![
                "productCode".into(),
                "title".into(),
                "description".into(),
                "price".into(),
            ],
            vec!["BM-01".into(), "Blue Mug".into(), "A mug.".into(), "12.50".into()],
        ]);

        let products = products_from_table(&table);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_code.as_deref(), Some("BM-01"));
        assert_eq!(products[0].price.as_deref(), Some("12.50"));
    }

    #[test]
    fn missing_headers_resolve_to_none() {
        // No price column at all, and the second row is short of the
        // description column.
        let table = SheetTable::from_values(vec![
            vec!["title".into(), "description".into()],
            vec!["Blue Mug".into(), "A mug.".into()],
            vec!["Red Mug".into()],
        ]);

        let products = products_from_table(&table);
        assert_eq!(products[0].price, None);
        assert_eq!(products[0].description.as_deref(), Some("A mug."));
        assert_eq!(products[1].description, None);
        assert_eq!(products[1].title.as_deref(), Some("Red Mug"));
    }

    #[test]
    fn definitions_keep_raw_type_value() {
        let table = SheetTable::from_values(vec![
            vec![
                "name".into(),
                "key".into(),
                "namespace".into(),
                "type".into(),
            ],
            vec!["Hero".into(), "hero_image".into(), "custom".into(), "File".into()],
        ]);

        let defs = definitions_from_table(&table);
        assert_eq!(defs[0].field_type.as_deref(), Some("File"));
        assert_eq!(defs[0].description, None);
    }

    #[test]
    fn metakey_map_fans_out_titles() {
        let table = SheetTable::from_values(vec![
            vec!["metakey".into(), "productTitle".into()],
            vec!["hero_image".into(), "Blue Mug, Red Mug".into()],
            vec!["gallery".into(), "Blue Mug".into()],
        ]);

        let map = metakey_map_from_table(&table);
        assert_eq!(map.keys_for("Blue Mug"), ["hero_image", "gallery"]);
        assert_eq!(map.keys_for("Red Mug"), ["hero_image"]);
    }

    #[test]
    fn value_range_defaults_to_empty_values() {
        let range: ValueRange = serde_json::from_value(serde_json::json!({
            "range": "Sheet1!A1:Z1000",
            "majorDimension": "ROWS"
        }))
        .expect("empty tabs omit the values key");

        assert!(range.values.is_empty());
    }
}
