//! Product operations: REST creation, listing, deletion.

use serde::Deserialize;
use tracing::instrument;

use catalog_sync_core::ProductRecord;

use super::{IdPage, LIST_PAGE_SIZE, ShopifyClient, ShopifyError, UserError};

const PRODUCTS_QUERY: &str = r"
query listProducts($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    edges {
      node {
        id
        title
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

const PRODUCT_DELETE_MUTATION: &str = r"
mutation productDelete($input: ProductDeleteInput!) {
  productDelete(input: $input) {
    deletedProductId
    userErrors {
      field
      message
    }
  }
}
";

/// Product as returned by the REST creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedProduct {
    /// Numeric REST id.
    pub id: u64,
    /// GraphQL gid, used as the metafield owner id.
    pub admin_graphql_api_id: String,
    /// Title as stored by the platform.
    pub title: Option<String>,
}

/// Product summary from the paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedProduct {
    pub id: String,
    pub title: Option<String>,
}

/// `productDelete` mutation payload.
#[derive(Debug, Deserialize)]
pub struct ProductDeletePayload {
    #[serde(rename = "deletedProductId")]
    pub deleted_product_id: Option<String>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct ProductCreateResponse {
    product: CreatedProduct,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: ProductConnection,
}

#[derive(Debug, Deserialize)]
struct ProductConnection {
    edges: Vec<ProductEdge>,
    #[serde(rename = "pageInfo")]
    page_info: super::PageInfo,
}

#[derive(Debug, Deserialize)]
struct ProductEdge {
    node: ListedProduct,
}

#[derive(Debug, Deserialize)]
struct ProductDeleteData {
    #[serde(rename = "productDelete")]
    product_delete: Option<ProductDeletePayload>,
}

/// Build the REST `products.json` body for one record: one variant
/// carrying the price and the product code as SKU.
#[must_use]
pub(crate) fn product_payload(record: &ProductRecord) -> serde_json::Value {
    serde_json::json!({
        "product": {
            "title": record.title,
            "body_html": record.description,
            "variants": [
                {
                    "price": record.price,
                    "sku": record.product_code,
                }
            ],
        }
    })
}

impl ShopifyClient {
    /// Create a product via the REST endpoint.
    ///
    /// # Errors
    ///
    /// Transport failures and non-success statuses surface as
    /// `ShopifyError`; the error carries the serialized response body so
    /// the caller can log the platform's report verbatim.
    #[instrument(skip(self, record), fields(title = record.title.as_deref().unwrap_or("")))]
    pub async fn create_product(
        &self,
        record: &ProductRecord,
    ) -> Result<CreatedProduct, ShopifyError> {
        let response: ProductCreateResponse =
            self.post_products_rest(&product_payload(record)).await?;
        Ok(response.product)
    }

    /// One page of the products listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL errors.
    pub async fn list_products_page(
        &self,
        after: Option<String>,
    ) -> Result<(Vec<ListedProduct>, IdPage), ShopifyError> {
        let data: ProductsData = self
            .graphql(
                PRODUCTS_QUERY,
                serde_json::json!({ "first": LIST_PAGE_SIZE, "after": after }),
            )
            .await?;

        let products: Vec<ListedProduct> =
            data.products.edges.into_iter().map(|e| e.node).collect();
        let page = IdPage {
            ids: products.iter().map(|p| p.id.clone()).collect(),
            has_next_page: data.products.page_info.has_next_page,
            end_cursor: data.products.page_info.end_cursor,
        };
        Ok((products, page))
    }

    /// Delete one product by gid.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL errors;
    /// user errors come back inside the payload.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &str) -> Result<ProductDeletePayload, ShopifyError> {
        let data: ProductDeleteData = self
            .graphql(
                PRODUCT_DELETE_MUTATION,
                serde_json::json!({ "input": { "id": id } }),
            )
            .await?;

        data.product_delete.ok_or_else(|| {
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "productDelete returned no payload".to_string(),
                path: vec![],
            }])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_maps_record_fields() {
        let record = ProductRecord {
            product_code: Some("BM-01".to_string()),
            title: Some("Blue Mug".to_string()),
            description: Some("<p>A mug.</p>".to_string()),
            price: Some("12.50".to_string()),
        };

        let payload = product_payload(&record);
        assert_eq!(payload["product"]["title"], "Blue Mug");
        assert_eq!(payload["product"]["body_html"], "<p>A mug.</p>");
        assert_eq!(payload["product"]["variants"][0]["price"], "12.50");
        assert_eq!(payload["product"]["variants"][0]["sku"], "BM-01");
    }

    #[test]
    fn payload_serializes_missing_cells_as_null() {
        let payload = product_payload(&ProductRecord::default());
        assert!(payload["product"]["title"].is_null());
        assert!(payload["product"]["variants"][0]["sku"].is_null());
    }

    #[test]
    fn created_product_deserializes_rest_shape() {
        let response: ProductCreateResponse = serde_json::from_value(serde_json::json!({
            "product": {
                "id": 820_910_929_952_u64,
                "admin_graphql_api_id": "gid://shopify/Product/820910929952",
                "title": "Blue Mug",
                "handle": "blue-mug"
            }
        }))
        .expect("REST product payload");

        assert_eq!(
            response.product.admin_graphql_api_id,
            "gid://shopify/Product/820910929952"
        );
        assert_eq!(response.product.title.as_deref(), Some("Blue Mug"));
    }
}
