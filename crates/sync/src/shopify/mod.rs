//! Shopify Admin API client.
//!
//! # Architecture
//!
//! - GraphQL mutations and queries are hand-built `{query, variables}`
//!   bodies decoded through a typed [`GraphQLResponse`] envelope
//! - Product creation goes through the REST `products.json` endpoint,
//!   matching the platform operation the sync consumes
//! - Every operation is one request/response pair; there is no retry or
//!   backoff anywhere in the client
//!
//! Operations report platform "user errors" (structured field/message
//! pairs inside a successful response) in their payload types; callers
//! decide whether those are fatal.

mod files;
mod metafields;
mod products;

pub use files::{FileCreatePayload, FileDeletePayload};
pub(crate) use files::FileCreateInput;
pub use metafields::{
    MetafieldDefinition, MetafieldDefinitionCreatePayload, MetafieldDefinitionDeletePayload,
    MetafieldDefinitionPinPayload, MetafieldsSetPayload,
};
pub use products::{CreatedProduct, ListedProduct, ProductDeletePayload};

use std::future::Future;
use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ShopifyConfig;

/// Page size for cursor-paginated listings.
pub const LIST_PAGE_SIZE: i64 = 100;

/// Errors that can occur when interacting with the Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// The API answered with a non-success status; the body is carried
    /// verbatim so item-level logs can include the platform's report.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Invalid or expired access token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A GraphQL error returned by the Admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

/// A structured user error inside a successful mutation response.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    /// Input field(s) the error refers to.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    /// Human-readable message.
    pub message: String,
}

/// Join user errors into one log-friendly line.
#[must_use]
pub fn join_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| {
            e.field.as_ref().map_or_else(
                || e.message.clone(),
                |field| format!("{}: {}", field.join("."), e.message),
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                e.message.clone()
            } else {
                let path = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                format!("{} (path: {path})", e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decode a list the platform may report as `null` instead of `[]`.
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// One page of a cursor-paginated id listing.
#[derive(Debug, Clone)]
pub struct IdPage {
    /// Ids on this page.
    pub ids: Vec<String>,
    /// Whether another page follows.
    pub has_next_page: bool,
    /// Cursor to pass as `after` for the next page.
    pub end_cursor: Option<String>,
}

/// Connection `pageInfo` as the platform reports it.
#[derive(Debug, Deserialize)]
pub(crate) struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

/// Walk a cursor-paginated listing to exhaustion, accumulating every id.
///
/// `fetch` is called with the cursor of the previous page (`None` for the
/// first) and must return one [`IdPage`]. There is no early termination
/// and nothing is yielded until the final page has been read.
///
/// # Errors
///
/// Propagates the first fetch failure; pages already accumulated are
/// dropped.
pub async fn collect_ids<F, Fut>(mut fetch: F) -> Result<Vec<String>, ShopifyError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<IdPage, ShopifyError>>,
{
    let mut ids = Vec::new();
    let mut cursor = None;

    loop {
        let page = fetch(cursor).await?;
        ids.extend(page.ids);
        if !page.has_next_page {
            return Ok(ids);
        }
        cursor = page.end_cursor;
    }
}

/// Shopify Admin API client.
///
/// Holds a `reqwest` client with the access-token header preconfigured.
/// Cloning is cheap; all clones share the same connection pool.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    graphql_endpoint: String,
    products_endpoint: String,
}

impl ShopifyClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Unauthorized` if the configured token cannot
    /// form a header value, `ShopifyError::Http` if the client fails to
    /// build.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|e| ShopifyError::Unauthorized(format!("invalid access token: {e}")))?;
        token.set_sensitive(true);
        headers.insert("X-Shopify-Access-Token", token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                graphql_endpoint: config.graphql_endpoint(),
                products_endpoint: config.products_endpoint(),
            }),
        })
    }

    /// Execute a GraphQL operation and decode `data` into `T`.
    pub(crate) async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        let response = self
            .inner
            .client
            .post(&self.inner.graphql_endpoint)
            .json(&body)
            .send()
            .await?;

        let envelope: GraphQLResponse<T> = self.handle_response(response).await?;

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(errors));
        }

        envelope.data.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                path: vec![],
            }])
        })
    }

    /// POST a JSON body to the REST products endpoint.
    pub(crate) async fn post_products_rest<T: DeserializeOwned>(
        &self,
        body: &serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.products_endpoint)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Map status codes and decode the body of an Admin API response.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ShopifyError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for ShopifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyClient")
            .field("graphql_endpoint", &self.inner.graphql_endpoint)
            .finish_non_exhaustive()
    }
}
