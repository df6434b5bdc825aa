//! File operations: batch upload, paginated listing, batch deletion.

use serde::Deserialize;
use tracing::instrument;

use catalog_sync_core::UploadedFile;

use super::{IdPage, LIST_PAGE_SIZE, ShopifyClient, ShopifyError, UserError};

const FILE_CREATE_MUTATION: &str = r"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files {
      id
      fileStatus
      alt
    }
    userErrors {
      field
      message
    }
  }
}
";

const FILES_QUERY: &str = r"
query listFiles($first: Int!, $after: String) {
  files(first: $first, after: $after) {
    edges {
      node {
        id
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

const FILE_DELETE_MUTATION: &str = r"
mutation fileDelete($fileIds: [ID!]!) {
  fileDelete(fileIds: $fileIds) {
    deletedFileIds
    userErrors {
      field
      message
    }
  }
}
";

/// Input for one file in a `fileCreate` batch.
#[derive(Debug, Clone)]
pub(crate) struct FileCreateInput {
    pub original_source: String,
    pub alt: String,
}

/// `fileCreate` mutation payload.
#[derive(Debug, Deserialize)]
pub struct FileCreatePayload {
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

/// `fileDelete` mutation payload.
#[derive(Debug, Deserialize)]
pub struct FileDeletePayload {
    #[serde(
        rename = "deletedFileIds",
        default,
        deserialize_with = "super::nullable_vec"
    )]
    pub deleted_file_ids: Vec<String>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct FileCreateData {
    #[serde(rename = "fileCreate")]
    file_create: Option<FileCreatePayload>,
}

#[derive(Debug, Deserialize)]
struct FilesData {
    files: FileConnection,
}

#[derive(Debug, Deserialize)]
struct FileConnection {
    edges: Vec<FileEdge>,
    #[serde(rename = "pageInfo")]
    page_info: super::PageInfo,
}

#[derive(Debug, Deserialize)]
struct FileEdge {
    node: FileNode,
}

#[derive(Debug, Deserialize)]
struct FileNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FileDeleteData {
    #[serde(rename = "fileDelete")]
    file_delete: Option<FileDeletePayload>,
}

impl ShopifyClient {
    /// Upload one batch of image files.
    ///
    /// All inputs go out in a single `fileCreate` call with
    /// `contentType: IMAGE`. Filtering of invalid inputs is the caller's
    /// concern; everything passed here is submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL
    /// errors; user errors come back inside the payload.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub(crate) async fn upload_files(
        &self,
        files: &[FileCreateInput],
    ) -> Result<FileCreatePayload, ShopifyError> {
        let inputs: Vec<serde_json::Value> = files
            .iter()
            .map(|file| {
                serde_json::json!({
                    "originalSource": file.original_source,
                    "alt": file.alt,
                    "contentType": "IMAGE",
                })
            })
            .collect();

        let data: FileCreateData = self
            .graphql(FILE_CREATE_MUTATION, serde_json::json!({ "files": inputs }))
            .await?;

        data.file_create.ok_or_else(|| {
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "fileCreate returned no payload".to_string(),
                path: vec![],
            }])
        })
    }

    /// One page of the files listing (ids only).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL errors.
    pub async fn list_files_page(&self, after: Option<String>) -> Result<IdPage, ShopifyError> {
        let data: FilesData = self
            .graphql(
                FILES_QUERY,
                serde_json::json!({ "first": LIST_PAGE_SIZE, "after": after }),
            )
            .await?;

        Ok(IdPage {
            ids: data.files.edges.into_iter().map(|e| e.node.id).collect(),
            has_next_page: data.files.page_info.has_next_page,
            end_cursor: data.files.page_info.end_cursor,
        })
    }

    /// Every file id in the store, across all pages.
    ///
    /// # Errors
    ///
    /// Propagates the first page fetch that fails.
    pub async fn list_file_ids(&self) -> Result<Vec<String>, ShopifyError> {
        super::collect_ids(|after| self.list_files_page(after)).await
    }

    /// Delete one batch of files by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL
    /// errors; user errors come back inside the payload.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_files(&self, ids: &[String]) -> Result<FileDeletePayload, ShopifyError> {
        let data: FileDeleteData = self
            .graphql(FILE_DELETE_MUTATION, serde_json::json!({ "fileIds": ids }))
            .await?;

        data.file_delete.ok_or_else(|| {
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "fileDelete returned no payload".to_string(),
                path: vec![],
            }])
        })
    }
}
