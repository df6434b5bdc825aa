//! Metafield definition and metafield value operations.

use serde::Deserialize;
use tracing::instrument;

use catalog_sync_core::{MetafieldDefinitionRecord, metafield::resolve_metafield_type};

use super::{LIST_PAGE_SIZE, ShopifyClient, ShopifyError, UserError};

const DEFINITION_CREATE_MUTATION: &str = r"
mutation createMetafieldDefinition($definition: MetafieldDefinitionInput!) {
  metafieldDefinitionCreate(definition: $definition) {
    createdDefinition {
      id
      name
      namespace
      key
    }
    userErrors {
      field
      message
    }
  }
}
";

const DEFINITION_PIN_MUTATION: &str = r"
mutation metafieldDefinitionPin($definitionId: ID!) {
  metafieldDefinitionPin(definitionId: $definitionId) {
    pinnedDefinition {
      name
      key
      namespace
    }
    userErrors {
      field
      message
    }
  }
}
";

const DEFINITIONS_QUERY: &str = r"
query listMetafieldDefinitions($first: Int!) {
  metafieldDefinitions(first: $first, ownerType: PRODUCT) {
    edges {
      node {
        id
        name
        namespace
        key
      }
    }
  }
}
";

const DEFINITION_DELETE_MUTATION: &str = r"
mutation deleteMetafieldDefinition($id: ID!, $deleteAllAssociatedMetafields: Boolean!) {
  metafieldDefinitionDelete(id: $id, deleteAllAssociatedMetafields: $deleteAllAssociatedMetafields) {
    deletedDefinitionId
    userErrors {
      field
      message
    }
  }
}
";

const METAFIELDS_SET_MUTATION: &str = r"
mutation metafieldsSet($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      id
      key
      namespace
      value
      type
    }
    userErrors {
      field
      message
    }
  }
}
";

/// A metafield definition as the platform reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct MetafieldDefinition {
    pub id: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub key: Option<String>,
}

/// `metafieldDefinitionCreate` mutation payload.
#[derive(Debug, Deserialize)]
pub struct MetafieldDefinitionCreatePayload {
    #[serde(rename = "createdDefinition")]
    pub created_definition: Option<MetafieldDefinition>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

/// `metafieldDefinitionPin` mutation payload.
#[derive(Debug, Deserialize)]
pub struct MetafieldDefinitionPinPayload {
    #[serde(rename = "pinnedDefinition")]
    pub pinned_definition: Option<MetafieldDefinition>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

/// `metafieldDefinitionDelete` mutation payload.
#[derive(Debug, Deserialize)]
pub struct MetafieldDefinitionDeletePayload {
    #[serde(rename = "deletedDefinitionId")]
    pub deleted_definition_id: Option<String>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

/// `metafieldsSet` mutation payload.
#[derive(Debug, Deserialize)]
pub struct MetafieldsSetPayload {
    #[serde(default, deserialize_with = "super::nullable_vec")]
    pub metafields: Vec<SetMetafield>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

/// One metafield written by `metafieldsSet`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetMetafield {
    pub id: String,
    pub key: String,
    pub namespace: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

#[derive(Debug, Deserialize)]
struct DefinitionCreateData {
    #[serde(rename = "metafieldDefinitionCreate")]
    metafield_definition_create: Option<MetafieldDefinitionCreatePayload>,
}

#[derive(Debug, Deserialize)]
struct DefinitionPinData {
    #[serde(rename = "metafieldDefinitionPin")]
    metafield_definition_pin: Option<MetafieldDefinitionPinPayload>,
}

#[derive(Debug, Deserialize)]
struct DefinitionsData {
    #[serde(rename = "metafieldDefinitions")]
    metafield_definitions: DefinitionConnection,
}

#[derive(Debug, Deserialize)]
struct DefinitionConnection {
    edges: Vec<DefinitionEdge>,
}

#[derive(Debug, Deserialize)]
struct DefinitionEdge {
    node: MetafieldDefinition,
}

#[derive(Debug, Deserialize)]
struct DefinitionDeleteData {
    #[serde(rename = "metafieldDefinitionDelete")]
    metafield_definition_delete: Option<MetafieldDefinitionDeletePayload>,
}

#[derive(Debug, Deserialize)]
struct MetafieldsSetData {
    #[serde(rename = "metafieldsSet")]
    metafields_set: Option<MetafieldsSetPayload>,
}

/// Build the `definition` input for one sheet record, applying the
/// canonical `File` / `Files` type aliases and the fixed PRODUCT owner.
#[must_use]
pub(crate) fn definition_input(record: &MetafieldDefinitionRecord) -> serde_json::Value {
    let field_type = record
        .field_type
        .as_deref()
        .map(resolve_metafield_type);

    serde_json::json!({
        "name": record.name,
        "namespace": record.namespace,
        "key": record.key,
        "description": record.description.as_deref().unwrap_or(""),
        "type": field_type,
        "ownerType": "PRODUCT",
    })
}

impl ShopifyClient {
    /// Create one metafield definition from a sheet record.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL
    /// errors; user errors come back inside the payload.
    #[instrument(skip(self, record), fields(name = record.name.as_deref().unwrap_or("")))]
    pub async fn create_metafield_definition(
        &self,
        record: &MetafieldDefinitionRecord,
    ) -> Result<MetafieldDefinitionCreatePayload, ShopifyError> {
        let data: DefinitionCreateData = self
            .graphql(
                DEFINITION_CREATE_MUTATION,
                serde_json::json!({ "definition": definition_input(record) }),
            )
            .await?;

        data.metafield_definition_create.ok_or_else(|| {
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "metafieldDefinitionCreate returned no payload".to_string(),
                path: vec![],
            }])
        })
    }

    /// Pin a definition so it shows in the admin UI. Best-effort; callers
    /// log user errors and move on.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL errors.
    #[instrument(skip(self), fields(definition_id = %id))]
    pub async fn pin_metafield_definition(
        &self,
        id: &str,
    ) -> Result<MetafieldDefinitionPinPayload, ShopifyError> {
        let data: DefinitionPinData = self
            .graphql(
                DEFINITION_PIN_MUTATION,
                serde_json::json!({ "definitionId": id }),
            )
            .await?;

        data.metafield_definition_pin.ok_or_else(|| {
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "metafieldDefinitionPin returned no payload".to_string(),
                path: vec![],
            }])
        })
    }

    /// All product metafield definitions (single page of 100).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL errors.
    pub async fn list_metafield_definitions(
        &self,
    ) -> Result<Vec<MetafieldDefinition>, ShopifyError> {
        let data: DefinitionsData = self
            .graphql(
                DEFINITIONS_QUERY,
                serde_json::json!({ "first": LIST_PAGE_SIZE }),
            )
            .await?;

        Ok(data
            .metafield_definitions
            .edges
            .into_iter()
            .map(|e| e.node)
            .collect())
    }

    /// Delete one definition, cascading all metafields it governs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL
    /// errors; user errors come back inside the payload.
    #[instrument(skip(self), fields(definition_id = %id))]
    pub async fn delete_metafield_definition(
        &self,
        id: &str,
    ) -> Result<MetafieldDefinitionDeletePayload, ShopifyError> {
        let data: DefinitionDeleteData = self
            .graphql(
                DEFINITION_DELETE_MUTATION,
                serde_json::json!({ "id": id, "deleteAllAssociatedMetafields": true }),
            )
            .await?;

        data.metafield_definition_delete.ok_or_else(|| {
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "metafieldDefinitionDelete returned no payload".to_string(),
                path: vec![],
            }])
        })
    }

    /// Set one metafield value on an owner.
    ///
    /// `value_type` is explicit (`file_reference` or
    /// `list.file_reference`); list values must already be JSON-encoded
    /// arrays of ids, scalar values a bare id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or reports GraphQL
    /// errors; user errors come back inside the payload.
    #[instrument(skip(self, value), fields(owner_id = %owner_id, key = %key))]
    pub async fn set_metafield(
        &self,
        owner_id: &str,
        namespace: &str,
        key: &str,
        value_type: &str,
        value: &str,
    ) -> Result<MetafieldsSetPayload, ShopifyError> {
        let data: MetafieldsSetData = self
            .graphql(
                METAFIELDS_SET_MUTATION,
                serde_json::json!({
                    "metafields": [{
                        "ownerId": owner_id,
                        "namespace": namespace,
                        "key": key,
                        "type": value_type,
                        "value": value,
                    }]
                }),
            )
            .await?;

        data.metafields_set.ok_or_else(|| {
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "metafieldsSet returned no payload".to_string(),
                path: vec![],
            }])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(field_type: &str) -> MetafieldDefinitionRecord {
        MetafieldDefinitionRecord {
            name: Some("Hero Image".to_string()),
            key: Some("hero_image".to_string()),
            description: None,
            namespace: Some("custom".to_string()),
            field_type: Some(field_type.to_string()),
        }
    }

    #[test]
    fn definition_input_aliases_file_types() {
        assert_eq!(definition_input(&record("File"))["type"], "file_reference");
        assert_eq!(
            definition_input(&record("Files"))["type"],
            "list.file_reference"
        );
        assert_eq!(
            definition_input(&record("single_line_text_field"))["type"],
            "single_line_text_field"
        );
    }

    #[test]
    fn definition_input_fixes_owner_and_defaults_description() {
        let input = definition_input(&record("File"));
        assert_eq!(input["ownerType"], "PRODUCT");
        assert_eq!(input["description"], "");
    }

    #[test]
    fn create_payload_carries_user_errors() {
        let data: DefinitionCreateData = serde_json::from_value(serde_json::json!({
            "metafieldDefinitionCreate": {
                "createdDefinition": null,
                "userErrors": [
                    { "field": ["definition", "key"], "message": "Key is in use" }
                ]
            }
        }))
        .expect("create payload");

        let payload = data.metafield_definition_create.expect("payload present");
        assert!(payload.created_definition.is_none());
        assert_eq!(payload.user_errors.len(), 1);
        assert_eq!(payload.user_errors[0].message, "Key is in use");
    }
}
