//! The subset of OpenAPI 3 needed to describe RPC commands.
//!
//! Every command is a `POST` to `/<command>` whose JSON request body is the
//! message `data` and whose `200` response is the reply `data`.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{CodegenError, Result};

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// A parsed OpenAPI document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// OpenAPI version, e.g. `3.0.3`
    pub openapi: String,
    /// Title and version of the described API
    #[serde(default)]
    pub info: Info,
    /// Operations keyed by path, in document order
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable schemas
    #[serde(default)]
    pub components: Components,
}

/// Document metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    /// API title
    #[serde(default)]
    pub title: String,
    /// API version
    #[serde(default)]
    pub version: String,
}

/// Operations on one path. Only `POST` is meaningful for RPC commands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// The `POST` operation, if any
    pub post: Option<Operation>,
}

/// One operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    /// Explicit operation name
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// One line summary
    pub summary: Option<String>,
    /// Longer description
    pub description: Option<String>,
    /// Request body
    #[serde(rename = "requestBody")]
    pub request_body: Option<Body>,
    /// Responses keyed by status code
    #[serde(default)]
    pub responses: IndexMap<String, Body>,
}

/// A request or response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Body {
    /// Human readable description
    #[serde(default)]
    pub description: String,
    /// Schemas keyed by media type
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl Body {
    /// Schema of the JSON content, falling back to the first media type.
    pub fn schema(&self) -> Option<&Schema> {
        self.content
            .get("application/json")
            .or_else(|| self.content.values().next())
            .and_then(|media| media.schema.as_ref())
    }
}

/// Content of one media type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Its schema
    pub schema: Option<Schema>,
}

/// A JSON schema, reduced to what maps onto Rust types.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    /// `integer`, `number`, `boolean`, `string`, `array` or `object`
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// Reference to a component schema
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Element schema of an array
    pub items: Option<Box<Schema>>,
    /// Object properties, in document order
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,
    /// Names of the required properties
    #[serde(default)]
    pub required: Vec<String>,
    /// Human readable description
    pub description: Option<String>,
}

/// Reusable document parts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    /// Schemas addressed by `#/components/schemas/<name>`
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

impl Document {
    /// Parses a document; JSON is recognised by its leading `{`, anything
    /// else is read as YAML.
    pub fn parse(source: &str) -> Result<Self> {
        if source.trim_start().starts_with('{') {
            Ok(serde_json::from_str(source)?)
        } else {
            Ok(serde_yaml::from_str(source)?)
        }
    }

    /// Follows `$ref` links until a concrete schema is reached.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema> {
        let mut current = schema;
        let mut hops = 0;
        while let Some(reference) = &current.reference {
            hops += 1;
            if hops > self.components.schemas.len() {
                return Err(CodegenError::UnresolvedRef(reference.clone()));
            }
            current = reference
                .strip_prefix(SCHEMA_REF_PREFIX)
                .and_then(|name| self.components.schemas.get(name))
                .ok_or_else(|| CodegenError::UnresolvedRef(reference.clone()))?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
openapi: 3.0.3
info:
  title: Full node
  version: 2.4.0
paths:
  /get_network_space:
    post:
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/SpaceRequest'
      responses:
        '200':
          description: ok
components:
  schemas:
    SpaceRequest:
      type: object
      properties:
        newer_block_header_hash: { type: string }
        older_block_header_hash: { type: string }
"#;

    #[test]
    fn test_parse_yaml_and_resolve() {
        let doc = Document::parse(YAML).expect("parse");
        assert_eq!(doc.info.title, "Full node");
        let op = doc.paths["/get_network_space"].post.as_ref().expect("post");
        let schema = op.request_body.as_ref().and_then(Body::schema).expect("schema");
        let resolved = doc.resolve(schema).expect("resolve");
        let names: Vec<&String> = resolved.properties.keys().collect();
        assert_eq!(names, ["newer_block_header_hash", "older_block_header_hash"]);
    }

    #[test]
    fn test_parse_json() {
        let doc = Document::parse(r#"{"openapi": "3.1.0", "paths": {"/healthz": {"post": {}}}}"#)
            .expect("parse");
        assert!(doc.paths["/healthz"].post.is_some());
    }

    #[test]
    fn test_reference_errors() {
        let doc = Document::parse("openapi: 3.0.0\ncomponents:\n  schemas:\n    A: { $ref: '#/components/schemas/A' }\n")
            .expect("parse");
        let missing = Schema { reference: Some("#/components/schemas/B".into()), ..Schema::default() };
        assert!(matches!(doc.resolve(&missing), Err(CodegenError::UnresolvedRef(_))));
        let cyclic = Schema { reference: Some("#/components/schemas/A".into()), ..Schema::default() };
        assert!(matches!(doc.resolve(&cyclic), Err(CodegenError::UnresolvedRef(_))));
    }
}
