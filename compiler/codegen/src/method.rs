//! Proxy methods derived from OpenAPI operations.

use std::collections::HashMap;
use std::fmt;

use crate::openapi::{Body, Document, Schema};
use crate::utils::{sanitize_external_identifier, to_method_name};
use crate::{CodegenError, Result};

/// Rust type of a parameter or response field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// `integer`
    U64,
    /// `number`
    F64,
    /// `boolean`
    Bool,
    /// `string`
    String,
    /// `array`
    Vec(Box<RustType>),
    /// Objects, references and untyped schemas
    Value,
}

impl RustType {
    /// Maps a schema onto a Rust type.
    pub fn from_schema(schema: &Schema) -> Self {
        if schema.reference.is_some() {
            return RustType::Value;
        }
        match schema.schema_type.as_deref() {
            Some("integer") => RustType::U64,
            Some("number") => RustType::F64,
            Some("boolean") => RustType::Bool,
            Some("string") => RustType::String,
            Some("array") => RustType::Vec(Box::new(
                schema.items.as_deref().map(RustType::from_schema).unwrap_or(RustType::Value),
            )),
            _ => RustType::Value,
        }
    }

    /// How the type is taken as an argument: strings, slices and JSON by
    /// reference, scalars by value.
    pub fn argument(&self) -> String {
        match self {
            RustType::String => "&str".to_string(),
            RustType::Vec(inner) => format!("&[{inner}]"),
            RustType::Value => "&serde_json::Value".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RustType::U64 => f.write_str("u64"),
            RustType::F64 => f.write_str("f64"),
            RustType::Bool => f.write_str("bool"),
            RustType::String => f.write_str("String"),
            RustType::Vec(inner) => write!(f, "Vec<{inner}>"),
            RustType::Value => f.write_str("serde_json::Value"),
        }
    }
}

/// One request body property.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Key in the request `data`
    pub name: String,
    /// Rust identifier
    pub ident: String,
    /// Rust type
    pub rust_type: RustType,
    /// Whether the service requires it
    pub required: bool,
    /// Schema description
    pub description: Option<String>,
}

/// Field of the reply `data` a method returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseField {
    /// Key in the reply `data`
    pub name: String,
    /// Rust type
    pub rust_type: RustType,
}

/// A proxy method to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyMethod {
    /// Rust method name
    pub name: String,
    /// Command sent to the service
    pub command: String,
    /// Operation summary
    pub summary: Option<String>,
    /// Operation description
    pub description: Option<String>,
    /// Request properties, required ones first
    pub params: Vec<Param>,
    /// Unwrapped reply field; `None` means the method only checks success
    pub response: Option<ResponseField>,
}

/// Builds one method per `POST` operation, in document order.
///
/// Paths without a `POST` operation are skipped.
pub fn collect_methods(doc: &Document) -> Result<Vec<ProxyMethod>> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut methods = Vec::new();

    for (path, item) in &doc.paths {
        let Some(op) = &item.post else { continue };
        let command = path.trim_matches('/').rsplit('/').next().unwrap_or_default().to_string();
        if command.is_empty() {
            return Err(CodegenError::InvalidPath(path.clone()));
        }
        let name = to_method_name(op.operation_id.as_deref().unwrap_or(&command));
        if let Some(other) = seen.insert(name.clone(), path.clone()) {
            return Err(CodegenError::DuplicateMethod { method: name, path: path.clone(), other });
        }

        methods.push(ProxyMethod {
            name: sanitize_external_identifier(&name),
            command: command.clone(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            params: params(doc, &command, op.request_body.as_ref())?,
            response: response_field(doc, op.responses.get("200"))?,
        });
    }

    if methods.is_empty() {
        return Err(CodegenError::NoOperations);
    }
    Ok(methods)
}

/// Argument name for a request property; `data` is the generated payload local.
fn argument_ident(name: &str) -> String {
    match sanitize_external_identifier(name) {
        ident if ident == "data" => "data_".to_string(),
        ident => ident,
    }
}

fn params(doc: &Document, command: &str, body: Option<&Body>) -> Result<Vec<Param>> {
    let Some(schema) = body.and_then(Body::schema) else { return Ok(Vec::new()) };
    let schema = doc.resolve(schema)?;

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut params = Vec::with_capacity(schema.properties.len());
    for (name, property) in &schema.properties {
        let ident = argument_ident(name);
        if let Some(other) = seen.insert(ident.clone(), name.clone()) {
            return Err(CodegenError::DuplicateArgument {
                command: command.to_string(),
                argument: ident,
                property: name.clone(),
                other,
            });
        }
        params.push(Param {
            name: name.clone(),
            ident,
            rust_type: RustType::from_schema(property),
            required: schema.required.contains(name),
            description: property.description.clone(),
        });
    }
    // stable: keeps document order within each group
    params.sort_by_key(|p| !p.required);
    Ok(params)
}

fn response_field(doc: &Document, body: Option<&Body>) -> Result<Option<ResponseField>> {
    let Some(schema) = body.and_then(Body::schema) else { return Ok(None) };
    let schema = doc.resolve(schema)?;
    Ok(schema.properties.iter().find(|(name, _)| name.as_str() != "success").map(
        |(name, property)| ResponseField {
            name: name.clone(),
            rust_type: RustType::from_schema(property),
        },
    ))
}
