#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Proxy method generation from OpenAPI descriptions.
//!
//! Services document each RPC command as a `POST /<command>` operation.
//! This crate reads such a document, builds a [`method::ProxyMethod`] per
//! operation and renders them as an `impl` block for a proxy type, ready to
//! paste into the proxies crate and refine by hand.

pub mod doc_comment;
pub mod method;
pub mod openapi;
pub mod render;
pub mod utils;

use std::fs;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::openapi::Document;

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Underlying I/O error while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The document is not valid YAML.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    /// Formatting error when building generated source.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    /// A `$ref` that names no component schema, or a reference cycle.
    #[error("Unresolved schema reference {0}")]
    UnresolvedRef(String),
    /// A path with no command segment.
    #[error("Path {0:?} does not name a command")]
    InvalidPath(String),
    /// Two operations produce the same method name.
    #[error("Paths {other} and {path} both generate method {method}")]
    DuplicateMethod {
        /// The method name
        method: String,
        /// The later path
        path: String,
        /// The earlier path
        other: String,
    },
    /// Two request properties produce the same argument name.
    #[error("Properties {other:?} and {property:?} of {command} both generate argument {argument}")]
    DuplicateArgument {
        /// The command whose request holds both properties
        command: String,
        /// The argument name
        argument: String,
        /// The later property
        property: String,
        /// The earlier property
        other: String,
    },
    /// The document has no `POST` operations.
    #[error("Document has no POST operations")]
    NoOperations,
    /// The requested proxy name is not a type name.
    #[error("Invalid proxy type name {0:?}")]
    InvalidProxyName(String),
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Generates the `impl <proxy>` block for every command in `source`.
pub fn generate(source: &str, proxy: &str) -> Result<String> {
    if !utils::is_type_name(proxy) {
        return Err(CodegenError::InvalidProxyName(proxy.to_string()));
    }
    let doc = Document::parse(source)?;
    let methods = method::collect_methods(&doc)?;

    let mut out = String::new();
    if !doc.info.title.is_empty() {
        let version =
            if doc.info.version.is_empty() { String::new() } else { format!(" {}", doc.info.version) };
        out.push_str(&format!("// Generated from {}{}.\n\n", doc.info.title, version));
    }
    out.push_str(&render::render_impl(proxy, &methods)?);
    Ok(clean_generated_source(&out))
}

/// Formats a Rust source file with rustfmt, if it is installed.
pub fn format_with_rustfmt(path: &Path) -> bool {
    Command::new("rustfmt")
        .arg("--edition=2021")
        .arg(path)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Trim trailing whitespace from each line and drop trailing blank lines.
/// Always ensures the returned string ends with a single newline when not empty.
fn clean_generated_source(src: &str) -> String {
    let mut lines: Vec<&str> = src.lines().map(str::trim_end).collect();

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

/// Writes generated source to `path`, creating parent directories, then
/// formats it when rustfmt is available.
pub fn write_generated(path: &Path, src: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, clean_generated_source(src))?;
    format_with_rustfmt(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_generated_source() {
        assert_eq!(clean_generated_source("a  \nb\n\n\n"), "a\nb\n");
        assert_eq!(clean_generated_source("\n\n"), "");
    }

    #[test]
    fn test_invalid_proxy_name() {
        assert!(matches!(
            generate("openapi: 3.0.0", "full_node"),
            Err(CodegenError::InvalidProxyName(_))
        ));
    }
}
