//! Renders proxy methods as an `impl` block.

use std::fmt::Write;

use crate::doc_comment::{write_doc_comment, write_doc_line};
use crate::method::{Param, ProxyMethod};
use crate::Result;

const INDENT: &str = "    ";

/// Renders `impl <proxy> { ... }` holding one async method per entry.
///
/// The block is meant to sit in the module that defines `proxy`, next to a
/// `proxy: ServiceProxy` field and the crate's `Result` alias.
pub fn render_impl(proxy: &str, methods: &[ProxyMethod]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "impl {proxy} {{")?;
    for (i, method) in methods.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_method(&mut out, method)?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}

fn render_method(out: &mut String, method: &ProxyMethod) -> Result<()> {
    write_docs(out, method)?;

    let args = std::iter::once("&self".to_string())
        .chain(method.params.iter().map(|p| {
            let ty = p.rust_type.argument();
            if p.required {
                format!("{}: {ty}", p.ident)
            } else {
                format!("{}: Option<{ty}>", p.ident)
            }
        }))
        .collect::<Vec<_>>()
        .join(", ");
    let ok_ty = method.response.as_ref().map(|r| r.rust_type.to_string());

    if method.params.len() > 6 {
        writeln!(out, "{INDENT}#[allow(clippy::too_many_arguments)]")?;
    }
    writeln!(
        out,
        "{INDENT}pub async fn {}({args}) -> crate::Result<{}> {{",
        method.name,
        ok_ty.as_deref().unwrap_or("()")
    )?;
    write_data(out, &method.params)?;
    match &method.response {
        Some(field) => writeln!(
            out,
            "{INDENT}{INDENT}self.proxy.send_for({:?}, data, {:?}).await",
            method.command, field.name
        )?,
        None => writeln!(out, "{INDENT}{INDENT}self.proxy.send_ok({:?}, data).await", method.command)?,
    }
    writeln!(out, "{INDENT}}}")?;
    Ok(())
}

fn write_docs(out: &mut String, method: &ProxyMethod) -> Result<()> {
    let summary = method.summary.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let description = method.description.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match summary {
        Some(summary) => write_doc_line(out, summary, INDENT)?,
        None => write_doc_line(out, &format!("Sends `{}`.", method.command), INDENT)?,
    }
    if let Some(description) = description.filter(|d| Some(*d) != summary) {
        writeln!(out, "{INDENT}///")?;
        write_doc_comment(out, description, INDENT)?;
    }

    let documented: Vec<&Param> = method.params.iter().filter(|p| p.description.is_some()).collect();
    if !documented.is_empty() {
        writeln!(out, "{INDENT}///")?;
        writeln!(out, "{INDENT}/// # Arguments")?;
        for p in documented {
            let text = format!("`{}`: {}", p.name, p.description.as_deref().unwrap_or_default());
            write_doc_line(out, &text, INDENT)?;
        }
    }
    Ok(())
}

fn write_data(out: &mut String, params: &[Param]) -> Result<()> {
    let required: Vec<String> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| format!("{:?}: {}", p.name, p.ident))
        .collect();
    let optional: Vec<&Param> = params.iter().filter(|p| !p.required).collect();
    let binding = if optional.is_empty() { "let data" } else { "let mut data" };

    if required.is_empty() {
        writeln!(out, "{INDENT}{INDENT}{binding} = serde_json::json!({{}});")?;
    } else {
        writeln!(out, "{INDENT}{INDENT}{binding} = serde_json::json!({{ {} }});", required.join(", "))?;
    }
    for p in optional {
        writeln!(out, "{INDENT}{INDENT}if let Some({0}) = {0} {{", p.ident)?;
        writeln!(out, "{INDENT}{INDENT}{INDENT}data[{:?}] = serde_json::json!({});", p.name, p.ident)?;
        writeln!(out, "{INDENT}{INDENT}}}")?;
    }
    Ok(())
}
