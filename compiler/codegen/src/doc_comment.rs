use std::fmt::Write;

/// Sanitize a line for use in Rust doc comments
///
/// Unbalanced backticks are dropped so they cannot open a code span that
/// swallows the rest of the docs; brackets and angle brackets outside code
/// spans are escaped so rustdoc reads them as text, not links or HTML.
pub fn sanitize_doc_line(line: &str) -> String {
    let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
    let balanced = line.matches('`').count() % 2 == 0;
    let mut result = String::with_capacity(line.len());
    let mut in_code = false;

    for ch in line.chars() {
        match ch {
            '`' if balanced => {
                in_code = !in_code;
                result.push(ch);
            }
            '`' => {}
            '[' | ']' if !in_code => {
                result.push('\\');
                result.push(ch);
            }
            '<' if !in_code => result.push_str("&lt;"),
            '>' if !in_code => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }

    result
}

/// Write a sanitized doc comment line with proper prefix
pub fn write_doc_line(buf: &mut String, text: &str, indent: &str) -> std::fmt::Result {
    let sanitized = sanitize_doc_line(text);
    if sanitized.is_empty() {
        writeln!(buf, "{indent}///")
    } else {
        writeln!(buf, "{indent}/// {sanitized}")
    }
}

/// Write a sanitized multi-line doc comment
///
/// Runs of blank lines collapse into one empty `///` line and leading or
/// trailing blank lines are dropped.
pub fn write_doc_comment(buf: &mut String, text: &str, indent: &str) -> std::fmt::Result {
    let mut pending_blank = false;
    let mut wrote_any = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending_blank = wrote_any;
            continue;
        }
        if pending_blank {
            writeln!(buf, "{indent}///")?;
            pending_blank = false;
        }
        write_doc_line(buf, trimmed, indent)?;
        wrote_any = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_doc_line() {
        assert_eq!(sanitize_doc_line("Returns  the `peak`"), "Returns the `peak`");
        assert_eq!(sanitize_doc_line("list[int] of <height>"), "list\\[int\\] of &lt;height&gt;");
        assert_eq!(sanitize_doc_line("`Vec<u8>` bytes"), "`Vec<u8>` bytes");
        assert_eq!(sanitize_doc_line("odd ` tick"), "odd  tick");
    }

    #[test]
    fn test_write_doc_comment() {
        let mut buf = String::new();
        write_doc_comment(&mut buf, "\nFirst line.\n\n\nSecond paragraph.\n\n", "    ")
            .expect("write");
        assert_eq!(buf, "    /// First line.\n    ///\n    /// Second paragraph.\n");
    }
}
