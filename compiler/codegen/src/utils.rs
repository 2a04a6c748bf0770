// codegen/src/utils.rs

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
];

/// Converts an operation id or command to a snake_case method name.
///
/// # Examples
/// ```
/// use codegen::utils::to_method_name;
/// assert_eq!(to_method_name("getBlockchainState"), "get_blockchain_state");
/// assert_eq!(to_method_name("get_blockchain_state"), "get_blockchain_state");
/// assert_eq!(to_method_name("GetNFTInfo"), "get_nft_info");
/// ```
pub fn to_method_name(name: &str) -> String {
    let name = name.replace(['-', '.', ' '], "_");
    camel_to_snake_case(&name)
}

/// Convert camelCase or PascalCase to snake_case, keeping acronyms together
fn camel_to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev != '_' && (prev.is_lowercase() || prev.is_ascii_digit() || next_is_lower) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Sanitizes external identifiers (e.g. schema property names) to be valid Rust identifiers
pub fn sanitize_external_identifier(name: &str) -> String {
    let sanitized: String =
        name.replace('-', "_").chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
    match sanitized.as_str() {
        "self" | "super" | "crate" | "Self" => format!("{sanitized}_"),
        s if RUST_KEYWORDS.contains(&s) => format!("r#{s}"),
        s if s.starts_with(|c: char| c.is_ascii_digit()) => format!("_{s}"),
        "" => "_".to_string(),
        _ => sanitized,
    }
}

/// Whether `name` can name the proxy type the generated methods attach to.
pub fn is_type_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
