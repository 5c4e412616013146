//! Naming and URL helpers shared by every generator.
//!
//! Everything here is pure and total: any input string yields an output,
//! including the empty string.

use std::collections::HashSet;
use std::sync::LazyLock;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Predefined type names that cannot name an interface or type alias.
const TS_PREDEFINED_TYPES: [&str; 10] = [
    "any",
    "bigint",
    "boolean",
    "never",
    "number",
    "object",
    "string",
    "symbol",
    "undefined",
    "unknown",
];

/// Strip path variables from a URL and make the rest filesystem-safe.
///
/// `/api/identity-providers/{id}` becomes `/api/identity-providers`.
/// Characters outside `[A-Za-z0-9_/-]` are replaced by `_`, trailing slashes
/// are dropped and an empty result becomes `/`.
pub fn normalize_url(url: &str) -> String {
    let mut normalized = String::with_capacity(url.len());
    for segment in url.split('/').skip(1) {
        if segment.starts_with('{') && segment.ends_with('}') {
            continue;
        }
        normalized.push('/');
        normalized.extend(segment.chars().map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        }));
    }

    // Keep anything before the first slash (relative URLs are rare but legal).
    if let Some(prefix) = url.split('/').next()
        && !prefix.is_empty()
    {
        let prefix: String = prefix
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        normalized.insert_str(0, &prefix);
    }

    let trimmed = normalized.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name of the service class for a normalized URL.
///
/// Uses the last segment that is not a path variable, `Root` when there is
/// none: `/instance/{id}/archive` -> `ArchiveService`, `/` -> `RootService`.
pub fn generate_resource_name(url: &str) -> String {
    let last = url
        .split('/')
        .filter(|part| !part.is_empty() && !part.starts_with('{'))
        .next_back()
        .unwrap_or("Root");

    let mut words: Vec<&str> = last.split('-').collect();
    words.push("service");
    let name = pascal_case(&words);

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Join words, uppercasing the first letter of each; the rest of every word
/// is kept as is. Unless `pascal`, the first letter of the result is
/// lowercased.
pub fn to_camel_case(words: &[&str], pascal: bool) -> String {
    let mut result = String::new();
    for word in words {
        result.push_str(&capitalize_first(word));
    }
    if pascal {
        result
    } else {
        lowercase_first(&result)
    }
}

/// [`to_camel_case`] with an uppercase first letter.
pub fn pascal_case(words: &[&str]) -> String {
    to_camel_case(words, true)
}

/// Key under which a file or directory shows up in the aggregate client.
///
/// Splits on `-`, `.` and spaces, then lowercases the first letter:
/// `ExchangeService` -> `exchangeService`, `identity-providers` ->
/// `identityProviders`.
pub fn camelize(name: &str) -> String {
    let words: Vec<&str> = name
        .split(['-', '.', ' '])
        .filter(|word| !word.is_empty())
        .collect();
    let joined = to_camel_case(&words, false);
    if joined.is_empty() {
        "_empty".to_string()
    } else if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{joined}")
    } else {
        joined
    }
}

/// Turn line breaks into block comment continuations.
pub fn add_stars_to_newline(text: &str) -> String {
    text.trim_end()
        .replace("\r\n", "\n")
        .replace('\n', "\n   * ")
}

/// Check if an identifier needs quoting when used as a property key.
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in JavaScript/TypeScript string literals.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a property key if it is not a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Sanitize a name so it can be used as a parameter or variable.
/// - Splits on `-`, `.` and spaces and joins as camelCase
/// - Replaces remaining invalid characters with `_`
/// - Prepends `_` if it starts with a digit or is a reserved word
pub fn sanitize_ts_identifier(name: &str) -> String {
    let mut result = String::new();
    for (i, part) in name
        .split(['-', '.', ' '])
        .filter(|part| !part.is_empty())
        .enumerate()
    {
        if i == 0 {
            result.push_str(part);
        } else {
            result.push_str(&capitalize_first(part));
        }
    }

    let mut result: String = result
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if result.is_empty() {
        return "_empty".to_string();
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }

    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result.insert(0, '_');
    }

    result
}

/// Type name for a `definitions` entry: non-word characters become `_`.
///
/// `Foo.Bar` -> `Foo_Bar`, `List«Pet»` -> `List_Pet_`. Reserved words and
/// predefined type names get a `_` prefix: `default` -> `_default`.
pub fn sanitize_definition_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty()
        || sanitized.starts_with(|c: char| c.is_ascii_digit())
        || TS_RESERVED_WORDS.contains(sanitized.as_str())
        || TS_PREDEFINED_TYPES.contains(&sanitized.as_str())
    {
        sanitized.insert(0, '_');
    }
    sanitized
}

/// Relative module specifier from the directory `from_dir` to the file `to`
/// (both relative to the output root, `/`-separated, no extension on `to`).
///
/// `("rest/api/v1", "interfaces/Pet")` -> `../../../interfaces/Pet`.
pub fn relative_import_path(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let target: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from.len() - common;
    let rest = target[common..].join("/");

    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // =========================================================================
    // URLs
    // =========================================================================

    #[test]
    fn test_normalize_url_drops_variables() {
        assert_eq!(
            normalize_url("/api/identity-providers/{id}"),
            "/api/identity-providers"
        );
        assert_eq!(
            normalize_url("/instance/{instanceId}/archive"),
            "/instance/archive"
        );
        assert_eq!(normalize_url("/api/v1/exchange"), "/api/v1/exchange");
    }

    #[test]
    fn test_normalize_url_edge_cases() {
        assert_eq!(normalize_url("/"), "/");
        assert_eq!(normalize_url(""), "/");
        assert_eq!(normalize_url("/{id}"), "/");
        assert_eq!(normalize_url("/users/"), "/users");
        assert_eq!(normalize_url("/users.json"), "/users_json");
        assert_eq!(normalize_url("/a:b/c d"), "/a_b/c_d");
    }

    #[test]
    fn test_generate_resource_name() {
        assert_eq!(generate_resource_name("/api/v1/exchange"), "ExchangeService");
        assert_eq!(
            generate_resource_name("/api/identity-providers"),
            "IdentityProvidersService"
        );
        assert_eq!(
            generate_resource_name("/api/identity-providers/{id}"),
            "IdentityProvidersService"
        );
        assert_eq!(generate_resource_name("/"), "RootService");
        assert_eq!(generate_resource_name(""), "RootService");
        assert_eq!(generate_resource_name("/v2"), "V2Service");
        assert_eq!(generate_resource_name("/api/2fa"), "_2faService");
    }

    // =========================================================================
    // Casing
    // =========================================================================

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case(&["exchange", "service"], false), "exchangeService");
        assert_eq!(to_camel_case(&["exchange", "service"], true), "ExchangeService");
        assert_eq!(to_camel_case(&["instanceId"], true), "InstanceId");
        assert_eq!(to_camel_case(&["", "service"], false), "service");
        assert_eq!(to_camel_case(&[], false), "");
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("ExchangeService"), "exchangeService");
        assert_eq!(camelize("identity-providers"), "identityProviders");
        assert_eq!(camelize("v1"), "v1");
        assert_eq!(camelize("2fa"), "_2fa");
        assert_eq!(camelize(""), "_empty");
    }

    #[test]
    fn test_add_stars_to_newline() {
        assert_eq!(add_stars_to_newline("one line"), "one line");
        assert_eq!(
            add_stars_to_newline("first\nsecond\r\nthird\n"),
            "first\n   * second\n   * third"
        );
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    #[test]
    fn test_needs_bracket_notation() {
        assert!(!needs_bracket_notation("foo"));
        assert!(!needs_bracket_notation("_foo"));
        assert!(!needs_bracket_notation("$foo"));
        assert!(!needs_bracket_notation("foo123"));

        assert!(needs_bracket_notation(""));
        assert!(needs_bracket_notation("123foo"));
        assert!(needs_bracket_notation("foo-bar"));
        assert!(needs_bracket_notation("foo.bar"));
        assert!(needs_bracket_notation("foo bar"));
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("foo"), "foo");
        assert_eq!(quote_if_needed("foo-bar"), "\"foo-bar\"");
        assert_eq!(quote_if_needed("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_sanitize_ts_identifier() {
        assert_eq!(sanitize_ts_identifier("foo"), "foo");
        assert_eq!(sanitize_ts_identifier("foo-bar"), "fooBar");
        assert_eq!(sanitize_ts_identifier("user.id"), "userId");
        assert_eq!(sanitize_ts_identifier("page[size]"), "page_size_");
        assert_eq!(sanitize_ts_identifier("123foo"), "_123foo");
        assert_eq!(sanitize_ts_identifier("delete"), "_delete");
        assert_eq!(sanitize_ts_identifier(""), "_empty");
    }

    #[test]
    fn test_sanitize_definition_name() {
        assert_eq!(sanitize_definition_name("Pet"), "Pet");
        assert_eq!(sanitize_definition_name("Foo.Bar"), "Foo_Bar");
        assert_eq!(sanitize_definition_name("List«Pet»"), "List_Pet_");
        assert_eq!(sanitize_definition_name("1Thing"), "_1Thing");
        assert_eq!(sanitize_definition_name("default"), "_default");
        assert_eq!(sanitize_definition_name("delete"), "_delete");
        assert_eq!(sanitize_definition_name("string"), "_string");
        assert_eq!(sanitize_definition_name("Default"), "Default");
    }

    #[test]
    fn test_relative_import_path() {
        assert_eq!(
            relative_import_path("rest/api/v1", "interfaces/Pet"),
            "../../../interfaces/Pet"
        );
        assert_eq!(relative_import_path("interfaces", "interfaces/Pet"), "./Pet");
        assert_eq!(relative_import_path("", "rest/UserService"), "./rest/UserService");
        assert_eq!(relative_import_path("rest", "interfaces/Pet"), "../interfaces/Pet");
    }
}
