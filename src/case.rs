//! Case conversion for turning JSON keys into Rust identifiers.

use std::collections::HashSet;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield",
];

// Keywords that cannot be written as raw identifiers.
const RESERVED_PLAIN: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Split a key into words on separators, lower→upper transitions and the end
/// of acronym runs (`HTTPStatus` → `HTTP`, `Status`).
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

pub fn snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// PascalCase type name for a JSON key; never empty, never starts with a digit.
pub fn type_ident(key: &str) -> String {
    let name = pascal_case(key);
    match name.chars().next() {
        None => "Field".to_string(),
        Some(c) if c.is_ascii_digit() => format!("Field{name}"),
        Some(_) => name,
    }
}

/// snake_case field / module identifier for a JSON key, keyword-escaped.
pub fn field_ident(key: &str) -> String {
    let name = snake_case(key);
    let name = match name.chars().next() {
        None => "field".to_string(),
        Some(c) if c.is_ascii_digit() => format!("field_{name}"),
        Some(_) => name,
    };
    escape_keyword(name)
}

/// Module / file stem: snake_case, keywords get a trailing `_` instead of `r#`.
pub fn module_ident(name: &str) -> String {
    let ident = field_ident(name);
    match ident.strip_prefix("r#") {
        Some(keyword) => format!("{keyword}_"),
        None => ident,
    }
}

pub fn escape_keyword(name: String) -> String {
    if RESERVED_PLAIN.contains(&name.as_str()) {
        format!("{name}_")
    } else if RUST_KEYWORDS.contains(&name.as_str()) {
        format!("r#{name}")
    } else {
        name
    }
}

/// Hands out field identifiers unique within one struct.
#[derive(Debug, Default)]
pub struct IdentAllocator {
    taken: HashSet<String>,
}

impl IdentAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with identifiers that are already in use.
    pub fn reserve<'a>(&mut self, idents: impl IntoIterator<Item = &'a str>) {
        self.taken.extend(idents.into_iter().map(str::to_string));
    }

    pub fn allocate(&mut self, key: &str) -> String {
        let base = field_ident(key);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let stem = base.trim_start_matches("r#");
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_case_and_separators() {
        assert_eq!(split_words("created_at"), vec!["created", "at"]);
        assert_eq!(split_words("createdAt"), vec!["created", "At"]);
        assert_eq!(split_words("HTTPStatus"), vec!["HTTP", "Status"]);
        assert_eq!(split_words("user-id 2"), vec!["user", "id", "2"]);
        assert_eq!(split_words("address2Line"), vec!["address2", "Line"]);
    }

    #[test]
    fn conversions() {
        assert_eq!(pascal_case("created_at"), "CreatedAt");
        assert_eq!(pascal_case("userID"), "UserId");
        assert_eq!(snake_case("createdAt"), "created_at");
        assert_eq!(snake_case("HTTPStatus"), "http_status");
    }

    #[test]
    fn identifiers_are_always_valid() {
        assert_eq!(type_ident(""), "Field");
        assert_eq!(type_ident("1st"), "Field1st");
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("self"), "self_");
        assert_eq!(field_ident("123"), "field_123");
        assert_eq!(field_ident("$"), "field");
    }

    #[test]
    fn allocator_dedupes_keys_that_collapse() {
        let mut idents = IdentAllocator::new();
        assert_eq!(idents.allocate("userName"), "user_name");
        assert_eq!(idents.allocate("user_name"), "user_name_2");
        assert_eq!(idents.allocate("type"), "r#type");
        assert_eq!(idents.allocate("Type"), "type_2");
    }

    #[test]
    fn reserved_idents_are_skipped() {
        let mut idents = IdentAllocator::new();
        idents.reserve(["extra"]);
        assert_eq!(idents.allocate("extra"), "extra_2");
    }

    #[test]
    fn module_names_never_need_raw_syntax() {
        assert_eq!(module_ident("GetUser"), "get_user");
        assert_eq!(module_ident("type"), "type_");
        assert_eq!(module_ident("self"), "self_");
    }
}
