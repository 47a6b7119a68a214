//! Rust source emission.
//!
//! [`Codegen`] is a small indenting writer; the submodules render one
//! artifact each. Type, decode and encode expressions live here because the
//! body, response and fixture code must agree on them exactly.
pub mod body;
pub mod entity;
pub mod fixture;
pub mod mapper;
pub mod response;
pub mod test_suite;

use crate::inference::num;
use crate::ir::{ClassDefinition, InferredType};

pub const HEADER: &str = "// @generated by json2model. Do not edit by hand.";

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct Codegen {
    out: String,
    depth: usize,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a file with the generated-code banner.
    pub fn file() -> Self {
        let mut cg = Self::new();
        cg.line(HEADER);
        cg.blank();
        cg
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `text` (ending in `{`) and indent what follows.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    pub fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Append a pre-rendered multi-line block at the current indentation.
    pub fn block(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    /// Close one level and open another on the same line, e.g. `) -> Self {`.
    pub fn reopen(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
        self.depth += 1;
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

// ------------------------------ Types ------------------------------------- //

pub fn rust_type(ty: &InferredType) -> String {
    match ty {
        InferredType::Int => "i64".to_string(),
        InferredType::Double => "f64".to_string(),
        InferredType::Bool => "bool".to_string(),
        InferredType::String => "String".to_string(),
        InferredType::DateTime => "chrono::NaiveDateTime".to_string(),
        InferredType::Dynamic => "serde_json::Value".to_string(),
        InferredType::ObjectRef(name) => name.clone(),
        InferredType::ListOf(inner) => format!("Vec<{}>", rust_type(inner)),
    }
}

/// `pub ident: Option<T>,` lines for a class.
pub fn emit_fields(cg: &mut Codegen, class: &ClassDefinition) {
    for field in &class.fields {
        cg.line(format!("pub {}: Option<{}>,", field.ident, rust_type(&field.ty)));
    }
}

// ------------------------------ Decode ------------------------------------ //

/// Expression of type `Option<T>` reading `var: &Value`.
pub fn decode_expr(ty: &InferredType, var: &str, depth: usize) -> String {
    match ty {
        InferredType::Int => num::int_decoder(var),
        InferredType::Double => num::double_decoder(var),
        InferredType::Bool => format!("{var}.as_bool()"),
        InferredType::String => format!("{var}.as_str().map(str::to_string)"),
        InferredType::DateTime => format!("{var}.as_str().and_then(parse_date_time)"),
        InferredType::Dynamic => format!("(!{var}.is_null()).then(|| {var}.clone())"),
        InferredType::ObjectRef(name) => format!("{var}.as_object().map({name}::from_map)"),
        InferredType::ListOf(inner) if **inner == InferredType::Dynamic => {
            format!("{var}.as_array().cloned()")
        }
        InferredType::ListOf(inner) => {
            let item = format!("e{depth}");
            format!(
                "{var}.as_array().map(|items{depth}| items{depth}.iter().filter_map(|{item}| {}).collect::<Vec<_>>())",
                decode_expr(inner, &item, depth + 1)
            )
        }
    }
}

// ------------------------------ Encode ------------------------------------ //

/// Expression of type `Value` writing `var: &T`.
pub fn encode_expr(ty: &InferredType, var: &str, depth: usize) -> String {
    match ty {
        InferredType::Int | InferredType::Double => format!("Value::from(*{var})"),
        InferredType::Bool => format!("Value::Bool(*{var})"),
        InferredType::String => format!("Value::String({var}.clone())"),
        InferredType::DateTime => format!("Value::String(format_date_time({var}))"),
        InferredType::Dynamic => format!("{var}.clone()"),
        InferredType::ObjectRef(_) => format!("Value::Object({var}.to_map())"),
        InferredType::ListOf(inner) => {
            let item = format!("e{depth}");
            format!(
                "Value::Array({var}.iter().map(|{item}| {}).collect())",
                encode_expr(inner, &item, depth + 1)
            )
        }
    }
}

/// Rust string literal for a JSON key.
pub fn key_literal(key: &str) -> String {
    format!("{key:?}")
}
