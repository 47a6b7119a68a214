//! Expected values for generated tests.
//!
//! A fixture is a Rust literal equal to what the generated decoder produces
//! for the sample, plus the canonical JSON the generated encoder writes for
//! it. Both are computed with the same decode functions the generated code
//! mirrors, on a tree built by this builder's own registry.
use serde_json::{Map, Value};

use crate::error::Result;
use crate::inference::num::{decode_double, decode_int, double_literal};
use crate::inference::str::{date_time_literal, format_date_time, parse_date_time};
use crate::ir::{ClassDefinition, InferredType, ModelKind};
use crate::lower::build_class_tree;

const INDENT: &str = "    ";

pub struct Fixture {
    kind: ModelKind,
    tree: ClassDefinition,
}

impl Fixture {
    pub fn new(kind: ModelKind, endpoint: &str, sample: &Map<String, Value>) -> Result<Self> {
        Ok(Self { kind, tree: build_class_tree(kind, endpoint, sample)? })
    }

    /// Struct literal for `sample`, with every type qualified by `import_alias`.
    /// Body roots end in `..Default::default()` for their path and extra fields.
    pub fn expression(&self, sample: &Map<String, Value>, import_alias: &str) -> String {
        let render = Render { alias: import_alias };
        render.object(&self.tree, sample, 0, self.kind == ModelKind::Body)
    }

    /// `encode(decode(sample))`: sparse for bodies, every key for responses.
    pub fn canonical_json(&self, sample: &Map<String, Value>) -> Value {
        let sparse = self.kind == ModelKind::Body;
        Value::Object(canonical_object(&self.tree, sample, sparse))
    }
}

/// `build_fixture` in one call, for callers that only want the literal.
pub fn build_fixture(
    kind: ModelKind,
    endpoint: &str,
    sample: &Map<String, Value>,
    import_alias: &str,
) -> Result<String> {
    Ok(Fixture::new(kind, endpoint, sample)?.expression(sample, import_alias))
}

// ------------------------------ Literals ---------------------------------- //

struct Render<'a> {
    alias: &'a str,
}

impl Render<'_> {
    fn object(&self, class: &ClassDefinition, map: &Map<String, Value>, depth: usize, with_rest: bool) -> String {
        let pad = INDENT.repeat(depth + 1);
        let mut out = format!("{}::{} {{\n", self.alias, class.ident());
        for field in &class.fields {
            let value = map
                .get(&field.key)
                .and_then(|v| self.literal(class, &field.ty, v, depth + 1))
                .map_or_else(|| "None".to_string(), |lit| format!("Some({lit})"));
            out.push_str(&format!("{pad}{}: {value},\n", field.ident));
        }
        if with_rest {
            out.push_str(&format!("{pad}..Default::default()\n"));
        }
        out.push_str(&INDENT.repeat(depth));
        out.push('}');
        out
    }

    /// The decoded value of `v` as a Rust expression of the field's type, or
    /// `None` when the decoder would yield `None`.
    fn literal(&self, class: &ClassDefinition, ty: &InferredType, v: &Value, depth: usize) -> Option<String> {
        match ty {
            InferredType::Int => decode_int(v).map(|i| i.to_string()),
            InferredType::Double => decode_double(v).map(double_literal),
            InferredType::Bool => v.as_bool().map(|b| b.to_string()),
            InferredType::String => v.as_str().map(|s| format!("{s:?}.to_string()")),
            InferredType::DateTime => v.as_str().and_then(date_time_literal),
            InferredType::Dynamic => (!v.is_null()).then(|| value_literal(v)),
            InferredType::ObjectRef(name) => {
                let child = class.child(name)?;
                v.as_object().map(|m| self.object(child, m, depth, false))
            }
            InferredType::ListOf(inner) if **inner == InferredType::Dynamic => v
                .as_array()
                .map(|items| format!("vec![{}]", items.iter().map(value_literal).collect::<Vec<_>>().join(", "))),
            InferredType::ListOf(inner) => v.as_array().map(|items| {
                let elements: Vec<String> = items
                    .iter()
                    .filter_map(|item| self.literal(class, inner, item, depth))
                    .collect();
                format!("vec![{}]", elements.join(", "))
            }),
        }
    }
}

/// `serde_json::Value` expression reproducing `v` exactly.
fn value_literal(v: &Value) -> String {
    if v.is_null() {
        return "serde_json::Value::Null".to_string();
    }
    let json = v.to_string();
    let mut hashes = String::from("#");
    while json.contains(&format!("\"{hashes}")) {
        hashes.push('#');
    }
    format!("serde_json::from_str::<serde_json::Value>(r{hashes}\"{json}\"{hashes}).unwrap()")
}

// ------------------------------ Canonical JSON ---------------------------- //

fn canonical_object(class: &ClassDefinition, map: &Map<String, Value>, sparse: bool) -> Map<String, Value> {
    let mut out = Map::new();
    for field in &class.fields {
        match map.get(&field.key).and_then(|v| canonical(class, &field.ty, v, sparse)) {
            Some(value) => {
                out.insert(field.key.clone(), value);
            }
            None if !sparse => {
                out.insert(field.key.clone(), Value::Null);
            }
            None => {}
        }
    }
    out
}

fn canonical(class: &ClassDefinition, ty: &InferredType, v: &Value, sparse: bool) -> Option<Value> {
    match ty {
        InferredType::Int => decode_int(v).map(Value::from),
        InferredType::Double => decode_double(v).map(Value::from),
        InferredType::Bool => v.as_bool().map(Value::Bool),
        InferredType::String => v.as_str().map(|s| Value::String(s.to_string())),
        InferredType::DateTime => v
            .as_str()
            .and_then(parse_date_time)
            .map(|dt| Value::String(format_date_time(&dt))),
        InferredType::Dynamic => (!v.is_null()).then(|| v.clone()),
        InferredType::ObjectRef(name) => {
            let child = class.child(name)?;
            v.as_object().map(|m| Value::Object(canonical_object(child, m, sparse)))
        }
        InferredType::ListOf(inner) if **inner == InferredType::Dynamic => v.as_array().cloned().map(Value::Array),
        InferredType::ListOf(inner) => v.as_array().map(|items| {
            Value::Array(items.iter().filter_map(|item| canonical(class, inner, item, sparse)).collect())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture(kind: ModelKind, sample: &Value) -> Fixture {
        Fixture::new(kind, "login", sample.as_object().unwrap()).unwrap()
    }

    #[test]
    fn response_literal_matches_decoder() {
        let sample = json!({
            "id": 42,
            "score": "7",
            "name": "a \"b\"",
            "at": "2024-01-02T10:00:00+01:00",
            "meta": null,
            "user": {"ok": true},
            "tags": [],
        });
        let f = fixture(ModelKind::Response, &sample);
        let expected = r#"login_response::LoginResponse {
    id: Some(42),
    score: Some("7".to_string()),
    name: Some("a \"b\"".to_string()),
    at: Some("2024-01-02T09:00:00".parse::<chrono::NaiveDateTime>().unwrap()),
    meta: None,
    user: Some(login_response::UserResponse {
        ok: Some(true),
    }),
    tags: Some(vec![]),
}"#;
        assert_eq!(f.expression(sample.as_object().unwrap(), "login_response"), expected);
    }

    #[test]
    fn lists_skip_what_the_decoder_skips() {
        let sample = json!({"items": [{"n": 1}, null, 7, {"n": "x"}], "ints": [1, "2", "z"]});
        let f = fixture(ModelKind::Response, &sample);
        let expr = f.expression(sample.as_object().unwrap(), "r");
        assert!(expr.contains("ints: Some(vec![1, 2]),"));
        assert_eq!(expr.matches("r::ItemsResponse {").count(), 2);
        assert_eq!(
            f.canonical_json(sample.as_object().unwrap()),
            json!({"items": [{"n": 1}, {"n": null}], "ints": [1, 2]})
        );
    }

    #[test]
    fn body_canonical_json_is_sparse() {
        let sample = json!({"email": "x", "nick": null, "profile": {"at": "2024-01-02"}});
        let f = fixture(ModelKind::Body, &sample);
        assert_eq!(
            f.canonical_json(sample.as_object().unwrap()),
            json!({"email": "x", "profile": {"at": "2024-01-02T00:00:00"}})
        );
        let expr = f.expression(sample.as_object().unwrap(), "b");
        assert!(expr.ends_with("    ..Default::default()\n}"));
        assert_eq!(expr.matches("..Default::default()").count(), 1);
    }

    #[test]
    fn response_canonical_json_keeps_every_key() {
        let sample = json!({"a": null, "b": 1.5, "c": "NaN"});
        let f = fixture(ModelKind::Response, &sample);
        assert_eq!(
            f.canonical_json(sample.as_object().unwrap()),
            json!({"a": null, "b": 1.5, "c": "NaN"})
        );
    }

    #[test]
    fn dynamic_values_use_raw_strings() {
        assert_eq!(value_literal(&Value::Null), "serde_json::Value::Null");
        assert_eq!(
            value_literal(&json!({"q": "\"#"})),
            "serde_json::from_str::<serde_json::Value>(r##\"{\"q\":\"\\\"#\"}\"##).unwrap()"
        );
        let tricky = json!(["a\"#b"]);
        let lit = value_literal(&tricky);
        assert!(lit.starts_with("serde_json::from_str::<serde_json::Value>(r##\""), "{lit}");
    }

    #[test]
    fn build_fixture_is_one_shot_expression() {
        let sample = json!({"id": 1});
        let expr = build_fixture(ModelKind::Entity, "login", sample.as_object().unwrap(), "e").unwrap();
        assert_eq!(expr, "e::LoginEntity {\n    id: Some(1),\n}");
    }
}
