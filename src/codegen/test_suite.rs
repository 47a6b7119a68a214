//! Generated `*_test.rs` modules.
//!
//! Each file pins the generated code against the sample it came from: the
//! fixture literal is what decoding must produce and the JSON fixture under
//! `fixtures/` is what encoding must produce.
use crate::codegen::Codegen;

/// One model module a test file exercises.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// Module the type lives in, e.g. `login_response`.
    pub module: &'a str,
    /// Root type name, e.g. `LoginResponse`.
    pub class: &'a str,
}

impl Target<'_> {
    fn path(&self) -> String {
        format!("{}::{}", self.module, self.class)
    }
}

fn fixture_fn(cg: &mut Codegen, name: &str, target: Target<'_>, expression: &str) {
    cg.open(format!("fn {name}() -> {} {{", target.path()));
    cg.block(expression);
    cg.close("}");
}

fn expected_json(cg: &mut Codegen, fixture_file: &str) {
    cg.line(format!(
        "let expected: serde_json::Value = serde_json::from_str(include_str!(\"fixtures/{fixture_file}\")).unwrap();"
    ));
}

/// `sample_file` is the payload as given; `fixture_file` is the canonical
/// encoding of its decoded value.
pub fn response_test(target: Target<'_>, fixture: &str, sample_file: &str, fixture_file: &str) -> String {
    let mut cg = Codegen::file();
    cg.line(format!("use super::{};", target.module));
    cg.blank();
    fixture_fn(&mut cg, "fixture", target, fixture);

    cg.blank();
    cg.line("#[test]");
    cg.open("fn decodes_sample() {");
    cg.line(format!(
        "let decoded = {}::from_json(include_str!(\"fixtures/{sample_file}\")).unwrap();",
        target.path()
    ));
    cg.line("assert_eq!(decoded, fixture());");
    cg.close("}");

    cg.blank();
    cg.line("#[test]");
    cg.open("fn decodes_canonical_json() {");
    cg.line(format!(
        "let decoded = {}::from_json(include_str!(\"fixtures/{fixture_file}\")).unwrap();",
        target.path()
    ));
    cg.line("assert_eq!(decoded, fixture());");
    cg.close("}");

    cg.blank();
    cg.line("#[test]");
    cg.open("fn round_trips_through_map() {");
    cg.line("let value = fixture();");
    cg.line(format!("assert_eq!({}::from_map(&value.to_map()), value);", target.path()));
    cg.close("}");

    cg.blank();
    cg.line("#[test]");
    cg.open("fn encodes_canonical_json() {");
    expected_json(&mut cg, fixture_file);
    cg.line("assert_eq!(serde_json::Value::Object(fixture().to_map()), expected);");
    cg.close("}");
    cg.into_string()
}

/// Path parameter fields and the path `path()` must produce when each is set
/// to a known value.
#[derive(Debug, Clone, Default)]
pub struct PathCheck {
    pub assignments: Vec<(String, String)>,
    pub expected: String,
}

pub fn body_test(
    target: Target<'_>,
    fixture: &str,
    fixture_file: &str,
    extra_field: &str,
    path: Option<&PathCheck>,
) -> String {
    let mut cg = Codegen::file();
    cg.line(format!("use super::{};", target.module));
    cg.blank();
    fixture_fn(&mut cg, "fixture", target, fixture);

    cg.blank();
    cg.line("#[test]");
    cg.open("fn encodes_set_fields_only() {");
    expected_json(&mut cg, fixture_file);
    cg.line("assert_eq!(serde_json::Value::Object(fixture().to_map()), expected);");
    cg.close("}");

    cg.blank();
    cg.line("#[test]");
    cg.open("fn merges_extra_fields() {");
    cg.line("let mut body = fixture();");
    cg.line("let mut extra = serde_json::Map::new();");
    cg.line("extra.insert(\"__extra\".to_string(), serde_json::Value::from(1));");
    cg.line(format!("body.{extra_field} = Some(extra);"));
    cg.line("assert_eq!(body.to_map().get(\"__extra\"), Some(&serde_json::Value::from(1)));");
    cg.close("}");

    if let Some(check) = path {
        cg.blank();
        cg.line("#[test]");
        cg.open("fn fills_path_parameters() {");
        cg.open(format!("let body = {} {{", target.path()));
        for (field, value) in &check.assignments {
            cg.line(format!("{field}: {value:?}.to_string(),"));
        }
        cg.line("..Default::default()");
        cg.close("};");
        cg.line(format!("assert_eq!(body.path(), {:?});", check.expected));
        cg.close("}");
    }
    cg.into_string()
}

pub fn entity_test(target: Target<'_>, fixture: &str, fields: &[String]) -> String {
    let mut cg = Codegen::file();
    cg.line(format!("use super::{};", target.module));
    cg.blank();
    fixture_fn(&mut cg, "fixture", target, fixture);

    let nones = vec!["None"; fields.len()].join(", ");
    cg.blank();
    cg.line("#[test]");
    cg.open("fn copy_with_nothing_keeps_every_field() {");
    cg.line("let value = fixture();");
    cg.line(format!("assert_eq!(value.copy_with({nones}), value);"));
    cg.close("}");

    if !fields.is_empty() {
        let args: Vec<String> = fields.iter().map(|f| format!("value.{f}.clone()")).collect();
        cg.blank();
        cg.line("#[test]");
        cg.open("fn copy_with_replaces_fields() {");
        cg.line("let value = fixture();");
        cg.line(format!("let rebuilt = {}::default().copy_with({});", target.path(), args.join(", ")));
        cg.line("assert_eq!(rebuilt, value);");
        cg.close("}");
    }
    cg.into_string()
}

pub fn mapper_test(
    response: Target<'_>,
    response_fixture: &str,
    entity: Target<'_>,
    entity_fixture: &str,
) -> String {
    let mut cg = Codegen::file();
    cg.line(format!("use super::{{{}, {}}};", entity.module, response.module));
    cg.blank();
    fixture_fn(&mut cg, "response_fixture", response, response_fixture);
    cg.blank();
    fixture_fn(&mut cg, "entity_fixture", entity, entity_fixture);

    cg.blank();
    cg.line("#[test]");
    cg.open("fn response_maps_to_entity() {");
    cg.line(format!("assert_eq!({}::from(response_fixture()), entity_fixture());", entity.path()));
    cg.close("}");

    cg.blank();
    cg.line("#[test]");
    cg.open("fn entity_maps_back_to_response() {");
    cg.line(format!("assert_eq!({}::from(entity_fixture()), response_fixture());", response.path()));
    cg.close("}");
    cg.into_string()
}
