//! Response models: lenient decoding from JSON, total encoding back to it.
use crate::codegen::{Codegen, decode_expr, emit_fields, encode_expr, key_literal};
use crate::inference::str::{FORMAT_DATE_TIME_SRC, PARSE_DATE_TIME_SRC};
use crate::ir::ClassDefinition;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEmitter {
    /// The sample was an array; the root also gets `list_from_json`.
    pub is_list: bool,
}

impl ResponseEmitter {
    pub fn new(is_list: bool) -> Self {
        Self { is_list }
    }

    pub fn emit(&self, root: &ClassDefinition) -> String {
        let mut cg = Codegen::file();
        cg.line("use serde_json::{Map, Value};");
        for (index, class) in root.walk().into_iter().enumerate() {
            cg.blank();
            emit_class(&mut cg, class, index == 0 && self.is_list);
        }
        if root.uses_date_time() {
            cg.blank();
            cg.block(PARSE_DATE_TIME_SRC);
            cg.blank();
            cg.block(FORMAT_DATE_TIME_SRC);
        }
        cg.into_string()
    }
}

fn emit_class(cg: &mut Codegen, class: &ClassDefinition, with_list: bool) {
    let name = class.ident();
    cg.line("#[derive(Debug, Clone, PartialEq, Default)]");
    cg.open(format!("pub struct {name} {{"));
    emit_fields(cg, class);
    cg.close("}");
    cg.blank();

    cg.open(format!("impl {name} {{"));

    cg.open("pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {");
    cg.line("let map: Map<String, Value> = serde_json::from_str(raw)?;");
    cg.line("Ok(Self::from_map(&map))");
    cg.close("}");

    if with_list {
        cg.blank();
        cg.line("/// Decode an array; elements that are not objects are skipped.");
        cg.open("pub fn list_from_json(raw: &str) -> Result<Vec<Self>, serde_json::Error> {");
        cg.line("let items: Vec<Value> = serde_json::from_str(raw)?;");
        cg.line("Ok(items.iter().filter_map(Value::as_object).map(Self::from_map).collect())");
        cg.close("}");
    }

    cg.blank();
    cg.line("/// Missing or mistyped keys decode to `None`.");
    if class.fields.is_empty() {
        cg.open("pub fn from_map(_map: &Map<String, Value>) -> Self {");
        cg.line("Self {}");
        cg.close("}");
    } else {
        cg.open("pub fn from_map(map: &Map<String, Value>) -> Self {");
        cg.open("Self {");
        for field in &class.fields {
            cg.line(format!(
                "{}: map.get({}).and_then(|v| {}),",
                field.ident,
                key_literal(&field.key),
                decode_expr(&field.ty, "v", 0)
            ));
        }
        cg.close("}");
        cg.close("}");
    }

    cg.blank();
    cg.line("/// Every key is written; `None` becomes `null`.");
    cg.open("pub fn to_map(&self) -> Map<String, Value> {");
    if class.fields.is_empty() {
        cg.line("Map::new()");
    } else {
        cg.line("let mut map = Map::new();");
        for field in &class.fields {
            cg.line(format!(
                "map.insert({}.to_string(), self.{}.as_ref().map_or(Value::Null, |v| {}));",
                key_literal(&field.key),
                field.ident,
                encode_expr(&field.ty, "v", 0)
            ));
        }
        cg.line("map");
    }
    cg.close("}");

    cg.blank();
    cg.open("pub fn to_json(&self) -> String {");
    cg.line("Value::Object(self.to_map()).to_string()");
    cg.close("}");

    cg.close("}");
}
