//! Request bodies: encode-only models plus the endpoint's metadata consts.
use crate::case::IdentAllocator;
use crate::codegen::{Codegen, emit_fields, encode_expr, key_literal};
use crate::inference::str::FORMAT_DATE_TIME_SRC;
use crate::ir::ClassDefinition;
use crate::manifest::{CacheStrategy, HttpMethod, PathParam, path_params};

/// Everything about the endpoint the body module exposes besides the model.
#[derive(Debug, Clone)]
pub struct BodyContext {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub cache: Option<CacheStrategy>,
    pub is_list: bool,
}

impl BodyContext {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new(), cache: None, is_list: false }
    }
}

/// Identifiers the root body struct uses on top of its sample fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootExtras {
    pub params: Vec<(PathParam, String)>,
    pub extra: String,
    pub files: Option<String>,
}

impl RootExtras {
    pub fn allocate(root: &ClassDefinition, ctx: &BodyContext) -> Self {
        let mut idents = IdentAllocator::new();
        idents.reserve(root.fields.iter().map(|f| f.ident.as_str()));
        let params = path_params(&ctx.path)
            .into_iter()
            .map(|param| {
                let ident = idents.allocate(&param.name);
                (param, ident)
            })
            .collect();
        let extra = idents.allocate("extra");
        let files = ctx.method.is_multipart().then(|| idents.allocate("files"));
        Self { params, extra, files }
    }
}

#[derive(Debug, Clone)]
pub struct BodyEmitter<'a> {
    ctx: &'a BodyContext,
}

impl<'a> BodyEmitter<'a> {
    pub fn new(ctx: &'a BodyContext) -> Self {
        Self { ctx }
    }

    pub fn emit(&self, root: &ClassDefinition) -> String {
        let extras = RootExtras::allocate(root, self.ctx);
        let mut cg = Codegen::file();
        cg.line("use serde_json::{Map, Value};");
        cg.blank();
        self.emit_consts(&mut cg);
        for (index, class) in root.walk().into_iter().enumerate() {
            cg.blank();
            let extras = (index == 0).then_some(&extras);
            self.emit_class(&mut cg, class, extras);
        }
        if root.uses_date_time() {
            cg.blank();
            cg.block(FORMAT_DATE_TIME_SRC);
        }
        cg.into_string()
    }

    fn emit_consts(&self, cg: &mut Codegen) {
        let ctx = self.ctx;
        cg.line(format!("pub const METHOD: &str = {:?};", ctx.method.verb()));
        cg.line(format!("pub const PATH: &str = {:?};", ctx.path));
        cg.line(format!("pub const MULTIPART: bool = {};", ctx.method.is_multipart()));
        if ctx.headers.is_empty() {
            cg.line("pub const HEADERS: &[(&str, &str)] = &[];");
        } else {
            cg.open("pub const HEADERS: &[(&str, &str)] = &[");
            for (name, value) in &ctx.headers {
                cg.line(format!("({name:?}, {value:?}),"));
            }
            cg.close("];");
        }
        if let Some(cache) = &ctx.cache {
            cg.line(format!("pub const CACHE_STRATEGY: &str = {:?};", cache.kind.as_str()));
            match cache.ttl_minutes {
                Some(ttl) => cg.line(format!("pub const CACHE_TTL_MINUTES: Option<u64> = Some({ttl});")),
                None => cg.line("pub const CACHE_TTL_MINUTES: Option<u64> = None;"),
            }
            cg.line(format!("pub const CACHE_KEEP_EXPIRED: bool = {};", cache.keep_expired_cache));
        }
    }

    fn emit_class(&self, cg: &mut Codegen, class: &ClassDefinition, extras: Option<&RootExtras>) {
        let name = class.ident();
        cg.line("#[derive(Debug, Clone, PartialEq, Default)]");
        cg.open(format!("pub struct {name} {{"));
        if let Some(extras) = extras {
            for (param, ident) in &extras.params {
                cg.line(format!("/// `{}` in `PATH`.", param.placeholder));
                cg.line(format!("pub {ident}: String,"));
            }
        }
        emit_fields(cg, class);
        if let Some(extras) = extras {
            cg.line("/// Merged into the encoded object as-is.");
            cg.line(format!("pub {}: Option<Map<String, Value>>,", extras.extra));
            if let Some(files) = &extras.files {
                cg.line("/// Multipart file parts by form field name.");
                cg.line(format!(
                    "pub {files}: Option<std::collections::BTreeMap<String, Vec<std::path::PathBuf>>>,"
                ));
            }
        }
        cg.close("}");
        cg.blank();

        cg.open(format!("impl {name} {{"));
        if let Some(extras) = extras {
            emit_path(cg, extras);
            cg.blank();
        }

        cg.line("/// Only fields that are set are written.");
        cg.open("pub fn to_map(&self) -> Map<String, Value> {");
        if class.fields.is_empty() && extras.is_none() {
            cg.line("Map::new()");
        } else {
            cg.line("let mut map = Map::new();");
            for field in &class.fields {
                cg.open(format!("if let Some(v) = &self.{} {{", field.ident));
                cg.line(format!(
                    "map.insert({}.to_string(), {});",
                    key_literal(&field.key),
                    encode_expr(&field.ty, "v", 0)
                ));
                cg.close("}");
            }
            if let Some(extras) = extras {
                cg.open(format!("if let Some(extra) = &self.{} {{", extras.extra));
                cg.line("map.extend(extra.clone());");
                cg.close("}");
            }
            cg.line("map");
        }
        cg.close("}");

        cg.blank();
        cg.open("pub fn to_json(&self) -> String {");
        cg.line("Value::Object(self.to_map()).to_string()");
        cg.close("}");

        if extras.is_some() && self.ctx.is_list {
            cg.blank();
            cg.open("pub fn list_to_value(items: &[Self]) -> Value {");
            cg.line("Value::Array(items.iter().map(|item| Value::Object(item.to_map())).collect())");
            cg.close("}");
        }
        cg.close("}");
    }
}

fn emit_path(cg: &mut Codegen, extras: &RootExtras) {
    cg.line("/// `PATH` with every parameter filled in.");
    cg.open("pub fn path(&self) -> String {");
    if extras.params.is_empty() {
        cg.line("PATH.to_string()");
    } else {
        // longest first so `:id` never eats the front of `:id_type`
        let mut params: Vec<&(PathParam, String)> = extras.params.iter().collect();
        params.sort_by_key(|(param, _)| std::cmp::Reverse(param.placeholder.len()));
        let mut expr = "PATH".to_string();
        for (param, ident) in params {
            expr = format!("{expr}.replace({:?}, &self.{ident})", param.placeholder);
        }
        cg.line(expr);
    }
    cg.close("}");
}
