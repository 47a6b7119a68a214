//! Run the generator over loaded manifests.
//!
//! Each endpoint is generated on its own (in parallel) into a list of
//! artifacts; nothing touches the file system until every endpoint is done.
//! Pages then get their `mapper.rs` and `mod.rs` files and everything is
//! written in manifest order.
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::case::module_ident;
use crate::codegen::HEADER;
use crate::codegen::body::{BodyContext, BodyEmitter, RootExtras};
use crate::codegen::entity::emit_entity;
use crate::codegen::fixture::Fixture;
use crate::codegen::mapper::{MapperModules, emit_mapper, mapper_file};
use crate::codegen::response::ResponseEmitter;
use crate::codegen::test_suite::{self, PathCheck, Target};
use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use crate::ir::ModelKind;
use crate::lower::build_class_tree;
use crate::manifest::{EndpointRef, LoadedManifest, load_headers};
use crate::output::{Formatter, OutputTree, WriteOutcome};
use crate::sample::{self, Loaded, Sample};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Something wrong with an input that did not stop generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub endpoint: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.message)
    }
}

/// An endpoint that produced nothing.
#[derive(Debug)]
pub struct Failure {
    pub endpoint: String,
    pub error: GenError,
}

/// A file to write, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone)]
struct MapperSection {
    response_module: String,
    entity_module: String,
    source: String,
}

/// Everything one endpoint contributes.
#[derive(Debug)]
pub struct EndpointOutput {
    label: String,
    feature: String,
    page: String,
    artifacts: Vec<Artifact>,
    modules: Vec<String>,
    test_modules: Vec<String>,
    mapper: Option<MapperSection>,
    warnings: Vec<Warning>,
}

/// All artifacts of a run, in write order.
#[derive(Debug, Default)]
pub struct Plan {
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<Warning>,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub written: usize,
    pub unchanged: usize,
    pub kept: usize,
    pub warnings: Vec<Warning>,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Default)]
struct PageIndex {
    modules: Vec<String>,
    test_modules: Vec<String>,
    mappers: Vec<MapperSection>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl EndpointOutput {
    fn new(endpoint: &EndpointRef<'_>) -> Self {
        Self {
            label: endpoint.label(),
            feature: module_ident(endpoint.feature),
            page: module_ident(endpoint.page),
            artifacts: Vec::new(),
            modules: Vec::new(),
            test_modules: Vec::new(),
            mapper: None,
            warnings: Vec::new(),
        }
    }

    fn dir(&self) -> PathBuf {
        Path::new(&self.feature).join(&self.page)
    }

    fn warn(&mut self, message: String) {
        warn!(endpoint = %self.label, "{message}");
        self.warnings.push(Warning { endpoint: self.label.clone(), message });
    }

    fn module(&mut self, name: String, contents: String) {
        self.artifacts.push(Artifact { path: self.dir().join(format!("{name}.rs")), contents });
        self.modules.push(name);
    }

    fn test_module(&mut self, name: String, contents: String) {
        self.artifacts.push(Artifact { path: self.dir().join(format!("{name}.rs")), contents });
        self.test_modules.push(name);
    }

    fn fixture_json(&mut self, file: &str, value: &serde_json::Value) {
        let mut contents = serde_json::to_string_pretty(value).unwrap_or_default();
        contents.push('\n');
        self.artifacts.push(Artifact { path: self.dir().join("fixtures").join(file), contents });
    }
}

/// Generate one endpoint. Never touches the output directory.
pub fn generate_endpoint(endpoint: EndpointRef<'_>, unit_test: bool) -> Result<EndpointOutput> {
    let mut out = EndpointOutput::new(&endpoint);
    info!(endpoint = %out.label, "generating");
    let spec = endpoint.spec;
    let api = module_ident(endpoint.api);

    let headers = match &spec.header {
        None => Vec::new(),
        Some(path) => match load_headers(&endpoint.resolve(path)) {
            Ok(headers) => headers,
            Err(reason) => {
                out.warn(format!("headers ignored: {reason}"));
                Vec::new()
            }
        },
    };

    let body_path = spec.body.as_ref().map(|p| endpoint.resolve(p));
    match sample::load(body_path.as_deref())? {
        Loaded::Malformed(reason) => out.warn(format!("body skipped: {reason}")),
        Loaded::Sample(sample) => {
            let mut ctx = BodyContext::new(spec.method, spec.path.clone());
            ctx.headers = headers;
            ctx.cache = spec.cache_strategy.clone();
            ctx.is_list = sample.is_list;
            generate_body(&mut out, &endpoint, &api, &sample, &ctx, unit_test)?;
        }
    }

    if !spec.return_data.has_model() {
        debug!(endpoint = %out.label, return_data = ?spec.return_data, "no response models");
        return Ok(out);
    }
    let response_path = spec.response.as_ref().map(|p| endpoint.resolve(p));
    match sample::load(response_path.as_deref())? {
        Loaded::Malformed(reason) => {
            out.warn(format!("response, entity and mapper skipped: {reason}"));
        }
        Loaded::Sample(sample) => generate_models(&mut out, &endpoint, &api, &sample, unit_test)?,
    }
    Ok(out)
}

fn generate_body(
    out: &mut EndpointOutput,
    endpoint: &EndpointRef<'_>,
    api: &str,
    sample: &Sample,
    ctx: &BodyContext,
    unit_test: bool,
) -> Result<()> {
    let module = format!("{api}_{}", ModelKind::Body.module_suffix());
    let tree = build_class_tree(ModelKind::Body, endpoint.api, &sample.root)?;
    out.module(module.clone(), BodyEmitter::new(ctx).emit(&tree));
    if !unit_test {
        return Ok(());
    }

    let fixture = Fixture::new(ModelKind::Body, endpoint.api, &sample.root)?;
    let json_file = format!("{module}.json");
    out.fixture_json(&json_file, &fixture.canonical_json(&sample.root));

    let extras = RootExtras::allocate(&tree, ctx);
    let check = (!extras.params.is_empty()).then(|| path_check(&ctx.path, &extras));
    let src = test_suite::body_test(
        Target { module: &module, class: tree.ident() },
        &fixture.expression(&sample.root, &module),
        &json_file,
        &extras.extra,
        check.as_ref(),
    );
    out.test_module(format!("{module}_test"), src);
    Ok(())
}

/// Expected `path()` when parameter *i* is set to `v<i>`.
fn path_check(path: &str, extras: &RootExtras) -> PathCheck {
    let assignments: Vec<(String, String)> = extras
        .params
        .iter()
        .enumerate()
        .map(|(i, (_, ident))| (ident.clone(), format!("v{i}")))
        .collect();
    let mut ordered: Vec<(&str, &str)> = extras
        .params
        .iter()
        .zip(&assignments)
        .map(|((param, _), (_, value))| (param.placeholder.as_str(), value.as_str()))
        .collect();
    ordered.sort_by_key(|(placeholder, _)| std::cmp::Reverse(placeholder.len()));
    let expected = ordered
        .into_iter()
        .fold(path.to_string(), |acc, (placeholder, value)| acc.replace(placeholder, value));
    PathCheck { assignments, expected }
}

fn generate_models(
    out: &mut EndpointOutput,
    endpoint: &EndpointRef<'_>,
    api: &str,
    sample: &Sample,
    unit_test: bool,
) -> Result<()> {
    let response_module = format!("{api}_{}", ModelKind::Response.module_suffix());
    let entity_module = format!("{api}_{}", ModelKind::Entity.module_suffix());

    let response_tree = build_class_tree(ModelKind::Response, endpoint.api, &sample.root)?;
    let entity_tree = build_class_tree(ModelKind::Entity, endpoint.api, &sample.root)?;

    // the mapper pass gets trees of its own
    let modules = MapperModules { response: &response_module, entity: &entity_module };
    let mapper_src = emit_mapper(
        &build_class_tree(ModelKind::Response, endpoint.api, &sample.root)?,
        &build_class_tree(ModelKind::Entity, endpoint.api, &sample.root)?,
        modules,
    )?;

    out.module(response_module.clone(), ResponseEmitter::new(sample.is_list).emit(&response_tree));
    out.module(entity_module.clone(), emit_entity(&entity_tree));
    out.mapper = Some(MapperSection {
        response_module: response_module.clone(),
        entity_module: entity_module.clone(),
        source: format!("// {}\n{mapper_src}", out.label),
    });
    if !unit_test {
        return Ok(());
    }

    let response = Target { module: &response_module, class: response_tree.ident() };
    let entity = Target { module: &entity_module, class: entity_tree.ident() };
    let response_fixture = Fixture::new(ModelKind::Response, endpoint.api, &sample.root)?;
    let entity_fixture = Fixture::new(ModelKind::Entity, endpoint.api, &sample.root)?;
    let response_expr = response_fixture.expression(&sample.root, &response_module);
    let entity_expr = entity_fixture.expression(&sample.root, &entity_module);

    let json_file = format!("{response_module}.json");
    let sample_file = format!("{response_module}_sample.json");
    out.fixture_json(&json_file, &response_fixture.canonical_json(&sample.root));
    out.fixture_json(&sample_file, &serde_json::Value::Object(sample.root.clone()));
    out.test_module(
        format!("{response_module}_test"),
        test_suite::response_test(response, &response_expr, &sample_file, &json_file),
    );
    let fields: Vec<String> = entity_tree.fields.iter().map(|f| f.ident.clone()).collect();
    out.test_module(
        format!("{entity_module}_test"),
        test_suite::entity_test(entity, &entity_expr, &fields),
    );
    out.test_module(
        format!("{api}_mapper_test"),
        test_suite::mapper_test(response, &response_expr, entity, &entity_expr),
    );
    Ok(())
}

/// Generate every endpoint of every manifest, then add page and directory indexes.
///
/// # Errors
///
/// Only fatal errors (file system) are returned; endpoint failures are
/// collected in [`Plan::failures`].
pub fn plan(manifests: &[LoadedManifest], config: &GeneratorConfig) -> Result<Plan> {
    let endpoints: Vec<EndpointRef<'_>> = manifests.iter().flat_map(|m| m.endpoints()).collect();
    let results: Vec<(String, Result<EndpointOutput>)> = endpoints
        .par_iter()
        .map(|endpoint| (endpoint.label(), generate_endpoint(*endpoint, config.unit_test)))
        .collect();

    let mut plan = Plan::default();
    let mut features: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut pages: IndexMap<(String, String), PageIndex> = IndexMap::new();

    for (label, result) in results {
        let output = match result {
            Ok(output) => output,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                error!(endpoint = %label, "{err}");
                plan.failures.push(Failure { endpoint: label, error: err });
                continue;
            }
        };
        let key = (output.feature.clone(), output.page.clone());
        let page = pages.entry(key).or_default();
        if let Some(taken) = output.modules.iter().find(|m| page.modules.contains(m)) {
            let message = format!("module `{taken}` already generated by another endpoint; skipped");
            warn!(endpoint = %label, "{message}");
            plan.warnings.push(Warning { endpoint: label, message });
            continue;
        }
        if !output.modules.is_empty() {
            let page_list = features.entry(output.feature.clone()).or_default();
            if !page_list.contains(&output.page) {
                page_list.push(output.page.clone());
            }
        }
        plan.warnings.extend(output.warnings);
        plan.artifacts.extend(output.artifacts);
        page.modules.extend(output.modules);
        page.test_modules.extend(output.test_modules);
        page.mappers.extend(output.mapper);
    }

    for ((feature, page), index) in &pages {
        let dir = Path::new(feature).join(page);
        if !index.mappers.is_empty() {
            let modules: Vec<MapperModules<'_>> = index
                .mappers
                .iter()
                .map(|m| MapperModules { response: &m.response_module, entity: &m.entity_module })
                .collect();
            let sections: Vec<String> = index.mappers.iter().map(|m| m.source.clone()).collect();
            plan.artifacts.push(Artifact { path: dir.join("mapper.rs"), contents: mapper_file(&modules, &sections) });
        }
        if index.modules.is_empty() {
            continue;
        }
        plan.artifacts.push(Artifact { path: dir.join("mod.rs"), contents: page_mod(index) });
    }
    for (feature, page_list) in &features {
        plan.artifacts.push(Artifact { path: Path::new(feature).join("mod.rs"), contents: mod_file(page_list) });
    }
    if !features.is_empty() {
        let names: Vec<String> = features.keys().cloned().collect();
        plan.artifacts.push(Artifact { path: PathBuf::from("mod.rs"), contents: mod_file(&names) });
    }
    Ok(plan)
}

fn mod_file(children: &[String]) -> String {
    let mut out = format!("{HEADER}\n\n");
    for child in children {
        out.push_str(&format!("pub mod {child};\n"));
    }
    out
}

fn page_mod(index: &PageIndex) -> String {
    let mut out = format!("{HEADER}\n\n");
    for module in &index.modules {
        out.push_str(&format!("pub mod {module};\n"));
    }
    if !index.mappers.is_empty() {
        out.push_str("pub mod mapper;\n");
    }
    if !index.test_modules.is_empty() {
        out.push('\n');
    }
    for module in &index.test_modules {
        out.push_str(&format!("#[cfg(test)]\nmod {module};\n"));
    }
    out
}

/// Generate, write and (optionally) format.
pub fn run(manifests: &[LoadedManifest], config: &GeneratorConfig, formatter: Option<&dyn Formatter>) -> Result<RunReport> {
    let plan = plan(manifests, config)?;
    let tree = OutputTree::new(&config.output_dir, config.replace);
    tree.create_dir(Path::new(""))?;

    let mut report = RunReport { warnings: plan.warnings, failures: plan.failures, ..RunReport::default() };
    let mut touched = Vec::new();
    for artifact in &plan.artifacts {
        match tree.write(&artifact.path, &artifact.contents)? {
            WriteOutcome::Written => {
                report.written += 1;
                if artifact.path.extension().is_some_and(|ext| ext == "rs") {
                    touched.push(tree.path(&artifact.path));
                }
            }
            WriteOutcome::Unchanged => report.unchanged += 1,
            WriteOutcome::Kept => report.kept += 1,
        }
    }

    if let Some(formatter) = formatter {
        if let Err(message) = formatter.format(&touched) {
            warn!("{message}");
            report.warnings.push(Warning { endpoint: "rustfmt".to_string(), message });
        }
    }
    info!(written = report.written, unchanged = report.unchanged, kept = report.kept, "done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;

    fn loaded(yaml: &str, base_dir: &Path) -> LoadedManifest {
        LoadedManifest {
            path: base_dir.join("api.yaml"),
            base_dir: base_dir.to_path_buf(),
            manifest: Manifest::parse(Path::new("api.yaml"), yaml).unwrap(),
        }
    }

    fn paths(plan: &Plan) -> Vec<String> {
        plan.artifacts.iter().map(|a| a.path.to_string_lossy().replace('\\', "/")).collect()
    }

    #[test]
    fn layout_for_one_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("r.json"), r#"{"id": 1}"#).unwrap();
        let manifest = loaded("auth:\n  login:\n    sign_in:\n      path: /login\n      method: post\n      response: r.json\n", dir.path());
        let plan = plan(&[manifest], &GeneratorConfig::default()).unwrap();
        assert_eq!(
            paths(&plan),
            vec![
                "auth/login/sign_in_body.rs",
                "auth/login/fixtures/sign_in_body.json",
                "auth/login/sign_in_body_test.rs",
                "auth/login/sign_in_response.rs",
                "auth/login/sign_in_entity.rs",
                "auth/login/fixtures/sign_in_response.json",
                "auth/login/fixtures/sign_in_response_sample.json",
                "auth/login/sign_in_response_test.rs",
                "auth/login/sign_in_entity_test.rs",
                "auth/login/sign_in_mapper_test.rs",
                "auth/login/mapper.rs",
                "auth/login/mod.rs",
                "auth/mod.rs",
                "mod.rs",
            ]
        );
        let page_mod = &plan.artifacts[11].contents;
        assert!(page_mod.contains("pub mod sign_in_body;\npub mod sign_in_response;\npub mod sign_in_entity;\npub mod mapper;\n"));
        assert!(page_mod.contains("#[cfg(test)]\nmod sign_in_mapper_test;\n"));
        assert!(plan.warnings.is_empty());
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn return_data_gates_models_and_unit_test_gates_tests() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = loaded("a:\n  b:\n    ping:\n      path: /ping\n      method: head\n      return_data: status_code\n", dir.path());
        let config = GeneratorConfig { unit_test: false, ..GeneratorConfig::default() };
        let plan = plan(&[manifest], &config).unwrap();
        assert_eq!(paths(&plan), vec!["a/b/ping_body.rs", "a/b/mod.rs", "a/mod.rs", "mod.rs"]);
    }

    #[test]
    fn malformed_samples_skip_their_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "[1, 2]").unwrap();
        let manifest = loaded("a:\n  b:\n    c:\n      path: /c\n      method: get\n      response: bad.json\n", dir.path());
        let config = GeneratorConfig { unit_test: false, ..GeneratorConfig::default() };
        let plan = plan(&[manifest], &config).unwrap();
        assert_eq!(paths(&plan), vec!["a/b/c_body.rs", "a/b/mod.rs", "a/mod.rs", "mod.rs"]);
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].endpoint, "a/b/c");
    }

    #[test]
    fn path_check_substitutes_longest_first() {
        let ctx = BodyContext::new(crate::manifest::HttpMethod::Get, "/u/:id/:id_kind");
        let root = build_class_tree(ModelKind::Body, "u", &serde_json::Map::new()).unwrap();
        let extras = RootExtras::allocate(&root, &ctx);
        let check = path_check(&ctx.path, &extras);
        let expected: Vec<(String, String)> =
            vec![("id".into(), "v0".into()), ("id_kind".into(), "v1".into())];
        assert_eq!(check.assignments, expected);
        assert_eq!(check.expected, "/u/v0/v1");
    }
}
