use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use json2model::config::GeneratorConfig;
use json2model::error::GenError;
use json2model::generate::{self, RunReport};
use json2model::manifest::LoadedManifest;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn file(&self, name: &str, contents: &str) -> &Self {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
        self
    }

    fn sample(&self, name: &str, value: Value) -> &Self {
        self.file(name, &value.to_string())
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn config(&self, replace: bool) -> GeneratorConfig {
        GeneratorConfig { output_dir: self.out(), replace, ..GeneratorConfig::default() }
    }

    fn run(&self, config: &GeneratorConfig) -> RunReport {
        let manifest = LoadedManifest::load(&self.dir.path().join("api.yaml")).unwrap();
        generate::run(&[manifest], config, None).unwrap()
    }

    fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.out().join(relative)).unwrap()
    }

    fn json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        let mut files = BTreeMap::new();
        collect(&self.out(), &self.out(), &mut files);
        files
    }
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, String>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let contents = std::fs::read_to_string(&path).unwrap();
            files.insert(path.strip_prefix(root).unwrap().to_path_buf(), contents);
        }
    }
}

const USER_MANIFEST: &str = "\
user:
  profile:
    get_user:
      path: /users/{id}
      method: get
      response: samples/get_user.json
    update_user:
      path: /users/{id}
      method: put
      body: samples/update_user_body.json
      response: samples/update_user.json
";

fn user_workspace() -> Workspace {
    let ws = Workspace::new();
    ws.file("api.yaml", USER_MANIFEST)
        .sample(
            "samples/get_user.json",
            json!({"id": 1, "createdAt": "2024-01-02T10:00:00Z", "user": {"name": "a"}, "tags": []}),
        )
        .sample("samples/update_user_body.json", json!({"name": "b", "nick": null}))
        .sample("samples/update_user.json", json!({"user": {"name": "c"}}));
    ws
}

#[test]
fn replace_twice_is_byte_identical() {
    let ws = user_workspace();
    let first = ws.run(&ws.config(true));
    assert!(first.is_success());
    assert!(first.written > 0);
    let before = ws.snapshot();

    let second = ws.run(&ws.config(true));
    assert_eq!(second.written, 0);
    assert_eq!(second.unchanged, before.len());
    assert_eq!(ws.snapshot(), before);
}

#[test]
fn scenario_a_scalars_and_dates() {
    let ws = user_workspace();
    ws.run(&ws.config(true));
    let response = ws.read("user/profile/get_user_response.rs");
    assert!(response.contains("pub id: Option<i64>,"));
    assert!(response.contains("pub created_at: Option<chrono::NaiveDateTime>,"));
    assert_eq!(
        ws.json("user/profile/fixtures/get_user_response.json"),
        json!({"id": 1, "createdAt": "2024-01-02T10:00:00", "user": {"name": "a"}, "tags": []})
    );
    assert_eq!(
        ws.json("user/profile/fixtures/get_user_response_sample.json"),
        json!({"id": 1, "createdAt": "2024-01-02T10:00:00Z", "user": {"name": "a"}, "tags": []})
    );
    let suite = ws.read("user/profile/get_user_response_test.rs");
    assert!(suite.contains("include_str!(\"fixtures/get_user_response_sample.json\")"));
}

#[test]
fn lenient_values_reach_both_fixtures() {
    let ws = Workspace::new();
    ws.file("api.yaml", "a:\n  b:\n    stats:\n      path: /s\n      method: get\n      response: stats.json\n")
        .file(
            "stats.json",
            r#"{"big": 18446744073709551615, "updated": "2024-01-02T10:00+07:00", "at": "2024-01-02-0500"}"#,
        );
    let report = ws.run(&ws.config(true));
    assert!(report.is_success());
    let response = ws.read("a/b/stats_response.rs");
    assert!(response.contains("pub big: Option<f64>,"));
    assert!(response.contains("pub updated: Option<chrono::NaiveDateTime>,"));
    let canonical = ws.json("a/b/fixtures/stats_response.json");
    assert_eq!(canonical["big"].as_f64(), Some(u64::MAX as f64));
    assert_eq!(canonical["updated"], json!("2024-01-02T03:00:00"));
    assert_eq!(canonical["at"], json!("2024-01-02T05:00:00"));
    assert_eq!(ws.json("a/b/fixtures/stats_response_sample.json")["updated"], json!("2024-01-02T10:00+07:00"));
}

#[test]
fn scenario_c_empty_list_is_dynamic() {
    let ws = user_workspace();
    ws.run(&ws.config(true));
    let response = ws.read("user/profile/get_user_response.rs");
    assert!(response.contains("pub tags: Option<Vec<serde_json::Value>>,"));
    assert_eq!(ws.json("user/profile/fixtures/get_user_response.json")["tags"], json!([]));
}

#[test]
fn scenario_d_registries_are_per_endpoint() {
    let ws = user_workspace();
    ws.run(&ws.config(true));
    for file in ["get_user_response.rs", "update_user_response.rs"] {
        let src = ws.read(&format!("user/profile/{file}"));
        assert!(src.contains("pub struct UserResponse {"), "{file}");
        assert!(!src.contains("AlphaUserResponse"), "{file}");
    }
    let mapper = ws.read("user/profile/mapper.rs");
    assert!(mapper.contains("impl From<get_user_response::UserResponse> for get_user_entity::UserEntity {"));
    assert!(mapper.contains("impl From<update_user_response::UserResponse> for update_user_entity::UserEntity {"));
    assert!(mapper.find("// user/profile/get_user").unwrap() < mapper.find("// user/profile/update_user").unwrap());
}

#[test]
fn indexes_and_body_metadata() {
    let ws = user_workspace();
    ws.run(&ws.config(true));
    assert_eq!(ws.read("mod.rs").lines().last(), Some("pub mod user;"));
    assert_eq!(ws.read("user/mod.rs").lines().last(), Some("pub mod profile;"));
    let page = ws.read("user/profile/mod.rs");
    assert!(page.contains("pub mod get_user_body;\npub mod get_user_response;\npub mod get_user_entity;\n"));
    assert!(page.contains("pub mod mapper;"));
    assert!(page.contains("#[cfg(test)]\nmod update_user_body_test;"));

    let body = ws.read("user/profile/update_user_body.rs");
    assert!(body.contains("pub const METHOD: &str = \"PUT\";"));
    assert!(body.contains("pub id: String,"));
    assert!(body.contains("PATH.replace(\"{id}\", &self.id)"));
    assert_eq!(ws.json("user/profile/fixtures/update_user_body.json"), json!({"name": "b"}));
    assert!(ws.read("user/profile/update_user_body_test.rs").contains("assert_eq!(body.path(), \"/users/v0\");"));
}

#[test]
fn replace_off_keeps_existing_files() {
    let ws = user_workspace();
    ws.run(&ws.config(false));
    let edited = ws.out().join("user/profile/get_user_entity.rs");
    std::fs::write(&edited, "// mine\n").unwrap();

    let report = ws.run(&ws.config(false));
    assert_eq!(report.written, 0);
    assert_eq!(std::fs::read_to_string(&edited).unwrap(), "// mine\n");

    ws.run(&ws.config(true));
    assert_ne!(std::fs::read_to_string(&edited).unwrap(), "// mine\n");
}

#[test]
fn malformed_samples_warn_and_skip() {
    let ws = Workspace::new();
    ws.file(
        "api.yaml",
        "a:\n  b:\n    broken:\n      path: /x\n      method: post\n      body: bad.json\n      response: bad.json\n",
    )
    .file("bad.json", "{ not json");
    let report = ws.run(&ws.config(true));
    assert!(report.is_success());
    assert_eq!(report.warnings.len(), 2);
    assert!(!ws.out().join("a/b/broken_body.rs").exists());
    assert!(!ws.out().join("a/b/broken_response.rs").exists());
    assert!(!ws.out().join("a/b/mod.rs").exists());
}

#[test]
fn missing_samples_are_empty_objects() {
    let ws = Workspace::new();
    ws.file("api.yaml", "a:\n  b:\n    ping:\n      path: /ping\n      method: get\n      response: nowhere.json\n");
    let report = ws.run(&ws.config(true));
    assert!(report.is_success());
    assert!(report.warnings.is_empty());
    assert!(ws.read("a/b/ping_response.rs").contains("pub struct PingResponse {\n}"));
    assert_eq!(ws.json("a/b/fixtures/ping_response.json"), json!({}));
}

#[test]
fn exhausted_names_fail_only_their_endpoint() {
    let crowded: serde_json::Map<String, Value> =
        (0..26).map(|i| (format!("p{i}"), json!({"x": {"v": i}}))).collect();
    let ws = Workspace::new();
    ws.file(
        "api.yaml",
        "a:\n  b:\n    crowded:\n      path: /c\n      method: get\n      response: crowded.json\n    fine:\n      path: /f\n      method: get\n",
    )
    .sample("crowded.json", Value::Object(crowded));
    let report = ws.run(&ws.config(true));
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].endpoint, "a/b/crowded");
    assert!(matches!(report.failures[0].error, GenError::NamesExhausted { .. }));
    assert!(ws.out().join("a/b/fine_body.rs").exists());
    assert!(!ws.out().join("a/b/crowded_body.rs").exists());
}

#[test]
fn unknown_manifest_keys_are_fatal() {
    let ws = Workspace::new();
    ws.file("api.yaml", "a:\n  b:\n    c:\n      path: /c\n      method: get\n      respnse: x.json\n");
    let err = LoadedManifest::load(&ws.dir.path().join("api.yaml")).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("a.b.c"), "{err}");
}
