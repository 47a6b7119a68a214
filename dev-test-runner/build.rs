//! Runs json2model over `samples/api.yaml` into `OUT_DIR/api` so the
//! generated models and their `#[test]` modules build with this crate.
use std::path::PathBuf;

use json2model::config::GeneratorConfig;
use json2model::generate;
use json2model::manifest::LoadedManifest;

fn main() {
    println!("cargo:rerun-if-changed=samples");
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("set by cargo"));

    let manifest = LoadedManifest::load(&manifest_dir.join("samples/api.yaml")).unwrap_or_else(|err| panic!("{err}"));
    let config = GeneratorConfig { output_dir: out_dir.join("api"), replace: true, ..GeneratorConfig::default() };
    let report = generate::run(&[manifest], &config, None).unwrap_or_else(|err| panic!("{err}"));
    for warning in &report.warnings {
        println!("cargo:warning={warning}");
    }
    if let Some(failure) = report.failures.first() {
        panic!("{}: {}", failure.endpoint, failure.error);
    }

    let root = config.output_dir.join("mod.rs");
    let wrapper = format!("#[path = {:?}]\npub mod api;\n", root.display().to_string());
    std::fs::write(out_dir.join("api.rs"), wrapper).expect("write api.rs");
}
