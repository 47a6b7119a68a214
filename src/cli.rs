//! CLI: manifest → generated sources, or a single sample → inspection output.
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::codegen::body::{BodyContext, BodyEmitter};
use crate::case::module_ident;
use crate::codegen::entity::emit_entity;
use crate::codegen::fixture::build_fixture;
use crate::codegen::response::ResponseEmitter;
use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::generate::{self, RunReport};
use crate::ir::ModelKind;
use crate::lower::build_class_tree;
use crate::manifest::{HttpMethod, LoadedManifest};
use crate::output::{Formatter, Rustfmt};
use crate::sample::Sample;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate body, response, entity, mapper and test sources from JSON samples
#[derive(Parser, Debug)]
#[command(name = "json2model", version)]
pub struct CommandLineInterface {
    /// more logging (-v info, -vv debug, -vvv trace); JSON2MODEL_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate every endpoint of one or more manifests
    Generate(GenerateArgs),
    /// show what a single sample infers to
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    /// One or more manifests. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    manifest: Vec<String>,

    /// TOML settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// overwrite existing files
    #[arg(long)]
    replace: bool,

    /// skip `*_test.rs` modules and JSON fixtures
    #[arg(long)]
    no_unit_test: bool,

    /// run rustfmt over written files
    #[arg(long)]
    format: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(Args, Debug, Clone)]
struct InspectArgs {
    /// JSON sample
    #[arg(long, short)]
    input: PathBuf,

    /// endpoint name the root class is named after
    #[arg(long, default_value = "sample")]
    name: String,

    #[arg(long, value_enum, default_value_t = InspectView::Tree)]
    view: InspectView,

    /// endpoint path, for the body view
    #[arg(long, default_value = "/")]
    path: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum InspectView {
    /// the response class tree as JSON
    Tree,
    Body,
    Response,
    Entity,
    /// the struct literal the generated response test expects
    Fixture,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl GenerateArgs {
    fn config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        config.replace |= self.replace;
        config.format |= self.format;
        if self.no_unit_test {
            config.unit_test = false;
        }
        Ok(config)
    }

    fn manifests(&self) -> anyhow::Result<Vec<LoadedManifest>> {
        let paths = resolve_file_path_patterns(&self.manifest)?;
        let mut manifests = Vec::with_capacity(paths.len());
        for path in paths {
            manifests.push(LoadedManifest::load(&path)?);
        }
        Ok(manifests)
    }
}

impl InspectArgs {
    fn render(&self) -> anyhow::Result<String> {
        let src = std::fs::read_to_string(&self.input)
            .map_err(|source| GenError::Read { path: self.input.clone(), source })?;
        let sample = Sample::parse(&src)
            .map_err(|reason| anyhow::anyhow!("{}: {reason}", self.input.display()))?;
        let root = &sample.root;
        Ok(match self.view {
            InspectView::Tree => {
                let tree = build_class_tree(ModelKind::Response, &self.name, root)?;
                serde_json::to_string_pretty(&tree)? + "\n"
            }
            InspectView::Body => {
                let mut ctx = BodyContext::new(HttpMethod::Post, self.path.clone());
                ctx.is_list = sample.is_list;
                BodyEmitter::new(&ctx).emit(&build_class_tree(ModelKind::Body, &self.name, root)?)
            }
            InspectView::Response => ResponseEmitter::new(sample.is_list)
                .emit(&build_class_tree(ModelKind::Response, &self.name, root)?),
            InspectView::Entity => emit_entity(&build_class_tree(ModelKind::Entity, &self.name, root)?),
            InspectView::Fixture => {
                let alias = format!("{}_{}", module_ident(&self.name), ModelKind::Response.module_suffix());
                build_fixture(ModelKind::Response, &self.name, root, &alias)? + "\n"
            }
        })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `Ok(false)` when some endpoint failed; the caller turns that into the exit code.
    pub fn run(&self) -> anyhow::Result<bool> {
        crate::logging::init(self.verbose)?;
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(true);
                }
                let config = target.config()?;
                let manifests = target.manifests()?;
                let rustfmt = Rustfmt { edition: config.rustfmt_edition.clone() };
                let formatter = config.format.then_some(&rustfmt as &dyn Formatter);
                let report = generate::run(&manifests, &config, formatter)
                    .with_context(|| format!("generating into {}", config.output_dir.display()))?;
                print_report(&report);
                Ok(report.is_success())
            }
            Command::Inspect(target) => {
                let rendered = target.render()?;
                match target.out.as_ref() {
                    Some(out) => {
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)
                                .map_err(|source| GenError::CreateDir { path: parent.to_path_buf(), source })?;
                        }
                        std::fs::write(out, &rendered)
                            .map_err(|source| GenError::Write { path: out.clone(), source })?;
                    }
                    None => print!("{rendered}"),
                }
                Ok(true)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn print_report(report: &RunReport) {
    for warning in &report.warnings {
        eprintln!("{} {warning}", "warn:".yellow().bold());
    }
    for failure in &report.failures {
        eprintln!("{} {}: {}", "error:".red().bold(), failure.endpoint, failure.error);
    }
    let status = if report.is_success() { "done".green().bold() } else { "failed".red().bold() };
    eprintln!(
        "{status} {} written, {} unchanged, {} kept, {} warnings, {} failed endpoints",
        report.written,
        report.unchanged,
        report.kept,
        report.warnings.len(),
        report.failures.len()
    );
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, GenError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();
        let glob_error = |message: String| GenError::Glob { pattern: pattern.to_string(), message };

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            let entries = glob::glob(pattern).map_err(|e| glob_error(e.to_string()))?;
            for entry in entries {
                let path = entry.map_err(|e| glob_error(e.to_string()))?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(glob_error("matched no files".to_string()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
