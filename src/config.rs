use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GenError, Result};
use crate::path_de;

/// Generator settings; every field can also come from a CLI flag.
///
/// ```toml
/// output_dir = "src/api"
/// replace = true
/// unit_test = true
/// format = true
/// rustfmt_edition = "2021"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    /// Overwrite files that already exist.
    pub replace: bool,
    /// Also write `*_test.rs` modules and JSON fixtures.
    pub unit_test: bool,
    /// Run `rustfmt` over written files.
    pub format: bool,
    pub rustfmt_edition: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            replace: false,
            unit_test: true,
            format: false,
            rustfmt_edition: "2021".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|source| GenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &src)
    }

    pub fn parse(path: &Path, src: &str) -> Result<Self> {
        path_de::from_toml_with_path(src).map_err(|message| GenError::Config {
            path: path.to_path_buf(),
            message,
        })
    }
}
