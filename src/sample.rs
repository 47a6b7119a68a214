//! Loading JSON samples.
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{GenError, Result};

/// The root object a model is inferred from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub root: Map<String, Value>,
    /// The sample was an array of objects; `root` is its first element.
    pub is_list: bool,
}

/// A sample that loaded, or the reason it can't be used.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Sample(Sample),
    Malformed(String),
}

impl Sample {
    pub fn empty() -> Self {
        Self { root: Map::new(), is_list: false }
    }

    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Object(root) => Ok(Self { root, is_list: false }),
            Value::Array(items) => match items.into_iter().next() {
                Some(Value::Object(root)) => Ok(Self { root, is_list: true }),
                _ => Err("root array does not start with an object".to_string()),
            },
            other => Err(format!("root is {}, expected an object or an array of objects", json_kind(&other))),
        }
    }

    pub fn parse(src: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_str(src).map_err(|err| format!("invalid JSON: {err}"))?;
        Self::from_value(value)
    }
}

/// Missing files (and undeclared samples) become `{}`. Unreadable files are fatal.
pub fn load(path: Option<&Path>) -> Result<Loaded> {
    let Some(path) = path else {
        return Ok(Loaded::Sample(Sample::empty()));
    };
    let src = match std::fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "sample not found, using {{}}");
            return Ok(Loaded::Sample(Sample::empty()));
        }
        Err(source) => return Err(GenError::Read { path: path.to_path_buf(), source }),
    };
    Ok(match Sample::parse(&src) {
        Ok(sample) => Loaded::Sample(sample),
        Err(reason) => Loaded::Malformed(format!("{}: {reason}", path.display())),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
