//! The endpoint manifest: `feature → page → api → endpoint`.
//!
//! ```yaml
//! auth:
//!   login:
//!     sign_in:
//!       path: /auth/login
//!       method: post
//!       body: samples/sign_in_body.json
//!       response: samples/sign_in_response.json
//!       cache_strategy: { strategy: cache_or_async, ttl: 60 }
//! ```
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{GenError, Result};
use crate::path_de;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

pub type Page = IndexMap<String, EndpointSpec>;
pub type Feature = IndexMap<String, Page>;

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub features: IndexMap<String, Feature>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSpec {
    pub path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub body: Option<PathBuf>,
    #[serde(default)]
    pub response: Option<PathBuf>,
    #[serde(default)]
    pub header: Option<PathBuf>,
    #[serde(default)]
    pub cache_strategy: Option<CacheStrategy>,
    #[serde(default)]
    pub return_data: ReturnData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    #[serde(alias = "postMultipart")]
    PostMultipart,
    #[serde(alias = "putMultipart")]
    PutMultipart,
    #[serde(alias = "patchMultipart")]
    PatchMultipart,
}

impl HttpMethod {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post | Self::PostMultipart => "POST",
            Self::Put | Self::PutMultipart => "PUT",
            Self::Patch | Self::PatchMultipart => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    pub fn is_multipart(self) -> bool {
        matches!(self, Self::PostMultipart | Self::PutMultipart | Self::PatchMultipart)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStrategyKind {
    #[serde(alias = "asyncOrCache")]
    AsyncOrCache,
    #[serde(alias = "cacheOrAsync")]
    CacheOrAsync,
    #[serde(alias = "justAsync")]
    JustAsync,
    #[serde(alias = "justCache")]
    JustCache,
}

impl CacheStrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AsyncOrCache => "async_or_cache",
            Self::CacheOrAsync => "cache_or_async",
            Self::JustAsync => "just_async",
            Self::JustCache => "just_cache",
        }
    }
}

/// Either `cache_strategy: just_cache` or the long form with a TTL in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "CacheStrategyRepr")]
pub struct CacheStrategy {
    pub kind: CacheStrategyKind,
    pub ttl_minutes: Option<u64>,
    pub keep_expired_cache: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CacheStrategyRepr {
    Name(CacheStrategyKind),
    Full {
        strategy: CacheStrategyKind,
        #[serde(default)]
        ttl: Option<u64>,
        #[serde(default, alias = "keepExpiredCache")]
        keep_expired_cache: bool,
    },
}

impl From<CacheStrategyRepr> for CacheStrategy {
    fn from(repr: CacheStrategyRepr) -> Self {
        match repr {
            CacheStrategyRepr::Name(kind) => Self { kind, ttl_minutes: None, keep_expired_cache: false },
            CacheStrategyRepr::Full { strategy, ttl, keep_expired_cache } => {
                Self { kind: strategy, ttl_minutes: ttl, keep_expired_cache }
            }
        }
    }
}

/// What the endpoint hands back to callers. Only `Model` gets typed models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnData {
    #[default]
    Model,
    Header,
    #[serde(alias = "bodyBytes")]
    BodyBytes,
    #[serde(alias = "bodyString")]
    BodyString,
    #[serde(alias = "statusCode")]
    StatusCode,
    Raw,
}

impl ReturnData {
    pub fn has_model(self) -> bool {
        self == Self::Model
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: String,
    /// The text to substitute, e.g. `{id}` or `:id`.
    pub placeholder: String,
}

/// A parsed manifest and the directory its sample paths are relative to.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub manifest: Manifest,
}

/// One endpoint with its location in the manifest.
#[derive(Debug, Clone, Copy)]
pub struct EndpointRef<'a> {
    pub feature: &'a str,
    pub page: &'a str,
    pub api: &'a str,
    pub spec: &'a EndpointSpec,
    pub base_dir: &'a Path,
}

impl EndpointRef<'_> {
    /// `feature/page/api`, used in logs and warnings.
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.feature, self.page, self.api)
    }

    pub fn resolve(&self, sample: &Path) -> PathBuf {
        self.base_dir.join(sample)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Manifest {
    pub fn parse(path: &Path, src: &str) -> Result<Self> {
        if src.trim().is_empty() {
            return Ok(Self { features: IndexMap::new() });
        }
        path_de::from_yaml_with_path(src).map_err(|message| GenError::Manifest {
            path: path.to_path_buf(),
            message,
        })
    }
}

impl LoadedManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|source| GenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Manifest::parse(path, &src)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self { path: path.to_path_buf(), base_dir, manifest })
    }

    /// Every endpoint in declaration order.
    pub fn endpoints(&self) -> Vec<EndpointRef<'_>> {
        let mut out = Vec::new();
        for (feature, pages) in &self.manifest.features {
            for (page, apis) in pages {
                for (api, spec) in apis {
                    out.push(EndpointRef { feature, page, api, spec, base_dir: &self.base_dir });
                }
            }
        }
        out
    }
}

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}|:([A-Za-z_][A-Za-z0-9_]*)").expect("valid path param pattern")
});

/// `{id}` and `:id` segments of an endpoint path, first occurrence wins.
pub fn path_params(path: &str) -> Vec<PathParam> {
    let mut params: Vec<PathParam> = Vec::new();
    for caps in PATH_PARAM.captures_iter(path) {
        let (Some(placeholder), Some(name)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) else {
            continue;
        };
        if params.iter().any(|p| p.name == name.as_str()) {
            continue;
        }
        params.push(PathParam {
            name: name.as_str().to_string(),
            placeholder: placeholder.as_str().to_string(),
        });
    }
    params
}

/// Read a header file: a JSON object whose values become strings.
pub fn load_headers(path: &Path) -> std::result::Result<Vec<(String, String)>, String> {
    let src = std::fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let map: IndexMap<String, serde_json::Value> =
        path_de::from_json_with_path(&src).map_err(|err| format!("{}: {err}", path.display()))?;
    Ok(map
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect())
}
