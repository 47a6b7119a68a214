//! Per-pass class name registry.
//!
//! One registry lives for exactly one emission pass of one endpoint (body,
//! response, entity, mapper or fixture). Names are composed from a suffix and
//! a base, and collisions between unrelated structural contexts are resolved
//! by prefixing a fixed sequence of Greek-letter tokens.

use tracing::debug;

use crate::error::{GenError, Result};
use crate::ir::ClassName;

pub const DISAMBIGUATION_TOKENS: [&str; 24] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega",
];

/// What a caller asks the registry for.
#[derive(Debug, Clone, Copy)]
pub struct NameRequest<'a> {
    pub suffix: &'a str,
    pub base: &'a str,
    pub is_root: bool,
    pub is_definition: bool,
    pub parent: &'a str,
    pub list_context: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct NameRegistry {
    entries: Vec<ClassName>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ClassName] {
        &self.entries
    }

    /// Root classes lead with the suffix, nested classes lead with the base.
    pub fn compose(suffix: &str, base: &str, is_root: bool) -> String {
        if is_root {
            format!("{suffix}{base}")
        } else {
            format!("{base}{suffix}")
        }
    }

    pub fn class_name(&mut self, req: NameRequest<'_>) -> Result<String> {
        if req.is_root {
            self.entries.clear();
        }
        let candidate = Self::compose(req.suffix, req.base, req.is_root);
        let text = self.resolve(&candidate, req.parent, req.list_context)?;
        self.record(ClassName {
            text: text.clone(),
            parent: req.parent.to_string(),
            list_context: req.list_context.map(str::to_string),
            is_definition: req.is_definition,
        });
        Ok(text)
    }

    fn resolve(&self, candidate: &str, parent: &str, list_context: Option<&str>) -> Result<String> {
        if self.has_definition(candidate, parent, list_context) {
            return Ok(candidate.to_string());
        }
        let owned_elsewhere = self.entries.iter().any(|e| {
            e.is_definition
                && e.text == candidate
                && (e.parent != parent || e.list_context.as_deref() != list_context)
        });
        if !owned_elsewhere {
            return Ok(candidate.to_string());
        }

        let mut tried = Vec::with_capacity(DISAMBIGUATION_TOKENS.len());
        for token in DISAMBIGUATION_TOKENS {
            let prefixed = format!("{token}{candidate}");
            let accept = self.has_definition(&prefixed, parent, list_context)
                || self.has_placeholder(&prefixed, parent)
                || self.is_unclaimed(&prefixed, parent);
            if accept {
                debug!(candidate, parent, chosen = %prefixed, "disambiguated class name");
                return Ok(prefixed);
            }
            tried.push(prefixed);
        }
        Err(GenError::NamesExhausted {
            candidate: candidate.to_string(),
            parent: parent.to_string(),
            tried,
        })
    }

    fn has_definition(&self, text: &str, parent: &str, list_context: Option<&str>) -> bool {
        self.entries.iter().any(|e| {
            e.is_definition
                && e.text == text
                && e.parent == parent
                && e.list_context.as_deref() == list_context
        })
    }

    fn has_placeholder(&self, text: &str, parent: &str) -> bool {
        self.entries
            .iter()
            .any(|e| !e.is_definition && e.text == text && e.parent == parent)
    }

    // Free unless another parent refers to it or any definition owns it; a
    // same-context definition is already covered by `has_definition`.
    fn is_unclaimed(&self, text: &str, parent: &str) -> bool {
        !self
            .entries
            .iter()
            .any(|e| e.text == text && (e.parent != parent || e.is_definition))
    }

    fn record(&mut self, name: ClassName) {
        let same_identity = |e: &ClassName| {
            e.text == name.text
                && e.parent == name.parent
                && e.list_context == name.list_context
                && e.is_definition == name.is_definition
        };
        match self.entries.iter().position(same_identity) {
            Some(i) => self.entries[i] = name,
            None => self.entries.push(name),
        }
    }
}
