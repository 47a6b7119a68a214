//! Lower a JSON object into a tree of class definitions.
//!
//! One builder (and therefore one registry) per pass. Children are built
//! before field types are resolved, so every `ObjectRef` names a class that
//! already exists in the tree.

use serde_json::{Map, Value};

use crate::case::{self, IdentAllocator};
use crate::error::Result;
use crate::inference::{KeyKind, TypeResolver, field_iteration_order, first_object, key_kind};
use crate::ir::{ClassDefinition, ClassName, Field, ModelKind};
use crate::naming::{NameRegistry, NameRequest};

pub struct ClassTreeBuilder {
    registry: NameRegistry,
    suffix: &'static str,
}

impl ClassTreeBuilder {
    pub fn new(kind: ModelKind) -> Self {
        Self { registry: NameRegistry::new(), suffix: kind.suffix() }
    }

    /// Root class for an endpoint: `<Endpoint><Suffix>`, e.g. `LoginResponse`.
    pub fn build_root(&mut self, endpoint: &str, object: &Map<String, Value>) -> Result<ClassDefinition> {
        let endpoint = case::type_ident(endpoint);
        self.build(&endpoint, self.suffix, "", object, true, None)
    }

    pub fn build(
        &mut self,
        suffix: &str,
        name: &str,
        parent: &str,
        object: &Map<String, Value>,
        is_root: bool,
        list_context: Option<&str>,
    ) -> Result<ClassDefinition> {
        let own = self.registry.class_name(NameRequest {
            suffix,
            base: name,
            is_root,
            is_definition: true,
            parent,
            list_context,
        })?;
        let nested_context = format!("{}{own}", list_context.unwrap_or(""));

        let mut children: Vec<ClassDefinition> = Vec::new();
        for (key, kind) in field_iteration_order(object) {
            let child_context = match kind {
                KeyKind::Object => list_context,
                KeyKind::ObjectList => Some(nested_context.as_str()),
                KeyKind::Scalar => continue,
            };
            let Some(child_object) = object.get(key).and_then(first_object) else {
                continue;
            };
            let base = case::type_ident(key);
            let child = self.build(self.suffix, &base, &own, child_object, false, child_context)?;
            // keys that collapse to one name (`userName` / `user_name`) share the first class
            if !children.iter().any(|c| c.ident() == child.ident()) {
                children.push(child);
            }
        }

        let mut idents = IdentAllocator::new();
        let mut fields = Vec::with_capacity(object.len());
        for (key, value) in object {
            let field_context = match key_kind(value) {
                KeyKind::ObjectList => Some(nested_context.as_str()),
                _ => list_context,
            };
            let ty = TypeResolver::new(&mut self.registry, self.suffix)
                .resolve(key, value, &own, field_context)?;
            fields.push(Field { key: key.clone(), ident: idents.allocate(key), ty });
        }

        Ok(ClassDefinition {
            name: ClassName {
                text: own,
                parent: parent.to_string(),
                list_context: list_context.map(str::to_string),
                is_definition: true,
            },
            fields,
            children,
        })
    }
}

/// Build a fresh tree with its own registry; the registry is dropped on return.
pub fn build_class_tree(kind: ModelKind, endpoint: &str, object: &Map<String, Value>) -> Result<ClassDefinition> {
    ClassTreeBuilder::new(kind).build_root(endpoint, object)
}
