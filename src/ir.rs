// Typed class tree shared by every emitter. No serde_json::Value here.

use serde::Serialize;

/// Semantic type inferred for one JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of")]
pub enum InferredType {
    Int,
    Double,
    Bool,
    String,
    DateTime,        // ISO-8601-ish string, see inference::str
    ObjectRef(String),
    ListOf(Box<InferredType>),
    Dynamic,         // null, empty array element, anything unmodelled
}

impl InferredType {
    /// The class a (possibly nested) list or object field points at.
    pub fn object_ref(&self) -> Option<&str> {
        match self {
            Self::ObjectRef(name) => Some(name),
            Self::ListOf(inner) => inner.object_ref(),
            _ => None,
        }
    }

    pub fn contains_date_time(&self) -> bool {
        match self {
            Self::DateTime => true,
            Self::ListOf(inner) => inner.contains_date_time(),
            _ => false,
        }
    }
}

/// Which of the three model shapes a tree is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Body,
    Response,
    Entity,
}

impl ModelKind {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Body => "Body",
            Self::Response => "Response",
            Self::Entity => "Entity",
        }
    }

    /// File / module stem fragment, e.g. `login_response`.
    pub fn module_suffix(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Response => "response",
            Self::Entity => "entity",
        }
    }
}

/// A class identifier as recorded in a [`crate::naming::NameRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassName {
    pub text: String,
    pub parent: String,
    pub list_context: Option<String>,
    pub is_definition: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: String,         // JSON key, verbatim
    pub ident: String,       // Rust field identifier
    pub ty: InferredType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDefinition {
    pub name: ClassName,
    pub fields: Vec<Field>,  // JSON key order
    pub children: Vec<ClassDefinition>, // objects first, then lists of objects
}

impl ClassDefinition {
    pub fn ident(&self) -> &str {
        &self.name.text
    }

    /// Depth-first, parent before children: the order classes are emitted in.
    pub fn walk(&self) -> Vec<&ClassDefinition> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }

    pub fn child(&self, name: &str) -> Option<&ClassDefinition> {
        self.children.iter().find(|c| c.ident() == name)
    }

    pub fn uses_date_time(&self) -> bool {
        self.walk()
            .iter()
            .any(|class| class.fields.iter().any(|f| f.ty.contains_date_time()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(text: &str, fields: Vec<Field>, children: Vec<ClassDefinition>) -> ClassDefinition {
        ClassDefinition {
            name: ClassName {
                text: text.into(),
                parent: String::new(),
                list_context: None,
                is_definition: true,
            },
            fields,
            children,
        }
    }

    #[test]
    fn walk_is_depth_first() {
        let tree = class(
            "A",
            vec![],
            vec![class("B", vec![], vec![class("C", vec![], vec![])]), class("D", vec![], vec![])],
        );
        let order: Vec<&str> = tree.walk().iter().map(|c| c.ident()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn nested_list_reaches_object() {
        let ty = InferredType::ListOf(Box::new(InferredType::ListOf(Box::new(
            InferredType::ObjectRef("X".into()),
        ))));
        assert_eq!(ty.object_ref(), Some("X"));
        assert!(!ty.contains_date_time());
    }

    #[test]
    fn date_time_is_found_in_children() {
        let date = Field {
            key: "at".into(),
            ident: "at".into(),
            ty: InferredType::ListOf(Box::new(InferredType::DateTime)),
        };
        let tree = class("A", vec![], vec![class("B", vec![date], vec![])]);
        assert!(tree.uses_date_time());
    }
}
