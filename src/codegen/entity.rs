//! Domain entities: the response shape without any wire code.
use crate::codegen::{Codegen, emit_fields, rust_type};
use crate::ir::ClassDefinition;

pub fn emit_entity(root: &ClassDefinition) -> String {
    let mut cg = Codegen::file();
    for (index, class) in root.walk().into_iter().enumerate() {
        if index > 0 {
            cg.blank();
        }
        emit_class(&mut cg, class);
    }
    cg.into_string()
}

fn emit_class(cg: &mut Codegen, class: &ClassDefinition) {
    let name = class.ident();
    cg.line("#[derive(Debug, Clone, PartialEq, Default)]");
    cg.open(format!("pub struct {name} {{"));
    emit_fields(cg, class);
    cg.close("}");
    cg.blank();

    cg.open(format!("impl {name} {{"));
    cg.line("/// A copy with the given fields replaced; `None` keeps the current value.");
    if class.fields.is_empty() {
        cg.open("pub fn copy_with(&self) -> Self {");
        cg.line("self.clone()");
        cg.close("}");
    } else {
        if class.fields.len() > 6 {
            cg.line("#[allow(clippy::too_many_arguments)]");
        }
        cg.open("pub fn copy_with(");
        cg.line("&self,");
        for field in &class.fields {
            cg.line(format!("{}: Option<{}>,", field.ident, rust_type(&field.ty)));
        }
        cg.reopen(") -> Self {");
        cg.open("Self {");
        for field in &class.fields {
            cg.line(format!("{0}: {0}.or_else(|| self.{0}.clone()),", field.ident));
        }
        cg.close("}");
        cg.close("}");
    }
    cg.close("}");
}
