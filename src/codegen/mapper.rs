//! `From` conversions between response and entity trees built from one sample.
use crate::codegen::{Codegen, HEADER};
use crate::error::{GenError, Result};
use crate::ir::{ClassDefinition, InferredType};

/// Module aliases the two trees are reachable through from `mapper.rs`.
#[derive(Debug, Clone, Copy)]
pub struct MapperModules<'a> {
    pub response: &'a str,
    pub entity: &'a str,
}

/// One endpoint's section of a page's `mapper.rs`.
pub fn emit_mapper(
    response: &ClassDefinition,
    entity: &ClassDefinition,
    modules: MapperModules<'_>,
) -> Result<String> {
    let mut cg = Codegen::new();
    emit_pair(&mut cg, response, entity, modules)?;
    Ok(cg.into_string())
}

/// Assemble a page's `mapper.rs` from its endpoint sections, in order.
pub fn mapper_file(modules: &[MapperModules<'_>], sections: &[String]) -> String {
    let mut out = format!("{HEADER}\n");
    if !modules.is_empty() {
        out.push('\n');
    }
    let mut uses: Vec<&str> = modules.iter().flat_map(|m| [m.entity, m.response]).collect();
    uses.sort_unstable();
    uses.dedup();
    for module in uses {
        out.push_str(&format!("use super::{module};\n"));
    }
    for section in sections {
        out.push('\n');
        out.push_str(section);
    }
    out
}

fn emit_pair(
    cg: &mut Codegen,
    response: &ClassDefinition,
    entity: &ClassDefinition,
    modules: MapperModules<'_>,
) -> Result<()> {
    let mismatch = || GenError::ShapeMismatch {
        response: response.ident().to_string(),
        entity: entity.ident().to_string(),
    };
    if response.fields.len() != entity.fields.len() || response.children.len() != entity.children.len() {
        return Err(mismatch());
    }
    for (r, e) in response.fields.iter().zip(&entity.fields) {
        if r.key != e.key || r.ident != e.ident || !same_shape(&r.ty, &e.ty) {
            return Err(mismatch());
        }
    }

    let r_path = format!("{}::{}", modules.response, response.ident());
    let e_path = format!("{}::{}", modules.entity, entity.ident());
    emit_from(cg, &r_path, &e_path, response);
    cg.blank();
    emit_from(cg, &e_path, &r_path, response);

    for (r, e) in response.children.iter().zip(&entity.children) {
        cg.blank();
        emit_pair(cg, r, e, modules)?;
    }
    Ok(())
}

fn emit_from(cg: &mut Codegen, from: &str, to: &str, class: &ClassDefinition) {
    cg.open(format!("impl From<{from}> for {to} {{"));
    if class.fields.is_empty() {
        cg.open(format!("fn from(_value: {from}) -> Self {{"));
        cg.line("Self {}");
    } else {
        cg.open(format!("fn from(value: {from}) -> Self {{"));
        cg.open("Self {");
        for field in &class.fields {
            cg.line(format!("{0}: {1},", field.ident, convert_field(&field.ty, &format!("value.{}", field.ident))));
        }
        cg.close("}");
    }
    cg.close("}");
    cg.close("}");
}

fn convert_field(ty: &InferredType, var: &str) -> String {
    match ty {
        InferredType::ObjectRef(_) => format!("{var}.map(Into::into)"),
        InferredType::ListOf(_) if ty.object_ref().is_some() => {
            format!("{var}.map(|items| {})", convert(ty, "items", 0))
        }
        _ => var.to_string(),
    }
}

/// Convert a present value of type `ty` (which contains an object somewhere).
fn convert(ty: &InferredType, var: &str, depth: usize) -> String {
    match ty {
        InferredType::ListOf(inner) => {
            let item = format!("e{depth}");
            format!(
                "{var}.into_iter().map(|{item}| {}).collect::<Vec<_>>()",
                convert(inner, &item, depth + 1)
            )
        }
        _ => format!("{var}.into()"),
    }
}

/// Equal up to class names.
fn same_shape(a: &InferredType, b: &InferredType) -> bool {
    match (a, b) {
        (InferredType::ObjectRef(_), InferredType::ObjectRef(_)) => true,
        (InferredType::ListOf(a), InferredType::ListOf(b)) => same_shape(a, b),
        (a, b) => a == b,
    }
}
