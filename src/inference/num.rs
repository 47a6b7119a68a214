use serde_json::{Number, Value};

use crate::ir::InferredType;

/// Integral representation that fits an `i64` → Int; anything else (a
/// fraction, an exponent, or an integer past `i64::MAX`) → Double.
pub fn classify_number(n: &Number) -> InferredType {
    if n.is_i64() {
        InferredType::Int
    } else {
        InferredType::Double
    }
}

// Decoders below are mirrored verbatim by the expressions the response
// emitter writes; fixture literals are computed with them.

pub fn decode_int(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
}

pub fn decode_double(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|f| f.is_finite())
}

pub fn int_decoder(var: &str) -> String {
    format!("{var}.as_i64().or_else(|| {var}.as_str().and_then(|s| s.trim().parse::<i64>().ok()))")
}

pub fn double_decoder(var: &str) -> String {
    format!(
        "{var}.as_f64().or_else(|| {var}.as_str().and_then(|s| s.trim().parse::<f64>().ok())).filter(|f| f.is_finite())"
    )
}

/// Rust source for an f64 literal; always carries a `.` or exponent.
pub fn double_literal(f: f64) -> String {
    format!("{f:?}")
}
