//! Tolerant coercion of an LLM judge's verdict field to `bool`.
//!
//! Grounded in `original_source`'s `_to_bool` helper: judges are asked for
//! JSON but sometimes answer with a bare word or a number. Anything not
//! recognized as truthy — including a missing/null field — degrades to
//! `false` rather than erroring, matching spec §7's fail-closed stance on
//! judge parse failures.

const TRUTHY: &[&str] = &["true", "yes", "pass", "passed", "1"];

/// Coerces a judge verdict value to `bool`. JSON booleans pass through
/// directly; strings are trimmed and lowercased before matching against
/// the truthy set; everything else (numbers other than `1`, arrays,
/// objects, null, absent) is `false`.
pub fn coerce_bool(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => TRUTHY.contains(&s.trim().to_lowercase().as_str()),
        serde_json::Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}
