//! JSON rendering of nodes and the serialized encoding of literal values.
//!
//! Every kind has a collapsed shorthand (`"string"`, `3`, `[...]`) that is
//! used when the node carries no meta, and an expanded object form keyed by
//! the kind's attributes.

use crate::node::{Meta, Node};
use crate::registry::Registry;
use crate::value::{Value, format_number};
use serde_json::{Map, Value as JsonValue};

pub(crate) struct JsonWriter<'a> {
    pub(crate) registry: &'a Registry,
    /// Whether descriptions and aliases are emitted (`json`) or dropped
    /// (`type_json`).
    pub(crate) with_meta: bool,
}

impl<'a> JsonWriter<'a> {
    pub(crate) fn new(registry: &'a Registry, with_meta: bool) -> Self {
        Self { registry, with_meta }
    }

    pub(crate) fn child(&self, node: &Node) -> JsonValue {
        if self.with_meta {
            node.json().clone()
        } else {
            node.type_json().clone()
        }
    }

    pub(crate) fn children(&self, nodes: &[Node]) -> JsonValue {
        JsonValue::Array(nodes.iter().map(|n| self.child(n)).collect())
    }

    /// Return `collapsed` unless meta must be emitted, in which case meta is
    /// appended to the expanded `fields`.
    pub(crate) fn finish(
        &self,
        collapsed: Option<JsonValue>,
        mut fields: Map<String, JsonValue>,
        meta: &Meta,
    ) -> JsonValue {
        let emit_meta = self.with_meta && !meta.is_empty();
        if let Some(collapsed) = collapsed {
            if !emit_meta {
                return collapsed;
            }
        }
        if emit_meta {
            if let Some(description) = &meta.description {
                fields.insert("description".into(), JsonValue::String(description.clone()));
            }
            if let Some(alias) = &meta.alias {
                fields.insert("alias".into(), JsonValue::String(alias.clone()));
            }
        }
        JsonValue::Object(fields)
    }

    /// Serialized form of a literal; see [`encode_literal`].
    pub(crate) fn literal(&self, value: &Value) -> JsonValue {
        encode_literal(value, self.registry)
    }
}

/// Encode a literal value for ids and JSON.
///
/// | Value | Encoding |
/// |-------|----------|
/// | number, boolean, null | native JSON (non-finite numbers as strings) |
/// | string | JSON-quoted inside a JSON string: `"\"foo\""` |
/// | undefined | `"undefined"` |
/// | bigint | `"5n"` |
/// | symbol, object | registry reference, e.g. `"$ark.symbol1"` |
pub(crate) fn encode_literal(value: &Value, registry: &Registry) -> JsonValue {
    serializable_literal(value)
        .unwrap_or_else(|| JsonValue::String(registry.reference_value(value)))
}

/// [`encode_literal`] for values that need no registry reference.
pub(crate) fn serializable_literal(value: &Value) -> Option<JsonValue> {
    Some(match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Number(n) => encode_number(*n),
        Value::String(s) => JsonValue::String(quote(s)),
        Value::Undefined => JsonValue::String("undefined".into()),
        Value::BigInt(n) => JsonValue::String(format!("{n}n")),
        Value::Symbol(_) | Value::Object(_) => return None,
    })
}

pub(crate) fn encode_number(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        // -0 collapses with 0 here, matching `===`
        return JsonValue::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(format_number(n)))
}

/// Inverse of [`encode_literal`] for string encodings. A string that is not
/// a recognized encoding is taken as the literal string itself.
pub(crate) fn decode_literal_str(s: &str, registry: &Registry) -> Option<Value> {
    if s.starts_with('"') {
        return serde_json::from_str::<String>(s).ok().map(Value::from);
    }
    match s {
        "undefined" => return Some(Value::Undefined),
        "NaN" => return Some(Value::Number(f64::NAN)),
        "Infinity" => return Some(Value::Number(f64::INFINITY)),
        "-Infinity" => return Some(Value::Number(f64::NEG_INFINITY)),
        _ => {}
    }
    if let Some(digits) = s.strip_suffix('n') {
        let unsigned = digits.strip_prefix('-').unwrap_or(digits);
        if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = digits.parse::<i128>() {
                return Some(Value::BigInt(n));
            }
        }
    }
    if registry.is_reference(s) {
        return registry.resolve_value(s);
    }
    Some(Value::from(s))
}

/// `JSON.stringify`-style quoting for condition strings.
pub(crate) fn quote(s: &str) -> String {
    JsonValue::String(s.to_string()).to_string()
}
