use crate::compile;
use crate::errors::SchemaResult;
use crate::intersect::{self, Intersected};
use crate::json::{self, JsonWriter};
use crate::kind::NodeKind;
use crate::node::{Inner, Meta, Node};
use crate::registry::Registry;
use crate::value::{PropKey, Symbol, Value};
use serde_json::{Map, Value as JsonValue};

/// A named property and the node its value must satisfy.
#[derive(Clone, Debug)]
pub struct PropInner {
    pub key: PropKey,
    pub value: Node,
}

impl PropInner {
    pub(crate) fn describe(&self, kind: NodeKind) -> String {
        let marker = if kind == NodeKind::Optional { "?" } else { "" };
        format!("{}{marker}: {}", self.key, self.value.description())
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let mut fields = Map::new();
        fields.insert("key".into(), key_json(&self.key, w.registry));
        fields.insert("value".into(), w.child(&self.value));
        w.finish(None, fields, meta)
    }

    pub(crate) fn condition(&self, kind: NodeKind, arg: &str, registry: &Registry) -> String {
        let key = match &self.key {
            PropKey::String(s) => json::quote(s),
            PropKey::Symbol(sym) => symbol_reference(sym, registry),
        };
        let value = compile::render(&self.value, &prop_access(arg, &self.key, registry), registry);
        if kind == NodeKind::Optional {
            format!("!({key} in {arg}) || ({value})")
        } else {
            format!("{key} in {arg} && ({value})")
        }
    }

    pub(crate) fn allows(&self, kind: NodeKind, data: &Value) -> bool {
        match data.get(&self.key) {
            Some(value) => self.value.allows(&value),
            None => kind == NodeKind::Optional,
        }
    }
}

fn symbol_reference(sym: &Symbol, registry: &Registry) -> String {
    registry.reference_value(&Value::Symbol(sym.clone()))
}

/// String keys are written as is, symbol keys as `{"symbol": "$ark.symbol1"}`.
fn key_json(key: &PropKey, registry: &Registry) -> JsonValue {
    match key {
        PropKey::String(s) => JsonValue::String(s.to_string()),
        PropKey::Symbol(sym) => {
            let mut fields = Map::new();
            fields.insert("symbol".into(), JsonValue::String(symbol_reference(sym, registry)));
            JsonValue::Object(fields)
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Access expression for `key` on `arg`: `data.a`, `data["a-b"]` or
/// `data[$ark.symbol1]`.
pub(crate) fn prop_access(arg: &str, key: &PropKey, registry: &Registry) -> String {
    match key {
        PropKey::String(s) if is_identifier(s) => format!("{arg}.{s}"),
        PropKey::String(s) => format!("{arg}[{}]", json::quote(s)),
        PropKey::Symbol(sym) => format!("{arg}[{}]", symbol_reference(sym, registry)),
    }
}

/// Props with the same key and presence intersect their values; a conflict
/// between the values is reported at that key. Props with different keys
/// or different presence are orthogonal.
pub(crate) fn intersect_props(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    let (lp, rp) = match (l.inner(), r.inner()) {
        (Inner::Required(a), Inner::Required(b)) | (Inner::Optional(a), Inner::Optional(b)) => (a, b),
        _ => return Ok(Intersected::Orthogonal),
    };
    if lp.key != rp.key {
        return Ok(Intersected::Orthogonal);
    }
    Ok(match intersect::conjoin(&lp.value, &rp.value)? {
        Intersected::Node(value) if value == lp.value => Intersected::Node(l.clone()),
        Intersected::Node(value) if value == rp.value => Intersected::Node(r.clone()),
        Intersected::Node(value) => {
            let inner = PropInner {
                key: lp.key.clone(),
                value,
            };
            let inner = if l.kind() == NodeKind::Optional {
                Inner::Optional(inner)
            } else {
                Inner::Required(inner)
            };
            Intersected::Node(l.space().intern(inner, Meta::default()))
        }
        Intersected::Disjoint(disjoint) => Intersected::Disjoint(disjoint.at_key(&lp.key)),
        Intersected::Orthogonal => Intersected::Orthogonal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_access_expressions() {
        let registry = Registry::new("$ark");
        assert_eq!(prop_access("data", &PropKey::from("a"), &registry), "data.a");
        assert_eq!(prop_access("data", &PropKey::from("$ok_1"), &registry), "data.$ok_1");
        assert_eq!(prop_access("data", &PropKey::from("a-b"), &registry), "data[\"a-b\"]");
        assert_eq!(prop_access("data", &PropKey::from("1a"), &registry), "data[\"1a\"]");
        let sym = crate::value::Symbol::new("tag");
        assert_eq!(
            prop_access("data", &PropKey::from(sym), &registry),
            "data[$ark.symbol1]"
        );
    }
}
