//! Schema literals accepted by the parser.
//!
//! [`Def`] mirrors JSON with a few runtime-only leaves (protos, predicates,
//! morphs, symbols, literal values and already-parsed nodes), so both
//! `serde_json::json!` documents and hand-built literals can be parsed.

use crate::node::Node;
use crate::refinements::Predicate;
use crate::sets::Morph;
use crate::value::{Proto, Symbol, Value};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug)]
pub enum Def {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Def>),
    Map(IndexMap<String, Def>),
    /// A literal value, used as a unit.
    Value(Value),
    Proto(Proto),
    Predicate(Predicate),
    Morph(Morph),
    Symbol(Symbol),
    Node(Node),
}

impl Def {
    /// Build a map literal from key/definition pairs.
    pub fn map<K, V, I>(entries: I) -> Def
    where
        K: Into<String>,
        V: Into<Def>,
        I: IntoIterator<Item = (K, V)>,
    {
        Def::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn list<V: Into<Def>, I: IntoIterator<Item = V>>(items: I) -> Def {
        Def::List(items.into_iter().map(Into::into).collect())
    }

    /// Short name of this literal's shape, for error messages.
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            Def::Null => "null",
            Def::Bool(_) => "a boolean",
            Def::Number(_) => "a number",
            Def::Str(_) => "a string",
            Def::List(_) => "a list",
            Def::Map(_) => "a map",
            Def::Value(_) => "a value",
            Def::Proto(_) => "a proto",
            Def::Predicate(_) => "a predicate",
            Def::Morph(_) => "a morph",
            Def::Symbol(_) => "a symbol",
            Def::Node(_) => "a node",
        }
    }
}

impl From<JsonValue> for Def {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Def::Null,
            JsonValue::Bool(b) => Def::Bool(b),
            JsonValue::Number(n) => Def::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Def::Str(s),
            JsonValue::Array(items) => Def::List(items.into_iter().map(Def::from).collect()),
            JsonValue::Object(map) => {
                Def::Map(map.into_iter().map(|(k, v)| (k, Def::from(v))).collect())
            }
        }
    }
}

impl From<&JsonValue> for Def {
    fn from(json: &JsonValue) -> Self {
        Def::from(json.clone())
    }
}

impl From<&str> for Def {
    fn from(s: &str) -> Self {
        Def::Str(s.to_string())
    }
}

impl From<String> for Def {
    fn from(s: String) -> Self {
        Def::Str(s)
    }
}

impl From<f64> for Def {
    fn from(n: f64) -> Self {
        Def::Number(n)
    }
}

impl From<i32> for Def {
    fn from(n: i32) -> Self {
        Def::Number(f64::from(n))
    }
}

impl From<u32> for Def {
    fn from(n: u32) -> Self {
        Def::Number(f64::from(n))
    }
}

impl From<bool> for Def {
    fn from(b: bool) -> Self {
        Def::Bool(b)
    }
}

impl From<Node> for Def {
    fn from(node: Node) -> Self {
        Def::Node(node)
    }
}

impl From<&Node> for Def {
    fn from(node: &Node) -> Self {
        Def::Node(node.clone())
    }
}

impl From<Proto> for Def {
    fn from(proto: Proto) -> Self {
        Def::Proto(proto)
    }
}

impl From<Value> for Def {
    fn from(value: Value) -> Self {
        Def::Value(value)
    }
}

impl From<Predicate> for Def {
    fn from(predicate: Predicate) -> Self {
        Def::Predicate(predicate)
    }
}

impl From<Morph> for Def {
    fn from(morph: Morph) -> Self {
        Def::Morph(morph)
    }
}

impl From<Symbol> for Def {
    fn from(symbol: Symbol) -> Self {
        Def::Symbol(symbol)
    }
}

impl<T: Into<Def>> From<Vec<T>> for Def {
    fn from(items: Vec<T>) -> Self {
        Def::List(items.into_iter().map(Into::into).collect())
    }
}
