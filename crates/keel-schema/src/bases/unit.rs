use crate::disjoint::{Disjoint, DisjointKind};
use crate::intersect::Intersected;
use crate::json::{self, JsonWriter};
use crate::node::{Inner, Meta, Node};
use crate::registry::Registry;
use crate::value::{Value, format_number};
use serde_json::{Map, Value as JsonValue};

/// Exactly one literal value.
#[derive(Clone, Debug)]
pub struct UnitInner {
    pub unit: Value,
}

impl UnitInner {
    pub(crate) fn describe(&self) -> String {
        self.unit.to_string()
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let mut fields = Map::new();
        fields.insert("unit".into(), w.literal(&self.unit));
        w.finish(None, fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str, registry: &Registry) -> String {
        match &self.unit {
            Value::Number(n) if n.is_nan() => format!("Number.isNaN({arg})"),
            Value::Number(n) => format!("{arg} === {}", format_number(*n)),
            Value::String(s) => format!("{arg} === {}", json::quote(s)),
            Value::BigInt(n) => format!("{arg} === {n}n"),
            Value::Boolean(b) => format!("{arg} === {b}"),
            Value::Null => format!("{arg} === null"),
            Value::Undefined => format!("{arg} === undefined"),
            other => format!("{arg} === {}", registry.reference_value(other)),
        }
    }

    pub(crate) fn allows(&self, data: &Value) -> bool {
        match &self.unit {
            // `Number.isNaN` semantics, so NaN units are satisfiable
            Value::Number(n) if n.is_nan() => data.as_number().is_some_and(f64::is_nan),
            unit => unit.strictly_equals(data),
        }
    }
}

/// A unit against any later-ordered constraint: the unit survives if the
/// other side admits its value.
pub(crate) fn intersect_unit(l: &Node, r: &Node) -> Intersected {
    let Inner::Unit(unit) = l.inner() else {
        return Intersected::Orthogonal;
    };
    if r.allows(&unit.unit) {
        Intersected::Node(l.clone())
    } else if r.kind() == crate::NodeKind::Unit {
        Intersected::Disjoint(Disjoint::new(DisjointKind::Unit, l, r))
    } else {
        Intersected::Disjoint(Disjoint::new(DisjointKind::Assignability, l, r))
    }
}
