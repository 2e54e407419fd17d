use crate::bases::{basis_domain, basis_proto};
use crate::disjoint::{Disjoint, DisjointKind};
use crate::intersect::Intersected;
use crate::json::{JsonWriter, encode_number};
use crate::kind::NodeKind;
use crate::node::{Inner, Meta, Node};
use crate::value::{Domain, Proto, Value, format_number};
use serde_json::{Map, Value as JsonValue};

/// What a bound compares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundAxis {
    /// The number itself.
    Value,
    /// `length` of a string or array.
    Length,
    /// Timestamp of a `Date`.
    Time,
}

impl BoundAxis {
    pub const fn name(self) -> &'static str {
        match self {
            BoundAxis::Value => "value",
            BoundAxis::Length => "length",
            BoundAxis::Time => "time",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "value" => Some(BoundAxis::Value),
            "length" => Some(BoundAxis::Length),
            "time" => Some(BoundAxis::Time),
            _ => None,
        }
    }

    fn measure(self, data: &Value) -> Option<f64> {
        match self {
            BoundAxis::Value => data.as_number(),
            BoundAxis::Length => data.length().map(|n| n as f64),
            BoundAxis::Time => data.as_object().and_then(|o| o.timestamp()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundInner {
    pub limit: f64,
    pub exclusive: bool,
    pub axis: BoundAxis,
}

impl BoundInner {
    pub(crate) fn describe(&self, kind: NodeKind) -> String {
        let limit = format_number(self.limit);
        let is_min = kind == NodeKind::Min;
        match self.axis {
            BoundAxis::Time => {
                let relation = match (is_min, self.exclusive) {
                    (true, true) => "after",
                    (true, false) => "at or after",
                    (false, true) => "before",
                    (false, false) => "at or before",
                };
                format!("{relation} {limit}")
            }
            axis => {
                let relation = match (is_min, self.exclusive) {
                    (true, true) => "more than",
                    (true, false) => "at least",
                    (false, true) => "less than",
                    (false, false) => "at most",
                };
                if axis == BoundAxis::Length {
                    format!("{relation} length {limit}")
                } else {
                    format!("{relation} {limit}")
                }
            }
        }
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        self.to_json_within(BoundAxis::Value, w, meta)
    }

    /// JSON inside an intersection whose basis implies `implied`, where an
    /// inclusive bound on that axis collapses to its limit.
    pub(crate) fn to_json_within(
        &self,
        implied: BoundAxis,
        w: &JsonWriter<'_>,
        meta: &Meta,
    ) -> JsonValue {
        let limit = encode_number(self.limit);
        let mut fields = Map::new();
        fields.insert("limit".into(), limit.clone());
        if self.exclusive {
            fields.insert("exclusive".into(), JsonValue::Bool(true));
        }
        if self.axis != implied {
            fields.insert("axis".into(), JsonValue::String(self.axis.name().into()));
        }
        let collapsed = (!self.exclusive && self.axis == implied).then_some(limit);
        w.finish(collapsed, fields, meta)
    }

    pub(crate) fn condition(&self, kind: NodeKind, arg: &str) -> String {
        let operand = match self.axis {
            BoundAxis::Value => arg.to_string(),
            BoundAxis::Length => format!("{arg}.length"),
            BoundAxis::Time => format!("{arg}.valueOf()"),
        };
        let comparator = match (kind == NodeKind::Min, self.exclusive) {
            (true, true) => ">",
            (true, false) => ">=",
            (false, true) => "<",
            (false, false) => "<=",
        };
        format!("{operand} {comparator} {}", format_number(self.limit))
    }

    pub(crate) fn allows(&self, kind: NodeKind, data: &Value) -> bool {
        let Some(n) = self.axis.measure(data) else {
            return false;
        };
        match (kind == NodeKind::Min, self.exclusive) {
            (true, true) => n > self.limit,
            (true, false) => n >= self.limit,
            (false, true) => n < self.limit,
            (false, false) => n <= self.limit,
        }
    }
}

/// The axis a plain numeric bound refers to under `basis`.
pub(crate) fn implied_axis(basis: Option<&Node>) -> BoundAxis {
    let Some(basis) = basis else {
        return BoundAxis::Value;
    };
    if let Some(proto) = basis_proto(basis) {
        if proto.is_subclass_of(&Proto::array()) {
            return BoundAxis::Length;
        }
        if proto.is_subclass_of(&Proto::date()) {
            return BoundAxis::Time;
        }
    }
    match basis_domain(basis) {
        Some(Domain::String) => BoundAxis::Length,
        _ => BoundAxis::Value,
    }
}

fn bound_of(node: &Node) -> Option<&BoundInner> {
    match node.inner() {
        Inner::Min(b) | Inner::Max(b) => Some(b),
        _ => None,
    }
}

/// Two bounds in the same direction: the stricter one wins, and an
/// exclusive bound is stricter than an inclusive one at the same limit.
pub(crate) fn intersect_bounds(l: &Node, r: &Node) -> Intersected {
    let (Some(a), Some(b)) = (bound_of(l), bound_of(r)) else {
        return Intersected::Orthogonal;
    };
    if a.axis != b.axis {
        return Intersected::Orthogonal;
    }
    let l_stricter = if a.limit == b.limit {
        a.exclusive || !b.exclusive
    } else if l.kind() == NodeKind::Min {
        a.limit > b.limit
    } else {
        a.limit < b.limit
    };
    Intersected::Node(if l_stricter { l.clone() } else { r.clone() })
}

/// A maximum against a minimum: disjoint iff no value fits between them.
pub(crate) fn intersect_range(max: &Node, min: &Node) -> Intersected {
    let (Some(upper), Some(lower)) = (bound_of(max), bound_of(min)) else {
        return Intersected::Orthogonal;
    };
    if upper.axis != lower.axis {
        return Intersected::Orthogonal;
    }
    let empty = lower.limit > upper.limit
        || (lower.limit == upper.limit && (lower.exclusive || upper.exclusive));
    if empty {
        Intersected::Disjoint(Disjoint::new(DisjointKind::Range, max, min))
    } else {
        Intersected::Orthogonal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(limit: f64, exclusive: bool) -> BoundInner {
        BoundInner {
            limit,
            exclusive,
            axis: BoundAxis::Value,
        }
    }

    #[test]
    fn test_bound_descriptions() {
        assert_eq!(bound(5.0, false).describe(NodeKind::Min), "at least 5");
        assert_eq!(bound(5.0, true).describe(NodeKind::Min), "more than 5");
        assert_eq!(bound(1.5, false).describe(NodeKind::Max), "at most 1.5");
        assert_eq!(bound(0.0, true).describe(NodeKind::Max), "less than 0");
        let length = BoundInner {
            axis: BoundAxis::Length,
            ..bound(3.0, false)
        };
        assert_eq!(length.describe(NodeKind::Min), "at least length 3");
    }

    #[test]
    fn test_bound_conditions() {
        assert_eq!(bound(5.0, false).condition(NodeKind::Min, "data"), "data >= 5");
        assert_eq!(bound(5.0, true).condition(NodeKind::Max, "data"), "data < 5");
        let length = BoundInner {
            axis: BoundAxis::Length,
            ..bound(2.0, false)
        };
        assert_eq!(length.condition(NodeKind::Max, "data.a"), "data.a.length <= 2");
    }

    #[test]
    fn test_bound_allows_by_axis() {
        let length = BoundInner {
            axis: BoundAxis::Length,
            ..bound(2.0, false)
        };
        assert!(length.allows(NodeKind::Min, &Value::from("ab")));
        assert!(!length.allows(NodeKind::Min, &Value::from("a")));
        assert!(!length.allows(NodeKind::Min, &Value::from(10)));
        assert!(bound(2.0, true).allows(NodeKind::Max, &Value::from(1.5)));
        assert!(!bound(2.0, true).allows(NodeKind::Max, &Value::from(2)));
    }
}
