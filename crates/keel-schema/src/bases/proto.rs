use crate::disjoint::{Disjoint, DisjointKind};
use crate::intersect::Intersected;
use crate::json::JsonWriter;
use crate::node::{Inner, Meta, Node};
use crate::registry::Registry;
use crate::value::{Domain, Proto, Value};
use serde_json::{Map, Value as JsonValue};

#[derive(Clone, Debug)]
pub struct ProtoInner {
    pub proto: Proto,
}

impl ProtoInner {
    pub(crate) fn describe(&self) -> String {
        if self.proto == Proto::array() {
            "an array".to_string()
        } else if self.proto == Proto::date() {
            "a Date".to_string()
        } else if self.proto == Proto::function() {
            "a function".to_string()
        } else {
            format!("an instance of {}", self.proto.name())
        }
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let mut fields = Map::new();
        fields.insert(
            "proto".into(),
            JsonValue::String(w.registry.reference_proto(&self.proto)),
        );
        w.finish(None, fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str, registry: &Registry) -> String {
        format!("{arg} instanceof {}", registry.reference_proto(&self.proto))
    }

    pub(crate) fn allows(&self, data: &Value) -> bool {
        data.as_object().is_some_and(|o| o.instance_of(&self.proto))
    }
}

fn proto_of(node: &Node) -> Option<&Proto> {
    match node.inner() {
        Inner::Proto(p) => Some(&p.proto),
        _ => None,
    }
}

/// The more specific of two related constructors.
pub(crate) fn intersect_protos(l: &Node, r: &Node) -> Intersected {
    let (Some(lp), Some(rp)) = (proto_of(l), proto_of(r)) else {
        return Intersected::Orthogonal;
    };
    if lp.is_subclass_of(rp) {
        Intersected::Node(l.clone())
    } else if rp.is_subclass_of(lp) {
        Intersected::Node(r.clone())
    } else {
        Intersected::Disjoint(Disjoint::new(DisjointKind::Proto, l, r))
    }
}

/// Every instance is an object, so a proto narrows `object` and excludes
/// every other domain.
pub(crate) fn intersect_proto_domain(l: &Node, r: &Node) -> Intersected {
    match r.inner() {
        Inner::Domain(d) if d.domain == Domain::Object => Intersected::Node(l.clone()),
        _ => Intersected::Disjoint(Disjoint::new(DisjointKind::Domain, l, r)),
    }
}
