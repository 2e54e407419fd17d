use crate::disjoint::{Disjoint, DisjointKind};
use crate::intersect::Intersected;
use crate::json::JsonWriter;
use crate::node::{Meta, Node};
use crate::value::{Domain, Value};
use serde_json::{Map, Value as JsonValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainInner {
    pub domain: Domain,
}

impl DomainInner {
    pub(crate) fn describe(&self) -> String {
        self.domain.description().to_string()
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let name = JsonValue::String(self.domain.name().to_string());
        let mut fields = Map::new();
        fields.insert("domain".into(), name.clone());
        w.finish(Some(name), fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str) -> String {
        match self.domain {
            Domain::Object => format!(
                "((typeof {arg} === \"object\" && {arg} !== null) || typeof {arg} === \"function\")"
            ),
            other => format!("typeof {arg} === \"{}\"", other.name()),
        }
    }

    pub(crate) fn allows(&self, data: &Value) -> bool {
        data.domain() == self.domain
    }
}

/// Distinct domains never share a value.
pub(crate) fn intersect_domains(l: &Node, r: &Node) -> Intersected {
    Intersected::Disjoint(Disjoint::new(DisjointKind::Domain, l, r))
}
