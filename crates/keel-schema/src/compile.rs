//! Compilation of nodes into conditions and predicates.
//!
//! Each node is compiled exactly once, when it is interned:
//!
//! - `condition`: a boolean expression over `data` in JavaScript syntax,
//!   used for diagnostics and as the canonical rendering of the check.
//! - `allows`: a closure tree equivalent to the condition. Set nodes capture
//!   their children's handles, so each child's compiled closure is reused
//!   rather than rebuilt.

use crate::discriminate::Discriminant;
use crate::kind::NodeKind;
use crate::node::{Inner, Node};
use crate::registry::Registry;
use crate::value::Value;
use std::sync::Arc;

pub(crate) type Allows = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Condition of `node` with its input named `arg`.
pub(crate) fn render(node: &Node, arg: &str, registry: &Registry) -> String {
    if arg == "data" {
        return node.condition().to_string();
    }
    condition(node.inner(), node.discriminant(), arg, registry)
}

pub(crate) fn condition(
    inner: &Inner,
    discriminant: Option<&Discriminant>,
    arg: &str,
    registry: &Registry,
) -> String {
    match inner {
        Inner::Union(u) => match discriminant {
            Some(d) => d.condition(&u.branches, arg, registry),
            None => u.condition(arg, registry),
        },
        Inner::Morph(m) => render(&m.input, arg, registry),
        Inner::Intersection(i) => i.condition(arg, registry),
        Inner::Unit(u) => u.condition(arg, registry),
        Inner::Proto(p) => p.condition(arg, registry),
        Inner::Domain(d) => d.condition(arg),
        Inner::Divisor(d) => d.condition(arg),
        Inner::Max(b) => b.condition(NodeKind::Max, arg),
        Inner::Min(b) => b.condition(NodeKind::Min, arg),
        Inner::Pattern(p) => p.condition(arg),
        Inner::Predicate(p) => p.condition(arg, registry),
        Inner::Required(p) => p.condition(NodeKind::Required, arg, registry),
        Inner::Optional(p) => p.condition(NodeKind::Optional, arg, registry),
    }
}

pub(crate) fn allows(inner: &Inner, discriminant: Option<&Discriminant>) -> Allows {
    match inner.clone() {
        Inner::Union(u) => match discriminant.cloned() {
            Some(d) => Arc::new(move |data: &Value| {
                d.candidates(data)
                    .iter()
                    .any(|&i| u.branches[i].allows(data))
            }),
            None => Arc::new(move |data: &Value| u.branches.iter().any(|b| b.allows(data))),
        },
        Inner::Morph(m) => {
            let input = m.input;
            Arc::new(move |data: &Value| input.allows(data))
        }
        Inner::Intersection(i) => {
            let rules: Vec<Node> = i.rules().cloned().collect();
            Arc::new(move |data: &Value| rules.iter().all(|rule| rule.allows(data)))
        }
        Inner::Unit(u) => Arc::new(move |data: &Value| u.allows(data)),
        Inner::Proto(p) => Arc::new(move |data: &Value| p.allows(data)),
        Inner::Domain(d) => Arc::new(move |data: &Value| d.allows(data)),
        Inner::Divisor(d) => Arc::new(move |data: &Value| d.allows(data)),
        Inner::Max(b) => Arc::new(move |data: &Value| b.allows(NodeKind::Max, data)),
        Inner::Min(b) => Arc::new(move |data: &Value| b.allows(NodeKind::Min, data)),
        Inner::Pattern(p) => Arc::new(move |data: &Value| p.allows(data)),
        Inner::Predicate(p) => Arc::new(move |data: &Value| p.allows(data)),
        Inner::Required(p) => Arc::new(move |data: &Value| p.allows(NodeKind::Required, data)),
        Inner::Optional(p) => Arc::new(move |data: &Value| p.allows(NodeKind::Optional, data)),
    }
}
