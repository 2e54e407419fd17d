use crate::disjoint::{Disjoint, DisjointKind};
use crate::errors::{SchemaError, SchemaResult};
use crate::intersect::{self, Intersected};
use crate::json::JsonWriter;
use crate::kind::NodeKind;
use crate::node::{Inner, Meta, Node};
use crate::refinements::{applicability_error, implied_axis, implied_basis};
use crate::registry::Registry;
use crate::space::Space;
use serde_json::{Map, Value as JsonValue};
use smallvec::SmallVec;
use tracing::trace;

type Rules = SmallVec<[Node; 4]>;

/// A conjunction of an optional basis and refinements.
///
/// `constraints` are sorted by kind, then type id. An intersection with no
/// rules at all is `unknown`.
#[derive(Clone, Debug)]
pub struct IntersectionInner {
    pub basis: Option<Node>,
    pub constraints: Vec<Node>,
}

impl IntersectionInner {
    /// Basis first, then constraints.
    pub fn rules(&self) -> impl Iterator<Item = &Node> {
        self.basis.iter().chain(self.constraints.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.basis.is_none() && self.constraints.is_empty()
    }

    pub(crate) fn describe(&self) -> String {
        if self.is_empty() {
            return "a value".to_string();
        }
        let parts: Vec<&str> = self.rules().map(|r| r.description()).collect();
        parts.join(" and ")
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let mut fields = Map::new();
        if let Some(basis) = &self.basis {
            fields.insert("basis".into(), w.child(basis));
        }
        let axis = implied_axis(self.basis.as_ref());
        for kind in NodeKind::REFINEMENTS {
            let of_kind: Vec<&Node> = self.constraints.iter().filter(|c| c.kind() == kind).collect();
            let Some(first) = of_kind.first() else {
                continue;
            };
            let value = if kind.is_repeatable() {
                JsonValue::Array(of_kind.iter().map(|c| w.child(c)).collect())
            } else {
                match first.inner() {
                    Inner::Min(b) | Inner::Max(b) => b.to_json_within(axis, w, first.meta()),
                    _ => w.child(first),
                }
            };
            fields.insert(kind.name().into(), value);
        }
        w.finish(None, fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str, registry: &Registry) -> String {
        let parts: Vec<String> = self
            .rules()
            .map(|r| crate::compile::render(r, arg, registry))
            .collect();
        match parts.len() {
            0 => "true".to_string(),
            1 => parts.join(""),
            _ => format!("({})", parts.join(") && (")),
        }
    }
}

/// Fold `rule` into `rules`.
///
/// Each existing rule is intersected with `rule`: orthogonal rules are kept,
/// a merged result replaces the rule it came from, and the first disjoint
/// result is returned immediately. A rule that merged with nothing is
/// appended.
fn add_rule(rules: &mut Rules, rule: &Node) -> SchemaResult<Result<(), Disjoint>> {
    match rule.inner() {
        Inner::Intersection(i) => {
            for r in i.rules() {
                if let Err(disjoint) = add_rule(rules, r)? {
                    return Ok(Err(disjoint));
                }
            }
            return Ok(Ok(()));
        }
        _ if !rule.kind().is_constraint() => {
            return Err(SchemaError::internal(format!(
                "{} is not a valid constraint kind",
                rule.kind()
            )));
        }
        _ => {}
    }
    let mut merged: Option<Node> = None;
    let mut next = Rules::new();
    for existing in rules.iter() {
        match intersect::intersect(existing, rule)? {
            Intersected::Orthogonal => next.push(existing.clone()),
            Intersected::Disjoint(disjoint) => return Ok(Err(disjoint)),
            Intersected::Node(node) => match &merged {
                None => {
                    next.push(node.clone());
                    merged = Some(node);
                }
                Some(previous) if *previous == node => {}
                Some(previous) => {
                    return Err(SchemaError::internal(format!(
                        "Rule {} merged into both {} and {}",
                        rule.id(),
                        previous.id(),
                        node.id()
                    )));
                }
            },
        }
    }
    if merged.is_none() {
        next.push(rule.clone());
    }
    trace!(rule = %rule.kind(), rules = next.len(), "folded rule");
    *rules = next;
    Ok(Ok(()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    /// Written in a schema literal: conflicts are parse errors.
    Schema,
    /// Produced by intersecting nodes: conflicts are disjoint.
    Algebra,
}

fn finish(space: &Space, rules: Rules, meta: Meta, origin: Origin) -> SchemaResult<Result<Node, Disjoint>> {
    let mut basis: Option<Node> = None;
    let mut constraints: Vec<Node> = Vec::with_capacity(rules.len());
    for rule in rules {
        if rule.is_basis() {
            if let Some(existing) = &basis {
                return Err(SchemaError::internal(format!(
                    "Intersection has multiple bases {} and {}",
                    existing.id(),
                    rule.id()
                )));
            }
            basis = Some(rule);
        } else {
            constraints.push(rule);
        }
    }

    if origin == Origin::Algebra && basis.is_none() {
        if let Some(implied) = constraints.iter().find_map(|c| implied_basis(space, c)) {
            let mut folded: Rules = constraints.into_iter().collect();
            if let Err(disjoint) = add_rule(&mut folded, &implied)? {
                return Ok(Err(disjoint));
            }
            return finish(space, folded, meta, origin);
        }
    }

    for constraint in &constraints {
        if let Some(message) = applicability_error(constraint, basis.as_ref()) {
            return match (origin, &basis) {
                (Origin::Algebra, Some(b)) => Ok(Err(Disjoint::new(
                    DisjointKind::Assignability,
                    b,
                    constraint,
                ))),
                _ => Err(SchemaError::parse(message)),
            };
        }
    }

    sort_constraints(&mut constraints);

    if constraints.is_empty() {
        if let Some(basis) = basis {
            if meta.is_empty() {
                return Ok(Ok(basis));
            }
            return Ok(Ok(space.intern(basis.inner().clone(), meta)));
        }
    }
    Ok(Ok(space.intern(
        Inner::Intersection(IntersectionInner { basis, constraints }),
        meta,
    )))
}

pub(crate) fn sort_constraints(constraints: &mut [Node]) {
    constraints.sort_by(|a, b| {
        a.kind()
            .cmp(&b.kind())
            .then_with(|| a.type_id().cmp(b.type_id()))
    });
}

/// Build an intersection from a schema literal's parsed rules.
pub(crate) fn from_schema(
    space: &Space,
    basis: Option<Node>,
    refinements: Vec<Node>,
    meta: Meta,
) -> SchemaResult<Node> {
    let mut rules = Rules::new();
    for rule in basis.iter().chain(refinements.iter()) {
        if let Err(disjoint) = add_rule(&mut rules, rule)? {
            return Err(SchemaError::parse(disjoint.to_string()));
        }
    }
    finish(space, rules, meta, Origin::Schema)?.map_err(|d| SchemaError::parse(d.to_string()))
}

/// Conjunction of intersection-level operands, folded left to right.
pub(crate) fn combine(space: &Space, operands: &[&Node]) -> SchemaResult<Intersected> {
    let mut rules = Rules::new();
    for operand in operands {
        if let Err(disjoint) = add_rule(&mut rules, operand)? {
            return Ok(Intersected::Disjoint(disjoint));
        }
    }
    Ok(match finish(space, rules, Meta::default(), Origin::Algebra)? {
        Ok(node) => Intersected::Node(node),
        Err(disjoint) => Intersected::Disjoint(disjoint),
    })
}

/// An intersection against an intersection or a single constraint.
pub(crate) fn intersect_intersection(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    Ok(match combine(l.space(), &[l, r])? {
        Intersected::Node(node) if node == *l => Intersected::Node(l.clone()),
        other => other,
    })
}
