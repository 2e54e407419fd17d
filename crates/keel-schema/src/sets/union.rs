use crate::disjoint::{Disjoint, DisjointKind};
use crate::errors::{SchemaError, SchemaResult};
use crate::intersect::{self, Intersected};
use crate::json::JsonWriter;
use crate::node::{Inner, Meta, Node};
use crate::registry::Registry;
use crate::space::Space;
use crate::value::{Domain, Value};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

/// A disjunction of branches.
///
/// Unordered unions keep branches sorted by type JSON so equal sets compare
/// equal; ordered unions keep the order they were written in, and that
/// order is part of their identity. A union with no branches is `never`.
#[derive(Clone, Debug)]
pub struct UnionInner {
    pub branches: Vec<Node>,
    pub ordered: bool,
}

impl UnionInner {
    pub(crate) fn describe(&self) -> String {
        if self.branches.is_empty() {
            return "never".to_string();
        }
        let parts: Vec<&str> = self.branches.iter().map(|b| b.description()).collect();
        parts.join(" or ")
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let branches = w.children(&self.branches);
        let mut fields = Map::new();
        fields.insert("branches".into(), branches.clone());
        if self.ordered {
            fields.insert("ordered".into(), JsonValue::Bool(true));
        }
        let collapsed = (!self.ordered).then_some(branches);
        w.finish(collapsed, fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str, registry: &Registry) -> String {
        let parts: Vec<String> = self
            .branches
            .iter()
            .map(|b| crate::compile::render(b, arg, registry))
            .collect();
        match parts.len() {
            0 => "false".to_string(),
            1 => parts.join(""),
            _ => format!("({})", parts.join(") || (")),
        }
    }
}

/// Build a union node from `branches`, normalizing:
///
/// 1. nested unions are flattened and branches deduplicated by type id
/// 2. branches that are subtypes of another branch are removed
/// 3. a union covering every domain and enumerable literal becomes `unknown`
/// 4. unordered branches are sorted
/// 5. a single branch without meta is returned as-is
pub(crate) fn assemble_union(
    space: &Space,
    branches: Vec<Node>,
    ordered: bool,
    meta: Meta,
) -> SchemaResult<Node> {
    let mut flat: Vec<Node> = Vec::with_capacity(branches.len());
    for branch in branches {
        match branch.inner() {
            Inner::Union(u) => flat.extend(u.branches.iter().cloned()),
            _ if branch.kind().is_branch() => flat.push(branch),
            _ => {
                return Err(SchemaError::parse(format!(
                    "{} is not a valid union branch",
                    branch.kind()
                )));
            }
        }
    }
    let mut seen = FxHashSet::default();
    flat.retain(|b| seen.insert(b.type_id().to_string()));

    if flat.len() <= space.config().max_reducible_branches {
        flat = reduce_branches(flat)?;
    } else {
        debug!(branches = flat.len(), "skipping union reduction");
    }
    if is_exhaustive(&flat) {
        flat = vec![space.unknown()];
    }
    if !ordered {
        sort_branches(&mut flat);
    }
    if flat.len() == 1 && meta.is_empty() {
        if let Some(only) = flat.pop() {
            return Ok(only);
        }
    }
    Ok(space.intern(
        Inner::Union(UnionInner {
            branches: flat,
            ordered,
        }),
        meta,
    ))
}

/// Canonical order of unordered branches: by type JSON.
pub(crate) fn sort_branches(branches: &mut [Node]) {
    branches.sort_by_cached_key(|b| b.type_json().to_string());
}

/// Remove every branch whose intersection with a later branch is itself.
///
/// Branches including morphs are never removed this way, since a morph and
/// a plain validator accepting the same input still produce different
/// outputs.
fn reduce_branches(branches: Vec<Node>) -> SchemaResult<Vec<Node>> {
    let mut keep = vec![true; branches.len()];
    for i in 0..branches.len() {
        for j in (i + 1)..branches.len() {
            if !keep[i] {
                break;
            }
            if !keep[j] || branches[i].includes_morph() || branches[j].includes_morph() {
                continue;
            }
            if let Intersected::Node(result) = intersect::conjoin(&branches[i], &branches[j])? {
                if result == branches[i] {
                    keep[i] = false;
                } else if result == branches[j] {
                    keep[j] = false;
                }
            }
        }
    }
    Ok(branches
        .into_iter()
        .zip(keep)
        .filter_map(|(branch, kept)| kept.then_some(branch))
        .collect())
}

/// True if the branches include every non-enumerable domain plus `true`,
/// `false`, `null` and `undefined`.
fn is_exhaustive(branches: &[Node]) -> bool {
    let mut domains: FxHashSet<Domain> = FxHashSet::default();
    let (mut t, mut f, mut null, mut undefined) = (false, false, false, false);
    for branch in branches {
        match branch.inner() {
            Inner::Domain(d) => {
                domains.insert(d.domain);
            }
            Inner::Unit(u) => match u.unit {
                Value::Boolean(true) => t = true,
                Value::Boolean(false) => f = true,
                Value::Null => null = true,
                Value::Undefined => undefined = true,
                _ => {}
            },
            _ => {}
        }
    }
    t && f && null && undefined && Domain::NON_ENUMERABLE.iter().all(|d| domains.contains(d))
}

/// Pairwise intersection of two reduced branch lists.
///
/// A branch that turns out to be a subtype of an opposite branch joins that
/// branch's column and makes its other pairings redundant; an opposite
/// branch that is a subtype of the current branch consumes its whole column,
/// dropping everything collected there. Remaining columns are flushed at the
/// end.
fn intersect_branches(l: &[Node], r: &[Node]) -> SchemaResult<Vec<Node>> {
    let mut result: Vec<Node> = Vec::new();
    let mut candidates_by_r: Vec<Option<Vec<Node>>> = vec![Some(Vec::new()); r.len()];
    for l_branch in l {
        let mut current: Vec<(usize, Node)> = Vec::new();
        for (r_index, r_branch) in r.iter().enumerate() {
            if candidates_by_r[r_index].is_none() {
                continue;
            }
            if l_branch == r_branch {
                result.push(l_branch.clone());
                candidates_by_r[r_index] = None;
                current.clear();
                break;
            }
            let Intersected::Node(intersection) = intersect::conjoin(l_branch, r_branch)? else {
                continue;
            };
            if intersection == *l_branch {
                current.clear();
                current.push((r_index, l_branch.clone()));
                break;
            }
            if intersection == *r_branch {
                result.push(r_branch.clone());
                candidates_by_r[r_index] = None;
                continue;
            }
            current.push((r_index, intersection));
        }
        for (r_index, candidate) in current {
            if let Some(candidates) = &mut candidates_by_r[r_index] {
                candidates.push(candidate);
            }
        }
    }
    result.extend(candidates_by_r.into_iter().flatten().flatten());
    Ok(result)
}

/// A union against any node: distribute the intersection over branches.
pub(crate) fn intersect_union(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    let Inner::Union(lu) = l.inner() else {
        return Ok(Intersected::Orthogonal);
    };
    let (r_branches, r_ordered) = match r.inner() {
        Inner::Union(ru) => (ru.branches.clone(), ru.ordered),
        _ => (vec![r.clone()], false),
    };
    match (lu.branches.is_empty(), r_branches.is_empty()) {
        (true, true) => return Ok(Intersected::Node(l.clone())),
        (true, false) | (false, true) => {
            return Ok(Intersected::Disjoint(Disjoint::new(DisjointKind::Presence, l, r)));
        }
        (false, false) => {}
    }
    let branches = intersect_branches(&lu.branches, &r_branches)?;
    trace!(
        l = lu.branches.len(),
        r = r_branches.len(),
        result = branches.len(),
        "intersected branches"
    );
    if branches.is_empty() {
        return Ok(Intersected::Disjoint(Disjoint::new(DisjointKind::Union, l, r)));
    }
    let node = assemble_union(l.space(), branches, lu.ordered || r_ordered, Meta::default())?;
    Ok(Intersected::Node(node))
}
