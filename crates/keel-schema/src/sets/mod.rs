//! Set nodes: intersection, union and morph.
//!
//! Set nodes own other nodes. Their constructors normalize (fold, reduce,
//! sort) before interning, so every set node that exists is already in
//! canonical form.

mod intersection;
mod morph;
mod union;

pub use intersection::IntersectionInner;
pub use morph::{Morph, MorphFn, MorphInner};
pub use union::UnionInner;

pub(crate) use intersection::{combine, from_schema, intersect_intersection, sort_constraints};
pub(crate) use morph::{constrain_morph_input, create_morph, intersect_morphs};
pub(crate) use union::{assemble_union, intersect_union, sort_branches};

use crate::errors::SchemaResult;
use crate::node::{Inner, Meta, Node};
use crate::refinements::PropInner;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Projection {
    In,
    Out,
}

/// Replace every morph reachable from `node` by its input or output
/// validator.
pub(crate) fn project(node: &Node, projection: Projection) -> SchemaResult<Node> {
    if !node.includes_morph() {
        return Ok(node.clone());
    }
    let space = node.space();
    match node.inner() {
        Inner::Morph(m) => Ok(match projection {
            Projection::In => m.input.clone(),
            Projection::Out => m.output.clone().unwrap_or_else(|| space.unknown()),
        }),
        Inner::Union(u) => {
            let branches = u
                .branches
                .iter()
                .map(|b| project(b, projection))
                .collect::<SchemaResult<Vec<_>>>()?;
            assemble_union(space, branches, u.ordered, Meta::default())
        }
        Inner::Intersection(i) => {
            let rules = i
                .rules()
                .map(|r| project(r, projection))
                .collect::<SchemaResult<Vec<_>>>()?;
            let refs: Vec<&Node> = rules.iter().collect();
            match combine(space, &refs)? {
                crate::Intersected::Node(n) => Ok(n),
                crate::Intersected::Disjoint(d) => d.throw(),
                crate::Intersected::Orthogonal => Ok(space.unknown()),
            }
        }
        Inner::Required(p) | Inner::Optional(p) => {
            let value = project(&p.value, projection)?;
            let inner = PropInner {
                key: p.key.clone(),
                value,
            };
            let inner = if matches!(node.inner(), Inner::Optional(_)) {
                Inner::Optional(inner)
            } else {
                Inner::Required(inner)
            };
            Ok(space.intern(inner, Meta::default()))
        }
        _ => Ok(node.clone()),
    }
}
