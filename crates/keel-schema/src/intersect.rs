//! Intersection dispatch.
//!
//! `L ∩ R` is decided by a rule owned by whichever operand's kind comes
//! first in [`NodeKind`](crate::NodeKind) order:
//!
//! 1. Equal type ids intersect to `L`.
//! 2. The earlier-ordered operand becomes `l`, the other `r`.
//! 3. `l`'s rule for `r` is applied. Set kinds and units have a rule for
//!    every later kind; other constraint pairs without a rule relate
//!    orthogonally.
//! 4. A [`Disjoint`] computed with the operands swapped is inverted so that
//!    its `l` is always the caller's `L`.
//!
//! The result is therefore commutative up to disjoint inversion. Results
//! live in `L`'s space; an `R` from another space is adopted first.

use crate::bases;
use crate::disjoint::Disjoint;
use crate::errors::{SchemaError, SchemaResult};
use crate::node::{Inner, Node};
use crate::refinements;
use crate::sets;
use tracing::trace;

/// Outcome of intersecting two nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Intersected {
    Node(Node),
    /// No value satisfies both operands.
    Disjoint(Disjoint),
    /// The operands constrain unrelated aspects of a value and must be
    /// combined structurally, e.g. a divisor and a maximum.
    Orthogonal,
}

impl Intersected {
    pub fn node(self) -> Option<Node> {
        match self {
            Intersected::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn disjoint(&self) -> Option<&Disjoint> {
        match self {
            Intersected::Disjoint(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_disjoint(&self) -> bool {
        matches!(self, Intersected::Disjoint(_))
    }

    pub fn is_orthogonal(&self) -> bool {
        matches!(self, Intersected::Orthogonal)
    }
}

pub(crate) fn intersect(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    let r = &l.space().adopt(r);
    if l.type_id() == r.type_id() {
        return Ok(Intersected::Node(l.clone()));
    }
    let (first, second, swapped) = if r.kind() < l.kind() {
        (r, l, true)
    } else {
        (l, r, false)
    };
    let result = intersect_ordered(first, second)?;
    trace!(
        l = %first.kind(),
        r = %second.kind(),
        disjoint = result.is_disjoint(),
        orthogonal = result.is_orthogonal(),
        "intersect"
    );
    Ok(match result {
        Intersected::Disjoint(disjoint) if swapped => Intersected::Disjoint(disjoint.invert()),
        other => other,
    })
}

fn intersect_ordered(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    use Inner as I;
    Ok(match (l.inner(), r.inner()) {
        (I::Union(_), _) => return sets::intersect_union(l, r),
        (I::Morph(_), I::Morph(_)) => return sets::intersect_morphs(l, r),
        (I::Morph(_), _) => return sets::constrain_morph_input(l, r),
        (I::Intersection(_), _) => return sets::intersect_intersection(l, r),
        (I::Unit(_), _) => bases::intersect_unit(l, r),
        (I::Proto(_), I::Proto(_)) => bases::intersect_protos(l, r),
        (I::Proto(_), I::Domain(_)) => bases::intersect_proto_domain(l, r),
        (I::Domain(_), I::Domain(_)) => bases::intersect_domains(l, r),
        (I::Divisor(_), I::Divisor(_)) => refinements::intersect_divisors(l, r),
        (I::Max(_), I::Max(_)) | (I::Min(_), I::Min(_)) => refinements::intersect_bounds(l, r),
        (I::Max(_), I::Min(_)) => refinements::intersect_range(l, r),
        (I::Required(_) | I::Optional(_), I::Required(_) | I::Optional(_)) => {
            return refinements::intersect_props(l, r);
        }
        _ if l.kind().is_constraint() && r.kind().is_constraint() => Intersected::Orthogonal,
        _ => {
            return Err(SchemaError::internal(format!(
                "Unexpected intersection of {} and {}",
                l.kind(),
                r.kind()
            )));
        }
    })
}

/// Intersect, combining orthogonal operands into an intersection node.
///
/// Never returns [`Intersected::Orthogonal`].
pub(crate) fn conjoin(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    let r = &l.space().adopt(r);
    match intersect(l, r)? {
        Intersected::Orthogonal => sets::combine(l.space(), &[l, r]),
        other => Ok(other),
    }
}
