//! Refinement nodes: constraints layered on top of a basis.
//!
//! | Kind | Legal under | Implied basis |
//! |------|-------------|---------------|
//! | `divisor` | `number` | `number` |
//! | `min` / `max` (value) | `number` | `number` |
//! | `min` / `max` (length) | `string`, `Array` | - |
//! | `min` / `max` (time) | `Date` | `Date` |
//! | `pattern` | `string` | `string` |
//! | `predicate` | anything | - |
//! | `required` / `optional` | `object`, any proto | `object` |
//!
//! Schema literals must state a compatible basis explicitly. Algebraic
//! composition (`and`) of bare refinements inserts the implied basis.

mod bound;
mod divisor;
mod pattern;
mod predicate;
mod props;

pub use bound::{BoundAxis, BoundInner};
pub use divisor::DivisorInner;
pub use pattern::PatternInner;
pub use predicate::{Predicate, PredicateFn, PredicateInner};
pub use props::PropInner;

pub(crate) use bound::{implied_axis, intersect_bounds, intersect_range};
pub(crate) use divisor::intersect_divisors;
pub(crate) use props::{intersect_props, prop_access};

use crate::bases::{basis_domain, basis_proto};
use crate::node::{Inner, Meta, Node};
use crate::space::Space;
use crate::value::{Domain, Proto};

/// Why `refinement` cannot apply to `basis`, if it cannot.
pub(crate) fn applicability_error(refinement: &Node, basis: Option<&Node>) -> Option<String> {
    let domain = basis.and_then(basis_domain);
    let proto = basis.and_then(basis_proto);
    let operand = basis.map_or("a value", |b| b.description());
    match refinement.inner() {
        Inner::Predicate(_) => None,
        Inner::Divisor(_) => (domain != Some(Domain::Number))
            .then(|| format!("Divisibility operand {operand} must be a number")),
        Inner::Pattern(_) => (domain != Some(Domain::String))
            .then(|| format!("Match operand {operand} must be a string")),
        Inner::Required(_) | Inner::Optional(_) => (domain != Some(Domain::Object))
            .then(|| format!("Property operand {operand} must be an object")),
        Inner::Min(b) | Inner::Max(b) => {
            let legal = match b.axis {
                BoundAxis::Value => domain == Some(Domain::Number),
                BoundAxis::Length => {
                    domain == Some(Domain::String)
                        || proto.is_some_and(|p| p.is_subclass_of(&Proto::array()))
                }
                BoundAxis::Time => proto.is_some_and(|p| p.is_subclass_of(&Proto::date())),
            };
            (!legal).then(|| {
                format!(
                    "Bound operand {operand} must be {}",
                    match b.axis {
                        BoundAxis::Value => "a number",
                        BoundAxis::Length => "a string or an array",
                        BoundAxis::Time => "a Date",
                    }
                )
            })
        }
        _ => Some(format!("{} is not a refinement", refinement.kind())),
    }
}

/// The basis a bare refinement implies when composed algebraically.
pub(crate) fn implied_basis(space: &Space, refinement: &Node) -> Option<Node> {
    use crate::bases::{DomainInner, ProtoInner};
    let domain = |domain| Some(space.intern(Inner::Domain(DomainInner { domain }), Meta::default()));
    match refinement.inner() {
        Inner::Divisor(_) => domain(Domain::Number),
        Inner::Pattern(_) => domain(Domain::String),
        Inner::Required(_) | Inner::Optional(_) => domain(Domain::Object),
        Inner::Min(b) | Inner::Max(b) => match b.axis {
            BoundAxis::Value => domain(Domain::Number),
            BoundAxis::Time => Some(space.intern(
                Inner::Proto(ProtoInner {
                    proto: Proto::date(),
                }),
                Meta::default(),
            )),
            BoundAxis::Length => None,
        },
        _ => None,
    }
}
