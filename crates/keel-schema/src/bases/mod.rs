//! Basis nodes: the root set a value belongs to.
//!
//! An intersection holds at most one basis. Refinements check their
//! applicability against it (a divisor needs a number, a pattern a string),
//! and algebra between bases is always decided: a basis pair either merges
//! to one of the operands or is disjoint.

mod domain;
mod proto;
mod unit;

pub use domain::DomainInner;
pub use proto::ProtoInner;
pub use unit::UnitInner;

pub(crate) use domain::intersect_domains;
pub(crate) use proto::{intersect_proto_domain, intersect_protos};
pub(crate) use unit::intersect_unit;

use crate::node::{Inner, Node};
use crate::value::{Domain, Proto};

/// The domain a basis restricts values to.
pub(crate) fn basis_domain(basis: &Node) -> Option<Domain> {
    match basis.inner() {
        Inner::Domain(d) => Some(d.domain),
        Inner::Unit(u) => Some(u.unit.domain()),
        Inner::Proto(_) => Some(Domain::Object),
        _ => None,
    }
}

/// The constructor a basis restricts values to.
pub(crate) fn basis_proto(basis: &Node) -> Option<&Proto> {
    match basis.inner() {
        Inner::Proto(p) => Some(&p.proto),
        _ => None,
    }
}
