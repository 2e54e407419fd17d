//! Schema Node Algebra
//!
//! Runtime validators represented as an algebra of immutable, interned
//! nodes. It provides:
//!
//! - **Bases**: `domain`, `unit` and `proto` nodes that fix what kind of
//!   value is accepted
//! - **Refinements**: divisors, bounds, patterns, predicates and props
//!   layered on a basis
//! - **Sets**: intersections, unions and morphs that compose other nodes
//!
//! Key properties:
//! - Semantic equality via canonical ids (`type_id` comparison)
//! - Commutative intersection with structured disjoint results
//! - Conditions and predicates compiled once per node
mod bases;
mod compile;
mod discriminate;
mod disjoint;
mod errors;
mod intersect;
mod json;
mod kind;
pub mod limits;
mod node;
mod parse;
mod refinements;
mod registry;
mod schema;
mod sets;
mod space;
mod traversal;
mod value;

pub use bases::{DomainInner, ProtoInner, UnitInner};
pub use discriminate::{CaseKey, Discriminant, DiscriminantCase, DiscriminantKind};
pub use disjoint::{Disjoint, DisjointKind};
pub use errors::{InternalError, ParseError, SchemaError, SchemaResult};
pub use intersect::Intersected;
pub use kind::NodeKind;
pub use node::{Inner, Meta, Node};
pub use refinements::{
    BoundAxis, BoundInner, DivisorInner, PatternInner, Predicate, PredicateFn, PredicateInner,
    PropInner,
};
pub use registry::{Registered, Registry};
pub use schema::Def;
pub use sets::{IntersectionInner, Morph, MorphFn, MorphInner, UnionInner};
pub use space::{Space, SpaceConfig};
pub use traversal::{Problem, ProblemCode, Problems, TraversalContext};
pub use value::{Domain, Object, ObjectBody, PropKey, Proto, Symbol, Value};

/// Parse `def` as a root schema in the global space.
pub fn schema(def: impl Into<Def>) -> SchemaResult<Node> {
    Space::global().schema(def)
}

/// Parse `def` as a node of `kind` in the global space.
pub fn node(kind: NodeKind, def: impl Into<Def>) -> SchemaResult<Node> {
    Space::global().node(kind, def)
}

#[cfg(test)]
#[path = "../tests/intersection_tests.rs"]
mod intersection_tests;
#[cfg(test)]
#[path = "../tests/union_tests.rs"]
mod union_tests;
#[cfg(test)]
#[path = "../tests/traversal_tests.rs"]
mod traversal_tests;
#[cfg(test)]
#[path = "../tests/morph_tests.rs"]
mod morph_tests;
#[cfg(test)]
#[path = "../tests/json_tests.rs"]
mod json_tests;
#[cfg(test)]
#[path = "../tests/space_tests.rs"]
mod space_tests;
#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod parse_tests;
