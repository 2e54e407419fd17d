//! Proof that two constraints admit no common value.
//!
//! A [`Disjoint`] is an ordinary return value of intersection, not an
//! error. It records which rule produced it and both conflicting operands,
//! plus the property path at which the conflict occurred when it surfaced
//! from a nested value. [`Disjoint::throw`] converts it into a
//! [`SchemaError::Unsatisfiable`] for callers that require a result.

use crate::errors::SchemaError;
use crate::node::Node;
use crate::value::PropKey;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisjointKind {
    /// Two different domains.
    Domain,
    /// Two different literal units.
    Unit,
    /// Two unrelated constructors.
    Proto,
    /// Exactly one operand is `never`.
    Presence,
    /// A minimum above a maximum.
    Range,
    /// A value or refinement that cannot apply to the other operand.
    Assignability,
    /// No pair of branches intersects.
    Union,
}

impl DisjointKind {
    pub const fn name(self) -> &'static str {
        match self {
            DisjointKind::Domain => "domain",
            DisjointKind::Unit => "unit",
            DisjointKind::Proto => "proto",
            DisjointKind::Presence => "presence",
            DisjointKind::Range => "range",
            DisjointKind::Assignability => "assignability",
            DisjointKind::Union => "union",
        }
    }
}

impl fmt::Display for DisjointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{}", self.describe())]
pub struct Disjoint {
    kind: DisjointKind,
    l: Node,
    r: Node,
    path: Vec<PropKey>,
}

impl Disjoint {
    pub fn new(kind: DisjointKind, l: &Node, r: &Node) -> Self {
        Self {
            kind,
            l: l.clone(),
            r: r.clone(),
            path: Vec::new(),
        }
    }

    pub fn kind(&self) -> DisjointKind {
        self.kind
    }

    pub fn l(&self) -> &Node {
        &self.l
    }

    pub fn r(&self) -> &Node {
        &self.r
    }

    /// Property path from the intersected roots to the conflict.
    pub fn path(&self) -> &[PropKey] {
        &self.path
    }

    /// Swap operands, for results computed with the operands reversed.
    pub fn invert(self) -> Self {
        Self {
            kind: self.kind,
            l: self.r,
            r: self.l,
            path: self.path,
        }
    }

    /// Record that this conflict occurred under `key`.
    pub fn at_key(mut self, key: &PropKey) -> Self {
        self.path.insert(0, key.clone());
        self
    }

    pub fn throw<T>(self) -> Result<T, SchemaError> {
        Err(SchemaError::Unsatisfiable(self))
    }

    fn describe(&self) -> String {
        let location = if self.path.is_empty() {
            String::new()
        } else {
            let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
            format!(" at {}", path.join("."))
        };
        format!(
            "Intersection{location} of {} and {} results in an unsatisfiable type",
            self.l.description(),
            self.r.description()
        )
    }
}

impl PartialEq for Disjoint {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.l == other.l && self.r == other.r && self.path == other.path
    }
}
