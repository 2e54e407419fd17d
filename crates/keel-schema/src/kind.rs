//! Node kinds and the precedence order used for intersection dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every node is exactly one of these kinds.
///
/// Variants are declared in precedence order: when two nodes are
/// intersected, the one whose kind comes first owns the rule that decides
/// the result. The derived `Ord` is that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Union,
    Morph,
    Intersection,
    Unit,
    Proto,
    Domain,
    Divisor,
    Max,
    Min,
    Pattern,
    Predicate,
    Required,
    Optional,
}

impl NodeKind {
    pub const ALL: [NodeKind; 13] = [
        NodeKind::Union,
        NodeKind::Morph,
        NodeKind::Intersection,
        NodeKind::Unit,
        NodeKind::Proto,
        NodeKind::Domain,
        NodeKind::Divisor,
        NodeKind::Max,
        NodeKind::Min,
        NodeKind::Pattern,
        NodeKind::Predicate,
        NodeKind::Required,
        NodeKind::Optional,
    ];

    pub const REFINEMENTS: [NodeKind; 7] = [
        NodeKind::Divisor,
        NodeKind::Max,
        NodeKind::Min,
        NodeKind::Pattern,
        NodeKind::Predicate,
        NodeKind::Required,
        NodeKind::Optional,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::Union => "union",
            NodeKind::Morph => "morph",
            NodeKind::Intersection => "intersection",
            NodeKind::Unit => "unit",
            NodeKind::Proto => "proto",
            NodeKind::Domain => "domain",
            NodeKind::Divisor => "divisor",
            NodeKind::Max => "max",
            NodeKind::Min => "min",
            NodeKind::Pattern => "pattern",
            NodeKind::Predicate => "predicate",
            NodeKind::Required => "required",
            NodeKind::Optional => "optional",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub const fn is_set(self) -> bool {
        matches!(self, NodeKind::Union | NodeKind::Morph | NodeKind::Intersection)
    }

    pub const fn is_basis(self) -> bool {
        matches!(self, NodeKind::Unit | NodeKind::Proto | NodeKind::Domain)
    }

    pub const fn is_refinement(self) -> bool {
        matches!(
            self,
            NodeKind::Divisor
                | NodeKind::Max
                | NodeKind::Min
                | NodeKind::Pattern
                | NodeKind::Predicate
                | NodeKind::Required
                | NodeKind::Optional
        )
    }

    /// Basis and refinement kinds, i.e. the rules an intersection holds.
    pub const fn is_constraint(self) -> bool {
        self.is_basis() || self.is_refinement()
    }

    /// Kinds that can appear directly as a union branch.
    pub const fn is_branch(self) -> bool {
        matches!(self, NodeKind::Morph | NodeKind::Intersection) || self.is_basis()
    }

    /// Refinements that may occur several times in one intersection.
    pub const fn is_repeatable(self) -> bool {
        matches!(
            self,
            NodeKind::Pattern | NodeKind::Predicate | NodeKind::Required | NodeKind::Optional
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
