//! The node handle and everything derived from a node's inner record.
//!
//! A [`Node`] is an immutable, cheaply clonable handle to interned node data.
//! All derived data (ids, JSON, description, condition, compiled predicate,
//! references) is computed once when the node is interned by its
//! [`Space`](crate::Space); afterwards a node never changes.
//!
//! ## Identity
//!
//! | Field | Includes meta | Used for |
//! |-------|---------------|----------|
//! | `id` | yes | interning, deduplication |
//! | `type_id` | no | semantic equality ([`Node::equals`], `==`) |
//!
//! Both are the node's kind followed by its JSON (`min:1`), since the
//! collapsed JSON of different kinds can coincide.
//!
//! Both are canonical: constraints and unordered branches are sorted before
//! serialization, so equal sets of rules produce equal ids regardless of the
//! order in which they were written or intersected.

use crate::bases::{DomainInner, ProtoInner, UnitInner};
use crate::compile::Allows;
use crate::discriminate::Discriminant;
use crate::errors::SchemaResult;
use crate::intersect::{self, Intersected};
use crate::json::JsonWriter;
use crate::kind::NodeKind;
use crate::refinements::{BoundInner, DivisorInner, PatternInner, PredicateInner, PropInner};
use crate::schema::Def;
use crate::sets::{IntersectionInner, MorphInner, UnionInner};
use crate::space::Space;
use crate::traversal::{self, Problems, TraversalContext};
use crate::value::Value;
use serde_json::Value as JsonValue;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// =============================================================================
// Meta
// =============================================================================

/// User-supplied annotations. Meta participates in `id` but not `type_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Meta {
    pub description: Option<String>,
    pub alias: Option<String>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.alias.is_none()
    }
}

// =============================================================================
// Inner
// =============================================================================

/// The kind-specific immutable record a node is built from.
#[derive(Clone, Debug)]
pub enum Inner {
    Union(UnionInner),
    Morph(MorphInner),
    Intersection(IntersectionInner),
    Unit(UnitInner),
    Proto(ProtoInner),
    Domain(DomainInner),
    Divisor(DivisorInner),
    Max(BoundInner),
    Min(BoundInner),
    Pattern(PatternInner),
    Predicate(PredicateInner),
    Required(PropInner),
    Optional(PropInner),
}

impl Inner {
    pub fn kind(&self) -> NodeKind {
        match self {
            Inner::Union(_) => NodeKind::Union,
            Inner::Morph(_) => NodeKind::Morph,
            Inner::Intersection(_) => NodeKind::Intersection,
            Inner::Unit(_) => NodeKind::Unit,
            Inner::Proto(_) => NodeKind::Proto,
            Inner::Domain(_) => NodeKind::Domain,
            Inner::Divisor(_) => NodeKind::Divisor,
            Inner::Max(_) => NodeKind::Max,
            Inner::Min(_) => NodeKind::Min,
            Inner::Pattern(_) => NodeKind::Pattern,
            Inner::Predicate(_) => NodeKind::Predicate,
            Inner::Required(_) => NodeKind::Required,
            Inner::Optional(_) => NodeKind::Optional,
        }
    }

    /// Node-valued attributes, in the order they are compiled.
    pub fn children(&self) -> Vec<Node> {
        match self {
            Inner::Union(u) => u.branches.clone(),
            Inner::Morph(m) => std::iter::once(m.input.clone())
                .chain(m.output.clone())
                .collect(),
            Inner::Intersection(i) => i.rules().cloned().collect(),
            Inner::Required(p) | Inner::Optional(p) => vec![p.value.clone()],
            _ => Vec::new(),
        }
    }

    /// The same record with every child replaced by `f(child)`, sorted back
    /// into canonical order.
    pub(crate) fn map_children(&self, mut f: impl FnMut(&Node) -> Node) -> Inner {
        match self {
            Inner::Union(u) => {
                let mut branches: Vec<Node> = u.branches.iter().map(&mut f).collect();
                if !u.ordered {
                    crate::sets::sort_branches(&mut branches);
                }
                Inner::Union(UnionInner {
                    branches,
                    ordered: u.ordered,
                })
            }
            Inner::Morph(m) => Inner::Morph(MorphInner {
                input: f(&m.input),
                output: m.output.as_ref().map(&mut f),
                morphs: m.morphs.clone(),
            }),
            Inner::Intersection(i) => {
                let basis = i.basis.as_ref().map(&mut f);
                let mut constraints: Vec<Node> = i.constraints.iter().map(&mut f).collect();
                crate::sets::sort_constraints(&mut constraints);
                Inner::Intersection(IntersectionInner { basis, constraints })
            }
            Inner::Required(p) => Inner::Required(PropInner {
                key: p.key.clone(),
                value: f(&p.value),
            }),
            Inner::Optional(p) => Inner::Optional(PropInner {
                key: p.key.clone(),
                value: f(&p.value),
            }),
            leaf => leaf.clone(),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Inner::Union(u) => u.describe(),
            Inner::Morph(m) => m.describe(),
            Inner::Intersection(i) => i.describe(),
            Inner::Unit(u) => u.describe(),
            Inner::Proto(p) => p.describe(),
            Inner::Domain(d) => d.describe(),
            Inner::Divisor(d) => d.describe(),
            Inner::Max(b) => b.describe(NodeKind::Max),
            Inner::Min(b) => b.describe(NodeKind::Min),
            Inner::Pattern(p) => p.describe(),
            Inner::Predicate(p) => p.describe(),
            Inner::Required(p) => p.describe(NodeKind::Required),
            Inner::Optional(p) => p.describe(NodeKind::Optional),
        }
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        match self {
            Inner::Union(u) => u.to_json(w, meta),
            Inner::Morph(m) => m.to_json(w, meta),
            Inner::Intersection(i) => i.to_json(w, meta),
            Inner::Unit(u) => u.to_json(w, meta),
            Inner::Proto(p) => p.to_json(w, meta),
            Inner::Domain(d) => d.to_json(w, meta),
            Inner::Divisor(d) => d.to_json(w, meta),
            Inner::Max(b) | Inner::Min(b) => b.to_json(w, meta),
            Inner::Pattern(p) => p.to_json(w, meta),
            Inner::Predicate(p) => p.to_json(w, meta),
            Inner::Required(p) | Inner::Optional(p) => p.to_json(w, meta),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

pub(crate) struct NodeData {
    pub(crate) inner: Inner,
    pub(crate) meta: Meta,
    pub(crate) id: String,
    pub(crate) type_id: String,
    pub(crate) json: JsonValue,
    pub(crate) type_json: JsonValue,
    pub(crate) children: Vec<Node>,
    /// Transitive children, deduplicated by id; `references` adds self.
    pub(crate) descendants: Vec<Node>,
    pub(crate) description: String,
    pub(crate) alias: String,
    pub(crate) condition: String,
    pub(crate) includes_morph: bool,
    pub(crate) discriminant: Option<Discriminant>,
    pub(crate) allows: Allows,
    pub(crate) space: Space,
}

/// Handle to an interned, immutable schema node.
///
/// Equality (`==`, `Hash`) is semantic: two nodes of one space are equal iff
/// their `type_id`s are equal.
#[derive(Clone)]
pub struct Node(pub(crate) Arc<NodeData>);

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.0.inner.kind()
    }

    pub fn inner(&self) -> &Inner {
        &self.0.inner
    }

    pub fn meta(&self) -> &Meta {
        &self.0.meta
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn type_id(&self) -> &str {
        &self.0.type_id
    }

    /// Plain structural representation, accepted back by the parser.
    pub fn json(&self) -> &JsonValue {
        &self.0.json
    }

    /// [`Node::json`] without descriptions or aliases.
    pub fn type_json(&self) -> &JsonValue {
        &self.0.type_json
    }

    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    /// Every node reachable from this one, itself first.
    pub fn references(&self) -> Vec<Node> {
        std::iter::once(self.clone())
            .chain(self.0.descendants.iter().cloned())
            .collect()
    }

    /// Boolean expression over `data` equivalent to [`Node::allows`].
    pub fn condition(&self) -> &str {
        &self.0.condition
    }

    pub fn description(&self) -> &str {
        &self.0.description
    }

    pub fn alias(&self) -> &str {
        &self.0.alias
    }

    pub fn space(&self) -> &Space {
        &self.0.space
    }

    pub fn is_basis(&self) -> bool {
        self.kind().is_basis()
    }

    pub fn is_refinement(&self) -> bool {
        self.kind().is_refinement()
    }

    pub fn is_set(&self) -> bool {
        self.kind().is_set()
    }

    /// The empty intersection, satisfied by every value.
    pub fn is_unknown(&self) -> bool {
        matches!(&self.0.inner, Inner::Intersection(i) if i.is_empty())
    }

    /// The empty union, satisfied by no value.
    pub fn is_never(&self) -> bool {
        matches!(&self.0.inner, Inner::Union(u) if u.branches.is_empty())
    }

    /// True if this node or any descendant is a morph.
    pub fn includes_morph(&self) -> bool {
        self.0.includes_morph
    }

    pub fn discriminant(&self) -> Option<&Discriminant> {
        self.0.discriminant.as_ref()
    }

    /// Semantic equality. A node from another space is compared after
    /// adoption into this one, since reference names are per space.
    pub fn equals(&self, other: &Node) -> bool {
        if self.space().ptr_eq(other.space()) {
            return self.type_id() == other.type_id();
        }
        self.type_id() == self.space().adopt(other).type_id()
    }

    pub fn allows(&self, data: &Value) -> bool {
        (self.0.allows)(data)
    }

    /// Validate `data`, running morphs, and return the result or every
    /// problem found.
    pub fn apply(&self, data: &Value) -> Result<Value, Problems> {
        let mut ctx = TraversalContext::new();
        let out = traversal::traverse(self, data.clone(), &mut ctx);
        ctx.finish(out)
    }

    /// Algebraic intersection; see [`Intersected`].
    pub fn intersect(&self, other: &Node) -> SchemaResult<Intersected> {
        intersect::intersect(self, other)
    }

    /// Intersection that always yields a node.
    ///
    /// Orthogonal operands are combined into an intersection node, and a
    /// disjoint result becomes [`SchemaError::Unsatisfiable`](crate::SchemaError).
    pub fn and(&self, other: &Node) -> SchemaResult<Node> {
        match intersect::conjoin(self, other)? {
            Intersected::Node(node) => Ok(node),
            Intersected::Disjoint(disjoint) => disjoint.throw(),
            Intersected::Orthogonal => Err(crate::SchemaError::internal(format!(
                "Unexpected orthogonal result intersecting {} and {}",
                self.kind(),
                other.kind()
            ))),
        }
    }

    pub fn or(&self, other: &Node) -> SchemaResult<Node> {
        self.space().union([self.clone(), other.clone()])
    }

    /// True if every value allowed by `self` is allowed by `other`.
    pub fn extends(&self, other: &Node) -> SchemaResult<bool> {
        Ok(match intersect::conjoin(self, other)? {
            Intersected::Node(node) => node.equals(self),
            _ => false,
        })
    }

    /// Parse a refinement of `kind` against this node's basis and add it.
    pub fn constrain(&self, kind: NodeKind, def: impl Into<Def>) -> SchemaResult<Node> {
        let refinement = crate::parse::parse_refinement_for(self, kind, def.into())?;
        self.and(&refinement)
    }

    /// The same node with a different description.
    pub fn with_description(&self, description: impl Into<String>) -> Node {
        let meta = Meta {
            description: Some(description.into()),
            alias: self.0.meta.alias.clone(),
        };
        self.space().intern(self.0.inner.clone(), meta)
    }

    /// The validator applied before any morph runs.
    pub fn input(&self) -> SchemaResult<Node> {
        crate::sets::project(self, crate::sets::Projection::In)
    }

    /// The validator describing values after every morph ran.
    pub fn output(&self) -> SchemaResult<Node> {
        crate::sets::project(self, crate::sets::Projection::Out)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Node {}

/// Consistent with `==` among nodes of one space.
impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id().hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.json())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl serde::Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.json().serialize(serializer)
    }
}

/// Collect transitive children without duplicates, in first-visit order.
pub(crate) fn collect_descendants(children: &[Node]) -> Vec<Node> {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut out = Vec::new();
    for child in children {
        for node in child.references() {
            if seen.insert(node.id().to_string()) {
                out.push(node);
            }
        }
    }
    out
}
