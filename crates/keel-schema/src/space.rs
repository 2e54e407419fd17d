//! Schema spaces: the context nodes are parsed, interned and registered in.
//!
//! A [`Space`] owns:
//!
//! - the node table, a content-addressed map from id to a weak node handle
//!   (interning is insert-if-absent; entries die with their nodes),
//! - the [`Registry`] of reference names for identity-compared values,
//! - the [`SpaceConfig`].
//!
//! Most callers use [`Space::global`]. Separate spaces are useful to isolate
//! registry names or to use a different configuration.

use crate::compile;
use crate::discriminate;
use crate::errors::{SchemaError, SchemaResult};
use crate::json::JsonWriter;
use crate::kind::NodeKind;
use crate::limits::{DEFAULT_REGISTRY_PREFIX, MAX_REDUCIBLE_BRANCHES};
use crate::node::{Inner, Meta, Node, NodeData, collect_descendants};
use crate::parse;
use crate::registry::Registry;
use crate::schema::Def;
use crate::sets::{IntersectionInner, UnionInner};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::debug;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpaceConfig {
    /// Prefix of registry references (`$ark.Date`).
    pub registry_prefix: String,
    /// Compile discriminated dispatch for unions where possible.
    pub discriminate_unions: bool,
    /// Largest union that gets pairwise subtype reduction.
    pub max_reducible_branches: usize,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            registry_prefix: DEFAULT_REGISTRY_PREFIX.to_string(),
            discriminate_unions: true,
            max_reducible_branches: MAX_REDUCIBLE_BRANCHES,
        }
    }
}

impl SpaceConfig {
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| SchemaError::parse(format!("Invalid space config: {err}")))
    }
}

// =============================================================================
// Space
// =============================================================================

struct SpaceInner {
    config: SpaceConfig,
    nodes: DashMap<String, Weak<NodeData>>,
    registry: Registry,
    aliases_by_kind: DashMap<NodeKind, u32>,
}

/// Cheaply clonable handle to a schema space.
#[derive(Clone)]
pub struct Space(Arc<SpaceInner>);

static GLOBAL: Lazy<Space> = Lazy::new(Space::new);

impl Space {
    pub fn new() -> Self {
        Self::with_config(SpaceConfig::default())
    }

    pub fn with_config(config: SpaceConfig) -> Self {
        let registry = Registry::new(config.registry_prefix.clone());
        Self(Arc::new(SpaceInner {
            config,
            nodes: DashMap::new(),
            registry,
            aliases_by_kind: DashMap::new(),
        }))
    }

    /// The process-wide default space.
    pub fn global() -> &'static Space {
        &GLOBAL
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.0.config
    }

    pub fn registry(&self) -> &Registry {
        &self.0.registry
    }

    pub fn ptr_eq(&self, other: &Space) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Parse `def` as a node of exactly `kind`.
    pub fn node(&self, kind: NodeKind, def: impl Into<Def>) -> SchemaResult<Node> {
        parse::parse_kind(self, kind, def.into())
    }

    /// Parse `def` as a root schema, inferring the kind from its shape.
    pub fn schema(&self, def: impl Into<Def>) -> SchemaResult<Node> {
        parse::parse_root(self, def.into())
    }

    /// Union of already-parsed nodes.
    pub fn union(&self, branches: impl IntoIterator<Item = Node>) -> SchemaResult<Node> {
        let branches = branches.into_iter().map(|b| self.adopt(&b)).collect();
        crate::sets::assemble_union(self, branches, false, Meta::default())
    }

    /// The empty intersection.
    pub fn unknown(&self) -> Node {
        self.intern(
            Inner::Intersection(IntersectionInner {
                basis: None,
                constraints: Vec::new(),
            }),
            Meta::default(),
        )
    }

    /// The empty union.
    pub fn never(&self) -> Node {
        self.intern(
            Inner::Union(UnionInner {
                branches: Vec::new(),
                ordered: false,
            }),
            Meta::default(),
        )
    }

    /// `node` rebuilt in this space.
    ///
    /// Identity-compared values it references are registered here, so
    /// references drawn from another space cannot collide with this one's.
    /// Nodes already in this space are returned as they are.
    pub fn adopt(&self, node: &Node) -> Node {
        if node.space().ptr_eq(self) {
            return node.clone();
        }
        let inner = node.inner().map_children(|child| self.adopt(child));
        self.intern(inner, node.meta().clone())
    }

    /// Number of interned nodes still alive.
    pub fn live_nodes(&self) -> usize {
        self.0
            .nodes
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    /// Drop table entries whose nodes no longer exist.
    pub fn prune(&self) {
        self.0.nodes.retain(|_, node| node.strong_count() > 0);
    }

    fn next_alias(&self, kind: NodeKind, meta: &Meta) -> String {
        if let Some(alias) = &meta.alias {
            return alias.clone();
        }
        let mut count = self.0.aliases_by_kind.entry(kind).or_insert(0);
        *count += 1;
        format!("{}{}", kind.name(), *count)
    }

    fn lookup(&self, id: &str) -> Option<Node> {
        self.0
            .nodes
            .get(id)
            .and_then(|weak| weak.upgrade())
            .map(Node)
    }

    /// Intern a normalized inner record, computing all derived data.
    ///
    /// Ids are qualified by kind: the collapsed JSON of `min` and `max`, or
    /// of `required` and `optional`, is the same.
    pub(crate) fn intern(&self, inner: Inner, meta: Meta) -> Node {
        let registry = self.registry();
        let kind = inner.kind();
        let json = inner.to_json(&JsonWriter::new(registry, true), &meta);
        let id = format!("{kind}:{json}");
        if let Some(existing) = self.lookup(&id) {
            return existing;
        }

        let type_json = inner.to_json(&JsonWriter::new(registry, false), &meta);
        let type_id = format!("{kind}:{type_json}");
        let children = inner.children();
        let descendants = collect_descendants(&children);
        let includes_morph = kind == NodeKind::Morph || children.iter().any(Node::includes_morph);
        let discriminant = match &inner {
            Inner::Union(u) if self.config().discriminate_unions => {
                discriminate::discriminate(&u.branches)
            }
            _ => None,
        };
        let description = meta.description.clone().unwrap_or_else(|| inner.describe());
        let condition = compile::condition(&inner, discriminant.as_ref(), "data", registry);
        let allows = compile::allows(&inner, discriminant.as_ref());

        let mut data = NodeData {
            inner,
            meta,
            id: id.clone(),
            type_id,
            json,
            type_json,
            children,
            descendants,
            description,
            alias: String::new(),
            condition,
            includes_morph,
            discriminant,
            allows,
            space: self.clone(),
        };

        match self.0.nodes.entry(id) {
            Entry::Occupied(mut entry) => {
                if let Some(existing) = entry.get().upgrade() {
                    return Node(existing);
                }
                data.alias = self.next_alias(kind, &data.meta);
                let node = Arc::new(data);
                entry.insert(Arc::downgrade(&node));
                Node(node)
            }
            Entry::Vacant(entry) => {
                data.alias = self.next_alias(kind, &data.meta);
                debug!(kind = %kind, id = %data.id, alias = %data.alias, "interned node");
                let node = Arc::new(data);
                entry.insert(Arc::downgrade(&node));
                Node(node)
            }
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Space")
            .field("config", &self.0.config)
            .field("nodes", &self.0.nodes.len())
            .field("registry", &self.0.registry)
            .finish()
    }
}
