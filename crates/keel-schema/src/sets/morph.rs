use crate::errors::{SchemaError, SchemaResult};
use crate::intersect::{self, Intersected};
use crate::json::JsonWriter;
use crate::node::{Inner, Meta, Node};
use crate::space::Space;
use crate::traversal::TraversalContext;
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

pub type MorphFn = dyn Fn(Value, &mut TraversalContext) -> Value + Send + Sync;

/// A value transform, compared by identity.
///
/// Transforms receive the traversal context so they can report problems
/// of their own; a transform that does so fails the traversal.
#[derive(Clone)]
pub struct Morph {
    name: Option<Arc<str>>,
    f: Arc<MorphFn>,
}

impl Morph {
    pub fn new(f: impl Fn(Value, &mut TraversalContext) -> Value + Send + Sync + 'static) -> Self {
        Self { name: None, f: Arc::new(f) }
    }

    pub fn named(
        name: impl Into<Arc<str>>,
        f: impl Fn(Value, &mut TraversalContext) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Some(name.into()),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, data: Value, ctx: &mut TraversalContext) -> Value {
        (self.f)(data, ctx)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.f) as *const () as usize
    }
}

impl PartialEq for Morph {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for Morph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Morph({})", self.name().unwrap_or("anonymous"))
    }
}

/// Validate with `input`, apply `morphs` in order, then validate the result
/// with `output` if present.
#[derive(Clone, Debug)]
pub struct MorphInner {
    pub input: Node,
    pub output: Option<Node>,
    pub morphs: Vec<Morph>,
}

impl MorphInner {
    pub(crate) fn describe(&self) -> String {
        match &self.output {
            Some(out) => format!(
                "a morph from {} to {}",
                self.input.description(),
                out.description()
            ),
            None => format!("a morph from {}", self.input.description()),
        }
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let mut fields = Map::new();
        fields.insert("in".into(), w.child(&self.input));
        if let Some(out) = &self.output {
            fields.insert("out".into(), w.child(out));
        }
        let morphs = self
            .morphs
            .iter()
            .map(|m| JsonValue::String(w.registry.reference_morph(m)))
            .collect();
        fields.insert("morph".into(), JsonValue::Array(morphs));
        w.finish(None, fields, meta)
    }
}

pub(crate) fn create_morph(
    space: &Space,
    input: Node,
    output: Option<Node>,
    morphs: Vec<Morph>,
    meta: Meta,
) -> SchemaResult<Node> {
    if !(input.kind() == crate::NodeKind::Intersection || input.is_basis()) {
        return Err(SchemaError::parse(format!(
            "Morph input must be an intersection or basis (was {})",
            input.kind()
        )));
    }
    if let Some(out) = &output {
        if out.is_refinement() {
            return Err(SchemaError::parse(format!(
                "Morph output cannot be a bare {} refinement",
                out.kind()
            )));
        }
    }
    if morphs.is_empty() {
        return Err(SchemaError::parse("A morph requires at least one transform"));
    }
    Ok(space.intern(
        Inner::Morph(MorphInner {
            input,
            output,
            morphs,
        }),
        meta,
    ))
}

/// Morphs only intersect when they run the same transforms; their
/// validators are then intersected independently.
pub(crate) fn intersect_morphs(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    let (Inner::Morph(lm), Inner::Morph(rm)) = (l.inner(), r.inner()) else {
        return Ok(Intersected::Orthogonal);
    };
    if lm.morphs != rm.morphs {
        return Err(SchemaError::parse(format!(
            "Invalid intersection of morphs {} and {}",
            l.description(),
            r.description()
        )));
    }
    let input = match intersect::conjoin(&lm.input, &rm.input)? {
        Intersected::Node(node) => node,
        other => return Ok(other),
    };
    let output = match (&lm.output, &rm.output) {
        (None, None) => None,
        (Some(out), None) | (None, Some(out)) => Some(out.clone()),
        (Some(a), Some(b)) => match intersect::conjoin(a, b)? {
            Intersected::Node(node) => Some(node),
            other => return Ok(other),
        },
    };
    let node = create_morph(l.space(), input, output, lm.morphs.clone(), Meta::default())?;
    Ok(Intersected::Node(node))
}

/// A morph against a non-morph constrains only what the morph accepts.
pub(crate) fn constrain_morph_input(l: &Node, r: &Node) -> SchemaResult<Intersected> {
    let Inner::Morph(m) = l.inner() else {
        return Ok(Intersected::Orthogonal);
    };
    match intersect::conjoin(&m.input, r)? {
        Intersected::Node(input) if input == m.input => Ok(Intersected::Node(l.clone())),
        Intersected::Node(input) => {
            let node = create_morph(
                l.space(),
                input,
                m.output.clone(),
                m.morphs.clone(),
                Meta::default(),
            )?;
            Ok(Intersected::Node(node))
        }
        other => Ok(other),
    }
}
