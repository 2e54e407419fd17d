use crate::json::JsonWriter;
use crate::node::Meta;
use crate::registry::Registry;
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

pub type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// An arbitrary boolean check, compared by identity.
#[derive(Clone)]
pub struct Predicate {
    name: Option<Arc<str>>,
    f: Arc<PredicateFn>,
}

impl Predicate {
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: None,
            f: Arc::new(f),
        }
    }

    /// A predicate registered under `name` instead of `predicateN`.
    pub fn named(name: impl Into<Arc<str>>, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: Some(name.into()),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, data: &Value) -> bool {
        (self.f)(data)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.f) as *const () as usize
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.name().unwrap_or("anonymous"))
    }
}

#[derive(Clone, Debug)]
pub struct PredicateInner {
    pub predicate: Predicate,
}

impl PredicateInner {
    pub(crate) fn describe(&self) -> String {
        match self.predicate.name() {
            Some(name) => format!("valid according to {name}"),
            None => "valid according to an anonymous predicate".to_string(),
        }
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let reference = JsonValue::String(w.registry.reference_predicate(&self.predicate));
        let mut fields = Map::new();
        fields.insert("predicate".into(), reference.clone());
        w.finish(Some(reference), fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str, registry: &Registry) -> String {
        format!("{}({arg})", registry.reference_predicate(&self.predicate))
    }

    pub(crate) fn allows(&self, data: &Value) -> bool {
        self.predicate.call(data)
    }
}
