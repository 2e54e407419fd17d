//! Reference registry for values that have no literal serialization.
//!
//! Protos, predicates, morphs, symbols and objects are compared by identity,
//! so ids, JSON and compiled conditions refer to them by a registered name
//! such as `$ark.Date` or `$ark.predicate1`. The registry assigns each
//! identity one stable name on first use and can resolve names back while
//! parsing.
//!
//! Registration is insert-if-absent under the identity's shard lock, so
//! concurrent callers observe a single name per identity.

use crate::refinements::Predicate;
use crate::sets::Morph;
use crate::value::{Proto, Value};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// A registered identity.
#[derive(Clone, Debug)]
pub enum Registered {
    Value(Value),
    Proto(Proto),
    Predicate(Predicate),
    Morph(Morph),
}

pub struct Registry {
    prefix: String,
    names_by_addr: DashMap<usize, Arc<str>>,
    entries: DashMap<Arc<str>, Registered>,
    uses_by_base: DashMap<String, u32>,
}

impl Registry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            names_by_addr: DashMap::new(),
            entries: DashMap::new(),
            uses_by_base: DashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name for `entry`, registering it on first use.
    pub fn register(&self, entry: Registered) -> Arc<str> {
        let (addr, base, numbered) = match &entry {
            Registered::Proto(p) => (p.addr(), p.name().to_string(), false),
            Registered::Predicate(p) => match p.name() {
                Some(name) => (p.addr(), name.to_string(), false),
                None => (p.addr(), "predicate".to_string(), true),
            },
            Registered::Morph(m) => match m.name() {
                Some(name) => (m.addr(), name.to_string(), false),
                None => (m.addr(), "morph".to_string(), true),
            },
            Registered::Value(Value::Symbol(s)) => (s.addr(), "symbol".to_string(), true),
            Registered::Value(Value::Object(o)) => (o.addr(), "object".to_string(), true),
            Registered::Value(_) => (0, "value".to_string(), true),
        };
        if addr == 0 {
            // serializable values have no identity, so each call gets a fresh name
            return self.allocate(&base, numbered, entry);
        }
        self.names_by_addr
            .entry(addr)
            .or_insert_with(|| self.allocate(&base, numbered, entry))
            .clone()
    }

    fn allocate(&self, base: &str, numbered: bool, entry: Registered) -> Arc<str> {
        let name: Arc<str> = loop {
            let uses = {
                let mut slot = self.uses_by_base.entry(base.to_string()).or_insert(0);
                *slot += 1;
                *slot
            };
            let candidate = if numbered || uses > 1 {
                format!("{base}{uses}")
            } else {
                base.to_string()
            };
            if !self.entries.contains_key(candidate.as_str()) {
                break Arc::from(candidate);
            }
        };
        debug!(name = %name, "registered reference");
        self.entries.insert(name.clone(), entry);
        name
    }

    /// Prefixed reference such as `$ark.Date`.
    pub fn reference(&self, name: &str) -> String {
        format!("{}.{name}", self.prefix)
    }

    pub fn reference_value(&self, value: &Value) -> String {
        let name = self.register(Registered::Value(value.clone()));
        self.reference(&name)
    }

    pub fn reference_proto(&self, proto: &Proto) -> String {
        let name = self.register(Registered::Proto(proto.clone()));
        self.reference(&name)
    }

    pub fn reference_predicate(&self, predicate: &Predicate) -> String {
        let name = self.register(Registered::Predicate(predicate.clone()));
        self.reference(&name)
    }

    pub fn reference_morph(&self, morph: &Morph) -> String {
        let name = self.register(Registered::Morph(morph.clone()));
        self.reference(&name)
    }

    pub fn is_reference(&self, s: &str) -> bool {
        s.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Resolve a prefixed reference.
    pub fn resolve(&self, reference: &str) -> Option<Registered> {
        let name = reference
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('.')?;
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    pub fn resolve_value(&self, reference: &str) -> Option<Value> {
        match self.resolve(reference)? {
            Registered::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("prefix", &self.prefix)
            .field("entries", &self.entries.len())
            .finish()
    }
}
