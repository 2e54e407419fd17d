//! Union discriminants.
//!
//! A discriminant is a probe that different branches of a union answer
//! differently, so validation can jump straight to the branches that could
//! match instead of trying each one:
//!
//! | Probe | Example union | Case key |
//! |-------|---------------|----------|
//! | root domain | `string \| number` | `typeof`-like domain name |
//! | root literal | `"a" \| "b" \| 5` | serialized literal |
//! | property literal | `{kind: "a", ..} \| {kind: "b", ..}` | serialized literal at `kind` |
//!
//! A probe is only adopted when it is total for the union: every branch must
//! answer it, so a value whose answer has no case is rejected outright.

use crate::bases::{DomainInner, UnitInner, basis_domain};
use crate::json::serializable_literal;
use crate::limits::{MAX_DISCRIMINANT_KEYS, MIN_DISCRIMINANT_CASES};
use crate::node::{Inner, Node};
use crate::registry::Registry;
use crate::refinements::prop_access;
use crate::value::{Domain, PropKey, Value};
use rustc_hash::FxHashMap;

/// What a case matches on.
#[derive(Clone, Debug)]
pub enum CaseKey {
    Domain(Domain),
    Value(Value),
}

impl CaseKey {
    fn serialize(&self) -> Option<String> {
        match self {
            CaseKey::Domain(d) => Some(d.name().to_string()),
            CaseKey::Value(v) => serializable_literal(v).map(|json| json.to_string()),
        }
    }

    fn condition(&self, expr: &str, registry: &Registry) -> String {
        match self {
            CaseKey::Domain(Domain::Boolean) => format!("typeof {expr} === \"boolean\""),
            CaseKey::Domain(Domain::Null) => format!("{expr} === null"),
            CaseKey::Domain(Domain::Undefined) => format!("{expr} === undefined"),
            CaseKey::Domain(domain) => DomainInner { domain: *domain }.condition(expr),
            CaseKey::Value(unit) => UnitInner { unit: unit.clone() }.condition(expr, registry),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DiscriminantCase {
    pub key: CaseKey,
    /// Indices of the branches that can match this case, in union order.
    pub branches: Vec<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscriminantKind {
    Domain,
    Value,
}

#[derive(Clone, Debug)]
pub struct Discriminant {
    pub kind: DiscriminantKind,
    /// Property path probed; empty for the root.
    pub path: Vec<PropKey>,
    pub cases: Vec<DiscriminantCase>,
    index: FxHashMap<String, usize>,
}

impl Discriminant {
    fn key_of(&self, data: &Value) -> Option<String> {
        let mut current = data.clone();
        for key in &self.path {
            current = current.get(key)?;
        }
        match self.kind {
            DiscriminantKind::Domain => CaseKey::Domain(current.domain()).serialize(),
            DiscriminantKind::Value => CaseKey::Value(current).serialize(),
        }
    }

    /// Branch indices that could accept `data`; empty if none can.
    pub fn candidates(&self, data: &Value) -> &[usize] {
        self.key_of(data)
            .and_then(|key| self.index.get(&key))
            .map_or(&[][..], |&i| self.cases[i].branches.as_slice())
    }

    /// Ternary dispatch over the cases, failing by default.
    pub(crate) fn condition(&self, branches: &[Node], arg: &str, registry: &Registry) -> String {
        let mut expr = arg.to_string();
        for key in &self.path {
            let access = prop_access("", key, registry);
            if access.starts_with('[') {
                expr = format!("{expr}?.{access}");
            } else {
                expr = format!("{expr}?{access}");
            }
        }
        let mut out = String::new();
        for case in &self.cases {
            let body: Vec<String> = case
                .branches
                .iter()
                .map(|&i| format!("({})", crate::compile::render(&branches[i], arg, registry)))
                .collect();
            out.push_str(&format!(
                "{} ? ({}) : ",
                case.key.condition(&expr, registry),
                body.join(" || ")
            ));
        }
        out.push_str("false");
        out
    }
}

/// The intersection-level node a branch validates before any morph.
fn validator_of(branch: &Node) -> &Node {
    match branch.inner() {
        Inner::Morph(m) => &m.input,
        _ => branch,
    }
}

fn branch_domain(branch: &Node) -> Option<Domain> {
    let node = validator_of(branch);
    match node.inner() {
        Inner::Intersection(i) => i.basis.as_ref().and_then(basis_domain),
        _ => basis_domain(node),
    }
}

fn branch_unit(branch: &Node) -> Option<Value> {
    match validator_of(branch).inner() {
        Inner::Unit(u) if u.unit.is_serializable() => Some(u.unit.clone()),
        _ => None,
    }
}

fn branch_prop_unit(branch: &Node, key: &PropKey) -> Option<Value> {
    let Inner::Intersection(i) = validator_of(branch).inner() else {
        return None;
    };
    i.constraints.iter().find_map(|c| match c.inner() {
        Inner::Required(p) if &p.key == key => branch_unit(&p.value),
        _ => None,
    })
}

fn required_keys(branch: &Node) -> Vec<PropKey> {
    match validator_of(branch).inner() {
        Inner::Intersection(i) => i
            .constraints
            .iter()
            .filter_map(|c| match c.inner() {
                Inner::Required(p) => Some(p.key.clone()),
                _ => None,
            })
            .take(MAX_DISCRIMINANT_KEYS)
            .collect(),
        _ => Vec::new(),
    }
}

fn build(kind: DiscriminantKind, path: Vec<PropKey>, keys: Vec<CaseKey>) -> Option<Discriminant> {
    let mut cases: Vec<DiscriminantCase> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    for (branch, key) in keys.into_iter().enumerate() {
        let serialized = key.serialize()?;
        match index.get(&serialized) {
            Some(&i) => cases[i].branches.push(branch),
            None => {
                index.insert(serialized, cases.len());
                cases.push(DiscriminantCase {
                    key,
                    branches: vec![branch],
                });
            }
        }
    }
    (cases.len() >= MIN_DISCRIMINANT_CASES).then_some(Discriminant {
        kind,
        path,
        cases,
        index,
    })
}

/// Find the probe that splits `branches` into the most cases.
pub(crate) fn discriminate(branches: &[Node]) -> Option<Discriminant> {
    if branches.len() < MIN_DISCRIMINANT_CASES {
        return None;
    }
    let mut candidates: Vec<Discriminant> = Vec::new();

    let domains: Option<Vec<CaseKey>> = branches
        .iter()
        .map(|b| branch_domain(b).map(CaseKey::Domain))
        .collect();
    if let Some(keys) = domains {
        candidates.extend(build(DiscriminantKind::Domain, Vec::new(), keys));
    }

    let units: Option<Vec<CaseKey>> = branches
        .iter()
        .map(|b| branch_unit(b).map(CaseKey::Value))
        .collect();
    if let Some(keys) = units {
        candidates.extend(build(DiscriminantKind::Value, Vec::new(), keys));
    }

    let all_objects = branches
        .iter()
        .all(|b| branch_domain(b) == Some(Domain::Object));
    if all_objects {
        for key in required_keys(&branches[0]) {
            let units: Option<Vec<CaseKey>> = branches
                .iter()
                .map(|b| branch_prop_unit(b, &key).map(CaseKey::Value))
                .collect();
            if let Some(keys) = units {
                candidates.extend(build(DiscriminantKind::Value, vec![key], keys));
            }
        }
    }

    let mut best: Option<Discriminant> = None;
    for candidate in candidates {
        if best
            .as_ref()
            .is_none_or(|b| candidate.cases.len() > b.cases.len())
        {
            best = Some(candidate);
        }
    }
    best
}
