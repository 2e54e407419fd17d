//! Path-aware validation.
//!
//! [`Node::allows`](crate::Node::allows) answers yes or no; traversal also
//! explains why. One [`TraversalContext`] is created per
//! [`Node::apply`](crate::Node::apply) call and threaded through the node
//! tree. It owns:
//!
//! - the current path, pushed and popped around property values,
//! - the root [`Problems`] collector,
//! - a stack of scratch collectors, one per union branch being tried.
//!
//! Problems at the same path are merged into a single intersection
//! problem. A union only reports a composite problem when every candidate
//! branch failed; problems of a failed branch are discarded as soon as
//! another branch succeeds.

use crate::errors::{SchemaError, SchemaResult};
use crate::kind::NodeKind;
use crate::node::{Inner, Node};
use crate::sets::UnionInner;
use crate::value::{PropKey, Value};
use rustc_hash::FxHashMap;
use std::fmt;

// =============================================================================
// Problems
// =============================================================================

#[derive(Clone, Debug)]
pub enum ProblemCode {
    /// The value did not satisfy a node; `expected` is its description.
    Unsatisfied { expected: String },
    /// A required key was absent.
    Missing { key: PropKey },
    /// No branch of a union accepted the value.
    Union {
        expected: String,
        branches: Vec<Problems>,
    },
    /// Several problems at one path.
    Intersection { problems: Vec<Problem> },
    /// Reported by a morph.
    Custom { message: String },
}

#[derive(Clone, Debug)]
pub struct Problem {
    path: Vec<PropKey>,
    code: ProblemCode,
    data: Value,
}

impl Problem {
    pub fn new(path: Vec<PropKey>, code: ProblemCode, data: Value) -> Self {
        Self { path, code, data }
    }

    pub fn path(&self) -> &[PropKey] {
        &self.path
    }

    /// The path joined with `.`; empty at the root.
    pub fn path_string(&self) -> String {
        join_path(&self.path)
    }

    pub fn code(&self) -> &ProblemCode {
        &self.code
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// What the value should have been, e.g. `a multiple of 3`.
    fn expectation(&self) -> String {
        match &self.code {
            ProblemCode::Unsatisfied { expected } | ProblemCode::Union { expected, .. } => {
                expected.clone()
            }
            ProblemCode::Missing { .. } => "provided".to_string(),
            ProblemCode::Intersection { problems } => problems
                .iter()
                .map(Problem::expectation)
                .collect::<Vec<_>>()
                .join(" and "),
            ProblemCode::Custom { message } => message.clone(),
        }
    }
}

fn join_path(path: &[PropKey]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            ProblemCode::Missing { .. } => f.write_str("Must be provided"),
            ProblemCode::Custom { message } if self.path.is_empty() => f.write_str(message),
            ProblemCode::Custom { message } => write!(f, "{}: {message}", self.path_string()),
            _ if self.path.is_empty() => write!(f, "Must be {}", self.expectation()),
            _ => write!(f, "{} must be {}", self.path_string(), self.expectation()),
        }
    }
}

/// Problems found by one traversal, in the order they were found.
#[derive(Clone, Debug, Default, thiserror::Error)]
#[error("{}", self.summary())]
pub struct Problems {
    list: Vec<Problem>,
    by_path: FxHashMap<String, usize>,
    count: usize,
}

impl Problems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `problem`, merging it with an existing problem at the same path.
    pub fn add(&mut self, problem: Problem) {
        self.count += 1;
        let key = problem.path_string();
        let Some(&index) = self.by_path.get(&key) else {
            self.by_path.insert(key, self.list.len());
            self.list.push(problem);
            return;
        };
        let existing = &mut self.list[index];
        if let ProblemCode::Intersection { problems } = &mut existing.code {
            problems.push(problem);
            return;
        }
        let code = std::mem::replace(
            &mut existing.code,
            ProblemCode::Intersection { problems: Vec::new() },
        );
        let first = Problem::new(existing.path.clone(), code, existing.data.clone());
        existing.code = ProblemCode::Intersection {
            problems: vec![first, problem],
        };
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Number of problems added, including merged ones.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Problem> {
        self.list.iter()
    }

    /// The problem at `path`, joined with `.`.
    pub fn at(&self, path: &str) -> Option<&Problem> {
        self.by_path.get(path).map(|&i| &self.list[i])
    }

    /// Every message, one per line.
    pub fn summary(&self) -> String {
        self.list
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn throw<T>(self) -> SchemaResult<T> {
        Err(SchemaError::Validation(self.summary()))
    }
}

impl IntoIterator for Problems {
    type Item = Problem;
    type IntoIter = std::vec::IntoIter<Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl<'a> IntoIterator for &'a Problems {
    type Item = &'a Problem;
    type IntoIter = std::slice::Iter<'a, Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

// =============================================================================
// Context
// =============================================================================

/// Mutable state of one traversal.
#[derive(Debug, Default)]
pub struct TraversalContext {
    path: Vec<PropKey>,
    root: Problems,
    branches: Vec<Problems>,
}

impl TraversalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the value currently being traversed.
    pub fn path(&self) -> &[PropKey] {
        &self.path
    }

    fn current(&mut self) -> &mut Problems {
        self.branches.last_mut().unwrap_or(&mut self.root)
    }

    fn error_count(&self) -> usize {
        self.branches.last().unwrap_or(&self.root).count()
    }

    pub fn add(&mut self, code: ProblemCode, data: &Value) {
        let problem = Problem::new(self.path.clone(), code, data.clone());
        self.current().add(problem);
    }

    /// Report that `data` is not `expected` at the current path.
    pub fn reject(&mut self, expected: impl Into<String>, data: &Value) {
        self.add(
            ProblemCode::Unsatisfied {
                expected: expected.into(),
            },
            data,
        );
    }

    /// Report a free-form problem at the current path. Morphs use this to
    /// fail a traversal.
    pub fn custom(&mut self, message: impl Into<String>, data: &Value) {
        self.add(
            ProblemCode::Custom {
                message: message.into(),
            },
            data,
        );
    }

    pub fn has_problems(&self) -> bool {
        self.error_count() > 0
    }

    fn push_branch(&mut self) {
        self.branches.push(Problems::new());
    }

    fn pop_branch(&mut self) -> Problems {
        self.branches.pop().unwrap_or_default()
    }

    pub(crate) fn finish(self, out: Value) -> Result<Value, Problems> {
        if self.root.is_empty() {
            Ok(out)
        } else {
            Err(self.root)
        }
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// Validate `data` against `node`, returning the possibly transformed value.
pub(crate) fn traverse(node: &Node, data: Value, ctx: &mut TraversalContext) -> Value {
    if !node.includes_morph() && node.allows(&data) {
        return data;
    }
    match node.inner() {
        Inner::Union(u) => traverse_union(node, u, data, ctx),
        Inner::Morph(m) => {
            let before = ctx.error_count();
            let mut out = traverse(&m.input, data, ctx);
            if ctx.error_count() > before {
                return out;
            }
            for morph in &m.morphs {
                out = morph.call(out, ctx);
                if ctx.error_count() > before {
                    return out;
                }
            }
            match &m.output {
                Some(output) => traverse(output, out, ctx),
                None => out,
            }
        }
        Inner::Intersection(i) => {
            let mut data = data;
            if let Some(basis) = &i.basis {
                let before = ctx.error_count();
                data = traverse(basis, data, ctx);
                if ctx.error_count() > before {
                    return data;
                }
            }
            for constraint in &i.constraints {
                data = traverse(constraint, data, ctx);
            }
            data
        }
        Inner::Required(p) | Inner::Optional(p) => {
            let Some(value) = data.get(&p.key) else {
                if node.kind() == NodeKind::Required {
                    ctx.path.push(p.key.clone());
                    ctx.add(ProblemCode::Missing { key: p.key.clone() }, &data);
                    ctx.path.pop();
                }
                return data;
            };
            ctx.path.push(p.key.clone());
            let out = traverse(&p.value, value, ctx);
            ctx.path.pop();
            match data.as_object() {
                Some(object) if p.value.includes_morph() => {
                    Value::Object(object.with_prop(&p.key, out))
                }
                _ => data,
            }
        }
        _ => {
            if !node.allows(&data) {
                ctx.reject(node.description(), &data);
            }
            data
        }
    }
}

fn traverse_union(node: &Node, u: &UnionInner, data: Value, ctx: &mut TraversalContext) -> Value {
    let candidates: Vec<usize> = match node.discriminant() {
        Some(discriminant) => discriminant.candidates(&data).to_vec(),
        None => (0..u.branches.len()).collect(),
    };
    let mut failures: Vec<Problems> = Vec::with_capacity(candidates.len());
    for index in candidates {
        ctx.push_branch();
        let out = traverse(&u.branches[index], data.clone(), ctx);
        let problems = ctx.pop_branch();
        if problems.is_empty() {
            return out;
        }
        failures.push(problems);
    }
    match failures.len() {
        0 => ctx.reject(node.description(), &data),
        1 => {
            for problem in failures.into_iter().flatten() {
                ctx.current().add(problem);
            }
        }
        _ => ctx.add(
            ProblemCode::Union {
                expected: node.description().to_string(),
                branches: failures,
            },
            &data,
        ),
    }
    data
}
