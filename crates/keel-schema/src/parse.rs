//! Parsing of schema literals into nodes.
//!
//! Parsing is kind-directed: [`parse_kind`] reads a [`Def`] as exactly one
//! kind, while [`parse_root`] infers the kind from the literal's shape.
//! Every shape accepted here is also what [`Node::json`] produces, so a
//! node's JSON always parses back to an equal node.

use crate::bases::{DomainInner, ProtoInner, UnitInner};
use crate::errors::{SchemaError, SchemaResult};
use crate::json::decode_literal_str;
use crate::kind::NodeKind;
use crate::node::{Inner, Meta, Node};
use crate::refinements::{
    BoundAxis, BoundInner, DivisorInner, PatternInner, Predicate, PredicateInner, PropInner,
    applicability_error, implied_axis,
};
use crate::registry::Registered;
use crate::schema::Def;
use crate::sets::{self, Morph};
use crate::space::Space;
use crate::value::{Domain, PropKey, Proto, Value};
use indexmap::IndexMap;

type Entries = IndexMap<String, Def>;

const META_KEYS: [&str; 2] = ["description", "alias"];

// =============================================================================
// Entry points
// =============================================================================

/// Parse a root schema, inferring its kind.
pub(crate) fn parse_root(space: &Space, def: Def) -> SchemaResult<Node> {
    let (is_union, is_morph) = match &def {
        Def::Map(map) => (map.contains_key("branches"), map.contains_key("morph")),
        Def::List(_) => (true, false),
        _ => (false, false),
    };
    if is_union {
        return parse_union(space, def);
    }
    if is_morph {
        return parse_morph(space, def);
    }
    match def {
        Def::Node(node) => Ok(space.adopt(&node)),
        Def::Map(_) => parse_intersection(space, def),
        Def::Str(s) => parse_root_str(space, &s),
        Def::Proto(proto) => Ok(proto_node(space, proto, Meta::default())),
        Def::Value(value) => Ok(unit_node(space, value, Meta::default())),
        Def::Symbol(symbol) => Ok(unit_node(space, Value::Symbol(symbol), Meta::default())),
        Def::Predicate(predicate) => {
            let predicate = space.intern(
                Inner::Predicate(PredicateInner { predicate }),
                Meta::default(),
            );
            sets::from_schema(space, None, vec![predicate], Meta::default())
        }
        other => Err(SchemaError::parse(format!(
            "{} is not a valid root schema",
            other.shape()
        ))),
    }
}

/// Parse `def` as a node of `kind`. Intersections may collapse to their
/// basis.
pub(crate) fn parse_kind(space: &Space, kind: NodeKind, def: Def) -> SchemaResult<Node> {
    if let Def::Node(node) = &def {
        if node.kind() != kind {
            return Err(SchemaError::parse(format!(
                "Expected a {kind} node (was {})",
                node.kind()
            )));
        }
        return Ok(space.adopt(node));
    }
    match kind {
        NodeKind::Union => parse_union(space, def),
        NodeKind::Morph => parse_morph(space, def),
        NodeKind::Intersection => parse_intersection(space, def),
        NodeKind::Unit => parse_unit(space, def),
        NodeKind::Proto => parse_proto(space, def),
        NodeKind::Domain => parse_domain(space, def),
        refinement => parse_refinement(space, refinement, def, BoundAxis::Value),
    }
}

/// Parse a refinement of `kind` against the basis of `node`.
pub(crate) fn parse_refinement_for(node: &Node, kind: NodeKind, def: Def) -> SchemaResult<Node> {
    if !kind.is_refinement() {
        return Err(SchemaError::parse(format!("{kind} is not a refinement")));
    }
    let basis = basis_of(node);
    let refinement = parse_refinement(node.space(), kind, def, implied_axis(basis))?;
    if let Some(message) = applicability_error(&refinement, basis) {
        return Err(SchemaError::parse(message));
    }
    Ok(refinement)
}

fn basis_of(node: &Node) -> Option<&Node> {
    match node.inner() {
        Inner::Intersection(i) => i.basis.as_ref(),
        Inner::Morph(m) => basis_of(&m.input),
        _ if node.is_basis() => Some(node),
        _ => None,
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn check_keys(kind: NodeKind, map: &Entries, allowed: &[&str]) -> SchemaResult<()> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) && !META_KEYS.contains(&key.as_str()) {
            return Err(SchemaError::parse(format!(
                "Key {key} is not valid on {kind} schema"
            )));
        }
    }
    Ok(())
}

fn take_meta(map: &mut Entries) -> SchemaResult<Meta> {
    let mut meta = Meta::default();
    for key in META_KEYS {
        match map.shift_remove(key) {
            None => {}
            Some(Def::Str(s)) => {
                if key == "description" {
                    meta.description = Some(s);
                } else {
                    meta.alias = Some(s);
                }
            }
            Some(other) => {
                return Err(SchemaError::parse(format!(
                    "{key} must be a string (was {})",
                    other.shape()
                )));
            }
        }
    }
    Ok(meta)
}

/// Split a map literal into its entries and meta, rejecting unknown keys.
fn entries(kind: NodeKind, def: Def, allowed: &[&str]) -> SchemaResult<(Entries, Meta)> {
    let Def::Map(mut map) = def else {
        return Err(SchemaError::parse(format!(
            "{} is not a valid {kind} schema",
            def.shape()
        )));
    };
    check_keys(kind, &map, allowed)?;
    let meta = take_meta(&mut map)?;
    Ok((map, meta))
}

fn required_entry(kind: NodeKind, map: &mut Entries, key: &str) -> SchemaResult<Def> {
    map.shift_remove(key)
        .ok_or_else(|| SchemaError::parse(format!("{kind} schema requires key {key}")))
}

fn number(kind: NodeKind, key: &str, def: &Def) -> SchemaResult<f64> {
    match def {
        Def::Number(n) if !n.is_nan() => Ok(*n),
        Def::Value(Value::Number(n)) if !n.is_nan() => Ok(*n),
        other => Err(SchemaError::parse(format!(
            "{kind} {key} must be a number (was {})",
            other.shape()
        ))),
    }
}

fn unit_node(space: &Space, unit: Value, meta: Meta) -> Node {
    space.intern(Inner::Unit(UnitInner { unit }), meta)
}

fn proto_node(space: &Space, proto: Proto, meta: Meta) -> Node {
    space.intern(Inner::Proto(ProtoInner { proto }), meta)
}

fn builtin_proto(name: &str) -> Option<Proto> {
    Some(match name {
        "Object" => Proto::object(),
        "Array" => Proto::array(),
        "Date" => Proto::date(),
        "Function" => Proto::function(),
        "RegExp" => Proto::regexp(),
        "Error" => Proto::error(),
        _ => return None,
    })
}

// =============================================================================
// Bases
// =============================================================================

fn parse_root_str(space: &Space, s: &str) -> SchemaResult<Node> {
    match s {
        "boolean" => {
            let branches = vec![
                unit_node(space, Value::Boolean(true), Meta::default()),
                unit_node(space, Value::Boolean(false), Meta::default()),
            ];
            sets::assemble_union(space, branches, false, Meta::default())
        }
        "null" => Ok(unit_node(space, Value::Null, Meta::default())),
        "undefined" => Ok(unit_node(space, Value::Undefined, Meta::default())),
        _ if space.registry().is_reference(s) => match space.registry().resolve(s) {
            Some(Registered::Proto(proto)) => Ok(proto_node(space, proto, Meta::default())),
            Some(Registered::Value(value)) => Ok(unit_node(space, value, Meta::default())),
            _ => parse_proto(space, Def::Str(s.to_string())),
        },
        _ => parse_domain(space, Def::Str(s.to_string())),
    }
}

fn domain_of(s: &str) -> SchemaResult<Domain> {
    Domain::from_name(s).ok_or_else(|| SchemaError::parse(format!("{s} is not a valid domain")))
}

fn parse_domain(space: &Space, def: Def) -> SchemaResult<Node> {
    let (domain, meta) = match def {
        Def::Str(s) => (domain_of(&s)?, Meta::default()),
        def => {
            let (mut map, meta) = entries(NodeKind::Domain, def, &["domain"])?;
            match required_entry(NodeKind::Domain, &mut map, "domain")? {
                Def::Str(s) => (domain_of(&s)?, meta),
                other => {
                    return Err(SchemaError::parse(format!(
                        "domain must be a string (was {})",
                        other.shape()
                    )));
                }
            }
        }
    };
    Ok(space.intern(Inner::Domain(DomainInner { domain }), meta))
}

/// Decode a unit literal written in its serialized encoding.
fn literal(space: &Space, def: Def) -> SchemaResult<Value> {
    match def {
        Def::Null => Ok(Value::Null),
        Def::Bool(b) => Ok(Value::Boolean(b)),
        Def::Number(n) => Ok(Value::Number(n)),
        Def::Value(value) => Ok(value),
        Def::Symbol(symbol) => Ok(Value::Symbol(symbol)),
        Def::Str(s) => decode_literal_str(&s, space.registry())
            .ok_or_else(|| SchemaError::parse(format!("{s} is not a registered value"))),
        other => Err(SchemaError::parse(format!(
            "{} is not a valid unit value",
            other.shape()
        ))),
    }
}

fn parse_unit(space: &Space, def: Def) -> SchemaResult<Node> {
    match def {
        Def::Value(value) => Ok(unit_node(space, value, Meta::default())),
        def => {
            let (mut map, meta) = entries(NodeKind::Unit, def, &["unit"])?;
            let value = literal(space, required_entry(NodeKind::Unit, &mut map, "unit")?)?;
            Ok(unit_node(space, value, meta))
        }
    }
}

fn resolve_proto(space: &Space, s: &str) -> SchemaResult<Proto> {
    let registry = space.registry();
    if let Some(Registered::Proto(proto)) = registry.resolve(s) {
        return Ok(proto);
    }
    let name = if registry.is_reference(s) {
        &s[registry.prefix().len() + 1..]
    } else {
        s
    };
    builtin_proto(name).ok_or_else(|| SchemaError::parse(format!("{s} is not a known constructor")))
}

fn parse_proto(space: &Space, def: Def) -> SchemaResult<Node> {
    let (proto, meta) = match def {
        Def::Proto(proto) => (proto, Meta::default()),
        Def::Str(s) => (resolve_proto(space, &s)?, Meta::default()),
        def => {
            let (mut map, meta) = entries(NodeKind::Proto, def, &["proto"])?;
            let proto = match required_entry(NodeKind::Proto, &mut map, "proto")? {
                Def::Proto(proto) => proto,
                Def::Str(s) => resolve_proto(space, &s)?,
                other => {
                    return Err(SchemaError::parse(format!(
                        "proto must be a constructor (was {})",
                        other.shape()
                    )));
                }
            };
            (proto, meta)
        }
    };
    Ok(proto_node(space, proto, meta))
}

/// A basis written under an intersection's `basis` key.
fn parse_basis(space: &Space, def: Def) -> SchemaResult<Node> {
    let node = parse_root(space, def)?;
    if !node.is_basis() {
        return Err(SchemaError::parse(format!(
            "{} is not a valid basis",
            node.kind()
        )));
    }
    Ok(node)
}

// =============================================================================
// Refinements
// =============================================================================

fn parse_refinement(space: &Space, kind: NodeKind, def: Def, axis: BoundAxis) -> SchemaResult<Node> {
    let (inner, meta) = match kind {
        NodeKind::Divisor => {
            let (n, meta) = match def {
                Def::Number(n) => (n, Meta::default()),
                def => {
                    let (mut map, meta) = entries(kind, def, &["divisor"])?;
                    (number(kind, "divisor", &required_entry(kind, &mut map, "divisor")?)?, meta)
                }
            };
            if n < 1.0 || n.fract() != 0.0 || n > u64::MAX as f64 {
                return Err(SchemaError::parse(format!(
                    "Divisor must be a positive integer (was {})",
                    crate::value::format_number(n)
                )));
            }
            (Inner::Divisor(DivisorInner { divisor: n as u64 }), meta)
        }
        NodeKind::Min | NodeKind::Max => {
            let (bound, meta) = parse_bound(kind, def, axis)?;
            let inner = if kind == NodeKind::Min {
                Inner::Min(bound)
            } else {
                Inner::Max(bound)
            };
            (inner, meta)
        }
        NodeKind::Pattern => {
            let (source, flags, meta) = match def {
                Def::Str(source) => (source, String::new(), Meta::default()),
                def => {
                    let (mut map, meta) = entries(kind, def, &["pattern", "flags"])?;
                    let source = match required_entry(kind, &mut map, "pattern")? {
                        Def::Str(s) => s,
                        other => {
                            return Err(SchemaError::parse(format!(
                                "pattern must be a string (was {})",
                                other.shape()
                            )));
                        }
                    };
                    let flags = match map.shift_remove("flags") {
                        None => String::new(),
                        Some(Def::Str(s)) => s,
                        Some(other) => {
                            return Err(SchemaError::parse(format!(
                                "flags must be a string (was {})",
                                other.shape()
                            )));
                        }
                    };
                    (source, flags, meta)
                }
            };
            (Inner::Pattern(PatternInner::new(&source, &flags)?), meta)
        }
        NodeKind::Predicate => {
            let (predicate, meta) = match def {
                Def::Predicate(p) => (p, Meta::default()),
                Def::Str(s) => (resolve_predicate(space, &s)?, Meta::default()),
                def => {
                    let (mut map, meta) = entries(kind, def, &["predicate"])?;
                    let predicate = match required_entry(kind, &mut map, "predicate")? {
                        Def::Predicate(p) => p,
                        Def::Str(s) => resolve_predicate(space, &s)?,
                        other => {
                            return Err(SchemaError::parse(format!(
                                "predicate must be a function (was {})",
                                other.shape()
                            )));
                        }
                    };
                    (predicate, meta)
                }
            };
            (Inner::Predicate(PredicateInner { predicate }), meta)
        }
        NodeKind::Required | NodeKind::Optional => {
            let (mut map, meta) = entries(kind, def, &["key", "value"])?;
            let key = prop_key(space, required_entry(kind, &mut map, "key")?)?;
            let value = parse_root(space, required_entry(kind, &mut map, "value")?)?;
            let prop = PropInner { key, value };
            let inner = if kind == NodeKind::Required {
                Inner::Required(prop)
            } else {
                Inner::Optional(prop)
            };
            (inner, meta)
        }
        other => {
            return Err(SchemaError::internal(format!(
                "{other} is not a refinement kind"
            )));
        }
    };
    Ok(space.intern(inner, meta))
}

fn parse_bound(kind: NodeKind, def: Def, implied: BoundAxis) -> SchemaResult<(BoundInner, Meta)> {
    if let Def::Number(limit) = def {
        if limit.is_nan() {
            return Err(SchemaError::parse(format!("{kind} limit must not be NaN")));
        }
        let bound = BoundInner {
            limit,
            exclusive: false,
            axis: implied,
        };
        return Ok((bound, Meta::default()));
    }
    let (mut map, meta) = entries(kind, def, &["limit", "exclusive", "axis"])?;
    let limit = number(kind, "limit", &required_entry(kind, &mut map, "limit")?)?;
    let exclusive = match map.shift_remove("exclusive") {
        None => false,
        Some(Def::Bool(b)) => b,
        Some(other) => {
            return Err(SchemaError::parse(format!(
                "exclusive must be a boolean (was {})",
                other.shape()
            )));
        }
    };
    let axis = match map.shift_remove("axis") {
        None => implied,
        Some(Def::Str(name)) => BoundAxis::from_name(&name)
            .ok_or_else(|| SchemaError::parse(format!("{name} is not a valid bound axis")))?,
        Some(other) => {
            return Err(SchemaError::parse(format!(
                "axis must be a string (was {})",
                other.shape()
            )));
        }
    };
    Ok((
        BoundInner {
            limit,
            exclusive,
            axis,
        },
        meta,
    ))
}

fn resolve_predicate(space: &Space, s: &str) -> SchemaResult<Predicate> {
    match space.registry().resolve(s) {
        Some(Registered::Predicate(p)) => Ok(p),
        _ => Err(SchemaError::parse(format!("{s} is not a registered predicate"))),
    }
}

fn prop_key(space: &Space, def: Def) -> SchemaResult<PropKey> {
    match def {
        Def::Symbol(symbol) => Ok(PropKey::Symbol(symbol)),
        Def::Value(Value::Symbol(symbol)) => Ok(PropKey::Symbol(symbol)),
        Def::Str(s) => Ok(PropKey::from(s)),
        Def::Map(map) => {
            let reference = match (map.len(), map.get("symbol")) {
                (1, Some(Def::Str(reference))) => reference,
                _ => {
                    return Err(SchemaError::parse(
                        "A property key map must be {symbol: <reference>}",
                    ));
                }
            };
            match space.registry().resolve_value(reference) {
                Some(Value::Symbol(symbol)) => Ok(PropKey::Symbol(symbol)),
                _ => Err(SchemaError::parse(format!(
                    "{reference} is not a registered symbol"
                ))),
            }
        }
        other => Err(SchemaError::parse(format!(
            "Property key must be a string or symbol (was {})",
            other.shape()
        ))),
    }
}

// =============================================================================
// Sets
// =============================================================================

const BASIS_KEYS: [&str; 4] = ["basis", "domain", "unit", "proto"];

fn parse_intersection(space: &Space, def: Def) -> SchemaResult<Node> {
    let def = match def {
        Def::Map(_) => def,
        Def::Str(s) => return parse_root_str(space, &s),
        Def::Proto(proto) => return Ok(proto_node(space, proto, Meta::default())),
        other => {
            return Err(SchemaError::parse(format!(
                "{} is not a valid intersection schema",
                other.shape()
            )));
        }
    };
    let allowed: Vec<&str> = BASIS_KEYS
        .iter()
        .copied()
        .chain(NodeKind::REFINEMENTS.iter().map(|k| k.name()))
        .collect();
    let (mut map, meta) = entries(NodeKind::Intersection, def, &allowed)?;

    let mut basis: Option<Node> = None;
    for key in BASIS_KEYS {
        let Some(def) = map.shift_remove(key) else {
            continue;
        };
        if basis.is_some() {
            return Err(SchemaError::parse(
                "An intersection may have at most one basis",
            ));
        }
        basis = Some(match key {
            "domain" => parse_domain(space, def)?,
            "unit" => unit_node(space, literal(space, def)?, Meta::default()),
            "proto" => parse_proto(space, def)?,
            _ => parse_basis(space, def)?,
        });
    }

    let axis = implied_axis(basis.as_ref());
    let mut refinements = Vec::new();
    for kind in NodeKind::REFINEMENTS {
        let Some(def) = map.shift_remove(kind.name()) else {
            continue;
        };
        match def {
            Def::List(items) if kind.is_repeatable() => {
                for item in items {
                    refinements.push(parse_refinement(space, kind, item, axis)?);
                }
            }
            def => refinements.push(parse_refinement(space, kind, def, axis)?),
        }
    }
    sets::from_schema(space, basis, refinements, meta)
}

fn parse_union(space: &Space, def: Def) -> SchemaResult<Node> {
    let (items, ordered, meta) = match def {
        Def::List(items) => (items, false, Meta::default()),
        def => {
            let (mut map, meta) = entries(NodeKind::Union, def, &["branches", "ordered"])?;
            let items = match required_entry(NodeKind::Union, &mut map, "branches")? {
                Def::List(items) => items,
                other => {
                    return Err(SchemaError::parse(format!(
                        "branches must be a list (was {})",
                        other.shape()
                    )));
                }
            };
            let ordered = match map.shift_remove("ordered") {
                None => false,
                Some(Def::Bool(b)) => b,
                Some(other) => {
                    return Err(SchemaError::parse(format!(
                        "ordered must be a boolean (was {})",
                        other.shape()
                    )));
                }
            };
            (items, ordered, meta)
        }
    };
    let branches = items
        .into_iter()
        .map(|item| parse_root(space, item))
        .collect::<SchemaResult<Vec<_>>>()?;
    sets::assemble_union(space, branches, ordered, meta)
}

fn parse_morph(space: &Space, def: Def) -> SchemaResult<Node> {
    let (mut map, meta) = entries(NodeKind::Morph, def, &["in", "out", "morph"])?;
    let input = match map.shift_remove("in") {
        Some(def) => parse_root(space, def)?,
        None => space.unknown(),
    };
    let output = map
        .shift_remove("out")
        .map(|def| parse_root(space, def))
        .transpose()?;
    let morphs = match required_entry(NodeKind::Morph, &mut map, "morph")? {
        Def::List(items) => items
            .into_iter()
            .map(|item| morph(space, item))
            .collect::<SchemaResult<Vec<_>>>()?,
        def => vec![morph(space, def)?],
    };
    sets::create_morph(space, input, output, morphs, meta)
}

fn morph(space: &Space, def: Def) -> SchemaResult<Morph> {
    match def {
        Def::Morph(m) => Ok(m),
        Def::Str(s) => match space.registry().resolve(&s) {
            Some(Registered::Morph(m)) => Ok(m),
            _ => Err(SchemaError::parse(format!("{s} is not a registered morph"))),
        },
        other => Err(SchemaError::parse(format!(
            "morph must be a function (was {})",
            other.shape()
        ))),
    }
}
