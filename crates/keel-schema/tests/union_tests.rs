use super::*;
use serde_json::json;

fn parse(json: serde_json::Value) -> Node {
    schema(json).expect("valid schema")
}

#[test]
fn test_union_is_order_independent() {
    let a = parse(json!(["string", "number"]));
    let b = parse(json!(["number", "string"]));
    assert_eq!(a.type_id(), b.type_id());
    assert_eq!(a.json(), &json!(["number", "string"]));
    assert_eq!(a.description(), "a number or a string");
}

#[test]
fn test_ordered_union_keeps_order_in_identity() {
    let ordered = parse(json!({"branches": ["string", "number"], "ordered": true}));
    let reversed = parse(json!({"branches": ["number", "string"], "ordered": true}));
    let unordered = parse(json!(["string", "number"]));
    assert_ne!(ordered, reversed);
    assert_ne!(ordered, unordered);
    assert_eq!(
        ordered.json(),
        &json!({"branches": ["string", "number"], "ordered": true})
    );
}

#[test]
fn test_single_branch_collapses() {
    let n = parse(json!(["string", "string"]));
    assert_eq!(n.kind(), NodeKind::Domain);
    assert_eq!(n, parse(json!("string")));
}

#[test]
fn test_subtype_branches_are_reduced() {
    let n = parse(json!(["number", {"basis": "number", "divisor": 2}, {"unit": 5}]));
    assert_eq!(n, parse(json!("number")));

    let with_unknown = parse(json!(["number", {}, {"unit": 5}]));
    assert!(with_unknown.is_unknown());
    assert_eq!(with_unknown.json(), &json!({}));
}

#[test]
fn test_exhaustive_union_is_unknown() {
    let n = parse(json!([
        "string", "number", "bigint", "object", "symbol", "boolean", "null", "undefined"
    ]));
    assert!(n.is_unknown());
    assert!(n.allows(&Value::Undefined));
}

#[test]
fn test_boolean_expands_to_units() {
    let boolean = parse(json!("boolean"));
    assert_eq!(boolean.kind(), NodeKind::Union);
    assert_eq!(boolean.children().len(), 2);
    assert!(boolean.allows(&Value::from(true)));
    assert!(!boolean.allows(&Value::from(1)));
}

#[test]
fn test_union_distributes_over_intersection() {
    let l = parse(json!([
        {"basis": "number", "divisor": 2},
        {"basis": "number", "divisor": 3}
    ]));
    let r = parse(json!({"basis": "number", "divisor": 5}));
    let result = l.and(&r).unwrap();
    assert_eq!(
        result.json(),
        &json!([
            {"basis": "number", "divisor": 10},
            {"basis": "number", "divisor": 15}
        ])
    );
    assert_eq!(r.and(&l).unwrap(), result);
}

#[test]
fn test_union_intersection_keeps_subtypes() {
    let l = parse(json!(["string", "number"]));
    let r = parse(json!([{"basis": "number", "divisor": 2}, "boolean"]));
    assert_eq!(
        l.and(&r).unwrap(),
        parse(json!({"basis": "number", "divisor": 2}))
    );
}

#[test]
fn test_never_against_non_never_is_presence_disjoint() {
    let never = parse(json!([]));
    assert!(never.is_never());
    assert_eq!(never.description(), "never");

    let string = parse(json!("string"));
    let Intersected::Disjoint(d) = never.intersect(&string).unwrap() else {
        panic!("expected a disjoint");
    };
    assert_eq!(d.kind(), DisjointKind::Presence);
    assert_eq!(never.intersect(&never).unwrap(), Intersected::Node(never.clone()));
}

#[test]
fn test_empty_branch_intersection_is_union_disjoint() {
    let l = parse(json!(["string", "number"]));
    let r = parse(json!({"unit": true}));
    let Intersected::Disjoint(d) = l.intersect(&r).unwrap() else {
        panic!("expected a disjoint");
    };
    assert_eq!(d.kind(), DisjointKind::Union);
    assert_eq!(d.l(), &l);

    let Intersected::Disjoint(inverted) = r.intersect(&l).unwrap() else {
        panic!("expected a disjoint");
    };
    assert_eq!(inverted.l(), &r);
}

#[test]
fn test_or_builds_unions() {
    let string = parse(json!("string"));
    let number = parse(json!("number"));
    assert_eq!(string.or(&number).unwrap(), parse(json!(["string", "number"])));
    assert_eq!(string.or(&string).unwrap(), string);
}

#[test]
fn test_domain_discriminant() {
    let n = parse(json!(["string", "number", {"unit": null}]));
    let d = n.discriminant().expect("discriminated union");
    assert_eq!(d.kind, DiscriminantKind::Domain);
    assert_eq!(d.cases.len(), 3);
    assert!(d.path.is_empty());
    assert!(n.allows(&Value::Null));
    assert!(n.allows(&Value::from("a")));
    assert!(!n.allows(&Value::from(true)));
    assert!(d.candidates(&Value::from(true)).is_empty());
}

#[test]
fn test_literal_discriminant_condition() {
    let n = parse(json!([{"unit": "a"}, {"unit": "b"}]));
    let d = n.discriminant().expect("discriminated union");
    assert_eq!(d.kind, DiscriminantKind::Value);
    assert_eq!(
        n.condition(),
        "data === \"a\" ? ((data === \"a\")) : data === \"b\" ? ((data === \"b\")) : false"
    );
}

#[test]
fn test_property_discriminant() {
    let n = parse(json!([
        {
            "basis": "object",
            "required": [
                {"key": "kind", "value": {"unit": "circle"}},
                {"key": "radius", "value": "number"}
            ]
        },
        {
            "basis": "object",
            "required": [
                {"key": "kind", "value": {"unit": "square"}},
                {"key": "size", "value": "number"}
            ]
        }
    ]));
    let d = n.discriminant().expect("discriminated union");
    assert_eq!(d.path, vec![PropKey::from("kind")]);
    assert_eq!(d.cases.len(), 2);

    let circle = Value::object([("kind", Value::from("circle")), ("radius", Value::from(1))]);
    let square = Value::object([("kind", Value::from("square")), ("radius", Value::from(1))]);
    assert!(n.allows(&circle));
    assert!(!n.allows(&square));
    assert_eq!(d.candidates(&square).len(), 1);
}

#[test]
fn test_discrimination_can_be_disabled() {
    let space = Space::with_config(SpaceConfig {
        discriminate_unions: false,
        ..SpaceConfig::default()
    });
    let n = space.schema(json!(["string", "number"])).unwrap();
    assert!(n.discriminant().is_none());
    assert_eq!(n.condition(), "(typeof data === \"number\") || (typeof data === \"string\")");
}

#[test]
fn test_reduction_limit_skips_subtype_checks() {
    let space = Space::with_config(SpaceConfig {
        max_reducible_branches: 1,
        ..SpaceConfig::default()
    });
    let n = space
        .schema(json!(["number", {"basis": "number", "divisor": 2}]))
        .unwrap();
    assert_eq!(n.kind(), NodeKind::Union);
    assert_eq!(n.children().len(), 2);
}

#[test]
fn test_branch_subsumed_by_consumed_column_is_dropped() {
    let space = Space::with_config(SpaceConfig {
        max_reducible_branches: 1,
        ..SpaceConfig::default()
    });
    let l = space
        .schema(json!({
            "branches": [{"basis": "number", "divisor": 4}, "number"],
            "ordered": true
        }))
        .unwrap();
    let r = space
        .schema(json!(["string", {"basis": "number", "divisor": 2}]))
        .unwrap();
    assert_eq!(l.children().len(), 2);
    let even = space
        .schema(json!({"basis": "number", "divisor": 2}))
        .unwrap();
    assert_eq!(l.and(&r).unwrap(), even);
}

#[test]
fn test_never_is_the_empty_union() {
    let never = Space::global().never();
    assert!(never.is_never());
    assert_eq!(never, parse(json!([])));
}

#[test]
fn test_non_branch_kinds_are_rejected() {
    let divisor = node(NodeKind::Divisor, 2).unwrap();
    let err = Space::global().union([divisor]).unwrap_err();
    assert!(err.is_parse());
}
