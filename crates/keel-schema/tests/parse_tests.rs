use super::*;
use serde_json::json;

fn parse_err(json: serde_json::Value) -> SchemaError {
    schema(json).expect_err("schema should be rejected")
}

#[test]
fn test_unknown_keys_are_rejected() {
    let err = parse_err(json!({"basis": "string", "foo": 1}));
    assert!(err.is_parse());
    assert_eq!(err.to_string(), "Key foo is not valid on intersection schema");

    let err = node(NodeKind::Divisor, json!({"divisor": 2, "limit": 3})).unwrap_err();
    assert_eq!(err.to_string(), "Key limit is not valid on divisor schema");
}

#[test]
fn test_refinement_requires_compatible_basis() {
    let err = parse_err(json!({"basis": "string", "divisor": 3}));
    assert_eq!(err.to_string(), "Divisibility operand a string must be a number");

    let err = parse_err(json!({"basis": "number", "pattern": "^a"}));
    assert_eq!(err.to_string(), "Match operand a number must be a string");

    let err = parse_err(json!({"divisor": 3}));
    assert_eq!(err.to_string(), "Divisibility operand a value must be a number");

    let err = parse_err(json!({"basis": "string", "required": [{"key": "a", "value": "string"}]}));
    assert!(err.is_parse());
}

#[test]
fn test_bounds_follow_basis_axis() {
    let date = schema(json!({"proto": "$ark.Date", "min": 0})).unwrap();
    let Inner::Intersection(i) = date.inner() else {
        panic!("expected an intersection");
    };
    let Inner::Min(bound) = i.constraints[0].inner() else {
        panic!("expected a min bound");
    };
    assert_eq!(bound.axis, BoundAxis::Time);
    assert!(date.allows(&Value::from(Object::date(10.0))));
    assert!(!date.allows(&Value::from(Object::date(-10.0))));

    let err = parse_err(json!({"basis": "object", "min": 1}));
    assert_eq!(err.to_string(), "Bound operand an object must be a number");
}

#[test]
fn test_conflicting_schema_rules_are_parse_errors() {
    let err = parse_err(json!({"basis": "number", "min": 5, "max": 1}));
    assert!(err.is_parse());
    assert!(err.to_string().contains("unsatisfiable"));

    let err = parse_err(json!({"unit": 5, "divisor": 2}));
    assert!(err.is_parse());
}

#[test]
fn test_at_most_one_basis() {
    let err = parse_err(json!({"domain": "string", "unit": "a"}));
    assert_eq!(err.to_string(), "An intersection may have at most one basis");
}

#[test]
fn test_invalid_values() {
    assert!(parse_err(json!("strung")).is_parse());
    assert!(parse_err(json!({"basis": "number", "divisor": 0})).is_parse());
    assert!(parse_err(json!({"basis": "number", "divisor": 1.5})).is_parse());
    assert!(parse_err(json!({"basis": "string", "pattern": "("})).is_parse());
    assert!(parse_err(json!({"basis": "string", "pattern": {"pattern": "a", "flags": "q"}})).is_parse());
    assert!(parse_err(json!({"basis": "number", "min": {"limit": 1, "axis": "width"}})).is_parse());
    assert!(parse_err(json!({"basis": "number", "description": 3})).is_parse());
    assert!(parse_err(json!(5)).is_parse());
    assert!(parse_err(json!({"proto": "Widget"})).is_parse());
}

#[test]
fn test_root_shorthands() {
    assert_eq!(schema("null").unwrap().kind(), NodeKind::Unit);
    assert_eq!(schema("undefined").unwrap().kind(), NodeKind::Unit);
    assert!(schema("null").unwrap().allows(&Value::Null));
    assert_eq!(schema("object").unwrap().kind(), NodeKind::Domain);
    assert_eq!(schema(Proto::array()).unwrap().kind(), NodeKind::Proto);
    assert_eq!(schema(Value::from(3)).unwrap().kind(), NodeKind::Unit);
}

#[test]
fn test_kind_directed_parsing() {
    let domain = node(NodeKind::Domain, "string").unwrap();
    assert_eq!(domain.kind(), NodeKind::Domain);

    let unit = node(NodeKind::Unit, json!({"unit": "a", "description": "the letter a"})).unwrap();
    assert_eq!(unit.description(), "the letter a");

    let err = node(NodeKind::Unit, &domain).unwrap_err();
    assert_eq!(err.to_string(), "Expected a unit node (was domain)");

    let pattern = node(NodeKind::Pattern, json!({"pattern": "^\\d+$"})).unwrap();
    assert!(pattern.allows(&Value::from("123")));
    assert!(!pattern.allows(&Value::from("12a")));
    assert_eq!(pattern.description(), "matched by /^\\d+$/");
}

#[test]
fn test_pattern_flags() {
    let n = schema(json!({"basis": "string", "pattern": {"pattern": "^abc$", "flags": "i"}})).unwrap();
    assert!(n.allows(&Value::from("ABC")));
    assert_eq!(
        n.condition(),
        "(typeof data === \"string\") && (/^abc$/i.test(data))"
    );
}

#[test]
fn test_description_defaults() {
    assert_eq!(schema("string").unwrap().description(), "a string");
    assert_eq!(schema(json!({})).unwrap().description(), "a value");
    assert_eq!(schema(json!({"unit": "a"})).unwrap().description(), "\"a\"");
    assert_eq!(
        schema(json!({"basis": "string", "min": 2})).unwrap().description(),
        "a string and at least length 2"
    );
    assert_eq!(
        schema(json!({"basis": "object", "optional": [{"key": "a", "value": "number"}]}))
            .unwrap()
            .description(),
        "an object and a?: a number"
    );
}
