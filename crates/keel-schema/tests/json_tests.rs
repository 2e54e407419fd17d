use super::*;
use serde_json::json;

fn parse(json: serde_json::Value) -> Node {
    schema(json).expect("valid schema")
}

fn assert_round_trips(n: &Node) {
    let reparsed = schema(n.json().clone()).expect("json parses back");
    assert_eq!(reparsed.id(), n.id(), "id changed for {}", n.json());
    assert_eq!(reparsed.type_id(), n.type_id());
}

#[test]
fn test_json_round_trips() {
    let nodes = [
        parse(json!("string")),
        parse(json!({"unit": "foo"})),
        parse(json!({"unit": 1.5})),
        parse(json!({"unit": "undefined"})),
        parse(json!({"basis": "string", "pattern": {"pattern": "^a", "flags": "i"}})),
        parse(json!({"basis": "number", "divisor": 4, "max": {"limit": 10, "exclusive": true}})),
        parse(json!({"basis": "string", "min": 1, "max": 8})),
        parse(json!({
            "basis": "object",
            "required": [{"key": "a", "value": ["string", "number"]}],
            "optional": [{"key": "b-c", "value": {"unit": true}}]
        })),
        parse(json!({"branches": ["string", {"unit": 0}], "ordered": true})),
        parse(json!({"domain": "string", "description": "a name"})),
        parse(json!({"proto": "$ark.Date", "min": 0})),
        parse(json!([])),
        parse(json!({})),
    ];
    for n in &nodes {
        assert_round_trips(n);
    }
}

#[test]
fn test_unit_literal_encoding() {
    assert_eq!(parse(json!({"unit": "foo"})).json(), &json!({"unit": "\"foo\""}));
    assert_eq!(parse(json!({"unit": "\"foo\""})).json(), &json!({"unit": "\"foo\""}));
    assert_eq!(parse(json!({"unit": null})).json(), &json!({"unit": null}));
    assert_eq!(
        schema(Value::BigInt(5)).unwrap().json(),
        &json!({"unit": "5n"})
    );
    assert_eq!(parse(json!("undefined")).json(), &json!({"unit": "undefined"}));
}

#[test]
fn test_type_id_ignores_meta() {
    let plain = parse(json!("string"));
    let described = parse(json!({"domain": "string", "description": "a name"}));
    assert_eq!(described.description(), "a name");
    assert_eq!(described, plain);
    assert_ne!(described.id(), plain.id());
    assert_eq!(described.type_json(), plain.json());
    assert_eq!(
        described.json(),
        &json!({"domain": "string", "description": "a name"})
    );
}

#[test]
fn test_with_description() {
    let n = parse(json!({"basis": "number", "divisor": 2}));
    let described = n.with_description("an even number");
    assert_eq!(described.description(), "an even number");
    assert!(described.equals(&n));
    assert_eq!(described.json()["description"], json!("an even number"));
}

#[test]
fn test_alias_is_kept_in_json() {
    let n = parse(json!({"basis": "number", "divisor": 2, "alias": "even"}));
    assert_eq!(n.alias(), "even");
    assert_eq!(n.json()["alias"], json!("even"));
}

#[test]
fn test_bound_json_outside_intersection() {
    let length = node(NodeKind::Min, json!({"limit": 3, "axis": "length"})).unwrap();
    assert_eq!(length.json(), &json!({"limit": 3, "axis": "length"}));
    let value = node(NodeKind::Max, 3).unwrap();
    assert_eq!(value.json(), &json!(3));
}

#[test]
fn test_serialize_matches_json() {
    let n = parse(json!({"basis": "number", "divisor": 2}));
    assert_eq!(serde_json::to_value(&n).unwrap(), n.json().clone());
}

#[test]
fn test_conditions() {
    assert_eq!(parse(json!("string")).condition(), "typeof data === \"string\"");
    assert_eq!(
        parse(json!({"basis": "number", "divisor": 3})).condition(),
        "(typeof data === \"number\") && (data % 3 === 0)"
    );
    assert_eq!(
        parse(json!({"basis": "object", "required": [{"key": "a", "value": "string"}]})).condition(),
        "(((typeof data === \"object\" && data !== null) || typeof data === \"function\")) && (\"a\" in data && (typeof data.a === \"string\"))"
    );
    assert_eq!(parse(json!({})).condition(), "true");
    assert_eq!(parse(json!([])).condition(), "false");
}

#[test]
fn test_references_include_descendants_once() {
    let n = parse(json!({
        "basis": "object",
        "required": [
            {"key": "a", "value": "string"},
            {"key": "b", "value": "string"}
        ]
    }));
    let references = n.references();
    assert_eq!(references[0], n);
    let strings = references
        .iter()
        .filter(|r| r.kind() == NodeKind::Domain && r.json() == &json!("string"))
        .count();
    assert_eq!(strings, 1);
    assert_eq!(references.len(), 5);
}

#[test]
fn test_reference_nodes_round_trip() {
    let space = Space::new();
    let positive = Predicate::named("positive", |data: &Value| {
        data.as_number().is_some_and(|n| n > 0.0)
    });
    let length = Morph::new(|data: Value, _ctx: &mut TraversalContext| {
        Value::from(data.length().unwrap_or(0) as f64)
    });
    let nodes = [
        space
            .schema(Def::map([("basis", Def::from("number")), ("predicate", Def::from(positive))]))
            .unwrap(),
        space
            .schema(Def::map([("in", Def::from("string")), ("morph", Def::from(length))]))
            .unwrap(),
        space
            .schema(Def::map([
                ("basis", Def::from("object")),
                (
                    "optional",
                    Def::map([("key", Def::from(Symbol::new("tag"))), ("value", Def::from("number"))]),
                ),
            ]))
            .unwrap(),
    ];
    assert_eq!(nodes[1].json()["morph"], json!(["$ark.morph1"]));
    for n in &nodes {
        let reparsed = space.schema(n.json().clone()).expect("json parses back");
        assert_eq!(reparsed.id(), n.id(), "id changed for {}", n.json());
        assert_eq!(reparsed.kind(), n.kind());
    }
}

#[test]
fn test_ids_are_qualified_by_kind() {
    let space = Space::new();
    let required = space
        .node(NodeKind::Required, json!({"key": "a", "value": "string"}))
        .unwrap();
    let optional = space
        .node(NodeKind::Optional, json!({"key": "a", "value": "string"}))
        .unwrap();
    assert_eq!(required.json(), optional.json());
    assert_ne!(required.id(), optional.id());
    assert!(required.type_id().starts_with("required:"));
    assert_eq!(space.schema("string").unwrap().type_id(), "domain:\"string\"");
}
