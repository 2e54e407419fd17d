use super::*;
use rayon::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_equal_schemas_share_one_node() {
    let space = Space::new();
    let a = space.schema(json!({"basis": "number", "divisor": 3})).unwrap();
    let b = space.schema(json!({"divisor": 3, "basis": "number"})).unwrap();
    assert!(Arc::ptr_eq(&a.0, &b.0));
    assert!(a.space().ptr_eq(&space));
}

#[test]
fn test_nodes_are_released_with_their_handles() {
    let space = Space::new();
    let n = space.schema(json!({"basis": "number", "divisor": 7})).unwrap();
    assert_eq!(space.live_nodes(), 3);
    drop(n);
    assert_eq!(space.live_nodes(), 0);
    space.prune();
    let again = space.schema(json!({"basis": "number", "divisor": 7})).unwrap();
    assert_eq!(again.json(), &json!({"basis": "number", "divisor": 7}));
}

#[test]
fn test_aliases_count_per_kind() {
    let space = Space::new();
    let string = space.schema("string").unwrap();
    let number = space.schema("number").unwrap();
    assert_eq!(string.alias(), "domain1");
    assert_eq!(number.alias(), "domain2");
    let named = space
        .schema(json!({"domain": "bigint", "alias": "big"}))
        .unwrap();
    assert_eq!(named.alias(), "big");
}

#[test]
fn test_registry_names_by_identity() {
    let space = Space::new();
    let registry = space.registry();
    assert_eq!(registry.reference_proto(&Proto::date()), "$ark.Date");
    assert_eq!(registry.reference_proto(&Proto::date()), "$ark.Date");

    let other_date = Proto::new("Date");
    assert_eq!(registry.reference_proto(&other_date), "$ark.Date2");

    let anonymous = Predicate::new(|_: &Value| true);
    assert_eq!(registry.reference_predicate(&anonymous), "$ark.predicate1");
    let named = Predicate::named("isPositive", |data: &Value| {
        data.as_number().is_some_and(|n| n > 0.0)
    });
    assert_eq!(registry.reference_predicate(&named), "$ark.isPositive");

    let symbol = Value::from(Symbol::new("tag"));
    assert_eq!(registry.reference_value(&symbol), "$ark.symbol1");
    assert!(matches!(
        registry.resolve("$ark.symbol1"),
        Some(Registered::Value(Value::Symbol(_)))
    ));
    assert!(registry.resolve("$ark.missing").is_none());
}

#[test]
fn test_registered_references_parse_back() {
    let space = Space::new();
    let positive = Predicate::named("positive", |data: &Value| {
        data.as_number().is_some_and(|n| n > 0.0)
    });
    let n = space
        .schema(Def::map([
            ("basis", Def::from("number")),
            ("predicate", Def::from(positive)),
        ]))
        .unwrap();
    assert_eq!(
        n.json(),
        &json!({"basis": "number", "predicate": ["$ark.positive"]})
    );
    assert_eq!(n.condition(), "(typeof data === \"number\") && ($ark.positive(data))");
    let reparsed = space.schema(n.json().clone()).unwrap();
    assert_eq!(reparsed, n);
    assert!(reparsed.allows(&Value::from(1)));
}

#[test]
fn test_object_units_are_referenced() {
    let space = Space::new();
    let object = Value::object([("a", Value::from(1))]);
    let n = space.schema(object.clone()).unwrap();
    assert_eq!(n.json(), &json!({"unit": "$ark.object1"}));
    assert!(n.allows(&object));
    assert!(!n.allows(&Value::object([("a", Value::from(1))])));
    assert_eq!(space.schema(n.json().clone()).unwrap(), n);
}

#[test]
fn test_symbol_keys() {
    let space = Space::new();
    let tag = Symbol::new("tag");
    let n = space
        .schema(Def::map([
            ("basis", Def::from("object")),
            (
                "required",
                Def::map([("key", Def::from(tag.clone())), ("value", Def::from("string"))]),
            ),
        ]))
        .unwrap();
    assert_eq!(
        n.json(),
        &json!({
            "basis": "object",
            "required": [{"key": {"symbol": "$ark.symbol1"}, "value": "string"}]
        })
    );
    let data = Value::object([(PropKey::from(tag), Value::from("x"))]);
    assert!(n.allows(&data));
    assert_eq!(space.schema(n.json().clone()).unwrap(), n);
}

#[test]
fn test_string_keys_never_resolve_to_symbols() {
    let space = Space::new();
    let by_symbol = space
        .schema(Def::map([
            ("basis", Def::from("object")),
            (
                "required",
                Def::map([("key", Def::from(Symbol::new("tag"))), ("value", Def::from("string"))]),
            ),
        ]))
        .unwrap();
    let by_string = space
        .schema(json!({
            "basis": "object",
            "required": [{"key": "$ark.symbol1", "value": "string"}]
        }))
        .unwrap();
    assert!(!by_string.equals(&by_symbol));
    let data = Value::object([("$ark.symbol1", Value::from("x"))]);
    assert!(by_string.allows(&data));
    assert!(!by_symbol.allows(&data));

    let err = space
        .schema(json!({
            "basis": "object",
            "required": [{"key": {"symbol": "$ark.symbol9"}, "value": "string"}]
        }))
        .unwrap_err();
    assert_eq!(err.to_string(), "$ark.symbol9 is not a registered symbol");
}

#[test]
fn test_adopt_registers_references_in_the_new_space() {
    let home = Space::new();
    let other = Space::new();
    home.registry()
        .reference_value(&Value::from(Symbol::new("local")));
    let foreign = other.schema(Value::from(Symbol::new("foreign"))).unwrap();
    assert_eq!(foreign.json(), &json!({"unit": "$ark.symbol1"}));

    let adopted = home.adopt(&foreign);
    assert!(adopted.space().ptr_eq(&home));
    assert_eq!(adopted.json(), &json!({"unit": "$ark.symbol2"}));
    assert_eq!(adopted, foreign);
    assert!(Arc::ptr_eq(&home.adopt(&adopted).0, &adopted.0));
}

#[test]
fn test_registry_prefix_is_configurable() {
    let config = SpaceConfig::from_json(r#"{"registryPrefix": "$types"}"#).unwrap();
    assert!(config.discriminate_unions);
    assert_eq!(config.max_reducible_branches, limits::MAX_REDUCIBLE_BRANCHES);
    let space = Space::with_config(config);
    let n = space.schema(Proto::date()).unwrap();
    assert_eq!(n.json(), &json!({"proto": "$types.Date"}));
    assert_eq!(n.condition(), "data instanceof $types.Date");
}

#[test]
fn test_invalid_config_is_a_parse_error() {
    let err = SpaceConfig::from_json(r#"{"maxReducibleBranches": "many"}"#).unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn test_concurrent_interning_yields_one_node() {
    let space = Space::new();
    let nodes: Vec<Node> = (0..64)
        .into_par_iter()
        .map(|i| {
            let def = if i % 2 == 0 {
                json!({"basis": "number", "divisor": 3, "min": 1})
            } else {
                json!({"min": 1, "divisor": 3, "basis": "number"})
            };
            space.schema(def).unwrap()
        })
        .collect();
    let first = &nodes[0];
    assert!(nodes.iter().all(|n| Arc::ptr_eq(&n.0, &first.0)));
}

#[test]
fn test_concurrent_intersections_agree() {
    let space = Space::new();
    let l = space
        .schema(json!([
            {"basis": "number", "divisor": 2},
            {"basis": "number", "divisor": 3}
        ]))
        .unwrap();
    let r = space.schema(json!({"basis": "number", "divisor": 5})).unwrap();
    let ids: Vec<String> = (0..32)
        .into_par_iter()
        .map(|i| {
            let n = if i % 2 == 0 { l.and(&r) } else { r.and(&l) };
            n.unwrap().type_id().to_string()
        })
        .collect();
    assert!(ids.iter().all(|id| id == &ids[0]));
}
