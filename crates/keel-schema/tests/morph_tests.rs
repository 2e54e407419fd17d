use super::*;
use serde_json::json;

fn length() -> Morph {
    Morph::named("length", |data, _ctx| {
        Value::from(data.length().unwrap_or(0) as f64)
    })
}

fn morph_node(space: &Space, input: Def, output: Option<Def>, morph: Morph) -> Node {
    let mut entries = vec![("in", input), ("morph", Def::from(morph))];
    if let Some(output) = output {
        entries.push(("out", output));
    }
    space.schema(Def::map(entries)).expect("valid morph")
}

#[test]
fn test_morph_transforms_valid_input() {
    let space = Space::new();
    let n = morph_node(&space, Def::from("string"), None, length());
    assert_eq!(n.kind(), NodeKind::Morph);
    assert!(n.includes_morph());
    assert_eq!(n.apply(&Value::from("abc")).unwrap(), Value::from(3));
    assert!(n.allows(&Value::from("abc")));
    assert!(!n.allows(&Value::from(3)));
}

#[test]
fn test_morph_does_not_run_on_invalid_input() {
    let space = Space::new();
    let n = morph_node(&space, Def::from("string"), None, length());
    let problems = n.apply(&Value::from(3)).unwrap_err();
    assert_eq!(problems.summary(), "Must be a string");
}

#[test]
fn test_morph_output_is_validated() {
    let space = Space::new();
    let out = json!({"basis": "number", "min": 2});
    let n = morph_node(&space, Def::from("string"), Some(Def::from(out)), length());
    assert!(n.apply(&Value::from("ab")).is_ok());
    let problems = n.apply(&Value::from("a")).unwrap_err();
    assert_eq!(problems.summary(), "Must be at least 2");
}

#[test]
fn test_in_and_out_projections() {
    let space = Space::new();
    let n = morph_node(&space, Def::from("string"), Some(Def::from("number")), length());
    assert_eq!(n.input().unwrap(), space.schema("string").unwrap());
    assert_eq!(n.output().unwrap(), space.schema("number").unwrap());

    let without_out = morph_node(&space, Def::from("string"), None, length());
    assert!(without_out.output().unwrap().is_unknown());

    let plain = space.schema("string").unwrap();
    assert_eq!(plain.input().unwrap(), plain);
}

#[test]
fn test_projections_reach_nested_morphs() {
    let space = Space::new();
    let inner = morph_node(&space, Def::from("string"), Some(Def::from("number")), length());
    let n = space
        .schema(Def::map([
            ("basis", Def::from("object")),
            (
                "required",
                Def::map([("key", Def::from("a")), ("value", Def::from(&inner))]),
            ),
        ]))
        .unwrap();
    assert!(n.includes_morph());
    let expected_in = space
        .schema(json!({"basis": "object", "required": [{"key": "a", "value": "string"}]}))
        .unwrap();
    assert_eq!(n.input().unwrap(), expected_in);

    let out = n
        .apply(&Value::object([("a", Value::from("abcd"))]))
        .unwrap();
    assert_eq!(out.get(&PropKey::from("a")), Some(Value::from(4)));
}

#[test]
fn test_morphs_with_different_transforms_do_not_intersect() {
    let space = Space::new();
    let a = morph_node(&space, Def::from("string"), None, length());
    let b = morph_node(&space, Def::from("string"), None, length());
    let err = a.intersect(&b).unwrap_err();
    assert!(err.is_parse());
    assert!(err.to_string().starts_with("Invalid intersection of morphs"));
}

#[test]
fn test_morphs_with_same_transforms_intersect_inputs() {
    let space = Space::new();
    let shared = length();
    let a = morph_node(&space, Def::from(json!({"basis": "string", "min": 1})), None, shared.clone());
    let b = morph_node(&space, Def::from(json!({"basis": "string", "max": 3})), None, shared);
    let both = a.and(&b).unwrap();
    assert_eq!(both.kind(), NodeKind::Morph);
    assert_eq!(
        both.input().unwrap(),
        space
            .schema(json!({"basis": "string", "min": 1, "max": 3}))
            .unwrap()
    );
}

#[test]
fn test_non_morph_constrains_input() {
    let space = Space::new();
    let n = morph_node(&space, Def::from("string"), None, length());
    let narrowed = n
        .and(&space.schema(json!({"basis": "string", "min": 2})).unwrap())
        .unwrap();
    assert_eq!(narrowed.kind(), NodeKind::Morph);
    assert!(!narrowed.allows(&Value::from("a")));
    assert_eq!(narrowed.apply(&Value::from("ab")).unwrap(), Value::from(2));

    let disjoint = n.intersect(&space.schema("number").unwrap()).unwrap();
    assert!(disjoint.is_disjoint());
}

#[test]
fn test_morph_can_report_problems() {
    let space = Space::new();
    let parse_int = Morph::named("parseInt", |data: Value, ctx: &mut TraversalContext| {
        match data.as_str().and_then(|s| s.parse::<i32>().ok()) {
            Some(n) => Value::from(n),
            None => {
                ctx.custom("Must be an integer string", &data);
                data
            }
        }
    });
    let n = morph_node(&space, Def::from("string"), None, parse_int);
    assert_eq!(n.apply(&Value::from("42")).unwrap(), Value::from(42));
    let problems = n.apply(&Value::from("forty-two")).unwrap_err();
    assert_eq!(problems.summary(), "Must be an integer string");
}

#[test]
fn test_morph_branches_are_not_reduced() {
    let space = Space::new();
    let m = morph_node(&space, Def::from("string"), None, length());
    let n = space
        .union([m.clone(), space.schema("string").unwrap()])
        .unwrap();
    assert_eq!(n.children().len(), 2);
}

#[test]
fn test_morph_input_must_be_intersection_or_basis() {
    let space = Space::new();
    let err = space
        .schema(Def::map([
            ("in", Def::from(json!(["string", "number"]))),
            ("morph", Def::from(length())),
        ]))
        .unwrap_err();
    assert!(err.is_parse());
}
